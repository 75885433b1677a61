use {super::*, tracing_subscriber::Layer};

const DEFAULT_FILTER: &str = "warn,spammer=info";

fn filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Installs the global subscriber. Logs go to stderr through a non-blocking
/// writer so stdout stays free for JSON output; keep the guard alive until
/// exit to flush them.
pub(crate) fn init() -> tracing_appender::non_blocking::WorkerGuard {
    let (writer, guard) = non_blocking(io::stderr());

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(writer)
                .with_filter(filter()),
        )
        .init();

    guard
}
