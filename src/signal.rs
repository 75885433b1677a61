use {super::*, anyhow::Context, tokio::signal::ctrl_c};

/// Token cancelled on the first SIGINT or SIGTERM.
pub(crate) fn setup_signal_handler() -> Result<CancellationToken> {
    let cancel = CancellationToken::new();

    #[cfg(unix)]
    let mut sigterm = {
        use tokio::signal::unix::{SignalKind, signal};
        signal(SignalKind::terminate()).context("failed to install SIGTERM handler")?
    };

    {
        let cancel = cancel.clone();

        task::spawn(async move {
            #[cfg(unix)]
            {
                tokio::select! {
                    _ = ctrl_c() => info!("Received shutdown signal (Ctrl-C / SIGINT)"),
                    _ = sigterm.recv() => info!("Received shutdown signal (SIGTERM)"),
                }
            }

            #[cfg(not(unix))]
            {
                ctrl_c().await.ok();
                info!("Received shutdown signal (Ctrl-C)");
            }

            cancel.cancel();
        });
    }

    Ok(cancel)
}
