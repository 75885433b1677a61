use super::*;

pub(crate) struct Metrics {
    blocks: AtomicU64,
    failures: AtomicU64,
    hashes: AtomicU64,
    skipped: AtomicU64,
    started: Instant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct Summary {
    pub(crate) blocks_sent: u64,
    pub(crate) rounds_skipped: u64,
    pub(crate) failures: u64,
    pub(crate) hashes: u64,
    pub(crate) uptime_secs: f64,
    pub(crate) blocks_per_second: f64,
}

impl Metrics {
    pub(crate) fn new() -> Self {
        Self {
            blocks: AtomicU64::new(0),
            failures: AtomicU64::new(0),
            hashes: AtomicU64::new(0),
            skipped: AtomicU64::new(0),
            started: Instant::now(),
        }
    }

    pub(crate) fn add_hashes(&self, hashes: u64) {
        self.hashes.fetch_add(hashes, Ordering::Relaxed);
    }

    pub(crate) fn add_block(&self) {
        self.blocks.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn add_skipped(&self) {
        self.skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn add_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn total_hashes(&self) -> u64 {
        self.hashes.load(Ordering::Relaxed)
    }

    pub(crate) fn total_blocks(&self) -> u64 {
        self.blocks.load(Ordering::Relaxed)
    }

    pub(crate) fn total_skipped(&self) -> u64 {
        self.skipped.load(Ordering::Relaxed)
    }

    pub(crate) fn total_failures(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }

    pub(crate) fn uptime(&self) -> Duration {
        self.started.elapsed()
    }

    pub(crate) fn blocks_per_second(&self) -> f64 {
        let secs = self.uptime().as_secs_f64();

        if secs > 0.0 {
            self.total_blocks() as f64 / secs
        } else {
            0.0
        }
    }

    pub(crate) fn status_line(&self) -> String {
        format!(
            "blocks={}  bps={:.2}  skipped={}  failures={}  hashes={}  uptime={}s",
            self.total_blocks(),
            self.blocks_per_second(),
            self.total_skipped(),
            self.total_failures(),
            self.total_hashes(),
            self.uptime().as_secs()
        )
    }

    pub(crate) fn summary(&self) -> Summary {
        Summary {
            blocks_sent: self.total_blocks(),
            rounds_skipped: self.total_skipped(),
            failures: self.total_failures(),
            hashes: self.total_hashes(),
            uptime_secs: self.uptime().as_secs_f64(),
            blocks_per_second: self.blocks_per_second(),
        }
    }
}

/// Logs the status line every `period` until `cancel` fires.
pub(crate) fn spawn_status_logger(
    metrics: Arc<Metrics>,
    period: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    task::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => info!("{}", metrics.status_line()),
            }
        }
    })
}
