use super::*;

/// Nonces hashed between two checks of the cancellation token.
const BATCH_SIZE: u64 = 512;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub(crate) enum MineError {
    #[snafu(display("mining cancelled"))]
    Cancelled,

    #[snafu(display("nonce space exhausted"))]
    Exhausted,

    #[snafu(display("failed to build mining thread pool: {source}"))]
    ThreadPool { source: rayon::ThreadPoolBuildError },

    #[snafu(display("mining worker failed: {message}"))]
    Worker { message: String },
}

pub(crate) trait NonceMiner: Send + Sync + 'static {
    /// Searches for a nonce whose score combined with `pow_payload` reaches
    /// `target_score`. Returns `MineError::Cancelled` once `cancel` fires.
    fn mine(
        &self,
        pow_payload: &[u8],
        target_score: f64,
        cancel: &CancellationToken,
    ) -> Result<u64, MineError>;
}

/// Proof-of-work search over `parallelism` rayon workers, each owning a
/// disjoint slice of the nonce space.
pub(crate) struct Miner {
    metrics: Option<Arc<Metrics>>,
    parallelism: usize,
    pool: rayon::ThreadPool,
}

impl Miner {
    pub(crate) fn new(parallelism: usize) -> Result<Self, MineError> {
        let parallelism = parallelism.max(1);

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(parallelism)
            .thread_name(|index| format!("pow-worker-{index}"))
            .panic_handler(|_| {
                error!("PoW worker panicked during mining");
            })
            .build()
            .context(ThreadPoolSnafu)?;

        Ok(Self {
            metrics: None,
            parallelism,
            pool,
        })
    }

    pub(crate) fn with_metrics(self, metrics: Arc<Metrics>) -> Self {
        Self {
            metrics: Some(metrics),
            ..self
        }
    }

    #[cfg(test)]
    pub(crate) fn parallelism(&self) -> usize {
        self.parallelism
    }

    fn search(&self, work: &Work, start: u64, end: u64) {
        let mut current = start;

        loop {
            if work.found.load(Ordering::Relaxed) || work.cancel.is_cancelled() {
                return;
            }

            let batch_end = current.saturating_add(BATCH_SIZE - 1).min(end);

            for nonce in current..=batch_end {
                if ledger::score_with_digest(&work.digest, nonce, work.block_len)
                    >= work.target_score
                {
                    if work
                        .found
                        .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                        .is_ok()
                    {
                        work.nonce.store(nonce, Ordering::Release);
                    }

                    self.record_hashes(nonce - current + 1);
                    return;
                }
            }

            self.record_hashes(batch_end - current + 1);

            if batch_end == end {
                return;
            }

            current = batch_end + 1;
        }
    }

    fn record_hashes(&self, hashes: u64) {
        if let Some(metrics) = &self.metrics {
            metrics.add_hashes(hashes);
        }
    }
}

struct Work<'a> {
    block_len: usize,
    cancel: &'a CancellationToken,
    digest: [u8; 32],
    found: AtomicBool,
    nonce: AtomicU64,
    target_score: f64,
}

impl NonceMiner for Miner {
    fn mine(
        &self,
        pow_payload: &[u8],
        target_score: f64,
        cancel: &CancellationToken,
    ) -> Result<u64, MineError> {
        if cancel.is_cancelled() {
            return Err(MineError::Cancelled);
        }

        let work = Work {
            block_len: pow_payload.len() + NONCE_BYTES,
            cancel,
            digest: ledger::pow_digest(pow_payload),
            found: AtomicBool::new(false),
            nonce: AtomicU64::new(0),
            target_score,
        };

        let start = Instant::now();
        let range = u64::MAX / self.parallelism as u64;

        self.pool.scope(|scope| {
            for worker in 0..self.parallelism {
                let first = worker as u64 * range;
                let last = if worker == self.parallelism - 1 {
                    u64::MAX
                } else {
                    first + range - 1
                };

                let work = &work;
                scope.spawn(move |_| self.search(work, first, last));
            }
        });

        if work.found.load(Ordering::Acquire) {
            let nonce = work.nonce.load(Ordering::Acquire);
            debug!(
                "Found nonce {nonce} for target score {target_score} in {:?}",
                start.elapsed()
            );
            return Ok(nonce);
        }

        if cancel.is_cancelled() {
            Err(MineError::Cancelled)
        } else {
            Err(MineError::Exhausted)
        }
    }
}
