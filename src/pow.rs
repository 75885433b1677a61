use {super::*, client::ClientError, ledger::LedgerError, snafu::ResultExt};

pub(crate) use miner::{MineError, Miner, NonceMiner};

mod miner;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub(crate) enum PowError {
    #[snafu(display("operation aborted"))]
    Aborted,

    #[snafu(display("unable to perform PoW as block can't be serialized: {source}"))]
    Serialization { source: LedgerError },

    #[snafu(display("unable to refresh tips: {source}"))]
    RefreshTips { source: ClientError },

    #[snafu(display("PoW failed: {source}"))]
    Mine { source: MineError },
}

/// Does the proof of work required to reach `target_score` and writes the
/// nonce into `block`. Returns the serialized block size.
///
/// With a tip source the search is bounded by `refresh_interval`: when it
/// elapses the parents are replaced by fresh tips and mining restarts on the
/// re-serialized block. Without one, only `cancel` or a found nonce ends the
/// search.
///
/// Builds a fresh worker pool for this one block and counts no hashes. Callers
/// mining many blocks keep a `Miner` and go through `do_pow_with`, as the
/// spammer does.
pub(crate) async fn do_pow(
    cancel: &CancellationToken,
    block: &mut Block,
    target_score: f64,
    parallelism: usize,
    refresh_interval: Duration,
    tips: Option<&dyn TipSource>,
) -> Result<usize, PowError> {
    if cancel.is_cancelled() {
        return AbortedSnafu.fail();
    }

    let miner = Arc::new(Miner::new(parallelism).context(MineSnafu)?);

    do_pow_with(
        miner,
        cancel,
        block,
        target_score,
        tips.map(|tips| (refresh_interval, tips)),
    )
    .await
}

pub(crate) async fn do_pow_with<M: NonceMiner>(
    miner: Arc<M>,
    cancel: &CancellationToken,
    block: &mut Block,
    target_score: f64,
    refresh: Option<(Duration, &dyn TipSource)>,
) -> Result<usize, PowError> {
    if cancel.is_cancelled() {
        return AbortedSnafu.fail();
    }

    let mut pow_payload: Arc<[u8]> = block.pow_payload().context(SerializationSnafu)?.into();

    loop {
        if cancel.is_cancelled() {
            return AbortedSnafu.fail();
        }

        let attempt = cancel.child_token();

        if let Some((refresh_interval, _)) = refresh {
            let attempt = attempt.clone();
            task::spawn(async move {
                tokio::select! {
                    _ = sleep(refresh_interval) => attempt.cancel(),
                    _ = attempt.cancelled() => {}
                }
            });
        }

        let result = {
            let miner = miner.clone();
            let pow_payload = pow_payload.clone();
            let attempt = attempt.clone();
            task::spawn_blocking(move || miner.mine(&pow_payload, target_score, &attempt))
                .await
                .unwrap_or_else(|err| {
                    Err(MineError::Worker {
                        message: err.to_string(),
                    })
                })
        };

        attempt.cancel();

        match result {
            Ok(nonce) => {
                block.nonce = nonce;
                return Ok(pow_payload.len() + NONCE_BYTES);
            }
            Err(_) if cancel.is_cancelled() => return AbortedSnafu.fail(),
            Err(MineError::Cancelled) => {
                let Some((refresh_interval, tips)) = refresh else {
                    return Err(PowError::Mine {
                        source: MineError::Cancelled,
                    });
                };

                debug!("PoW took longer than {refresh_interval:?}, refreshing tips");

                let parents = match tips.tips().await {
                    Ok(parents) => parents,
                    Err(_) if cancel.is_cancelled() => return AbortedSnafu.fail(),
                    Err(source) => return Err(PowError::RefreshTips { source }),
                };

                block.set_parents(parents);

                pow_payload = block.pow_payload().context(SerializationSnafu)?.into();
            }
            Err(source) => return Err(PowError::Mine { source }),
        }
    }
}
