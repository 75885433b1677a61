use {
    account::LedgerAccount,
    anyhow::{Error, anyhow, bail, ensure},
    arguments::Arguments,
    async_trait::async_trait,
    clap::{Parser, ValueEnum},
    client::{BasicOutputsQuery, Indexer, LedgerClient, Receipt, Submitter, TipSource},
    derive_more::Display,
    ledger::{
        Address, Block, BlockId, NONCE_BYTES, NativeTokens, Output, OutputId, ProtocolParameters,
        TaggedData, TokenId, TransactionId, TransactionPayload, Utxo,
    },
    metrics::Metrics,
    parking_lot::Mutex,
    partition::{Decision, consume_inputs, partition},
    pow::{Miner, PowError, do_pow, do_pow_with},
    primitive_types::U256,
    serde::{Deserialize, Serialize},
    snafu::Snafu,
    spam_builder::SpamBuilder,
    spammer::{Mode, SpamConfig, SpamError, Spammer},
    std::{
        collections::{BTreeMap, HashSet, VecDeque},
        env,
        fmt::{self, Display, Formatter},
        fs, io,
        path::PathBuf,
        process,
        str::FromStr,
        sync::{
            Arc,
            atomic::{AtomicBool, AtomicU64, Ordering},
        },
        time::{Duration, Instant},
    },
    tokio::{
        runtime::Runtime,
        task::{self, JoinHandle},
        time::{MissedTickBehavior, interval, sleep},
    },
    tokio_util::sync::CancellationToken,
    tracing::{debug, error, info, warn},
    tracing_appender::non_blocking,
    tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt},
};

mod account;
mod arguments;
mod client;
mod devnet;
mod logs;
mod metrics;
mod options;
mod partition;
mod pow;
mod settings;
mod signal;
mod spam_builder;
mod spammer;
mod subcommand;
mod system_utils;

pub const DEFAULT_TAG: &str = "spammer";

type Result<T = (), E = Error> = std::result::Result<T, E>;

fn integration_test() -> bool {
    env::var_os("SPAMMER_INTEGRATION_TEST").is_some()
}

pub fn main() {
    let _guard = logs::init();

    let args = Arguments::parse();

    Runtime::new()
        .expect("Failed to create tokio runtime")
        .block_on(async {
            let result = match signal::setup_signal_handler() {
                Ok(cancel_token) => args.run(cancel_token).await,
                Err(err) => Err(err),
            };

            match result {
                Err(err) => {
                    eprintln!("error: {err}");

                    for (i, cause) in err.chain().skip(1).enumerate() {
                        if i == 0 {
                            eprintln!();
                            eprintln!("because:");
                        }
                        eprintln!("- {cause}");
                    }

                    if env::var_os("RUST_BACKTRACE")
                        .map(|val| val == "1")
                        .unwrap_or_default()
                    {
                        eprintln!();
                        eprintln!("{}", err.backtrace());
                    }
                    process::exit(1);
                }
                Ok(_) => {
                    process::exit(0);
                }
            }
        });
}
