use {super::*, devnet::Devnet, metrics::spawn_status_logger};

const FUNDING: u64 = 1_000_000_000;
const TOKEN_SUPPLY: u64 = 1_000_000;
const STATUS_PERIOD: Duration = Duration::from_secs(5);

#[derive(Debug, Parser)]
pub(crate) struct Spam {
    #[arg(long, value_enum, help = "Send <MODE> transactions. [default: basic]")]
    mode: Option<Mode>,
    #[arg(long, help = "Send at most <BPS> blocks per second, 0 for no limit.")]
    bps: Option<f64>,
    #[arg(long, help = "Stop after <COUNT> blocks.")]
    count: Option<u64>,
    #[arg(long, help = "Mine with <PARALLELISM> workers. [default: all cores]")]
    parallelism: Option<usize>,
    #[arg(long, help = "Mine blocks to <TARGET_SCORE>. [default: min PoW score]")]
    target_score: Option<f64>,
    #[arg(long, help = "Refresh tips every <REFRESH_TIPS_INTERVAL> seconds while mining.")]
    refresh_tips_interval: Option<f64>,
    #[arg(long, help = "Spam between <ACCOUNTS> accounts. [default: 2]")]
    accounts: Option<usize>,
    #[arg(long, help = "Tag transactions with <TAG>.")]
    tag: Option<String>,
}

impl Spam {
    pub(crate) fn settings(&self) -> Settings {
        Settings {
            parallelism: self.parallelism,
            target_score: self.target_score,
            spam_mode: self.mode,
            spam_bps: self.bps,
            spam_count: self.count,
            spam_refresh_tips_interval: self.refresh_tips_interval,
            spam_accounts: self.accounts,
            spam_tag: self.tag.clone(),
            ..Default::default()
        }
    }

    pub(crate) async fn run(self, settings: Settings, cancel_token: CancellationToken) -> Result {
        let config = settings.spam_config();
        let devnet = Arc::new(Devnet::new(settings.protocol_parameters()));

        info!(
            "Spamming in {} mode with {} workers",
            config.mode, config.parallelism
        );

        let spammer = Spammer::new(devnet.clone(), config).context("failed to set up spammer")?;

        let mut accounts = Vec::with_capacity(settings.spam_accounts());

        for _ in 0..settings.spam_accounts() {
            let address = Address::random();

            devnet.fund(address, FUNDING, NativeTokens::new());
            devnet.fund(
                address,
                FUNDING,
                NativeTokens::new().with(TokenId::random(), U256::from(TOKEN_SUPPLY)),
            );

            let account = spammer
                .bootstrap_account(address)
                .await
                .with_context(|| format!("failed to bootstrap account {address}"))?;

            debug!("Funded account {account}");

            accounts.push(account);
        }

        let status = (!integration_test()).then(|| {
            spawn_status_logger(spammer.metrics(), STATUS_PERIOD, cancel_token.child_token())
        });

        let result = spammer.run(&cancel_token, &mut accounts).await;

        if let Some(status) = status {
            status.abort();
        }

        let summary = spammer.metrics().summary();

        info!(
            "Sent {} blocks, devnet holds {}",
            summary.blocks_sent,
            devnet.blocks()
        );

        println!("{}", serde_json::to_string_pretty(&summary)?);

        result
    }
}
