use {super::*, snafu::ResultExt};

pub(crate) use error::*;

mod error;

const SKIP_BACKOFF: Duration = Duration::from_millis(50);

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Display, ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub(crate) enum Mode {
    #[default]
    #[display("basic")]
    Basic,
    #[display("native-tokens")]
    NativeTokens,
    #[display("mixed")]
    Mixed,
}

impl Mode {
    /// Transfer kind of `round`. Mixed mode switches kind after every full
    /// pass over the accounts so value keeps circulating.
    fn native_tokens_round(self, round: u64, accounts: usize) -> bool {
        match self {
            Self::Basic => false,
            Self::NativeTokens => true,
            Self::Mixed => (round / accounts.max(1) as u64) % 2 == 1,
        }
    }
}

/// Interval between two blocks sent at `bps` blocks per second, `None` for
/// zero, which means unthrottled.
pub(crate) fn throttle_period(bps: f64) -> Result<Option<Duration>> {
    ensure!(
        bps.is_finite() && bps >= 0.0,
        "bps must be zero or a positive number, got {bps}"
    );

    if bps == 0.0 {
        return Ok(None);
    }

    Duration::try_from_secs_f64(1.0 / bps)
        .ok()
        .filter(|period| !period.is_zero())
        .map(Some)
        .ok_or_else(|| anyhow!("bps {bps} is out of range"))
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SpamConfig {
    pub(crate) bps: f64,
    pub(crate) count: Option<u64>,
    pub(crate) mode: Mode,
    pub(crate) parallelism: usize,
    pub(crate) refresh_tips_interval: Option<Duration>,
    pub(crate) tag: String,
    pub(crate) target_score: Option<f64>,
}

impl Default for SpamConfig {
    fn default() -> Self {
        Self {
            bps: 0.0,
            count: None,
            mode: Mode::Basic,
            parallelism: 1,
            refresh_tips_interval: None,
            tag: DEFAULT_TAG.into(),
            target_score: None,
        }
    }
}

pub(crate) struct Spammer<C> {
    client: Arc<C>,
    config: SpamConfig,
    metrics: Arc<Metrics>,
    miner: Arc<Miner>,
    parameters: ProtocolParameters,
}

impl<C: LedgerClient + 'static> Spammer<C> {
    pub(crate) fn new(client: Arc<C>, config: SpamConfig) -> Result<Self, SpamError> {
        let metrics = Arc::new(Metrics::new());

        let miner = Miner::new(config.parallelism)
            .map_err(|source| SpamError::from(PowError::Mine { source }))?
            .with_metrics(metrics.clone());

        Ok(Self {
            parameters: client.protocol_parameters(),
            client,
            config,
            metrics,
            miner: Arc::new(miner),
        })
    }

    pub(crate) fn metrics(&self) -> Arc<Metrics> {
        self.metrics.clone()
    }

    pub(crate) fn target_score(&self) -> f64 {
        self.config
            .target_score
            .unwrap_or(self.parameters.min_pow_score)
    }

    pub(crate) async fn bootstrap_account(&self, address: Address) -> Result<LedgerAccount, SpamError> {
        let basic_outputs = self
            .client
            .basic_outputs(&BasicOutputsQuery::spendable(address))
            .await
            .context(ClientSnafu)?;

        debug!(
            "Bootstrapped account {address} with {} outputs",
            basic_outputs.len()
        );

        Ok(LedgerAccount::new(address, basic_outputs))
    }

    fn builder(&self, sender: &LedgerAccount, tags: &[String]) -> SpamBuilder {
        SpamBuilder::new(
            sender.address(),
            self.parameters.clone(),
            &self.config.tag,
            tags,
        )
    }

    /// Sends the value of the sender's token-free basic outputs to a single
    /// output of the receiver.
    pub(crate) async fn send_basic(
        &self,
        cancel: &CancellationToken,
        sender: &mut LedgerAccount,
        receiver: &mut LedgerAccount,
        tags: &[String],
    ) -> Result<Receipt, SpamError> {
        if sender.basic_outputs().is_empty() {
            return NoUtxoAvailableSnafu { kind: "basic" }.fail();
        }

        let (mut builder, _, remaining) = consume_inputs(
            sender.basic_outputs().to_vec(),
            self.builder(sender, tags),
            |mut builder, utxo| {
                if !utxo.is_plain_basic() {
                    return (builder, Decision::Skip);
                }

                if builder.add_input(utxo) {
                    (builder, Decision::Consume)
                } else {
                    (builder, Decision::Abort)
                }
            },
        );

        if builder.consumed_inputs_empty() {
            return FilteredEmptySnafu { kind: "basic" }.fail();
        }

        let amount = builder.input_amount();

        if !builder.add_output(Output::basic(receiver.address(), amount)) {
            return MaxOutputsExceededSnafu { kind: "basic" }.fail();
        }

        let receipt = self
            .build_transaction_payload_block_and_send(cancel, &builder)
            .await?;

        self.book_created_outputs(sender, receiver, remaining, &receipt)?;

        Ok(receipt)
    }

    /// Moves every native token output of the sender, as is, to the receiver.
    /// Each output is tried on a branch of the builder and only kept if both
    /// its input and output fit.
    pub(crate) async fn send_native_tokens(
        &self,
        cancel: &CancellationToken,
        sender: &mut LedgerAccount,
        receiver: &mut LedgerAccount,
        tags: &[String],
    ) -> Result<Receipt, SpamError> {
        if sender.basic_outputs().is_empty() {
            return NoUtxoAvailableSnafu {
                kind: "native token",
            }
            .fail();
        }

        let receiver_address = receiver.address();

        let (builder, _, remaining) = consume_inputs(
            sender.basic_outputs().to_vec(),
            self.builder(sender, tags),
            |builder, utxo| {
                if utxo.output().native_tokens().is_empty() {
                    return (builder, Decision::Skip);
                }

                let mut branch = builder.clone();

                if branch.add_input(utxo)
                    && branch.add_output(utxo.output().with_address(receiver_address))
                {
                    (branch, Decision::Consume)
                } else {
                    (builder, Decision::Abort)
                }
            },
        );

        if builder.consumed_inputs_empty() {
            return FilteredEmptySnafu {
                kind: "native token",
            }
            .fail();
        }

        let receipt = self
            .build_transaction_payload_block_and_send(cancel, &builder)
            .await?;

        self.book_created_outputs(sender, receiver, remaining, &receipt)?;

        Ok(receipt)
    }

    /// Builds the payload, wraps it in a block on the current tips, does the
    /// proof of work and submits the block.
    pub(crate) async fn build_transaction_payload_block_and_send(
        &self,
        cancel: &CancellationToken,
        builder: &SpamBuilder,
    ) -> Result<Receipt, SpamError> {
        if cancel.is_cancelled() {
            return AbortedSnafu.fail();
        }

        let payload = builder.build()?;

        let tips = self.client.tips().await.context(ClientSnafu)?;

        let mut block = Block::new(self.parameters.protocol_version, tips, Some(payload));

        let refresh = self
            .config
            .refresh_tips_interval
            .map(|interval| (interval, self.client.as_ref() as &dyn TipSource));

        let start = Instant::now();

        let size = do_pow_with(
            self.miner.clone(),
            cancel,
            &mut block,
            self.target_score(),
            refresh,
        )
        .await?;

        debug!(
            "PoW for block of {size} bytes with {} inputs done in {:?}",
            builder.inputs().len(),
            start.elapsed()
        );

        let receipt = self.client.submit(block).await.context(ClientSnafu)?;

        self.metrics.add_block();

        Ok(receipt)
    }

    /// Writes `remaining` plus the remainder back to the sender and books the
    /// created outputs to the receiver.
    pub(crate) fn book_created_outputs(
        &self,
        sender: &mut LedgerAccount,
        receiver: &mut LedgerAccount,
        mut remaining: Vec<Utxo>,
        receipt: &Receipt,
    ) -> Result<(), SpamError> {
        let misplaced_remainder = match &receipt.remainder {
            Some(remainder) if remainder.output().address() == sender.address() => {
                remaining.push(remainder.clone());
                None
            }
            Some(remainder) => Some(remainder),
            None => None,
        };

        sender.set_basic_outputs(remaining);

        if let Some(remainder) = misplaced_remainder {
            return BookingFailedSnafu {
                output_id: remainder.id(),
                address: remainder.output().address(),
            }
            .fail();
        }

        if let Some(misplaced) = receipt
            .created
            .iter()
            .find(|utxo| utxo.output().address() != receiver.address())
        {
            return BookingFailedSnafu {
                output_id: misplaced.id(),
                address: misplaced.output().address(),
            }
            .fail();
        }

        receiver.add_outputs(receipt.created.iter().cloned());

        Ok(())
    }

    /// Spams blocks, each account sending to the next one, until `cancel`
    /// fires, the configured count is reached or a fatal error occurs.
    pub(crate) async fn run(&self, cancel: &CancellationToken, accounts: &mut [LedgerAccount]) -> Result {
        ensure!(
            accounts.len() >= 2,
            "spamming needs at least two accounts, got {}",
            accounts.len()
        );

        let mut throttle = throttle_period(self.config.bps)?.map(|period| {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker
        });

        let len = accounts.len();

        info!(
            "Spamming {} blocks across {} accounts at target score {}",
            self.config.mode,
            len,
            self.target_score()
        );

        for round in 0.. {
            if self
                .config
                .count
                .is_some_and(|count| self.metrics.total_blocks() >= count)
            {
                info!("Sent {} blocks, stopping", self.metrics.total_blocks());
                break;
            }

            if let Some(ticker) = &mut throttle {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {}
                }
            }

            if cancel.is_cancelled() {
                break;
            }

            let index = (round % len as u64) as usize;
            let (sender, receiver) = pair_mut(accounts, index, (index + 1) % len);

            let native_tokens = self.config.mode.native_tokens_round(round, len);

            let tags = vec![
                if native_tokens { "native-tokens" } else { "basic" }.to_string(),
                format!("round-{round}"),
            ];

            let result = if native_tokens {
                self.send_native_tokens(cancel, sender, receiver, &tags).await
            } else {
                self.send_basic(cancel, sender, receiver, &tags).await
            };

            match result {
                Ok(receipt) => debug!("Round {round}: block {} accepted", receipt.block_id),
                Err(err) if err.is_aborted() => break,
                Err(err) if err.is_fatal() => {
                    self.metrics.add_failure();
                    error!("Round {round}: {err}, account state is out of sync, stopping");
                    return Err(err.into());
                }
                Err(err) => {
                    self.metrics.add_skipped();
                    warn!("Round {round} skipped: {err}");

                    tokio::select! {
                        _ = cancel.cancelled() => break,
                        _ = sleep(SKIP_BACKOFF) => {}
                    }
                }
            }
        }

        Ok(())
    }
}

fn pair_mut<T>(items: &mut [T], first: usize, second: usize) -> (&mut T, &mut T) {
    debug_assert_ne!(first, second);

    if first < second {
        let (head, tail) = items.split_at_mut(second);
        (&mut head[first], &mut tail[0])
    } else {
        let (head, tail) = items.split_at_mut(first);
        (&mut tail[0], &mut head[second])
    }
}
