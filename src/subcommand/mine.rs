use {super::*, devnet::Devnet};

#[derive(Debug, Parser)]
pub(crate) struct Mine {
    #[arg(long, help = "Mine with <PARALLELISM> workers. [default: all cores]")]
    parallelism: Option<usize>,
    #[arg(long, help = "Mine the block to <TARGET_SCORE>. [default: min PoW score]")]
    target_score: Option<f64>,
    #[arg(long, help = "Give up after <TIMEOUT> seconds.")]
    timeout: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct Mined {
    pub(crate) block_id: BlockId,
    pub(crate) nonce: u64,
    pub(crate) size: usize,
    pub(crate) score: f64,
}

impl Mine {
    pub(crate) fn settings(&self) -> Settings {
        Settings {
            parallelism: self.parallelism,
            target_score: self.target_score,
            mine_timeout: self.timeout,
            ..Default::default()
        }
    }

    pub(crate) async fn run(self, settings: Settings, cancel_token: CancellationToken) -> Result {
        let parameters = settings.protocol_parameters();
        let target_score = settings.target_score.unwrap_or(parameters.min_pow_score);
        let devnet = Devnet::new(parameters.clone());

        let address = Address::random();
        let utxo = devnet.fund(address, 1, NativeTokens::new());

        let mut block = Block::new(
            parameters.protocol_version,
            devnet.tips().await.context("failed to fetch tips")?,
            Some(self_transfer(&parameters, &utxo)?),
        );

        let cancel = cancel_token.child_token();

        if let Some(timeout) = settings.mine_timeout() {
            let cancel = cancel.clone();
            task::spawn(async move {
                sleep(timeout).await;
                cancel.cancel();
            });
        }

        info!(
            "Mining block to score {target_score} with {} workers",
            settings.parallelism()
        );

        let start = Instant::now();

        let size = match do_pow(
            &cancel,
            &mut block,
            target_score,
            settings.parallelism(),
            Duration::ZERO,
            None,
        )
        .await
        {
            Ok(size) => size,
            Err(PowError::Aborted) if !cancel_token.is_cancelled() => {
                bail!("no nonce found within {:?}", start.elapsed())
            }
            Err(err) => return Err(err).context("failed to mine block"),
        };

        let receipt = devnet
            .submit(block.clone())
            .await
            .context("devnet rejected mined block")?;

        let mined = Mined {
            block_id: receipt.block_id,
            nonce: block.nonce,
            size,
            score: block.score()?,
        };

        info!("Mined block {} in {:?}", mined.block_id, start.elapsed());

        println!("{}", serde_json::to_string_pretty(&mined)?);

        Ok(())
    }
}

/// Payload sending `utxo` back to its owner.
fn self_transfer(parameters: &ProtocolParameters, utxo: &Utxo) -> Result<TransactionPayload> {
    let address = utxo.output().address();

    let mut builder = SpamBuilder::new(address, parameters.clone(), DEFAULT_TAG, &["mine".into()]);

    ensure!(builder.add_input(utxo), "transaction has no room for an input");
    ensure!(
        builder.add_output(Output::basic(address, utxo.output().amount())),
        "transaction has no room for an output"
    );

    builder.build().context("failed to build transaction")
}
