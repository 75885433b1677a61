use {super::*, client::ClientError, std::mem};

/// In-process ledger: a UTXO set, a tip pool and block validation, enough to
/// drive the spammer without a node.
pub(crate) struct Devnet {
    parameters: ProtocolParameters,
    state: Mutex<State>,
}

struct State {
    blocks: u64,
    spent: HashSet<OutputId>,
    tips: VecDeque<BlockId>,
    utxos: Vec<Utxo>,
}

impl Devnet {
    pub(crate) fn new(parameters: ProtocolParameters) -> Self {
        Self {
            parameters,
            state: Mutex::new(State {
                blocks: 0,
                spent: HashSet::new(),
                tips: VecDeque::from([BlockId::new([0; 32])]),
                utxos: Vec::new(),
            }),
        }
    }

    /// Creates a basic output for `address` out of thin air.
    pub(crate) fn fund(&self, address: Address, amount: u64, native_tokens: NativeTokens) -> Utxo {
        let utxo = Utxo::new(
            OutputId::new(TransactionId::random(), 0),
            Output::Basic(ledger::BasicOutput::new(address, amount).with_native_tokens(native_tokens)),
        );

        self.state.lock().utxos.push(utxo.clone());

        utxo
    }

    pub(crate) fn blocks(&self) -> u64 {
        self.state.lock().blocks
    }

    #[cfg(test)]
    pub(crate) fn balance(&self, address: Address) -> u64 {
        self.state
            .lock()
            .utxos
            .iter()
            .filter(|utxo| utxo.output().address() == address)
            .map(|utxo| utxo.output().amount())
            .fold(0, u64::saturating_add)
    }

    fn reject(reason: impl Into<String>) -> ClientError {
        ClientError::Rejected {
            reason: reason.into(),
        }
    }

    fn check_block(&self, block: &Block) -> Result<(), ClientError> {
        if block.protocol_version != self.parameters.protocol_version {
            return Err(Self::reject(format!(
                "protocol version {} does not match {}",
                block.protocol_version, self.parameters.protocol_version
            )));
        }

        let score = block.score().map_err(|err| Self::reject(err.to_string()))?;

        if score < self.parameters.min_pow_score {
            return Err(Self::reject(format!(
                "PoW score {score} below minimum {}",
                self.parameters.min_pow_score
            )));
        }

        Ok(())
    }

    fn check_payload(
        &self,
        state: &State,
        payload: &TransactionPayload,
    ) -> Result<Vec<Utxo>, ClientError> {
        if payload.network_id != self.parameters.network_id {
            return Err(Self::reject(format!(
                "network id {:#x} does not match {:#x}",
                payload.network_id, self.parameters.network_id
            )));
        }

        payload
            .validate(&self.parameters)
            .map_err(|err| Self::reject(err.to_string()))?;

        if payload.inputs.is_empty() {
            return Err(Self::reject("transaction has no inputs"));
        }

        let mut seen = HashSet::new();
        let mut consumed = Vec::with_capacity(payload.inputs.len());

        for input in &payload.inputs {
            if !seen.insert(*input) {
                return Err(Self::reject(format!("input {input} consumed twice")));
            }

            if state.spent.contains(input) {
                return Err(Self::reject(format!("input {input} already spent")));
            }

            let utxo = state
                .utxos
                .iter()
                .find(|utxo| utxo.id() == *input)
                .ok_or_else(|| Self::reject(format!("input {input} unknown")))?;

            consumed.push(utxo.clone());
        }

        let input_amount = consumed
            .iter()
            .map(|utxo| utxo.output().amount())
            .fold(0u64, u64::saturating_add);

        let output_amount = payload
            .all_outputs()
            .map(Output::amount)
            .fold(0u64, u64::saturating_add);

        if input_amount != output_amount {
            return Err(Self::reject(format!(
                "inputs hold {input_amount} but outputs hold {output_amount}"
            )));
        }

        let mut input_tokens = NativeTokens::new();
        for utxo in &consumed {
            input_tokens.merge(utxo.output().native_tokens());
        }

        let mut output_tokens = NativeTokens::new();
        for output in payload.all_outputs() {
            output_tokens.merge(output.native_tokens());
        }

        if input_tokens != output_tokens {
            return Err(Self::reject("native tokens are not balanced"));
        }

        Ok(consumed)
    }
}

#[async_trait]
impl TipSource for Devnet {
    async fn tips(&self) -> Result<Vec<BlockId>, ClientError> {
        let tips = self.state.lock().tips.iter().copied().collect::<Vec<BlockId>>();

        if tips.is_empty() {
            return Err(ClientError::NoTips);
        }

        Ok(tips)
    }
}

#[async_trait]
impl Indexer for Devnet {
    async fn basic_outputs(&self, query: &BasicOutputsQuery) -> Result<Vec<Utxo>, ClientError> {
        Ok(self
            .state
            .lock()
            .utxos
            .iter()
            .filter(|utxo| query.matches(utxo.output()))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl Submitter for Devnet {
    async fn submit(&self, block: Block) -> Result<Receipt, ClientError> {
        self.check_block(&block)?;

        let block_id = block.id().map_err(|err| Self::reject(err.to_string()))?;

        let mut state = self.state.lock();

        let mut receipt = Receipt {
            block_id,
            created: Vec::new(),
            remainder: None,
        };

        if let Some(payload) = &block.payload {
            self.check_payload(&state, payload)?;

            let transaction_id = payload.id().map_err(|err| Self::reject(err.to_string()))?;

            let inputs = payload.inputs.iter().copied().collect::<HashSet<OutputId>>();

            let (spent, unspent) = partition(mem::take(&mut state.utxos), |utxo| {
                (inputs.contains(&utxo.id()), false)
            });

            state.utxos = unspent;
            state.spent.extend(spent.iter().map(Utxo::id));

            for (index, output) in payload.all_outputs().enumerate() {
                let index = u16::try_from(index).map_err(|err| Self::reject(err.to_string()))?;
                let utxo = Utxo::new(OutputId::new(transaction_id, index), output.clone());

                state.utxos.push(utxo.clone());

                if payload.remainder_index() == Some(index) {
                    receipt.remainder = Some(utxo);
                } else {
                    receipt.created.push(utxo);
                }
            }
        }

        state.tips.retain(|tip| !block.parents.contains(tip));
        state.tips.push_back(block_id);
        while state.tips.len() > Block::MAX_PARENTS {
            state.tips.pop_front();
        }

        state.blocks += 1;

        debug!("Devnet accepted block {block_id}");

        Ok(receipt)
    }
}

impl LedgerClient for Devnet {
    fn protocol_parameters(&self) -> ProtocolParameters {
        self.parameters.clone()
    }
}
