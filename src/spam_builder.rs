use {super::*, snafu::ResultExt};

/// Accumulates the inputs and outputs of one spam transaction, never beyond
/// the protocol maxima. Clone it to try an extension without touching the
/// original.
#[derive(Debug, Clone)]
pub(crate) struct SpamBuilder {
    input_ids: HashSet<OutputId>,
    inputs: Vec<Utxo>,
    outputs: Vec<Output>,
    parameters: ProtocolParameters,
    sender: Address,
    tagged_data: TaggedData,
}

impl SpamBuilder {
    pub(crate) fn new(
        sender: Address,
        parameters: ProtocolParameters,
        tag: &str,
        additional_tags: &[String],
    ) -> Self {
        let mut tag = tag.as_bytes().to_vec();
        tag.truncate(TaggedData::MAX_TAG_LEN);

        Self {
            input_ids: HashSet::new(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            parameters,
            sender,
            tagged_data: TaggedData {
                tag,
                data: additional_tags.join(" ").into_bytes(),
            },
        }
    }

    pub(crate) fn add_input(&mut self, utxo: &Utxo) -> bool {
        if self.inputs.len() >= self.parameters.max_inputs || self.input_ids.contains(&utxo.id()) {
            return false;
        }

        self.input_ids.insert(utxo.id());
        self.inputs.push(utxo.clone());
        true
    }

    pub(crate) fn add_output(&mut self, output: Output) -> bool {
        if self.outputs.len() >= self.parameters.max_outputs {
            return false;
        }

        self.outputs.push(output);
        true
    }

    pub(crate) fn consumed_inputs_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    pub(crate) fn inputs(&self) -> &[Utxo] {
        &self.inputs
    }

    #[cfg(test)]
    pub(crate) fn outputs(&self) -> &[Output] {
        &self.outputs
    }

    pub(crate) fn input_amount(&self) -> u64 {
        self.inputs
            .iter()
            .map(|utxo| utxo.output().amount())
            .fold(0, u64::saturating_add)
    }

    #[cfg(test)]
    pub(crate) fn sender(&self) -> Address {
        self.sender
    }

    /// Assembles the transaction. Value not assigned to an explicit output
    /// goes back to the sender as the remainder, which takes one output slot.
    pub(crate) fn build(&self) -> Result<TransactionPayload, SpamError> {
        let available = self.input_amount();

        let required = self
            .outputs
            .iter()
            .map(Output::amount)
            .fold(0, u64::saturating_add);

        if required > available {
            return Err(SpamError::InsufficientFunds {
                available,
                required,
            });
        }

        let mut consumed_tokens = NativeTokens::new();
        for utxo in &self.inputs {
            consumed_tokens.merge(utxo.output().native_tokens());
        }

        let mut created_tokens = NativeTokens::new();
        for output in &self.outputs {
            created_tokens.merge(output.native_tokens());
        }

        if consumed_tokens != created_tokens {
            return Err(SpamError::UnbalancedNativeTokens);
        }

        let remainder = match available - required {
            0 => None,
            amount if self.outputs.len() < self.parameters.max_outputs => {
                Some(Output::basic(self.sender, amount))
            }
            _ => {
                return Err(SpamError::MaxOutputsExceeded { kind: "remainder" });
            }
        };

        let payload = TransactionPayload {
            network_id: self.parameters.network_id,
            inputs: self.inputs.iter().map(Utxo::id).collect(),
            outputs: self.outputs.clone(),
            remainder,
            tagged_data: Some(self.tagged_data.clone()),
        };

        payload
            .validate(&self.parameters)
            .context(spammer::InvalidPayloadSnafu)?;

        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use {super::*, pretty_assertions::assert_eq};

    fn parameters(max_inputs: usize, max_outputs: usize) -> ProtocolParameters {
        ProtocolParameters {
            max_inputs,
            max_outputs,
            ..Default::default()
        }
    }

    fn builder(max_inputs: usize, max_outputs: usize) -> SpamBuilder {
        SpamBuilder::new(
            Address::new([1; 32]),
            parameters(max_inputs, max_outputs),
            DEFAULT_TAG,
            &[],
        )
    }

    fn utxo(amount: u64) -> Utxo {
        Utxo::new(
            OutputId::new(TransactionId::random(), 0),
            Output::basic(Address::new([1; 32]), amount),
        )
    }

    #[test]
    fn inputs_are_capped() {
        let mut builder = builder(2, 4);

        assert!(builder.add_input(&utxo(1)));
        assert!(builder.add_input(&utxo(2)));
        assert!(!builder.add_input(&utxo(3)));

        assert_eq!(builder.inputs().len(), 2);
        assert_eq!(builder.input_amount(), 3);
    }

    #[test]
    fn outputs_are_capped() {
        let mut builder = builder(4, 1);
        let receiver = Address::random();

        assert!(builder.add_output(Output::basic(receiver, 1)));
        assert!(!builder.add_output(Output::basic(receiver, 2)));

        assert_eq!(builder.outputs(), &[Output::basic(receiver, 1)]);
    }

    #[test]
    fn duplicate_inputs_are_rejected() {
        let mut builder = builder(4, 4);
        let utxo = utxo(5);

        assert!(builder.add_input(&utxo));
        assert!(!builder.add_input(&utxo));
        assert_eq!(builder.inputs().len(), 1);
    }

    #[test]
    fn clones_are_independent() {
        let mut base = builder(4, 4);
        base.add_input(&utxo(1));

        let mut branch = base.clone();
        branch.add_input(&utxo(2));
        branch.add_output(Output::basic(Address::random(), 3));

        assert_eq!(base.inputs().len(), 1);
        assert!(base.outputs().is_empty());
        assert_eq!(branch.inputs().len(), 2);
        assert_eq!(branch.outputs().len(), 1);
    }

    #[test]
    fn consumed_inputs_empty() {
        let mut builder = builder(4, 4);
        assert!(builder.consumed_inputs_empty());
        builder.add_input(&utxo(1));
        assert!(!builder.consumed_inputs_empty());
    }

    #[test]
    fn surplus_becomes_remainder_to_sender() {
        let mut builder = builder(4, 4);
        let receiver = Address::random();

        builder.add_input(&utxo(10));
        builder.add_output(Output::basic(receiver, 4));

        let payload = builder.build().unwrap();

        assert_eq!(payload.outputs, vec![Output::basic(receiver, 4)]);
        assert_eq!(payload.remainder, Some(Output::basic(builder.sender(), 6)));
    }

    #[test]
    fn exact_spend_has_no_remainder() {
        let mut builder = builder(4, 1);
        builder.add_input(&utxo(10));
        builder.add_output(Output::basic(Address::random(), 10));

        assert_eq!(builder.build().unwrap().remainder, None);
    }

    #[test]
    fn remainder_needs_a_free_output_slot() {
        let mut builder = builder(4, 1);
        builder.add_input(&utxo(10));
        builder.add_output(Output::basic(Address::random(), 4));

        assert!(matches!(
            builder.build(),
            Err(SpamError::MaxOutputsExceeded { kind: "remainder" })
        ));
    }

    #[test]
    fn overspending_is_rejected() {
        let mut builder = builder(4, 4);
        builder.add_input(&utxo(1));
        builder.add_output(Output::basic(Address::random(), 2));

        assert!(matches!(
            builder.build(),
            Err(SpamError::InsufficientFunds {
                available: 1,
                required: 2
            })
        ));
    }

    #[test]
    fn native_tokens_must_be_carried_over() {
        let token = TokenId::random();
        let tokens = NativeTokens::new().with(token, U256::from(5u64));
        let input = Utxo::new(
            OutputId::new(TransactionId::random(), 0),
            Output::Basic(
                ledger::BasicOutput::new(Address::new([1; 32]), 10).with_native_tokens(tokens),
            ),
        );

        let mut dropped = builder(4, 4);
        dropped.add_input(&input);
        dropped.add_output(Output::basic(Address::random(), 10));
        assert!(matches!(
            dropped.build(),
            Err(SpamError::UnbalancedNativeTokens)
        ));

        let mut carried = builder(4, 4);
        carried.add_input(&input);
        carried.add_output(input.output().with_address(Address::random()));
        assert!(carried.build().is_ok());
    }

    #[test]
    fn tags_end_up_in_tagged_data() {
        let mut builder = SpamBuilder::new(
            Address::random(),
            ProtocolParameters::default(),
            "spammer",
            &["basic".into(), "round-1".into()],
        );
        builder.add_input(&utxo(1));
        builder.add_output(Output::basic(Address::random(), 1));

        let tagged_data = builder.build().unwrap().tagged_data.unwrap();
        assert_eq!(tagged_data.tag, b"spammer");
        assert_eq!(tagged_data.data, b"basic round-1");
    }
}
