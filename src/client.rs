use super::*;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub(crate) enum ClientError {
    #[snafu(display("block rejected: {reason}"))]
    Rejected { reason: String },

    #[snafu(display("no tips available"))]
    NoTips,
}

/// Indexer query for basic outputs owned by `address`. `Some(false)` filters
/// out outputs carrying the condition, `None` doesn't filter.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct BasicOutputsQuery {
    pub(crate) address: Address,
    pub(crate) has_expiration: Option<bool>,
    pub(crate) has_timelock: Option<bool>,
    pub(crate) has_storage_deposit_return: Option<bool>,
}

impl BasicOutputsQuery {
    /// Outputs the spammer can spend with nothing but the address signature.
    pub(crate) fn spendable(address: Address) -> Self {
        Self {
            address,
            has_expiration: Some(false),
            has_timelock: Some(false),
            has_storage_deposit_return: Some(false),
        }
    }

    pub(crate) fn matches(&self, output: &Output) -> bool {
        fn check(filter: Option<bool>, present: bool) -> bool {
            filter.is_none_or(|wanted| wanted == present)
        }

        let conditions = output.unlock_conditions();

        output.is_basic()
            && conditions.address == self.address
            && check(self.has_expiration, conditions.expiration.is_some())
            && check(self.has_timelock, conditions.timelock.is_some())
            && check(
                self.has_storage_deposit_return,
                conditions.storage_deposit_return.is_some(),
            )
    }
}

/// Outputs created by an accepted block. The remainder, if any, is not part
/// of `created`.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Receipt {
    pub(crate) block_id: BlockId,
    pub(crate) created: Vec<Utxo>,
    pub(crate) remainder: Option<Utxo>,
}

#[async_trait]
pub(crate) trait TipSource: Send + Sync {
    /// Current tips to reference as block parents.
    async fn tips(&self) -> Result<Vec<BlockId>, ClientError>;
}

#[async_trait]
pub(crate) trait Indexer: Send + Sync {
    async fn basic_outputs(&self, query: &BasicOutputsQuery) -> Result<Vec<Utxo>, ClientError>;
}

#[async_trait]
pub(crate) trait Submitter: Send + Sync {
    async fn submit(&self, block: Block) -> Result<Receipt, ClientError>;
}

pub(crate) trait LedgerClient: TipSource + Indexer + Submitter {
    fn protocol_parameters(&self) -> ProtocolParameters;
}
