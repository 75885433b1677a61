use super::*;

/// An address and the plain basic outputs it can spend.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct LedgerAccount {
    address: Address,
    basic_outputs: Vec<Utxo>,
}

impl LedgerAccount {
    pub(crate) fn new(address: Address, basic_outputs: Vec<Utxo>) -> Self {
        Self {
            address,
            basic_outputs,
        }
    }

    pub(crate) fn address(&self) -> Address {
        self.address
    }

    pub(crate) fn basic_outputs(&self) -> &[Utxo] {
        &self.basic_outputs
    }

    pub(crate) fn set_basic_outputs(&mut self, basic_outputs: Vec<Utxo>) {
        self.basic_outputs = basic_outputs;
    }

    pub(crate) fn add_outputs(&mut self, outputs: impl IntoIterator<Item = Utxo>) {
        self.basic_outputs.extend(outputs);
    }

    pub(crate) fn balance(&self) -> u64 {
        self.basic_outputs
            .iter()
            .map(|utxo| utxo.output().amount())
            .fold(0, u64::saturating_add)
    }
}

impl Display for LedgerAccount {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(
            f,
            "{} ({} outputs, {})",
            self.address,
            self.basic_outputs.len(),
            self.balance()
        )
    }
}
