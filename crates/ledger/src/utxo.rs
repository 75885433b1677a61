use super::*;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utxo {
    id: OutputId,
    output: Output,
}

impl Utxo {
    pub fn new(id: OutputId, output: Output) -> Self {
        Self { id, output }
    }

    pub fn id(&self) -> OutputId {
        self.id
    }

    pub fn output(&self) -> &Output {
        &self.output
    }

    /// True for basic outputs that carry no native tokens.
    pub fn is_plain_basic(&self) -> bool {
        self.output.is_basic() && self.output.native_tokens().is_empty()
    }
}

impl fmt::Display for Utxo {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.id, self.output)
    }
}
