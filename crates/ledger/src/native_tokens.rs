use super::*;

/// Foundry id of the minting foundry: the 32 byte alias address plus serial
/// number and token scheme.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, DeserializeFromStr, SerializeDisplay,
)]
pub struct TokenId([u8; 38]);

impl TokenId {
    pub const LEN: usize = 38;

    pub fn new(bytes: [u8; 38]) -> Self {
        Self(bytes)
    }

    pub fn random() -> Self {
        Self(random_bytes())
    }

    pub fn as_bytes(&self) -> &[u8; 38] {
        &self.0
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for TokenId {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode_hex(s.strip_prefix("0x").unwrap_or(s), "token id").map(Self)
    }
}

/// Native tokens held by an output, keyed and ordered by token id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NativeTokens(BTreeMap<TokenId, U256>);

impl NativeTokens {
    pub const MAX: usize = 64;

    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `amount` to the balance of `id`. Zero amounts are not stored so an
    /// output with only zero balances stays a plain output.
    pub fn add(&mut self, id: TokenId, amount: U256) {
        if amount.is_zero() {
            return;
        }

        let balance = self.0.entry(id).or_insert_with(U256::zero);
        *balance = balance.saturating_add(amount);
    }

    pub fn with(mut self, id: TokenId, amount: U256) -> Self {
        self.add(id, amount);
        self
    }

    pub fn merge(&mut self, other: &NativeTokens) {
        for (id, amount) in other.iter() {
            self.add(*id, *amount);
        }
    }

    pub fn get(&self, id: &TokenId) -> Option<U256> {
        self.0.get(id).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TokenId, &U256)> {
        self.0.iter()
    }
}
