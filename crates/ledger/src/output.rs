use super::*;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnlockConditions {
    pub address: Address,
    /// Unix time after which the output returns to the expiration address.
    pub expiration: Option<(Address, u32)>,
    /// Unix time before which the output can't be unlocked.
    pub timelock: Option<u32>,
    /// Amount that has to be returned to the given address when the output
    /// is consumed.
    pub storage_deposit_return: Option<(Address, u64)>,
}

impl UnlockConditions {
    pub fn address(address: Address) -> Self {
        Self {
            address,
            expiration: None,
            timelock: None,
            storage_deposit_return: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicOutput {
    pub amount: u64,
    pub native_tokens: NativeTokens,
    pub unlock_conditions: UnlockConditions,
}

impl BasicOutput {
    pub fn new(address: Address, amount: u64) -> Self {
        Self {
            amount,
            native_tokens: NativeTokens::new(),
            unlock_conditions: UnlockConditions::address(address),
        }
    }

    pub fn with_native_tokens(self, native_tokens: NativeTokens) -> Self {
        Self {
            native_tokens,
            ..self
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NftOutput {
    pub amount: u64,
    pub native_tokens: NativeTokens,
    pub nft_id: [u8; 32],
    pub unlock_conditions: UnlockConditions,
}

#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum Output {
    #[display("basic output of {}", _0.amount)]
    Basic(BasicOutput),
    #[display("nft output of {}", _0.amount)]
    Nft(NftOutput),
}

impl Output {
    pub const KIND_BASIC: u8 = 3;
    pub const KIND_NFT: u8 = 6;

    pub fn basic(address: Address, amount: u64) -> Self {
        Self::Basic(BasicOutput::new(address, amount))
    }

    pub fn kind(&self) -> u8 {
        match self {
            Self::Basic(_) => Self::KIND_BASIC,
            Self::Nft(_) => Self::KIND_NFT,
        }
    }

    pub fn amount(&self) -> u64 {
        match self {
            Self::Basic(output) => output.amount,
            Self::Nft(output) => output.amount,
        }
    }

    pub fn native_tokens(&self) -> &NativeTokens {
        match self {
            Self::Basic(output) => &output.native_tokens,
            Self::Nft(output) => &output.native_tokens,
        }
    }

    pub fn unlock_conditions(&self) -> &UnlockConditions {
        match self {
            Self::Basic(output) => &output.unlock_conditions,
            Self::Nft(output) => &output.unlock_conditions,
        }
    }

    pub fn address(&self) -> Address {
        self.unlock_conditions().address
    }

    pub fn is_basic(&self) -> bool {
        matches!(self, Self::Basic(_))
    }

    /// Copy of this output owned by `address`; amount, tokens and every other
    /// unlock condition are kept.
    pub fn with_address(&self, address: Address) -> Self {
        let mut output = self.clone();

        match &mut output {
            Self::Basic(basic) => basic.unlock_conditions.address = address,
            Self::Nft(nft) => nft.unlock_conditions.address = address,
        }

        output
    }
}

impl Pack for UnlockConditions {
    fn pack<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(self.address.as_bytes())?;

        match self.expiration {
            Some((address, time)) => {
                writer.write_u8(1)?;
                writer.write_all(address.as_bytes())?;
                writer.write_u32::<LittleEndian>(time)?;
            }
            None => writer.write_u8(0)?,
        }

        match self.timelock {
            Some(time) => {
                writer.write_u8(1)?;
                writer.write_u32::<LittleEndian>(time)?;
            }
            None => writer.write_u8(0)?,
        }

        match self.storage_deposit_return {
            Some((address, amount)) => {
                writer.write_u8(1)?;
                writer.write_all(address.as_bytes())?;
                writer.write_u64::<LittleEndian>(amount)?;
            }
            None => writer.write_u8(0)?,
        }

        Ok(())
    }
}

impl Pack for NativeTokens {
    fn pack<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_u8(self.len().min(u8::MAX.into()) as u8)?;

        for (id, amount) in self.iter() {
            writer.write_all(id.as_bytes())?;
            writer.write_all(&amount.to_little_endian())?;
        }

        Ok(())
    }
}

impl Pack for Output {
    fn pack<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_u8(self.kind())?;
        writer.write_u64::<LittleEndian>(self.amount())?;
        self.native_tokens().pack(writer)?;

        if let Self::Nft(nft) = self {
            writer.write_all(&nft.nft_id)?;
        }

        self.unlock_conditions().pack(writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn packed(output: &Output) -> Vec<u8> {
        let mut bytes = Vec::new();
        output.pack(&mut bytes).unwrap();
        bytes
    }

    #[test]
    fn with_address_keeps_tokens_and_amount() {
        let token = TokenId::random();
        let output = Output::Basic(
            BasicOutput::new(Address::random(), 1_000)
                .with_native_tokens(NativeTokens::new().with(token, U256::from(10u64))),
        );

        let receiver = Address::random();
        let moved = output.with_address(receiver);

        assert_eq!(moved.address(), receiver);
        assert_eq!(moved.amount(), 1_000);
        assert_eq!(moved.native_tokens(), output.native_tokens());
        assert_ne!(moved, output);
    }

    #[test]
    fn packing_depends_on_address() {
        let a = Output::basic(Address::new([1; 32]), 5);
        let b = a.with_address(Address::new([2; 32]));
        assert_eq!(packed(&a).len(), packed(&b).len());
        assert_ne!(packed(&a), packed(&b));
    }

    #[test]
    fn nft_outputs_carry_their_id() {
        let basic = Output::basic(Address::new([1; 32]), 5);
        let nft = Output::Nft(NftOutput {
            amount: 5,
            native_tokens: NativeTokens::new(),
            nft_id: [9; 32],
            unlock_conditions: UnlockConditions::address(Address::new([1; 32])),
        });

        assert_eq!(packed(&nft).len(), packed(&basic).len() + 32);
        assert_eq!(packed(&nft)[0], Output::KIND_NFT);
        assert!(!nft.is_basic());
    }
}
