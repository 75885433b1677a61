use super::*;

/// Width of the nonce suffix of a serialized block.
pub const NONCE_BYTES: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub protocol_version: u8,
    pub parents: Vec<BlockId>,
    pub payload: Option<TransactionPayload>,
    pub nonce: u64,
}

impl Block {
    pub const MAX_PARENTS: usize = 8;
    pub const MAX_SIZE: usize = 32 * 1024;

    pub fn new(
        protocol_version: u8,
        parents: Vec<BlockId>,
        payload: Option<TransactionPayload>,
    ) -> Self {
        let mut block = Self {
            protocol_version,
            parents: Vec::new(),
            payload,
            nonce: 0,
        };
        block.set_parents(parents);
        block
    }

    /// Replaces the parents, keeping them sorted and unique the way they are
    /// serialized.
    pub fn set_parents(&mut self, mut parents: Vec<BlockId>) {
        parents.sort_unstable();
        parents.dedup();
        self.parents = parents;
    }

    /// Serializes the block. The nonce is always the last `NONCE_BYTES`
    /// bytes, little endian.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        ensure!(!self.parents.is_empty(), NoParentsSnafu);

        ensure!(
            self.parents.len() <= Self::MAX_PARENTS,
            TooManyParentsSnafu {
                count: self.parents.len(),
                max: Self::MAX_PARENTS,
            }
        );

        ensure!(
            self.parents.windows(2).all(|pair| pair[0] < pair[1]),
            UnsortedParentsSnafu
        );

        let mut bytes = Vec::new();

        self.pack(&mut bytes).map_err(|err| LedgerError::Write {
            kind: "block",
            message: err.to_string(),
        })?;

        ensure!(
            bytes.len() <= Self::MAX_SIZE,
            TooLargeSnafu {
                kind: "block",
                len: bytes.len(),
                max: Self::MAX_SIZE,
            }
        );

        Ok(bytes)
    }

    /// Serialized block without its nonce suffix, the data proof of work is
    /// done on.
    pub fn pow_payload(&self) -> Result<Vec<u8>> {
        let mut bytes = self.serialize()?;
        bytes.truncate(bytes.len() - NONCE_BYTES);
        Ok(bytes)
    }

    pub fn id(&self) -> Result<BlockId> {
        Ok(BlockId::new(
            sha256d::Hash::hash(&self.serialize()?).to_byte_array(),
        ))
    }

    pub fn score(&self) -> Result<f64> {
        Ok(score(&self.pow_payload()?, self.nonce))
    }
}

impl Pack for Block {
    fn pack<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_u8(self.protocol_version)?;

        writer.write_u8(self.parents.len() as u8)?;
        for parent in &self.parents {
            writer.write_all(parent.as_bytes())?;
        }

        match &self.payload {
            Some(payload) => {
                let mut bytes = Vec::new();
                payload.pack(&mut bytes)?;
                writer.write_u32::<LittleEndian>(bytes.len() as u32)?;
                writer.write_all(&bytes)?;
            }
            None => writer.write_u32::<LittleEndian>(0)?,
        }

        writer.write_u64::<LittleEndian>(self.nonce)
    }
}

#[cfg(test)]
mod tests {
    use {super::*, pretty_assertions::assert_eq};

    fn block(parents: usize) -> Block {
        Block::new(2, (0..parents).map(|_| BlockId::random()).collect(), None)
    }

    #[test]
    fn nonce_is_the_serialized_suffix() {
        let mut block = block(2);
        block.nonce = 0x0102_0304_0506_0708;

        let bytes = block.serialize().unwrap();
        let pow_payload = block.pow_payload().unwrap();

        assert_eq!(bytes.len(), pow_payload.len() + NONCE_BYTES);
        assert_eq!(&bytes[..pow_payload.len()], pow_payload.as_slice());
        assert_eq!(
            &bytes[pow_payload.len()..],
            &0x0102_0304_0506_0708u64.to_le_bytes()
        );
    }

    #[test]
    fn pow_payload_is_independent_of_nonce() {
        let mut block = block(1);
        let before = block.pow_payload().unwrap();
        block.nonce = u64::MAX;
        assert_eq!(block.pow_payload().unwrap(), before);
    }

    #[test]
    fn pow_payload_changes_with_parents() {
        let mut block = block(1);
        let before = block.pow_payload().unwrap();
        block.set_parents(vec![BlockId::random(), BlockId::random()]);
        assert_ne!(block.pow_payload().unwrap(), before);
    }

    #[test]
    fn parents_are_sorted_and_deduplicated() {
        let a = BlockId::new([1; 32]);
        let b = BlockId::new([2; 32]);
        let block = Block::new(2, vec![b, a, b], None);
        assert_eq!(block.parents, vec![a, b]);
    }

    #[test]
    fn serialize_requires_parents() {
        assert_eq!(block(0).serialize(), Err(LedgerError::NoParents));
    }

    #[test]
    fn serialize_rejects_too_many_parents() {
        assert_eq!(
            block(9).serialize(),
            Err(LedgerError::TooManyParents { count: 9, max: 8 })
        );
    }

    #[test]
    fn serialize_rejects_unsorted_parents() {
        let mut block = block(2);
        block.parents.reverse();
        assert_eq!(block.serialize(), Err(LedgerError::UnsortedParents));
    }
}
