use super::*;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaggedData {
    pub tag: Vec<u8>,
    pub data: Vec<u8>,
}

impl TaggedData {
    pub const MAX_TAG_LEN: usize = 64;
}

/// A transaction as the spammer hands it to the network. The
/// remainder is kept apart from the explicit outputs so the submitter can tell
/// which created output flows back to the sender; on the ledger it is simply
/// the last output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionPayload {
    pub network_id: u64,
    pub inputs: Vec<OutputId>,
    pub outputs: Vec<Output>,
    pub remainder: Option<Output>,
    pub tagged_data: Option<TaggedData>,
}

impl TransactionPayload {
    pub const KIND: u8 = 6;

    /// Explicit outputs followed by the remainder, in ledger index order.
    pub fn all_outputs(&self) -> impl Iterator<Item = &Output> {
        self.outputs.iter().chain(self.remainder.iter())
    }

    pub fn output_count(&self) -> usize {
        self.outputs.len() + usize::from(self.remainder.is_some())
    }

    pub fn remainder_index(&self) -> Option<u16> {
        self.remainder
            .as_ref()
            .map(|_| u16::try_from(self.outputs.len()).unwrap_or(u16::MAX))
    }

    pub fn validate(&self, parameters: &ProtocolParameters) -> Result {
        ensure!(
            self.inputs.len() <= parameters.max_inputs,
            TooManySnafu {
                kind: "inputs",
                count: self.inputs.len(),
                max: parameters.max_inputs,
            }
        );

        ensure!(
            self.output_count() <= parameters.max_outputs,
            TooManySnafu {
                kind: "outputs",
                count: self.output_count(),
                max: parameters.max_outputs,
            }
        );

        for output in self.all_outputs() {
            ensure!(
                output.native_tokens().len() <= NativeTokens::MAX,
                TooManySnafu {
                    kind: "native tokens",
                    count: output.native_tokens().len(),
                    max: NativeTokens::MAX,
                }
            );
        }

        if let Some(tagged_data) = &self.tagged_data {
            ensure!(
                tagged_data.tag.len() <= TaggedData::MAX_TAG_LEN,
                TooLargeSnafu {
                    kind: "tag",
                    len: tagged_data.tag.len(),
                    max: TaggedData::MAX_TAG_LEN,
                }
            );
        }

        Ok(())
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        self.pack(&mut bytes).map_err(|err| LedgerError::Write {
            kind: "transaction",
            message: err.to_string(),
        })?;
        Ok(bytes)
    }

    pub fn id(&self) -> Result<TransactionId> {
        Ok(TransactionId::new(
            sha256d::Hash::hash(&self.to_bytes()?).to_byte_array(),
        ))
    }
}

impl Pack for TransactionPayload {
    fn pack<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_u8(Self::KIND)?;
        writer.write_u64::<LittleEndian>(self.network_id)?;

        writer.write_u16::<LittleEndian>(self.inputs.len() as u16)?;
        for input in &self.inputs {
            writer.write_all(&input.to_bytes())?;
        }

        writer.write_u16::<LittleEndian>(self.output_count() as u16)?;
        for output in self.all_outputs() {
            output.pack(writer)?;
        }

        match &self.tagged_data {
            Some(tagged_data) => {
                writer.write_u8(tagged_data.tag.len() as u8)?;
                writer.write_all(&tagged_data.tag)?;
                writer.write_u32::<LittleEndian>(tagged_data.data.len() as u32)?;
                writer.write_all(&tagged_data.data)?;
            }
            None => writer.write_u8(0)?,
        }

        Ok(())
    }
}
