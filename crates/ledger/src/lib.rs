use {
    bitcoin::hashes::{Hash, sha256d},
    byteorder::{LittleEndian, WriteBytesExt},
    derive_more::Display,
    primitive_types::U256,
    rand::RngCore,
    serde::{Deserialize, Serialize},
    serde_with::{DeserializeFromStr, SerializeDisplay},
    snafu::{Snafu, ensure},
    std::{
        collections::BTreeMap,
        fmt::{self, Formatter},
        io::{self, Write},
        str::FromStr,
    },
};

pub use {
    address::Address,
    block::{Block, NONCE_BYTES},
    block_id::BlockId,
    error::{LedgerError, Result},
    native_tokens::{NativeTokens, TokenId},
    output::{BasicOutput, NftOutput, Output, UnlockConditions},
    output_id::{OutputId, TransactionId},
    protocol::ProtocolParameters,
    score::{pow_digest, score, score_with_digest},
    transaction::{TaggedData, TransactionPayload},
    utxo::Utxo,
};

use error::*;

mod address;
mod block;
mod block_id;
mod error;
mod native_tokens;
mod output;
mod output_id;
mod protocol;
mod score;
mod transaction;
mod utxo;

/// Deterministic little-endian encoding shared by everything that ends up in a
/// block.
trait Pack {
    fn pack<W: Write>(&self, writer: &mut W) -> io::Result<()>;
}

fn random_bytes<const N: usize>() -> [u8; N] {
    let mut bytes = [0u8; N];
    rand::rng().fill_bytes(&mut bytes);
    bytes
}

fn decode_hex<const N: usize>(s: &str, kind: &'static str) -> Result<[u8; N]> {
    let bytes = hex::decode(s).map_err(|err| LedgerError::Parse {
        message: format!("invalid {kind} hex string '{s}': {err}"),
    })?;

    <[u8; N]>::try_from(bytes.as_slice()).map_err(|_| LedgerError::Parse {
        message: format!("{kind} must be {N} bytes, got {}", bytes.len()),
    })
}
