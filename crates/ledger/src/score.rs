use {super::*, byteorder::ByteOrder};

/// Digest of the pre-nonce block bytes. Computed once per mining attempt.
pub fn pow_digest(pow_payload: &[u8]) -> [u8; 32] {
    sha256d::Hash::hash(pow_payload).to_byte_array()
}

/// Proof-of-work score of `nonce` for a block of `block_len` bytes whose
/// pre-nonce digest is `digest`.
///
/// The score is `2^z / block_len` where `z` is the number of leading zero bits
/// of `sha256d(digest || nonce)`, so larger blocks need proportionally more
/// work to reach the same target.
pub fn score_with_digest(digest: &[u8; 32], nonce: u64, block_len: usize) -> f64 {
    let mut buffer = [0u8; 32 + NONCE_BYTES];
    buffer[..32].copy_from_slice(digest);
    LittleEndian::write_u64(&mut buffer[32..], nonce);

    let hash = sha256d::Hash::hash(&buffer).to_byte_array();

    2f64.powi(leading_zero_bits(&hash) as i32) / block_len.max(1) as f64
}

/// Score of `nonce` appended to `pow_payload`.
pub fn score(pow_payload: &[u8], nonce: u64) -> f64 {
    score_with_digest(
        &pow_digest(pow_payload),
        nonce,
        pow_payload.len() + NONCE_BYTES,
    )
}

fn leading_zero_bits(hash: &[u8]) -> u32 {
    let mut zeros = 0;

    for byte in hash {
        zeros += byte.leading_zeros();
        if *byte != 0 {
            break;
        }
    }

    zeros
}
