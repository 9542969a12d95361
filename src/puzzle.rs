//! Puzzle points: the message read in chunks of `chunk_len` base-`step`
//! digits, each chunk becoming the discrete log of a public point.
//!
//! Chunk `j` of the plaintext `m` gives the secret
//! `s_j = Σ_k m[j·chunk_len + k]·step^k mod N` and the puzzle point
//! `Y_j = s_j·Base`.

use curve::{Group, ScalarField};
use errors::ProofError;
use params::ProtocolParams;

/// `Σ_k chunk[k]·step^k` reduced modulo the group order.
pub fn puzzle_secret<S: ScalarField>(params: &ProtocolParams, chunk: &[i32]) -> S {
    let step = S::from_u64(params.step as u64);
    // Horner, most significant digit first.
    chunk
        .iter()
        .rev()
        .fold(S::zero(), |acc, digit| acc * step + S::from_i64(*digit as i64))
}

/// The puzzle points of a plaintext, one per chunk.
pub fn puzzle_points<G: Group>(
    params: &ProtocolParams,
    message: &[i32],
) -> Result<Vec<G>, ProofError> {
    if message.len() != params.d {
        return Err(ProofError::InvalidInputLength {
            expected: params.d,
            actual: message.len(),
        });
    }
    Ok(message
        .chunks(params.chunk_len)
        .map(|chunk| G::base_mul(&puzzle_secret(params, chunk)))
        .collect())
}

/// Recovers the digits of a chunk from its revealed secret.
///
/// Digits are read in balanced form, each in `[-step/2, step/2)`, which is
/// exact for every plaintext coefficient the encryption can carry.
pub fn recover_chunk<S: ScalarField>(params: &ProtocolParams, secret: &S) -> Vec<i32> {
    let bytes = secret.to_canonical_bytes();
    let negated = (-*secret).to_canonical_bytes();
    let negative = bytes > negated;
    let mut value = if negative { negated } else { bytes };

    let step = params.step as i32;
    let shift = params.step.trailing_zeros();
    let mut carry = 0i32;
    let mut digits = Vec::with_capacity(params.chunk_len);
    for _ in 0..params.chunk_len {
        let mut digit = (value[31] as i32 & (step - 1)) + carry;
        if digit >= step / 2 {
            digit -= step;
            carry = 1;
        } else {
            carry = 0;
        }
        digits.push(digit);
        shift_right(&mut value, shift);
    }

    if negative {
        for d in digits.iter_mut() {
            *d = -*d;
        }
    }
    digits
}

/// Serializes a puzzle list in the fixed-width point format.
pub fn puzzles_to_bytes<G: Group>(puzzles: &[G]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(puzzles.len() * G::UNCOMPRESSED_SIZE);
    for p in puzzles.iter() {
        buf.extend_from_slice(&p.to_uncompressed_bytes());
    }
    buf
}

/// Serializes a puzzle list in the compressed point format.
pub fn puzzles_to_compressed_bytes<G: Group>(puzzles: &[G]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(puzzles.len() * G::COMPRESSED_SIZE);
    for p in puzzles.iter() {
        buf.extend_from_slice(&p.to_compressed_bytes());
    }
    buf
}

/// Deserializes exactly [`puzzle_count`](ProtocolParams::puzzle_count)
/// fixed-width points.
pub fn puzzles_from_bytes<G: Group>(
    params: &ProtocolParams,
    slice: &[u8],
) -> Result<Vec<G>, ProofError> {
    decode_points(params, slice, G::UNCOMPRESSED_SIZE, G::from_uncompressed_bytes)
}

/// Deserializes exactly [`puzzle_count`](ProtocolParams::puzzle_count)
/// compressed points.
pub fn puzzles_from_compressed_bytes<G: Group>(
    params: &ProtocolParams,
    slice: &[u8],
) -> Result<Vec<G>, ProofError> {
    decode_points(params, slice, G::COMPRESSED_SIZE, G::from_compressed_bytes)
}

fn decode_points<G, F>(
    params: &ProtocolParams,
    slice: &[u8],
    size: usize,
    decode: F,
) -> Result<Vec<G>, ProofError>
where
    G: Group,
    F: Fn(&[u8]) -> Result<G, ProofError>,
{
    if slice.len() != params.puzzle_count() * size {
        return Err(ProofError::FormatError);
    }
    slice.chunks(size).map(decode).collect()
}

/// Shifts a big-endian integer right by `bits <= 8`.
fn shift_right(value: &mut [u8; 32], bits: u32) {
    let mask = ((1u16 << bits) - 1) as u8;
    let mut incoming = 0u8;
    for byte in value.iter_mut() {
        let outgoing = *byte & mask;
        *byte = ((*byte as u16 >> bits) as u8) | ((incoming as u16) << (8 - bits)) as u8;
        incoming = outgoing;
    }
}
