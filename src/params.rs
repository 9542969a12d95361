//! Protocol parameters shared by prover and verifier.

use std::ops::Range;

use errors::ProofError;

/// The immutable parameter set every component is constructed from.
///
/// The witness bitstream of length [`witness_len`](ProtocolParams::witness_len)
/// is laid out as five contiguous regions: the encryption randomness `U`,
/// the error terms `E1` and `E2` (`d·b` bits each), the message `M`
/// (`d·b_prime` bits) and the quotient `R` (`2·d·b1` bits). Each value is
/// stored as its two's-complement bits, least significant first.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolParams {
    /// Ring dimension `D`.
    pub d: usize,
    /// Lattice ciphertext modulus `Q`.
    pub q: i32,
    /// Plaintext modulus `T`.
    pub t: i32,
    /// Bit width `B` of the encryption randomness and error terms.
    pub b: usize,
    /// Bit width of the message coefficients.
    pub b_prime: usize,
    /// Bit width `B1` of the quotient coefficients.
    pub b1: usize,
    /// Base in which message chunks are read as puzzle exponents.
    pub step: u32,
    /// Number of message coefficients per puzzle point.
    pub chunk_len: usize,
}

impl Default for ProtocolParams {
    fn default() -> Self {
        ProtocolParams {
            d: 1024,
            q: 65536,
            t: 8,
            b: 1,
            b_prime: 2,
            b1: 11,
            step: 16,
            chunk_len: 64,
        }
    }
}

impl ProtocolParams {
    /// Checks that the parameters describe a consistent layout.
    pub fn validate(&self) -> Result<(), ProofError> {
        if self.d == 0 || self.chunk_len == 0 || self.d % self.chunk_len != 0 {
            return Err(ProofError::InvalidParameters(
                "ring dimension must be a positive multiple of the chunk length",
            ));
        }
        for &w in &[self.b, self.b_prime, self.b1] {
            if w == 0 || w > 31 {
                return Err(ProofError::InvalidParameters("bit widths must lie in 1..=31"));
            }
        }
        if self.q <= 0 || self.q % 2 != 0 {
            return Err(ProofError::InvalidParameters("lattice modulus must be positive and even"));
        }
        if self.t <= 0 || self.q % self.t != 0 {
            return Err(ProofError::InvalidParameters(
                "plaintext modulus must divide the lattice modulus",
            ));
        }
        if !self.step.is_power_of_two() || self.step < 2 || self.step > 256 {
            return Err(ProofError::InvalidParameters("step must be a power of two in 2..=256"));
        }
        Ok(())
    }

    /// `Delta = Q / T`, the plaintext scaling factor.
    pub fn delta(&self) -> i32 {
        self.q / self.t
    }

    /// `L`, the length of the witness bitstream.
    pub fn witness_len(&self) -> usize {
        3 * self.d * self.b + self.d * self.b_prime + 2 * self.d * self.b1
    }

    /// `LP`, the witness length padded to a power of two.
    pub fn padded_len(&self) -> usize {
        self.witness_len().next_power_of_two()
    }

    /// Bit range of the message region.
    pub fn message_window(&self) -> Range<usize> {
        let start = 3 * self.d * self.b;
        start..start + self.message_len()
    }

    /// Length of the message region.
    pub fn message_len(&self) -> usize {
        self.d * self.b_prime
    }

    /// Length of the message region padded to a power of two.
    pub fn message_padded_len(&self) -> usize {
        self.message_len().next_power_of_two()
    }

    /// Offset of the quotient region.
    pub fn quotient_offset(&self) -> usize {
        3 * self.d * self.b + self.d * self.b_prime
    }

    /// Number of puzzle points, one per message chunk.
    pub fn puzzle_count(&self) -> usize {
        self.d / self.chunk_len
    }

    /// Number of folding rounds in the first sub-proof.
    pub fn witness_rounds(&self) -> usize {
        self.padded_len().trailing_zeros() as usize
    }

    /// Number of folding rounds in the second sub-proof.
    pub fn message_rounds(&self) -> usize {
        self.message_padded_len().trailing_zeros() as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_layout() {
        let p = ProtocolParams::default();
        assert!(p.validate().is_ok());
        assert_eq!(p.delta(), 8192);
        assert_eq!(p.witness_len(), 27648);
        assert_eq!(p.padded_len(), 32768);
        assert_eq!(p.message_window(), 3072..5120);
        assert_eq!(p.quotient_offset(), 5120);
        assert_eq!(p.puzzle_count(), 16);
        assert_eq!(p.witness_rounds(), 15);
        assert_eq!(p.message_rounds(), 11);
    }

    #[test]
    fn rejects_inconsistent_parameters() {
        let mut p = ProtocolParams::default();
        p.chunk_len = 100;
        assert!(p.validate().is_err());

        let mut p = ProtocolParams::default();
        p.t = 7;
        assert!(p.validate().is_err());

        let mut p = ProtocolParams::default();
        p.b1 = 0;
        assert!(p.validate().is_err());

        let mut p = ProtocolParams::default();
        p.step = 10;
        assert!(p.validate().is_err());
    }

    #[test]
    fn params_serde_round_trip() {
        let p = ProtocolParams::default();
        let bytes = bincode::serialize(&p).unwrap();
        let q: ProtocolParams = bincode::deserialize(&bytes).unwrap();
        assert_eq!(p, q);
    }
}
