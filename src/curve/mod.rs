//! The group and scalar-field operations the proof system is written
//! against.
//!
//! Everything above this module is generic over [`Group`]; the concrete
//! curves live in the backend submodules. The reference curve is secp256k1,
//! whose wire encodings (64-byte `x ‖ y`, 33-byte `0x02|parity ‖ x`) are the
//! proof format; Ristretto255 is provided as a second backend.

use std::fmt::Debug;
use std::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use errors::ProofError;

mod ristretto;
mod secp256k1;

pub use curve25519_dalek::ristretto::RistrettoPoint;
pub use k256::ProjectivePoint as Secp256k1Point;

/// Arithmetic in the prime-order scalar field of a [`Group`].
pub trait ScalarField:
    Copy
    + Clone
    + Debug
    + PartialEq
    + Send
    + Sync
    + 'static
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Neg<Output = Self>
    + AddAssign
    + SubAssign
    + MulAssign
{
    /// The additive identity.
    fn zero() -> Self;

    /// The multiplicative identity.
    fn one() -> Self;

    /// Embeds an unsigned integer.
    fn from_u64(v: u64) -> Self;

    /// Embeds a signed integer, mapping `-v` to `N - v`.
    fn from_i64(v: i64) -> Self {
        if v < 0 {
            -Self::from_u64(v.unsigned_abs())
        } else {
            Self::from_u64(v as u64)
        }
    }

    /// Interprets a 32-byte digest as a big-endian integer and reduces it
    /// modulo the group order.
    fn from_hash(digest: &[u8; 32]) -> Self;

    /// Reduces a 64-byte big-endian integer modulo the group order.
    fn from_uniform_bytes(bytes: &[u8; 64]) -> Self {
        let mut hi = [0u8; 32];
        let mut lo = [0u8; 32];
        hi.copy_from_slice(&bytes[..32]);
        lo.copy_from_slice(&bytes[32..]);
        // 2^256 mod N
        let shift = Self::from_hash(&[0xff; 32]) + Self::one();
        Self::from_hash(&hi) * shift + Self::from_hash(&lo)
    }

    /// Decodes a 32-byte big-endian scalar, rejecting values `>= N`.
    fn from_canonical_bytes(bytes: &[u8; 32]) -> Option<Self>;

    /// Encodes the scalar as 32 big-endian bytes.
    fn to_canonical_bytes(&self) -> [u8; 32];

    /// The multiplicative inverse; zero maps to zero.
    fn invert(&self) -> Self;
}

/// A prime-order group with the point encodings used on the wire.
pub trait Group:
    Copy
    + Clone
    + Debug
    + PartialEq
    + Send
    + Sync
    + 'static
    + Add<Output = Self>
    + Sub<Output = Self>
    + Neg<Output = Self>
    + AddAssign
{
    /// The scalar field of the group.
    type Scalar: ScalarField;

    /// Length of the fixed-width point encoding.
    const UNCOMPRESSED_SIZE: usize;

    /// Length of the compressed point encoding.
    const COMPRESSED_SIZE: usize;

    /// The identity element.
    fn identity() -> Self;

    /// Returns `true` for the identity element.
    fn is_identity(&self) -> bool;

    /// Multiplies the group's standard base point.
    fn base_mul(k: &Self::Scalar) -> Self;

    /// Multiplies `self` by `k`.
    fn scalar_mul(&self, k: &Self::Scalar) -> Self;

    /// Returns `2·self`.
    fn double(&self) -> Self {
        *self + *self
    }

    /// Computes `Σ scalars[i]·points[i]` in variable time.
    fn multiscalar_mul(scalars: &[Self::Scalar], points: &[Self]) -> Self {
        debug_assert_eq!(scalars.len(), points.len());
        let zero = Self::Scalar::zero();
        let one = Self::Scalar::one();
        let mut acc = Self::identity();
        for (k, p) in scalars.iter().zip(points.iter()) {
            if *k == zero {
                continue;
            }
            if *k == one {
                acc += *p;
            } else {
                acc += p.scalar_mul(k);
            }
        }
        acc
    }

    /// Maps 64 uniformly random bytes to a point, or `None` when this
    /// candidate does not land on the curve and the caller should draw
    /// another.
    fn hash_to_point(bytes: &[u8; 64]) -> Option<Self>;

    /// Appends the bytes the Fiat-Shamir transcript hashes for this point.
    fn append_transcript_bytes(&self, buf: &mut Vec<u8>);

    /// Encodes the point in the fixed-width format.
    fn to_uncompressed_bytes(&self) -> Vec<u8>;

    /// Encodes the point in the compressed format.
    fn to_compressed_bytes(&self) -> Vec<u8>;

    /// Decodes the fixed-width format.
    fn from_uncompressed_bytes(bytes: &[u8]) -> Result<Self, ProofError>;

    /// Decodes the compressed format.
    fn from_compressed_bytes(bytes: &[u8]) -> Result<Self, ProofError>;
}

/// Strips leading zero bytes, leaving the minimal big-endian form of an
/// integer (empty for zero).
pub(crate) fn minimal_be(bytes: &[u8]) -> &[u8] {
    let start = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len());
    &bytes[start..]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_be_strips_leading_zeros() {
        assert_eq!(minimal_be(&[0, 0, 1, 0]), &[1, 0]);
        assert_eq!(minimal_be(&[0, 0, 0]), &[] as &[u8]);
        assert_eq!(minimal_be(&[7]), &[7]);
    }

    fn check_field<S: ScalarField>() {
        let three = S::from_u64(3);
        assert_eq!(three * three.invert(), S::one());
        assert_eq!(S::from_i64(-3) + three, S::zero());
        assert_eq!(S::zero().invert(), S::zero());

        let bytes = three.to_canonical_bytes();
        assert_eq!(bytes[31], 3);
        assert_eq!(S::from_canonical_bytes(&bytes), Some(three));
        assert_eq!(S::from_canonical_bytes(&[0xff; 32]), None);

        let mut digest = [0u8; 32];
        digest[31] = 5;
        assert_eq!(S::from_hash(&digest), S::from_u64(5));

        let mut wide = [0u8; 64];
        wide[63] = 9;
        assert_eq!(S::from_uniform_bytes(&wide), S::from_u64(9));
        // 1·2^256 + 0
        wide[63] = 0;
        wide[31] = 1;
        let shift = S::from_hash(&[0xff; 32]) + S::one();
        assert_eq!(S::from_uniform_bytes(&wide), shift);
    }

    #[test]
    fn secp256k1_scalar_field() {
        check_field::<k256::Scalar>();
    }

    #[test]
    fn ristretto_scalar_field() {
        check_field::<curve25519_dalek::scalar::Scalar>();
    }

    fn check_multiscalar<G: Group>() {
        let points: Vec<G> = (1..6u64)
            .map(|i| G::base_mul(&G::Scalar::from_u64(i)))
            .collect();
        let scalars: Vec<G::Scalar> = vec![
            G::Scalar::zero(),
            G::Scalar::one(),
            G::Scalar::from_u64(7),
            G::Scalar::from_i64(-2),
            G::Scalar::from_u64(11),
        ];
        // Σ k_i·i = 0 + 2 + 21 - 8 + 55
        let expected = G::base_mul(&G::Scalar::from_u64(70));
        assert_eq!(G::multiscalar_mul(&scalars, &points), expected);
        assert!(G::identity().is_identity());
        assert_eq!(points[0].double(), points[1]);
        assert!((points[0] - points[0]).is_identity());
    }

    #[test]
    fn secp256k1_group_ops() {
        check_multiscalar::<Secp256k1Point>();
    }

    #[test]
    fn ristretto_group_ops() {
        check_multiscalar::<RistrettoPoint>();
    }
}
