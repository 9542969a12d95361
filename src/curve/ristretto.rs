//! Ristretto255 backend. Both wire formats are the canonical 32-byte
//! encoding, which is already compressed.

use curve25519_dalek::ristretto::{CompressedRistretto, RistrettoPoint};
use curve25519_dalek::scalar::Scalar;
use curve25519_dalek::traits::{Identity, IsIdentity, VartimeMultiscalarMul};

use super::{Group, ScalarField};
use errors::ProofError;
use util::read32;

impl ScalarField for Scalar {
    fn zero() -> Scalar {
        Scalar::ZERO
    }

    fn one() -> Scalar {
        Scalar::ONE
    }

    fn from_u64(v: u64) -> Scalar {
        Scalar::from(v)
    }

    fn from_hash(digest: &[u8; 32]) -> Scalar {
        let mut le = *digest;
        le.reverse();
        Scalar::from_bytes_mod_order(le)
    }

    fn from_uniform_bytes(bytes: &[u8; 64]) -> Scalar {
        let mut le = [0u8; 64];
        for (dst, src) in le.iter_mut().zip(bytes.iter().rev()) {
            *dst = *src;
        }
        Scalar::from_bytes_mod_order_wide(&le)
    }

    fn from_canonical_bytes(bytes: &[u8; 32]) -> Option<Scalar> {
        let mut le = *bytes;
        le.reverse();
        Option::from(Scalar::from_canonical_bytes(le))
    }

    fn to_canonical_bytes(&self) -> [u8; 32] {
        let mut be = self.to_bytes();
        be.reverse();
        be
    }

    fn invert(&self) -> Scalar {
        if *self == Scalar::ZERO {
            return Scalar::ZERO;
        }
        Scalar::invert(self)
    }
}

impl Group for RistrettoPoint {
    type Scalar = Scalar;

    const UNCOMPRESSED_SIZE: usize = 32;
    const COMPRESSED_SIZE: usize = 32;

    fn identity() -> RistrettoPoint {
        <RistrettoPoint as Identity>::identity()
    }

    fn is_identity(&self) -> bool {
        IsIdentity::is_identity(self)
    }

    fn base_mul(k: &Scalar) -> RistrettoPoint {
        RistrettoPoint::mul_base(k)
    }

    fn scalar_mul(&self, k: &Scalar) -> RistrettoPoint {
        self * k
    }

    fn multiscalar_mul(scalars: &[Scalar], points: &[RistrettoPoint]) -> RistrettoPoint {
        RistrettoPoint::vartime_multiscalar_mul(scalars.iter(), points.iter())
    }

    fn hash_to_point(bytes: &[u8; 64]) -> Option<RistrettoPoint> {
        Some(RistrettoPoint::from_uniform_bytes(bytes))
    }

    fn append_transcript_bytes(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(self.compress().as_bytes());
    }

    fn to_uncompressed_bytes(&self) -> Vec<u8> {
        self.compress().to_bytes().to_vec()
    }

    fn to_compressed_bytes(&self) -> Vec<u8> {
        self.compress().to_bytes().to_vec()
    }

    fn from_uncompressed_bytes(bytes: &[u8]) -> Result<RistrettoPoint, ProofError> {
        if bytes.len() != 32 {
            return Err(ProofError::FormatError);
        }
        CompressedRistretto(read32(bytes))
            .decompress()
            .ok_or(ProofError::FormatError)
    }

    fn from_compressed_bytes(bytes: &[u8]) -> Result<RistrettoPoint, ProofError> {
        Self::from_uncompressed_bytes(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn points_round_trip() {
        for i in 0..64u64 {
            let p = RistrettoPoint::base_mul(&Scalar::from(i));
            let bytes = p.to_compressed_bytes();
            assert_eq!(RistrettoPoint::from_compressed_bytes(&bytes), Ok(p));
        }
        assert!(RistrettoPoint::from_compressed_bytes(&[0xffu8; 32]).is_err());
        assert!(RistrettoPoint::from_compressed_bytes(&[0u8; 31]).is_err());
    }

    #[test]
    fn scalars_are_big_endian_on_the_wire() {
        let s = Scalar::from(0x0102u64);
        let be = s.to_canonical_bytes();
        assert_eq!(&be[30..], &[1, 2]);
        assert_eq!(<Scalar as ScalarField>::from_canonical_bytes(&be), Some(s));
    }
}
