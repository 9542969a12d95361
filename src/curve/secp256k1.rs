//! secp256k1 backend, on top of the `k256` crate.

use k256::elliptic_curve::bigint::U256;
use k256::elliptic_curve::ops::Reduce;
use k256::elliptic_curve::point::DecompressPoint;
use k256::elliptic_curve::sec1::{FromEncodedPoint, ToEncodedPoint};
use k256::elliptic_curve::{Field, PrimeField};
use k256::{AffinePoint, EncodedPoint, FieldBytes, ProjectivePoint, Scalar};
use subtle::Choice;

use super::{minimal_be, Group, ScalarField};
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
        <Scalar as Reduce<U256>>::reduce_bytes(&FieldBytes::from(*digest))
    }

    fn from_canonical_bytes(bytes: &[u8; 32]) -> Option<Scalar> {
        Option::from(Scalar::from_repr(FieldBytes::from(*bytes)))
    }

    fn to_canonical_bytes(&self) -> [u8; 32] {
        read32(&self.to_bytes())
    }

    fn invert(&self) -> Scalar {
        Option::from(<Scalar as Field>::invert(self)).unwrap_or(Scalar::ZERO)
    }
}

/// Points handled per Straus pass; bounds the window tables kept alive.
const STRAUS_BATCH: usize = 64;

/// `[0·P, 1·P, ..., 15·P]`.
fn window_table(p: &ProjectivePoint) -> [ProjectivePoint; 16] {
    let mut table = [ProjectivePoint::IDENTITY; 16];
    for i in 1..16 {
        table[i] = table[i - 1] + *p;
    }
    table
}

/// Straus' interleaved method with 4-bit windows: all points share one
/// chain of 252 doublings.
fn straus(scalars: &[Scalar], points: &[ProjectivePoint]) -> ProjectivePoint {
    let tables: Vec<[ProjectivePoint; 16]> = points.iter().map(window_table).collect();
    let digits: Vec<[u8; 32]> = scalars.iter().map(|k| ScalarField::to_canonical_bytes(k)).collect();

    let mut acc = ProjectivePoint::IDENTITY;
    for nibble in 0..64 {
        if nibble > 0 {
            for _ in 0..4 {
                acc = acc.double();
            }
        }
        for (table, bytes) in tables.iter().zip(digits.iter()) {
            let byte = bytes[nibble / 2];
            let digit = if nibble % 2 == 0 { byte >> 4 } else { byte & 0x0f };
            if digit != 0 {
                acc += table[digit as usize];
            }
        }
    }
    acc
}

/// Affine coordinates, or `None` for the point at infinity.
fn coordinates(p: &ProjectivePoint) -> Option<([u8; 32], [u8; 32])> {
    let encoded = p.to_affine().to_encoded_point(false);
    match (encoded.x(), encoded.y()) {
        (Some(x), Some(y)) => Some((read32(x), read32(y))),
        _ => None,
    }
}

impl Group for ProjectivePoint {
    type Scalar = Scalar;

    const UNCOMPRESSED_SIZE: usize = 64;
    const COMPRESSED_SIZE: usize = 33;

    fn identity() -> ProjectivePoint {
        ProjectivePoint::IDENTITY
    }

    fn is_identity(&self) -> bool {
        *self == ProjectivePoint::IDENTITY
    }

    fn base_mul(k: &Scalar) -> ProjectivePoint {
        ProjectivePoint::GENERATOR * *k
    }

    fn scalar_mul(&self, k: &Scalar) -> ProjectivePoint {
        *self * *k
    }

    fn multiscalar_mul(scalars: &[Scalar], points: &[ProjectivePoint]) -> ProjectivePoint {
        debug_assert_eq!(scalars.len(), points.len());
        scalars
            .chunks(STRAUS_BATCH)
            .zip(points.chunks(STRAUS_BATCH))
            .fold(ProjectivePoint::IDENTITY, |acc, (k, p)| acc + straus(k, p))
    }

    fn hash_to_point(bytes: &[u8; 64]) -> Option<ProjectivePoint> {
        let x = FieldBytes::from(read32(&bytes[..32]));
        let odd = Choice::from(bytes[32] & 1);
        let point: Option<AffinePoint> = AffinePoint::decompress(&x, odd).into();
        point.map(ProjectivePoint::from)
    }

    fn append_transcript_bytes(&self, buf: &mut Vec<u8>) {
        if let Some((x, y)) = coordinates(self) {
            buf.extend_from_slice(minimal_be(&x));
            buf.extend_from_slice(minimal_be(&y));
        }
    }

    fn to_uncompressed_bytes(&self) -> Vec<u8> {
        let mut buf = vec![0u8; 64];
        if let Some((x, y)) = coordinates(self) {
            buf[..32].copy_from_slice(&x);
            buf[32..].copy_from_slice(&y);
        }
        buf
    }

    fn to_compressed_bytes(&self) -> Vec<u8> {
        let mut buf = vec![0u8; 33];
        buf[0] = 0x02;
        if let Some((x, y)) = coordinates(self) {
            buf[0] |= y[31] & 1;
            buf[1..].copy_from_slice(&x);
        }
        buf
    }

    fn from_uncompressed_bytes(bytes: &[u8]) -> Result<ProjectivePoint, ProofError> {
        if bytes.len() != 64 {
            return Err(ProofError::FormatError);
        }
        // No curve point has x = 0, so all zeros is free to mean infinity.
        if bytes.iter().all(|b| *b == 0) {
            return Ok(ProjectivePoint::IDENTITY);
        }
        let x = FieldBytes::from(read32(&bytes[..32]));
        let y = FieldBytes::from(read32(&bytes[32..]));
        let encoded = EncodedPoint::from_affine_coordinates(&x, &y, false);
        let point: Option<AffinePoint> = AffinePoint::from_encoded_point(&encoded).into();
        point
            .map(ProjectivePoint::from)
            .ok_or(ProofError::FormatError)
    }

    fn from_compressed_bytes(bytes: &[u8]) -> Result<ProjectivePoint, ProofError> {
        if bytes.len() != 33 || bytes[0] & 0xfe != 0x02 {
            return Err(ProofError::FormatError);
        }
        if bytes[1..].iter().all(|b| *b == 0) {
            return if bytes[0] == 0x02 {
                Ok(ProjectivePoint::IDENTITY)
            } else {
                Err(ProofError::FormatError)
            };
        }
        let x = FieldBytes::from(read32(&bytes[1..]));
        let point: Option<AffinePoint> = AffinePoint::decompress(&x, Choice::from(bytes[0] & 1)).into();
        point
            .map(ProjectivePoint::from)
            .ok_or(ProofError::FormatError)
    }
}
