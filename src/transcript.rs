//! The Fiat-Shamir hash chain.
//!
//! Every challenge is `SHA-256(state ‖ point bytes…)`, and the digest
//! becomes the next state, so each challenge is bound to every commitment
//! made before it. Challenges are the state reduced modulo the group order.

use byteorder::{ByteOrder, LittleEndian};
use sha2::{Digest, Sha256};

use curve::{minimal_be, Group, ScalarField};
use lattice::Ciphertext;

/// Hashes `base ‖ bytes(points[0]) ‖ … ‖ bytes(scalars[0]) ‖ …`.
///
/// Points contribute their transcript bytes (for secp256k1 the minimal
/// big-endian `x` then `y`), scalars their minimal big-endian bytes. The raw
/// digest is returned; callers reduce it where they need a scalar.
pub fn challenge_data<G: Group>(base: &[u8], points: &[G], scalars: &[G::Scalar]) -> [u8; 32] {
    let mut data = Vec::with_capacity(base.len() + 64 * points.len() + 32 * scalars.len());
    data.extend_from_slice(base);
    for p in points {
        p.append_transcript_bytes(&mut data);
    }
    for s in scalars {
        data.extend_from_slice(minimal_be(&s.to_canonical_bytes()));
    }
    sha256(&data)
}

pub(crate) fn sha256(data: &[u8]) -> [u8; 32] {
    let mut out = [0u8; 32];
    out.copy_from_slice(&Sha256::digest(data));
    out
}

/// Running state of the hash chain shared by the two folding arguments.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transcript {
    state: [u8; 32],
}

impl Transcript {
    /// Starts the chain from the ciphertext: the hash of every coefficient
    /// of `T0` then `T1` as a little-endian 16-bit word.
    pub fn new(ciphertext: &Ciphertext) -> Transcript {
        let t0 = &ciphertext.t0;
        let t1 = &ciphertext.t1;
        let mut data = vec![0u8; 2 * (t0.len() + t1.len())];
        for (chunk, v) in data.chunks_mut(2).zip(t0.iter().chain(t1.iter())) {
            LittleEndian::write_u16(chunk, *v as u16);
        }
        Transcript::from_state(sha256(&data))
    }

    /// Resumes the chain from a given state.
    pub fn from_state(state: [u8; 32]) -> Transcript {
        Transcript { state }
    }

    /// The current state.
    pub fn state(&self) -> &[u8; 32] {
        &self.state
    }

    /// Absorbs `points` into the chain.
    pub fn commit_points<G: Group>(&mut self, points: &[G]) {
        self.state = challenge_data::<G>(&self.state, points, &[]);
    }

    /// The challenge for everything absorbed so far.
    pub fn challenge_scalar<S: ScalarField>(&self) -> S {
        S::from_hash(&self.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use curve::Secp256k1Point;
    use k256::Scalar;

    fn points() -> Vec<Secp256k1Point> {
        (1..4u64)
            .map(|i| Secp256k1Point::base_mul(&Scalar::from_u64(i)))
            .collect()
    }

    #[test]
    fn challenge_data_is_deterministic() {
        let p = points();
        let a = challenge_data::<Secp256k1Point>(b"base", &p, &[Scalar::from_u64(5)]);
        let b = challenge_data::<Secp256k1Point>(b"base", &p, &[Scalar::from_u64(5)]);
        assert_eq!(a, b);
    }

    #[test]
    fn challenge_data_depends_on_order() {
        let p = points();
        let mut q = p.clone();
        q.swap(0, 2);
        let a = challenge_data::<Secp256k1Point>(&[], &p, &[]);
        let b = challenge_data::<Secp256k1Point>(&[], &q, &[]);
        assert_ne!(a, b);
    }

    #[test]
    fn challenge_data_matches_manual_hash() {
        let g = Secp256k1Point::base_mul(&Scalar::one());
        let mut data = b"seed".to_vec();
        data.extend_from_slice(&g.to_uncompressed_bytes());
        // Scalar 0x0102 contributes two bytes.
        data.extend_from_slice(&[1, 2]);
        let expected = sha256(&data);
        assert_eq!(
            challenge_data::<Secp256k1Point>(b"seed", &[g], &[Scalar::from_u64(0x0102)]),
            expected
        );
    }

    #[test]
    fn chain_binds_every_commitment() {
        let ct = Ciphertext {
            t0: vec![1, -1, 3],
            t1: vec![0, 7, -32768],
        };
        let p = points();

        let mut a = Transcript::new(&ct);
        a.commit_points(&p[..2]);
        let ca: Scalar = a.challenge_scalar();

        let mut b = Transcript::new(&ct);
        b.commit_points(&p[..1]);
        b.commit_points(&p[1..2]);
        let cb: Scalar = b.challenge_scalar();
        assert_ne!(ca, cb);

        let mut c = Transcript::new(&ct);
        c.commit_points(&p[..2]);
        assert_eq!(a, c);
    }

    #[test]
    fn ciphertext_seed_uses_low_16_bits() {
        let ct = Ciphertext {
            t0: vec![-1],
            t1: vec![0x1234],
        };
        let expected = sha256(&[0xff, 0xff, 0x34, 0x12]);
        assert_eq!(Transcript::new(&ct).state(), &expected);
    }
}
