#![allow(non_snake_case)]
//! The two folding arguments of the proof.
//!
//! [`InnerProductProof`] opens `P = ⟨a, G'⟩ + ⟨b, H'⟩ + ⟨a, b⟩·Q + o·U`
//! for the batched lattice and bit constraints; [`LinearProof`] opens
//! `P = ⟨a, h⟩ + ⟨a, z⟩·f + o·U` for a public weight vector `z`, tying the
//! message bits to the puzzle points. Both halve their vectors once per
//! round and finish with a masked opening of the final scalars, so only the
//! blinded responses ever leave the prover.

use std::marker::PhantomData;
use std::ops::Range;

use byteorder::{BigEndian, ByteOrder};
use rand::{CryptoRng, RngCore};
use serde::de::Visitor;
use serde::{self, Deserialize, Deserializer, Serialize, Serializer};

use curve::{Group, ScalarField};
use errors::ProofError;
use generators::ProofGens;
use pool::WorkerPool;
use transcript::Transcript;
use util::{self, fold_coefficients, inner_product, random_scalar, ByteReader};

/// Tag byte of the compressed standalone encodings.
const COMPRESSED_TAG: u8 = 0x02;

/// Round counts at or above this are rejected when decoding.
const MAX_ROUNDS: usize = 32;

/// Replays the round challenges of a folding argument.
fn replay_challenges<G: Group>(
    transcript: &mut Transcript,
    L_vec: &[G],
    R_vec: &[G],
) -> Vec<G::Scalar> {
    L_vec
        .iter()
        .zip(R_vec.iter())
        .map(|(L, R)| {
            transcript.commit_points(&[*L, *R]);
            transcript.challenge_scalar()
        })
        .collect()
}

/// Reads the standalone header and returns the round count.
fn read_header(reader: &mut ByteReader, compressed: bool) -> Result<usize, ProofError> {
    let lg_n = if compressed {
        let header = reader.take(2)?;
        if header[0] != COMPRESSED_TAG {
            return Err(ProofError::FormatError);
        }
        header[1] as usize
    } else {
        BigEndian::read_u32(reader.take(4)?) as usize
    };
    if lg_n >= MAX_ROUNDS {
        return Err(ProofError::FormatError);
    }
    Ok(lg_n)
}

fn write_header(buf: &mut Vec<u8>, lg_n: usize, compressed: bool) {
    if compressed {
        buf.push(COMPRESSED_TAG);
        buf.push(lg_n as u8);
    } else {
        let mut count = [0u8; 4];
        BigEndian::write_u32(&mut count, lg_n as u32);
        buf.extend_from_slice(&count);
    }
}

/// Folding argument for the batched witness relation.
#[derive(Clone, Debug, PartialEq)]
pub struct InnerProductProof<G: Group> {
    pub(crate) L_vec: Vec<G>,
    pub(crate) R_vec: Vec<G>,
    pub(crate) C: G,
    pub(crate) C_prime: G,
    pub(crate) e1: G::Scalar,
    pub(crate) e2: G::Scalar,
    pub(crate) o: G::Scalar,
}

impl<G: Group> InnerProductProof<G> {
    /// Create an inner-product proof.
    ///
    /// The proof is created with respect to the bases `G_vec`, `H_vec`
    /// (already scaled by their generator factors), the cross-term base `Q`
    /// and the blinding base `U`; `o` is the blinding of the starting point.
    ///
    /// The lengths of the vectors must all be the same power of two.
    pub(crate) fn create<R: RngCore + CryptoRng>(
        transcript: &mut Transcript,
        Q: &G,
        U: &G,
        mut G_vec: Vec<G>,
        mut H_vec: Vec<G>,
        mut a_vec: Vec<G::Scalar>,
        mut b_vec: Vec<G::Scalar>,
        mut o: G::Scalar,
        pool: &WorkerPool,
        rng: &mut R,
    ) -> Result<InnerProductProof<G>, ProofError> {
        let mut Gp = &mut G_vec[..];
        let mut Hp = &mut H_vec[..];
        let mut a = &mut a_vec[..];
        let mut b = &mut b_vec[..];

        let mut n = Gp.len();

        // All of the input vectors must have the same length.
        debug_assert_eq!(Hp.len(), n);
        debug_assert_eq!(a.len(), n);
        debug_assert_eq!(b.len(), n);
        debug_assert!(n.is_power_of_two());

        let lg_n = n.trailing_zeros() as usize;
        let mut L_vec = Vec::with_capacity(lg_n);
        let mut R_vec = Vec::with_capacity(lg_n);

        while n != 1 {
            n = n / 2;
            let (a_L, a_R) = a.split_at_mut(n);
            let (b_L, b_R) = b.split_at_mut(n);
            let (Gp_L, Gp_R) = Gp.split_at_mut(n);
            let (Hp_L, Hp_R) = Hp.split_at_mut(n);

            let sigma_L: G::Scalar = random_scalar(rng)?;
            let sigma_R: G::Scalar = random_scalar(rng)?;

            let c_L = inner_product(a_R, b_L);
            let c_R = inner_product(a_L, b_R);

            let L = pool.multiscalar_mul(a_R, Gp_L)
                + pool.multiscalar_mul(b_L, Hp_R)
                + G::multiscalar_mul(&[c_L, sigma_L], &[*Q, *U]);
            let R = pool.multiscalar_mul(a_L, Gp_R)
                + pool.multiscalar_mul(b_R, Hp_L)
                + G::multiscalar_mul(&[c_R, sigma_R], &[*Q, *U]);

            L_vec.push(L);
            R_vec.push(R);

            transcript.commit_points(&[L, R]);
            let c: G::Scalar = transcript.challenge_scalar();
            let c_inv = c.invert();

            pool.zip_apply(a_L, a_R, |l, r| *l += c_inv * *r);
            pool.zip_apply(b_L, b_R, |l, r| *l += c * *r);
            pool.zip_apply(Gp_L, Gp_R, |l, r| *l += r.scalar_mul(&c));
            pool.zip_apply(Hp_L, Hp_R, |l, r| *l += r.scalar_mul(&c_inv));
            o += c_inv * sigma_L + c * sigma_R;

            a = a_L;
            b = b_L;
            Gp = Gp_L;
            Hp = Hp_L;
        }

        let y1: G::Scalar = random_scalar(rng)?;
        let y2: G::Scalar = random_scalar(rng)?;
        let sigma: G::Scalar = random_scalar(rng)?;
        let sigma_prime: G::Scalar = random_scalar(rng)?;

        let C = G::multiscalar_mul(
            &[y1, y2, b[0] * y1 + a[0] * y2, sigma],
            &[Gp[0], Hp[0], *Q, *U],
        );
        let C_prime = G::multiscalar_mul(&[y1 * y2, sigma_prime], &[*Q, *U]);

        transcript.commit_points(&[C, C_prime]);
        let xi: G::Scalar = transcript.challenge_scalar();

        Ok(InnerProductProof {
            L_vec,
            R_vec,
            C,
            C_prime,
            e1: xi * a[0] + y1,
            e2: xi * b[0] + y2,
            o: xi * o + sigma + xi.invert() * sigma_prime,
        })
    }

    /// Replays the transcript, returning the round challenges and the final
    /// challenge `xi`.
    pub(crate) fn verification_scalars(
        &self,
        n: usize,
        transcript: &mut Transcript,
    ) -> Result<(Vec<G::Scalar>, G::Scalar), ProofError> {
        let lg_n = self.L_vec.len();
        if lg_n >= MAX_ROUNDS || self.R_vec.len() != lg_n {
            return Err(ProofError::VerificationError);
        }
        if n != (1 << lg_n) {
            return Err(ProofError::VerificationError);
        }

        let challenges = replay_challenges(transcript, &self.L_vec, &self.R_vec);
        transcript.commit_points(&[self.C, self.C_prime]);
        let xi = transcript.challenge_scalar();
        Ok((challenges, xi))
    }

    /// Checks the proof against the starting point `P`.
    ///
    /// `G_factors` and `H_factors` have the padded length `n`; slot `i`
    /// uses generator `min(i, len - 1)` of `gens`.
    pub(crate) fn verify(
        &self,
        n: usize,
        transcript: &mut Transcript,
        P: &G,
        Q: &G,
        gens: &ProofGens<G>,
        G_factors: &[G::Scalar],
        H_factors: &[G::Scalar],
        pool: &WorkerPool,
    ) -> Result<(), ProofError> {
        let (challenges, xi) = self.verification_scalars(n, transcript)?;
        let mut challenges_inv = challenges.clone();
        util::batch_invert(&mut challenges_inv);

        let s = fold_coefficients(&challenges);
        let s_inv = fold_coefficients(&challenges_inv);

        let len = gens.len();
        let zero = G::Scalar::zero();
        let mut g_coeffs = vec![zero; len];
        let mut h_coeffs = vec![zero; len];
        for i in 0..n {
            let j = i.min(len - 1);
            g_coeffs[j] += self.e1 * G_factors[i] * s[i];
            h_coeffs[j] += self.e2 * H_factors[i] * s_inv[i];
        }
        let g_sum = gens.g_multiscalar(&g_coeffs, pool);
        let h_sum = gens.h_multiscalar(0, &h_coeffs, pool);

        let folded = G::multiscalar_mul(
            &challenges_inv
                .iter()
                .chain(challenges.iter())
                .cloned()
                .collect::<Vec<_>>(),
            &self
                .L_vec
                .iter()
                .chain(self.R_vec.iter())
                .cloned()
                .collect::<Vec<_>>(),
        );

        let xi_inv = xi.invert();
        let check = (*P + folded).scalar_mul(&xi)
            + self.C
            + self.C_prime.scalar_mul(&xi_inv)
            - g_sum
            - h_sum
            - G::multiscalar_mul(&[xi_inv * self.e1 * self.e2, self.o], &[*Q, gens.U]);

        if check.is_identity() {
            Ok(())
        } else {
            Err(ProofError::VerificationError)
        }
    }

    /// Number of folding rounds.
    pub fn rounds(&self) -> usize {
        self.L_vec.len()
    }

    /// Size of the fields without the standalone header.
    pub(crate) fn body_size(lg_n: usize, compressed: bool) -> usize {
        (2 * lg_n + 2) * util::point_size::<G>(compressed) + 3 * 32
    }

    /// Returns the size in bytes of the standalone uncompressed encoding.
    pub fn serialized_size(&self) -> usize {
        4 + Self::body_size(self.rounds(), false)
    }

    pub(crate) fn write_body(&self, buf: &mut Vec<u8>, compressed: bool) {
        for p in self.L_vec.iter().chain(self.R_vec.iter()) {
            util::write_point(buf, p, compressed);
        }
        util::write_point(buf, &self.C, compressed);
        util::write_point(buf, &self.C_prime, compressed);
        buf.extend_from_slice(&self.e1.to_canonical_bytes());
        buf.extend_from_slice(&self.e2.to_canonical_bytes());
        buf.extend_from_slice(&self.o.to_canonical_bytes());
    }

    pub(crate) fn read_body(
        reader: &mut ByteReader,
        lg_n: usize,
        compressed: bool,
    ) -> Result<InnerProductProof<G>, ProofError> {
        Ok(InnerProductProof {
            L_vec: reader.points(lg_n, compressed)?,
            R_vec: reader.points(lg_n, compressed)?,
            C: reader.point(compressed)?,
            C_prime: reader.point(compressed)?,
            e1: reader.scalar()?,
            e2: reader.scalar()?,
            o: reader.scalar()?,
        })
    }

    /// Serializes the proof as a 4-byte big-endian round count `k`
    /// followed by
    /// * `k` points `TL` and `k` points `TR`,
    /// * the points `C`, `C'`,
    /// * the scalars `E1`, `E2`, `O`,
    ///
    /// with points in the fixed-width format.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.serialized_size());
        write_header(&mut buf, self.rounds(), false);
        self.write_body(&mut buf, false);
        buf
    }

    /// Serializes the proof with the header `[0x02, k]` and compressed
    /// points.
    pub fn to_compressed_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(2 + Self::body_size(self.rounds(), true));
        write_header(&mut buf, self.rounds(), true);
        self.write_body(&mut buf, true);
        buf
    }

    /// Deserializes the proof from [`to_bytes`](InnerProductProof::to_bytes)
    /// output.
    pub fn from_bytes(slice: &[u8]) -> Result<InnerProductProof<G>, ProofError> {
        Self::decode(slice, false)
    }

    /// Deserializes the proof from
    /// [`to_compressed_bytes`](InnerProductProof::to_compressed_bytes) output.
    pub fn from_compressed_bytes(slice: &[u8]) -> Result<InnerProductProof<G>, ProofError> {
        Self::decode(slice, true)
    }

    fn decode(slice: &[u8], compressed: bool) -> Result<InnerProductProof<G>, ProofError> {
        let mut reader = ByteReader::new(slice);
        let lg_n = read_header(&mut reader, compressed)?;
        let proof = Self::read_body(&mut reader, lg_n, compressed)?;
        reader.finish()?;
        Ok(proof)
    }
}

impl<G: Group> Serialize for InnerProductProof<G> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_bytes(&self.to_bytes()[..])
    }
}

impl<'de, G: Group> Deserialize<'de> for InnerProductProof<G> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct InnerProductProofVisitor<G>(PhantomData<G>);

        impl<'de, G: Group> Visitor<'de> for InnerProductProofVisitor<G> {
            type Value = InnerProductProof<G>;

            fn expecting(&self, formatter: &mut ::std::fmt::Formatter) -> ::std::fmt::Result {
                formatter.write_str("a valid InnerProductProof")
            }

            fn visit_bytes<E>(self, v: &[u8]) -> Result<InnerProductProof<G>, E>
            where
                E: serde::de::Error,
            {
                InnerProductProof::from_bytes(v).map_err(serde::de::Error::custom)
            }
        }

        deserializer.deserialize_bytes(InnerProductProofVisitor(PhantomData))
    }
}

/// Folding argument for a linear relation with public weights, binding the
/// message bits to the puzzle secrets.
#[derive(Clone, Debug, PartialEq)]
pub struct LinearProof<G: Group> {
    pub(crate) L_vec: Vec<G>,
    pub(crate) R_vec: Vec<G>,
    pub(crate) C: G,
    pub(crate) e1: G::Scalar,
    pub(crate) e2: G::Scalar,
}

impl<G: Group> LinearProof<G> {
    /// Create a linear proof for `P = ⟨a, h⟩ + ⟨a, z⟩·f + o·U`.
    ///
    /// `h_vec` and `z_vec` are public, `a_vec` and `o` secret; all three
    /// vectors must have the same power-of-two length.
    pub(crate) fn create<R: RngCore + CryptoRng>(
        transcript: &mut Transcript,
        f: &G,
        U: &G,
        mut h_vec: Vec<G>,
        mut z_vec: Vec<G::Scalar>,
        mut a_vec: Vec<G::Scalar>,
        mut o: G::Scalar,
        pool: &WorkerPool,
        rng: &mut R,
    ) -> Result<LinearProof<G>, ProofError> {
        let mut h = &mut h_vec[..];
        let mut z = &mut z_vec[..];
        let mut a = &mut a_vec[..];

        let mut n = h.len();
        debug_assert_eq!(z.len(), n);
        debug_assert_eq!(a.len(), n);
        debug_assert!(n.is_power_of_two());

        let lg_n = n.trailing_zeros() as usize;
        let mut L_vec = Vec::with_capacity(lg_n);
        let mut R_vec = Vec::with_capacity(lg_n);

        while n != 1 {
            n = n / 2;
            let (a_L, a_R) = a.split_at_mut(n);
            let (z_L, z_R) = z.split_at_mut(n);
            let (h_L, h_R) = h.split_at_mut(n);

            let sigma_L: G::Scalar = random_scalar(rng)?;
            let sigma_R: G::Scalar = random_scalar(rng)?;

            let L = pool.multiscalar_mul(a_L, h_R)
                + G::multiscalar_mul(&[inner_product(a_L, z_R), sigma_L], &[*f, *U]);
            let R = pool.multiscalar_mul(a_R, h_L)
                + G::multiscalar_mul(&[inner_product(a_R, z_L), sigma_R], &[*f, *U]);

            L_vec.push(L);
            R_vec.push(R);

            transcript.commit_points(&[L, R]);
            let c: G::Scalar = transcript.challenge_scalar();
            let c_inv = c.invert();

            pool.zip_apply(h_L, h_R, |l, r| *l += r.scalar_mul(&c));
            pool.zip_apply(z_L, z_R, |l, r| *l += c * *r);
            pool.zip_apply(a_L, a_R, |l, r| *l += c_inv * *r);
            o += c * sigma_L + c_inv * sigma_R;

            a = a_L;
            z = z_L;
            h = h_L;
        }

        let y1: G::Scalar = random_scalar(rng)?;
        let y2: G::Scalar = random_scalar(rng)?;
        let C = G::multiscalar_mul(&[y1, y1 * z[0], y2], &[h[0], *f, *U]);

        transcript.commit_points(&[C]);
        let xi: G::Scalar = transcript.challenge_scalar();

        Ok(LinearProof {
            L_vec,
            R_vec,
            C,
            e1: y1 - xi * a[0],
            e2: y2 - xi * o,
        })
    }

    /// Replays the transcript, returning the round challenges and `xi`.
    pub(crate) fn verification_scalars(
        &self,
        n: usize,
        transcript: &mut Transcript,
    ) -> Result<(Vec<G::Scalar>, G::Scalar), ProofError> {
        let lg_n = self.L_vec.len();
        if lg_n >= MAX_ROUNDS || self.R_vec.len() != lg_n {
            return Err(ProofError::VerificationError);
        }
        if n != (1 << lg_n) {
            return Err(ProofError::VerificationError);
        }

        let challenges = replay_challenges(transcript, &self.L_vec, &self.R_vec);
        transcript.commit_points(&[self.C]);
        let xi = transcript.challenge_scalar();
        Ok((challenges, xi))
    }

    /// Checks the proof against the starting point `P`.
    ///
    /// The `h` generators are `H[window]` of `gens`, padded to `n` by
    /// repeating the last one; `z_vec` already has length `n`.
    pub(crate) fn verify(
        &self,
        n: usize,
        transcript: &mut Transcript,
        P: &G,
        f: &G,
        gens: &ProofGens<G>,
        window: Range<usize>,
        z_vec: &[G::Scalar],
        pool: &WorkerPool,
    ) -> Result<(), ProofError> {
        let (challenges, xi) = self.verification_scalars(n, transcript)?;
        let mut challenges_inv = challenges.clone();
        util::batch_invert(&mut challenges_inv);

        let s = fold_coefficients(&challenges);

        let len = window.end - window.start;
        let mut h_coeffs = vec![G::Scalar::zero(); len];
        for i in 0..n {
            h_coeffs[i.min(len - 1)] += self.e1 * s[i];
        }
        let h_sum = gens.h_multiscalar(window.start, &h_coeffs, pool);
        let z_fold = inner_product(&s, z_vec);

        let folded = G::multiscalar_mul(
            &challenges
                .iter()
                .chain(challenges_inv.iter())
                .cloned()
                .collect::<Vec<_>>(),
            &self
                .L_vec
                .iter()
                .chain(self.R_vec.iter())
                .cloned()
                .collect::<Vec<_>>(),
        );

        let check = self.C
            - (*P + folded).scalar_mul(&xi)
            - h_sum
            - G::multiscalar_mul(&[self.e1 * z_fold, self.e2], &[*f, gens.U]);

        if check.is_identity() {
            Ok(())
        } else {
            Err(ProofError::VerificationError)
        }
    }

    /// Number of folding rounds.
    pub fn rounds(&self) -> usize {
        self.L_vec.len()
    }

    /// Size of the fields without the standalone header.
    pub(crate) fn body_size(lg_n: usize, compressed: bool) -> usize {
        (2 * lg_n + 1) * util::point_size::<G>(compressed) + 2 * 32
    }

    /// Returns the size in bytes of the standalone uncompressed encoding.
    pub fn serialized_size(&self) -> usize {
        4 + Self::body_size(self.rounds(), false)
    }

    pub(crate) fn write_body(&self, buf: &mut Vec<u8>, compressed: bool) {
        for p in self.L_vec.iter().chain(self.R_vec.iter()) {
            util::write_point(buf, p, compressed);
        }
        util::write_point(buf, &self.C, compressed);
        buf.extend_from_slice(&self.e1.to_canonical_bytes());
        buf.extend_from_slice(&self.e2.to_canonical_bytes());
    }

    pub(crate) fn read_body(
        reader: &mut ByteReader,
        lg_n: usize,
        compressed: bool,
    ) -> Result<LinearProof<G>, ProofError> {
        Ok(LinearProof {
            L_vec: reader.points(lg_n, compressed)?,
            R_vec: reader.points(lg_n, compressed)?,
            C: reader.point(compressed)?,
            e1: reader.scalar()?,
            e2: reader.scalar()?,
        })
    }

    /// Serializes the proof as a 4-byte big-endian round count `k`
    /// followed by `k` points `TL`, `k` points `TR`, the point `C` and the
    /// scalars `E1`, `E2`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.serialized_size());
        write_header(&mut buf, self.rounds(), false);
        self.write_body(&mut buf, false);
        buf
    }

    /// Serializes the proof with the header `[0x02, k]` and compressed
    /// points.
    pub fn to_compressed_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(2 + Self::body_size(self.rounds(), true));
        write_header(&mut buf, self.rounds(), true);
        self.write_body(&mut buf, true);
        buf
    }

    /// Deserializes the proof from [`to_bytes`](LinearProof::to_bytes) output.
    pub fn from_bytes(slice: &[u8]) -> Result<LinearProof<G>, ProofError> {
        Self::decode(slice, false)
    }

    /// Deserializes the proof from
    /// [`to_compressed_bytes`](LinearProof::to_compressed_bytes) output.
    pub fn from_compressed_bytes(slice: &[u8]) -> Result<LinearProof<G>, ProofError> {
        Self::decode(slice, true)
    }

    fn decode(slice: &[u8], compressed: bool) -> Result<LinearProof<G>, ProofError> {
        let mut reader = ByteReader::new(slice);
        let lg_n = read_header(&mut reader, compressed)?;
        let proof = Self::read_body(&mut reader, lg_n, compressed)?;
        reader.finish()?;
        Ok(proof)
    }
}

impl<G: Group> Serialize for LinearProof<G> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_bytes(&self.to_bytes()[..])
    }
}

impl<'de, G: Group> Deserialize<'de> for LinearProof<G> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct LinearProofVisitor<G>(PhantomData<G>);

        impl<'de, G: Group> Visitor<'de> for LinearProofVisitor<G> {
            type Value = LinearProof<G>;

            fn expecting(&self, formatter: &mut ::std::fmt::Formatter) -> ::std::fmt::Result {
                formatter.write_str("a valid LinearProof")
            }

            fn visit_bytes<E>(self, v: &[u8]) -> Result<LinearProof<G>, E>
            where
                E: serde::de::Error,
            {
                LinearProof::from_bytes(v).map_err(serde::de::Error::custom)
            }
        }

        deserializer.deserialize_bytes(LinearProofVisitor(PhantomData))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use curve::{RistrettoPoint, Secp256k1Point};
    use params::ProtocolParams;
    use rand::SeedableRng;
    use rand_chacha::ChaChaRng;

    fn tiny_params() -> ProtocolParams {
        ProtocolParams {
            d: 4,
            chunk_len: 4,
            b1: 2,
            ..ProtocolParams::default()
        }
    }

    fn random_vec<G: Group>(n: usize, rng: &mut ChaChaRng) -> Vec<G::Scalar> {
        (0..n).map(|_| random_scalar(rng).unwrap()).collect()
    }

    /// Runs an inner-product proof over `G[0..n]`, `H[0..n]` of `gens`
    /// with random factors and operands, returning what the verifier needs.
    fn ipp_case<G: Group>(
        n: usize,
        seed: u8,
    ) -> (
        InnerProductProof<G>,
        ProofGens<G>,
        G,
        G,
        Vec<G::Scalar>,
        Vec<G::Scalar>,
    ) {
        let params = tiny_params();
        let gens = ProofGens::<G>::new(&params).unwrap();
        assert!(gens.len() >= n);
        let pool = WorkerPool::sequential();
        let mut rng = ChaChaRng::from_seed([seed; 32]);

        let gF = random_vec::<G>(n, &mut rng);
        let hF = random_vec::<G>(n, &mut rng);
        let a = random_vec::<G>(n, &mut rng);
        let b = random_vec::<G>(n, &mut rng);
        let o: G::Scalar = random_scalar(&mut rng).unwrap();
        let Q = G::base_mul(&G::Scalar::from_u64(77));

        let G_prime: Vec<G> = (0..n).map(|i| gens.G_vec[i].scalar_mul(&gF[i])).collect();
        let H_prime: Vec<G> = (0..n).map(|i| gens.H_vec[i].scalar_mul(&hF[i])).collect();
        let P = G::multiscalar_mul(&a, &G_prime)
            + G::multiscalar_mul(&b, &H_prime)
            + Q.scalar_mul(&inner_product(&a, &b))
            + gens.U.scalar_mul(&o);

        let mut transcript = Transcript::from_state([seed; 32]);
        let proof = InnerProductProof::create(
            &mut transcript,
            &Q,
            &gens.U,
            G_prime,
            H_prime,
            a,
            b,
            o,
            &pool,
            &mut rng,
        )
        .unwrap();

        (proof, gens, P, Q, gF, hF)
    }

    fn ipp_round_trip<G: Group>() {
        // Fewer slots than generators; the rest get zero coefficients.
        let n = 32;
        let (proof, gens, P, Q, gF, hF) = ipp_case::<G>(n, 3);
        assert_eq!(proof.rounds(), 5);
        let pool = WorkerPool::sequential();

        let mut transcript = Transcript::from_state([3; 32]);
        assert!(proof
            .verify(n, &mut transcript, &P, &Q, &gens, &gF, &hF, &pool)
            .is_ok());

        let mut transcript = Transcript::from_state([4; 32]);
        assert!(proof
            .verify(n, &mut transcript, &P, &Q, &gens, &gF, &hF, &pool)
            .is_err());

        let shifted = P + gens.U;
        let mut transcript = Transcript::from_state([3; 32]);
        assert!(proof
            .verify(n, &mut transcript, &shifted, &Q, &gens, &gF, &hF, &pool)
            .is_err());

        let mut transcript = Transcript::from_state([3; 32]);
        assert_eq!(
            proof.verify(16, &mut transcript, &P, &Q, &gens, &gF, &hF, &pool),
            Err(ProofError::VerificationError)
        );
    }

    #[test]
    fn ipp_secp256k1() {
        ipp_round_trip::<Secp256k1Point>();
    }

    #[test]
    fn ipp_ristretto() {
        ipp_round_trip::<RistrettoPoint>();
    }

    #[test]
    fn ipp_encodings() {
        let (proof, _, _, _, _, _) = ipp_case::<Secp256k1Point>(8, 5);
        let bytes = proof.to_bytes();
        assert_eq!(bytes.len(), proof.serialized_size());
        assert_eq!(bytes.len(), 4 + 8 * 64 + 96);
        assert_eq!(&bytes[..4], &[0, 0, 0, 3]);
        assert_eq!(InnerProductProof::from_bytes(&bytes), Ok(proof.clone()));

        let compressed = proof.to_compressed_bytes();
        assert_eq!(compressed.len(), 2 + 8 * 33 + 96);
        assert_eq!(&compressed[..2], &[0x02, 3]);
        assert_eq!(
            InnerProductProof::from_compressed_bytes(&compressed),
            Ok(proof.clone())
        );

        let mut bad_tag = compressed.clone();
        bad_tag[0] = 0x03;
        assert_eq!(
            InnerProductProof::<Secp256k1Point>::from_compressed_bytes(&bad_tag),
            Err(ProofError::FormatError)
        );
        assert_eq!(
            InnerProductProof::<Secp256k1Point>::from_bytes(&bytes[..bytes.len() - 1]),
            Err(ProofError::FormatError)
        );
        let mut extra = bytes.clone();
        extra.push(0);
        assert_eq!(
            InnerProductProof::<Secp256k1Point>::from_bytes(&extra),
            Err(ProofError::FormatError)
        );

        let encoded = bincode::serialize(&proof).unwrap();
        let decoded: InnerProductProof<Secp256k1Point> = bincode::deserialize(&encoded).unwrap();
        assert_eq!(decoded, proof);
    }

    fn linear_case<G: Group>(seed: u8) -> (LinearProof<G>, ProofGens<G>, G, G, Vec<G::Scalar>) {
        let params = tiny_params();
        let gens = ProofGens::<G>::new(&params).unwrap();
        let pool = WorkerPool::new(2).unwrap();
        let mut rng = ChaChaRng::from_seed([seed; 32]);
        let window = params.message_window();
        let n = window.end - window.start;

        let z = random_vec::<G>(n, &mut rng);
        let a: Vec<G::Scalar> = (0..n)
            .map(|i| G::Scalar::from_u64((i % 3 == 0) as u64))
            .collect();
        let o: G::Scalar = random_scalar(&mut rng).unwrap();
        let f = G::base_mul(&G::Scalar::from_u64(1234));
        let h: Vec<G> = gens.H_vec[window].to_vec();

        let P = G::multiscalar_mul(&a, &h)
            + f.scalar_mul(&inner_product(&a, &z))
            + gens.U.scalar_mul(&o);

        let mut transcript = Transcript::from_state([seed; 32]);
        let proof =
            LinearProof::create(&mut transcript, &f, &gens.U, h, z.clone(), a, o, &pool, &mut rng)
                .unwrap();
        (proof, gens, P, f, z)
    }

    #[test]
    fn linear_proof_verifies() {
        let params = tiny_params();
        let (proof, gens, P, f, z) = linear_case::<Secp256k1Point>(6);
        let pool = WorkerPool::sequential();
        let n = z.len();
        assert_eq!(n, 8);

        let mut transcript = Transcript::from_state([6; 32]);
        assert!(proof
            .verify(n, &mut transcript, &P, &f, &gens, params.message_window(), &z, &pool)
            .is_ok());

        let mut other = z.clone();
        other[2] += <Secp256k1Point as Group>::Scalar::one();
        let mut transcript = Transcript::from_state([6; 32]);
        assert!(proof
            .verify(n, &mut transcript, &P, &f, &gens, params.message_window(), &other, &pool)
            .is_err());

        let mut tampered = proof.clone();
        tampered.e2 += <Secp256k1Point as Group>::Scalar::one();
        let mut transcript = Transcript::from_state([6; 32]);
        assert!(tampered
            .verify(n, &mut transcript, &P, &f, &gens, params.message_window(), &z, &pool)
            .is_err());
    }

    #[test]
    fn linear_proof_ristretto() {
        let params = tiny_params();
        let (proof, gens, P, f, z) = linear_case::<RistrettoPoint>(7);
        let pool = WorkerPool::sequential();
        let mut transcript = Transcript::from_state([7; 32]);
        assert!(proof
            .verify(z.len(), &mut transcript, &P, &f, &gens, params.message_window(), &z, &pool)
            .is_ok());
    }

    #[test]
    fn linear_encodings() {
        let (proof, _, _, _, _) = linear_case::<Secp256k1Point>(8);
        let bytes = proof.to_bytes();
        assert_eq!(bytes.len(), 4 + 7 * 64 + 64);
        assert_eq!(LinearProof::from_bytes(&bytes), Ok(proof.clone()));

        let compressed = proof.to_compressed_bytes();
        assert_eq!(compressed.len(), 2 + 7 * 33 + 64);
        assert_eq!(LinearProof::from_compressed_bytes(&compressed), Ok(proof.clone()));

        let mut huge = bytes.clone();
        huge[0] = 0xff;
        assert_eq!(
            LinearProof::<Secp256k1Point>::from_bytes(&huge),
            Err(ProofError::FormatError)
        );

        let encoded = bincode::serialize(&proof).unwrap();
        let decoded: LinearProof<Secp256k1Point> = bincode::deserialize(&encoded).unwrap();
        assert_eq!(decoded, proof);
    }
}
