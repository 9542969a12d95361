//! The prover's secret: encryption randomness and plaintext, and the bit
//! decomposition the commitments are made to.

use std::convert::TryFrom;

use clear_on_drop::clear::Clear;

use errors::ProofError;
use lattice::{Ciphertext, EncryptionRandomness, PublicKey};
use params::ProtocolParams;

/// The opening of a ciphertext: `T0 = P0·u + e1 + Delta·m`,
/// `T1 = P1·u + e2` modulo `Q`.
#[derive(Clone, Debug)]
pub struct Witness {
    /// Ephemeral secret.
    pub u: Vec<i32>,
    /// Error term of `T0`.
    pub e1: Vec<i32>,
    /// Error term of `T1`.
    pub e2: Vec<i32>,
    /// Plaintext.
    pub m: Vec<i32>,
}

impl Witness {
    /// Assembles a witness from the randomness an encryption returned and
    /// the plaintext it encrypted.
    pub fn new(randomness: &EncryptionRandomness, message: &[i32]) -> Witness {
        Witness {
            u: randomness.u.clone(),
            e1: randomness.e1.clone(),
            e2: randomness.e2.clone(),
            m: message.to_vec(),
        }
    }

    fn check_lengths(&self, d: usize) -> Result<(), ProofError> {
        for v in [&self.u, &self.e1, &self.e2, &self.m].iter() {
            if v.len() != d {
                return Err(ProofError::InvalidInputLength {
                    expected: d,
                    actual: v.len(),
                });
            }
        }
        Ok(())
    }
}

impl Drop for Witness {
    fn drop(&mut self) {
        for c in self
            .u
            .iter_mut()
            .chain(self.e1.iter_mut())
            .chain(self.e2.iter_mut())
            .chain(self.m.iter_mut())
        {
            c.clear();
        }
    }
}

/// Checks that `ct` and `pk` have the ring dimension and centred
/// coefficients.
pub(crate) fn check_public_inputs(
    params: &ProtocolParams,
    ct: &Ciphertext,
    pk: &PublicKey,
) -> Result<(), ProofError> {
    let d = params.d;
    let half = params.q / 2;
    for (k, v) in [&ct.t0, &ct.t1, &pk.p0, &pk.p1].iter().enumerate() {
        if v.len() != d {
            return Err(ProofError::InvalidInputLength {
                expected: d,
                actual: v.len(),
            });
        }
        if let Some(i) = v.iter().position(|c| *c < -half || *c >= half) {
            return Err(ProofError::CoefficientOutOfRange { index: k * d + i });
        }
    }
    Ok(())
}

/// `p·u` in `Z[x]/(x^D + 1)` without reduction modulo `Q`.
fn rotation_product(p: &[i32], u: &[i32]) -> Vec<i128> {
    let d = p.len();
    (0..d)
        .map(|i| {
            let mut acc = 0i128;
            for j in 0..=i {
                acc += p[i - j] as i128 * u[j] as i128;
            }
            for j in i + 1..d {
                acc -= p[i + d - j] as i128 * u[j] as i128;
            }
            acc
        })
        .collect()
}

/// The quotient `R = (T - A·S) / Q`, first the `T0` half then the `T1`
/// half, where `A·S` is the unreduced right-hand side of the encryption.
///
/// A quotient coefficient that does not fit an `i32` is reported as
/// `WitnessOutOfRange` at its offset in the quotient region.
pub(crate) fn relation_quotient(
    params: &ProtocolParams,
    pk: &PublicKey,
    ct: &Ciphertext,
    witness: &Witness,
) -> Result<Vec<i32>, ProofError> {
    let d = params.d;
    let q = params.q as i128;
    let delta = params.delta() as i128;

    let mut as0 = rotation_product(&pk.p0, &witness.u);
    for i in 0..d {
        as0[i] += witness.e1[i] as i128 + delta * witness.m[i] as i128;
    }
    let mut as1 = rotation_product(&pk.p1, &witness.u);
    for i in 0..d {
        as1[i] += witness.e2[i] as i128;
    }

    let targets = ct.t0.iter().chain(ct.t1.iter());
    let residuals = as0.iter().chain(as1.iter());
    targets
        .zip(residuals)
        .enumerate()
        .map(|(index, (t, a))| {
            let diff = *t as i128 - *a;
            if diff % q != 0 {
                return Err(ProofError::MalformedWitness { index });
            }
            i32::try_from(diff / q).map_err(|_| ProofError::WitnessOutOfRange {
                index: params.quotient_offset() + index * params.b1,
            })
        })
        .collect()
}

/// The witness bitstream: `U ‖ E1 ‖ E2 ‖ M ‖ R`, every value as its
/// two's-complement bits, least significant first.
pub(crate) struct WitnessBits {
    bits: Vec<u8>,
}

impl WitnessBits {
    /// Checks `witness` against the ciphertext and decomposes it.
    pub(crate) fn build(
        params: &ProtocolParams,
        pk: &PublicKey,
        ct: &Ciphertext,
        witness: &Witness,
    ) -> Result<WitnessBits, ProofError> {
        check_public_inputs(params, ct, pk)?;
        witness.check_lengths(params.d)?;

        let mut decomposed = WitnessBits {
            bits: vec![0u8; params.witness_len()],
        };
        // Range checks on the witness come before any arithmetic on it.
        let inputs: [(&[i32], usize); 4] = [
            (&witness.u[..], params.b),
            (&witness.e1[..], params.b),
            (&witness.e2[..], params.b),
            (&witness.m[..], params.b_prime),
        ];
        let offset = decomposed.write_regions(0, &inputs)?;

        let mut quotient = relation_quotient(params, pk, ct, witness)?;
        let result = decomposed.write_regions(offset, &[(&quotient[..], params.b1)]);
        for r in quotient.iter_mut() {
            r.clear();
        }
        let end = result?;
        debug_assert_eq!(end, decomposed.bits.len());
        Ok(decomposed)
    }

    /// Writes `regions` from bit `offset` on, returning the offset after
    /// the last one.
    fn write_regions(
        &mut self,
        mut offset: usize,
        regions: &[(&[i32], usize)],
    ) -> Result<usize, ProofError> {
        for &(values, width) in regions.iter() {
            write_region(&mut self.bits[offset..], offset, values, width)?;
            offset += values.len() * width;
        }
        Ok(offset)
    }

    #[cfg(test)]
    pub(crate) fn from_bits(bits: Vec<u8>) -> WitnessBits {
        WitnessBits { bits }
    }

    pub(crate) fn bits(&self) -> &[u8] {
        &self.bits
    }

    #[cfg(test)]
    pub(crate) fn flip(&mut self, i: usize) {
        self.bits[i] ^= 1;
    }
}

impl Drop for WitnessBits {
    fn drop(&mut self) {
        for b in self.bits.iter_mut() {
            b.clear();
        }
    }
}

fn write_region(
    out: &mut [u8],
    offset: usize,
    values: &[i32],
    width: usize,
) -> Result<(), ProofError> {
    let lo = -(1i64 << (width - 1));
    let hi = 1i64 << (width - 1);
    for (i, v) in values.iter().enumerate() {
        let v = *v as i64;
        if v < lo || v >= hi {
            return Err(ProofError::WitnessOutOfRange {
                index: offset + i * width,
            });
        }
        for k in 0..width {
            out[i * width + k] = ((v as u32 >> k) & 1) as u8;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lattice;
    use rand::SeedableRng;
    use rand_chacha::ChaChaRng;

    fn small_params() -> ProtocolParams {
        ProtocolParams {
            d: 16,
            chunk_len: 16,
            b1: 5,
            ..ProtocolParams::default()
        }
    }

    fn value_of(bits: &[u8]) -> i64 {
        let w = bits.len();
        let mut v = 0i64;
        for (k, b) in bits.iter().enumerate() {
            let weight = if k + 1 == w { -(1i64 << k) } else { 1i64 << k };
            v += weight * *b as i64;
        }
        v
    }

    #[test]
    fn twos_complement_regions() {
        let mut out = vec![0u8; 8];
        write_region(&mut out, 0, &[-1, 0, 1, -2], 2).unwrap();
        assert_eq!(out, vec![1, 1, 0, 0, 1, 0, 0, 1]);

        let mut out = vec![0u8; 2];
        write_region(&mut out, 0, &[-1, 0], 1).unwrap();
        assert_eq!(out, vec![1, 0]);

        let mut out = vec![0u8; 4];
        assert_eq!(
            write_region(&mut out, 40, &[0, 2], 2),
            Err(ProofError::WitnessOutOfRange { index: 42 })
        );
        assert_eq!(
            write_region(&mut out, 0, &[1], 1),
            Err(ProofError::WitnessOutOfRange { index: 0 })
        );
    }

    #[test]
    fn bitstream_decodes_to_the_witness() {
        let params = small_params();
        let mut rng = ChaChaRng::from_seed([9u8; 32]);
        let (_, pk) = lattice::keygen(&params, &mut rng).unwrap();
        let m = lattice::sample_message(&params, &mut rng).unwrap();
        let (ct, r) = lattice::encrypt(&params, &pk, &m, &mut rng).unwrap();
        let witness = Witness::new(&r, &m);

        let wb = WitnessBits::build(&params, &pk, &ct, &witness).unwrap();
        let bits = wb.bits();
        assert_eq!(bits.len(), params.witness_len());
        assert!(bits.iter().all(|b| *b <= 1));

        let window = params.message_window();
        for i in 0..params.d {
            assert_eq!(value_of(&bits[i..i + 1]), witness.u[i] as i64);
            let s = window.start + i * params.b_prime;
            assert_eq!(value_of(&bits[s..s + params.b_prime]), m[i] as i64);
        }

        let quotient = relation_quotient(&params, &pk, &ct, &witness).unwrap();
        let off = params.quotient_offset();
        for (i, r) in quotient.iter().enumerate() {
            let s = off + i * params.b1;
            assert_eq!(value_of(&bits[s..s + params.b1]), *r as i64);
        }
    }

    #[test]
    fn quotient_reconstructs_the_ciphertext() {
        let params = small_params();
        let mut rng = ChaChaRng::from_seed([10u8; 32]);
        let (_, pk) = lattice::keygen(&params, &mut rng).unwrap();
        let m = lattice::sample_message(&params, &mut rng).unwrap();
        let (ct, r) = lattice::encrypt(&params, &pk, &m, &mut rng).unwrap();
        let witness = Witness::new(&r, &m);
        let quotient = relation_quotient(&params, &pk, &ct, &witness).unwrap();

        let q = params.q as i128;
        let as0 = rotation_product(&pk.p0, &witness.u);
        for i in 0..params.d {
            let rhs = as0[i]
                + witness.e1[i] as i128
                + params.delta() as i128 * m[i] as i128
                + q * quotient[i] as i128;
            assert_eq!(rhs, ct.t0[i] as i128);
        }
        // |R| stays well inside a 5-bit window for D = 16.
        assert!(quotient.iter().all(|r| r.abs() <= 9));
    }

    #[test]
    fn tampered_witness_is_malformed() {
        let params = small_params();
        let mut rng = ChaChaRng::from_seed([11u8; 32]);
        let (_, pk) = lattice::keygen(&params, &mut rng).unwrap();
        let m = lattice::sample_message(&params, &mut rng).unwrap();
        let (ct, r) = lattice::encrypt(&params, &pk, &m, &mut rng).unwrap();
        let mut witness = Witness::new(&r, &m);
        witness.e2[3] = if witness.e2[3] == 0 { -1 } else { 0 };
        assert_eq!(
            WitnessBits::build(&params, &pk, &ct, &witness).err(),
            Some(ProofError::MalformedWitness {
                index: params.d + 3
            })
        );
    }

    #[test]
    fn short_inputs_are_rejected() {
        let params = small_params();
        let mut rng = ChaChaRng::from_seed([12u8; 32]);
        let (_, pk) = lattice::keygen(&params, &mut rng).unwrap();
        let m = lattice::sample_message(&params, &mut rng).unwrap();
        let (mut ct, r) = lattice::encrypt(&params, &pk, &m, &mut rng).unwrap();
        let mut witness = Witness::new(&r, &m);
        witness.m.pop();
        assert_eq!(
            WitnessBits::build(&params, &pk, &ct, &witness).err(),
            Some(ProofError::InvalidInputLength {
                expected: 16,
                actual: 15
            })
        );
        ct.t1.push(0);
        assert_eq!(
            check_public_inputs(&params, &ct, &pk),
            Err(ProofError::InvalidInputLength {
                expected: 16,
                actual: 17
            })
        );
    }

    #[test]
    fn unreduced_public_inputs_are_rejected() {
        let params = small_params();
        let mut rng = ChaChaRng::from_seed([13u8; 32]);
        let (_, mut pk) = lattice::keygen(&params, &mut rng).unwrap();
        let m = lattice::sample_message(&params, &mut rng).unwrap();
        let (mut ct, r) = lattice::encrypt(&params, &pk, &m, &mut rng).unwrap();
        let mut witness = Witness::new(&r, &m);
        witness.u = vec![i32::max_value(); 16];

        ct.t1[5] = params.q / 2;
        assert_eq!(
            check_public_inputs(&params, &ct, &pk),
            Err(ProofError::CoefficientOutOfRange { index: 21 })
        );
        ct.t1[5] = -params.q / 2;
        assert!(check_public_inputs(&params, &ct, &pk).is_ok());

        pk.p0 = vec![i32::max_value(); 16];
        assert_eq!(
            WitnessBits::build(&params, &pk, &ct, &witness).err(),
            Some(ProofError::CoefficientOutOfRange { index: 32 })
        );
    }

    #[test]
    fn range_is_checked_before_the_relation() {
        let params = small_params();
        let mut rng = ChaChaRng::from_seed([14u8; 32]);
        let (_, pk) = lattice::keygen(&params, &mut rng).unwrap();
        let m = lattice::sample_message(&params, &mut rng).unwrap();
        let (ct, r) = lattice::encrypt(&params, &pk, &m, &mut rng).unwrap();

        // Out of the 1-bit range and inconsistent with the ciphertext.
        let mut witness = Witness::new(&r, &m);
        witness.e1[2] = 5;
        assert_eq!(
            WitnessBits::build(&params, &pk, &ct, &witness).err(),
            Some(ProofError::WitnessOutOfRange {
                index: params.d + 2
            })
        );

        let mut witness = Witness::new(&r, &m);
        witness.u = vec![i32::max_value(); 16];
        assert_eq!(
            WitnessBits::build(&params, &pk, &ct, &witness).err(),
            Some(ProofError::WitnessOutOfRange { index: 0 })
        );
    }

    #[test]
    fn oversized_quotient_is_out_of_range() {
        let params = small_params();
        let q = params.q as i128;
        let pk = PublicKey {
            p0: vec![params.q / 2 - 1; 16],
            p1: vec![params.q / 2 - 1; 16],
        };
        let zeros = vec![0i32; 16];
        let witness = Witness {
            u: vec![(1 << 30) - 1; 16],
            e1: zeros.clone(),
            e2: zeros.clone(),
            m: zeros,
        };
        // A ciphertext the witness opens exactly, with huge quotients.
        let reduce = |a: &i128| {
            let t = ((a % q) + q) % q;
            (if t >= q / 2 { t - q } else { t }) as i32
        };
        let t0: Vec<i32> = rotation_product(&pk.p0, &witness.u).iter().map(&reduce).collect();
        let t1: Vec<i32> = rotation_product(&pk.p1, &witness.u).iter().map(&reduce).collect();
        let ct = Ciphertext { t0, t1 };

        assert_eq!(
            relation_quotient(&params, &pk, &ct, &witness),
            Err(ProofError::WitnessOutOfRange {
                index: params.quotient_offset()
            })
        );
    }
}
