#![allow(non_snake_case)]
//! The commitment stage and the proving side of both folding arguments.

use std::time::Instant;

use rand::{CryptoRng, RngCore};

use constraints::{generator_factors, operand_vectors, vector_v, vector_z, RandomParameter};
use curve::{Group, ScalarField};
use errors::ProofError;
use generators::ProofGens;
use inner_product_proof::{InnerProductProof, LinearProof};
use lattice::{Ciphertext, PublicKey};
use params::ProtocolParams;
use pool::WorkerPool;
use proof::Proof;
use transcript::Transcript;
use util::{batch_invert, pad_repeat, pad_with, random_scalar};
use witness::{check_public_inputs, Witness, WitnessBits};

/// Produces proofs for one parameter set and generator set.
pub struct Prover<'a, G: Group> {
    params: &'a ProtocolParams,
    gens: &'a ProofGens<G>,
    pool: &'a WorkerPool,
}

impl<'a, G: Group> Prover<'a, G> {
    /// Creates a prover, checking that `gens` was built for `params`.
    pub fn new(
        params: &'a ProtocolParams,
        gens: &'a ProofGens<G>,
        pool: &'a WorkerPool,
    ) -> Result<Self, ProofError> {
        params.validate()?;
        gens.check_capacity(params)?;
        Ok(Prover { params, gens, pool })
    }

    /// Proves that `ct` encrypts, under `pk`, the plaintext in `witness`
    /// using the randomness in `witness`.
    ///
    /// The witness is checked against the ciphertext before any proving
    /// work: a witness that does not open `ct` gives `MalformedWitness`, a
    /// value outside its bit width `WitnessOutOfRange`.
    pub fn prove<R: RngCore + CryptoRng>(
        &self,
        ct: &Ciphertext,
        pk: &PublicKey,
        witness: &Witness,
        rng: &mut R,
    ) -> Result<Proof<G>, ProofError> {
        let bits = WitnessBits::build(self.params, pk, ct, witness)?;
        self.prove_bits(ct, pk, &bits, rng)
    }

    /// Commits to `bits`: set bits go to `H` (into `W3` inside the message
    /// window, `W1` outside), cleared bits to `G` in `W2`.
    fn commit(&self, bits: &[u8], blindings: &[G::Scalar; 3]) -> [G; 3] {
        let gens = self.gens;
        let window = self.params.message_window();
        let partials = self.pool.map_ranges(bits.len(), |r| {
            let mut acc = [G::identity(); 3];
            for i in r {
                if bits[i] == 0 {
                    acc[1] += gens.G_vec[i];
                } else if window.contains(&i) {
                    acc[2] += gens.H_vec[i];
                } else {
                    acc[0] += gens.H_vec[i];
                }
            }
            acc
        });

        let mut W = [G::identity(); 3];
        for partial in partials {
            for k in 0..3 {
                W[k] += partial[k];
            }
        }
        for k in 0..3 {
            W[k] += gens.U.scalar_mul(&blindings[k]);
        }
        W
    }

    pub(crate) fn prove_bits<R: RngCore + CryptoRng>(
        &self,
        ct: &Ciphertext,
        pk: &PublicKey,
        bits: &WitnessBits,
        rng: &mut R,
    ) -> Result<Proof<G>, ProofError> {
        let params = self.params;
        let gens = self.gens;
        let pool = self.pool;
        check_public_inputs(params, ct, pk)?;
        let bits = bits.bits();
        let start = Instant::now();

        let o1: G::Scalar = random_scalar(rng)?;
        let o2: G::Scalar = random_scalar(rng)?;
        let o3: G::Scalar = random_scalar(rng)?;
        let W = self.commit(bits, &[o1, o2, o3]);

        let mut transcript = Transcript::new(ct);
        transcript.commit_points(&W);
        let hashR = G::base_mul(&transcript.challenge_scalar());

        let rp = RandomParameter::derive(params, &W);
        let V = vector_v(params, pk, &rp.gamma, pool);
        let (mut v1, mut v2) = operand_vectors(&V, &rp, bits);
        let mut phi_inv = rp.phi.clone();
        batch_invert(&mut phi_inv);
        let (G_factors, H_factors) = generator_factors(params, &phi_inv, &rp.eta);

        let n = params.padded_len();
        let last = params.witness_len() - 1;
        let G_prime = pool.map_indices(n, |i| gens.mul_g(i.min(last), &G_factors[i]));
        let H_prime = pool.map_indices(n, |i| gens.mul_h(i.min(last), &H_factors[i]));
        pad_with(&mut v1, n, G::Scalar::zero());
        pad_with(&mut v2, n, G::Scalar::zero());
        let o = rp.eta[0] * o1 + rp.eta[1] * o3 + o2;
        trace!("constraints compiled in {:?}", start.elapsed());

        let ipp_proof = InnerProductProof::create(
            &mut transcript,
            &hashR,
            &gens.U,
            G_prime,
            H_prime,
            v1,
            v2,
            o,
            pool,
            rng,
        )?;

        let window = params.message_window();
        let n2 = params.message_padded_len();
        let mut h_vec = gens.H_vec[window.clone()].to_vec();
        pad_repeat(&mut h_vec, n2);
        let mut z_vec = vector_z(params, &rp.beta);
        pad_repeat(&mut z_vec, n2);
        let mut a_vec: Vec<G::Scalar> = bits[window]
            .iter()
            .map(|b| G::Scalar::from_u64(*b as u64))
            .collect();
        pad_with(&mut a_vec, n2, G::Scalar::zero());
        let f = G::base_mul(&rp.theta);

        let linear_proof =
            LinearProof::create(&mut transcript, &f, &gens.U, h_vec, z_vec, a_vec, o3, pool, rng)?;

        debug!(
            "proof created in {:?} ({} + {} rounds, {} workers)",
            start.elapsed(),
            ipp_proof.rounds(),
            linear_proof.rounds(),
            pool.workers()
        );

        Ok(Proof {
            w1: W[0],
            w2: W[1],
            w3: W[2],
            ipp_proof,
            linear_proof,
        })
    }
}
