#![allow(non_snake_case)]
//! The verifying side: recomputes the public vectors and checks both
//! folding arguments.

use std::time::Instant;

use constraints::{generator_factors, target_inner_product, vector_v, vector_z, RandomParameter};
use curve::{Group, ScalarField};
use errors::ProofError;
use generators::ProofGens;
use lattice::{Ciphertext, PublicKey};
use params::ProtocolParams;
use pool::WorkerPool;
use proof::Proof;
use transcript::Transcript;
use util::{batch_invert, pad_repeat};
use witness::check_public_inputs;

/// Checks proofs for one parameter set and generator set.
pub struct Verifier<'a, G: Group> {
    params: &'a ProtocolParams,
    gens: &'a ProofGens<G>,
    pool: &'a WorkerPool,
}

impl<'a, G: Group> Verifier<'a, G> {
    /// Creates a verifier, checking that `gens` was built for `params`.
    pub fn new(
        params: &'a ProtocolParams,
        gens: &'a ProofGens<G>,
        pool: &'a WorkerPool,
    ) -> Result<Self, ProofError> {
        params.validate()?;
        gens.check_capacity(params)?;
        Ok(Verifier { params, gens, pool })
    }

    /// Verifies that `ct` under `pk` and the points `puzzles` encode the
    /// same message.
    pub fn verify(
        &self,
        proof: &Proof<G>,
        ct: &Ciphertext,
        pk: &PublicKey,
        puzzles: &[G],
    ) -> Result<(), ProofError> {
        let params = self.params;
        let gens = self.gens;
        let pool = self.pool;
        let start = Instant::now();

        check_public_inputs(params, ct, pk)?;
        if puzzles.len() != params.puzzle_count() {
            return Err(ProofError::InvalidPuzzleCount {
                expected: params.puzzle_count(),
                actual: puzzles.len(),
            });
        }
        if proof.ipp_proof.rounds() != params.witness_rounds()
            || proof.linear_proof.rounds() != params.message_rounds()
        {
            return Err(ProofError::VerificationError);
        }

        let W = proof.commitments();
        let mut transcript = Transcript::new(ct);
        transcript.commit_points(&W);
        let hashR = G::base_mul(&transcript.challenge_scalar());

        let rp = RandomParameter::derive(params, &W);
        let V = vector_v(params, pk, &rp.gamma, pool);
        let mut phi_inv = rp.phi.clone();
        batch_invert(&mut phi_inv);
        let (G_factors, H_factors) = generator_factors(params, &phi_inv, &rp.eta);

        // Starting point of the first argument.
        let psi = rp.psi;
        let [eta0, eta1] = rp.eta;
        let g_coeffs: Vec<G::Scalar> = V
            .iter()
            .zip(phi_inv.iter())
            .map(|(v, p)| psi + *v * *p)
            .collect();
        let x = target_inner_product(ct, &rp, &V);
        let P = G::multiscalar_mul(
            &[
                eta0,
                G::Scalar::one(),
                eta1,
                eta0 * psi,
                eta1 * psi,
                x,
            ],
            &[
                W[0],
                W[1],
                W[2],
                gens.h_sum_outside,
                gens.h_sum_message,
                hashR,
            ],
        ) + gens.g_multiscalar(&g_coeffs, pool);

        proof.ipp_proof.verify(
            params.padded_len(),
            &mut transcript,
            &P,
            &hashR,
            gens,
            &G_factors,
            &H_factors,
            pool,
        )?;

        // Starting point of the second argument.
        let theta = rp.theta;
        let beta_theta: Vec<G::Scalar> = rp.beta.iter().map(|b| theta * *b).collect();
        let P2 = W[2] + G::multiscalar_mul(&beta_theta, puzzles);
        let f = G::base_mul(&theta);
        let n2 = params.message_padded_len();
        let mut z_vec = vector_z(params, &rp.beta);
        pad_repeat(&mut z_vec, n2);

        proof.linear_proof.verify(
            n2,
            &mut transcript,
            &P2,
            &f,
            gens,
            params.message_window(),
            &z_vec,
            pool,
        )?;

        debug!("proof verified in {:?}", start.elapsed());
        Ok(())
    }
}
