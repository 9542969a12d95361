//! Compiles the lattice relation, the bit constraints and the puzzle
//! decoding into the public vectors the folding arguments run on.
//!
//! All challenges of the batching step come from a single
//! [`RandomParameter`] bundle, expanded from the hash of the three witness
//! commitments.

#![allow(non_snake_case)]

use byteorder::{BigEndian, ByteOrder};

use curve::{Group, ScalarField};
use lattice::{Ciphertext, PublicKey};
use params::ProtocolParams;
use pool::WorkerPool;
use transcript::{challenge_data, sha256};

/// The batching challenges.
#[derive(Clone, Debug, PartialEq)]
pub struct RandomParameter<S: ScalarField> {
    /// Leading challenge of the bundle.
    pub alpha: S,
    /// One weight per puzzle point.
    pub beta: Vec<S>,
    /// One weight per coefficient of `T0 ‖ T1`.
    pub gamma: Vec<S>,
    /// Scales the puzzle base in the second sub-proof.
    pub theta: S,
    /// Weights of the `H` generators outside and inside the message window.
    pub eta: [S; 2],
    /// Shift applied to both operand vectors.
    pub psi: S,
    /// One weight per witness bit.
    pub phi: Vec<S>,
}

impl<S: ScalarField> RandomParameter<S> {
    /// Expands the bundle from the commitments `[W1, W2, W3]`.
    ///
    /// Scalar `n` of the bundle is `SHA-256(seed ‖ u32_be(n)) mod N` with
    /// `seed = SHA-256(W1 ‖ W2 ‖ W3)`.
    pub fn derive<G: Group<Scalar = S>>(params: &ProtocolParams, commitments: &[G; 3]) -> Self {
        let seed = challenge_data::<G>(&[], &commitments[..], &[]);
        let mut counter = 0u32;
        let mut next = || {
            let mut data = [0u8; 36];
            data[..32].copy_from_slice(&seed);
            BigEndian::write_u32(&mut data[32..], counter);
            counter += 1;
            S::from_hash(&sha256(&data))
        };
        let mut draw = |n: usize| (0..n).map(|_| next()).collect::<Vec<S>>();

        let alpha = draw(1)[0];
        let beta = draw(params.puzzle_count());
        let gamma = draw(2 * params.d);
        let theta = draw(1)[0];
        let eta = draw(2);
        let psi = draw(1)[0];
        let phi = draw(params.witness_len());

        RandomParameter {
            alpha,
            beta,
            gamma,
            theta,
            eta: [eta[0], eta[1]],
            psi,
            phi,
        }
    }
}

/// Weights of a `width`-bit two's-complement value:
/// `(1, 2, .., 2^(width-2), -2^(width-1))`.
pub(crate) fn two_complement_weights<S: ScalarField>(width: usize) -> Vec<S> {
    (0..width)
        .map(|k| {
            let w = S::from_u64(1u64 << k);
            if k + 1 == width {
                -w
            } else {
                w
            }
        })
        .collect()
}

/// The vector `V` with `⟨V, b⟩ = Σ_j gamma_j·T_j` for the honest bitstream
/// `b`.
///
/// Each `U` value is weighted by its column of the gamma-combined rotation
/// matrices of `P0` and `P1`; the other regions carry their gamma weight
/// scaled by `1`, `Delta` or `Q`.
pub(crate) fn vector_v<S: ScalarField>(
    params: &ProtocolParams,
    pk: &PublicKey,
    gamma: &[S],
    pool: &WorkerPool,
) -> Vec<S> {
    let d = params.d;
    let p0 = &pk.p0;
    let p1 = &pk.p1;
    let rot: Vec<S> = pool.map_indices(d, |i| {
        let mut acc = S::zero();
        for j in 0..d {
            let (c0, c1) = if j >= i {
                (p0[j - i] as i64, p1[j - i] as i64)
            } else {
                (-(p0[j + d - i] as i64), -(p1[j + d - i] as i64))
            };
            acc += gamma[j] * S::from_i64(c0) + gamma[d + j] * S::from_i64(c1);
        }
        acc
    });

    let wt_b = two_complement_weights::<S>(params.b);
    let wt_bp = two_complement_weights::<S>(params.b_prime);
    let wt_b1 = two_complement_weights::<S>(params.b1);
    let delta = S::from_i64(params.delta() as i64);
    let q = S::from_i64(params.q as i64);

    let mut V = Vec::with_capacity(params.witness_len());
    push_region(&mut V, rot.iter().cloned(), &wt_b);
    push_region(&mut V, gamma[..d].iter().cloned(), &wt_b);
    push_region(&mut V, gamma[d..].iter().cloned(), &wt_b);
    push_region(&mut V, gamma[..d].iter().map(|g| *g * delta), &wt_bp);
    push_region(&mut V, gamma.iter().map(|g| *g * q), &wt_b1);

    debug_assert_eq!(V.len(), params.witness_len());
    V
}

fn push_region<S, I>(out: &mut Vec<S>, coeffs: I, weights: &[S])
where
    S: ScalarField,
    I: Iterator<Item = S>,
{
    for c in coeffs {
        for w in weights.iter() {
            out.push(c * *w);
        }
    }
}

/// The vector `Z` over the message window: the beta-weighted rows of the
/// chunk matrix `Box[j][i] = step^(i - j·chunk_len)`, expanded per bit.
pub(crate) fn vector_z<S: ScalarField>(params: &ProtocolParams, beta: &[S]) -> Vec<S> {
    let wt_bp = two_complement_weights::<S>(params.b_prime);
    let step = S::from_u64(params.step as u64);
    let mut Z = Vec::with_capacity(params.message_len());
    for j in 0..params.puzzle_count() {
        let mut power = beta[j];
        for _ in 0..params.chunk_len {
            for w in wt_bp.iter() {
                Z.push(power * *w);
            }
            power *= step;
        }
    }
    Z
}

/// The SubProof1 operands `(v1, v2)` for bitstream `bits`:
/// `v1 = V + Phi∘[b = 0] + Psi·Phi` and `v2 = Psi + b`.
pub(crate) fn operand_vectors<S: ScalarField>(
    V: &[S],
    rp: &RandomParameter<S>,
    bits: &[u8],
) -> (Vec<S>, Vec<S>) {
    let psi = rp.psi;
    let one = S::one();
    let v1 = V
        .iter()
        .zip(rp.phi.iter())
        .zip(bits.iter())
        .map(|((v, phi), b)| {
            let shifted = *v + *phi * psi;
            if *b == 0 {
                shifted + *phi
            } else {
                shifted
            }
        })
        .collect();
    let v2 = bits
        .iter()
        .map(|b| if *b == 0 { psi } else { psi + one })
        .collect();
    (v1, v2)
}

/// Generator factors over the padded length: `gF[i] = Phi[min(i, L-1)]⁻¹`
/// and `hF[i] = Eta[1]` inside the message window, `Eta[0]` elsewhere.
pub(crate) fn generator_factors<S: ScalarField>(
    params: &ProtocolParams,
    phi_inv: &[S],
    eta: &[S; 2],
) -> (Vec<S>, Vec<S>) {
    let n = params.padded_len();
    let last = params.witness_len() - 1;
    let window = params.message_window();
    let gF = (0..n).map(|i| phi_inv[i.min(last)]).collect();
    let hF = (0..n)
        .map(|i| if window.contains(&i) { eta[1] } else { eta[0] })
        .collect();
    (gF, hF)
}

/// `x = ⟨v1, v2⟩` as the verifier computes it from public data:
/// `Σ_j gamma_j·T_j + Psi·ΣV + (Psi + Psi²)·ΣPhi`.
pub(crate) fn target_inner_product<S: ScalarField>(
    ct: &Ciphertext,
    rp: &RandomParameter<S>,
    V: &[S],
) -> S {
    let psi = rp.psi;
    let mut x = S::zero();
    for (t, g) in ct.t0.iter().chain(ct.t1.iter()).zip(rp.gamma.iter()) {
        x += S::from_i64(*t as i64) * *g;
    }
    let sum_v = V.iter().fold(S::zero(), |acc, v| acc + *v);
    let sum_phi = rp.phi.iter().fold(S::zero(), |acc, p| acc + *p);
    x + psi * sum_v + (psi + psi * psi) * sum_phi
}
