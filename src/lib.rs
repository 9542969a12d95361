#![warn(missing_docs)]

//! A non-interactive zero-knowledge proof that an RLWE ciphertext and a list
//! of elliptic-curve puzzle points encode the same secret bitstream.
//!
//! The prover commits to the bit decomposition of the encryption randomness,
//! the plaintext and the lattice quotient, then opens the commitments with
//! two logarithmic-size folding arguments: one for the batched lattice and
//! range relation, one for the base-`step` decoding of the plaintext into the
//! puzzle exponents.
//!
//! ```ignore
//! let params = ProtocolParams::default();
//! let gens = ProofGens::<Secp256k1Point>::new(&params)?;
//! let pool = WorkerPool::default();
//!
//! let proof = Prover::new(&params, &gens, &pool)?.prove(&ct, &pk, &witness, &mut rng)?;
//! Verifier::new(&params, &gens, &pool)?.verify(&proof, &ct, &pk, &puzzles)?;
//! ```

extern crate byteorder;
extern crate clear_on_drop;
extern crate curve25519_dalek;
extern crate digest;
extern crate k256;
extern crate rand;
extern crate rayon;
extern crate sha2;
extern crate sha3;
extern crate subtle;
#[macro_use]
extern crate serde_derive;
#[macro_use]
extern crate failure;
#[macro_use]
extern crate log;
extern crate serde;

#[cfg(test)]
extern crate bincode;
#[cfg(test)]
extern crate hex;
#[cfg(test)]
extern crate rand_chacha;

mod util;

mod constraints;
pub mod curve;
mod errors;
mod generators;
mod inner_product_proof;
pub mod lattice;
mod params;
mod pool;
mod proof;
mod prover;
pub mod puzzle;
mod transcript;
mod verifier;
mod witness;

pub use constraints::RandomParameter;
pub use errors::ProofError;
pub use generators::{FixedBaseTable, ProofGens};
pub use inner_product_proof::{InnerProductProof, LinearProof};
pub use params::ProtocolParams;
pub use pool::WorkerPool;
pub use proof::Proof;
pub use prover::Prover;
pub use transcript::{challenge_data, Transcript};
pub use verifier::Verifier;
pub use witness::Witness;
