//! The `generators` module contains API for producing a
//! set of generators for the witness commitments and the folding arguments.

#![allow(non_snake_case)]
#![deny(missing_docs)]

use std::marker::PhantomData;
use std::ops::Range;

use byteorder::{BigEndian, ByteOrder};
use digest::{ExtendableOutput, Update, XofReader};
use sha3::Shake256;

use curve::{Group, ScalarField};
use errors::ProofError;
use params::ProtocolParams;
use pool::WorkerPool;

/// Number of 32-bit limbs in a scalar, and so of stored multiples in a
/// [`FixedBaseTable`].
const TABLE_LIMBS: usize = 8;

/// The `GeneratorsChain` creates an arbitrary-long sequence of orthogonal
/// generators. The sequence can be deterministically produced starting with
/// an arbitrary label.
struct GeneratorsChain<G: Group> {
    reader: <Shake256 as ExtendableOutput>::Reader,
    _group: PhantomData<G>,
}

impl<G: Group> GeneratorsChain<G> {
    /// Creates a chain of generators, determined by the hash of `label`.
    fn new(label: &[u8]) -> Self {
        let mut shake = Shake256::default();
        shake.update(b"GeneratorsChain");
        shake.update(label);

        GeneratorsChain {
            reader: shake.finalize_xof(),
            _group: PhantomData,
        }
    }
}

impl<G: Group> Iterator for GeneratorsChain<G> {
    type Item = G;

    fn next(&mut self) -> Option<Self::Item> {
        // Candidates that miss the curve are skipped; the chain never ends.
        loop {
            let mut uniform_bytes = [0u8; 64];
            self.reader.read(&mut uniform_bytes);
            if let Some(point) = G::hash_to_point(&uniform_bytes) {
                if !point.is_identity() {
                    return Some(point);
                }
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (usize::max_value(), None)
    }
}

/// Precomputed multiples `2^(32k)·P`, `k < 8`, of a fixed point `P`.
///
/// A scalar is split into eight 32-bit limbs which are processed together
/// in a single 32-step double-and-add pass.
#[derive(Clone, Debug, PartialEq)]
pub struct FixedBaseTable<G: Group> {
    multiples: Vec<G>,
}

impl<G: Group> FixedBaseTable<G> {
    /// Builds the table for `point`.
    pub fn new(point: &G) -> Self {
        let mut multiples = Vec::with_capacity(TABLE_LIMBS);
        let mut p = *point;
        for k in 0..TABLE_LIMBS {
            multiples.push(p);
            if k + 1 < TABLE_LIMBS {
                for _ in 0..32 {
                    p = p.double();
                }
            }
        }
        FixedBaseTable { multiples }
    }

    /// The point the table was built for.
    pub fn point(&self) -> &G {
        &self.multiples[0]
    }

    /// Computes `k·P`.
    pub fn mul(&self, k: &G::Scalar) -> G {
        let bytes = k.to_canonical_bytes();
        let mut limbs = [0u32; TABLE_LIMBS];
        for (j, limb) in limbs.iter_mut().enumerate() {
            let end = 32 - 4 * j;
            *limb = BigEndian::read_u32(&bytes[end - 4..end]);
        }

        let mut acc = G::identity();
        for bit in (0..32).rev() {
            acc = acc.double();
            for (limb, multiple) in limbs.iter().zip(self.multiples.iter()) {
                if (limb >> bit) & 1 == 1 {
                    acc += *multiple;
                }
            }
        }
        acc
    }

    /// Serialized size in bytes.
    pub fn serialized_size() -> usize {
        TABLE_LIMBS * G::UNCOMPRESSED_SIZE
    }

    /// Exports the multiples in the fixed-width point format.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(Self::serialized_size());
        for p in self.multiples.iter() {
            buf.extend_from_slice(&p.to_uncompressed_bytes());
        }
        buf
    }

    /// Imports a table written by [`to_bytes`](FixedBaseTable::to_bytes).
    ///
    /// Every stored multiple is recomputed from the first one; a table
    /// whose multiples do not match is a `FormatError`.
    pub fn from_bytes(slice: &[u8]) -> Result<Self, ProofError> {
        if slice.len() != Self::serialized_size() {
            return Err(ProofError::FormatError);
        }
        let multiples = slice
            .chunks(G::UNCOMPRESSED_SIZE)
            .map(G::from_uncompressed_bytes)
            .collect::<Result<Vec<_>, _>>()?;
        let table = FixedBaseTable { multiples };
        if table != FixedBaseTable::new(table.point()) {
            return Err(ProofError::FormatError);
        }
        Ok(table)
    }
}

/// The generators `G`, `H` (one per witness bit) and `U` (blinding) of the
/// witness commitments, along with the public sums of `H` over the message
/// window and over the rest of the witness.
#[derive(Clone, Debug)]
pub struct ProofGens<G: Group> {
    pub(crate) G_vec: Vec<G>,
    pub(crate) H_vec: Vec<G>,
    pub(crate) U: G,
    /// `Σ H_i` over indices outside the message window.
    pub(crate) h_sum_outside: G,
    /// `Σ H_i` over the message window.
    pub(crate) h_sum_message: G,
    window: Range<usize>,
    g_tables: Vec<FixedBaseTable<G>>,
    h_tables: Vec<FixedBaseTable<G>>,
}

impl<G: Group> ProofGens<G> {
    /// Derives the generators for `params` deterministically.
    pub fn new(params: &ProtocolParams) -> Result<Self, ProofError> {
        params.validate()?;
        let n = params.witness_len();
        let G_vec: Vec<G> = GeneratorsChain::new(b"G").take(n).collect();
        let H_vec: Vec<G> = GeneratorsChain::new(b"H").take(n).collect();
        let U = GeneratorsChain::new(b"U")
            .next()
            .ok_or(ProofError::InvalidGeneratorsLength)?;
        debug!("derived {} generator pairs", n);
        ProofGens::from_points(params, G_vec, H_vec, U)
    }

    fn from_points(
        params: &ProtocolParams,
        G_vec: Vec<G>,
        H_vec: Vec<G>,
        U: G,
    ) -> Result<Self, ProofError> {
        let n = params.witness_len();
        if G_vec.len() != n || H_vec.len() != n {
            return Err(ProofError::InvalidGeneratorsLength);
        }
        let window = params.message_window();
        let mut h_sum_outside = G::identity();
        let mut h_sum_message = G::identity();
        for (i, h) in H_vec.iter().enumerate() {
            if window.contains(&i) {
                h_sum_message += *h;
            } else {
                h_sum_outside += *h;
            }
        }
        Ok(ProofGens {
            G_vec,
            H_vec,
            U,
            h_sum_outside,
            h_sum_message,
            window,
            g_tables: Vec::new(),
            h_tables: Vec::new(),
        })
    }

    /// Number of generator pairs.
    pub fn len(&self) -> usize {
        self.G_vec.len()
    }

    /// Checks that these generators were built for `params`.
    pub(crate) fn check_capacity(&self, params: &ProtocolParams) -> Result<(), ProofError> {
        if self.len() != params.witness_len() || self.window != params.message_window() {
            return Err(ProofError::InvalidGeneratorsLength);
        }
        Ok(())
    }

    /// Returns `true` when fixed-base tables are attached.
    pub fn has_tables(&self) -> bool {
        !self.g_tables.is_empty()
    }

    /// Builds a fixed-base table for every `G_i` and `H_i`.
    pub fn precompute_tables(&mut self, pool: &WorkerPool) {
        let G_vec = &self.G_vec;
        let H_vec = &self.H_vec;
        self.g_tables = pool.map_indices(G_vec.len(), |i| FixedBaseTable::new(&G_vec[i]));
        self.h_tables = pool.map_indices(H_vec.len(), |i| FixedBaseTable::new(&H_vec[i]));
    }

    /// Exports the tables of `G` then `H`, or `None` if none were built.
    pub fn export_tables(&self) -> Option<Vec<u8>> {
        if !self.has_tables() {
            return None;
        }
        let mut buf =
            Vec::with_capacity(2 * self.len() * FixedBaseTable::<G>::serialized_size());
        for table in self.g_tables.iter().chain(self.h_tables.iter()) {
            buf.extend_from_slice(&table.to_bytes());
        }
        Some(buf)
    }

    /// Imports tables written by [`export_tables`](ProofGens::export_tables).
    /// Each table must belong to the matching generator.
    pub fn import_tables(&mut self, slice: &[u8]) -> Result<(), ProofError> {
        let size = FixedBaseTable::<G>::serialized_size();
        let n = self.len();
        if slice.len() != 2 * n * size {
            return Err(ProofError::FormatError);
        }
        let tables = slice
            .chunks(size)
            .map(FixedBaseTable::<G>::from_bytes)
            .collect::<Result<Vec<_>, _>>()?;
        let owners = self.G_vec.iter().chain(self.H_vec.iter());
        if tables.iter().zip(owners).any(|(t, p)| t.point() != p) {
            return Err(ProofError::FormatError);
        }
        let mut tables = tables;
        self.h_tables = tables.split_off(n);
        self.g_tables = tables;
        Ok(())
    }

    /// Serializes `G`, `H` and `U` in the fixed-width point format.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity((2 * self.len() + 1) * G::UNCOMPRESSED_SIZE);
        for p in self.G_vec.iter().chain(self.H_vec.iter()) {
            buf.extend_from_slice(&p.to_uncompressed_bytes());
        }
        buf.extend_from_slice(&self.U.to_uncompressed_bytes());
        buf
    }

    /// Deserializes generators written by [`to_bytes`](ProofGens::to_bytes).
    pub fn from_bytes(params: &ProtocolParams, slice: &[u8]) -> Result<Self, ProofError> {
        params.validate()?;
        let n = params.witness_len();
        let size = G::UNCOMPRESSED_SIZE;
        if slice.len() != (2 * n + 1) * size {
            return Err(ProofError::FormatError);
        }
        let mut points = slice
            .chunks(size)
            .map(G::from_uncompressed_bytes)
            .collect::<Result<Vec<_>, _>>()?;
        let U = points.pop().ok_or(ProofError::FormatError)?;
        let H_vec = points.split_off(n);
        ProofGens::from_points(params, points, H_vec, U)
    }

    /// `k·G_i`, using the table if one is attached.
    pub(crate) fn mul_g(&self, i: usize, k: &G::Scalar) -> G {
        match self.g_tables.get(i) {
            Some(table) => table.mul(k),
            None => self.G_vec[i].scalar_mul(k),
        }
    }

    /// `k·H_i`, using the table if one is attached.
    pub(crate) fn mul_h(&self, i: usize, k: &G::Scalar) -> G {
        match self.h_tables.get(i) {
            Some(table) => table.mul(k),
            None => self.H_vec[i].scalar_mul(k),
        }
    }

    /// `Σ scalars[i]·G_i`.
    pub(crate) fn g_multiscalar(&self, scalars: &[G::Scalar], pool: &WorkerPool) -> G {
        if self.has_tables() {
            self.table_multiscalar(&self.g_tables[..scalars.len()], scalars, pool)
        } else {
            pool.multiscalar_mul(scalars, &self.G_vec[..scalars.len()])
        }
    }

    /// `Σ scalars[i]·H_{offset + i}`.
    pub(crate) fn h_multiscalar(
        &self,
        offset: usize,
        scalars: &[G::Scalar],
        pool: &WorkerPool,
    ) -> G {
        let range = offset..offset + scalars.len();
        if self.has_tables() {
            self.table_multiscalar(&self.h_tables[range], scalars, pool)
        } else {
            pool.multiscalar_mul(scalars, &self.H_vec[range])
        }
    }

    fn table_multiscalar(
        &self,
        tables: &[FixedBaseTable<G>],
        scalars: &[G::Scalar],
        pool: &WorkerPool,
    ) -> G {
        let zero = G::Scalar::zero();
        pool.map_ranges(scalars.len(), |r| {
            let mut acc = G::identity();
            for i in r {
                if scalars[i] != zero {
                    acc += tables[i].mul(&scalars[i]);
                }
            }
            acc
        })
        .into_iter()
        .fold(G::identity(), |acc, p| acc + p)
    }
}
