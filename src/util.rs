#![deny(missing_docs)]
#![allow(non_snake_case)]

use rand::{CryptoRng, RngCore};

use curve::{Group, ScalarField};
use errors::ProofError;

/// Given `data` with `len >= 32`, return the first 32 bytes.
pub fn read32(data: &[u8]) -> [u8; 32] {
    let mut buf32 = [0u8; 32];
    buf32[..].copy_from_slice(&data[..32]);
    buf32
}

/// Computes an inner product of two vectors
/// \\[
///    {\langle {\mathbf{a}}, {\mathbf{b}} \rangle} = \sum\_{i=0}^{n-1} a\_i \cdot b\_i.
/// \\]
/// Panics if the lengths of \\(\mathbf{a}\\) and \\(\mathbf{b}\\) are not equal.
pub fn inner_product<S: ScalarField>(a: &[S], b: &[S]) -> S {
    let mut out = S::zero();
    if a.len() != b.len() {
        panic!("inner_product(a,b): lengths of vectors do not match");
    }
    for i in 0..a.len() {
        out += a[i] * b[i];
    }
    out
}

/// Inverts every element in place with a single field inversion and
/// returns the inverse of their product.
pub fn batch_invert<S: ScalarField>(values: &mut [S]) -> S {
    let n = values.len();
    let mut scratch = Vec::with_capacity(n);
    let mut acc = S::one();
    for v in values.iter() {
        scratch.push(acc);
        acc *= *v;
    }
    let allinv = acc.invert();
    let mut acc = allinv;
    for (v, prefix) in values.iter_mut().zip(scratch.into_iter()).rev() {
        let tmp = acc * *v;
        *v = acc * prefix;
        acc = tmp;
    }
    allinv
}

/// Draws a uniform scalar from `rng`, surfacing generator failures.
pub fn random_scalar<S, R>(rng: &mut R) -> Result<S, ProofError>
where
    S: ScalarField,
    R: RngCore + CryptoRng,
{
    let mut bytes = [0u8; 64];
    rng.try_fill_bytes(&mut bytes)?;
    Ok(S::from_uniform_bytes(&bytes))
}

/// Extends `v` to length `n` by repeating its last element.
pub fn pad_repeat<T: Copy>(v: &mut Vec<T>, n: usize) {
    if let Some(&last) = v.last() {
        while v.len() < n {
            v.push(last);
        }
    }
}

/// Extends `v` to length `n` with copies of `fill`.
pub fn pad_with<T: Copy>(v: &mut Vec<T>, n: usize, fill: T) {
    while v.len() < n {
        v.push(fill);
    }
}

/// For each index of a folded vector of length `2^lg_n`, the product of the
/// round challenges for which that index sat in the right half.
///
/// Round `k` splits at `n >> (k + 1)`, so index `i` picks up `c_k` exactly
/// when bit `lg_n - 1 - k` of `i` is set.
pub fn fold_coefficients<S: ScalarField>(challenges: &[S]) -> Vec<S> {
    let lg_n = challenges.len();
    let n = 1usize << lg_n;
    let mut s = Vec::with_capacity(n);
    s.push(S::one());
    for i in 1..n {
        let lg_i = (32 - 1 - (i as u32).leading_zeros()) as usize;
        let k = 1 << lg_i;
        let c = challenges[(lg_n - 1) - lg_i];
        let prev = s[i - k];
        s.push(prev * c);
    }
    s
}

/// Appends the wire encoding of `point` to `buf`.
pub(crate) fn write_point<G: Group>(buf: &mut Vec<u8>, point: &G, compressed: bool) {
    if compressed {
        buf.extend_from_slice(&point.to_compressed_bytes());
    } else {
        buf.extend_from_slice(&point.to_uncompressed_bytes());
    }
}

/// Size of one point on the wire.
pub(crate) fn point_size<G: Group>(compressed: bool) -> usize {
    if compressed {
        G::COMPRESSED_SIZE
    } else {
        G::UNCOMPRESSED_SIZE
    }
}

/// Sequential decoder over a proof encoding. Every read checks the
/// remaining length, so short input is a `FormatError` and never a panic.
pub(crate) struct ByteReader<'a> {
    slice: &'a [u8],
}

impl<'a> ByteReader<'a> {
    pub(crate) fn new(slice: &'a [u8]) -> Self {
        ByteReader { slice }
    }

    pub(crate) fn take(&mut self, n: usize) -> Result<&'a [u8], ProofError> {
        if self.slice.len() < n {
            return Err(ProofError::FormatError);
        }
        let (head, tail) = self.slice.split_at(n);
        self.slice = tail;
        Ok(head)
    }

    pub(crate) fn point<G: Group>(&mut self, compressed: bool) -> Result<G, ProofError> {
        let bytes = self.take(point_size::<G>(compressed))?;
        if compressed {
            G::from_compressed_bytes(bytes)
        } else {
            G::from_uncompressed_bytes(bytes)
        }
    }

    pub(crate) fn points<G: Group>(
        &mut self,
        n: usize,
        compressed: bool,
    ) -> Result<Vec<G>, ProofError> {
        (0..n).map(|_| self.point(compressed)).collect()
    }

    pub(crate) fn scalar<S: ScalarField>(&mut self) -> Result<S, ProofError> {
        let bytes = self.take(32)?;
        S::from_canonical_bytes(&read32(bytes)).ok_or(ProofError::FormatError)
    }

    /// Fails unless every byte has been consumed.
    pub(crate) fn finish(self) -> Result<(), ProofError> {
        if self.slice.is_empty() {
            Ok(())
        } else {
            Err(ProofError::FormatError)
        }
    }
}
