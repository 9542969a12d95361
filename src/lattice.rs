//! A small LPR-style RLWE encryption scheme over `Z_q[x]/(x^D + 1)`.
//!
//! This is the collaborator whose ciphertexts the proof talks about: the
//! prover needs the encryption randomness `(u, e1, e2)` and the plaintext,
//! the verifier only the public key and the ciphertext. All coefficients are
//! kept as centred representatives in `[-q/2, q/2)`.

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use clear_on_drop::clear::Clear;
use rand::{CryptoRng, RngCore};

use errors::ProofError;
use params::ProtocolParams;

/// Secret key `s`, with ternary coefficients in `{-1, 0}`.
#[derive(Clone, Debug)]
pub struct SecretKey {
    /// Coefficients of `s`.
    pub s: Vec<i32>,
}

impl Drop for SecretKey {
    fn drop(&mut self) {
        for c in self.s.iter_mut() {
            c.clear();
        }
    }
}

/// Public key `(p0, p1) = (-(s·a + e), a)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublicKey {
    /// `-(s·a + e)`.
    pub p0: Vec<i32>,
    /// The uniform polynomial `a`.
    pub p1: Vec<i32>,
}

/// Ciphertext `(t0, t1) = (p0·u + e1 + Delta·m, p1·u + e2)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ciphertext {
    /// First component.
    pub t0: Vec<i32>,
    /// Second component.
    pub t1: Vec<i32>,
}

/// The randomness an encryption used.
#[derive(Clone, Debug)]
pub struct EncryptionRandomness {
    /// Ephemeral secret `u`.
    pub u: Vec<i32>,
    /// Error term of `t0`.
    pub e1: Vec<i32>,
    /// Error term of `t1`.
    pub e2: Vec<i32>,
}

impl Drop for EncryptionRandomness {
    fn drop(&mut self) {
        for c in self.u.iter_mut().chain(self.e1.iter_mut()).chain(self.e2.iter_mut()) {
            c.clear();
        }
    }
}

/// A single coefficient of a ciphertext, as an LWE sample `(b, a)` with
/// `b + ⟨a, s⟩ ≈ Delta·m_i`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LweCiphertext {
    /// Constant term.
    pub b: i32,
    /// Mask vector.
    pub a: Vec<i32>,
}

/// Bytes per coefficient on the wire: 2 when `Q <= 2^16`, 4 otherwise.
fn coefficient_width(q: i32) -> usize {
    if q <= 1 << 16 {
        2
    } else {
        4
    }
}

/// Writes `a ‖ b` as big-endian coefficients.
///
/// In the 2-byte format each coefficient is stored as its residue in
/// `[0, Q)`, in the 4-byte format as its two's-complement bits.
fn encode_polys(q: i32, a: &[i32], b: &[i32]) -> Vec<u8> {
    let width = coefficient_width(q);
    let mut buf = vec![0u8; (a.len() + b.len()) * width];
    for (c, out) in a.iter().chain(b.iter()).zip(buf.chunks_mut(width)) {
        if width == 2 {
            BigEndian::write_u16(out, c.rem_euclid(q) as u16);
        } else {
            BigEndian::write_u32(out, *c as u32);
        }
    }
    buf
}

/// Reads two polynomials of `params.d` coefficients written by
/// [`encode_polys`], lifting each back to `[-Q/2, Q/2)`.
fn decode_polys(params: &ProtocolParams, slice: &[u8]) -> Result<(Vec<i32>, Vec<i32>), ProofError> {
    let (d, q) = (params.d, params.q);
    let width = coefficient_width(q);
    if slice.len() != 2 * d * width {
        return Err(ProofError::FormatError);
    }
    let half = q / 2;
    let mut coefficients = slice
        .chunks(width)
        .map(|c| {
            let v = if width == 2 {
                let v = BigEndian::read_u16(c) as i32;
                if v >= q {
                    return Err(ProofError::FormatError);
                }
                if v >= half {
                    v - q
                } else {
                    v
                }
            } else {
                BigEndian::read_u32(c) as i32
            };
            if v < -half || v >= half {
                return Err(ProofError::FormatError);
            }
            Ok(v)
        })
        .collect::<Result<Vec<_>, _>>()?;
    let second = coefficients.split_off(d);
    Ok((coefficients, second))
}

impl PublicKey {
    /// Serializes `p0 ‖ p1`, 2 or 4 big-endian bytes per coefficient
    /// depending on `Q`.
    pub fn to_bytes(&self, params: &ProtocolParams) -> Vec<u8> {
        encode_polys(params.q, &self.p0, &self.p1)
    }

    /// Deserializes a public key written by [`to_bytes`](PublicKey::to_bytes).
    pub fn from_bytes(params: &ProtocolParams, slice: &[u8]) -> Result<PublicKey, ProofError> {
        let (p0, p1) = decode_polys(params, slice)?;
        Ok(PublicKey { p0, p1 })
    }
}

impl Ciphertext {
    /// Serializes `t0 ‖ t1` in the same format as [`PublicKey::to_bytes`].
    pub fn to_bytes(&self, params: &ProtocolParams) -> Vec<u8> {
        encode_polys(params.q, &self.t0, &self.t1)
    }

    /// Deserializes a ciphertext written by [`to_bytes`](Ciphertext::to_bytes).
    /// Lengths other than `2·D` coefficients and coefficients outside
    /// `[-Q/2, Q/2)` are a `FormatError`.
    pub fn from_bytes(params: &ProtocolParams, slice: &[u8]) -> Result<Ciphertext, ProofError> {
        let (t0, t1) = decode_polys(params, slice)?;
        Ok(Ciphertext { t0, t1 })
    }
}

fn center(v: i64, q: i32) -> i32 {
    let q = q as i64;
    let mut t = v % q;
    if t >= q / 2 {
        t -= q;
    } else if t < -q / 2 {
        t += q;
    }
    t as i32
}

/// Negacyclic product `a·b mod (x^D + 1, q)`.
pub fn poly_mul(a: &[i32], b: &[i32], q: i32) -> Vec<i32> {
    let n = a.len();
    let mut product = vec![0i64; 2 * n];
    for i in 0..n {
        for j in 0..n {
            product[i + j] += a[i] as i64 * b[j] as i64;
        }
    }
    (0..n).map(|i| center(product[i] - product[i + n], q)).collect()
}

/// Coefficient-wise `a + b mod q`.
pub fn poly_add(a: &[i32], b: &[i32], q: i32) -> Vec<i32> {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| center(*x as i64 + *y as i64, q))
        .collect()
}

/// Coefficient-wise `delta·a mod q`.
pub fn poly_scalar(a: &[i32], delta: i32, q: i32) -> Vec<i32> {
    a.iter().map(|x| center(*x as i64 * delta as i64, q)).collect()
}

/// Coefficient-wise negation; `-q/2` is its own negative.
pub fn poly_neg(a: &[i32], q: i32) -> Vec<i32> {
    a.iter()
        .map(|x| if *x == -q / 2 { *x } else { -*x })
        .collect()
}

/// Samples `d` coefficients in `{-1, 0}`.
pub fn sample_ternary<R: RngCore + CryptoRng>(d: usize, rng: &mut R) -> Result<Vec<i32>, ProofError> {
    let mut samples = vec![0u8; d];
    rng.try_fill_bytes(&mut samples)?;
    Ok(samples.iter().map(|s| (*s as i32) % 2 - 1).collect())
}

/// Samples `d` coefficients uniformly from `[-q/2, q/2)`.
pub fn sample_uniform<R: RngCore + CryptoRng>(
    d: usize,
    q: i32,
    rng: &mut R,
) -> Result<Vec<i32>, ProofError> {
    let mut samples = vec![0u8; 4 * d];
    rng.try_fill_bytes(&mut samples)?;
    Ok(samples
        .chunks(4)
        .map(|c| (LittleEndian::read_u32(c) % q as u32) as i32 - q / 2)
        .collect())
}

/// Samples a plaintext with coefficients in `[-T/4, T/4)`.
pub fn sample_message<R: RngCore + CryptoRng>(
    params: &ProtocolParams,
    rng: &mut R,
) -> Result<Vec<i32>, ProofError> {
    sample_uniform(params.d, params.t / 2, rng)
}

/// Generates a key pair.
pub fn keygen<R: RngCore + CryptoRng>(
    params: &ProtocolParams,
    rng: &mut R,
) -> Result<(SecretKey, PublicKey), ProofError> {
    let q = params.q;
    let s = sample_ternary(params.d, rng)?;
    let a = sample_uniform(params.d, q, rng)?;
    let e = sample_ternary(params.d, rng)?;
    let p0 = poly_neg(&poly_add(&poly_mul(&s, &a, q), &e, q), q);
    Ok((SecretKey { s }, PublicKey { p0, p1: a }))
}

/// Encrypts `message`, returning the randomness alongside the ciphertext.
pub fn encrypt<R: RngCore + CryptoRng>(
    params: &ProtocolParams,
    pk: &PublicKey,
    message: &[i32],
    rng: &mut R,
) -> Result<(Ciphertext, EncryptionRandomness), ProofError> {
    let (d, q) = (params.d, params.q);
    if message.len() != d {
        return Err(ProofError::InvalidInputLength {
            expected: d,
            actual: message.len(),
        });
    }
    let u = sample_ternary(d, rng)?;
    let e1 = sample_ternary(d, rng)?;
    let e2 = sample_ternary(d, rng)?;

    let t0 = poly_add(
        &poly_add(&poly_mul(&pk.p0, &u, q), &e1, q),
        &poly_scalar(message, params.delta(), q),
        q,
    );
    let t1 = poly_add(&poly_mul(&pk.p1, &u, q), &e2, q);
    Ok((Ciphertext { t0, t1 }, EncryptionRandomness { u, e1, e2 }))
}

/// Decrypts to coefficients in `[-T/2, T/2)`.
pub fn decrypt(params: &ProtocolParams, sk: &SecretKey, ct: &Ciphertext) -> Vec<i32> {
    let (q, t) = (params.q, params.t);
    let noisy = poly_add(&poly_mul(&ct.t1, &sk.s, q), &ct.t0, q);
    noisy
        .iter()
        .map(|v| {
            let mut m = ((*v as f64) * (t as f64) / (q as f64)).round() as i32 % t;
            if m >= t / 2 {
                m -= t;
            } else if m < -t / 2 {
                // Kept as T/2 (not T) for compatibility with existing
                // ciphertext tooling; unreachable for centred input.
                m += t / 2;
            }
            m
        })
        .collect()
}

/// Homomorphic addition.
pub fn add(params: &ProtocolParams, c1: &Ciphertext, c2: &Ciphertext) -> Ciphertext {
    Ciphertext {
        t0: poly_add(&c1.t0, &c2.t0, params.q),
        t1: poly_add(&c1.t1, &c2.t1, params.q),
    }
}

/// Extracts coefficient `i` of `ct` as an LWE sample under the same key.
pub fn extract(params: &ProtocolParams, ct: &Ciphertext, i: usize) -> LweCiphertext {
    let q = params.q;
    let d = ct.t1.len();
    let mut a = vec![0i32; d];
    for n in 0..=i {
        a[n] = ct.t1[i - n];
    }
    for n in i + 1..d {
        a[n] = -ct.t1[d - n + i];
        if a[n] == q / 2 {
            a[n] = -q / 2;
        }
    }
    LweCiphertext { b: ct.t0[i], a }
}

/// Decrypts an extracted LWE sample.
pub fn lwe_decrypt(params: &ProtocolParams, lwe: &LweCiphertext, sk: &SecretKey) -> i32 {
    let (q, t) = (params.q as i64, params.t as i64);
    let mut acc = lwe.b as i64;
    for (a, s) in lwe.a.iter().zip(sk.s.iter()) {
        acc = (acc + *a as i64 * *s as i64) % q;
    }
    let mut m = ((acc * t) as f64 / q as f64).round() as i64 % t;
    if m >= t / 2 {
        m -= t;
    } else if m < -t / 2 {
        m += t;
    }
    m as i32
}

#[cfg(test)]
mod tests {
    use super::*;
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

    #[test]
    fn negacyclic_wraparound() {
        // x^3 · x = x^4 = -1 in Z[x]/(x^4 + 1)
        let a = vec![0, 0, 0, 1];
        let b = vec![0, 1, 0, 0];
        assert_eq!(poly_mul(&a, &b, 97 * 2), vec![-1, 0, 0, 0]);
    }

    #[test]
    fn centring() {
        assert_eq!(center(32768, 65536), -32768);
        assert_eq!(center(-32769, 65536), 32767);
        assert_eq!(poly_neg(&[-32768, 5], 65536), vec![-32768, -5]);
    }

    #[test]
    fn encrypt_then_decrypt() {
        let params = small_params();
        let mut rng = ChaChaRng::from_seed([1u8; 32]);
        let (sk, pk) = keygen(&params, &mut rng).unwrap();
        for _ in 0..8 {
            let m = sample_message(&params, &mut rng).unwrap();
            assert!(m.iter().all(|v| *v >= -2 && *v < 2));
            let (ct, _) = encrypt(&params, &pk, &m, &mut rng).unwrap();
            assert_eq!(decrypt(&params, &sk, &ct), m);
        }
    }

    #[test]
    fn reference_parameters_decrypt() {
        let params = ProtocolParams::default();
        let mut rng = ChaChaRng::from_seed([2u8; 32]);
        let (sk, pk) = keygen(&params, &mut rng).unwrap();
        let m = sample_message(&params, &mut rng).unwrap();
        let (ct, _) = encrypt(&params, &pk, &m, &mut rng).unwrap();
        assert_eq!(decrypt(&params, &sk, &ct), m);
    }

    #[test]
    fn homomorphic_addition() {
        let params = small_params();
        let mut rng = ChaChaRng::from_seed([3u8; 32]);
        let (sk, pk) = keygen(&params, &mut rng).unwrap();
        let m1: Vec<i32> = (0..16).map(|i| (i % 2) as i32).collect();
        let m2: Vec<i32> = (0..16).map(|i| -((i % 3 == 0) as i32)).collect();
        let (c1, _) = encrypt(&params, &pk, &m1, &mut rng).unwrap();
        let (c2, _) = encrypt(&params, &pk, &m2, &mut rng).unwrap();
        let sum: Vec<i32> = m1.iter().zip(m2.iter()).map(|(a, b)| a + b).collect();
        assert_eq!(decrypt(&params, &sk, &add(&params, &c1, &c2)), sum);
    }

    #[test]
    fn extracted_coefficients_decrypt() {
        let params = small_params();
        let mut rng = ChaChaRng::from_seed([4u8; 32]);
        let (sk, pk) = keygen(&params, &mut rng).unwrap();
        let m = sample_message(&params, &mut rng).unwrap();
        let (ct, _) = encrypt(&params, &pk, &m, &mut rng).unwrap();
        for i in 0..params.d {
            let lwe = extract(&params, &ct, i);
            assert_eq!(lwe_decrypt(&params, &lwe, &sk), m[i]);
        }
    }

    #[test]
    fn wrong_message_length_is_rejected() {
        let params = small_params();
        let mut rng = ChaChaRng::from_seed([5u8; 32]);
        let (_, pk) = keygen(&params, &mut rng).unwrap();
        assert_eq!(
            encrypt(&params, &pk, &[0; 3], &mut rng).err(),
            Some(ProofError::InvalidInputLength {
                expected: 16,
                actual: 3
            })
        );
    }

    #[test]
    fn ciphertexts_and_keys_round_trip() {
        let params = small_params();
        let mut rng = ChaChaRng::from_seed([6u8; 32]);
        let (_, pk) = keygen(&params, &mut rng).unwrap();
        let m = sample_message(&params, &mut rng).unwrap();
        let (ct, _) = encrypt(&params, &pk, &m, &mut rng).unwrap();

        let bytes = ct.to_bytes(&params);
        assert_eq!(bytes.len(), 2 * 16 * 2);
        assert_eq!(Ciphertext::from_bytes(&params, &bytes), Ok(ct.clone()));
        let bytes = pk.to_bytes(&params);
        assert_eq!(PublicKey::from_bytes(&params, &bytes), Ok(pk));

        // Both ends of the centred range survive.
        let edges = Ciphertext {
            t0: vec![-32768; 16],
            t1: vec![32767; 16],
        };
        let bytes = edges.to_bytes(&params);
        assert_eq!(&bytes[..2], &[0x80, 0x00]);
        assert_eq!(&bytes[32..34], &[0x7f, 0xff]);
        assert_eq!(Ciphertext::from_bytes(&params, &bytes), Ok(edges));

        let bytes = ct.to_bytes(&params);
        assert_eq!(
            Ciphertext::from_bytes(&params, &bytes[..bytes.len() - 2]),
            Err(ProofError::FormatError)
        );
    }

    #[test]
    fn wide_moduli_use_four_bytes() {
        let params = ProtocolParams {
            q: 1 << 20,
            ..small_params()
        };
        let ct = Ciphertext {
            t0: (0..16).map(|i| i * 40_000 - 300_000).collect(),
            t1: vec![-(1 << 19); 16],
        };
        let bytes = ct.to_bytes(&params);
        assert_eq!(bytes.len(), 2 * 16 * 4);
        assert_eq!(&bytes[64..68], &[0xff, 0xf8, 0x00, 0x00]);
        assert_eq!(Ciphertext::from_bytes(&params, &bytes), Ok(ct));

        // 2^19 is not a centred coefficient.
        let mut bad = bytes.clone();
        bad[64..68].copy_from_slice(&[0x00, 0x08, 0x00, 0x00]);
        assert_eq!(Ciphertext::from_bytes(&params, &bad), Err(ProofError::FormatError));
    }

    #[test]
    fn unreduced_residues_are_rejected() {
        let params = ProtocolParams {
            q: 12288,
            t: 8,
            ..small_params()
        };
        let pk = PublicKey {
            p0: vec![-1; 16],
            p1: vec![6143; 16],
        };
        let mut bytes = pk.to_bytes(&params);
        assert_eq!(&bytes[..2], &[0x2f, 0xff]);
        assert_eq!(PublicKey::from_bytes(&params, &bytes), Ok(pk));

        bytes[0..2].copy_from_slice(&[0x30, 0x00]);
        assert_eq!(PublicKey::from_bytes(&params, &bytes), Err(ProofError::FormatError));
    }
}
