//! Definition of the proof struct.

use errors::ProofError;
use curve::Group;
use inner_product_proof::{InnerProductProof, LinearProof};
use params::ProtocolParams;
use util::{self, ByteReader};

/// A proof that a ciphertext and a list of puzzle points encode the same
/// message.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct Proof<G: Group> {
    /// Commitment to the set bits outside the message window.
    #[serde(with = "point_bytes")]
    pub(crate) w1: G,
    /// Commitment to the cleared bits.
    #[serde(with = "point_bytes")]
    pub(crate) w2: G,
    /// Commitment to the set bits of the message window.
    #[serde(with = "point_bytes")]
    pub(crate) w3: G,
    /// Argument for the batched lattice and bit constraints.
    pub(crate) ipp_proof: InnerProductProof<G>,
    /// Argument for the puzzle decoding.
    pub(crate) linear_proof: LinearProof<G>,
}

impl<G: Group> Proof<G> {
    /// The witness commitments `[W1, W2, W3]`.
    pub fn commitments(&self) -> [G; 3] {
        [self.w1, self.w2, self.w3]
    }

    /// The first folding argument.
    pub fn ipp_proof(&self) -> &InnerProductProof<G> {
        &self.ipp_proof
    }

    /// The second folding argument.
    pub fn linear_proof(&self) -> &LinearProof<G> {
        &self.linear_proof
    }

    /// Size of the encoding of a proof for `params`:
    /// `(6 + 2·lg1 + 2·lg2)` points and five scalars.
    pub fn serialized_size(params: &ProtocolParams, compressed: bool) -> usize {
        3 * util::point_size::<G>(compressed)
            + InnerProductProof::<G>::body_size(params.witness_rounds(), compressed)
            + LinearProof::<G>::body_size(params.message_rounds(), compressed)
    }

    /// Serializes the proof into a byte array with points in the
    /// fixed-width format. The layout is:
    /// * `W1`, `W2`, `W3`,
    /// * the first argument: `TL[]`, `TR[]`, `C`, `C'`, `E1`, `E2`, `O`,
    /// * the second argument: `TL[]`, `TR[]`, `C`, `E1`, `E2`.
    ///
    /// No lengths are written; they follow from the parameters.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.encode(false)
    }

    /// Serializes the proof with the same layout and compressed points.
    pub fn to_compressed_bytes(&self) -> Vec<u8> {
        self.encode(true)
    }

    fn encode(&self, compressed: bool) -> Vec<u8> {
        let mut buf = Vec::new();
        for p in [self.w1, self.w2, self.w3].iter() {
            util::write_point(&mut buf, p, compressed);
        }
        self.ipp_proof.write_body(&mut buf, compressed);
        self.linear_proof.write_body(&mut buf, compressed);
        buf
    }

    /// Deserializes a proof for `params` from
    /// [`to_bytes`](Proof::to_bytes) output.
    pub fn from_bytes(params: &ProtocolParams, slice: &[u8]) -> Result<Proof<G>, ProofError> {
        Self::decode(params, slice, false)
    }

    /// Deserializes a proof for `params` from
    /// [`to_compressed_bytes`](Proof::to_compressed_bytes) output.
    pub fn from_compressed_bytes(
        params: &ProtocolParams,
        slice: &[u8],
    ) -> Result<Proof<G>, ProofError> {
        Self::decode(params, slice, true)
    }

    fn decode(
        params: &ProtocolParams,
        slice: &[u8],
        compressed: bool,
    ) -> Result<Proof<G>, ProofError> {
        if slice.len() != Self::serialized_size(params, compressed) {
            return Err(ProofError::FormatError);
        }
        let mut reader = ByteReader::new(slice);
        let w1 = reader.point(compressed)?;
        let w2 = reader.point(compressed)?;
        let w3 = reader.point(compressed)?;
        let ipp_proof = InnerProductProof::read_body(&mut reader, params.witness_rounds(), compressed)?;
        let linear_proof = LinearProof::read_body(&mut reader, params.message_rounds(), compressed)?;
        reader.finish()?;
        Ok(Proof {
            w1,
            w2,
            w3,
            ipp_proof,
            linear_proof,
        })
    }
}

/// Points as byte strings in the fixed-width format.
mod point_bytes {
    use std::marker::PhantomData;

    use serde::de::{self, Visitor};
    use serde::{Deserializer, Serializer};

    use curve::Group;

    pub fn serialize<G: Group, S: Serializer>(point: &G, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bytes(&point.to_uncompressed_bytes())
    }

    pub fn deserialize<'de, G: Group, D: Deserializer<'de>>(deserializer: D) -> Result<G, D::Error> {
        struct PointVisitor<G>(PhantomData<G>);

        impl<'de, G: Group> Visitor<'de> for PointVisitor<G> {
            type Value = G;

            fn expecting(&self, formatter: &mut ::std::fmt::Formatter) -> ::std::fmt::Result {
                formatter.write_str("an encoded curve point")
            }

            fn visit_bytes<E>(self, v: &[u8]) -> Result<G, E>
            where
                E: de::Error,
            {
                G::from_uncompressed_bytes(v).map_err(de::Error::custom)
            }
        }

        deserializer.deserialize_bytes(PointVisitor(PhantomData))
    }
}
