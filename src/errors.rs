//! Errors related to proving and verifying proofs.

/// Represents an error in proof creation, verification, or parsing.
#[derive(Fail, Clone, Debug, Eq, PartialEq)]
pub enum ProofError {
    /// This error occurs when a proof failed to verify.
    #[fail(display = "Proof verification failed.")]
    VerificationError,
    /// This error occurs when the proof encoding is malformed.
    #[fail(display = "Proof data could not be parsed.")]
    FormatError,
    /// This error occurs when `T - A·S` is not divisible by the lattice
    /// modulus, i.e. the witness does not open the ciphertext.
    #[fail(
        display = "Witness does not satisfy the lattice relation at coefficient {}.",
        index
    )]
    MalformedWitness {
        /// Index of the first coefficient with a non-zero remainder.
        index: usize,
    },
    /// This error occurs when a witness value does not fit the bit width of
    /// its region.
    #[fail(display = "Witness value at bit offset {} is out of range.", index)]
    WitnessOutOfRange {
        /// Offset of the value's first bit in the witness bitstream.
        index: usize,
    },
    /// This error occurs when the random number generator fails to produce
    /// blinding scalars.
    #[fail(display = "Randomness source failed.")]
    RandomnessError,
    /// This error occurs when the protocol parameters are inconsistent.
    #[fail(display = "Invalid protocol parameters: {}.", _0)]
    InvalidParameters(&'static str),
    /// This error occurs when there are insufficient generators for the
    /// proof.
    #[fail(display = "Invalid generators size, too few generators for proof")]
    InvalidGeneratorsLength,
    /// This error occurs when the verifier is given the wrong number of
    /// puzzle points.
    #[fail(
        display = "Wrong number of puzzle points: expected {}, got {}.",
        expected, actual
    )]
    InvalidPuzzleCount {
        /// Number of puzzle points the parameters call for.
        expected: usize,
        /// Number of puzzle points supplied.
        actual: usize,
    },
    /// This error occurs when a ciphertext, key or witness vector does not
    /// have the ring dimension.
    #[fail(
        display = "Wrong input length: expected {}, got {}.",
        expected, actual
    )]
    InvalidInputLength {
        /// Ring dimension.
        expected: usize,
        /// Length supplied.
        actual: usize,
    },
    /// This error occurs when a ciphertext or public-key coefficient lies
    /// outside `[-Q/2, Q/2)`.
    #[fail(display = "Public coefficient {} is not reduced modulo Q.", index)]
    CoefficientOutOfRange {
        /// Position in `T0 ‖ T1 ‖ P0 ‖ P1`.
        index: usize,
    },
    /// This error occurs when the worker thread pool cannot be started.
    #[fail(display = "Worker pool could not be created.")]
    WorkerPoolError,
}

impl From<::rand::Error> for ProofError {
    fn from(_: ::rand::Error) -> ProofError {
        ProofError::RandomnessError
    }
}
