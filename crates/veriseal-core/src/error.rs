//! Error types for veriseal core.
//!
//! Every variant renders a stable message fragment (`invalid version`,
//! `missing payload_encoding`, `ts_seq mismatch: want 2, got 5`, ...) that
//! callers may match on. [`Error::kind`] gives the coarse category.

use thiserror::Error;

/// Errors produced by the canonicalizer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CanonicalError {
    #[error("empty input")]
    EmptyInput,

    #[error("invalid json: {0}")]
    InvalidJson(String),

    #[error("top-level value must be an object or array")]
    TopLevelNotObjectOrArray,
}

/// Core errors for envelope, signature and timeseries operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Canonical(#[from] CanonicalError),

    #[error("serialization error: {0}")]
    Serialization(String),

    // Envelope field validation
    #[error("invalid version: {0}")]
    InvalidVersion(i64),

    #[error("unsupported alg: {0}")]
    UnsupportedAlg(String),

    #[error("missing kid")]
    MissingKid,

    #[error("missing payload_encoding")]
    MissingPayloadEncoding,

    #[error("unsupported payload_encoding: {0}")]
    UnsupportedPayloadEncoding(String),

    #[error("unsupported payload_hash_alg: {0}")]
    UnsupportedPayloadHashAlg(String),

    #[error("missing payload_hash")]
    MissingPayloadHash,

    #[error("missing sig")]
    MissingSig,

    // Payload hashing
    #[error("invalid payload for payload_encoding=jcs: {0}")]
    InvalidPayloadEncoding(#[source] CanonicalError),

    #[error("payload hash mismatch: envelope has {expected}, payload hashes to {actual}")]
    PayloadHashMismatch { expected: String, actual: String },

    // Signatures
    #[error("invalid sig encoding: {0}")]
    InvalidSignatureEncoding(String),

    #[error("invalid public key")]
    InvalidPublicKey,

    #[error("signature verification failed")]
    SignatureVerificationFailed,

    // Timeseries
    #[error("missing ts_session_id")]
    MissingSessionId,

    #[error("missing ts_seq")]
    MissingSeq,

    #[error("missing ts_prev")]
    MissingPrev,

    #[error("ts_seq overflow: reached max u64")]
    SequenceOverflow,

    #[error("ts_session_id mismatch: want {expected}, got {actual}")]
    SessionMismatch { expected: String, actual: String },

    #[error("ts_seq mismatch: want {expected}, got {actual}")]
    SeqMismatch { expected: u64, actual: u64 },

    #[error("ts_prev mismatch: want {expected}, got {actual}")]
    PrevHashMismatch { expected: String, actual: String },

    #[error("ts_seq must start from 0, got {0}")]
    StrictStartSeq(u64),

    #[error("ts_prev must be absent on the first envelope")]
    StrictStartPrev,

    #[error("prev invalid: {0}")]
    PrevInvalid(Box<Error>),

    #[error("curr invalid: {0}")]
    CurrInvalid(Box<Error>),

    #[error("empty chain")]
    EmptyChain,

    #[error("index {index}: {source}")]
    ChainBreak {
        index: usize,
        #[source]
        source: Box<Error>,
    },
}

/// Coarse error categories, stable for automation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Empty, unparsable or wrongly shaped JSON.
    MalformedInput,
    /// Bad version, algorithm, encoding or hash algorithm.
    UnsupportedField,
    /// A required field is absent or empty.
    MissingField,
    /// Signature decoding, key or verification failure.
    CryptoFailure,
    /// Payload hash or link hash mismatch.
    HashMismatch,
    /// Sequence gap, overflow or session mismatch.
    SequenceViolation,
    /// Chain audit failure at a given index.
    ChainBreak,
}

impl ErrorKind {
    /// Snake-case code for machine-readable output.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::MalformedInput => "malformed_input",
            ErrorKind::UnsupportedField => "unsupported_field",
            ErrorKind::MissingField => "missing_field",
            ErrorKind::CryptoFailure => "crypto_failure",
            ErrorKind::HashMismatch => "hash_mismatch",
            ErrorKind::SequenceViolation => "sequence_violation",
            ErrorKind::ChainBreak => "chain_break",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Error {
    /// The category of this error.
    ///
    /// Wrapper variants (`PrevInvalid`, `CurrInvalid`) report the kind of the
    /// error they wrap; `ChainBreak` is always [`ErrorKind::ChainBreak`].
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Canonical(_) | Error::Serialization(_) | Error::EmptyChain => {
                ErrorKind::MalformedInput
            }
            Error::InvalidPayloadEncoding(_) => ErrorKind::MalformedInput,

            Error::InvalidVersion(_)
            | Error::UnsupportedAlg(_)
            | Error::UnsupportedPayloadEncoding(_)
            | Error::UnsupportedPayloadHashAlg(_) => ErrorKind::UnsupportedField,

            Error::MissingKid
            | Error::MissingPayloadEncoding
            | Error::MissingPayloadHash
            | Error::MissingSig
            | Error::MissingSessionId
            | Error::MissingSeq
            | Error::MissingPrev => ErrorKind::MissingField,

            Error::InvalidSignatureEncoding(_)
            | Error::InvalidPublicKey
            | Error::SignatureVerificationFailed => ErrorKind::CryptoFailure,

            Error::PayloadHashMismatch { .. } | Error::PrevHashMismatch { .. } => {
                ErrorKind::HashMismatch
            }

            Error::SequenceOverflow
            | Error::SessionMismatch { .. }
            | Error::SeqMismatch { .. }
            | Error::StrictStartSeq(_)
            | Error::StrictStartPrev => ErrorKind::SequenceViolation,

            Error::PrevInvalid(inner) | Error::CurrInvalid(inner) => inner.kind(),

            Error::ChainBreak { .. } => ErrorKind::ChainBreak,
        }
    }

    /// The 0-based index reported by a chain audit, if this is a chain break.
    pub fn chain_index(&self) -> Option<usize> {
        match self {
            Error::ChainBreak { index, .. } => Some(*index),
            _ => None,
        }
    }

    /// The innermost error, unwrapping chain-break and link wrappers.
    pub fn root_cause(&self) -> &Error {
        match self {
            Error::ChainBreak { source, .. } => source.root_cause(),
            Error::PrevInvalid(inner) | Error::CurrInvalid(inner) => inner.root_cause(),
            other => other,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, Error>;
