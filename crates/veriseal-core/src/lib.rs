//! # Veriseal Core
//!
//! Pure primitives for veriseal: canonical JSON, signed envelopes, and
//! hash-chained timeseries sessions.
//!
//! This crate contains no I/O and no logging. Every operation is a pure
//! function over its explicit inputs; the clock and the session id source
//! are injected.
//!
//! ## Key Types
//!
//! - [`Envelope`] - The signed metadata wrapper around a payload
//! - [`Keypair`], [`PublicKey`], [`Signature`] - Ed25519 primitives
//! - [`Signer`] - Signs envelopes with an injected [`Clock`]
//! - [`Timeseries`] - Starts sessions with an injected [`SessionIdGenerator`]
//!
//! ## Canonicalization
//!
//! Every hash and signature is computed over canonical JSON (sorted keys,
//! no whitespace, fixed number and string forms). See [`canonical`].

pub mod canonical;
pub mod crypto;
pub mod envelope;
pub mod error;
pub mod payload;
pub mod signer;
pub mod timeseries;
pub mod validation;

pub use canonical::{canonical_value_bytes, canonicalize, to_canonical_bytes};
pub use crypto::{Keypair, PublicKey, Sha256Digest, Signature};
pub use envelope::{Envelope, PayloadEncoding, ALG_ED25519, HASH_ALG_SHA256, VERSION};
pub use error::{CanonicalError, Error, ErrorKind, Result};
pub use payload::compute_payload_hash;
pub use signer::{sign, verify, verify_payload_hash, Clock, Signer, SystemClock};
pub use timeseries::{
    audit, audit_signed, check_link, new_session, next, unsigned_hash, RandomUuidV4,
    SessionIdGenerator, Timeseries,
};
pub use validation::{validate_for_sign, validate_for_verify};
