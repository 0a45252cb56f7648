//! Envelope validation: structural checks run before signing, verifying
//! and chaining.
//!
//! Each check fails with its own [`Error`] variant so callers can tell which
//! field was wrong.

use crate::envelope::{Envelope, PayloadEncoding, ALG_ED25519, HASH_ALG_SHA256, VERSION};
use crate::error::{Error, Result};

/// Checks required before an envelope can be signed.
///
/// This performs:
/// - Version check
/// - Algorithm check
/// - Non-empty `kid`
/// - `payload_encoding` is `jcs` or `raw`
/// - `payload_hash_alg` check
pub fn validate_for_sign(env: &Envelope) -> Result<()> {
    check_version(env)?;

    if env.alg != ALG_ED25519 {
        return Err(Error::UnsupportedAlg(env.alg.clone()));
    }

    if env.kid.is_empty() {
        return Err(Error::MissingKid);
    }

    PayloadEncoding::parse(&env.payload_encoding)?;

    if env.payload_hash_alg != HASH_ALG_SHA256 {
        return Err(Error::UnsupportedPayloadHashAlg(env.payload_hash_alg.clone()));
    }

    Ok(())
}

/// Checks required before an envelope's signature can be verified: the
/// signing checks plus a non-empty `payload_hash` and `sig`.
pub fn validate_for_verify(env: &Envelope) -> Result<()> {
    validate_for_sign(env)?;

    if is_blank(&env.payload_hash) {
        return Err(Error::MissingPayloadHash);
    }
    if is_blank(&env.sig) {
        return Err(Error::MissingSig);
    }

    Ok(())
}

/// Checks on an envelope that a successor is about to be derived from.
pub fn validate_prev_for_next(env: &Envelope) -> Result<()> {
    check_version(env)?;
    check_session_id(env)?;
    let seq = env.ts_seq.ok_or(Error::MissingSeq)?;
    if seq == u64::MAX {
        return Err(Error::SequenceOverflow);
    }
    Ok(())
}

/// Checks on the later envelope of a link.
pub fn validate_curr_for_check(env: &Envelope) -> Result<()> {
    check_version(env)?;
    check_session_id(env)?;
    if env.ts_seq.is_none() {
        return Err(Error::MissingSeq);
    }
    if is_blank(&env.ts_prev) {
        return Err(Error::MissingPrev);
    }
    Ok(())
}

fn check_version(env: &Envelope) -> Result<()> {
    if env.v != VERSION {
        return Err(Error::InvalidVersion(env.v));
    }
    Ok(())
}

fn check_session_id(env: &Envelope) -> Result<()> {
    if is_blank(&env.ts_session_id) {
        return Err(Error::MissingSessionId);
    }
    Ok(())
}

fn is_blank(field: &Option<String>) -> bool {
    field.as_deref().map_or(true, str::is_empty)
}
