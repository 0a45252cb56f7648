//! Signing and verification of envelopes.
//!
//! The signing message is always the canonical unsigned form. Signature and
//! payload-hash verification are independent: a verifier can check the
//! signature without ever seeing the payload.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::crypto::{Keypair, PublicKey, Signature};
use crate::envelope::Envelope;
use crate::error::{Error, Result};
use crate::payload::compute_payload_hash;
use crate::validation::{validate_for_sign, validate_for_verify};

/// A source of the current time, in Unix seconds.
pub trait Clock {
    fn now_unix(&self) -> i64;
}

/// The system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_unix(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0)
    }
}

impl<F: Fn() -> i64> Clock for F {
    fn now_unix(&self) -> i64 {
        self()
    }
}

/// Signs envelopes, reading issued-at from an injected clock.
#[derive(Debug, Clone, Default)]
pub struct Signer<C = SystemClock> {
    clock: C,
}

impl Signer<SystemClock> {
    /// A signer using the system clock.
    pub fn new() -> Self {
        Self { clock: SystemClock }
    }
}

impl<C: Clock> Signer<C> {
    /// A signer using the given clock.
    pub fn with_clock(clock: C) -> Self {
        Self { clock }
    }

    /// Sign `env` over `payload`.
    ///
    /// Computes and stores `payload_hash`, optionally overwrites `iat` with
    /// the clock's time, then signs the canonical unsigned form. The input
    /// envelope is not modified; the signed copy is returned.
    pub fn sign(
        &self,
        env: &Envelope,
        payload: &[u8],
        keypair: &Keypair,
        set_iat: bool,
    ) -> Result<Envelope> {
        validate_for_sign(env)?;

        let mut signed = env.unsigned();
        signed.payload_hash = Some(compute_payload_hash(payload, &env.payload_encoding)?);
        if set_iat {
            signed.iat = Some(self.clock.now_unix());
        }

        let message = signed.unsigned_canonical_bytes()?;
        signed.sig = Some(keypair.sign(&message).to_base64());
        Ok(signed)
    }
}

/// Sign with the system clock. See [`Signer::sign`].
pub fn sign(env: &Envelope, payload: &[u8], keypair: &Keypair, set_iat: bool) -> Result<Envelope> {
    Signer::new().sign(env, payload, keypair, set_iat)
}

/// Verify the envelope's signature against `public_key`.
pub fn verify(env: &Envelope, public_key: &PublicKey) -> Result<()> {
    validate_for_verify(env)?;

    let sig = Signature::from_base64(env.sig.as_deref().unwrap_or_default())?;
    let message = env.unsigned_canonical_bytes()?;
    public_key.verify(&message, &sig)
}

/// Check that `payload` hashes to the envelope's `payload_hash` under the
/// envelope's declared encoding.
pub fn verify_payload_hash(env: &Envelope, payload: &[u8]) -> Result<()> {
    let expected = match env.payload_hash.as_deref() {
        Some(h) if !h.is_empty() => h,
        _ => return Err(Error::MissingPayloadHash),
    };
    let actual = compute_payload_hash(payload, &env.payload_encoding)?;
    if actual != expected {
        return Err(Error::PayloadHashMismatch {
            expected: expected.to_string(),
            actual,
        });
    }
    Ok(())
}
