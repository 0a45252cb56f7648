//! Key file loading.
//!
//! Private keys are accepted as PKCS#8 PEM, base64 of the 32-byte seed or
//! 64-byte keypair, or the same bytes raw. Public keys are accepted as SPKI
//! PEM, base64 of the 32 bytes, or the raw 32 bytes.

use anyhow::{bail, Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use ed25519_dalek::pkcs8::{DecodePrivateKey, DecodePublicKey};
use ed25519_dalek::{SigningKey, VerifyingKey};
use std::fs;
use std::path::Path;
use tracing::debug;
use veriseal_core::{Keypair, PublicKey};

const PEM_PREFIX: &str = "-----BEGIN";

/// Load a signing keypair from a file.
pub fn load_keypair(path: &Path) -> Result<Keypair> {
    let bytes = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let keypair = parse_private_key(&bytes)
        .with_context(|| format!("failed to load private key from {}", path.display()))?;
    debug!(public_key = %keypair.public_key().to_base64(), "loaded private key");
    Ok(keypair)
}

/// Load a verifying key from a file.
pub fn load_public_key(path: &Path) -> Result<PublicKey> {
    let bytes = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let public_key = parse_public_key(&bytes)
        .with_context(|| format!("failed to load public key from {}", path.display()))?;
    debug!(public_key = %public_key.to_base64(), "loaded public key");
    Ok(public_key)
}

pub fn parse_private_key(bytes: &[u8]) -> Result<Keypair> {
    if let Some(text) = as_pem(bytes) {
        let key = SigningKey::from_pkcs8_pem(text)
            .map_err(|e| anyhow::anyhow!("invalid PKCS#8 private key: {e}"))?;
        return Ok(Keypair::from(key));
    }
    if let Some(decoded) = as_base64(bytes) {
        return keypair_from_raw(&decoded);
    }
    keypair_from_raw(bytes)
}

pub fn parse_public_key(bytes: &[u8]) -> Result<PublicKey> {
    if let Some(text) = as_pem(bytes) {
        let key = VerifyingKey::from_public_key_pem(text)
            .map_err(|e| anyhow::anyhow!("invalid SPKI public key: {e}"))?;
        return Ok(PublicKey::from(key));
    }
    if let Some(decoded) = as_base64(bytes) {
        return Ok(PublicKey::from_slice(&decoded)?);
    }
    Ok(PublicKey::from_slice(bytes)?)
}

fn keypair_from_raw(bytes: &[u8]) -> Result<Keypair> {
    match bytes.len() {
        32 => {
            let mut seed = [0u8; 32];
            seed.copy_from_slice(bytes);
            Ok(Keypair::from_seed(&seed))
        }
        64 => {
            let mut pair = [0u8; 64];
            pair.copy_from_slice(bytes);
            Ok(Keypair::from_keypair_bytes(&pair)?)
        }
        n => bail!("private key must be 32 or 64 bytes, got {n}"),
    }
}

fn as_pem(bytes: &[u8]) -> Option<&str> {
    let text = std::str::from_utf8(bytes).ok()?;
    text.trim_start().starts_with(PEM_PREFIX).then_some(text)
}

/// Base64 text of a plausible key length. Raw key bytes that happen to be
/// valid base64 text would decode to a different length and fall through.
fn as_base64(bytes: &[u8]) -> Option<Vec<u8>> {
    let text = std::str::from_utf8(bytes).ok()?;
    let decoded = STANDARD.decode(text.trim()).ok()?;
    matches!(decoded.len(), 32 | 64).then_some(decoded)
}
