//! Envelope: the signed metadata wrapper around a payload.
//!
//! An envelope names the signing algorithm, the key id, how the payload was
//! hashed, and (once signed) the signature. Timeseries envelopes additionally
//! carry a session id, a sequence number and the hash of their predecessor.
//!
//! Every hash and signature is computed over the *unsigned form*: a detached
//! copy of the envelope with `sig` cleared, canonicalized.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::canonical::to_canonical_bytes;
use crate::error::{Error, Result};

/// The current envelope protocol version.
pub const VERSION: i64 = 1;

/// The only accepted signature algorithm identifier.
pub const ALG_ED25519: &str = "ed25519";

/// The only accepted payload hash algorithm identifier.
pub const HASH_ALG_SHA256: &str = "sha256";

/// How `payload_hash` was derived from the payload bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PayloadEncoding {
    /// Payload is JSON; it is canonicalized before hashing.
    Jcs,
    /// Payload is hashed as opaque bytes.
    Raw,
}

impl PayloadEncoding {
    /// The wire identifier.
    pub fn as_str(self) -> &'static str {
        match self {
            PayloadEncoding::Jcs => "jcs",
            PayloadEncoding::Raw => "raw",
        }
    }

    /// Parse a wire identifier.
    ///
    /// Only the lowercase spellings are accepted.
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "jcs" => Ok(PayloadEncoding::Jcs),
            "raw" => Ok(PayloadEncoding::Raw),
            "" => Err(Error::MissingPayloadEncoding),
            other => Err(Error::UnsupportedPayloadEncoding(other.to_string())),
        }
    }
}

impl fmt::Display for PayloadEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PayloadEncoding {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// A signed (or to-be-signed) envelope.
///
/// Optional fields are `None` when absent and are omitted from the JSON
/// form entirely. Unknown fields are rejected when parsing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Envelope {
    /// Protocol version (must be 1).
    pub v: i64,

    /// Signature algorithm (must be `ed25519`).
    pub alg: String,

    /// Key identifier, opaque.
    pub kid: String,

    /// Issued-at, Unix seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,

    /// `jcs` or `raw`.
    pub payload_encoding: String,

    /// Payload hash algorithm (must be `sha256`).
    pub payload_hash_alg: String,

    /// base64(SHA-256) of the normalized payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload_hash: Option<String>,

    /// base64 Ed25519 signature over the unsigned form.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sig: Option<String>,

    /// Timeseries session id (UUID v4).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ts_session_id: Option<String>,

    /// Position within the session.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ts_seq: Option<u64>,

    /// Unsigned hash of the previous envelope in the session.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ts_prev: Option<String>,
}

impl Envelope {
    /// Create an unsigned template.
    ///
    /// `kid` must be non-blank. The template has no hash, signature,
    /// issued-at or timeseries fields.
    pub fn template(kid: &str, encoding: PayloadEncoding) -> Result<Self> {
        if kid.trim().is_empty() {
            return Err(Error::MissingKid);
        }
        Ok(Self {
            v: VERSION,
            alg: ALG_ED25519.to_string(),
            kid: kid.to_string(),
            payload_encoding: encoding.as_str().to_string(),
            payload_hash_alg: HASH_ALG_SHA256.to_string(),
            ..Self::default()
        })
    }

    /// Parse an envelope from JSON bytes.
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Pretty-printed JSON, for writing artifacts.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Whether a signature is present.
    pub fn is_signed(&self) -> bool {
        self.sig.as_deref().is_some_and(|s| !s.is_empty())
    }

    /// Whether this envelope belongs to a timeseries session.
    pub fn is_timeseries(&self) -> bool {
        self.ts_session_id.is_some() || self.ts_seq.is_some() || self.ts_prev.is_some()
    }

    /// The declared payload encoding, parsed.
    pub fn encoding(&self) -> Result<PayloadEncoding> {
        PayloadEncoding::parse(&self.payload_encoding)
    }

    /// A detached copy with `sig` cleared.
    pub fn unsigned(&self) -> Self {
        Self {
            sig: None,
            ..self.clone()
        }
    }

    /// Canonical bytes of the unsigned form: the signing message and the
    /// input to [`crate::timeseries::unsigned_hash`].
    pub fn unsigned_canonical_bytes(&self) -> Result<Vec<u8>> {
        Ok(to_canonical_bytes(&self.unsigned())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_fields() {
        let env = Envelope::template("key-1", PayloadEncoding::Jcs).unwrap();
        assert_eq!(env.v, 1);
        assert_eq!(env.alg, "ed25519");
        assert_eq!(env.kid, "key-1");
        assert_eq!(env.payload_encoding, "jcs");
        assert_eq!(env.payload_hash_alg, "sha256");
        assert!(env.iat.is_none());
        assert!(env.payload_hash.is_none());
        assert!(!env.is_signed());
        assert!(!env.is_timeseries());
    }

    #[test]
    fn test_template_rejects_blank_kid() {
        assert!(matches!(
            Envelope::template("", PayloadEncoding::Raw),
            Err(Error::MissingKid)
        ));
        assert!(matches!(
            Envelope::template(" \t\n", PayloadEncoding::Raw),
            Err(Error::MissingKid)
        ));
    }

    #[test]
    fn test_encoding_parse_is_case_sensitive() {
        assert_eq!(PayloadEncoding::parse("jcs").unwrap(), PayloadEncoding::Jcs);
        assert_eq!("raw".parse::<PayloadEncoding>().unwrap(), PayloadEncoding::Raw);
        assert!(matches!(
            PayloadEncoding::parse("JCS"),
            Err(Error::UnsupportedPayloadEncoding(_))
        ));
        assert!(matches!(
            PayloadEncoding::parse(""),
            Err(Error::MissingPayloadEncoding)
        ));
    }

    #[test]
    fn test_absent_fields_are_omitted() {
        let env = Envelope::template("k", PayloadEncoding::Jcs).unwrap();
        let json = serde_json::to_string(&env).unwrap();
        assert_eq!(
            json,
            r#"{"v":1,"alg":"ed25519","kid":"k","payload_encoding":"jcs","payload_hash_alg":"sha256"}"#
        );
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let json = br#"{"v":1,"alg":"ed25519","kid":"k","payload_encoding":"jcs","payload_hash_alg":"sha256","extra":1}"#;
        let err = Envelope::from_json(json).unwrap_err();
        assert!(matches!(err, Error::Serialization(_)));
    }

    #[test]
    fn test_null_optional_fields_parse_as_absent() {
        let json = br#"{"v":1,"alg":"ed25519","kid":"k","payload_encoding":"raw","payload_hash_alg":"sha256","sig":null,"ts_prev":null}"#;
        let env = Envelope::from_json(json).unwrap();
        assert!(env.sig.is_none());
        assert!(env.ts_prev.is_none());
    }

    #[test]
    fn test_unsigned_is_detached_copy() {
        let mut env = Envelope::template("k", PayloadEncoding::Raw).unwrap();
        env.sig = Some("c2ln".into());
        let unsigned = env.unsigned();
        assert!(unsigned.sig.is_none());
        assert_eq!(env.sig.as_deref(), Some("c2ln"));
    }

    #[test]
    fn test_unsigned_bytes_ignore_sig() {
        let mut env = Envelope::template("k", PayloadEncoding::Raw).unwrap();
        env.payload_hash = Some("aGFzaA==".into());
        let before = env.unsigned_canonical_bytes().unwrap();
        env.sig = Some("AAAA".into());
        assert_eq!(env.unsigned_canonical_bytes().unwrap(), before);
        assert_eq!(
            String::from_utf8(before).unwrap(),
            r#"{"alg":"ed25519","kid":"k","payload_encoding":"raw","payload_hash":"aGFzaA==","payload_hash_alg":"sha256","v":1}"#
        );
    }

    #[test]
    fn test_pretty_json_reparses() {
        let mut env = Envelope::template("k", PayloadEncoding::Jcs).unwrap();
        env.ts_session_id = Some("00000000-0000-4000-8000-000000000000".into());
        env.ts_seq = Some(0);
        let text = env.to_json_pretty().unwrap();
        assert_eq!(Envelope::from_json(text.as_bytes()).unwrap(), env);
        assert!(env.is_timeseries());
    }
}
