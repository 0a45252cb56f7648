//! Payload hashing.
//!
//! `jcs` payloads are canonicalized before hashing; `raw` payloads are hashed
//! as opaque bytes. The digest is base64(SHA-256(...)).

use crate::canonical::canonicalize;
use crate::crypto::Sha256Digest;
use crate::envelope::PayloadEncoding;
use crate::error::{Error, Result};

/// Compute the payload hash for the given wire encoding identifier.
pub fn compute_payload_hash(payload: &[u8], encoding: &str) -> Result<String> {
    let encoding = PayloadEncoding::parse(encoding).map_err(|e| match e {
        Error::MissingPayloadEncoding => Error::UnsupportedPayloadEncoding(String::new()),
        other => other,
    })?;
    Ok(payload_digest(payload, encoding)?.to_base64())
}

/// Compute the payload digest for a parsed encoding.
pub fn payload_digest(payload: &[u8], encoding: PayloadEncoding) -> Result<Sha256Digest> {
    match encoding {
        PayloadEncoding::Raw => Ok(Sha256Digest::hash(payload)),
        PayloadEncoding::Jcs => {
            let canonical = canonicalize(payload).map_err(Error::InvalidPayloadEncoding)?;
            Ok(Sha256Digest::hash(&canonical))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CanonicalError;

    #[test]
    fn test_raw_hashes_bytes_unmodified() {
        // SHA-256("abc")
        assert_eq!(
            compute_payload_hash(b"abc", "raw").unwrap(),
            "ungWv48Bz+pBQUDeXa4iI7ADYaOWF3qctBD/YfIAFa0="
        );
        // not UTF-8, not JSON
        assert!(compute_payload_hash(&[0xff, 0x00, 0xfe], "raw").is_ok());
    }

    #[test]
    fn test_jcs_ignores_key_order_and_whitespace() {
        let a = compute_payload_hash(br#"{"b":1,"a":2}"#, "jcs").unwrap();
        let b = compute_payload_hash(b"{ \"a\": 2,\n \"b\": 1 }\n", "jcs").unwrap();
        assert_eq!(a, b);
        assert_eq!(a, compute_payload_hash(br#"{"a":2,"b":1}"#, "raw").unwrap());
    }

    #[test]
    fn test_raw_is_sensitive_to_formatting() {
        let a = compute_payload_hash(br#"{"a":2,"b":1}"#, "raw").unwrap();
        let b = compute_payload_hash(br#"{"b":1,"a":2}"#, "raw").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_jcs_rejects_invalid_json() {
        let err = compute_payload_hash(b"not json", "jcs").unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidPayloadEncoding(CanonicalError::InvalidJson(_))
        ));
        let err = compute_payload_hash(b"", "jcs").unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidPayloadEncoding(CanonicalError::EmptyInput)
        ));
    }

    #[test]
    fn test_unknown_or_empty_encoding_rejected() {
        for enc in ["", "JCS", "base64", "rawx"] {
            let err = compute_payload_hash(b"{}", enc).unwrap_err();
            assert!(
                err.to_string().contains("unsupported payload_encoding"),
                "{enc}: {err}"
            );
        }
    }
}
