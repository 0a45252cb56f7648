//! Golden test vectors for deterministic verification.
//!
//! These vectors pin the canonical unsigned bytes, the unsigned hash and the
//! Ed25519 signature of known envelopes. Any change to canonicalization or
//! to the envelope field set shows up here first.

use veriseal_core::{unsigned_hash, Envelope, PayloadEncoding};

use crate::fixtures::{golden_seed, TestFixture};

/// Expected outputs for one envelope of a vector.
#[derive(Debug, Clone)]
pub struct ExpectedEnvelope {
    /// Canonical bytes of the unsigned form.
    pub unsigned_canonical: &'static str,
    /// base64(SHA-256(unsigned_canonical)).
    pub unsigned_hash: &'static str,
    /// base64 signature.
    pub sig: &'static str,
}

/// A golden test vector.
#[derive(Debug, Clone)]
pub struct GoldenVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    /// Seed for deterministic key generation.
    pub seed: [u8; 32],
    pub kid: &'static str,
    pub encoding: PayloadEncoding,
    /// One envelope per payload. A timeseries vector chains them.
    pub payloads: &'static [&'static [u8]],
    pub timeseries: bool,
    /// Whether the fixed clock's time is written to `iat`.
    pub set_iat: bool,
    pub expected: &'static [ExpectedEnvelope],
}

/// base64 of the public key derived from [`golden_seed`].
pub const GOLDEN_PUBLIC_KEY: &str = "A6EHv/POEL4dcN0Y50vAmWfk1jCbpQ1fHdyGZBJVMbg=";

/// Get all golden test vectors.
pub fn all_vectors() -> Vec<GoldenVector> {
    vec![
        GoldenVector {
            name: "jcs payload with iat",
            seed: golden_seed(),
            kid: "test-kid",
            encoding: PayloadEncoding::Jcs,
            payloads: &[b"{\"hello\":\"world\",\"n\":1}\n"],
            timeseries: false,
            set_iat: true,
            expected: &[ExpectedEnvelope {
                unsigned_canonical: r#"{"alg":"ed25519","iat":1700000000,"kid":"test-kid","payload_encoding":"jcs","payload_hash":"MrdpmCo6bi3xIFMLBty68ej3XgBM7qkqw+kb16JI1yg=","payload_hash_alg":"sha256","v":1}"#,
                unsigned_hash: "2Hqfr1psqR9DoeOQlpiOXjnp22xkTsLFq8vxYzNDwtQ=",
                sig: "3bd6HAkQEeuRbyPkVz9rBLWvRIm06vLTtKqdvDeXuSM+XPni7TO4zjR0Hk0OicwFdJVOR/vpSynt+DqTfMqlCQ==",
            }],
        },
        GoldenVector {
            name: "raw payload without iat",
            seed: golden_seed(),
            kid: "test-kid",
            encoding: PayloadEncoding::Raw,
            payloads: &[b"hello"],
            timeseries: false,
            set_iat: false,
            expected: &[ExpectedEnvelope {
                unsigned_canonical: r#"{"alg":"ed25519","kid":"test-kid","payload_encoding":"raw","payload_hash":"LPJNul+wow4m6DsqxbninhsWHlwfp0JecwQzYpOLmCQ=","payload_hash_alg":"sha256","v":1}"#,
                unsigned_hash: "L88/+Pj3XALVWKfpJnAXdoUL7Hl5WUyoEKC2y0Sigdc=",
                sig: "jbozyUvEVWphHhBRrr/FVvMV7Zsl5oX+coSV7SrFWATrfx5s4QCaU9MKFv3BE3a6DwWhKnydRd7sFOA/fj7aBw==",
            }],
        },
        GoldenVector {
            name: "three-envelope timeseries session",
            seed: golden_seed(),
            kid: "ts-kid",
            encoding: PayloadEncoding::Jcs,
            payloads: &[b"{\"t\":0}", b"{\"t\":1}", b"{\"t\":2}"],
            timeseries: true,
            set_iat: true,
            expected: &[
                ExpectedEnvelope {
                    unsigned_canonical: r#"{"alg":"ed25519","iat":1700000000,"kid":"ts-kid","payload_encoding":"jcs","payload_hash":"dG1p7wIMKvm2eS/nwS+d2axDe74qZfCwxBkZ5Txdzqs=","payload_hash_alg":"sha256","ts_seq":0,"ts_session_id":"00000000-0000-4000-8000-000000000000","v":1}"#,
                    unsigned_hash: "Xxz73GTzFwkKPpqlBAHNVq1SYieWaL4W4V7L1sQEc+o=",
                    sig: "YGv+qFpYXi3IS1R1TiuD7dsYRl3Ti+w7f8bpROVKXZi6Db1qYqU9Lt5agjCd02+/BS9Ty4P4cTw8sfwYk+bGBg==",
                },
                ExpectedEnvelope {
                    unsigned_canonical: r#"{"alg":"ed25519","iat":1700000000,"kid":"ts-kid","payload_encoding":"jcs","payload_hash":"SDSUX3v5H4Lvxc+IHZAuwc+ljxvgHLNf5gK4rUYgxVI=","payload_hash_alg":"sha256","ts_prev":"Xxz73GTzFwkKPpqlBAHNVq1SYieWaL4W4V7L1sQEc+o=","ts_seq":1,"ts_session_id":"00000000-0000-4000-8000-000000000000","v":1}"#,
                    unsigned_hash: "QQASyeR+TV5AoBKVttBdn1088Z1jlyVO/Owbc1Bf3tg=",
                    sig: "WzKPj2yuEDddcJHVPUQ/Zif68WlRU1hTUcLIPrTkn1GmWzginGgoFgpeWV5+WHdIhIl17xJzEaWx7l9PcBjGDQ==",
                },
                ExpectedEnvelope {
                    unsigned_canonical: r#"{"alg":"ed25519","iat":1700000000,"kid":"ts-kid","payload_encoding":"jcs","payload_hash":"jj8nruQCdLs9EbbO+EgVceBJCpFAyHokZaRhfricPLM=","payload_hash_alg":"sha256","ts_prev":"QQASyeR+TV5AoBKVttBdn1088Z1jlyVO/Owbc1Bf3tg=","ts_seq":2,"ts_session_id":"00000000-0000-4000-8000-000000000000","v":1}"#,
                    unsigned_hash: "7EmOC19ij2qMv7+3HigiADGUX0ccYoX36WipSbIPQd8=",
                    sig: "XniuvCMFPq7fempzwrOLtWRm0qtNbzh8zy7W9/USMBRlJlC+moXOaopyX2k3lvzLA5Rtogigyg/Q7RhilU3YDQ==",
                },
            ],
        },
    ]
}

/// Generate the signed envelopes of a golden vector.
pub fn generate_envelopes_from_vector(vector: &GoldenVector) -> Vec<Envelope> {
    let fixture = TestFixture::with_seed(vector.seed);
    if vector.timeseries {
        let first = fixture.session_start(vector.kid, vector.encoding);
        fixture.make_chain_from(first, vector.payloads, vector.set_iat)
    } else {
        let template = fixture.template(vector.kid, vector.encoding);
        vector
            .payloads
            .iter()
            .map(|p| fixture.sign(&template, p, vector.set_iat))
            .collect()
    }
}

/// Verify all golden vectors against their expected outputs.
///
/// Returns `(name, matches, actual unsigned hashes)` per vector.
pub fn verify_all_vectors() -> Vec<(String, bool, Vec<String>)> {
    all_vectors()
        .iter()
        .map(|v| {
            let envelopes = generate_envelopes_from_vector(v);
            let hashes: Vec<String> = envelopes
                .iter()
                .map(|e| unsigned_hash(e).unwrap_or_default())
                .collect();
            let matches = envelopes.len() == v.expected.len()
                && envelopes.iter().zip(v.expected).zip(&hashes).all(|((env, exp), hash)| {
                    hash == exp.unsigned_hash && env.sig.as_deref() == Some(exp.sig)
                });
            (v.name.to_string(), matches, hashes)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vectors_are_deterministic() {
        // Generate each vector twice, verify identical results
        for vector in all_vectors() {
            let a = generate_envelopes_from_vector(&vector);
            let b = generate_envelopes_from_vector(&vector);
            assert_eq!(
                a, b,
                "Vector '{}' produced different envelopes on regeneration",
                vector.name
            );
        }
    }

    #[test]
    fn test_vectors_match_expected() {
        for (name, matches, hashes) in verify_all_vectors() {
            assert!(matches, "Vector '{name}' diverged: {hashes:?}");
        }
    }

    #[test]
    fn test_golden_public_key() {
        let fixture = TestFixture::golden();
        assert_eq!(fixture.public_key().to_base64(), GOLDEN_PUBLIC_KEY);
    }
}
