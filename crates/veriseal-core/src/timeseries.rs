//! Timeseries: hash-chained sessions of envelopes.
//!
//! A session is identified by a UUID v4 `ts_session_id`. Envelope `k` of a
//! session carries `ts_seq = k` and, for `k >= 1`, `ts_prev` set to the
//! unsigned hash of envelope `k - 1`:
//!
//! ```text
//! e0: seq=0, prev=None
//! e1: seq=1, prev=H(unsigned(e0))
//! e2: seq=2, prev=H(unsigned(e1))
//! ```
//!
//! The link hash is independent of the predecessor's `sig` but covers every
//! other field, including `payload_hash` and `iat`.

use uuid::Uuid;

use crate::crypto::{PublicKey, Sha256Digest};
use crate::envelope::{Envelope, PayloadEncoding};
use crate::error::{Error, Result};
use crate::signer::verify;
use crate::validation::{validate_curr_for_check, validate_prev_for_next};

/// A source of fresh session ids.
pub trait SessionIdGenerator {
    fn generate(&self) -> String;
}

/// Random UUID v4, lowercase hyphenated.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomUuidV4;

impl SessionIdGenerator for RandomUuidV4 {
    fn generate(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

impl<F: Fn() -> String> SessionIdGenerator for F {
    fn generate(&self) -> String {
        self()
    }
}

/// Starts timeseries sessions using an injected session id generator.
#[derive(Debug, Clone, Default)]
pub struct Timeseries<G = RandomUuidV4> {
    generator: G,
}

impl Timeseries<RandomUuidV4> {
    pub fn new() -> Self {
        Self {
            generator: RandomUuidV4,
        }
    }
}

impl<G: SessionIdGenerator> Timeseries<G> {
    pub fn with_generator(generator: G) -> Self {
        Self { generator }
    }

    /// The first template of a new session: `ts_seq = 0`, no `ts_prev`.
    pub fn new_session(&self, kid: &str, encoding: PayloadEncoding) -> Result<Envelope> {
        let mut env = Envelope::template(kid, encoding)?;
        env.ts_session_id = Some(self.generator.generate());
        env.ts_seq = Some(0);
        Ok(env)
    }
}

/// Start a session with a random UUID v4 id.
pub fn new_session(kid: &str, encoding: PayloadEncoding) -> Result<Envelope> {
    Timeseries::new().new_session(kid, encoding)
}

/// base64(SHA-256(canonical unsigned form)).
pub fn unsigned_hash(env: &Envelope) -> Result<String> {
    let bytes = env.unsigned_canonical_bytes()?;
    Ok(Sha256Digest::hash(&bytes).to_base64())
}

/// Derive the template that follows `prev` in its session.
///
/// Inherits `kid`, `payload_encoding` and the session id; `iat`,
/// `payload_hash` and `sig` are left for the signing step.
pub fn next(prev: &Envelope) -> Result<Envelope> {
    validate_prev_for_next(prev)?;
    let prev_hash = unsigned_hash(prev)?;

    let mut env = Envelope::template(&prev.kid, prev.encoding()?)?;
    env.ts_session_id = prev.ts_session_id.clone();
    // validated: present and below u64::MAX
    env.ts_seq = prev.ts_seq.map(|s| s + 1);
    env.ts_prev = Some(prev_hash);
    Ok(env)
}

/// Check that `curr` directly follows `prev`.
///
/// Checks run in order session id, sequence, link hash; the first broken
/// invariant is reported.
pub fn check_link(prev: &Envelope, curr: &Envelope) -> Result<()> {
    validate_prev_for_next(prev).map_err(|e| Error::PrevInvalid(Box::new(e)))?;
    validate_curr_for_check(curr).map_err(|e| Error::CurrInvalid(Box::new(e)))?;

    let prev_sid = prev.ts_session_id.as_deref().unwrap_or_default();
    let curr_sid = curr.ts_session_id.as_deref().unwrap_or_default();
    if curr_sid != prev_sid {
        return Err(Error::SessionMismatch {
            expected: prev_sid.to_string(),
            actual: curr_sid.to_string(),
        });
    }

    let expected_seq = prev.ts_seq.unwrap_or_default() + 1;
    let actual_seq = curr.ts_seq.unwrap_or_default();
    if actual_seq != expected_seq {
        return Err(Error::SeqMismatch {
            expected: expected_seq,
            actual: actual_seq,
        });
    }

    let want_prev = unsigned_hash(prev)?;
    let got_prev = curr.ts_prev.as_deref().unwrap_or_default();
    if got_prev != want_prev {
        return Err(Error::PrevHashMismatch {
            expected: want_prev,
            actual: got_prev.to_string(),
        });
    }

    Ok(())
}

/// Audit an ordered chain of envelopes, stopping at the first break.
///
/// Errors are [`Error::ChainBreak`] carrying the 0-based index of the
/// offending envelope. With `strict_start`, the chain must begin at
/// `ts_seq = 0` with no `ts_prev`.
pub fn audit(envelopes: &[Envelope], strict_start: bool) -> Result<()> {
    let first = envelopes.first().ok_or(Error::EmptyChain)?;
    check_start(first, strict_start).map_err(|e| chain_break(0, e))?;

    for (i, pair) in envelopes.windows(2).enumerate() {
        check_link(&pair[0], &pair[1]).map_err(|e| chain_break(i + 1, e))?;
    }
    Ok(())
}

/// [`audit`], then verify every envelope's signature in order.
pub fn audit_signed(envelopes: &[Envelope], strict_start: bool, public_key: &PublicKey) -> Result<()> {
    audit(envelopes, strict_start)?;
    for (i, env) in envelopes.iter().enumerate() {
        verify(env, public_key).map_err(|e| chain_break(i, e))?;
    }
    Ok(())
}

fn check_start(first: &Envelope, strict_start: bool) -> Result<()> {
    if first.ts_session_id.as_deref().map_or(true, str::is_empty) {
        return Err(Error::MissingSessionId);
    }
    let seq = first.ts_seq.ok_or(Error::MissingSeq)?;
    if strict_start {
        if seq != 0 {
            return Err(Error::StrictStartSeq(seq));
        }
        if first.ts_prev.is_some() {
            return Err(Error::StrictStartPrev);
        }
    }
    Ok(())
}

fn chain_break(index: usize, source: Error) -> Error {
    Error::ChainBreak {
        index,
        source: Box::new(source),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::Keypair;
    use crate::error::ErrorKind;
    use crate::signer::Signer;

    const SID: &str = "00000000-0000-4000-8000-000000000000";

    fn fixed_session() -> Envelope {
        Timeseries::with_generator(|| SID.to_string())
            .new_session("ts-kid", PayloadEncoding::Jcs)
            .unwrap()
    }

    fn keypair() -> Keypair {
        Keypair::from_seed(&[3u8; 32])
    }

    /// A signed chain of `n` envelopes starting from `first`.
    fn chain_from(first: Envelope, n: usize) -> Vec<Envelope> {
        let signer = Signer::with_clock(|| 1_700_000_000_i64);
        let kp = keypair();
        let mut out: Vec<Envelope> = Vec::with_capacity(n);
        let mut template = first;
        for i in 0..n {
            let payload = format!("{{\"i\":{i}}}");
            let signed = signer.sign(&template, payload.as_bytes(), &kp, true).unwrap();
            template = next(&signed).unwrap();
            out.push(signed);
        }
        out
    }

    fn chain(n: usize) -> Vec<Envelope> {
        chain_from(fixed_session(), n)
    }

    #[test]
    fn test_new_session_shape() {
        let env = fixed_session();
        assert_eq!(env.ts_session_id.as_deref(), Some(SID));
        assert_eq!(env.ts_seq, Some(0));
        assert!(env.ts_prev.is_none());
        assert!(env.is_timeseries());
    }

    #[test]
    fn test_random_session_ids_are_uuid_v4() {
        let a = new_session("k", PayloadEncoding::Raw).unwrap();
        let b = new_session("k", PayloadEncoding::Raw).unwrap();
        let sid = a.ts_session_id.clone().unwrap();
        let parsed = Uuid::parse_str(&sid).unwrap();
        assert_eq!(parsed.get_version_num(), 4);
        assert_eq!(sid, sid.to_lowercase());
        assert_ne!(a.ts_session_id, b.ts_session_id);
    }

    #[test]
    fn test_next_derives_link() {
        let chain = chain(3);
        for (k, env) in chain.iter().enumerate() {
            assert_eq!(env.ts_seq, Some(k as u64));
            assert_eq!(env.ts_session_id.as_deref(), Some(SID));
            assert_eq!(env.kid, "ts-kid");
            assert_eq!(env.payload_encoding, "jcs");
        }
        assert!(chain[0].ts_prev.is_none());
        assert_eq!(chain[1].ts_prev, Some(unsigned_hash(&chain[0]).unwrap()));
        assert_eq!(chain[2].ts_prev, Some(unsigned_hash(&chain[1]).unwrap()));
    }

    #[test]
    fn test_next_leaves_sign_fields_empty() {
        let signed = &chain(1)[0];
        let template = next(signed).unwrap();
        assert!(template.iat.is_none());
        assert!(template.payload_hash.is_none());
        assert!(template.sig.is_none());
    }

    #[test]
    fn test_unsigned_hash_ignores_sig_only() {
        let env = chain(1).remove(0);
        let h = unsigned_hash(&env).unwrap();

        let mut resig = env.clone();
        resig.sig = Some("AAAA".into());
        assert_eq!(unsigned_hash(&resig).unwrap(), h);

        let mut rehash = env.clone();
        rehash.payload_hash = Some("AAAA".into());
        assert_ne!(unsigned_hash(&rehash).unwrap(), h);

        let mut reiat = env;
        reiat.iat = Some(1);
        assert_ne!(unsigned_hash(&reiat).unwrap(), h);
    }

    #[test]
    fn test_next_overflow() {
        let mut env = fixed_session();
        env.ts_seq = Some(u64::MAX);
        let err = next(&env).unwrap_err();
        assert!(matches!(err, Error::SequenceOverflow));
        assert_eq!(err.kind(), ErrorKind::SequenceViolation);
    }

    #[test]
    fn test_next_requires_session() {
        let env = Envelope::template("k", PayloadEncoding::Jcs).unwrap();
        assert!(matches!(next(&env), Err(Error::MissingSessionId)));
    }

    #[test]
    fn test_check_link_ok() {
        let c = chain(2);
        check_link(&c[0], &c[1]).unwrap();
    }

    #[test]
    fn test_check_link_session_mismatch() {
        let c = chain(2);
        let mut curr = c[1].clone();
        curr.ts_session_id = Some("11111111-1111-4111-8111-111111111111".into());
        assert!(matches!(
            check_link(&c[0], &curr),
            Err(Error::SessionMismatch { .. })
        ));
    }

    #[test]
    fn test_check_link_seq_mismatch_reports_both() {
        let c = chain(2);
        let mut curr = c[1].clone();
        curr.ts_seq = Some(5);
        let err = check_link(&c[0], &curr).unwrap_err();
        assert_eq!(err.to_string(), "ts_seq mismatch: want 1, got 5");
    }

    #[test]
    fn test_check_link_prev_mismatch() {
        let c = chain(2);
        let mut curr = c[1].clone();
        curr.ts_prev = Some("bm90IGEgaGFzaA==".into());
        let err = check_link(&c[0], &curr).unwrap_err();
        assert!(matches!(err, Error::PrevHashMismatch { .. }));
        assert_eq!(err.kind(), ErrorKind::HashMismatch);
    }

    #[test]
    fn test_check_link_wraps_side() {
        let c = chain(2);
        let mut prev = c[0].clone();
        prev.ts_seq = None;
        let err = check_link(&prev, &c[1]).unwrap_err();
        assert_eq!(err.to_string(), "prev invalid: missing ts_seq");

        let mut curr = c[1].clone();
        curr.ts_prev = None;
        let err = check_link(&c[0], &curr).unwrap_err();
        assert_eq!(err.to_string(), "curr invalid: missing ts_prev");
    }

    #[test]
    fn test_audit_empty() {
        assert!(matches!(audit(&[], false), Err(Error::EmptyChain)));
    }

    #[test]
    fn test_audit_valid_chain() {
        audit(&chain(5), true).unwrap();
        audit(&chain(1), true).unwrap();
    }

    #[test]
    fn test_audit_reports_offending_index() {
        let mut c = chain(3);
        c[2].ts_prev = Some("garbage".into());
        let err = audit(&c, false).unwrap_err();
        assert_eq!(err.chain_index(), Some(2));
        assert_eq!(err.kind(), ErrorKind::ChainBreak);
        assert!(matches!(err.root_cause(), Error::PrevHashMismatch { .. }));

        audit(&c[..2], false).unwrap();
    }

    #[test]
    fn test_audit_stops_at_first_break() {
        let mut c = chain(4);
        c[1].ts_seq = Some(7);
        c[3].ts_prev = None;
        assert_eq!(audit(&c, false).unwrap_err().chain_index(), Some(1));
    }

    #[test]
    fn test_audit_first_envelope_checks() {
        let mut c = chain(2);
        c[0].ts_session_id = None;
        let err = audit(&c, false).unwrap_err();
        assert_eq!(err.chain_index(), Some(0));
        assert!(matches!(err.root_cause(), Error::MissingSessionId));
    }

    #[test]
    fn test_strict_start_toggle() {
        let mut first = fixed_session();
        first.ts_seq = Some(10);
        let c = chain_from(first, 3);
        assert_eq!(c[2].ts_seq, Some(12));

        audit(&c, false).unwrap();
        let err = audit(&c, true).unwrap_err();
        assert_eq!(err.chain_index(), Some(0));
        assert!(matches!(err.root_cause(), Error::StrictStartSeq(10)));
    }

    #[test]
    fn test_strict_start_rejects_prev_on_first() {
        let c = chain(3);
        let tail = &c[1..];
        audit(tail, false).unwrap();
        assert!(matches!(
            audit(tail, true).unwrap_err().root_cause(),
            Error::StrictStartSeq(1)
        ));

        let mut first = c[0].clone();
        first.ts_prev = Some("x".into());
        assert!(matches!(
            audit(&[first], true).unwrap_err().root_cause(),
            Error::StrictStartPrev
        ));
    }

    #[test]
    fn test_audit_signed() {
        let c = chain(3);
        audit_signed(&c, true, &keypair().public_key()).unwrap();

        let other = Keypair::from_seed(&[4u8; 32]).public_key();
        let err = audit_signed(&c, true, &other).unwrap_err();
        assert_eq!(err.chain_index(), Some(0));
        assert_eq!(err.root_cause().kind(), ErrorKind::CryptoFailure);
    }

    #[test]
    fn test_audit_signed_flags_resigned_sig() {
        // Replacing a signature leaves the links intact but fails verification.
        let mut c = chain(3);
        c[1].sig = c[0].sig.clone();
        audit(&c, false).unwrap();
        let err = audit_signed(&c, false, &keypair().public_key()).unwrap_err();
        assert_eq!(err.chain_index(), Some(1));
    }
}
