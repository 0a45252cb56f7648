//! Test fixtures and helpers.
//!
//! Common setup code for integration tests: deterministic keys, a fixed
//! clock, a fixed session id, and signed chain builders.

use veriseal_core::{
    next, Envelope, Keypair, PayloadEncoding, PublicKey, Signer, Timeseries,
};

/// The fixed clock value, Unix seconds (2023-11-14T22:13:20Z).
pub const FIXED_NOW: i64 = 1_700_000_000;

/// The fixed session id handed out by [`fixed_session_id`].
pub const FIXED_SESSION_ID: &str = "00000000-0000-4000-8000-000000000000";

/// Seed bytes `0, 1, ..., 31`.
pub const fn golden_seed() -> [u8; 32] {
    let mut seed = [0u8; 32];
    let mut i = 0;
    while i < 32 {
        seed[i] = i as u8;
        i += 1;
    }
    seed
}

/// A clock that always reads [`FIXED_NOW`].
pub fn fixed_clock() -> i64 {
    FIXED_NOW
}

/// A session id generator that always returns [`FIXED_SESSION_ID`].
pub fn fixed_session_id() -> String {
    FIXED_SESSION_ID.to_string()
}

/// A test fixture with a keypair, a fixed-clock signer and a fixed-id
/// session starter.
pub struct TestFixture {
    pub keypair: Keypair,
    pub signer: Signer<fn() -> i64>,
    pub timeseries: Timeseries<fn() -> String>,
}

impl TestFixture {
    /// Create a new test fixture with a random keypair.
    pub fn new() -> Self {
        Self::with_keypair(Keypair::generate())
    }

    /// Create with a deterministic keypair from seed.
    pub fn with_seed(seed: [u8; 32]) -> Self {
        Self::with_keypair(Keypair::from_seed(&seed))
    }

    /// The fixture used by the golden vectors.
    pub fn golden() -> Self {
        Self::with_seed(golden_seed())
    }

    fn with_keypair(keypair: Keypair) -> Self {
        Self {
            keypair,
            signer: Signer::with_clock(fixed_clock as fn() -> i64),
            timeseries: Timeseries::with_generator(fixed_session_id as fn() -> String),
        }
    }

    /// Get the keypair's public key.
    pub fn public_key(&self) -> PublicKey {
        self.keypair.public_key()
    }

    /// An unsigned template.
    pub fn template(&self, kid: &str, encoding: PayloadEncoding) -> Envelope {
        Envelope::template(kid, encoding).expect("fixture kid is non-blank")
    }

    /// Sign `env` over `payload` with the fixture key and clock.
    pub fn sign(&self, env: &Envelope, payload: &[u8], set_iat: bool) -> Envelope {
        self.signer
            .sign(env, payload, &self.keypair, set_iat)
            .expect("fixture envelope signs")
    }

    /// A signed stand-alone envelope.
    pub fn make_signed(&self, kid: &str, encoding: PayloadEncoding, payload: &[u8]) -> Envelope {
        self.sign(&self.template(kid, encoding), payload, true)
    }

    /// The first template of a session with id [`FIXED_SESSION_ID`].
    pub fn session_start(&self, kid: &str, encoding: PayloadEncoding) -> Envelope {
        self.timeseries
            .new_session(kid, encoding)
            .expect("fixture kid is non-blank")
    }

    /// A signed chain, one envelope per payload, starting a new session.
    pub fn make_chain(&self, kid: &str, encoding: PayloadEncoding, payloads: &[&[u8]]) -> Vec<Envelope> {
        self.make_chain_from(self.session_start(kid, encoding), payloads, true)
    }

    /// A signed chain starting from the given template.
    pub fn make_chain_from(
        &self,
        first: Envelope,
        payloads: &[&[u8]],
        set_iat: bool,
    ) -> Vec<Envelope> {
        let mut chain: Vec<Envelope> = Vec::with_capacity(payloads.len());
        let mut template = first;
        for payload in payloads {
            if let Some(prev) = chain.last() {
                template = next(prev).expect("fixture chain links");
            }
            chain.push(self.sign(&template, payload, set_iat));
        }
        chain
    }

    /// A signed `jcs` chain of `n` envelopes with payloads `{"i":0}`, `{"i":1}`, ...
    pub fn make_numbered_chain(&self, n: usize) -> Vec<Envelope> {
        let payloads: Vec<Vec<u8>> = (0..n).map(|i| format!("{{\"i\":{i}}}").into_bytes()).collect();
        let refs: Vec<&[u8]> = payloads.iter().map(Vec::as_slice).collect();
        self.make_chain("chain-kid", PayloadEncoding::Jcs, &refs)
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Create multiple test fixtures for multi-party tests.
pub fn multi_party_fixtures(count: usize) -> Vec<TestFixture> {
    (0..count)
        .map(|i| {
            let mut seed = [0u8; 32];
            seed[0] = i as u8;
            TestFixture::with_seed(seed)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use veriseal_core::{audit, unsigned_hash, verify};

    #[test]
    fn test_golden_seed() {
        let seed = golden_seed();
        assert_eq!(seed[0], 0);
        assert_eq!(seed[31], 31);
    }

    #[test]
    fn test_fixture_signs_with_fixed_clock() {
        let fixture = TestFixture::new();
        let env = fixture.make_signed("k", PayloadEncoding::Raw, b"hello");
        assert_eq!(env.iat, Some(FIXED_NOW));
        verify(&env, &fixture.public_key()).unwrap();
    }

    #[test]
    fn test_fixture_chain() {
        let fixture = TestFixture::golden();
        let chain = fixture.make_numbered_chain(3);

        assert_eq!(chain.len(), 3);
        assert_eq!(chain[0].ts_session_id.as_deref(), Some(FIXED_SESSION_ID));
        assert_eq!(chain[1].ts_prev, Some(unsigned_hash(&chain[0]).unwrap()));
        assert_eq!(chain[2].ts_prev, Some(unsigned_hash(&chain[1]).unwrap()));
        audit(&chain, true).unwrap();
    }

    #[test]
    fn test_multi_party() {
        let parties = multi_party_fixtures(3);

        // Each party has unique keys
        let pks: Vec<_> = parties.iter().map(|p| p.public_key()).collect();
        assert_ne!(pks[0], pks[1]);
        assert_ne!(pks[1], pks[2]);
        assert_ne!(pks[0], pks[2]);
    }
}
