//! # Veriseal Testkit
//!
//! Testing utilities for veriseal.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: Known envelopes with pinned canonical bytes, hashes and signatures
//! - **Generators**: Proptest strategies for property-based testing
//! - **Fixtures**: Deterministic keys, a fixed clock, a fixed session id, chain builders
//!
//! ## Golden Vectors
//!
//! ```rust
//! use veriseal_testkit::vectors::{all_vectors, generate_envelopes_from_vector};
//!
//! for vector in all_vectors() {
//!     let envelopes = generate_envelopes_from_vector(&vector);
//!     assert_eq!(envelopes.len(), vector.expected.len());
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use veriseal_testkit::generators::{envelope_from_params, EnvelopeParams};
//!
//! proptest! {
//!     #[test]
//!     fn signing_is_deterministic(params: EnvelopeParams) {
//!         prop_assert_eq!(envelope_from_params(&params), envelope_from_params(&params));
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust
//! use veriseal_testkit::fixtures::TestFixture;
//!
//! let fixture = TestFixture::new();
//! let chain = fixture.make_numbered_chain(3);
//! assert!(veriseal_core::audit(&chain, true).is_ok());
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{multi_party_fixtures, TestFixture, FIXED_NOW, FIXED_SESSION_ID};
pub use generators::{envelope_from_params, EnvelopeParams};
pub use vectors::{all_vectors, generate_envelopes_from_vector, verify_all_vectors, GoldenVector};
