//! Proptest generators for property-based testing.

use proptest::prelude::*;
use serde_json::{Map, Value};

use veriseal_core::{Envelope, Keypair, PayloadEncoding, PublicKey, Signer};

use crate::fixtures::fixed_clock;

/// Generate a random keypair.
pub fn keypair() -> impl Strategy<Value = Keypair> {
    any::<[u8; 32]>().prop_map(|seed| Keypair::from_seed(&seed))
}

/// Generate a random public key.
pub fn public_key() -> impl Strategy<Value = PublicKey> {
    keypair().prop_map(|kp| kp.public_key())
}

/// Generate a key id.
pub fn kid() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9-]{0,31}".prop_map(String::from)
}

/// Generate a payload encoding.
pub fn payload_encoding() -> impl Strategy<Value = PayloadEncoding> {
    prop_oneof![Just(PayloadEncoding::Jcs), Just(PayloadEncoding::Raw)]
}

/// Generate payload bytes of specified max length.
pub fn payload(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..=max_len)
}

/// Generate a JSON string, including control characters and non-ASCII.
pub fn json_string() -> impl Strategy<Value = String> {
    prop::collection::vec(any::<char>(), 0..12).prop_map(String::from_iter)
}

/// Generate a JSON scalar: null, bool, number (finite) or string.
pub fn json_scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        any::<u64>().prop_map(Value::from),
        (-1.0e15f64..1.0e15f64).prop_map(Value::from),
        json_string().prop_map(Value::String),
    ]
}

/// Generate an arbitrary JSON value.
pub fn json_value() -> impl Strategy<Value = Value> {
    json_scalar().prop_recursive(4, 64, 8, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..8).prop_map(Value::Array),
            prop::collection::btree_map(json_string(), inner, 0..8)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

/// Generate a JSON object or array: something the canonicalizer accepts.
pub fn json_container() -> impl Strategy<Value = Value> {
    prop_oneof![
        prop::collection::vec(json_value(), 0..8).prop_map(Value::Array),
        prop::collection::btree_map(json_string(), json_value(), 0..8)
            .prop_map(|m| Value::Object(m.into_iter().collect::<Map<_, _>>())),
    ]
}

/// Render `value` as JSON text with object keys in reverse order and
/// whitespace between every token.
pub fn reordered_json_text(value: &Value) -> String {
    let mut out = String::new();
    write_reordered(&mut out, value);
    out
}

fn write_reordered(out: &mut String, value: &Value) {
    match value {
        Value::Array(items) => {
            out.push_str("[ ");
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(" ,\n ");
                }
                write_reordered(out, item);
            }
            out.push_str(" ]");
        }
        Value::Object(map) => {
            out.push_str("{\n  ");
            for (i, (key, item)) in map.iter().rev().enumerate() {
                if i > 0 {
                    out.push_str(",\n  ");
                }
                out.push_str(&Value::String(key.clone()).to_string());
                out.push_str(" : ");
                write_reordered(out, item);
            }
            out.push_str("\n}");
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}

/// Parameters for generating a signed envelope.
#[derive(Debug, Clone)]
pub struct EnvelopeParams {
    pub keypair: Keypair,
    pub kid: String,
    pub encoding: PayloadEncoding,
    pub iat: Option<i64>,
    pub set_iat: bool,
    /// Valid JSON text when `encoding` is `Jcs`, arbitrary bytes otherwise.
    pub payload: Vec<u8>,
}

impl Arbitrary for EnvelopeParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (
            any::<[u8; 32]>(), // seed
            kid(),
            payload_encoding(),
            any::<Option<i64>>(),
            any::<bool>(),
            payload(256),
            json_container(),
        )
            .prop_map(|(seed, kid, encoding, iat, set_iat, raw, json)| {
                let payload = match encoding {
                    PayloadEncoding::Raw => raw,
                    PayloadEncoding::Jcs => reordered_json_text(&json).into_bytes(),
                };
                EnvelopeParams {
                    keypair: Keypair::from_seed(&seed),
                    kid,
                    encoding,
                    iat,
                    set_iat,
                    payload,
                }
            })
            .boxed()
    }
}

/// The unsigned template described by the parameters.
pub fn template_from_params(params: &EnvelopeParams) -> Envelope {
    let mut env =
        Envelope::template(&params.kid, params.encoding).expect("generated kid is non-blank");
    env.iat = params.iat;
    env
}

/// Sign the template described by the parameters, with the fixed clock.
pub fn envelope_from_params(params: &EnvelopeParams) -> Envelope {
    Signer::with_clock(fixed_clock)
        .sign(
            &template_from_params(params),
            &params.payload,
            &params.keypair,
            params.set_iat,
        )
        .expect("generated envelope signs")
}
