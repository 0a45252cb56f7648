use crate::cli::VerifyArgs;
use crate::io::{read_envelope, read_input};
use crate::keys::load_public_key;
use crate::Outcome;
use anyhow::Result;
use serde::Serialize;
use std::fmt::Write as _;
use tracing::info;
use veriseal_core::{verify, verify_payload_hash};

/// Result of `veriseal verify`. The payload fields are present only when a
/// payload file was given.
#[derive(Debug, Default, Serialize, PartialEq, Eq)]
pub struct VerifyReport {
    pub signature_ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload_hash_ok: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload_error: Option<String>,
}

impl VerifyReport {
    pub fn ok(&self) -> bool {
        self.signature_ok && self.payload_hash_ok != Some(false)
    }

    pub fn to_human(&self) -> String {
        let mut out = String::new();
        if self.signature_ok {
            out.push_str("Verify signed: OK\n");
        } else {
            out.push_str("Verify signed: FAILED\n");
            if let Some(reason) = &self.signature_error {
                let _ = writeln!(out, "  reason: {reason}");
            }
        }
        match self.payload_hash_ok {
            Some(true) => out.push_str("Verify payload hash: OK\n"),
            Some(false) => {
                out.push_str("Verify payload hash: FAILED\n");
                if let Some(reason) = &self.payload_error {
                    let _ = writeln!(out, "  reason: {reason}");
                }
            }
            None => out.push_str("Verify payload hash: UNKNOWN (no --payload-file)\n"),
        }
        out
    }
}

pub fn run(args: VerifyArgs) -> Result<Outcome> {
    let public_key = load_public_key(&args.pubkey)?;
    let env = read_envelope(&args.input)?;

    let mut report = VerifyReport::default();
    match verify(&env, &public_key) {
        Ok(()) => report.signature_ok = true,
        Err(e) => report.signature_error = Some(e.to_string()),
    }

    if let Some(path) = &args.payload_file {
        let payload = read_input(Some(path))?;
        match verify_payload_hash(&env, &payload) {
            Ok(()) => report.payload_hash_ok = Some(true),
            Err(e) => {
                report.payload_hash_ok = Some(false);
                report.payload_error = Some(e.to_string());
            }
        }
    }

    info!(
        signature_ok = report.signature_ok,
        payload_hash_ok = ?report.payload_hash_ok,
        "verified envelope"
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report.to_human());
    }

    Ok(if report.ok() { Outcome::Success } else { Outcome::Failed })
}
