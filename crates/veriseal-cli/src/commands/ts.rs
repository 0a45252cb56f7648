//! `veriseal ts`: timeseries session commands.

use crate::cli::{TsArgs, TsCommand};
use crate::io::{read_envelope, read_jsonl, write_envelope};
use crate::keys::load_public_key;
use crate::Outcome;
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info, warn};
use veriseal_core::{audit, audit_signed, check_link, new_session, next};

/// Result of `ts check` and `ts audit` in JSON mode.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct CheckReport {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
}

impl CheckReport {
    pub fn from_result(result: &veriseal_core::Result<()>) -> Self {
        match result {
            Ok(()) => Self {
                ok: true,
                error: None,
                kind: None,
                index: None,
            },
            Err(e) => Self {
                ok: false,
                error: Some(e.to_string()),
                kind: Some(e.kind().as_str()),
                index: e.chain_index(),
            },
        }
    }
}

pub fn run(args: TsArgs) -> Result<Outcome> {
    match args.command {
        TsCommand::Init(init) => {
            let env = new_session(&init.kid, init.payload_encoding)?;
            info!(
                kid = %env.kid,
                session = env.ts_session_id.as_deref().unwrap_or_default(),
                "started session"
            );
            write_envelope(init.output.as_deref(), &env)?;
            Ok(Outcome::Success)
        }
        TsCommand::Next { prev, output } => {
            let prev = read_envelope(&prev)?;
            if !prev.is_signed() {
                warn!("previous envelope is not signed");
            }
            let env = next(&prev).context("failed to build next envelope")?;
            debug!(ts_seq = ?env.ts_seq, ts_prev = ?env.ts_prev, "next template");
            write_envelope(output.as_deref(), &env)?;
            Ok(Outcome::Success)
        }
        TsCommand::Check { prev, curr, json } => {
            let prev = read_envelope(&prev)?;
            let curr = read_envelope(&curr)?;
            report(&check_link(&prev, &curr), json)
        }
        TsCommand::Audit {
            input,
            strict_start,
            pubkey,
            json,
        } => run_audit(&input, strict_start, pubkey.as_deref(), json),
    }
}

fn run_audit(input: &Path, strict_start: bool, pubkey: Option<&Path>, json: bool) -> Result<Outcome> {
    let envelopes = read_jsonl(input)?;
    let result = match pubkey {
        Some(path) => {
            let public_key = load_public_key(path)?;
            audit_signed(&envelopes, strict_start, &public_key)
        }
        None => audit(&envelopes, strict_start),
    };
    match &result {
        Ok(()) => info!(count = envelopes.len(), strict_start, "chain audit passed"),
        Err(e) => warn!(index = ?e.chain_index(), kind = %e.kind(), "chain audit failed"),
    }
    report(&result, json)
}

fn report(result: &veriseal_core::Result<()>, json: bool) -> Result<Outcome> {
    if json {
        println!("{}", serde_json::to_string(&CheckReport::from_result(result))?);
    } else {
        match result {
            Ok(()) => println!("OK"),
            Err(e) => println!("FAILED: {e}"),
        }
    }
    Ok(if result.is_ok() {
        Outcome::Success
    } else {
        Outcome::Failed
    })
}
