use crate::cli::SignArgs;
use crate::io::{read_envelope, read_input, write_envelope};
use crate::keys::load_keypair;
use crate::Outcome;
use anyhow::{Context, Result};
use tracing::{info, warn};
use veriseal_core::{Envelope, Signer};

pub fn run(args: SignArgs) -> Result<Outcome> {
    let keypair = load_keypair(&args.privkey)?;
    let env = read_envelope(&args.input)?;
    let payload = read_input(Some(&args.payload_file))?;

    let signed = Signer::new()
        .sign(&env, &payload, &keypair, args.set_iat)
        .context("failed to sign envelope")?;

    if let Some((old, new)) = overwritten_iat(&env, &signed, args.set_iat) {
        warn!(old, new, "iat overwritten");
    }
    info!(
        kid = %signed.kid,
        payload_hash = signed.payload_hash.as_deref().unwrap_or_default(),
        ts_seq = ?signed.ts_seq,
        "signed envelope"
    );

    write_envelope(args.output.as_deref(), &signed)?;
    Ok(Outcome::Success)
}

/// The discarded and new `iat` when `--set-iat` replaced an existing value,
/// even if the two are equal.
fn overwritten_iat(input: &Envelope, signed: &Envelope, set_iat: bool) -> Option<(i64, i64)> {
    if !set_iat {
        return None;
    }
    Some((input.iat?, signed.iat?))
}
