use crate::cli::InitArgs;
use crate::io::write_envelope;
use crate::Outcome;
use anyhow::Result;
use tracing::info;
use veriseal_core::Envelope;

pub fn run(args: InitArgs) -> Result<Outcome> {
    let env = Envelope::template(&args.kid, args.payload_encoding)?;
    info!(kid = %env.kid, encoding = %args.payload_encoding, "created template");
    write_envelope(args.output.as_deref(), &env)?;
    Ok(Outcome::Success)
}
