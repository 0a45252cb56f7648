use crate::cli::CanonArgs;
use crate::io::{read_input, write_output};
use crate::Outcome;
use anyhow::{Context, Result};
use veriseal_core::canonicalize;

/// Canonicalize the input. A newline is appended only on stdout, so a file
/// output holds exactly the canonical bytes.
pub fn run(args: CanonArgs) -> Result<Outcome> {
    let input = read_input(args.input.as_deref())?;
    let mut out = canonicalize(&input).context("failed to canonicalize input")?;
    if args.output.is_none() {
        out.push(b'\n');
    }
    write_output(args.output.as_deref(), &out)?;
    Ok(Outcome::Success)
}
