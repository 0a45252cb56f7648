//! Command-line arguments.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use veriseal_core::PayloadEncoding;

/// Sign and verify JSON envelopes, and build and audit hash-chained
/// timeseries sessions.
#[derive(Parser, Debug)]
#[command(name = "veriseal", version)]
pub struct Cli {
    /// Log at debug level (overridden by VERISEAL_LOG).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print an unsigned envelope template.
    Init(InitArgs),
    /// Hash a payload and sign an envelope.
    Sign(SignArgs),
    /// Verify an envelope's signature and, optionally, its payload hash.
    Verify(VerifyArgs),
    /// Canonicalize a JSON document.
    Canon(CanonArgs),
    /// Timeseries session commands.
    Ts(TsArgs),
}

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Key id.
    #[arg(long)]
    pub kid: String,

    /// Payload encoding: jcs or raw.
    #[arg(long, default_value = "jcs", value_parser = parse_encoding)]
    pub payload_encoding: PayloadEncoding,

    /// Output file path (default: stdout).
    #[arg(long)]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct SignArgs {
    /// Ed25519 private key: PKCS#8 PEM, base64, or raw bytes.
    #[arg(long)]
    pub privkey: PathBuf,

    /// Envelope JSON file (`-` for stdin).
    #[arg(long)]
    pub input: PathBuf,

    /// Payload file.
    #[arg(long)]
    pub payload_file: PathBuf,

    /// Set iat to the current time, overwriting any existing value.
    #[arg(long)]
    pub set_iat: bool,

    /// Output file path (default: stdout).
    #[arg(long)]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Ed25519 public key: SPKI PEM, base64, or raw bytes.
    #[arg(long)]
    pub pubkey: PathBuf,

    /// Signed envelope JSON file (`-` for stdin).
    #[arg(long)]
    pub input: PathBuf,

    /// Payload file; enables the payload hash check.
    #[arg(long)]
    pub payload_file: Option<PathBuf>,

    /// Print the result as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct CanonArgs {
    /// Input file path (default: stdin).
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Output file path (default: stdout).
    #[arg(long)]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct TsArgs {
    #[command(subcommand)]
    pub command: TsCommand,
}

#[derive(Subcommand, Debug)]
pub enum TsCommand {
    /// Print the first template of a new session.
    Init(InitArgs),
    /// Print the template that follows a signed envelope.
    Next {
        /// Previous envelope JSON file (`-` for stdin).
        #[arg(long)]
        prev: PathBuf,

        /// Output file path (default: stdout).
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Check that one envelope directly follows another.
    Check {
        /// Previous envelope JSON file.
        #[arg(long)]
        prev: PathBuf,

        /// Current envelope JSON file.
        #[arg(long)]
        curr: PathBuf,

        /// Print the result as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Audit a chain of envelopes, one JSON object per line.
    Audit {
        /// JSONL file (`-` for stdin).
        #[arg(long)]
        input: PathBuf,

        /// Require ts_seq=0 and no ts_prev on the first line.
        #[arg(long)]
        strict_start: bool,

        /// Also verify every signature against this public key.
        #[arg(long)]
        pubkey: Option<PathBuf>,

        /// Print the result as JSON.
        #[arg(long)]
        json: bool,
    },
}

fn parse_encoding(s: &str) -> Result<PayloadEncoding, String> {
    PayloadEncoding::parse(s).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_ts_audit() {
        let cli = Cli::try_parse_from([
            "veriseal",
            "ts",
            "audit",
            "--input",
            "-",
            "--strict-start",
            "--json",
        ])
        .unwrap();
        match cli.command {
            Command::Ts(TsArgs {
                command:
                    TsCommand::Audit {
                        input,
                        strict_start,
                        pubkey,
                        json,
                    },
            }) => {
                assert_eq!(input, PathBuf::from("-"));
                assert!(strict_start);
                assert!(pubkey.is_none());
                assert!(json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_encoding_flag_rejects_legacy_casing() {
        let err = Cli::try_parse_from([
            "veriseal",
            "init",
            "--kid",
            "k",
            "--payload-encoding",
            "JCS",
        ])
        .unwrap_err();
        assert!(err.to_string().contains("unsupported payload_encoding"));
    }

    #[test]
    fn test_init_defaults_to_jcs() {
        let cli = Cli::try_parse_from(["veriseal", "init", "--kid", "k"]).unwrap();
        match cli.command {
            Command::Init(args) => assert_eq!(args.payload_encoding, PayloadEncoding::Jcs),
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
