//! # Veriseal CLI
//!
//! The `veriseal` command: envelope templates, signing, verification,
//! canonicalization, and timeseries chain tooling over files and stdio.
//!
//! Core logic lives in `veriseal-core`; this crate only does I/O, key
//! loading, logging and reporting.

pub mod cli;
pub mod commands;
pub mod io;
pub mod keys;
pub mod logging;

use anyhow::Result;
use cli::{Cli, Command};

/// How a command finished when it did not hit an operational error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    /// A verification or audit check failed; the report has been printed.
    Failed,
}

/// Run a parsed command line.
pub fn run(cli: Cli) -> Result<Outcome> {
    match cli.command {
        Command::Init(args) => commands::init::run(args),
        Command::Sign(args) => commands::sign::run(args),
        Command::Verify(args) => commands::verify::run(args),
        Command::Canon(args) => commands::canon::run(args),
        Command::Ts(args) => commands::ts::run(args),
    }
}
