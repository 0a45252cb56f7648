//! Subcommand implementations.

pub mod canon;
pub mod init;
pub mod sign;
pub mod ts;
pub mod verify;
