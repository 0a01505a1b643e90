//! Subcommand handlers
//!
//! Each handler resolves user-facing defaults, calls the engine with fully
//! specified arguments and prints the outcome.

pub mod create;
pub mod init;
pub mod list;
pub mod open;
pub mod reset;
