//! Core library for the `stagger` CLI.
//!
//! `stagger` turns a feature specification into dependency-ordered tracker
//! issues and hands them to an automated agent one at a time: a task gets
//! the trigger label only once its dependencies are closed and nothing else
//! is in flight. Every side effect goes through a port in [`ports`], so runs
//! can be recorded to cassettes and replayed offline.

pub mod adapters;
pub mod cassette;
pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod error;
pub mod logging;
pub mod plan;
pub mod ports;
pub mod rollout;
pub mod sequence;
pub mod store;
pub mod validate;

#[cfg(test)]
pub(crate) mod test_support;

use clap::error::ErrorKind;
use clap::Parser;

/// Run the CLI with the provided arguments.
///
/// Returns `Ok(false)` when the command completed with a negative verdict.
/// `--help` and `--version` print their text and return `Ok(true)`.
///
/// # Errors
///
/// Returns an error string when argument parsing fails or command execution fails.
pub fn run<I, T>(args: I) -> Result<bool, String>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = match cli::Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            print!("{err}");
            return Ok(true);
        }
        Err(err) => return Err(err.to_string()),
    };
    commands::dispatch(&cli.command)
}
