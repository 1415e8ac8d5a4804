//! Command dispatch and handlers.

pub mod advance;
pub mod plan;
pub mod status;
pub mod validate;

use std::env;
use std::future::Future;
use std::path::PathBuf;

use crate::cassette::config::CassetteConfig;
use crate::cassette::session::RecordingSession;
use crate::cli::Command;
use crate::config::{config_path, Config};
use crate::context::ServiceContext;

/// Dispatch a parsed command to its handler.
///
/// `STAGGER_RECORD=<dir>` records every port interaction to per-port
/// cassettes in `dir`. `STAGGER_REPLAY=<dir>` replays the cassettes found in
/// `dir` and keeps live adapters for the other ports.
///
/// Returns `false` when the command ran but its verdict is negative
/// (`validate` on anything but a pass).
///
/// # Errors
///
/// Returns an error string if the context cannot be built or the handler fails.
pub fn dispatch(command: &Command) -> Result<bool, String> {
    if let Some(dir) = env_dir("STAGGER_RECORD") {
        let (ctx, session) = ServiceContext::recording_at(dir)?;
        let result = dispatch_with_context(command, &ctx);
        // Adapters hold the recorders; drop them before writing cassettes.
        drop(ctx);
        finish_recording(session)?;
        return result;
    }

    let ctx = match env_dir("STAGGER_REPLAY") {
        Some(dir) => {
            let config = CassetteConfig::from_dir(&dir);
            if config.is_empty() {
                return Err(format!("No cassettes found in {}", dir.display()));
            }
            ServiceContext::live().with_replayed(&config)?
        }
        None => ServiceContext::live(),
    };
    dispatch_with_context(command, &ctx)
}

/// Dispatch a command with the given service context.
///
/// # Errors
///
/// Returns an error string if configuration cannot be loaded or the handler fails.
pub fn dispatch_with_context(command: &Command, ctx: &ServiceContext) -> Result<bool, String> {
    let config = Config::load(ctx.fs.as_ref(), &config_path())?;
    match command {
        Command::Plan(args) => {
            plan::run(ctx, &config, args, &mut std::io::stdin().lock()).map(|()| true)
        }
        Command::Advance => advance::run(ctx, &config).map(|()| true),
        Command::Status => status::run(ctx, &config).map(|()| true),
        Command::Validate { issue } => validate::run(ctx, &config, *issue),
    }
}

fn env_dir(key: &str) -> Option<PathBuf> {
    env::var_os(key).filter(|v| !v.is_empty()).map(PathBuf::from)
}

/// Finish a recording session and print the output directory.
fn finish_recording(session: RecordingSession) -> Result<(), String> {
    let output_dir = session.finish()?;
    eprintln!("Recording saved to: {}", output_dir.display());
    Ok(())
}

/// Runs a port future to completion on a current-thread runtime.
pub(crate) fn block_on<F: Future>(future: F) -> Result<F::Output, String> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("Failed to start async runtime: {e}"))?;
    Ok(runtime.block_on(future))
}
