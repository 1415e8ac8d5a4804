//! Binary entrypoint for the `stagger` CLI.

use std::process::ExitCode;

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    stagger::logging::init();

    // Recording and replay are selected in commands::dispatch via
    // STAGGER_RECORD=<dir> and STAGGER_REPLAY=<dir>.
    match stagger::run(std::env::args()) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
