//! Diagnostic tracing on stderr.
//!
//! Command output (plans, status tables, verdicts) goes to stdout through
//! `println!` and is unaffected by the filter set here.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Installs the global subscriber.
///
/// The filter comes from `STAGGER_LOG`, then `RUST_LOG`, and defaults to
/// `warn`. Calling this twice is harmless; the second call is ignored.
///
/// ```bash
/// STAGGER_LOG=stagger=debug stagger plan feature.md --dry-run
/// ```
pub fn init() {
    let filter = EnvFilter::try_from_env("STAGGER_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .try_init();
}
