//! Cassettes: recorded port traffic for deterministic replay.
//!
//! A session run with `STAGGER_RECORD=<dir>` writes one cassette per port;
//! `STAGGER_REPLAY=<dir>` serves those cassettes back in call order.

pub mod config;
pub mod format;
pub mod recorder;
pub mod replayer;
pub mod session;
