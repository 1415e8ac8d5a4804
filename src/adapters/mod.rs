//! Port implementations.
//!
//! - `live`: real clock, disk, UUIDs, Anthropic API, and the `gh` CLI.
//! - `recording`: wraps a live adapter and writes each call to a cassette.
//! - `replaying`: serves cassette outputs without touching the outside world.

pub mod live;
pub mod recording;
pub mod replaying;
