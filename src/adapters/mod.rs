//! Port implementations.
//!
//! * `live` talks to GitHub, the local disk and the `tar` tool.
//! * `recording` wraps live providers and captures every call in a cassette.
//! * `replaying` serves provider calls from a cassette without network access.

pub mod live;
pub mod recording;
pub mod replaying;
