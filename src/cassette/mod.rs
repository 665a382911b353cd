//! Cassettes: YAML recordings of provider interactions.
//!
//! A cassette captured with `RESOURCE_RECORD` can be served back with
//! `RESOURCE_REPLAY`, which runs `check` and `in` without network access.
//! Credentials are never part of a recorded input.

pub mod format;
pub mod recorder;
pub mod replayer;

use serde_json::{json, Value};

use crate::protocol::SourceConfig;

pub use format::{ArchivePayload, Cassette, Interaction};
pub use recorder::CassetteRecorder;
pub use replayer::CassetteReplayer;

/// Port name of the history provider.
pub const HISTORY_PORT: &str = "history";
/// Port name of the archive provider.
pub const ARCHIVE_PORT: &str = "archive";
/// History method listing the commits of a path.
pub const COMMITS: &str = "commits";
/// Archive method fetching single-revision metadata.
pub const COMMIT: &str = "commit";
/// Archive method downloading a tarball.
pub const DOWNLOAD_ARCHIVE: &str = "download_archive";

/// Recorded input of a [`COMMITS`] call.
#[must_use]
pub fn commits_input(source: &SourceConfig, path: &str) -> Value {
    json!({
        "repository": source.repository.to_string(),
        "branch": source.branch,
        "path": path,
    })
}

/// Recorded input of a [`COMMIT`] or [`DOWNLOAD_ARCHIVE`] call.
#[must_use]
pub fn revision_input(source: &SourceConfig, reference: &str) -> Value {
    json!({
        "repository": source.repository.to_string(),
        "ref": reference,
    })
}
