//! Commit history port.

use serde::{Deserialize, Serialize};

use super::ProviderFuture;
use crate::protocol::SourceConfig;

/// One historical change entry as reported by a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRecord {
    /// Commit identifier, unique within the repository.
    #[serde(rename = "ref")]
    pub reference: String,
    /// Name of the committer.
    pub committer_name: String,
    /// Committer timestamp as RFC3339 text.
    pub committer_timestamp: String,
    /// Full commit message.
    pub message: String,
}

/// Lists the commits touching a path on the configured branch.
pub trait HistoryProvider: Send + Sync {
    /// Returns the commits touching `path`, in provider order.
    ///
    /// # Errors
    ///
    /// Returns a [`crate::error::ProviderError`] on network, auth,
    /// rate-limit or timeout failures, or when the response cannot be decoded.
    fn commits<'a>(
        &'a self,
        source: &'a SourceConfig,
        path: &'a str,
    ) -> ProviderFuture<'a, Vec<CommitRecord>>;
}
