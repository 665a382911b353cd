//! Error types for the resource actions.
//!
//! Provider ports report [`ProviderError`]; the resolver and materializer
//! translate those into their own taxonomies. [`ResourceError`] is what
//! [`crate::run`] returns and is the only error `main` turns into an exit code.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure reported by a history or archive provider.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum ProviderError {
    /// The provider could not be reached or refused the request
    /// (network, auth, rate limit, timeout, non-success status).
    #[error("provider unavailable: {0}")]
    Unavailable(String),
    /// The provider answered with data that could not be decoded.
    #[error("malformed provider response: {0}")]
    Malformed(String),
    /// Provider data could not be stored locally.
    #[error("failed to store provider data: {0}")]
    Storage(String),
}

/// Errors produced while resolving new versions.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// Commit history for a path could not be fetched.
    #[error("error fetching commits for path {path:?}: {reason}")]
    ProviderUnavailable {
        /// Tracked path whose history was requested.
        path: String,
        /// Provider diagnostic.
        reason: String,
    },

    /// A commit timestamp is not a valid RFC3339 instant.
    #[error("error parsing commit date {value:?} of {reference}: {reason}")]
    MalformedTimestamp {
        /// Commit whose timestamp failed to parse.
        reference: String,
        /// The offending timestamp text.
        value: String,
        /// Parser diagnostic.
        reason: String,
    },

    /// The provider returned history that violates the data contract.
    #[error("malformed commit history for path {path:?}: {reason}")]
    MalformedResponse {
        /// Tracked path whose history was malformed.
        path: String,
        /// What was wrong with it.
        reason: String,
    },
}

impl ResolveError {
    /// Maps a provider failure for `path` into the resolver taxonomy.
    #[must_use]
    pub fn from_provider(path: &str, err: ProviderError) -> Self {
        match err {
            ProviderError::Malformed(reason) => {
                Self::MalformedResponse { path: path.to_string(), reason }
            }
            ProviderError::Unavailable(reason) | ProviderError::Storage(reason) => {
                Self::ProviderUnavailable { path: path.to_string(), reason }
            }
        }
    }

    /// Returns `true` when retrying the whole invocation may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ProviderUnavailable { .. })
    }
}

/// Errors produced while materializing a revision on disk.
#[derive(Debug, Error)]
pub enum MaterializeError {
    /// Single-revision metadata could not be fetched.
    #[error("failed to fetch commit metadata for {reference}: {source}")]
    MetadataFetchFailed {
        /// Requested revision.
        reference: String,
        /// Provider failure.
        source: ProviderError,
    },

    /// The revision archive could not be downloaded.
    #[error("failed to download archive for {reference}: {source}")]
    ArchiveFetchFailed {
        /// Requested revision.
        reference: String,
        /// Provider failure.
        source: ProviderError,
    },

    /// The downloaded archive could not be extracted.
    #[error("failed to unpack archive for {reference}: {reason}")]
    UnpackFailed {
        /// Requested revision.
        reference: String,
        /// Unpacker diagnostic.
        reason: String,
    },

    /// The ref is too short to derive a short ref from.
    #[error("ref {reference:?} is shorter than {min_len} characters")]
    MalformedRef {
        /// The offending ref.
        reference: String,
        /// Required minimum length.
        min_len: usize,
    },

    /// A destination path could not be created or written.
    #[error("filesystem error at {}: {reason}", .path.display())]
    FilesystemError {
        /// Path being created or written.
        path: PathBuf,
        /// Underlying diagnostic.
        reason: String,
    },
}

impl MaterializeError {
    /// Returns `true` when retrying the whole invocation may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::MetadataFetchFailed { source, .. } | Self::ArchiveFetchFailed { source, .. } => {
                matches!(source, ProviderError::Unavailable(_))
            }
            Self::UnpackFailed { .. }
            | Self::MalformedRef { .. }
            | Self::FilesystemError { .. } => false,
        }
    }
}

/// A request on stdin that does not match the protocol.
#[derive(Debug, Error)]
pub enum RequestError {
    /// Unknown or missing fields, bad JSON, or values that fail validation.
    #[error("malformed request: {0}")]
    Malformed(String),
}

/// Top-level error returned by [`crate::run`].
#[derive(Debug, Error)]
pub enum ResourceError {
    /// Command-line arguments were rejected.
    #[error("{0}")]
    Usage(String),

    /// Environment configuration is invalid.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The request could not be read from stdin.
    #[error("failed to read from stdin: {0}")]
    ReadInput(#[source] std::io::Error),

    /// The response could not be written to stdout.
    #[error("failed to write response: {0}")]
    WriteOutput(#[source] std::io::Error),

    /// The async runtime could not be started.
    #[error("failed to start runtime: {0}")]
    Runtime(#[source] std::io::Error),

    /// A port adapter could not be constructed.
    #[error("failed to initialise {port}: {reason}")]
    Setup {
        /// Port being constructed.
        port: &'static str,
        /// Underlying diagnostic.
        reason: String,
    },

    /// Malformed request.
    #[error(transparent)]
    Request(#[from] RequestError),

    /// Version resolution failed.
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// Materialization failed.
    #[error(transparent)]
    Materialize(#[from] MaterializeError),
}
