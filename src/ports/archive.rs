//! Revision archive port.

use std::fs::File;

use super::history::CommitRecord;
use super::ProviderFuture;
use crate::protocol::SourceConfig;

/// Supplies single-revision metadata and full-tree snapshots.
pub trait ArchiveProvider: Send + Sync {
    /// Returns the metadata of one revision.
    ///
    /// # Errors
    ///
    /// Returns a [`crate::error::ProviderError`] if the revision cannot be
    /// fetched or decoded.
    fn commit<'a>(
        &'a self,
        source: &'a SourceConfig,
        reference: &'a str,
    ) -> ProviderFuture<'a, CommitRecord>;

    /// Streams the gzipped tarball of `reference` into `destination` and
    /// returns the number of bytes written.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::ProviderError::Storage`] if writing to
    /// `destination` fails, and another variant if the download fails.
    fn download_archive<'a>(
        &'a self,
        source: &'a SourceConfig,
        reference: &'a str,
        destination: &'a mut File,
    ) -> ProviderFuture<'a, u64>;
}
