//! Materialization for the `in` action.
//!
//! Reproduces one revision on disk: provenance files under
//! `<destination>/.git/`, then the revision's tree directly under
//! `<destination>`. Each step must succeed before the next begins.

use std::path::Path;

use tracing::{debug, info};

use crate::error::{MaterializeError, ProviderError};
use crate::ports::{ArchiveProvider, ArchiveUnpacker, CommitRecord, FileSystem};
use crate::protocol::{SourceConfig, Version};

/// Length of the abbreviated ref written to `short_ref`.
pub const SHORT_REF_LEN: usize = 7;

/// Directory under the destination holding the provenance files.
pub const METADATA_DIR: &str = ".git";

/// Leading components dropped from archive entries (the synthetic root).
const STRIP_COMPONENTS: usize = 1;

/// Downloads and unpacks revisions through the archive and unpacker ports.
pub struct Materializer<'a> {
    archives: &'a dyn ArchiveProvider,
    unpacker: &'a dyn ArchiveUnpacker,
    fs: &'a dyn FileSystem,
}

impl<'a> Materializer<'a> {
    /// Creates a materializer over the given ports.
    #[must_use]
    pub fn new(
        archives: &'a dyn ArchiveProvider,
        unpacker: &'a dyn ArchiveUnpacker,
        fs: &'a dyn FileSystem,
    ) -> Self {
        Self { archives, unpacker, fs }
    }

    /// Materializes `target` into `destination` and returns `target`.
    ///
    /// The archive is staged in a temporary file that is removed on every
    /// exit path. A failure part-way leaves `destination` partially written.
    ///
    /// # Errors
    ///
    /// Returns [`MaterializeError`] if the ref is too short, a provider call
    /// fails, a file cannot be written, or the archive cannot be unpacked.
    pub async fn materialize(
        &self,
        source: &SourceConfig,
        target: &Version,
        destination: &Path,
    ) -> Result<Version, MaterializeError> {
        let reference = target.reference.as_str();
        let short = short_ref(reference)?;

        let commit = self.archives.commit(source, reference).await.map_err(|source| {
            MaterializeError::MetadataFetchFailed { reference: reference.to_string(), source }
        })?;
        self.write_metadata(destination, reference, short, &commit)?;

        let mut archive = tempfile::Builder::new()
            .prefix("git-")
            .suffix(".tar.gz")
            .tempfile()
            .map_err(|e| MaterializeError::FilesystemError {
                path: std::env::temp_dir(),
                reason: format!("failed to create temporary archive: {e}"),
            })?;
        let archive_path = archive.path().to_path_buf();
        info!("Writing to archive: {}", archive_path.display());

        let bytes = self
            .archives
            .download_archive(source, reference, archive.as_file_mut())
            .await
            .map_err(|err| match err {
                ProviderError::Storage(reason) => {
                    MaterializeError::FilesystemError { path: archive_path.clone(), reason }
                }
                source => MaterializeError::ArchiveFetchFailed {
                    reference: reference.to_string(),
                    source,
                },
            })?;
        debug!(bytes, "archive downloaded");

        self.unpacker.unpack(&archive_path, destination, STRIP_COMPONENTS).map_err(|e| {
            MaterializeError::UnpackFailed {
                reference: reference.to_string(),
                reason: e.to_string(),
            }
        })?;

        info!(
            reference,
            destination = %destination.display(),
            author = %commit.committer_name,
            "fetched revision"
        );
        Ok(target.clone())
    }

    fn write_metadata(
        &self,
        destination: &Path,
        reference: &str,
        short: &str,
        commit: &CommitRecord,
    ) -> Result<(), MaterializeError> {
        let dir = destination.join(METADATA_DIR);
        self.fs.create_dir_all(&dir).map_err(|e| MaterializeError::FilesystemError {
            path: dir.clone(),
            reason: e.to_string(),
        })?;

        let files = [
            ("committer", commit.committer_name.as_str()),
            ("ref", reference),
            ("short_ref", short),
            ("commit_message", commit.message.as_str()),
            ("commit_timestamp", commit.committer_timestamp.as_str()),
        ];
        for (name, contents) in files {
            let path = dir.join(name);
            self.fs.write(&path, contents).map_err(|e| MaterializeError::FilesystemError {
                reason: format!("failed to write {name} file: {e}"),
                path,
            })?;
        }
        Ok(())
    }
}

/// Returns the first [`SHORT_REF_LEN`] characters of `reference`.
///
/// # Errors
///
/// Returns [`MaterializeError::MalformedRef`] if `reference` is shorter.
pub fn short_ref(reference: &str) -> Result<&str, MaterializeError> {
    match reference.char_indices().nth(SHORT_REF_LEN) {
        Some((end, _)) => Ok(&reference[..end]),
        None if reference.chars().count() == SHORT_REF_LEN => Ok(reference),
        None => Err(MaterializeError::MalformedRef {
            reference: reference.to_string(),
            min_len: SHORT_REF_LEN,
        }),
    }
}
