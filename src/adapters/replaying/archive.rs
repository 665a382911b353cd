//! Replaying adapter for the `ArchiveProvider` port.

use std::fs::File;
use std::io::Write;
use std::sync::{Arc, Mutex};

use super::replay;
use crate::cassette::{
    revision_input, ArchivePayload, CassetteReplayer, ARCHIVE_PORT, COMMIT, DOWNLOAD_ARCHIVE,
};
use crate::error::ProviderError;
use crate::ports::{ArchiveProvider, CommitRecord, ProviderFuture};
use crate::protocol::SourceConfig;

/// Serves recorded revision metadata and tarballs from a cassette.
pub struct ReplayingArchiveProvider {
    replayer: Arc<Mutex<CassetteReplayer>>,
}

impl ReplayingArchiveProvider {
    /// Create a replaying archive provider backed by the given replayer.
    #[must_use]
    pub fn new(replayer: Arc<Mutex<CassetteReplayer>>) -> Self {
        Self { replayer }
    }
}

impl ArchiveProvider for ReplayingArchiveProvider {
    fn commit<'a>(
        &'a self,
        source: &'a SourceConfig,
        reference: &'a str,
    ) -> ProviderFuture<'a, CommitRecord> {
        let input = revision_input(source, reference);
        let result = replay(&self.replayer, ARCHIVE_PORT, COMMIT, &input);
        Box::pin(async move { result })
    }

    fn download_archive<'a>(
        &'a self,
        source: &'a SourceConfig,
        reference: &'a str,
        destination: &'a mut File,
    ) -> ProviderFuture<'a, u64> {
        let payload: Result<ArchivePayload, ProviderError> = replay(
            &self.replayer,
            ARCHIVE_PORT,
            DOWNLOAD_ARCHIVE,
            &revision_input(source, reference),
        );
        Box::pin(async move {
            let bytes = payload?
                .decode()
                .map_err(|e| {
                    ProviderError::Malformed(format!("recorded archive is not base64: {e}"))
                })?;
            destination
                .write_all(&bytes)
                .and_then(|()| destination.flush())
                .map_err(|e| ProviderError::Storage(format!("failed to write archive: {e}")))?;
            Ok(bytes.len() as u64)
        })
    }
}
