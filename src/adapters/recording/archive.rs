//! Recording adapter for the `ArchiveProvider` port.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::sync::{Arc, Mutex};

use super::record_result;
use crate::cassette::{
    revision_input, ArchivePayload, CassetteRecorder, ARCHIVE_PORT, COMMIT, DOWNLOAD_ARCHIVE,
};
use crate::error::ProviderError;
use crate::ports::{ArchiveProvider, CommitRecord, ProviderFuture};
use crate::protocol::SourceConfig;

/// Records archive lookups while delegating to an inner implementation.
///
/// Downloaded tarballs are read back from the destination file and stored
/// base64-encoded, so the cassette alone can reproduce the download.
pub struct RecordingArchiveProvider {
    inner: Box<dyn ArchiveProvider>,
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingArchiveProvider {
    /// Creates a recording archive provider wrapping `inner`.
    pub fn new(inner: Box<dyn ArchiveProvider>, recorder: Arc<Mutex<CassetteRecorder>>) -> Self {
        Self { inner, recorder }
    }
}

/// Reads back the `written` bytes that end at the current position of `file`.
fn read_back(file: &mut File, written: u64) -> Result<Vec<u8>, ProviderError> {
    let storage =
        |e: std::io::Error| ProviderError::Storage(format!("failed to read archive back: {e}"));
    let end = file.stream_position().map_err(storage)?;
    let start = end.saturating_sub(written);
    file.seek(SeekFrom::Start(start)).map_err(storage)?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(storage)?;
    Ok(bytes)
}

impl ArchiveProvider for RecordingArchiveProvider {
    fn commit<'a>(
        &'a self,
        source: &'a SourceConfig,
        reference: &'a str,
    ) -> ProviderFuture<'a, CommitRecord> {
        Box::pin(async move {
            let result = self.inner.commit(source, reference).await;
            let input = revision_input(source, reference);
            record_result(&self.recorder, ARCHIVE_PORT, COMMIT, input, &result);
            result
        })
    }

    fn download_archive<'a>(
        &'a self,
        source: &'a SourceConfig,
        reference: &'a str,
        destination: &'a mut File,
    ) -> ProviderFuture<'a, u64> {
        Box::pin(async move {
            let result = self.inner.download_archive(source, reference, destination).await;
            let recorded = match &result {
                Ok(written) => read_back(destination, *written).map(|b| ArchivePayload::encode(&b)),
                Err(e) => Err(e.clone()),
            };
            record_result(
                &self.recorder,
                ARCHIVE_PORT,
                DOWNLOAD_ARCHIVE,
                revision_input(source, reference),
                &recorded,
            );
            let written = result?;
            recorded?;
            Ok(written)
        })
    }
}
