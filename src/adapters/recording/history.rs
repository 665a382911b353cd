//! Recording adapter for the `HistoryProvider` port.

use std::sync::{Arc, Mutex};

use super::record_result;
use crate::cassette::{commits_input, CassetteRecorder, COMMITS, HISTORY_PORT};
use crate::ports::{CommitRecord, HistoryProvider, ProviderFuture};
use crate::protocol::SourceConfig;

/// Records history lookups while delegating to an inner implementation.
pub struct RecordingHistoryProvider {
    inner: Box<dyn HistoryProvider>,
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingHistoryProvider {
    /// Creates a recording history provider wrapping `inner`.
    pub fn new(inner: Box<dyn HistoryProvider>, recorder: Arc<Mutex<CassetteRecorder>>) -> Self {
        Self { inner, recorder }
    }
}

impl HistoryProvider for RecordingHistoryProvider {
    fn commits<'a>(
        &'a self,
        source: &'a SourceConfig,
        path: &'a str,
    ) -> ProviderFuture<'a, Vec<CommitRecord>> {
        Box::pin(async move {
            let result = self.inner.commits(source, path).await;
            let input = commits_input(source, path);
            record_result(&self.recorder, HISTORY_PORT, COMMITS, input, &result);
            result
        })
    }
}
