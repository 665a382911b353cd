//! Replaying adapter for the `HistoryProvider` port.

use std::sync::{Arc, Mutex};

use super::replay;
use crate::cassette::{commits_input, CassetteReplayer, COMMITS, HISTORY_PORT};
use crate::ports::{CommitRecord, HistoryProvider, ProviderFuture};
use crate::protocol::SourceConfig;

/// Serves recorded commit histories from a cassette.
pub struct ReplayingHistoryProvider {
    replayer: Arc<Mutex<CassetteReplayer>>,
}

impl ReplayingHistoryProvider {
    /// Create a replaying history provider backed by the given replayer.
    #[must_use]
    pub fn new(replayer: Arc<Mutex<CassetteReplayer>>) -> Self {
        Self { replayer }
    }
}

impl HistoryProvider for ReplayingHistoryProvider {
    fn commits<'a>(
        &'a self,
        source: &'a SourceConfig,
        path: &'a str,
    ) -> ProviderFuture<'a, Vec<CommitRecord>> {
        let result = replay(&self.replayer, HISTORY_PORT, COMMITS, &commits_input(source, path));
        Box::pin(async move { result })
    }
}
