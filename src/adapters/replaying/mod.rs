//! Replaying adapters that serve recorded interactions.

pub mod archive;
pub mod history;

use std::sync::Mutex;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::cassette::CassetteReplayer;
use crate::error::ProviderError;

pub use archive::ReplayingArchiveProvider;
pub use history::ReplayingHistoryProvider;

/// Serve the recorded `Result<T, ProviderError>` for `port::method(input)`.
///
/// A missing or undecodable interaction is reported as
/// [`ProviderError::Malformed`] so it surfaces through the normal error path.
pub(crate) fn replay<T: DeserializeOwned>(
    replayer: &Mutex<CassetteReplayer>,
    port: &str,
    method: &str,
    input: &Value,
) -> Result<T, ProviderError> {
    let interaction = replayer
        .lock()
        .map_err(|_| ProviderError::Malformed("cassette replayer lock poisoned".into()))?
        .take(port, method, input)
        .map_err(ProviderError::Malformed)?;
    serde_json::from_value::<Result<T, ProviderError>>(interaction.output).map_err(|e| {
        ProviderError::Malformed(format!(
            "cassette interaction {} ({port}::{method}) has an invalid output: {e}",
            interaction.seq
        ))
    })?
}
