//! Recording adapters that capture interactions to cassettes.

pub mod archive;
pub mod history;

use std::sync::{Arc, Mutex};

use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::cassette::CassetteRecorder;
use crate::error::ProviderError;

pub use archive::RecordingArchiveProvider;
pub use history::RecordingHistoryProvider;

/// Record a `Result<T, ProviderError>` using the Ok/Err JSON convention.
///
/// Recording never changes the outcome of the wrapped call: a poisoned lock
/// or an unserializable value is logged and the interaction is skipped.
pub(crate) fn record_result<T: Serialize>(
    recorder: &Arc<Mutex<CassetteRecorder>>,
    port: &str,
    method: &str,
    input: Value,
    result: &Result<T, ProviderError>,
) {
    let Ok(mut guard) = recorder.lock() else {
        warn!(port, method, "cassette recorder lock poisoned; interaction not recorded");
        return;
    };
    if let Err(e) = guard.record_result(port, method, input, result) {
        warn!(port, method, error = %e, "failed to serialize interaction; not recorded");
    }
}
