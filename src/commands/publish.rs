//! `out` action.

use tracing::info;

use crate::protocol::{PublishRequest, Version};

/// Execute the `out` action. Nothing is published; the request's version is
/// echoed back unchanged.
#[must_use]
pub fn run(request: &PublishRequest) -> Option<&Version> {
    info!(repository = %request.source.repository, "publishing is not supported; echoing version");
    request.version.as_ref()
}
