//! `in` action.

use std::path::Path;

use tracing::debug;

use crate::context::ServiceContext;
use crate::error::MaterializeError;
use crate::protocol::{FetchRequest, Version};

/// Execute the `in` action, materializing the requested version into
/// `destination`.
///
/// # Errors
///
/// Returns [`MaterializeError`] if any materialization step fails.
pub async fn run(
    ctx: &ServiceContext,
    request: &FetchRequest,
    destination: &Path,
) -> Result<Version, MaterializeError> {
    if let Some(params) = request.params.as_ref().filter(|p| !p.is_empty()) {
        debug!(?params, "ignoring step params");
    }
    ctx.materializer().materialize(&request.source, &request.version, destination).await
}
