//! `check` action.

use tracing::info;

use crate::context::ServiceContext;
use crate::error::ResolveError;
use crate::protocol::{CheckRequest, Version};
use crate::resolve::{resolve, ResolveLimits};

/// Execute the `check` action.
///
/// Returns the versions newer than the request's version, newest first.
///
/// # Errors
///
/// Returns [`ResolveError`] if the histories cannot be fetched or merged.
pub async fn run(
    ctx: &ServiceContext,
    request: &CheckRequest,
    limits: ResolveLimits,
) -> Result<Vec<Version>, ResolveError> {
    let source = &request.source;
    info!(
        repository = %source.repository,
        branch = %source.branch,
        paths = ?source.paths,
        "checking for new versions"
    );
    resolve(ctx.history.as_ref(), source, request.version.as_ref(), limits).await
}
