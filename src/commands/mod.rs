//! Command dispatch and handlers.

pub mod check;
pub mod fetch;
pub mod publish;

use std::io::{Read, Write};

use tokio::runtime::{Builder, Runtime};

use crate::cli::Command;
use crate::config::Settings;
use crate::context::ServiceContext;
use crate::error::ResourceError;
use crate::protocol::{parse_request, write_response, CheckRequest, FetchRequest, PublishRequest};

/// Dispatch a parsed command to its handler.
///
/// The request is read from `input` in full and validated before any port is
/// constructed. The response is written to `output` only on success.
///
/// # Errors
///
/// Returns [`ResourceError`] if the request is malformed, the context cannot
/// be built, or the action fails.
pub fn dispatch(
    command: &Command,
    settings: &Settings,
    input: &mut dyn Read,
    output: &mut dyn Write,
) -> Result<(), ResourceError> {
    let mut body = Vec::new();
    input.read_to_end(&mut body).map_err(ResourceError::ReadInput)?;

    match command {
        Command::Check => {
            let request: CheckRequest = parse_request(&body)?;
            let ctx = ServiceContext::from_settings(settings)?;
            let versions = runtime()?.block_on(check::run(&ctx, &request, settings.limits()))?;
            write_response(output, &versions)
        }
        Command::In { destination } => {
            let request: FetchRequest = parse_request(&body)?;
            let ctx = ServiceContext::from_settings(settings)?;
            let version = runtime()?.block_on(fetch::run(&ctx, &request, destination))?;
            write_response(output, &version)
        }
        Command::Out { .. } => {
            let request: PublishRequest = parse_request(&body)?;
            write_response(output, &publish::run(&request))
        }
    }
}

/// Single-threaded runtime; each invocation is one logical thread of control.
fn runtime() -> Result<Runtime, ResourceError> {
    Builder::new_current_thread().enable_all().build().map_err(ResourceError::Runtime)
}
