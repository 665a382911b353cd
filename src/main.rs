//! Binary entrypoint for the `github-path-resource` CLI.

use std::process::ExitCode;

use github_path_resource::config::{DEFAULT_LOG_FILTER, LOG_ENV};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    // stdout carries the JSON response; everything else goes to stderr.
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .without_time()
        .init();

    let mut stdin = std::io::stdin().lock();
    let mut stdout = std::io::stdout().lock();
    match github_path_resource::run(std::env::args_os(), &mut stdin, &mut stdout) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
