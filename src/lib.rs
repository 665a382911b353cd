//! Pipeline resource that tracks paths of a GitHub repository.
//!
//! `check` lists the commits touching the configured paths that are newer
//! than the last seen version, `in` reproduces one commit's tree and
//! provenance files on disk, and `out` echoes the version back.

pub mod adapters;
pub mod cassette;
pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod error;
pub mod materialize;
pub mod ports;
pub mod protocol;
pub mod resolve;

#[cfg(test)]
pub(crate) mod test_support;

use std::ffi::OsString;
use std::io::{Read, Write};

use clap::error::ErrorKind;
use clap::Parser;

use crate::config::Settings;
use crate::error::ResourceError;

/// Run the CLI with the provided arguments, request stream, and response
/// stream.
///
/// `--help` and `--version` output is written to `output`.
///
/// # Errors
///
/// Returns [`ResourceError`] when argument parsing, configuration, or the
/// selected action fails.
pub fn run<I, T>(
    args: I,
    input: &mut dyn Read,
    output: &mut dyn Write,
) -> Result<(), ResourceError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let cli = match cli::Cli::try_parse_from(cli::normalize_args(args)) {
        Ok(cli) => cli,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            return write!(output, "{err}").map_err(ResourceError::WriteOutput);
        }
        Err(err) => return Err(ResourceError::Usage(err.to_string().trim_end().to_string())),
    };
    let settings = Settings::from_env().map_err(ResourceError::Config)?;
    commands::dispatch(&cli.command, &settings, input, output)
}

#[cfg(test)]
mod tests {
    use super::run;
    use crate::error::ResourceError;

    #[test]
    fn run_echoes_version_for_out() {
        let body = serde_json::json!({
            "source": {
                "repo": {"owner": "acme", "name": "widgets"},
                "branch": "main",
                "paths": ["docs"],
                "auth-token": ""
            },
            "version": {"ref": "abc1234"}
        })
        .to_string();
        let mut output = Vec::new();

        run(["/opt/resource/out", "/tmp/src"], &mut body.as_bytes(), &mut output).unwrap();

        assert_eq!(String::from_utf8(output).unwrap(), "{\"ref\":\"abc1234\"}\n");
    }

    #[test]
    fn run_rejects_malformed_request_without_output() {
        let mut input: &[u8] = b"{\"source\":";
        let mut output = Vec::new();

        let err = run(["github-path-resource", "check"], &mut input, &mut output).unwrap_err();

        assert!(matches!(err, ResourceError::Request(_)), "{err}");
        assert!(output.is_empty());
    }

    #[test]
    fn run_errors_on_unknown_subcommand() {
        let mut input: &[u8] = b"";
        let mut output = Vec::new();
        let err = run(["github-path-resource", "unknown"], &mut input, &mut output).unwrap_err();
        assert!(matches!(err, ResourceError::Usage(_)));
    }

    #[test]
    fn help_is_written_to_output() {
        let mut input: &[u8] = b"";
        let mut output = Vec::new();
        run(["github-path-resource", "--help"], &mut input, &mut output).unwrap();
        assert!(String::from_utf8(output).unwrap().contains("check"));
    }
}
