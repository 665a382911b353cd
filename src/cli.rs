//! CLI argument definitions.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

/// Top-level CLI parser for `github-path-resource`.
#[derive(Debug, Parser)]
#[command(
    name = "github-path-resource",
    version,
    about = "Pipeline resource tracking paths of a GitHub repository",
    long_about = "Reads a JSON request on stdin and writes a JSON response on stdout. \
                  When installed as `check`, `in` or `out`, the action is taken from the \
                  executable name."
)]
pub struct Cli {
    /// The action to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Resource actions.
#[derive(Debug, Subcommand, PartialEq, Eq)]
pub enum Command {
    /// Emit the versions newer than the given one.
    Check,
    /// Fetch a version into a directory.
    In {
        /// Directory the revision is written to.
        destination: PathBuf,
    },
    /// Echo the given version back; publishing is not supported.
    Out {
        /// Directory holding the build's inputs (unused).
        source_dir: Option<PathBuf>,
    },
}

/// Action names accepted as the executable name.
const ACTIONS: [&str; 3] = ["check", "in", "out"];

/// Inserts the action named by `argv[0]` as the subcommand.
///
/// Pipeline runners invoke `/opt/resource/check`, `/opt/resource/in <dir>`
/// and `/opt/resource/out <dir>`; those are usually links to this binary.
pub fn normalize_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut args: Vec<OsString> = args.into_iter().map(Into::into).collect();
    let action = args
        .first()
        .and_then(|arg0| Path::new(arg0).file_name())
        .and_then(|name| name.to_str())
        .filter(|name| ACTIONS.contains(name))
        .map(str::to_string);
    if let Some(action) = action {
        args.insert(1, action.into());
    }
    args
}
