//! Process settings read from the environment.

use std::path::PathBuf;
use std::time::Duration;

use crate::adapters::live::github::DEFAULT_API_URL;
use crate::resolve::ResolveLimits;

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "RESOURCE_LOG";
/// Log filter used when [`LOG_ENV`] is unset.
pub const DEFAULT_LOG_FILTER: &str = "info";

const API_URL_ENV: &str = "RESOURCE_API_URL";
const TIMEOUT_ENV: &str = "RESOURCE_HTTP_TIMEOUT_SECS";
const MAX_VERSIONS_ENV: &str = "RESOURCE_MAX_VERSIONS";
const UNPACKER_ENV: &str = "RESOURCE_UNPACKER";
const RECORD_ENV: &str = "RESOURCE_RECORD";
const REPLAY_ENV: &str = "RESOURCE_REPLAY";

const DEFAULT_TIMEOUT_SECS: u64 = 600;

/// Which archive unpacker to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnpackerKind {
    /// In-process extraction with `tar` and `flate2`.
    #[default]
    Builtin,
    /// The system `tar` command.
    TarCommand,
}

/// Settings shared by all actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// GitHub API base URL.
    pub api_url: String,
    /// Timeout applied to each HTTP request.
    pub http_timeout: Duration,
    /// Upper bound on versions emitted when the cursor is not found.
    pub max_versions: Option<usize>,
    /// Archive unpacker.
    pub unpacker: UnpackerKind,
    /// Cassette to record provider interactions into.
    pub record_path: Option<PathBuf>,
    /// Cassette to serve provider interactions from.
    pub replay_path: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            http_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_versions: None,
            unpacker: UnpackerKind::Builtin,
            record_path: None,
            replay_path: None,
        }
    }
}

impl Settings {
    /// Reads settings from the process environment.
    ///
    /// # Errors
    ///
    /// Returns a message naming the offending variable if a value is invalid.
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads settings through `lookup`. Empty values count as unset.
    ///
    /// # Errors
    ///
    /// Returns a message naming the offending variable if a value is invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut settings = Self::default();

        if let Some(url) = get(API_URL_ENV) {
            settings.api_url = url;
        }
        if let Some(secs) = get(TIMEOUT_ENV) {
            let secs: u64 = secs
                .parse()
                .map_err(|e| format!("{TIMEOUT_ENV} must be a whole number of seconds: {e}"))?;
            if secs == 0 {
                return Err(format!("{TIMEOUT_ENV} must be at least 1"));
            }
            settings.http_timeout = Duration::from_secs(secs);
        }
        if let Some(max) = get(MAX_VERSIONS_ENV) {
            let max: usize = max
                .parse()
                .map_err(|e| format!("{MAX_VERSIONS_ENV} must be a positive integer: {e}"))?;
            if max == 0 {
                return Err(format!("{MAX_VERSIONS_ENV} must be at least 1"));
            }
            settings.max_versions = Some(max);
        }
        if let Some(kind) = get(UNPACKER_ENV) {
            settings.unpacker = match kind.as_str() {
                "builtin" => UnpackerKind::Builtin,
                "tar" => UnpackerKind::TarCommand,
                other => {
                    return Err(format!("{UNPACKER_ENV} must be `builtin` or `tar`, got `{other}`"))
                }
            };
        }
        settings.record_path = get(RECORD_ENV).map(PathBuf::from);
        settings.replay_path = get(REPLAY_ENV).map(PathBuf::from);
        if settings.record_path.is_some() && settings.replay_path.is_some() {
            return Err(format!("{RECORD_ENV} and {REPLAY_ENV} cannot both be set"));
        }
        Ok(settings)
    }

    /// Limits applied by the version resolver.
    #[must_use]
    pub fn limits(&self) -> ResolveLimits {
        ResolveLimits { max_versions: self.max_versions }
    }
}
