//! Request and response types for the `check`, `in` and `out` actions.
//!
//! Requests arrive as JSON on stdin and are validated eagerly: unknown
//! fields, missing required fields and empty values are all reported as a
//! single [`RequestError::Malformed`] before any provider is contacted.

use std::collections::BTreeMap;
use std::fmt;
use std::io::Write;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{RequestError, ResourceError};

/// Identifies the remote repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RepositoryRef {
    /// Owning user or organisation.
    pub owner: String,
    /// Repository name.
    pub name: String,
}

impl fmt::Display for RepositoryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Opaque API token. Never printed.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credential(String);

impl Credential {
    /// Wraps a raw token.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The token to send as a bearer credential, if any.
    #[must_use]
    pub fn bearer(&self) -> Option<&str> {
        if self.0.is_empty() {
            None
        } else {
            Some(&self.0)
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// Everything needed to poll or fetch the tracked paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceConfig {
    /// Repository to track.
    #[serde(rename = "repo")]
    pub repository: RepositoryRef,
    /// Branch whose history is followed.
    pub branch: String,
    /// Repository-relative path filters, iterated in list order.
    pub paths: Vec<String>,
    /// API credential.
    #[serde(rename = "auth-token")]
    pub credential: Credential,
}

impl SourceConfig {
    /// Checks the values serde cannot express as types.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::Malformed`] when the owner, name or branch is
    /// empty, or when `paths` is empty or contains an empty entry.
    pub fn validate(&self) -> Result<(), RequestError> {
        if self.repository.owner.is_empty() || self.repository.name.is_empty() {
            return Err(RequestError::Malformed("source.repo owner and name must be set".into()));
        }
        if self.branch.is_empty() {
            return Err(RequestError::Malformed("source.branch must not be empty".into()));
        }
        if self.paths.is_empty() {
            return Err(RequestError::Malformed("source.paths must list at least one path".into()));
        }
        if let Some(index) = self.paths.iter().position(String::is_empty) {
            return Err(RequestError::Malformed(format!("source.paths[{index}] is empty")));
        }
        Ok(())
    }
}

/// A revision cursor. Compared by equality only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Version {
    /// Commit identifier.
    #[serde(rename = "ref")]
    pub reference: String,
}

impl Version {
    /// Creates a version for the given ref.
    #[must_use]
    pub fn new(reference: impl Into<String>) -> Self {
        Self { reference: reference.into() }
    }
}

/// Request body of the `check` action.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CheckRequest {
    /// Source configuration.
    pub source: SourceConfig,
    /// Last version the orchestrator has seen, if any.
    #[serde(default)]
    pub version: Option<Version>,
}

/// Request body of the `in` action.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FetchRequest {
    /// Source configuration.
    pub source: SourceConfig,
    /// Version to materialize.
    pub version: Version,
    /// Step parameters.
    #[serde(default)]
    pub params: Option<BTreeMap<String, String>>,
}

/// Request body of the `out` action.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PublishRequest {
    /// Source configuration.
    pub source: SourceConfig,
    /// Step parameters.
    #[serde(default)]
    pub params: Option<BTreeMap<String, String>>,
    /// Version to echo back.
    #[serde(default)]
    pub version: Option<Version>,
}

/// A request that can be validated after deserialization.
pub trait ResourceRequest: DeserializeOwned {
    /// The source configuration carried by the request.
    fn source(&self) -> &SourceConfig;

    /// Validates the request beyond what serde enforces.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::Malformed`] when a value is unusable.
    fn validate(&self) -> Result<(), RequestError> {
        self.source().validate()
    }
}

impl ResourceRequest for CheckRequest {
    fn source(&self) -> &SourceConfig {
        &self.source
    }
}

impl ResourceRequest for FetchRequest {
    fn source(&self) -> &SourceConfig {
        &self.source
    }

    fn validate(&self) -> Result<(), RequestError> {
        self.source.validate()?;
        if self.version.reference.is_empty() {
            return Err(RequestError::Malformed("version.ref must not be empty".into()));
        }
        Ok(())
    }
}

impl ResourceRequest for PublishRequest {
    fn source(&self) -> &SourceConfig {
        &self.source
    }
}

/// Parses and validates a request body.
///
/// # Errors
///
/// Returns [`RequestError::Malformed`] for invalid JSON, unknown or missing
/// fields, and values rejected by [`ResourceRequest::validate`].
pub fn parse_request<R: ResourceRequest>(input: &[u8]) -> Result<R, RequestError> {
    let request: R =
        serde_json::from_slice(input).map_err(|e| RequestError::Malformed(e.to_string()))?;
    request.validate()?;
    Ok(request)
}

/// Writes a JSON response followed by a newline.
///
/// # Errors
///
/// Returns [`ResourceError::WriteOutput`] if encoding or writing fails.
pub fn write_response<T: Serialize + ?Sized>(
    output: &mut dyn Write,
    response: &T,
) -> Result<(), ResourceError> {
    serde_json::to_writer(&mut *output, response)
        .map_err(|e| ResourceError::WriteOutput(e.into()))?;
    writeln!(output).and_then(|()| output.flush()).map_err(ResourceError::WriteOutput)
}
