//! Live history and archive provider backed by the GitHub REST API.

use std::fs::File;
use std::io::Write;
use std::time::Duration;

use reqwest::header::ACCEPT;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::error::ProviderError;
use crate::ports::{ArchiveProvider, CommitRecord, HistoryProvider, ProviderFuture};
use crate::protocol::SourceConfig;

/// Default API base URL.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

const API_VERSION: &str = "2022-11-28";
const JSON_MEDIA_TYPE: &str = "application/vnd.github+json";
const RAW_MEDIA_TYPE: &str = "application/vnd.github.v3.raw";
const USER_AGENT: &str = concat!("github-path-resource/", env!("CARGO_PKG_VERSION"));

/// GitHub REST client implementing both provider ports.
#[derive(Clone)]
pub struct GitHubClient {
    client: Client,
    api_url: String,
}

impl GitHubClient {
    /// Creates a client for the API at `api_url` with a per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(api_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).user_agent(USER_AGENT).build()?;
        Ok(Self { client, api_url: api_url.trim_end_matches('/').to_string() })
    }

    fn get(&self, source: &SourceConfig, endpoint: &str, accept: &str) -> RequestBuilder {
        let url = format!(
            "{}/repos/{}/{}/{endpoint}",
            self.api_url, source.repository.owner, source.repository.name
        );
        let request = self
            .client
            .get(url)
            .header(ACCEPT, accept)
            .header("X-GitHub-Api-Version", API_VERSION);
        match source.credential.bearer() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

/// Commit object as returned by the commits endpoints.
#[derive(Deserialize)]
struct GitHubCommit {
    sha: String,
    commit: CommitDetail,
}

#[derive(Deserialize)]
struct CommitDetail {
    committer: Signature,
    message: String,
}

#[derive(Deserialize)]
struct Signature {
    name: String,
    date: String,
}

/// Error body returned by the API on failure.
#[derive(Deserialize)]
struct ApiError {
    message: String,
}

impl From<GitHubCommit> for CommitRecord {
    fn from(commit: GitHubCommit) -> Self {
        Self {
            reference: commit.sha,
            committer_name: commit.commit.committer.name,
            committer_timestamp: commit.commit.committer.date,
            message: commit.commit.message,
        }
    }
}

/// Sends `request` and turns transport failures and non-success statuses
/// into [`ProviderError::Unavailable`].
async fn send(request: RequestBuilder) -> Result<Response, ProviderError> {
    let response = request
        .send()
        .await
        .map_err(|e| ProviderError::Unavailable(format!("GitHub API request failed: {e}")))?;

    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiError>(&body).map_or(body, |e| e.message);
    Err(ProviderError::Unavailable(format!(
        "GitHub API responded with status {}: {}",
        status.as_u16(),
        message.trim()
    )))
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ProviderError> {
    let body = response
        .text()
        .await
        .map_err(|e| {
            ProviderError::Unavailable(format!("failed to read GitHub API response: {e}"))
        })?;
    serde_json::from_str(&body)
        .map_err(|e| ProviderError::Malformed(format!("failed to parse GitHub API response: {e}")))
}

impl HistoryProvider for GitHubClient {
    fn commits<'a>(
        &'a self,
        source: &'a SourceConfig,
        path: &'a str,
    ) -> ProviderFuture<'a, Vec<CommitRecord>> {
        Box::pin(async move {
            let request = self
                .get(source, "commits", JSON_MEDIA_TYPE)
                .query(&[("sha", source.branch.as_str()), ("path", path)]);
            let commits: Vec<GitHubCommit> = decode(send(request).await?).await?;
            debug!(path, count = commits.len(), "fetched commit history");
            Ok(commits.into_iter().map(CommitRecord::from).collect())
        })
    }
}

impl ArchiveProvider for GitHubClient {
    fn commit<'a>(
        &'a self,
        source: &'a SourceConfig,
        reference: &'a str,
    ) -> ProviderFuture<'a, CommitRecord> {
        Box::pin(async move {
            let request = self.get(source, &format!("commits/{reference}"), JSON_MEDIA_TYPE);
            let commit: GitHubCommit = decode(send(request).await?).await?;
            Ok(commit.into())
        })
    }

    fn download_archive<'a>(
        &'a self,
        source: &'a SourceConfig,
        reference: &'a str,
        destination: &'a mut File,
    ) -> ProviderFuture<'a, u64> {
        Box::pin(async move {
            let request = self.get(source, &format!("tarball/{reference}"), RAW_MEDIA_TYPE);
            let mut response = send(request).await?;

            let mut written = 0u64;
            while let Some(chunk) = response.chunk().await.map_err(|e| {
                ProviderError::Unavailable(format!("failed to read archive body: {e}"))
            })? {
                destination
                    .write_all(&chunk)
                    .map_err(|e| ProviderError::Storage(format!("failed to write archive: {e}")))?;
                written += chunk.len() as u64;
            }
            destination
                .flush()
                .map_err(|e| ProviderError::Storage(format!("failed to write archive: {e}")))?;
            Ok(written)
        })
    }
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::protocol::{Credential, RepositoryRef};

    fn source(token: &str) -> SourceConfig {
        SourceConfig {
            repository: RepositoryRef { owner: "acme".into(), name: "widgets".into() },
            branch: "release/1.x".into(),
            paths: vec!["docs".into()],
            credential: Credential::new(token),
        }
    }

    fn commit_json(sha: &str, date: &str) -> serde_json::Value {
        json!({
            "sha": sha,
            "node_id": "C_kwDO",
            "commit": {
                "author": {"name": "Ada", "date": date},
                "committer": {"name": "GitHub", "date": date},
                "message": format!("commit {sha}")
            },
            "committer": null
        })
    }

    async fn client(server: &MockServer) -> GitHubClient {
        GitHubClient::new(&format!("{}/", server.uri()), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn lists_commits_for_path_on_branch() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/acme/widgets/commits"))
            .and(query_param("sha", "release/1.x"))
            .and(query_param("path", "docs"))
            .and(header("authorization", "Bearer secret"))
            .and(header("x-github-api-version", API_VERSION))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                commit_json("c2", "2024-01-02T00:00:00Z"),
                commit_json("c1", "2024-01-01T00:00:00Z"),
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let commits = client(&server).await.commits(&source("secret"), "docs").await.unwrap();

        assert_eq!(commits.len(), 2);
        assert_eq!(commits[0].reference, "c2");
        assert_eq!(commits[0].committer_name, "GitHub");
        assert_eq!(commits[0].committer_timestamp, "2024-01-02T00:00:00Z");
        assert_eq!(commits[1].message, "commit c1");
    }

    #[tokio::test]
    async fn non_success_status_is_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/acme/widgets/commits"))
            .respond_with(
                ResponseTemplate::new(403)
                    .set_body_json(json!({"message": "API rate limit exceeded"})),
            )
            .mount(&server)
            .await;

        let err = client(&server).await.commits(&source("secret"), "docs").await.unwrap_err();

        assert_eq!(
            err,
            ProviderError::Unavailable(
                "GitHub API responded with status 403: API rate limit exceeded".into()
            )
        );
    }

    #[tokio::test]
    async fn undecodable_body_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/acme/widgets/commits"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"unexpected": true})))
            .mount(&server)
            .await;

        let err = client(&server).await.commits(&source("secret"), "docs").await.unwrap_err();

        assert!(matches!(err, ProviderError::Malformed(_)), "{err:?}");
    }

    #[tokio::test]
    async fn fetches_single_commit_metadata() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/acme/widgets/commits/abc1234def"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(commit_json("abc1234def", "2024-03-01T12:00:00Z")),
            )
            .mount(&server)
            .await;

        let commit = client(&server).await.commit(&source(""), "abc1234def").await.unwrap();

        assert_eq!(commit.reference, "abc1234def");
        assert_eq!(commit.committer_timestamp, "2024-03-01T12:00:00Z");
    }

    #[tokio::test]
    async fn streams_tarball_into_file() {
        let server = MockServer::start().await;
        let body = vec![0x1f, 0x8b, 1, 2, 3, 4, 5];
        Mock::given(method("GET"))
            .and(path("/repos/acme/widgets/tarball/abc1234def"))
            .and(header("accept", RAW_MEDIA_TYPE))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(body.clone()))
            .mount(&server)
            .await;

        let mut file = tempfile::tempfile().unwrap();
        let written = client(&server)
            .await
            .download_archive(&source("secret"), "abc1234def", &mut file)
            .await
            .unwrap();

        assert_eq!(written, body.len() as u64);
        let mut stored = Vec::new();
        std::io::Seek::rewind(&mut file).unwrap();
        file.read_to_end(&mut stored).unwrap();
        assert_eq!(stored, body);
    }

    #[tokio::test]
    async fn missing_tarball_is_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/acme/widgets/tarball/abc1234def"))
            .respond_with(ResponseTemplate::new(404).set_body_string("Not Found"))
            .mount(&server)
            .await;

        let mut file = tempfile::tempfile().unwrap();
        let err = client(&server)
            .await
            .download_archive(&source("secret"), "abc1234def", &mut file)
            .await
            .unwrap_err();

        assert_eq!(
            err,
            ProviderError::Unavailable("GitHub API responded with status 404: Not Found".into())
        );
    }

    #[tokio::test]
    async fn unreachable_api_is_unavailable() {
        let client = GitHubClient::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
        let err = client.commits(&source("secret"), "docs").await.unwrap_err();
        assert!(matches!(err, ProviderError::Unavailable(_)));
    }
}
