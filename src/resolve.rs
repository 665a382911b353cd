//! Version resolution for the `check` action.
//!
//! Merges the commit histories of every tracked path, orders them newest
//! first, and selects the versions the orchestrator has not seen yet:
//!
//! * no previous version: only the newest commit is reported;
//! * previous version found: every commit newer than it, newest first;
//! * previous version not in history: every commit, optionally capped.

use std::cmp::Ordering;
use std::collections::HashMap;

use chrono::{DateTime, FixedOffset};
use futures::future::join_all;
use tracing::{info, warn};

use crate::error::ResolveError;
use crate::ports::{CommitRecord, HistoryProvider};
use crate::protocol::{SourceConfig, Version};

/// Limits applied while selecting versions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveLimits {
    /// Maximum number of versions returned when the previous version is
    /// absent from history. `None` returns all of them.
    pub max_versions: Option<usize>,
}

/// A commit together with its parsed committer timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimedCommit {
    /// When the commit was made.
    pub committed_at: DateTime<FixedOffset>,
    /// The commit as reported by the provider.
    pub record: CommitRecord,
}

/// Resolves the versions newer than `previous` for the tracked paths.
///
/// Path histories are fetched concurrently; the first failure in path order
/// aborts the resolution so that an unreachable path never yields a partial
/// version list.
///
/// # Errors
///
/// Returns [`ResolveError`] if any path history cannot be fetched, if the
/// histories disagree about a commit, or if a timestamp is not RFC3339.
pub async fn resolve(
    history: &dyn HistoryProvider,
    source: &SourceConfig,
    previous: Option<&Version>,
    limits: ResolveLimits,
) -> Result<Vec<Version>, ResolveError> {
    let fetches = source.paths.iter().map(|path| async move {
        history
            .commits(source, path)
            .await
            .map(|commits| (path.as_str(), commits))
            .map_err(|err| ResolveError::from_provider(path, err))
    });
    let histories = join_all(fetches).await.into_iter().collect::<Result<Vec<_>, _>>()?;

    let commits = merge_histories(histories)?;
    Ok(select_versions(&commits, previous, limits))
}

/// Merges per-path histories into one list without duplicate refs, sorted
/// newest first with ties broken by ref.
///
/// # Errors
///
/// Returns [`ResolveError::MalformedTimestamp`] for an unparsable timestamp
/// and [`ResolveError::MalformedResponse`] for an empty ref or a ref that
/// two paths report with different committer metadata.
pub fn merge_histories<'p>(
    histories: impl IntoIterator<Item = (&'p str, Vec<CommitRecord>)>,
) -> Result<Vec<TimedCommit>, ResolveError> {
    let mut merged: Vec<TimedCommit> = Vec::new();
    let mut index_by_ref: HashMap<String, usize> = HashMap::new();

    for (path, commits) in histories {
        for record in commits {
            if record.reference.is_empty() {
                return Err(ResolveError::MalformedResponse {
                    path: path.to_string(),
                    reason: "commit without a ref".into(),
                });
            }
            let committed_at = parse_timestamp(&record)?;

            if let Some(&index) = index_by_ref.get(&record.reference) {
                let existing = &merged[index];
                if existing.committed_at != committed_at
                    || existing.record.committer_name != record.committer_name
                {
                    return Err(ResolveError::MalformedResponse {
                        path: path.to_string(),
                        reason: format!(
                            "commit {} reported with conflicting committer metadata",
                            record.reference
                        ),
                    });
                }
                continue;
            }

            index_by_ref.insert(record.reference.clone(), merged.len());
            merged.push(TimedCommit { committed_at, record });
        }
    }

    merged.sort_by(newest_first);
    Ok(merged)
}

/// Picks the versions to report from commits sorted by [`merge_histories`].
#[must_use]
pub fn select_versions(
    commits: &[TimedCommit],
    previous: Option<&Version>,
    limits: ResolveLimits,
) -> Vec<Version> {
    let Some(newest) = commits.first() else {
        info!("No new versions");
        return Vec::new();
    };

    let Some(previous) = previous else {
        info!("No incoming version, picking latest");
        log_commit(newest);
        return vec![Version::new(newest.record.reference.clone())];
    };

    info!("Incoming version, selecting commits after: {}", previous.reference);
    let selected = match commits.iter().position(|c| c.record.reference == previous.reference) {
        Some(cutoff) => &commits[..cutoff],
        None => {
            warn!(
                previous = %previous.reference,
                available = commits.len(),
                "previous version not found in history, reporting every commit"
            );
            match limits.max_versions {
                Some(max) if max < commits.len() => &commits[..max],
                _ => commits,
            }
        }
    };

    if selected.is_empty() {
        info!("No new versions");
    }
    selected
        .iter()
        .inspect(|commit| log_commit(commit))
        .map(|commit| Version::new(commit.record.reference.clone()))
        .collect()
}

fn parse_timestamp(record: &CommitRecord) -> Result<DateTime<FixedOffset>, ResolveError> {
    DateTime::parse_from_rfc3339(&record.committer_timestamp).map_err(|e| {
        ResolveError::MalformedTimestamp {
            reference: record.reference.clone(),
            value: record.committer_timestamp.clone(),
            reason: e.to_string(),
        }
    })
}

fn newest_first(a: &TimedCommit, b: &TimedCommit) -> Ordering {
    b.committed_at
        .cmp(&a.committed_at)
        .then_with(|| a.record.reference.cmp(&b.record.reference))
}

fn log_commit(commit: &TimedCommit) {
    info!(
        author = %commit.record.committer_name,
        date = %commit.record.committer_timestamp,
        message = %commit.record.message,
        "{}",
        commit.record.reference
    );
}
