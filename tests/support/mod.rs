//! Fixtures shared by the integration tests.
#![allow(dead_code)]

use std::io::Write;
use std::path::Path;

use flate2::write::GzEncoder;
use flate2::Compression;
use serde_json::{json, Value};

use github_path_resource::cassette::{
    commits_input, revision_input, ArchivePayload, CassetteRecorder, ARCHIVE_PORT, COMMIT,
    COMMITS, DOWNLOAD_ARCHIVE, HISTORY_PORT,
};
use github_path_resource::error::ProviderError;
use github_path_resource::ports::CommitRecord;
use github_path_resource::protocol::SourceConfig;

/// A full-length ref used by fetch tests.
pub const SHA: &str = "4b825dc642cb6eb9a060e54bf8d69288fbee4904";

/// Source configuration as sent in requests.
pub fn source_json(paths: &[&str]) -> Value {
    json!({
        "repo": {"owner": "acme", "name": "widgets"},
        "branch": "main",
        "paths": paths,
        "auth-token": "ghp_not_a_real_token"
    })
}

/// Parsed form of [`source_json`].
pub fn source(paths: &[&str]) -> SourceConfig {
    serde_json::from_value(source_json(paths)).unwrap()
}

/// A commit record with a generated message.
pub fn commit(reference: &str, timestamp: &str) -> CommitRecord {
    CommitRecord {
        reference: reference.into(),
        committer_name: "Grace Hopper".into(),
        committer_timestamp: timestamp.into(),
        message: format!("Update {reference}"),
    }
}

/// Gzipped tarball shaped like GitHub's: a PAX global header carrying the
/// commit id, a synthetic root directory, and the files under it.
pub fn tarball(root: &str, files: &[(&str, &str)]) -> Vec<u8> {
    let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));
    let comment = format!("comment={SHA}\n");
    let record = format!("{} {comment}", comment.len() + 3);
    let mut pax = tar::Header::new_ustar();
    pax.set_entry_type(tar::EntryType::XGlobalHeader);
    pax.set_size(record.len() as u64);
    pax.set_mode(0o644);
    builder.append_data(&mut pax, "pax_global_header", record.as_bytes()).unwrap();
    let mut dir = tar::Header::new_gnu();
    dir.set_entry_type(tar::EntryType::Directory);
    dir.set_size(0);
    dir.set_mode(0o755);
    builder.append_data(&mut dir, format!("{root}/"), std::io::empty()).unwrap();
    for (path, contents) in files {
        let mut header = tar::Header::new_gnu();
        header.set_size(contents.len() as u64);
        header.set_mode(0o644);
        builder.append_data(&mut header, format!("{root}/{path}"), contents.as_bytes()).unwrap();
    }
    let mut encoder = builder.into_inner().unwrap();
    encoder.flush().unwrap();
    encoder.finish().unwrap()
}

/// Writes a cassette serving the given path histories.
pub fn history_cassette(
    path: &Path,
    source: &SourceConfig,
    histories: &[(&str, Result<Vec<CommitRecord>, ProviderError>)],
) {
    let mut recorder = CassetteRecorder::new(path);
    for (tracked, result) in histories {
        recorder
            .record_result(HISTORY_PORT, COMMITS, commits_input(source, tracked), result)
            .unwrap();
    }
    recorder.save().unwrap();
}

/// Writes a cassette serving one commit and its tarball.
pub fn fetch_cassette(path: &Path, source: &SourceConfig, commit: &CommitRecord, archive: &[u8]) {
    let mut recorder = CassetteRecorder::new(path);
    let input = revision_input(source, &commit.reference);
    recorder
        .record_result(ARCHIVE_PORT, COMMIT, input.clone(), &Ok::<_, ProviderError>(commit))
        .unwrap();
    recorder
        .record_result(
            ARCHIVE_PORT,
            DOWNLOAD_ARCHIVE,
            input,
            &Ok::<_, ProviderError>(ArchivePayload::encode(archive)),
        )
        .unwrap();
    recorder.save().unwrap();
}
