//! Service context bundling all port trait objects.

use std::path::Path;
use std::sync::{Arc, Mutex};

use tracing::{info, warn};

use crate::adapters::live::filesystem::LiveFileSystem;
use crate::adapters::live::github::GitHubClient;
use crate::adapters::live::unpacker::{BuiltinUnpacker, TarCommandUnpacker};
use crate::adapters::recording::{RecordingArchiveProvider, RecordingHistoryProvider};
use crate::adapters::replaying::{ReplayingArchiveProvider, ReplayingHistoryProvider};
use crate::cassette::{Cassette, CassetteRecorder, CassetteReplayer};
use crate::config::{Settings, UnpackerKind};
use crate::error::ResourceError;
use crate::materialize::Materializer;
use crate::ports::{ArchiveProvider, ArchiveUnpacker, FileSystem, HistoryProvider};

/// Bundles all port trait objects into a single context.
///
/// Constructors wire up different adapter implementations (live, recording,
/// replaying). Only the two provider ports are recorded and replayed; the
/// unpacker and filesystem always act on the real disk.
pub struct ServiceContext {
    /// Commit history per path.
    pub history: Box<dyn HistoryProvider>,
    /// Revision metadata and tarballs.
    pub archives: Box<dyn ArchiveProvider>,
    /// Archive extraction.
    pub unpacker: Box<dyn ArchiveUnpacker>,
    /// Local filesystem writes.
    pub fs: Box<dyn FileSystem>,
    /// Optional cassette recorder; written to disk on drop.
    recorder: Option<Arc<Mutex<CassetteRecorder>>>,
    /// Optional cassette replayer; unserved interactions are reported on drop.
    replayer: Option<Arc<Mutex<CassetteReplayer>>>,
}

impl ServiceContext {
    /// Builds the context selected by `settings`: replaying, recording, or live.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Setup`] if an adapter cannot be constructed.
    pub fn from_settings(settings: &Settings) -> Result<Self, ResourceError> {
        match (&settings.replay_path, &settings.record_path) {
            (Some(path), _) => Self::replaying(settings, path),
            (None, Some(path)) => Self::recording(settings, path),
            (None, None) => Self::live(settings),
        }
    }

    /// Creates a live context talking to the GitHub API.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Setup`] if the HTTP client cannot be built.
    pub fn live(settings: &Settings) -> Result<Self, ResourceError> {
        let client = github_client(settings)?;
        Ok(Self {
            history: Box::new(client.clone()),
            archives: Box::new(client),
            unpacker: unpacker(settings.unpacker),
            fs: Box::new(LiveFileSystem),
            recorder: None,
            replayer: None,
        })
    }

    /// Creates a live context whose provider calls are written to a cassette
    /// at `path` when the context is dropped.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Setup`] if the HTTP client cannot be built.
    pub fn recording(settings: &Settings, path: &Path) -> Result<Self, ResourceError> {
        let client = github_client(settings)?;
        let recorder = Arc::new(Mutex::new(CassetteRecorder::new(path)));
        Ok(Self {
            history: Box::new(RecordingHistoryProvider::new(
                Box::new(client.clone()),
                Arc::clone(&recorder),
            )),
            archives: Box::new(RecordingArchiveProvider::new(
                Box::new(client),
                Arc::clone(&recorder),
            )),
            unpacker: unpacker(settings.unpacker),
            fs: Box::new(LiveFileSystem),
            recorder: Some(recorder),
            replayer: None,
        })
    }

    /// Creates a context serving provider calls from the cassette at `path`.
    ///
    /// Both providers share one replayer, so each recorded interaction is
    /// served at most once.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Setup`] if the cassette cannot be read or parsed.
    pub fn replaying(settings: &Settings, path: &Path) -> Result<Self, ResourceError> {
        let cassette = Cassette::load(path)
            .map_err(|reason| ResourceError::Setup { port: "cassette", reason })?;
        info!(
            cassette = %cassette.name,
            interactions = cassette.interactions.len(),
            "replaying cassette"
        );
        let replayer = Arc::new(Mutex::new(CassetteReplayer::new(&cassette)));
        Ok(Self {
            history: Box::new(ReplayingHistoryProvider::new(Arc::clone(&replayer))),
            archives: Box::new(ReplayingArchiveProvider::new(Arc::clone(&replayer))),
            unpacker: unpacker(settings.unpacker),
            fs: Box::new(LiveFileSystem),
            recorder: None,
            replayer: Some(replayer),
        })
    }

    /// A materializer over this context's ports.
    #[must_use]
    pub fn materializer(&self) -> Materializer<'_> {
        Materializer::new(self.archives.as_ref(), self.unpacker.as_ref(), self.fs.as_ref())
    }

    /// Number of cassette interactions not yet served, when replaying.
    #[must_use]
    pub fn unreplayed(&self) -> Option<usize> {
        let replayer = self.replayer.as_ref()?;
        replayer.lock().ok().map(|r| r.remaining())
    }
}

fn github_client(settings: &Settings) -> Result<GitHubClient, ResourceError> {
    GitHubClient::new(&settings.api_url, settings.http_timeout)
        .map_err(|e| ResourceError::Setup { port: "github client", reason: e.to_string() })
}

fn unpacker(kind: UnpackerKind) -> Box<dyn ArchiveUnpacker> {
    match kind {
        UnpackerKind::Builtin => Box::new(BuiltinUnpacker),
        UnpackerKind::TarCommand => Box::new(TarCommandUnpacker),
    }
}

impl Drop for ServiceContext {
    fn drop(&mut self) {
        if let Some(remaining) = self.unreplayed().filter(|n| *n > 0) {
            warn!(remaining, "cassette has interactions that were not replayed");
        }
        let Some(recorder) = self.recorder.take() else {
            return;
        };
        let Ok(recorder) = recorder.lock() else {
            warn!("cassette recorder lock poisoned; cassette not written");
            return;
        };
        match recorder.save() {
            Ok(path) => info!(
                interactions = recorder.len(),
                "Recording saved to: {}",
                path.display()
            ),
            Err(e) => warn!("failed to write cassette {}: {e}", recorder.path().display()),
        }
    }
}
