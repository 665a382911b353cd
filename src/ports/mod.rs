//! Port traits defining external boundaries.
//!
//! Each trait represents a boundary between the resolver/materializer core
//! and an external system (commit history, revision archives, archive
//! extraction, local filesystem). Implementations live in `src/adapters/`.

use std::future::Future;
use std::pin::Pin;

use crate::error::ProviderError;

pub mod archive;
pub mod filesystem;
pub mod history;
pub mod unpacker;

pub use archive::ArchiveProvider;
pub use filesystem::FileSystem;
pub use history::{CommitRecord, HistoryProvider};
pub use unpacker::ArchiveUnpacker;

/// Boxed future returned by provider ports to keep the traits dyn-compatible.
pub type ProviderFuture<'a, T> =
    Pin<Box<dyn Future<Output = Result<T, ProviderError>> + Send + 'a>>;
