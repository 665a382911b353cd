//! Filesystem port for the metadata files written next to a fetched tree.

use std::path::Path;

/// Creates directories and writes small text files.
pub trait FileSystem: Send + Sync {
    /// Creates `path` and all missing parents. Succeeds if it already exists.
    ///
    /// # Errors
    ///
    /// Returns an error if a directory cannot be created.
    fn create_dir_all(&self, path: &Path) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    /// Writes `contents` to `path`, creating or truncating it.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails (permissions, disk full, etc.).
    fn write(
        &self,
        path: &Path,
        contents: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}
