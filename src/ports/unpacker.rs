//! Archive extraction port.

use std::path::Path;

/// Extracts a gzipped tarball into a directory.
pub trait ArchiveUnpacker: Send + Sync {
    /// Unpacks `archive` into `destination`, dropping the first
    /// `strip_components` path components of every entry. Existing files are
    /// overwritten.
    ///
    /// # Errors
    ///
    /// Returns an error if the archive is corrupt, contains an unsafe path,
    /// or cannot be written to `destination`.
    fn unpack(
        &self,
        archive: &Path,
        destination: &Path,
        strip_components: usize,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}
