//! Live archive unpackers: in-process (`tar` + `flate2`) and the `tar` CLI.

use std::fs::File;
use std::io::BufReader;
use std::path::{Component, Path, PathBuf};
use std::process::Command;

use flate2::read::GzDecoder;
use tar::Archive;
use tracing::debug;

use crate::ports::unpacker::ArchiveUnpacker;

/// Extracts archives in-process.
///
/// PAX global headers are skipped and entries that vanish after stripping are
/// ignored. Entries with absolute or `..` paths, and entries reached through a
/// symlink, are rejected. An existing path whose type differs from the
/// entry's (a file where the archive has a directory, or the reverse) is
/// replaced.
pub struct BuiltinUnpacker;

impl ArchiveUnpacker for BuiltinUnpacker {
    fn unpack(
        &self,
        archive: &Path,
        destination: &Path,
        strip_components: usize,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let file = File::open(archive)?;
        let mut tarball = Archive::new(GzDecoder::new(BufReader::new(file)));
        tarball.set_overwrite(true);
        std::fs::create_dir_all(destination)?;

        let mut unpacked = 0usize;
        for entry in tarball.entries()? {
            let mut entry = entry?;
            let kind = entry.header().entry_type();
            if kind.is_pax_global_extensions() {
                continue;
            }

            let path = entry.path()?.into_owned();
            let Some(relative) = strip_path(&path, strip_components)? else {
                continue;
            };
            let target = prepare_target(destination, &relative, kind.is_dir())?;

            if kind.is_hard_link() {
                let link = entry
                    .link_name()?
                    .ok_or_else(|| format!("hard link {} has no target", path.display()))?;
                let Some(link) = strip_path(&link, strip_components)? else {
                    return Err(
                        format!("hard link {} points outside the tree", path.display()).into()
                    );
                };
                reject_symlinked_parents(destination, &link)?;
                if target.exists() {
                    std::fs::remove_file(&target)?;
                }
                std::fs::hard_link(destination.join(link), &target)?;
            } else {
                entry.unpack(&target)?;
            }
            unpacked += 1;
        }

        debug!(entries = unpacked, destination = %destination.display(), "archive unpacked");
        Ok(())
    }
}

/// Fails if any parent of `relative` under `destination` is a symlink.
fn reject_symlinked_parents(
    destination: &Path,
    relative: &Path,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut current = destination.to_path_buf();
    for component in relative.parent().into_iter().flat_map(Path::components) {
        current.push(component);
        if std::fs::symlink_metadata(&current).is_ok_and(|meta| meta.file_type().is_symlink()) {
            return Err(format!(
                "refusing to unpack {} through symlink {}",
                relative.display(),
                current.display()
            )
            .into());
        }
    }
    Ok(())
}

/// Returns where `relative` is unpacked, after creating its parents and
/// removing existing paths of a conflicting type.
fn prepare_target(
    destination: &Path,
    relative: &Path,
    is_dir: bool,
) -> Result<PathBuf, Box<dyn std::error::Error + Send + Sync>> {
    reject_symlinked_parents(destination, relative)?;

    let mut current = destination.to_path_buf();
    for component in relative.parent().into_iter().flat_map(Path::components) {
        current.push(component);
        if std::fs::symlink_metadata(&current).is_ok_and(|meta| !meta.is_dir()) {
            std::fs::remove_file(&current)?;
        }
    }
    std::fs::create_dir_all(&current)?;

    let target = destination.join(relative);
    if let Ok(meta) = std::fs::symlink_metadata(&target) {
        if meta.is_dir() && !is_dir {
            std::fs::remove_dir_all(&target)?;
        } else if !meta.is_dir() && is_dir {
            std::fs::remove_file(&target)?;
        }
    }
    Ok(target)
}

/// Drops the first `strip` normal components of `path`.
///
/// Returns `None` when nothing remains, and an error for absolute paths or
/// paths containing `..`.
fn strip_path(
    path: &Path,
    strip: usize,
) -> Result<Option<PathBuf>, Box<dyn std::error::Error + Send + Sync>> {
    let mut parts = Vec::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => parts.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(
                    format!("refusing to unpack entry with unsafe path {}", path.display()).into()
                );
            }
        }
    }
    if parts.len() <= strip {
        return Ok(None);
    }
    Ok(Some(parts[strip..].iter().collect()))
}

/// Extracts archives with the system `tar` tool.
pub struct TarCommandUnpacker;

impl ArchiveUnpacker for TarCommandUnpacker {
    fn unpack(
        &self,
        archive: &Path,
        destination: &Path,
        strip_components: usize,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        std::fs::create_dir_all(destination)?;
        let output = Command::new("tar")
            .arg("-xzf")
            .arg(archive)
            .arg(format!("--strip-components={strip_components}"))
            .arg("-C")
            .arg(destination)
            .output()?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(format!("tar exited with {}: {}", output.status, stderr.trim()).into());
        }
        Ok(())
    }
}
