//! Helpers shared by unit tests.

use std::io::Write;

use flate2::write::GzEncoder;
use flate2::Compression;
use tar::{EntryType, Header};

/// Builds a gzipped tarball shaped like a GitHub tarball: an optional PAX
/// global header, a synthetic root directory, and the given files under it.
pub(crate) fn tarball(root: &str, files: &[(&str, &str)]) -> Vec<u8> {
    let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));

    let comment = format!("comment={root}\n");
    let record = format!("{} {comment}", comment.len() + 3);
    let mut pax = Header::new_ustar();
    pax.set_entry_type(EntryType::XGlobalHeader);
    pax.set_size(record.len() as u64);
    pax.set_mode(0o644);
    builder.append_data(&mut pax, "pax_global_header", record.as_bytes()).unwrap();

    let mut dir = Header::new_gnu();
    dir.set_entry_type(EntryType::Directory);
    dir.set_size(0);
    dir.set_mode(0o755);
    builder.append_data(&mut dir, format!("{root}/"), std::io::empty()).unwrap();

    for (path, contents) in files {
        let mut header = Header::new_gnu();
        header.set_size(contents.len() as u64);
        header.set_mode(0o644);
        builder.append_data(&mut header, format!("{root}/{path}"), contents.as_bytes()).unwrap();
    }

    let mut encoder = builder.into_inner().unwrap();
    encoder.flush().unwrap();
    encoder.finish().unwrap()
}

/// Builds a gzipped tarball containing one entry with a raw, unchecked path.
pub(crate) fn tarball_with_raw_path(path: &str, contents: &str) -> Vec<u8> {
    let mut header = Header::new_gnu();
    header.set_size(contents.len() as u64);
    header.set_mode(0o644);
    // `append_data` refuses `..`, so write the name bytes directly.
    let name = &mut header.as_gnu_mut().unwrap().name;
    name[..path.len()].copy_from_slice(path.as_bytes());
    header.set_cksum();

    let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));
    builder.append(&header, contents.as_bytes()).unwrap();
    builder.into_inner().unwrap().finish().unwrap()
}

/// Builds a gzipped tarball with a symlink at `link` pointing to `target`,
/// followed by a file at `file`.
pub(crate) fn tarball_with_symlink(link: &str, target: &std::path::Path, file: &str) -> Vec<u8> {
    let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));

    let mut symlink = Header::new_gnu();
    symlink.set_entry_type(EntryType::Symlink);
    symlink.set_size(0);
    symlink.set_mode(0o777);
    symlink.set_link_name(target).unwrap();
    builder.append_data(&mut symlink, link, std::io::empty()).unwrap();

    let mut header = Header::new_gnu();
    header.set_size(4);
    header.set_mode(0o644);
    builder.append_data(&mut header, file, &b"evil"[..]).unwrap();

    builder.into_inner().unwrap().finish().unwrap()
}

/// Lists every file under `root` with its contents, sorted by relative path.
pub(crate) fn snapshot(root: &std::path::Path) -> Vec<(String, Vec<u8>)> {
    fn walk(root: &std::path::Path, dir: &std::path::Path, out: &mut Vec<(String, Vec<u8>)>) {
        for entry in std::fs::read_dir(dir).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                walk(root, &path, out);
            } else {
                let relative = path.strip_prefix(root).unwrap().to_string_lossy().into_owned();
                out.push((relative, std::fs::read(&path).unwrap()));
            }
        }
    }
    let mut out = Vec::new();
    walk(root, root, &mut out);
    out.sort();
    out
}
