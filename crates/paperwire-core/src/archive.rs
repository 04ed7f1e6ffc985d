//! Tar serialization of file trees and metadata-safe extraction
//!
//! Packing stores each argument under its relative name (leading roots
//! stripped) without following symlinks. Extraction writes entries one at
//! a time, but directory metadata is applied only after every descendant
//! exists: writing a child updates the parent's mtime, so parents restored
//! eagerly would end up with the extraction time instead of the archived
//! one. Directory records are collected during the pass and applied in
//! reverse lexicographic path order, children before parents; failures to
//! apply ownership or mode are ignored, extracted content is authoritative.

use std::fs;
use std::io::{Read, Write};
use std::path::{Component, Path, PathBuf};

use filetime::FileTime;
use tracing::{debug, warn};

use crate::error::Result;

/// Directory metadata captured during extraction for the deferred pass.
#[derive(Debug, Clone, PartialEq, Eq)]
struct DirMeta {
    path: PathBuf,
    mtime: u64,
    mode: u32,
    uid: u64,
    gid: u64,
}

/// Builds the archive byte stream consumed by the compressor.
pub struct ArchiveWriter<W: Write> {
    builder: tar::Builder<W>,
}

impl<W: Write> ArchiveWriter<W> {
    pub fn new(out: W) -> Self {
        let mut builder = tar::Builder::new(out);
        builder.follow_symlinks(false);
        ArchiveWriter { builder }
    }

    /// Append a file, or a directory tree recursively, under its
    /// relative name.
    pub fn append_path(&mut self, path: &Path) -> Result<()> {
        let name = entry_name(path);
        debug!("adding: {} as {}", path.display(), name.display());
        let meta = fs::symlink_metadata(path)?;
        if meta.is_dir() {
            self.builder.append_dir_all(&name, path)?;
        } else {
            self.builder.append_path_with_name(path, &name)?;
        }
        Ok(())
    }

    /// Write the trailer blocks and return the underlying writer.
    pub fn finish(self) -> Result<W> {
        Ok(self.builder.into_inner()?)
    }
}

/// Extract an archive stream into `dest`, restoring directory metadata
/// children-first once all entries are on disk.
pub fn unpack_stream<R: Read>(reader: R, dest: &Path) -> Result<()> {
    let mut archive = tar::Archive::new(reader);
    archive.set_preserve_permissions(true);
    archive.set_preserve_mtime(true);

    let mut dirs: Vec<DirMeta> = Vec::new();
    for entry in archive.entries()? {
        let mut entry = entry?;
        let meta = if entry.header().entry_type().is_dir() {
            let header = entry.header();
            Some(DirMeta {
                path: entry_name(&entry.path()?),
                mtime: header.mtime().unwrap_or(0),
                mode: header.mode().unwrap_or(0o755),
                uid: header.uid().unwrap_or(0),
                gid: header.gid().unwrap_or(0),
            })
        } else {
            None
        };

        debug!("extracting: {}", entry.path()?.display());
        if entry.unpack_in(dest)? {
            if let Some(meta) = meta {
                dirs.push(meta);
            }
        } else {
            warn!("skipping entry outside destination: {}", entry.path()?.display());
        }
    }

    // Children sort after their parent, so reverse order touches them first.
    dirs.sort_by(|a, b| b.path.cmp(&a.path));
    for meta in &dirs {
        apply_dir_meta(dest, meta);
    }
    Ok(())
}

/// Relative archive name for a path: normal components only, so roots,
/// `.` and `..` never reach an entry header.
fn entry_name(path: &Path) -> PathBuf {
    let name: PathBuf = path
        .components()
        .filter(|c| matches!(c, Component::Normal(_)))
        .collect();
    if name.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        name
    }
}

#[cfg(unix)]
fn apply_dir_meta(dest: &Path, meta: &DirMeta) {
    use std::os::unix::fs::PermissionsExt;

    let path = dest.join(&meta.path);
    let _ = std::os::unix::fs::chown(
        &path,
        u32::try_from(meta.uid).ok(),
        u32::try_from(meta.gid).ok(),
    );
    let _ = filetime::set_file_mtime(&path, FileTime::from_unix_time(meta.mtime as i64, 0));
    let _ = fs::set_permissions(&path, fs::Permissions::from_mode(meta.mode));
}

#[cfg(not(unix))]
fn apply_dir_meta(dest: &Path, meta: &DirMeta) {
    let path = dest.join(&meta.path);
    let _ = filetime::set_file_mtime(&path, FileTime::from_unix_time(meta.mtime as i64, 0));
}
