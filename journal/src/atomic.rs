//! Whole-file writes that never leave a partial note behind.
//!
//! Content is written to a temporary file in the note's directory, synced,
//! and only then moved onto the note path. A write that fails midway drops
//! the temporary file, so the note is either absent, its old content, or its
//! complete new content.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::{JournalError, Result};

/// Writes `content` to a new file at `path`.
///
/// Returns `Ok(false)` without touching anything if `path` already exists.
pub(crate) fn create_new(path: &Path, content: &str) -> Result<bool> {
    create_new_with(path, |file| file.write_all(content.as_bytes()))
}

/// Replaces the file at `path` with `content`, keeping its permissions.
pub(crate) fn replace(path: &Path, content: &str) -> Result<()> {
    replace_with(path, |file| file.write_all(content.as_bytes()))
}

fn create_new_with(path: &Path, fill: impl FnOnce(&mut File) -> io::Result<()>) -> Result<bool> {
    let staged = stage(path, fill)?;
    match staged.persist_noclobber(path) {
        Ok(_) => Ok(true),
        Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => Ok(false),
        Err(e) => Err(JournalError::io(path, e.error)),
    }
}

fn replace_with(path: &Path, fill: impl FnOnce(&mut File) -> io::Result<()>) -> Result<()> {
    let permissions = fs::metadata(path)
        .map_err(|e| JournalError::io(path, e))?
        .permissions();
    let staged = stage(path, fill)?;
    fs::set_permissions(staged.path(), permissions).map_err(|e| JournalError::io(path, e))?;
    staged
        .persist(path)
        .map_err(|e| JournalError::io(path, e.error))?;
    Ok(())
}

/// Fills a synced temporary file next to `path`.
fn stage(path: &Path, fill: impl FnOnce(&mut File) -> io::Result<()>) -> Result<NamedTempFile> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut staged = NamedTempFile::new_in(dir).map_err(|e| JournalError::io(dir, e))?;
    fill(staged.as_file_mut()).map_err(|e| JournalError::io(path, e))?;
    staged
        .as_file()
        .sync_all()
        .map_err(|e| JournalError::io(path, e))?;
    Ok(staged)
}
