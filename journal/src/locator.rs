//! Discovery of existing daily notes.
//!
//! Notes are enumerated by walking exactly two directory levels below the
//! root (`YYYY/MM`). Anything that does not follow the naming scheme is
//! ignored. Ordering is by relative path string, which for this scheme is
//! the same as chronological order.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::{trace, warn};

use crate::error::{JournalError, Result};
use crate::note::{date_stem, NoteLayout};

/// A daily note found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteEntry {
    /// Full path of the note file.
    pub path: PathBuf,
    /// `YYYY-MM-DD` stem of the file name.
    pub stem: String,
    /// `YYYY/MM/YYYY-MM-DD.<ext>` path relative to the root; the sort key.
    relative: String,
}

/// Lists every daily note under the layout's root, oldest first.
///
/// A missing root yields an empty list. Unreadable year or month directories
/// are skipped with a warning.
///
/// # Errors
///
/// Returns [`JournalError::Io`] if the root exists but cannot be read.
pub fn list_notes(layout: &NoteLayout) -> Result<Vec<NoteEntry>> {
    let root = layout.root();
    let years = match fs::read_dir(root) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(JournalError::io(root, e)),
    };

    let mut notes = Vec::new();
    for year_dir in subdirectories(years) {
        let months = match fs::read_dir(&year_dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(path = %year_dir.display(), error = %e, "Skipping unreadable directory");
                continue;
            }
        };

        for month_dir in subdirectories(months) {
            let files = match fs::read_dir(&month_dir) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!(path = %month_dir.display(), error = %e, "Skipping unreadable directory");
                    continue;
                }
            };

            for entry in files.flatten() {
                let path = entry.path();
                if !path.is_file() {
                    continue;
                }
                if let Some(stem) = layout.date_stem_of(&path) {
                    notes.push(NoteEntry {
                        relative: relative_key(root, &path),
                        path,
                        stem,
                    });
                }
            }
        }
    }

    notes.sort_by(|a, b| a.relative.cmp(&b.relative));
    trace!(root = %root.display(), count = notes.len(), "Listed daily notes");
    Ok(notes)
}

/// Finds the most recent note strictly before `reference`.
///
/// The note for `reference` itself is never returned, even if it exists.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use daynote_journal::locator::find_predecessor;
/// use daynote_journal::note::NoteLayout;
///
/// let dir = tempfile::tempdir().unwrap();
/// let layout = NoteLayout::new(dir.path(), "md");
/// let today = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
/// assert!(find_predecessor(&layout, today).unwrap().is_none());
/// ```
pub fn find_predecessor(layout: &NoteLayout, reference: NaiveDate) -> Result<Option<NoteEntry>> {
    let reference_stem = date_stem(reference);
    let predecessor = list_notes(layout)?
        .into_iter()
        .rev()
        .find(|note| note.stem < reference_stem);
    Ok(predecessor)
}

fn subdirectories(entries: fs::ReadDir) -> impl Iterator<Item = PathBuf> {
    entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
}

fn relative_key(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
