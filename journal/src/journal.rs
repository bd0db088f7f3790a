//! Daily note lifecycle.
//!
//! [`Journal`] ties the naming scheme, locator, to-do parser, carry-forward
//! and emptiness classifier together into the operations the rest of the
//! system uses:
//!
//! - [`Journal::create_note`]: create a date's note seeded with carried to-dos
//! - [`Journal::cleanup_before`]: delete the previous note if it is disposable
//! - [`Journal::append`]: append submitted text to a date's note
//! - [`Journal::run_daily`]: create then clean up, the scheduled job
//!
//! Every operation that reads a note and then writes or deletes it holds the
//! note's lock from [`NoteLocks`] for the whole sequence.
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use daynote_journal::journal::{AppendOutcome, Journal};
//! use daynote_journal::note::NoteLayout;
//!
//! let dir = tempfile::tempdir().unwrap();
//! let journal = Journal::new(NoteLayout::new(dir.path(), "md"));
//! let today = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
//!
//! let first = journal.append(today, "hello").unwrap();
//! let second = journal.append(today, "hello").unwrap();
//! assert!(matches!(first, AppendOutcome::Appended { .. }));
//! assert!(matches!(second, AppendOutcome::Skipped { .. }));
//! ```

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::atomic;
use crate::carry::{carry_forward, render_todo_lines};
use crate::config::Config;
use crate::emptiness::first_unique_line;
use crate::error::{JournalError, Result};
use crate::locator::find_predecessor;
use crate::locks::NoteLocks;
use crate::note::{render_new_note, NoteLayout};
use crate::todo;

/// Line separating appended sections from the rest of a note.
pub const SECTION_SEPARATOR: &str = "---";

/// Result of [`Journal::create_note`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    /// A new note was written.
    Created {
        path: PathBuf,
        /// Number of to-do lines carried from the previous note.
        carried: usize,
    },
    /// The note already existed and was left untouched.
    AlreadyExists(PathBuf),
}

impl CreateOutcome {
    pub fn path(&self) -> &Path {
        match self {
            Self::Created { path, .. } | Self::AlreadyExists(path) => path,
        }
    }
}

impl fmt::Display for CreateOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created { path, carried } => write!(
                f,
                "created daily note {} ({carried} to-dos carried)",
                path.display()
            ),
            Self::AlreadyExists(path) => {
                write!(f, "note for today already exists: {}", path.display())
            }
        }
    }
}

/// Result of [`Journal::cleanup_before`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanupOutcome {
    /// The reference date has no note yet; cleanup only follows a creation.
    TodayMissing,
    /// There is no earlier note.
    NoPredecessor,
    /// The earlier note held only structural lines and was deleted.
    Deleted(PathBuf),
    /// The earlier note holds unique content and was kept.
    Retained(PathBuf),
    /// The earlier note (or the root, while searching) could not be read; nothing was deleted.
    Unreadable(PathBuf),
}

impl fmt::Display for CleanupOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TodayMissing => write!(f, "today's note does not exist, skipping cleanup"),
            Self::NoPredecessor => write!(f, "no previous daily note to clean up"),
            Self::Deleted(path) => write!(
                f,
                "no unique information found in {}, deleted note",
                path.display()
            ),
            Self::Retained(path) => write!(
                f,
                "found unique information in {}, keeping note",
                path.display()
            ),
            Self::Unreadable(path) => {
                write!(f, "could not read {}, keeping note", path.display())
            }
        }
    }
}

/// Result of [`Journal::append`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppendOutcome {
    /// The content was appended as a new section.
    Appended { path: PathBuf },
    /// The exact content already occurs in the note; nothing was written.
    Skipped { path: PathBuf },
}

impl AppendOutcome {
    pub fn path(&self) -> &Path {
        match self {
            Self::Appended { path } | Self::Skipped { path } => path,
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped { .. })
    }
}

/// What one run of the daily job did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyReport {
    pub date: NaiveDate,
    pub created: CreateOutcome,
    pub cleanup: CleanupOutcome,
}

/// The daily-notes journal rooted at one directory.
///
/// Cloning is cheap; clones share their note locks.
#[derive(Debug, Clone)]
pub struct Journal {
    layout: NoteLayout,
    locks: NoteLocks,
}

impl Journal {
    pub fn new(layout: NoteLayout) -> Self {
        Self {
            layout,
            locks: NoteLocks::new(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(NoteLayout::from_config(config))
    }

    pub fn layout(&self) -> &NoteLayout {
        &self.layout
    }

    /// Path of the note for `date`, whether or not it exists.
    pub fn note_path(&self, date: NaiveDate) -> PathBuf {
        self.layout.path_for(date)
    }

    /// Creates the note for `date`, carrying forward unfinished to-dos from
    /// the most recent earlier note.
    ///
    /// Idempotent: an existing note is never modified.
    ///
    /// # Errors
    ///
    /// Returns [`JournalError::Io`] if the note's directory or file cannot be
    /// written. Failing to read the previous note is not an error; the new
    /// note then starts with an empty to-do section.
    pub fn create_note(&self, date: NaiveDate) -> Result<CreateOutcome> {
        let path = self.note_path(date);
        self.locks.with_note(&path, || self.create_locked(date, &path))
    }

    fn create_locked(&self, date: NaiveDate, path: &Path) -> Result<CreateOutcome> {
        if path.exists() {
            info!(path = %path.display(), "Note for today already exists");
            return Ok(CreateOutcome::AlreadyExists(path.to_path_buf()));
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| JournalError::io(parent, e))?;
        }

        let carried = self.carried_todos(date);
        let content = render_new_note(date, &render_todo_lines(&carried));

        if !atomic::create_new(path, &content)? {
            info!(path = %path.display(), "Note appeared while preparing it, leaving it untouched");
            return Ok(CreateOutcome::AlreadyExists(path.to_path_buf()));
        }

        info!(
            path = %path.display(),
            carried = carried.len(),
            "Created daily note"
        );
        Ok(CreateOutcome::Created {
            path: path.to_path_buf(),
            carried: carried.len(),
        })
    }

    /// Carried-forward to-do lines for a new note on `date`; empty when there
    /// is no readable earlier note.
    fn carried_todos(&self, date: NaiveDate) -> Vec<String> {
        let previous = match find_predecessor(&self.layout, date) {
            Ok(Some(previous)) => previous,
            Ok(None) => {
                debug!(date = %date, "No previous note to carry to-dos from");
                return Vec::new();
            }
            Err(e) => {
                warn!(error = %e, "Failed to search for previous note");
                return Vec::new();
            }
        };

        let text = match fs::read_to_string(&previous.path) {
            Ok(text) => text,
            Err(e) => {
                warn!(
                    path = %previous.path.display(),
                    error = %e,
                    "Error reading last note, carrying no to-dos"
                );
                String::new()
            }
        };

        let todos = todo::parse(&text);
        debug!(
            source = %previous.path.display(),
            found = todos.len(),
            "Parsed unfinished to-dos"
        );
        carry_forward(&todos, &previous.stem)
    }

    /// Deletes the most recent note before `date` if it holds nothing but
    /// structural boilerplate.
    ///
    /// Requires the note for `date` to exist; otherwise this is a no-op that
    /// reports [`CleanupOutcome::TodayMissing`].
    ///
    /// # Errors
    ///
    /// Returns [`JournalError::Io`] only if a disposable note cannot be deleted.
    pub fn cleanup_before(&self, date: NaiveDate) -> Result<CleanupOutcome> {
        if !self.note_path(date).exists() {
            info!(date = %date, "Today's note does not exist, skipping cleanup");
            return Ok(CleanupOutcome::TodayMissing);
        }

        let previous = match find_predecessor(&self.layout, date) {
            Ok(Some(previous)) => previous,
            Ok(None) => {
                info!("No previous daily note to clean up");
                return Ok(CleanupOutcome::NoPredecessor);
            }
            Err(e) => {
                warn!(error = %e, "Failed to search for previous note, skipping cleanup");
                return Ok(CleanupOutcome::Unreadable(self.layout.root().to_path_buf()));
            }
        };

        let path = previous.path;
        self.locks.with_note(&path, || {
            let text = match fs::read_to_string(&path) {
                Ok(text) => text,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Error reading last note, keeping it");
                    return Ok(CleanupOutcome::Unreadable(path.clone()));
                }
            };

            if let Some(line) = first_unique_line(&text, &previous.stem) {
                info!(path = %path.display(), first_unique = %line, "Found unique information, keeping note");
                return Ok(CleanupOutcome::Retained(path.clone()));
            }

            fs::remove_file(&path).map_err(|e| JournalError::io(&path, e))?;
            info!(path = %path.display(), "No unique information found, deleted note");
            Ok(CleanupOutcome::Deleted(path.clone()))
        })
    }

    /// Appends `content` to the note for `date` as a new section, creating
    /// the note first if needed.
    ///
    /// If `content` already occurs verbatim anywhere in the note nothing is
    /// written and [`AppendOutcome::Skipped`] is returned. Empty content
    /// trivially occurs in every note and is always skipped.
    ///
    /// # Errors
    ///
    /// Returns [`JournalError::Io`] if the note cannot be created, read or
    /// written.
    pub fn append(&self, date: NaiveDate, content: &str) -> Result<AppendOutcome> {
        let path = self.note_path(date);
        self.locks.with_note(&path, || {
            if !path.exists() {
                self.create_locked(date, &path)?;
            }

            let existing = fs::read_to_string(&path).map_err(|e| JournalError::io(&path, e))?;
            if existing.contains(content) {
                info!(path = %path.display(), "Content already present, skipping append");
                return Ok(AppendOutcome::Skipped { path: path.clone() });
            }

            let section = render_section(&existing, content);
            atomic::replace(&path, &(existing + &section))?;

            info!(path = %path.display(), bytes = content.len(), "Appended content");
            Ok(AppendOutcome::Appended { path: path.clone() })
        })
    }

    /// The scheduled job: create the note for `date`, then clean up the one
    /// before it.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`Journal::create_note`] and
    /// [`Journal::cleanup_before`].
    pub fn run_daily(&self, date: NaiveDate) -> Result<DailyReport> {
        info!(date = %date, "Running daily job: creating note and cleaning up");
        let created = self.create_note(date)?;
        let cleanup = self.cleanup_before(date)?;
        Ok(DailyReport {
            date,
            created,
            cleanup,
        })
    }
}

/// Text to append so that `content` becomes a new section after `existing`:
/// a blank line, the separator, a blank line, then the content ending in a
/// newline.
fn render_section(existing: &str, content: &str) -> String {
    let lead = if existing.is_empty() || existing.ends_with('\n') {
        "\n"
    } else {
        "\n\n"
    };
    let tail = if content.ends_with('\n') { "" } else { "\n" };
    format!("{lead}{SECTION_SEPARATOR}\n\n{content}{tail}")
}

/// Runs a blocking journal operation on tokio's blocking pool.
///
/// # Errors
///
/// Returns the operation's own error, or [`JournalError::Task`] if the task
/// panicked or was cancelled.
pub async fn run_blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| JournalError::task(e.to_string()))?
}
