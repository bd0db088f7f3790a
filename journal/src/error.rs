//! Error types for the daynote journal.
//!
//! Only failures that must be visible to the caller are errors here. Advisory
//! conditions (an unreadable previous note, cleanup without today's note) are
//! reported through outcome enums and `tracing` diagnostics instead.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors that can occur during journal operations.
///
/// # Examples
///
/// ```
/// use std::io;
/// use daynote_journal::error::JournalError;
///
/// let err = JournalError::io("/tmp/ll/2024/01/2024-01-02.md", io::Error::other("disk full"));
/// assert!(err.to_string().contains("2024-01-02.md"));
/// ```
#[derive(Error, Debug)]
pub enum JournalError {
    /// File system I/O error on a specific path.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// The path being read, written or scanned.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: io::Error,
    },

    /// A blocking journal task panicked or was cancelled.
    #[error("journal task failed: {0}")]
    Task(String),
}

impl JournalError {
    /// Creates an I/O error tagged with the path it occurred on.
    pub fn io(path: impl AsRef<Path>, source: io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Creates a task failure error.
    pub fn task(message: impl Into<String>) -> Self {
        Self::Task(message.into())
    }
}

/// A specialized `Result` type for journal operations.
pub type Result<T> = std::result::Result<T, JournalError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn io_error_displays_path_and_cause() {
        let err = JournalError::io(
            "/notes/2024/01/2024-01-02.md",
            io::Error::new(io::ErrorKind::PermissionDenied, "permission denied"),
        );
        assert_eq!(
            err.to_string(),
            "I/O error on /notes/2024/01/2024-01-02.md: permission denied"
        );
    }

    #[test]
    fn io_error_exposes_source() {
        let err = JournalError::io("/x", io::Error::other("boom"));
        assert_eq!(err.source().unwrap().to_string(), "boom");
    }

    #[test]
    fn task_error_displays_message() {
        let err = JournalError::task("join error");
        assert_eq!(err.to_string(), "journal task failed: join error");
    }
}
