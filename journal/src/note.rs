//! Daily note naming scheme.
//!
//! A note for a calendar date lives at `root/YYYY/MM/YYYY-MM-DD.<ext>`. The
//! path is a pure function of the date, which is what keeps the journal at
//! one note per day.
//!
//! # Example
//!
//! ```
//! use std::path::Path;
//! use chrono::NaiveDate;
//! use daynote_journal::note::NoteLayout;
//!
//! let layout = NoteLayout::new("/home/me/ll", "md");
//! let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
//! assert_eq!(
//!     layout.path_for(date),
//!     Path::new("/home/me/ll/2024/01/2024-01-02.md")
//! );
//! assert_eq!(layout.date_stem_of(&layout.path_for(date)).as_deref(), Some("2024-01-02"));
//! ```

use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::config::Config;

/// `strftime` format of a note's date stem.
pub const DATE_STEM_FORMAT: &str = "%Y-%m-%d";

/// Heading that opens the to-do section of every note.
pub const TODO_HEADING: &str = "## todo";

/// Formats `date` as a note date stem (`YYYY-MM-DD`).
pub fn date_stem(date: NaiveDate) -> String {
    date.format(DATE_STEM_FORMAT).to_string()
}

/// Where daily notes live and what they are called.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteLayout {
    root: PathBuf,
    extension: String,
}

impl NoteLayout {
    pub fn new(root: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            extension: extension.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.root.clone(), config.extension.clone())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Path of the note for `date`.
    pub fn path_for(&self, date: NaiveDate) -> PathBuf {
        self.root
            .join(date.format("%Y").to_string())
            .join(date.format("%m").to_string())
            .join(format!("{}.{}", date_stem(date), self.extension))
    }

    /// Returns the date stem of `path` if it follows the naming scheme
    /// relative to this layout's root.
    ///
    /// The stem must sit under its own year and month directories. Only the
    /// digit pattern is checked, so `2024/13/2024-13-45.md` is accepted.
    pub fn date_stem_of(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(&self.root).ok()?;
        let mut components = relative.components();
        let year = components.next()?.as_os_str().to_str()?;
        let month = components.next()?.as_os_str().to_str()?;
        let file = components.next()?.as_os_str().to_str()?;
        if components.next().is_some() {
            return None;
        }

        if !is_digits(year, 4) || !is_digits(month, 2) {
            return None;
        }

        let stem = file
            .strip_suffix(self.extension.as_str())?
            .strip_suffix('.')?;
        let in_own_directory = is_date_stem(stem) && stem[..4] == *year && stem[5..7] == *month;
        in_own_directory.then(|| stem.to_string())
    }
}

fn is_digits(s: &str, len: usize) -> bool {
    s.len() == len && s.bytes().all(|b| b.is_ascii_digit())
}

/// Checks the `DDDD-DD-DD` shape of a date stem.
pub fn is_date_stem(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}

/// Splits note text into lines at `\n`, `\r\n` or a lone `\r`.
///
/// A `\r\n` pair also yields an empty piece between the two breaks, which
/// every caller treats as a blank line.
pub(crate) fn note_lines(text: &str) -> impl Iterator<Item = &str> {
    text.split(['\n', '\r'])
}

/// Initial content of a note: date heading, blank line, to-do heading, and
/// the carried-forward lines (already rendered, possibly empty).
pub fn render_new_note(date: NaiveDate, todo_lines: &str) -> String {
    format!("# {}\n\n{TODO_HEADING}\n{todo_lines}", date_stem(date))
}
