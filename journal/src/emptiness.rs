//! Deciding whether a note holds anything worth keeping.
//!
//! A line is structural when, after trimming, it is blank, the `## todo`
//! heading, the note's own date heading, a completed to-do (`- [x]`), or an
//! unfinished to-do. Unfinished to-dos count as structural because they have
//! already been carried into the next note.

use std::sync::LazyLock;

use regex::Regex;

use crate::note::{note_lines, TODO_HEADING};

static UNFINISHED_TODO_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*-\s*\[\s*\]").expect("valid unfinished to-do regex"));

const COMPLETED_TODO_MARKER: &str = "- [x]";

fn is_structural(line: &str, date_heading: &str) -> bool {
    let line = line.trim();
    line.is_empty()
        || line == TODO_HEADING
        || line.starts_with(date_heading)
        || line.starts_with(COMPLETED_TODO_MARKER)
        || UNFINISHED_TODO_RE.is_match(line)
}

/// Returns the first line that is not structural boilerplate, if any.
pub fn first_unique_line<'a>(text: &'a str, date_stem: &str) -> Option<&'a str> {
    let date_heading = format!("# {date_stem}");
    note_lines(text).find(|line| !is_structural(line, &date_heading))
}

/// Whether the note for `date_stem` with content `text` can be deleted
/// without losing information.
///
/// # Example
///
/// ```
/// use daynote_journal::emptiness::is_disposable;
///
/// let note = "# 2024-01-01\n\n## todo\n- [ ] buy milk\n- [x] done thing\n";
/// assert!(is_disposable(note, "2024-01-01"));
/// assert!(!is_disposable(&format!("{note}meeting notes: discussed X\n"), "2024-01-01"));
/// ```
pub fn is_disposable(text: &str, date_stem: &str) -> bool {
    first_unique_line(text, date_stem).is_none()
}
