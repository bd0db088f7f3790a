//! To-do line parsing.
//!
//! A to-do line is `<indent>- [ ] <optional YYYY-MM-DD:> <task>`, with any
//! amount of whitespace (including none) around the dash and the brackets.
//! Every other line is ordinary note content and is ignored here.
//!
//! # Example
//!
//! ```
//! use daynote_journal::todo::parse;
//!
//! let todos = parse("# 2024-01-01\n\n## todo\n- [ ] buy milk\n- [ ] 2023-12-30: call mom\n- [x] done");
//! assert_eq!(todos.len(), 2);
//! assert_eq!(todos[0].task, "buy milk");
//! assert!(!todos[0].is_dated());
//! assert_eq!(todos[1].origin.as_deref(), Some("2023-12-30"));
//! ```

use std::sync::LazyLock;

use regex::Regex;

use crate::note::note_lines;

/// Groups: 1 = prefix through the checkbox and trailing whitespace,
/// 2 = optional `YYYY-MM-DD:` tag with its trailing whitespace, 3 = task text.
static TODO_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\s*-\s*\[\s*\]\s*)((?:[0-9]{4}-[0-9]{2}-[0-9]{2}:\s*)?)(.*)$")
        .expect("valid to-do line regex")
});

/// An unfinished to-do item read from a note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTodo {
    /// The full original line, byte for byte.
    pub line: String,
    /// Indentation, dash and checkbox, including trailing whitespace.
    pub prefix: String,
    /// Origin date tag without the colon, when present.
    pub origin: Option<String>,
    /// Task text, trimmed. May be empty.
    pub task: String,
}

impl ParsedTodo {
    /// Whether the item already carries its origin date.
    pub fn is_dated(&self) -> bool {
        self.origin.is_some()
    }
}

/// Parses a single line, returning `None` if it is not an unfinished to-do.
pub fn parse_line(line: &str) -> Option<ParsedTodo> {
    let caps = TODO_LINE_RE.captures(line)?;
    let prefix = caps.get(1).map_or("", |m| m.as_str());
    let tag = caps.get(2).map_or("", |m| m.as_str());
    let task = caps.get(3).map_or("", |m| m.as_str());

    let origin = (!tag.is_empty()).then(|| tag[..10].to_string());

    Some(ParsedTodo {
        line: line.to_string(),
        prefix: prefix.to_string(),
        origin,
        task: task.trim().to_string(),
    })
}

/// Extracts every unfinished to-do from `text`, in document order.
pub fn parse(text: &str) -> Vec<ParsedTodo> {
    note_lines(text).filter_map(parse_line).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_undated_item() {
        let todo = parse_line("- [ ] buy milk").unwrap();
        assert_eq!(todo.prefix, "- [ ] ");
        assert_eq!(todo.origin, None);
        assert_eq!(todo.task, "buy milk");
        assert_eq!(todo.line, "- [ ] buy milk");
    }

    #[test]
    fn parses_dated_item() {
        let todo = parse_line("  - [ ] 2023-12-30: call mom  ").unwrap();
        assert_eq!(todo.prefix, "  - [ ] ");
        assert_eq!(todo.origin.as_deref(), Some("2023-12-30"));
        assert_eq!(todo.task, "call mom");
        assert_eq!(todo.line, "  - [ ] 2023-12-30: call mom  ");
    }

    #[test]
    fn accepts_loose_whitespace_around_checkbox() {
        let todo = parse_line("\t-[  ]   water plants").unwrap();
        assert_eq!(todo.prefix, "\t-[  ]   ");
        assert_eq!(todo.task, "water plants");

        let todo = parse_line("-[]x").unwrap();
        assert_eq!(todo.prefix, "-[]");
        assert_eq!(todo.task, "x");
    }

    #[test]
    fn keeps_empty_task() {
        let todo = parse_line("- [ ]").unwrap();
        assert_eq!(todo.prefix, "- [ ]");
        assert_eq!(todo.task, "");
        assert!(!todo.is_dated());

        let todo = parse_line("- [ ] 2024-01-01:").unwrap();
        assert!(todo.is_dated());
        assert_eq!(todo.task, "");
    }

    #[test]
    fn date_tag_is_syntactic_only() {
        let todo = parse_line("- [ ] 2024-13-45: impossible date").unwrap();
        assert_eq!(todo.origin.as_deref(), Some("2024-13-45"));
    }

    #[test]
    fn date_without_colon_is_task_text() {
        let todo = parse_line("- [ ] 2024-01-01 no colon").unwrap();
        assert_eq!(todo.origin, None);
        assert_eq!(todo.task, "2024-01-01 no colon");
    }

    #[test]
    fn ignores_non_todo_lines() {
        assert!(parse_line("- [x] done").is_none());
        assert!(parse_line("# 2024-01-01").is_none());
        assert!(parse_line("plain text - [ ] inside").is_none());
        assert!(parse_line("* [ ] star bullet").is_none());
        assert!(parse_line("").is_none());
    }

    #[test]
    fn parse_preserves_document_order() {
        let text = "# 2024-01-01\r\n\r\n## todo\r\n- [ ] b\r\nnotes\r\n- [ ] a\r\n";
        let tasks: Vec<_> = parse(text).into_iter().map(|t| t.task).collect();
        assert_eq!(tasks, vec!["b", "a"]);
    }

    #[test]
    fn parse_splits_on_lone_carriage_returns() {
        let text = "# 2024-01-01\r## todo\r- [ ] buy milk\r- [ ] 2023-12-30: call mom\r";
        let todos = parse(text);
        assert_eq!(todos.len(), 2);
        assert_eq!(todos[0].line, "- [ ] buy milk");
        assert_eq!(todos[0].task, "buy milk");
        assert_eq!(todos[1].origin.as_deref(), Some("2023-12-30"));
        assert_eq!(todos[1].task, "call mom");
    }
}
