//! Carrying unfinished to-dos into a new note.
//!
//! Items that already name their origin date are copied unchanged, so a task
//! keeps showing the day it first appeared however many days it is carried.
//! Undated items are stamped with the date of the note they were found in.
//!
//! The result is sorted in descending byte order. With a fixed-width ISO date
//! right after the checkbox this puts newer tasks first; it is a plain string
//! sort, not a date comparison.

use crate::todo::ParsedTodo;

/// Produces the carried-forward to-do lines for a new note.
///
/// `source_stem` is the `YYYY-MM-DD` stem of the note the items came from.
///
/// # Example
///
/// ```
/// use daynote_journal::carry::carry_forward;
/// use daynote_journal::todo::parse;
///
/// let todos = parse("- [ ] buy milk\n- [ ] 2023-12-30: call mom\n- [ ]");
/// assert_eq!(
///     carry_forward(&todos, "2024-01-01"),
///     vec![
///         "- [ ] 2024-01-01: buy milk",
///         "- [ ] 2024-01-01:",
///         "- [ ] 2023-12-30: call mom",
///     ]
/// );
/// ```
pub fn carry_forward(todos: &[ParsedTodo], source_stem: &str) -> Vec<String> {
    let mut lines: Vec<String> = todos
        .iter()
        .map(|todo| {
            if todo.is_dated() {
                return todo.line.clone();
            }

            let prefix = todo.prefix.trim_end();
            if todo.task.is_empty() {
                format!("{prefix} {source_stem}:")
            } else {
                format!("{prefix} {source_stem}: {}", todo.task)
            }
        })
        .collect();

    lines.sort_unstable_by(|a, b| b.cmp(a));
    lines
}

/// Joins carried lines one per line. No trailing newline; empty for no items.
pub fn render_todo_lines(lines: &[String]) -> String {
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::todo::{parse, parse_line};

    #[test]
    fn dated_lines_are_copied_verbatim() {
        let original = "   -  [ ]  2023-11-02:   odd   spacing  ";
        let todos = vec![parse_line(original).unwrap()];
        assert_eq!(carry_forward(&todos, "2024-01-01"), vec![original]);
    }

    #[test]
    fn undated_lines_get_source_date() {
        let todos = vec![parse_line("  -  [ ]   water   plants  ").unwrap()];
        assert_eq!(
            carry_forward(&todos, "2024-01-01"),
            vec!["  -  [ ] 2024-01-01: water   plants"]
        );
    }

    #[test]
    fn empty_task_gets_bare_date_marker() {
        let todos = vec![parse_line("- [ ]   ").unwrap()];
        assert_eq!(carry_forward(&todos, "2024-01-01"), vec!["- [ ] 2024-01-01:"]);
    }

    #[test]
    fn output_is_sorted_descending() {
        let todos = parse(
            "- [ ] 2023-12-01: oldest\n- [ ] today item\n- [ ] 2023-12-31: recent\n- [ ] 2023-12-15: middle",
        );
        let lines = carry_forward(&todos, "2024-01-01");
        assert_eq!(
            lines,
            vec![
                "- [ ] 2024-01-01: today item",
                "- [ ] 2023-12-31: recent",
                "- [ ] 2023-12-15: middle",
                "- [ ] 2023-12-01: oldest",
            ]
        );
        assert!(lines.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn same_date_items_fall_back_to_string_order() {
        let todos = parse("- [ ] apples\n- [ ] zucchini\n- [ ] milk");
        assert_eq!(
            carry_forward(&todos, "2024-01-01"),
            vec![
                "- [ ] 2024-01-01: zucchini",
                "- [ ] 2024-01-01: milk",
                "- [ ] 2024-01-01: apples",
            ]
        );
    }

    #[test]
    fn no_items_render_empty() {
        let lines = carry_forward(&[], "2024-01-01");
        assert!(lines.is_empty());
        assert_eq!(render_todo_lines(&lines), "");
    }

    #[test]
    fn render_joins_without_trailing_newline() {
        let lines = vec!["- [ ] b".to_string(), "- [ ] a".to_string()];
        assert_eq!(render_todo_lines(&lines), "- [ ] b\n- [ ] a");
    }
}
