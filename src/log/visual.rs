mod pointer;

pub use pointer::Pointer;

use std::fmt::{Debug, Formatter, Result};

const BLANK: &str = "";
const PIPE: &str = "|";
const EQUAL: &str = "=";
const HIGHLIGHT: &str = "^";

/// Describes a type that can be associated with an Error and used
/// to print a visualization.
pub trait Visual: Debug {
    /// Display the visualization by writing to the given Formatter.
    fn display(
        &self,
        formatter: &mut Formatter<'_>,
        template: Option<&str>,
        help: Option<&str>,
    ) -> Result;
}

/// Get the zero indexed line and display column for the given byte offset.
fn get_line_and_column(lines: &[&str], offset: usize) -> (usize, usize) {
    let mut n = 0;

    for (i, line) in lines.iter().enumerate() {
        let len = line.len() + 1;
        if n + len > offset {
            let prefix = line.get(..offset - n).unwrap_or(line);
            return (i, get_width(prefix));
        }
        n += len;
    }

    let length = lines.len().saturating_sub(1);
    let last = lines.last().map(|line| get_width(line)).unwrap_or(0);

    (length, last)
}

/// Wrapper for UnicodeWidthStr::width.
fn get_width(s: &str) -> usize {
    unicode_width::UnicodeWidthStr::width(s)
}

#[cfg(test)]
mod tests {
    use super::get_line_and_column;

    #[test]
    fn test_line_and_column() {
        let lines = vec!["first", "second line", "third"];

        assert_eq!(get_line_and_column(&lines, 0), (0, 0));
        assert_eq!(get_line_and_column(&lines, 8), (1, 2));
        assert_eq!(get_line_and_column(&lines, 18), (2, 0));
    }

    #[test]
    fn test_line_and_column_past_end() {
        let lines = vec!["only"];

        assert_eq!(get_line_and_column(&lines, 40), (0, 4));
    }
}
