use std::{
    cmp::max,
    fmt::{Formatter, Result},
};

use super::{
    super::{RESET, YELLOW},
    {get_line_and_column, get_width, Visual, BLANK, EQUAL, HIGHLIGHT, PIPE},
};
use crate::region::Region;

/// A type of `Visual` that points to a specific location within source text.
#[derive(Debug, PartialEq)]
pub struct Pointer {
    /// The line that the Pointer is pointing to.
    ///
    /// This number should be zero indexed.
    line: usize,
    /// The column that the Pointer is pointing to.
    ///
    /// This number should be zero indexed.
    column: usize,
    /// The length of the object being highlighted.
    length: usize,
    /// The actual line of text that is being pointed to.
    text: String,
}

impl Pointer {
    /// Create a new Visual over the given source text and Region.
    pub fn new(source: &str, region: Region) -> Self {
        let lines: Vec<_> = source.split_terminator('\n').collect();
        let (line, column) = get_line_and_column(&lines, region.begin);
        let highlighted = source.get(region.begin..region.end).unwrap_or_default();
        let length = max(1, get_width(highlighted));
        let text = lines
            .get(line)
            .or_else(|| lines.last())
            .map(|text| text.to_string())
            .unwrap_or_default();

        Self {
            line,
            column,
            length,
            text,
        }
    }

    /// Return the one indexed line that the [`Pointer`] points to.
    pub fn line_number(&self) -> usize {
        self.line + 1
    }
}

impl Visual for Pointer {
    fn display(
        &self,
        formatter: &mut Formatter<'_>,
        template: Option<&str>,
        help: Option<&str>,
    ) -> Result {
        let num = (self.line + 1).to_string();
        let col = self.column + 1;
        let pad = get_width(&num);
        let align = self.column + self.length;

        let extra = "-".repeat(3_usize.saturating_sub(self.length));
        let name = template.unwrap_or("?");
        let text = &self.text;
        let underline = HIGHLIGHT.repeat(self.length);

        write!(
            formatter,
            "\n {BLANK:pad$}--> {name}:{num}:{col}\
             \n {BLANK:pad$} {PIPE}\
             \n {num:>} {PIPE} {text}\
             \n {BLANK:pad$} {PIPE} {YELLOW}{underline:>align$}{RESET}{extra}\
             \n {BLANK:pad$} {PIPE}\n",
        )?;

        if let Some(help) = help {
            writeln!(formatter, "{BLANK:pad$} {EQUAL} help: {help}")?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::Pointer;

    #[test]
    fn test_pointer_second_line() {
        let source = "first\n!output\nthird";
        let pointer = Pointer::new(source, (7..13).into());

        assert_eq!(pointer.line_number(), 2);
        assert_eq!(pointer.text, "!output");
        assert_eq!(pointer.column, 1);
        assert_eq!(pointer.length, 6);
    }

    #[test]
    fn test_pointer_empty_source() {
        let pointer = Pointer::new("", (0..0).into());

        assert_eq!(pointer.line_number(), 1);
        assert_eq!(pointer.text, "");
        assert_eq!(pointer.length, 1);
    }
}
