//! Indentation normalization for multi-line blocks of expanded text.

/// Return true if the line holds nothing but whitespace.
fn is_blank(line: &str) -> bool {
    line.trim_start_matches(is_space).is_empty()
}

/// Return the width of the leading whitespace of the line, not counting
/// the line terminator.
fn margin(line: &str) -> usize {
    let rest = line.trim_start_matches(|c: char| is_space(c) && c != '\n' && c != '\r');
    line.len() - rest.len()
}

fn is_space(c: char) -> bool {
    c.is_ascii_whitespace() || c == '\0'
}

/// Re-indent a block of text so that its least indented line begins at
/// `column`.
///
/// Leading and trailing blank lines are dropped, the margin shared by the
/// remaining lines is removed and replaced with `column` spaces, and a single
/// trailing newline is stripped. Relative indentation within the block is
/// kept.
///
/// # Examples
///
/// ```
/// use ribosome::adjust;
///
/// let block = "\n    if (x) {\n        y();\n    }\n\n";
///
/// assert_eq!(adjust(block, 2), "  if (x) {\n      y();\n  }");
/// ```
pub fn adjust(text: &str, column: usize) -> String {
    let lines: Vec<&str> = text.split_inclusive('\n').collect();

    let mut bounds: Option<(usize, usize)> = None;
    let mut left = usize::MAX;
    for (index, line) in lines.iter().enumerate() {
        if is_blank(line) {
            continue;
        }
        bounds = match bounds {
            Some((top, _)) => Some((top, index)),
            None => Some((index, index)),
        };
        left = left.min(margin(line));
    }

    let Some((top, bottom)) = bounds else {
        return String::new();
    };

    let indent = " ".repeat(column);
    let mut result = String::with_capacity(text.len() + column * (bottom - top + 1));
    for line in &lines[top..=bottom] {
        // Blank lines inside of the block may be narrower than the margin.
        let strip = left.min(margin(line));
        result.push_str(&indent);
        result.push_str(&line[strip..]);
    }

    if result.ends_with('\n') {
        result.pop();
    }

    result
}
