use crate::{
    log::{Error, UNTERMINATED_EXPRESSION},
    region::Region,
};

/// Marks the beginning of an embedded expression.
pub const OPEN: &str = "@{";

/// Locates embedded expressions, `@{ ... }`, within a text fragment.
///
/// Yields the [`Region`] of each full marker, from `@` up to and including
/// the matching `}`. Braces inside of the expression are balanced, so the
/// expression `@{ {1, 2}.len }` ends at the final brace rather than the first.
///
/// # Examples
///
/// ```
/// use ribosome::{Region, Scanner};
///
/// let found: Vec<Region> = Scanner::new("a @{ {x} } b @{y}")
///     .collect::<Result<_, _>>()
///     .unwrap();
///
/// assert_eq!(found, vec![Region::new(2..10), Region::new(13..17)]);
/// ```
pub struct Scanner<'source> {
    /// The fragment being scanned.
    source: &'source str,
    /// Position within source.
    cursor: usize,
}

impl<'source> Scanner<'source> {
    /// Create a new [`Scanner`] over the given fragment.
    #[inline]
    pub fn new(source: &'source str) -> Self {
        Self { source, cursor: 0 }
    }

    /// Return the [`Region`] of the next marker, if any.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when an opening marker has no matching close.
    fn next_marker(&mut self) -> Result<Option<Region>, Error> {
        let begin = match self.source[self.cursor..].find(OPEN) {
            Some(offset) => self.cursor + offset,
            None => {
                self.cursor = self.source.len();
                return Ok(None);
            }
        };

        // The counter starts on the brace of the marker itself.
        let mut depth = 0_usize;
        for (index, byte) in self.source.as_bytes().iter().enumerate().skip(begin + 1) {
            match byte {
                b'{' => depth += 1,
                b'}' => depth -= 1,
                _ => continue,
            }
            if depth == 0 {
                self.cursor = index + 1;
                return Ok(Some((begin..index + 1).into()));
            }
        }

        self.cursor = self.source.len();
        Err(Error::build(UNTERMINATED_EXPRESSION)
            .with_pointer(self.source, begin..begin + OPEN.len())
            .with_help("expression is never closed, add a matching `}`"))
    }
}

impl Iterator for Scanner<'_> {
    type Item = Result<Region, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor >= self.source.len() {
            return None;
        }

        self.next_marker().transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::Scanner;
    use crate::{log::UNTERMINATED_EXPRESSION, region::Region};

    fn scan(source: &str) -> Vec<Region> {
        Scanner::new(source)
            .collect::<Result<_, _>>()
            .expect("scan should succeed")
    }

    #[test]
    fn test_no_markers() {
        assert!(scan("hello").is_empty());
        assert!(scan("").is_empty());
        assert!(scan("a { b } @ c").is_empty());
    }

    #[test]
    fn test_single_marker() {
        let source = "int @{name} = 0;";
        let found = scan(source);

        assert_eq!(found, vec![Region::new(4..11)]);
        assert_eq!(found[0].inner(2, 1).literal(source), "name");
    }

    #[test]
    fn test_balanced_braces() {
        let source = "x @{ {1, 2}.size } y";
        let found = scan(source);

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].inner(2, 1).literal(source), " {1, 2}.size ");
    }

    #[test]
    fn test_nested_marker_is_one_expression() {
        let source = "a@{1+@{2}}b";
        let found = scan(source);

        assert_eq!(found, vec![Region::new(1..10)]);
        assert_eq!(found[0].inner(2, 1).literal(source), "1+@{2}");
    }

    #[test]
    fn test_adjacent_markers() {
        let source = "@{a}@{b}";

        assert_eq!(scan(source), vec![Region::new(0..4), Region::new(4..8)]);
    }

    #[test]
    fn test_unterminated() {
        let mut scanner = Scanner::new("ok @{a} then @{ {b} ");
        assert_eq!(scanner.next(), Some(Ok(Region::new(3..7))));

        let error = scanner.next().unwrap().unwrap_err();
        assert_eq!(error.get_reason(), UNTERMINATED_EXPRESSION);
        assert!(scanner.next().is_none());
    }
}
