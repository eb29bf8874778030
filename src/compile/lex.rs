pub mod token;

use crate::{
    compile::{lex::token::Token, Operator},
    log::{expected_operator, Error, INVALID_SYNTAX, UNEXPECTED_TOKEN},
    region::Region,
};

/// The result of reading one [`Token`].
pub type LexResult = Result<Option<(Token, Region)>, Error>;

/// Provides methods to read expression text as [`Token`] instances.
pub struct Lexer<'source> {
    /// Reference to the source text.
    pub source: &'source str,
    /// Position within source.
    pub cursor: usize,
}

impl<'source> Lexer<'source> {
    /// Create a new [`Lexer`] over the given expression text.
    #[inline]
    pub fn new(source: &'source str) -> Self {
        Self { source, cursor: 0 }
    }

    /// Return the next [`Token`] and [`Region`].
    ///
    /// Any instance of [`Token::Whitespace`] is ignored.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when an unexpected character is found.
    pub fn next(&mut self) -> LexResult {
        loop {
            if self.source[self.cursor..].is_empty() {
                return Ok(None);
            }

            return match self.lex(self.cursor)? {
                Some((Token::Whitespace, _)) => continue,
                other => Ok(other),
            };
        }
    }

    /// Return the [`Token`] and [`Region`] beginning at the given position.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when an unexpected character is found.
    fn lex(&mut self, from: usize) -> LexResult {
        let mut advance = |length: usize, data: Token| {
            self.cursor += length;

            Ok(Some((data, (from..from + length).into())))
        };

        let mut iterator = self.source[from..]
            .char_indices()
            .map(|(d, c)| (from + d, c));
        let (index, char) = iterator
            .next()
            .expect("lexer must not read past the end of source");

        match char {
            '*' => advance(1, Token::Operator(Operator::Multiply)),
            '+' => advance(1, Token::Operator(Operator::Add)),
            '/' => advance(1, Token::Operator(Operator::Divide)),
            '-' => advance(1, Token::Operator(Operator::Subtract)),
            '.' => advance(1, Token::Period),
            ',' => advance(1, Token::Comma),
            ':' => advance(1, Token::Colon),
            '(' => advance(1, Token::LeftParen),
            ')' => advance(1, Token::RightParen),
            '"' => self.lex_string(iterator, index),
            '=' | '!' | '>' | '<' | '|' | '&' => self.lex_operator(iterator, index, char),
            c if c.is_whitespace() => Ok(Some(self.lex_whitespace(iterator, index))),
            c if c.is_ascii_digit() => Ok(Some(self.lex_digit(iterator, index))),
            c if is_ident_start(c) => Ok(Some(self.lex_ident_or_keyword(iterator, index))),
            _ => Err(Error::build(UNEXPECTED_TOKEN)
                .with_pointer(self.source, index..index + char.len_utf8())
                .with_help(
                    "expected one of `*`, `+`, `/`, `-`, `.`, `:`, `(`, `)`, an identifier, \
                    an ascii digit, or beginning of a string literal marked with `\"`",
                )),
        }
    }

    /// Return a [`Token`] and [`Region`] based on the previous character.
    ///
    /// Checks the next character via `.next` to ensure the correct `Token` is
    /// returned. All of these are recognized:
    ///
    /// `==`, `!=`, `>=`, `<=`, `||`, `&&`, `=`, `|`, `!`, `>`, `<`
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when an unexpected [`Token`] is found.
    fn lex_operator<T>(&mut self, mut iter: T, from: usize, previous: char) -> LexResult
    where
        T: Iterator<Item = (usize, char)>,
    {
        let (position, token) = match (previous, iter.next()) {
            // Double:
            ('=', Some((usize, '='))) => (usize, Token::Operator(Operator::Equal)),
            ('!', Some((usize, '='))) => (usize, Token::Operator(Operator::NotEqual)),
            ('>', Some((usize, '='))) => (usize, Token::Operator(Operator::GreaterOrEqual)),
            ('<', Some((usize, '='))) => (usize, Token::Operator(Operator::LesserOrEqual)),
            ('|', Some((usize, '|'))) => (usize, Token::Operator(Operator::Or)),
            ('&', Some((usize, '&'))) => (usize, Token::Operator(Operator::And)),
            // Single:
            ('=', _) => (from, Token::Assign),
            ('|', _) => (from, Token::Pipe),
            ('!', _) => (from, Token::Exclamation),
            ('>', _) => (from, Token::Operator(Operator::Greater)),
            ('<', _) => (from, Token::Operator(Operator::Lesser)),
            _ => {
                return Err(Error::build(UNEXPECTED_TOKEN)
                    .with_pointer(self.source, from..from + 1)
                    .with_help(expected_operator(previous)));
            }
        };
        let position = position + 1;
        self.cursor = position;

        Ok(Some((token, (from..position).into())))
    }

    /// Return a [`Token`] and [`Region`] containing [`Token::Number`].
    fn lex_digit<T>(&mut self, mut iter: T, from: usize) -> (Token, Region)
    where
        T: Iterator<Item = (usize, char)>,
    {
        loop {
            match iter.next() {
                Some((index, char)) if !is_number(char) => {
                    self.cursor = index;

                    break (Token::Number, (from..index).into());
                }
                Some((_, _)) => continue,
                None => {
                    self.cursor = self.source.len();

                    break (Token::Number, (from..self.source.len()).into());
                }
            }
        }
    }

    /// Return a [`Token`] and [`Region`] containing [`Token::Whitespace`].
    fn lex_whitespace<T>(&mut self, mut iter: T, from: usize) -> (Token, Region)
    where
        T: Iterator<Item = (usize, char)>,
    {
        loop {
            match iter.next() {
                Some((index, char)) if !char.is_whitespace() => {
                    self.cursor = index;

                    break (Token::Whitespace, (from..index).into());
                }
                Some((_, _)) => continue,
                None => {
                    self.cursor = self.source.len();

                    break (Token::Whitespace, (from..self.source.len()).into());
                }
            }
        }
    }

    /// Return a [`Token`] and [`Region`] containing [`Token::String`] using
    /// the given iterator.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when the string is never closed.
    fn lex_string<T>(&mut self, mut iter: T, from: usize) -> LexResult
    where
        T: Iterator<Item = (usize, char)>,
    {
        let mut escaped = false;
        loop {
            match iter.next() {
                Some((index, '"')) if !escaped => {
                    // Add one to the index of the character to comply with string slice
                    // semantics.
                    let to = index + 1;
                    self.cursor = to;

                    return Ok(Some((Token::String, (from..to).into())));
                }
                Some((_, char)) => {
                    escaped = char == '\\' && !escaped;
                }
                None => {
                    return Err(Error::build(INVALID_SYNTAX)
                        .with_pointer(self.source, from..self.source.len())
                        .with_help(
                            "this might be an undelimited string, try closing it with `\"`",
                        ));
                }
            }
        }
    }

    /// Return a [`Token`] and [`Region`] from the given iterator.
    ///
    /// The `Token` will be [`Token::Identifier`], or one of the literal
    /// keywords `true`, `false` and `null`.
    fn lex_ident_or_keyword<T>(&mut self, mut iter: T, from: usize) -> (Token, Region)
    where
        T: Iterator<Item = (usize, char)>,
    {
        let mut check_keyword = |to: usize| {
            let token = match &self.source[from..to] {
                "true" => Token::True,
                "false" => Token::False,
                "null" => Token::Null,
                _ => Token::Identifier,
            };
            self.cursor = to;

            (token, (from..to).into())
        };

        loop {
            match iter.next() {
                Some((index, char)) if !is_ident_continue(char) => {
                    break check_keyword(index);
                }
                Some((_, _)) => continue,
                None => break check_keyword(self.source.len()),
            }
        }
    }
}

/// Return true if the given character is a recognized beginning identifier,
/// meaning '_' or an `xid_start`.
fn is_ident_start(c: char) -> bool {
    c == '_' || unicode_ident::is_xid_start(c)
}

/// Return true if the given character is a recognized continue identifier,
/// meaning an `xid_continue`.
fn is_ident_continue(c: char) -> bool {
    unicode_ident::is_xid_continue(c)
}

/// Return true if the given character is a number (0-9) or a period.
fn is_number(c: char) -> bool {
    matches!(c, '0'..='9' | '.')
}

#[cfg(test)]
mod tests {
    use super::Lexer;
    use crate::{
        compile::{lex::token::Token, Operator},
        region::Region,
    };

    #[test]
    fn test_lex_digit() {
        helper_lex_next_auto(" 10 2.5", vec![(Token::Number, 1..3), (Token::Number, 4..7)]);
    }

    #[test]
    fn test_lex_ident() {
        let expect = vec![
            (Token::Identifier, 0..6),
            (Token::Period, 6..7),
            (Token::Identifier, 7..11),
        ];

        helper_lex_next_auto("person.name", expect);
    }

    #[test]
    fn test_lex_keywords() {
        let expect = vec![
            (Token::True, 0..4),
            (Token::False, 5..10),
            (Token::Null, 11..15),
            (Token::Identifier, 16..22),
        ];

        helper_lex_next_auto("true false null truthy", expect);
    }

    #[test]
    fn test_lex_operators() {
        let expect = vec![
            (Token::Number, 0..1),
            (Token::Operator(Operator::Add), 1..2),
            (Token::Number, 2..3),
            (Token::Operator(Operator::GreaterOrEqual), 4..6),
            (Token::Identifier, 7..8),
            (Token::Operator(Operator::And), 9..11),
            (Token::Exclamation, 12..13),
            (Token::Identifier, 13..14),
            (Token::Pipe, 15..16),
            (Token::Identifier, 17..18),
        ];

        helper_lex_next_auto("1+2 >= a && !b | f", expect);
    }

    #[test]
    fn test_lex_parens() {
        let expect = vec![
            (Token::LeftParen, 0..1),
            (Token::Identifier, 1..2),
            (Token::RightParen, 2..3),
        ];

        helper_lex_next_auto("(a)", expect);
    }

    #[test]
    fn test_lex_string() {
        helper_lex_next_auto("\"name\"", vec![(Token::String, 0..6)]);
    }

    #[test]
    fn test_lex_string_escape() {
        helper_lex_next_auto(r#" "\"name\"" "#, vec![(Token::String, 1..11)]);
        helper_lex_next_auto(r#""a\\" b"#, vec![(Token::String, 0..5), (Token::Identifier, 6..7)]);
    }

    #[test]
    fn test_lex_unclosed_string() {
        let mut lexer = Lexer::new("\"never closed");

        assert!(lexer.next().is_err());
    }

    #[test]
    fn test_lex_unexpected_character() {
        let mut lexer = Lexer::new("a { b }");

        assert_eq!(lexer.next(), Ok(Some((Token::Identifier, (0..1).into()))));
        assert!(lexer.next().is_err());
    }

    /// Helper function which takes in a source string, creates a lexer on that
    /// string and iterates [expect.len()] amount of times and compares the result
    /// against [lexer.next()].
    fn helper_lex_next_auto<T>(source: &str, expect: Vec<(Token, T)>)
    where
        T: Into<Region>,
    {
        let mut lexer = Lexer::new(source);
        for (token, region) in expect {
            assert_eq!(lexer.next(), Ok(Some((token, region.into()))))
        }

        assert_eq!(lexer.next(), Ok(None));
        assert_eq!(lexer.next(), Ok(None));
    }
}
