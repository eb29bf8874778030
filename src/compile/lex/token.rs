use crate::compile::Operator;
use std::fmt::Display;

/// Types emitted by the Lexer.
///
/// An abstraction over raw text to make construction of Tree types easier.
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum Token {
    /// String literal.
    String,
    /// Number.
    Number,
    /// Identifier (unquoted string).
    Identifier,
    /// Whitespace.
    Whitespace,
    /// .
    Period,
    /// ,
    Comma,
    /// :
    Colon,
    /// |
    Pipe,
    /// =
    Assign,
    /// !
    Exclamation,
    /// (
    LeftParen,
    /// )
    RightParen,
    /// A boolean true.
    True,
    /// A boolean false.
    False,
    /// The null value.
    Null,
    /// Describes an action taken on two values.
    Operator(Operator),
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::String => write!(f, "string"),
            Token::Number => write!(f, "number"),
            Token::Identifier => write!(f, "identifier"),
            Token::Whitespace => write!(f, "whitespace"),
            Token::Period => write!(f, "period (.)"),
            Token::Comma => write!(f, "comma (,)"),
            Token::Colon => write!(f, "colon (:)"),
            Token::Pipe => write!(f, "pipe (|)"),
            Token::Assign => write!(f, "assign (=)"),
            Token::Exclamation => write!(f, "exclamation (!)"),
            Token::LeftParen => write!(f, "left parenthesis (()"),
            Token::RightParen => write!(f, "right parenthesis ())"),
            Token::True => write!(f, "true"),
            Token::False => write!(f, "false"),
            Token::Null => write!(f, "null"),
            Token::Operator(operator) => write!(f, "operator {operator}"),
        }
    }
}
