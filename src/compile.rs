//! The built-in expression language.
//!
//! Expression text, everything between `@{` and its matching `}`, is read by
//! the [`Lexer`][`lex::Lexer`] as tokens and assembled by the
//! [`Parser`][`parse::Parser`] into an [`Expression`] tree, which the
//! [`Engine`][`crate::Engine`] then evaluates.
mod lex;
mod parse;

pub use crate::compile::{
    lex::token::Token,
    parse::{tree, Parser},
};

use crate::log::Error;
use std::fmt::Display;
use tree::Expression;

/// Compile expression text into an [`Expression`].
///
/// # Examples
///
/// ```
/// use ribosome::compile;
///
/// assert!(compile("person.name | upper").is_ok());
/// assert!(compile("person.").is_err());
/// ```
pub fn compile(text: &str) -> Result<Expression, Error> {
    Parser::new(text).parse()
}

/// Operators recognized by the Lexer and Parser.
#[derive(Debug, PartialEq, Copy, Clone)]
pub enum Operator {
    /// +
    Add,
    /// -
    Subtract,
    /// *
    Multiply,
    /// /
    Divide,
    /// >
    Greater,
    /// <
    Lesser,
    /// ==
    Equal,
    /// !=
    NotEqual,
    /// >=
    GreaterOrEqual,
    /// <=
    LesserOrEqual,
    /// &&
    And,
    /// ||
    Or,
}

impl Operator {
    /// Return true if the [`Operator`] compares two values.
    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            Operator::Greater
                | Operator::Lesser
                | Operator::Equal
                | Operator::NotEqual
                | Operator::GreaterOrEqual
                | Operator::LesserOrEqual
        )
    }
}

impl Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operator::Add => write!(f, "+"),
            Operator::Subtract => write!(f, "-"),
            Operator::Multiply => write!(f, "*"),
            Operator::Divide => write!(f, "/"),
            Operator::Greater => write!(f, ">"),
            Operator::Lesser => write!(f, "<"),
            Operator::Equal => write!(f, "=="),
            Operator::NotEqual => write!(f, "!="),
            Operator::GreaterOrEqual => write!(f, ">="),
            Operator::LesserOrEqual => write!(f, "<="),
            Operator::And => write!(f, "&&"),
            Operator::Or => write!(f, "||"),
        }
    }
}
