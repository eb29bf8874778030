use super::Error;
use std::fmt::Display;

pub const UNEXPECTED_TOKEN: &str = "unexpected token";
pub const UNEXPECTED_EOF: &str = "unexpected eof";
pub const INVALID_SYNTAX: &str = "invalid syntax";
pub const INVALID_FILTER: &str = "invalid filter";
pub const INCOMPATIBLE_TYPES: &str = "incompatible types";
pub const UNDEFINED_VARIABLE: &str = "undefined variable";
pub const UNTERMINATED_EXPRESSION: &str = "unterminated expression";
pub const INVALID_COMMAND: &str = "invalid command";
pub const INVALID_ARGUMENTS: &str = "invalid arguments";
pub const NESTED_COMMAND: &str = "nested command";
pub const UNSUPPORTED_INPUT: &str = "unsupported input";
pub const IO_FAILURE: &str = "io failure";

/// Return an [`Error`] explaining that the end of source was not expected.
pub fn error_eof(source: &str) -> Error {
    let source_len = source.len();
    Error::build(UNEXPECTED_EOF)
        .with_pointer(source, source_len..source_len)
        .with_help("expected additional tokens, did you finish the expression?")
}

/// Return an [`Error`] describing a failed operation on the output destination.
pub fn error_io<T>(target: &str, error: T) -> Error
where
    T: Display,
{
    Error::build(IO_FAILURE).with_help(format!("`{target}`: {error}"))
}

/// Return an [`Error`] describing a command used inside of an expression.
pub fn error_nested(command: &str) -> Error {
    Error::build(NESTED_COMMAND).with_help(format!(
        "command `{command}` used in a nested function, \
        redirection is only allowed in the outermost scope"
    ))
}

/// Return a string describing an unexpected operator.
pub fn expected_operator<T>(received: T) -> String
where
    T: Display,
{
    format!(
        "expected operator like `+`, `-`, `*`, `/`, `==`, `!=`, `>=`, `<=`, found `{}`",
        received
    )
}
