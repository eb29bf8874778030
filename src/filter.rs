//! Contains the [`Filter`] trait, and the filters available in
//! [`Engine::with_builtins`][`crate::Engine::with_builtins`].
//!
//! A `Filter` transforms a [`Value`] inside of an expression. Any struct that
//! implements the `Filter` trait, or function matching the
//! [`apply`][`Filter::apply`] method, can be registered as a `Filter` on an
//! [`Engine`][`crate::Engine`].
//!
//! Given this expression:
//!
//! ```text
//! @{ name | prepend text: "hello, " | append "!", "?" | upper }
//! ```
//!
//! The "name" value is looked up in the scope and used as the input for
//! `prepend`, the first filter in the call chain.
//!
//! The `prepend` filter receives one named argument with a name of "text"
//! and value of "hello, ". Argument names may be quoted or unquoted.
//!
//! The next filter, `append`, receives two anonymous arguments; "!" and "?".
//! Anonymous arguments are named `n + 1`, where "n" is the number of
//! anonymous arguments that came before the argument. So, "!" receives a
//! name of "1" and "?" a name of "2".
//!
//! A `Filter` that returns an [`Error`] without a [`Visual`][`crate::Visual`]
//! is assigned a [`Pointer`][`crate::Pointer`] to the name of the filter.
//!
//! # Examples
//!
//! ```
//! use ribosome::{Engine, Error, Session, Store};
//! use serde_json::{json, Value};
//! use std::collections::HashMap;
//!
//! fn to_lowercase(value: &Value, _: &HashMap<String, Value>) -> Result<Value, Error> {
//!     match value {
//!         Value::String(string) => Ok(json!(string.to_lowercase())),
//!         _ => Err(Error::build("filter `to_lowercase` requires string input")
//!             .with_help("use quotes to coerce data to string")),
//!     }
//! }
//!
//! let engine = Engine::new().with_filter_must("to_lowercase", to_lowercase);
//! let store = Store::new().with_must("name", "TAYLOR");
//!
//! let mut session = Session::new();
//! let text = session.expand(&engine, "@{ name | to_lowercase }", &store).unwrap();
//!
//! assert_eq!(text, "taylor");
//! ```
use crate::{format::render_value, log::Error};
use serde_json::{json, Value};
use std::collections::HashMap;

/// Describes a type which can be used to transform input in an expression.
pub trait Filter: Sync + Send {
    /// Execute the filter with the given input and return a new Value as output.
    fn apply(&self, input: &Value, args: &HashMap<String, Value>) -> Result<Value, Error>;
}

/// Allows assignment of any function matching the signature of `apply` as a `Filter`
/// to `Engine`, instead of requiring a struct be created.
impl<F> Filter for F
where
    F: Fn(&Value, &HashMap<String, Value>) -> Result<Value, Error> + Sync + Send,
{
    fn apply(&self, value: &Value, args: &HashMap<String, Value>) -> Result<Value, Error> {
        self(value, args)
    }
}

/// Uppercase the given string.
pub fn upper(value: &Value, _: &HashMap<String, Value>) -> Result<Value, Error> {
    match value {
        Value::String(string) => Ok(json!(string.to_uppercase())),
        _ => Err(Error::build("filter `upper` requires string input")
            .with_help("use quotes to coerce data to string")),
    }
}

/// Lowercase the given string.
pub fn lower(value: &Value, _: &HashMap<String, Value>) -> Result<Value, Error> {
    match value {
        Value::String(string) => Ok(json!(string.to_lowercase())),
        _ => Err(Error::build("filter `lower` requires string input")
            .with_help("use quotes to coerce data to string")),
    }
}

/// Return the number of characters in a string, or elements in an array
/// or object.
pub fn len(value: &Value, _: &HashMap<String, Value>) -> Result<Value, Error> {
    match value {
        Value::String(string) => Ok(json!(string.chars().count())),
        Value::Array(array) => Ok(json!(array.len())),
        Value::Object(object) => Ok(json!(object.len())),
        _ => Err(Error::build(format!(
            "filter `len` expects a string, array or object, received `{value}`"
        ))),
    }
}

/// Join the elements of an array into one string.
///
/// The separator is the first argument, or the argument named `separator`,
/// and defaults to nothing.
pub fn join(value: &Value, args: &HashMap<String, Value>) -> Result<Value, Error> {
    let Value::Array(array) = value else {
        return Err(Error::build(format!(
            "filter `join` expects an array, received `{value}`"
        )));
    };
    let separator = match args.get("separator").or_else(|| args.get("1")) {
        Some(Value::String(separator)) => separator.as_str(),
        Some(other) => {
            return Err(Error::build(format!(
                "filter `join` expects a string separator, received `{other}`"
            )))
        }
        None => "",
    };

    let joined = array
        .iter()
        .map(render_value)
        .collect::<Vec<_>>()
        .join(separator);

    Ok(Value::String(joined))
}
