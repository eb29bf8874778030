//! Contains the [`Function`] trait and the [`Emitter`] that functions write
//! through.
//!
//! A `Function` is called like a [`Filter`][`crate::Filter`], but instead of
//! only transforming its input it may emit text. When a function called from
//! inside of `@{ }` emits anything, the emitted text replaces the marker and
//! the value it returns is discarded.
//!
//! Loops and conditionals are plain Rust inside of the function body:
//!
//! ```
//! use ribosome::{Emitter, Engine, Error, Session, Store};
//! use serde_json::Value;
//! use std::collections::HashMap;
//!
//! fn fields(
//!     emitter: &mut Emitter<'_>,
//!     input: &Value,
//!     _: &HashMap<String, Value>,
//! ) -> Result<Value, Error> {
//!     let names = input.as_array().cloned().unwrap_or_default();
//!     for name in names {
//!         let scope = emitter.scope().clone().with_must("field", name);
//!         emitter.emit_line_in("int @{field};", 4, &scope)?;
//!     }
//!
//!     Ok(Value::Null)
//! }
//!
//! let engine = Engine::new().with_function_must("fields", fields);
//! let store = Store::new().with_must("names", vec!["x", "y"]);
//!
//! let mut session = Session::new();
//! let text = session.expand(&engine, "struct {@{ names | fields }\n}", &store).unwrap();
//!
//! assert_eq!(text, "struct {\n    int x;\n    int y;\n}");
//! ```
use crate::{
    engine::Engine,
    eval::is_truthy,
    format::render_value,
    log::Error,
    session::Session,
    store::Shadow,
};
use serde_json::Value;
use std::collections::HashMap;

/// Describes a type which can be called from an expression, and may emit
/// text while it runs.
pub trait Function: Sync + Send {
    /// Execute the function with the given input and arguments.
    fn call(
        &self,
        emitter: &mut Emitter<'_>,
        input: &Value,
        args: &HashMap<String, Value>,
    ) -> Result<Value, Error>;
}

/// Allows assignment of any function matching the signature of `call` as a
/// `Function` to `Engine`, instead of requiring a struct be created.
impl<F> Function for F
where
    F: Fn(&mut Emitter<'_>, &Value, &HashMap<String, Value>) -> Result<Value, Error> + Sync + Send,
{
    fn call(
        &self,
        emitter: &mut Emitter<'_>,
        input: &Value,
        args: &HashMap<String, Value>,
    ) -> Result<Value, Error> {
        self(emitter, input, args)
    }
}

/// Gives a [`Function`] access to the [`Session`] it was called in, and the
/// scope of the expression that called it.
pub struct Emitter<'a> {
    session: &'a mut Session,
    engine: &'a Engine,
    scope: &'a Shadow<'a>,
}

impl<'a> Emitter<'a> {
    /// Create a new [`Emitter`].
    #[inline]
    pub fn new(session: &'a mut Session, engine: &'a Engine, scope: &'a Shadow<'a>) -> Self {
        Self {
            session,
            engine,
            scope,
        }
    }

    /// Append literal text to the current buffer.
    #[inline]
    pub fn write<T>(&mut self, text: T)
    where
        T: Into<String>,
    {
        self.session.write(text)
    }

    /// Expand the fragment with the current scope and write it on a new line,
    /// re-indented to `column`.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if expansion fails.
    #[inline]
    pub fn emit_line(&mut self, fragment: &str, column: usize) -> Result<(), Error> {
        self.session
            .emit_line(self.engine, fragment, column, self.scope)
    }

    /// Expand the fragment with the current scope and write it on the
    /// current line.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if expansion fails.
    #[inline]
    pub fn emit_inline(&mut self, fragment: &str) -> Result<(), Error> {
        self.session.emit_inline(self.engine, fragment, self.scope)
    }

    /// Expand the fragment with the given scope and write it on a new line,
    /// re-indented to `column`.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if expansion fails.
    #[inline]
    pub fn emit_line_in(
        &mut self,
        fragment: &str,
        column: usize,
        scope: &Shadow<'_>,
    ) -> Result<(), Error> {
        self.session.emit_line(self.engine, fragment, column, scope)
    }

    /// Expand the fragment with the given scope and write it on the current
    /// line.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if expansion fails.
    #[inline]
    pub fn emit_inline_in(&mut self, fragment: &str, scope: &Shadow<'_>) -> Result<(), Error> {
        self.session.emit_inline(self.engine, fragment, scope)
    }

    /// Return the scope of the expression that is being evaluated.
    #[inline]
    pub fn scope(&self) -> &'a Shadow<'a> {
        self.scope
    }

    /// Return the [`Engine`] that is evaluating the expression.
    #[inline]
    pub fn engine(&self) -> &'a Engine {
        self.engine
    }

    /// Return the [`Session`].
    #[inline]
    pub fn session(&mut self) -> &mut Session {
        self.session
    }
}

/// Expand the first argument once for each element of the input array.
///
/// Inside of the fragment, `item` is the element and `index` its zero
/// based position. The argument named `separator` is written between
/// elements.
pub fn each(
    emitter: &mut Emitter<'_>,
    input: &Value,
    args: &HashMap<String, Value>,
) -> Result<Value, Error> {
    let Some(items) = input.as_array() else {
        return Err(Error::build(format!(
            "function `each` expects an array, received `{input}`"
        )));
    };
    let fragment = string_argument("each", args, "1")?;
    let separator = match args.get("separator") {
        Some(separator) => render_value(separator),
        None => String::new(),
    };

    for (index, item) in items.iter().enumerate() {
        if index > 0 {
            emitter.write(separator.as_str());
        }
        let mut scope = emitter.scope().clone();
        scope.push();
        scope.insert_must("item", item);
        scope.insert_must("index", index);
        emitter.emit_inline_in(fragment, &scope)?;
    }

    Ok(Value::Null)
}

/// Expand the first argument if the input is truthy, and the second
/// argument, when given, otherwise.
pub fn when(
    emitter: &mut Emitter<'_>,
    input: &Value,
    args: &HashMap<String, Value>,
) -> Result<Value, Error> {
    if is_truthy(input) {
        let fragment = string_argument("when", args, "1")?;
        emitter.emit_inline(fragment)?;
    } else if args.contains_key("2") {
        let fragment = string_argument("when", args, "2")?;
        emitter.emit_inline(fragment)?;
    }

    Ok(Value::Null)
}

/// Redirect output to the file named by the input.
///
/// Only valid on a host line, never inside of `@{ }`.
pub fn output(
    emitter: &mut Emitter<'_>,
    input: &Value,
    _: &HashMap<String, Value>,
) -> Result<Value, Error> {
    let path = render_value(input);
    if path.is_empty() {
        return Err(Error::build("function `output` expects a file name"));
    }
    emitter.session().redirect_to_file(path)?;

    Ok(Value::Null)
}

/// Redirect output to standard output.
///
/// Only valid on a host line, never inside of `@{ }`.
pub fn stdout(
    emitter: &mut Emitter<'_>,
    _: &Value,
    _: &HashMap<String, Value>,
) -> Result<Value, Error> {
    emitter.session().redirect_to_stdout()?;

    Ok(Value::Null)
}

/// Return the named argument, which must be a string.
fn string_argument<'v>(
    function: &str,
    args: &'v HashMap<String, Value>,
    name: &str,
) -> Result<&'v str, Error> {
    match args.get(name) {
        Some(Value::String(text)) => Ok(text),
        Some(other) => Err(Error::build(format!(
            "function `{function}` expects a string fragment, received `{other}`"
        ))),
        None => Err(Error::build(format!(
            "function `{function}` expects a fragment argument"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        engine::Engine,
        log::{Error, NESTED_COMMAND},
        session::Session,
        store::Store,
    };
    use serde_json::{json, Value};
    use std::collections::HashMap;

    fn expand(fragment: &str, store: &Store) -> Result<String, Error> {
        let mut session = Session::with_stdout(std::io::sink());
        session.expand(&Engine::with_builtins(), fragment, store)
    }

    #[test]
    fn test_each() {
        let store = Store::new().with_must("names", vec!["a", "b", "c"]);

        assert_eq!(
            expand("[@{ names | each \"@{index}=@{item}\" separator: \", \" }]", &store).unwrap(),
            "[0=a, 1=b, 2=c]"
        );
    }

    #[test]
    fn test_each_empty_substitutes_value() {
        let store = Store::new().with_must("names", Vec::<String>::new());

        // Nothing was emitted, so the null return value renders as nothing.
        assert_eq!(expand("[@{ names | each \"@{item}\" }]", &store).unwrap(), "[]");
    }

    #[test]
    fn test_each_scope_does_not_leak() {
        let store = Store::new().with_must("names", vec!["a"]);

        let error = expand("@{ names | each \"@{item}\" }@{item}", &store).unwrap_err();
        assert_eq!(error.get_reason(), crate::log::UNDEFINED_VARIABLE);
    }

    #[test]
    fn test_when() {
        let store = Store::new().with_must("ready", true).with_must("count", 0);

        assert_eq!(expand("@{ ready | when \"yes\" \"no\" }", &store).unwrap(), "yes");
        assert_eq!(expand("@{ count | when \"yes\" \"no\" }", &store).unwrap(), "no");
        assert_eq!(expand("@{ count | when \"yes\" }", &store).unwrap(), "");
    }

    #[test]
    fn test_output_inside_expression_fails() {
        let store = Store::new();
        let error = expand("@{ \"never.txt\" | output }", &store).unwrap_err();

        assert_eq!(error.get_reason(), NESTED_COMMAND);
        assert!(!std::path::Path::new("never.txt").exists());
    }

    #[test]
    fn test_emit_line_from_function() {
        fn block(
            emitter: &mut super::Emitter<'_>,
            _: &Value,
            args: &HashMap<String, Value>,
        ) -> Result<Value, Error> {
            emitter.write("{");
            if let Some(Value::String(body)) = args.get("1") {
                emitter.emit_line(body, 4)?;
            }
            emitter.emit_line("}", 0)?;
            Ok(json!("discarded"))
        }

        let engine = Engine::new().with_function_must("block", block);
        let store = Store::new().with_must("name", "run");
        let mut session = Session::with_stdout(std::io::sink());

        assert_eq!(
            session
                .expand(&engine, "fn @{name}() @{ null | block \"@{name}();\" }", &store)
                .unwrap(),
            "fn run() {\n    run();\n}"
        );
    }
}
