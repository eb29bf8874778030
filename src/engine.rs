use crate::{
    compile::compile,
    eval::Interpreter,
    evaluate::Evaluator,
    filter::{self, Filter},
    function::{self, Emitter, Function},
    log::{Error, INVALID_FILTER},
    session::Session,
    store::{Shadow, Store},
};
use serde_json::Value;
use std::collections::HashMap;
use tracing::trace;

/// Evaluates embedded expressions with the built-in expression language,
/// and provides storage for filters and functions.
///
/// An `Engine` is an [`Evaluator`] for both a [`Store`] and a [`Shadow`].
///
/// # Examples
///
/// ```
/// use ribosome::{Engine, Session, Store};
///
/// let engine = Engine::with_builtins();
/// let store = Store::new().with_must("name", "counter");
///
/// let mut session = Session::new();
/// let text = session.expand(&engine, "int @{ name | upper } = @{ 1 + 1 };", &store);
///
/// assert_eq!(text.unwrap(), "int COUNTER = 2;");
/// ```
#[derive(Default)]
pub struct Engine {
    /// Filters that this engine is aware of.
    filters: HashMap<String, Box<dyn Filter>>,
    /// Functions that this engine is aware of.
    functions: HashMap<String, Box<dyn Function>>,
}

impl Engine {
    /// Create a new [`Engine`] with no filters or functions.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new [`Engine`] equipped with the built-in filters `upper`,
    /// `lower`, `len` and `join`, and the built-in functions `each`, `when`,
    /// `output` and `stdout`.
    pub fn with_builtins() -> Self {
        Self::new()
            .with_filter_must("upper", filter::upper)
            .with_filter_must("lower", filter::lower)
            .with_filter_must("len", filter::len)
            .with_filter_must("join", filter::join)
            .with_function_must("each", function::each)
            .with_function_must("when", function::when)
            .with_function_must("output", function::output)
            .with_function_must("stdout", function::stdout)
    }

    /// Add a [`Filter`].
    ///
    /// # Errors
    ///
    /// If a `Filter` with the given name already exists in the engine, an [`Error`] is returned.
    ///
    /// # Examples
    ///
    /// ```
    /// use ribosome::{Engine, Error};
    /// use serde_json::{json, Value};
    /// use std::collections::HashMap;
    ///
    /// fn to_lowercase(value: &Value, _: &HashMap<String, Value>) -> Result<Value, Error> {
    ///     match value {
    ///         Value::String(string) => Ok(json!(string.to_lowercase())),
    ///         _ => Err(Error::build("filter `to_lowercase` requires string input")
    ///            .with_help("use quotes to coerce data to string")
    ///         ),
    ///     }
    /// }
    ///
    /// let mut engine = Engine::default();
    /// let result = engine.add_filter("to_lowercase", to_lowercase);
    ///
    /// assert!(result.is_ok());
    /// ```
    pub fn add_filter<T>(&mut self, name: &str, filter: T) -> Result<(), Error>
    where
        T: Filter + 'static,
    {
        if self.filters.contains_key(name) {
            return Err(Error::build(INVALID_FILTER).with_help(format!(
                "filter with name `{name}` already exists in engine, \
                overwrite it with `.add_filter_must`"
            )));
        }
        self.filters.insert(name.to_string(), Box::new(filter));
        Ok(())
    }

    /// Add a [`Filter`].
    ///
    /// If a `Filter` with the given name already exists in the [`Engine`], it is overwritten.
    #[inline]
    pub fn add_filter_must<T>(&mut self, name: &str, filter: T)
    where
        T: Filter + 'static,
    {
        self.filters.insert(name.to_string(), Box::new(filter));
    }

    /// Add a [`Filter`].
    ///
    /// Returns the [`Engine`], so additional methods may be chained.
    ///
    /// # Errors
    ///
    /// If a `Filter` with the given name already exists in the engine, an [`Error`] is returned.
    #[inline]
    pub fn with_filter<T>(mut self, name: &str, filter: T) -> Result<Self, Error>
    where
        T: Filter + 'static,
    {
        self.add_filter(name, filter)?;
        Ok(self)
    }

    /// Add a [`Filter`].
    ///
    /// Returns the [`Engine`], so additional methods may be chained.
    ///
    /// If a `Filter` with the given name already exists in the engine, it is overwritten.
    #[inline]
    pub fn with_filter_must<T>(mut self, name: &str, filter: T) -> Self
    where
        T: Filter + 'static,
    {
        self.add_filter_must(name, filter);
        self
    }

    /// Return the filter with the given name, if it exists in Engine.
    #[inline]
    pub fn get_filter(&self, name: &str) -> Option<&dyn Filter> {
        self.filters.get(name).map(|filter| filter.as_ref())
    }

    /// Add a [`Function`].
    ///
    /// # Errors
    ///
    /// If a `Function` with the given name already exists in the engine, an
    /// [`Error`] is returned.
    pub fn add_function<T>(&mut self, name: &str, function: T) -> Result<(), Error>
    where
        T: Function + 'static,
    {
        if self.functions.contains_key(name) {
            return Err(Error::build(INVALID_FILTER).with_help(format!(
                "function with name `{name}` already exists in engine, \
                overwrite it with `.add_function_must`"
            )));
        }
        self.functions.insert(name.to_string(), Box::new(function));
        Ok(())
    }

    /// Add a [`Function`].
    ///
    /// If a `Function` with the given name already exists in the [`Engine`],
    /// it is overwritten.
    #[inline]
    pub fn add_function_must<T>(&mut self, name: &str, function: T)
    where
        T: Function + 'static,
    {
        self.functions.insert(name.to_string(), Box::new(function));
    }

    /// Add a [`Function`].
    ///
    /// Returns the [`Engine`], so additional methods may be chained.
    ///
    /// # Errors
    ///
    /// If a `Function` with the given name already exists in the engine, an
    /// [`Error`] is returned.
    #[inline]
    pub fn with_function<T>(mut self, name: &str, function: T) -> Result<Self, Error>
    where
        T: Function + 'static,
    {
        self.add_function(name, function)?;
        Ok(self)
    }

    /// Add a [`Function`].
    ///
    /// Returns the [`Engine`], so additional methods may be chained.
    #[inline]
    pub fn with_function_must<T>(mut self, name: &str, function: T) -> Self
    where
        T: Function + 'static,
    {
        self.add_function_must(name, function);
        self
    }

    /// Return the function with the given name, if it exists in Engine.
    #[inline]
    pub fn get_function(&self, name: &str) -> Option<&dyn Function> {
        self.functions.get(name).map(|function| function.as_ref())
    }
}

impl<'store> Evaluator<Shadow<'store>> for Engine {
    fn evaluate(
        &self,
        session: &mut Session,
        expression: &str,
        context: &Shadow<'store>,
    ) -> Result<Value, Error> {
        trace!(expression, "compiling expression");
        let tree = compile(expression)?;
        let mut emitter = Emitter::new(session, self, context);

        Interpreter::new(expression).evaluate(&mut emitter, &tree)
    }
}

impl Evaluator<Store> for Engine {
    fn evaluate(
        &self,
        session: &mut Session,
        expression: &str,
        context: &Store,
    ) -> Result<Value, Error> {
        <Self as Evaluator<Shadow<'_>>>::evaluate(self, session, expression, &Shadow::new(context))
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut filters: Vec<_> = self.filters.keys().collect();
        let mut functions: Vec<_> = self.functions.keys().collect();
        filters.sort();
        functions.sort();

        f.debug_struct("Engine")
            .field("filters", &filters)
            .field("functions", &functions)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        engine::Engine,
        function::Emitter,
        log::{Error, INVALID_SYNTAX, UNEXPECTED_EOF},
        session::Session,
        store::{Shadow, Store},
    };
    use serde_json::{json, Value};
    use std::collections::HashMap;

    #[test]
    fn test_add() {
        let mut engine = Engine::default();
        engine.add_filter_must("faux", faux_filter_a);

        assert!(engine.get_filter("faux").is_some());
        assert!(engine.get_filter("ghost").is_none())
    }

    #[test]
    fn test_add_fluent() {
        assert!(Engine::default()
            .with_filter("faux", faux_filter_a)
            .unwrap()
            .get_filter("faux")
            .is_some());
        assert!(Engine::default()
            .with_function("faux", faux_function)
            .unwrap()
            .get_function("faux")
            .is_some());
    }

    #[test]
    fn test_add_duplicate() {
        assert!(Engine::default()
            .with_filter_must("faux", faux_filter_a)
            .with_filter("faux", faux_filter_a)
            .is_err());
        assert!(Engine::default()
            .with_function_must("faux", faux_function)
            .with_function("faux", faux_function)
            .is_err());
    }

    #[test]
    fn test_add_must_overwrites() {
        let engine = Engine::default()
            .with_filter_must("faux", faux_filter_a)
            .with_filter_must("faux", faux_filter_b);
        let result = engine
            .get_filter("faux")
            .unwrap()
            .apply(&Value::Null, &HashMap::new());

        assert_eq!(result, Ok(json!("b")));
    }

    #[test]
    fn test_filter_before_function() {
        let engine = Engine::default()
            .with_filter_must("faux", faux_filter_a)
            .with_function_must("faux", faux_function);
        let mut session = Session::with_stdout(std::io::sink());

        assert_eq!(session.expand(&engine, "@{ 1 | faux }", &Store::new()).unwrap(), "a");
    }

    #[test]
    fn test_evaluate_with_shadow() {
        let engine = Engine::with_builtins();
        let store = Store::new().with_must("name", "root");
        let shadow = Shadow::new(&store).with_must("name", "shadowed");
        let mut session = Session::with_stdout(std::io::sink());

        assert_eq!(session.expand(&engine, "@{name}", &shadow).unwrap(), "shadowed");
        assert_eq!(session.expand(&engine, "@{name}", &store).unwrap(), "root");
    }

    #[test]
    fn test_compile_errors_propagate() {
        let engine = Engine::with_builtins();
        let mut session = Session::with_stdout(std::io::sink());

        let error = session.expand(&engine, "@{ name. }", &Store::new()).unwrap_err();
        assert_eq!(error.get_reason(), UNEXPECTED_EOF);

        let error = session.expand(&engine, "@{ \"open }", &Store::new()).unwrap_err();
        assert_eq!(error.get_reason(), INVALID_SYNTAX);
    }

    fn faux_filter_a(_: &Value, _: &HashMap<String, Value>) -> Result<Value, Error> {
        Ok(json!("a"))
    }

    fn faux_filter_b(_: &Value, _: &HashMap<String, Value>) -> Result<Value, Error> {
        Ok(json!("b"))
    }

    fn faux_function(
        emitter: &mut Emitter<'_>,
        _: &Value,
        _: &HashMap<String, Value>,
    ) -> Result<Value, Error> {
        emitter.write("function");
        Ok(Value::Null)
    }
}
