mod operate;

pub use operate::{is_truthy, operate};

use crate::{
    compile::{
        tree::{Arguments, Base, Binary, Call, Expression, Key},
        Operator,
    },
    function::Emitter,
    log::{Error, INVALID_FILTER, UNDEFINED_VARIABLE},
};
use serde_json::Value;
use std::collections::HashMap;
use tracing::trace;

/// Walks an [`Expression`] tree and produces its [`Value`].
///
/// Lookups and calls go through the [`Emitter`], so that functions may emit
/// text into the [`Session`][`crate::Session`] while they run.
pub struct Interpreter<'source> {
    /// The expression text that the tree was compiled from.
    source: &'source str,
}

impl<'source> Interpreter<'source> {
    /// Create a new Interpreter over the given expression text.
    #[inline]
    pub fn new(source: &'source str) -> Self {
        Self { source }
    }

    /// Evaluate the Expression.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if a variable is undefined, a call names an
    /// unknown filter or function, a filter or function fails, or an operator
    /// is applied to incompatible types.
    pub fn evaluate(
        &self,
        emitter: &mut Emitter<'_>,
        expression: &Expression,
    ) -> Result<Value, Error> {
        match expression {
            Expression::Base(base) => self.eval_base(emitter, base),
            Expression::Not(not) => {
                let value = self.evaluate(emitter, &not.operand)?;
                Ok(Value::Bool(!is_truthy(&value)))
            }
            Expression::Binary(binary) => self.eval_binary(emitter, binary),
            Expression::Call(call) => self.eval_call(emitter, call),
        }
    }

    /// Evaluate a Base.
    fn eval_base(&self, emitter: &Emitter<'_>, base: &Base) -> Result<Value, Error> {
        match base {
            Base::Variable(variable) => self.eval_keys(emitter, &variable.path),
            Base::Literal(literal) => Ok(literal.value.clone()),
        }
    }

    /// Evaluate a Binary.
    ///
    /// `&&` and `||` short circuit, the right side is only evaluated when
    /// the left side does not decide the result.
    fn eval_binary(&self, emitter: &mut Emitter<'_>, binary: &Binary) -> Result<Value, Error> {
        let left = self.evaluate(emitter, &binary.left)?;

        match binary.operator {
            Operator::And if !is_truthy(&left) => return Ok(Value::Bool(false)),
            Operator::Or if is_truthy(&left) => return Ok(Value::Bool(true)),
            Operator::And | Operator::Or => {
                let right = self.evaluate(emitter, &binary.right)?;
                return Ok(Value::Bool(is_truthy(&right)));
            }
            _ => (),
        }

        let right = self.evaluate(emitter, &binary.right)?;
        operate(&left, binary.operator, &right)
            .map_err(|error| error.or_pointer(self.source, binary.region))
    }

    /// Evaluate a Call.
    ///
    /// The receiver is evaluated first, and its value is passed as input to
    /// the filter or function named by the Call. Filters are searched before
    /// functions.
    fn eval_call(&self, emitter: &mut Emitter<'_>, call: &Call) -> Result<Value, Error> {
        let input = self.evaluate(emitter, &call.receiver)?;
        let name = call.name.region.literal(self.source);
        let arguments = match &call.arguments {
            Some(arguments) => self.eval_arguments(emitter, arguments)?,
            None => HashMap::new(),
        };
        trace!(name, arguments = arguments.len(), "calling");

        let engine = emitter.engine();
        if let Some(filter) = engine.get_filter(name) {
            return filter
                .apply(&input, &arguments)
                .map_err(|error| error.or_pointer(self.source, call.name.region));
        }
        if let Some(function) = engine.get_function(name) {
            return function
                .call(emitter, &input, &arguments)
                .map_err(|error| error.or_pointer(self.source, call.name.region));
        }

        Err(Error::build(INVALID_FILTER)
            .with_pointer(self.source, call.name.region)
            .with_help(format!(
                "expression has requested to use `{name}`, but no filter or function \
                with that name is registered in the engine"
            )))
    }

    /// Get the Value from the scope which is identified by the given Keys.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if the first Key is not found. Keys after the first
    /// that are not found produce `null`.
    fn eval_keys(&self, emitter: &Emitter<'_>, keys: &[Key]) -> Result<Value, Error> {
        let first = keys
            .first()
            .expect("key vector should always have at least one key");
        let name = first.get_region().literal(self.source);

        let Some(mut value) = emitter.scope().get(name) else {
            return Err(Error::build(UNDEFINED_VARIABLE)
                .with_pointer(self.source, first.get_region())
                .with_help(format!("`{name}` is not defined in the current scope")));
        };

        for key in keys.iter().skip(1) {
            let name = key.get_region().literal(self.source);
            match value.get(name) {
                Some(next) => value = next,
                None => return Ok(Value::Null),
            }
        }

        Ok(value.clone())
    }

    /// Assemble a HashMap that contains the values of the given Arguments.
    ///
    /// Any argument without a name is named after its position among the
    /// unnamed arguments, beginning with "1".
    fn eval_arguments(
        &self,
        emitter: &Emitter<'_>,
        arguments: &Arguments,
    ) -> Result<HashMap<String, Value>, Error> {
        let mut buffer = HashMap::new();
        let mut unnamed = 1;

        for (name, base) in &arguments.values {
            let name = match name {
                Some(name) => name.clone(),
                None => {
                    let temp = unnamed;
                    unnamed += 1;
                    temp.to_string()
                }
            };

            let value = self.eval_base(emitter, base)?;
            buffer.insert(name, value);
        }

        Ok(buffer)
    }
}
