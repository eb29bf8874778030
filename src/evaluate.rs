use crate::{format::render_value, log::Error, session::Session};
use serde_json::Value;

/// Describes a type which can evaluate the text of an embedded expression.
///
/// The evaluator receives the [`Session`] so that evaluating an expression
/// may itself emit text, for example by expanding another fragment. Anything
/// emitted this way is captured in a frame of its own and replaces the
/// expression marker instead of the returned [`Value`].
///
/// Any function or closure matching the signature of [`Evaluator::evaluate`]
/// is an `Evaluator`.
///
/// # Examples
///
/// ```
/// use ribosome::{Error, Session};
/// use serde_json::{json, Value};
///
/// let shout = |_: &mut Session, expression: &str, _: &()| -> Result<Value, Error> {
///     Ok(json!(expression.trim().to_uppercase()))
/// };
///
/// let mut session = Session::new();
/// let text = session.expand(&shout, "say @{ hello }!", &()).unwrap();
///
/// assert_eq!(text, "say HELLO!");
/// ```
pub trait Evaluator<C: ?Sized> {
    /// Evaluate the expression against the given context.
    fn evaluate(&self, session: &mut Session, expression: &str, context: &C)
        -> Result<Value, Error>;
}

impl<C, F> Evaluator<C> for F
where
    C: ?Sized,
    F: Fn(&mut Session, &str, &C) -> Result<Value, Error>,
{
    fn evaluate(
        &self,
        session: &mut Session,
        expression: &str,
        context: &C,
    ) -> Result<Value, Error> {
        self(session, expression, context)
    }
}

/// The outcome of evaluating one embedded expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Evaluation {
    /// The expression emitted nothing and produced a value.
    Value(Value),
    /// The expression emitted text while it was evaluated. Any value it
    /// returned is discarded.
    Emitted(String),
}

impl Evaluation {
    /// Return the text that replaces the expression marker.
    pub fn into_text(self) -> String {
        match self {
            Evaluation::Value(value) => render_value(&value),
            Evaluation::Emitted(text) => text,
        }
    }
}
