use crate::{
    adjust::adjust,
    evaluate::{Evaluation, Evaluator},
    log::{error_nested, Error},
    scan::{Scanner, OPEN},
    sink::Sink,
    stack::Stack,
};
use std::{io::Write, path::Path};
use tracing::{debug, trace};

/// The state of one expansion run: a [`Stack`] of buffers that expanded
/// text is written to, and the [`Sink`] that the root buffer is flushed to.
///
/// # Examples
///
/// ```
/// use ribosome::{Error, Session};
/// use serde_json::{json, Value};
///
/// fn double(_: &mut Session, expression: &str, _: &()) -> Result<Value, Error> {
///     let number: i64 = expression.trim().parse().map_err(|_| Error::build("not a number"))?;
///     Ok(json!(number * 2))
/// }
///
/// let mut session = Session::new();
/// session.emit_inline(&double, "int x = @{21};", &()).unwrap();
/// session.emit_line(&double, "    return x;", 4, &()).unwrap();
/// ```
#[derive(Debug)]
pub struct Session {
    stack: Stack,
    sink: Sink,
}

impl Session {
    /// Create a new [`Session`] that flushes to standard output.
    #[inline]
    pub fn new() -> Self {
        Self::with_sink(Sink::new())
    }

    /// Create a new [`Session`] that treats the given writer as standard output.
    #[inline]
    pub fn with_stdout<W>(writer: W) -> Self
    where
        W: Write + 'static,
    {
        Self::with_sink(Sink::with_stdout(writer))
    }

    /// Create a new [`Session`] that flushes to the given [`Sink`].
    #[inline]
    pub fn with_sink(sink: Sink) -> Self {
        Self {
            stack: Stack::new(),
            sink,
        }
    }

    /// Append literal text to the current buffer.
    #[inline]
    pub fn write<T>(&mut self, text: T)
    where
        T: Into<String>,
    {
        self.stack.write(text)
    }

    /// Return the number of buffers on the [`Stack`], including the root.
    #[inline]
    pub fn depth(&self) -> usize {
        self.stack.depth()
    }

    /// Return true if the [`Session`] is inside of an expression evaluation.
    #[inline]
    pub fn is_nested(&self) -> bool {
        self.stack.is_nested()
    }

    /// Return the [`Sink`] that the [`Session`] flushes to.
    #[inline]
    pub fn sink(&self) -> &Sink {
        &self.sink
    }

    /// Evaluate one expression inside of a fresh frame.
    ///
    /// If the evaluator emitted anything into the frame, the emitted text is
    /// the result. Otherwise the value it returned is.
    ///
    /// # Errors
    ///
    /// Propagates any [`Error`] returned by the evaluator. The frame is
    /// removed either way.
    ///
    /// # Panics
    ///
    /// Panics if the evaluator leaves the [`Stack`] at a different depth
    /// than it found it.
    pub fn evaluate<C, E>(
        &mut self,
        evaluator: &E,
        expression: &str,
        context: &C,
    ) -> Result<Evaluation, Error>
    where
        C: ?Sized,
        E: Evaluator<C> + ?Sized,
    {
        let depth = self.stack.depth();
        self.stack.push();
        let result = evaluator.evaluate(self, expression, context);
        assert_eq!(
            self.stack.depth(),
            depth + 1,
            "evaluation of `{expression}` leaked a frame"
        );
        let emitted = self.stack.pop();
        let value = result?;
        trace!(expression, emitted = emitted.is_some(), "evaluated expression");

        Ok(match emitted {
            Some(text) => Evaluation::Emitted(text),
            None => Evaluation::Value(value),
        })
    }

    /// Replace every embedded expression in the fragment with the text it
    /// evaluates to.
    ///
    /// Replacement text is never scanned again, so an expression that
    /// evaluates to `@{x}` leaves that text in place.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when an expression is unterminated, or when
    /// evaluating an expression fails.
    pub fn expand<C, E>(&mut self, evaluator: &E, fragment: &str, context: &C) -> Result<String, Error>
    where
        C: ?Sized,
        E: Evaluator<C> + ?Sized,
    {
        let mut result = String::with_capacity(fragment.len());
        let mut last = 0;

        for marker in Scanner::new(fragment) {
            let marker = marker?;
            result.push_str(&fragment[last..marker.begin]);

            let expression = marker.inner(OPEN.len(), 1).literal(fragment);
            let evaluation = self.evaluate(evaluator, expression, context)?;
            result.push_str(&evaluation.into_text());

            last = marker.end;
        }
        result.push_str(&fragment[last..]);

        Ok(result)
    }

    /// Expand the fragment and write it to the current buffer on a new line,
    /// re-indented to `column`.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if expansion fails.
    pub fn emit_line<C, E>(
        &mut self,
        evaluator: &E,
        fragment: &str,
        column: usize,
        context: &C,
    ) -> Result<(), Error>
    where
        C: ?Sized,
        E: Evaluator<C> + ?Sized,
    {
        let expanded = self.expand(evaluator, fragment, context)?;
        self.stack.write("\n");
        self.stack.write(adjust(&expanded, column));

        Ok(())
    }

    /// Expand the fragment and write it to the current buffer as is, on the
    /// current line.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if expansion fails.
    pub fn emit_inline<C, E>(&mut self, evaluator: &E, fragment: &str, context: &C) -> Result<(), Error>
    where
        C: ?Sized,
        E: Evaluator<C> + ?Sized,
    {
        let expanded = self.expand(evaluator, fragment, context)?;
        self.stack.write(expanded);

        Ok(())
    }

    /// Evaluate a statement for its effect only.
    ///
    /// No frame is pushed, so anything the statement emits lands in the
    /// current buffer. The returned value is discarded.
    ///
    /// # Errors
    ///
    /// Propagates any [`Error`] returned by the evaluator.
    pub fn execute<C, E>(&mut self, evaluator: &E, statement: &str, context: &C) -> Result<(), Error>
    where
        C: ?Sized,
        E: Evaluator<C> + ?Sized,
    {
        let depth = self.stack.depth();
        evaluator.evaluate(self, statement, context)?;
        assert_eq!(
            self.stack.depth(),
            depth,
            "statement `{statement}` leaked a frame"
        );

        Ok(())
    }

    /// Flush the root buffer to the [`Sink`] followed by a newline, and
    /// start a fresh, empty root buffer.
    ///
    /// If the `Sink` writes to a file, the file is closed.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if called from inside of an expression, or if
    /// writing to the `Sink` fails.
    pub fn close(&mut self) -> Result<(), Error> {
        if self.stack.is_nested() {
            return Err(error_nested("close"));
        }
        let root = self.stack.take_root();
        debug!(fragments = root.len(), file = ?self.sink.path(), "flushing document");

        self.sink.flush(root)
    }

    /// Flush everything written so far to the current destination, then
    /// direct further output into the file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if called from inside of an expression, or if
    /// flushing or creating the file fails.
    pub fn redirect_to_file<P>(&mut self, path: P) -> Result<(), Error>
    where
        P: AsRef<Path>,
    {
        if self.stack.is_nested() {
            return Err(error_nested("output"));
        }
        self.close()?;
        debug!(path = %path.as_ref().display(), "redirecting output to file");

        self.sink.open(path)
    }

    /// Flush everything written so far to the current destination, then
    /// direct further output to standard output.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if called from inside of an expression, or if
    /// flushing fails.
    pub fn redirect_to_stdout(&mut self) -> Result<(), Error> {
        if self.stack.is_nested() {
            return Err(error_nested("stdout"));
        }
        self.close()?;
        debug!("redirecting output to stdout");
        self.sink.use_stdout();

        Ok(())
    }

    /// Flush the final document and end the [`Session`].
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if writing to the [`Sink`] fails.
    #[inline]
    pub fn finish(mut self) -> Result<(), Error> {
        self.close()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::Session;
    use crate::{
        evaluate::Evaluation,
        log::{Error, NESTED_COMMAND, UNTERMINATED_EXPRESSION},
    };
    use serde_json::{json, Value};
    use std::{cell::RefCell, fs, io::Write, rc::Rc};

    #[derive(Clone, Default)]
    struct Capture(Rc<RefCell<Vec<u8>>>);

    impl Capture {
        fn text(&self) -> String {
            String::from_utf8(self.0.borrow().clone()).unwrap()
        }
    }

    impl Write for Capture {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.borrow_mut().write(buf)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    /// A small host language used to drive the session in tests.
    ///
    /// - `1+1` style sums of integers return numbers.
    /// - `name` looks up a key in the context object.
    /// - `wrap:<text>` emits `<` + expansion of `<text>` + `>` and returns 42.
    /// - `line:<text>` emits `<text>` as a new line at column 2.
    /// - `output:<path>` tries to redirect from inside of the expression.
    /// - `fail` returns an error.
    fn host(session: &mut Session, expression: &str, context: &Value) -> Result<Value, Error> {
        let expression = expression.trim();
        if let Some(text) = expression.strip_prefix("wrap:") {
            session.write("<");
            session.emit_inline(&host, text, context)?;
            session.write(">");
            return Ok(json!(42));
        }
        if let Some(text) = expression.strip_prefix("line:") {
            session.emit_line(&host, text, 2, context)?;
            return Ok(Value::Null);
        }
        if let Some(path) = expression.strip_prefix("output:") {
            session.redirect_to_file(path)?;
            return Ok(Value::Null);
        }
        if expression == "fail" {
            return Err(Error::build("evaluation failed"));
        }
        if expression.chars().all(|c| c.is_ascii_digit() || c == '+') {
            let sum: i64 = expression
                .split('+')
                .map(|n| n.parse::<i64>().unwrap_or(0))
                .sum();
            return Ok(json!(sum));
        }
        context
            .get(expression)
            .cloned()
            .ok_or_else(|| Error::build(format!("unknown `{expression}`")))
    }

    fn session() -> (Session, Capture) {
        let capture = Capture::default();
        (Session::with_stdout(capture.clone()), capture)
    }

    #[test]
    fn test_literal_inline() {
        let (mut session, capture) = session();
        session.emit_inline(&host, "hello", &json!({})).unwrap();
        session.finish().unwrap();

        assert_eq!(capture.text(), "hello\n");
    }

    #[test]
    fn test_value_substitution() {
        let (mut session, _) = session();
        let context = json!({"name": "counter"});

        assert_eq!(
            session.expand(&host, "int @{name} = @{1+1};", &context).unwrap(),
            "int counter = 2;"
        );
    }

    #[test]
    fn test_emitted_substitution_discards_value() {
        let (mut session, _) = session();
        let context = json!({"name": "x"});

        assert_eq!(
            session.expand(&host, "[@{wrap:@{name}}]", &context).unwrap(),
            "[<x>]"
        );
        assert_eq!(session.depth(), 1);
    }

    #[test]
    fn test_evaluate_tags_result() {
        let (mut session, _) = session();
        let context = json!({"name": "x"});

        assert_eq!(
            session.evaluate(&host, "name", &context).unwrap(),
            Evaluation::Value(json!("x"))
        );
        assert_eq!(
            session.evaluate(&host, "wrap:y", &context).unwrap(),
            Evaluation::Emitted("<y>".into())
        );
    }

    #[test]
    fn test_nested_frames_fold_in_place() {
        let (mut session, capture) = session();
        let context = json!({"a": "A", "b": "B"});

        session.write("start ");
        session
            .emit_inline(&host, "1@{wrap:2@{wrap:@{a}}3}4 @{b}", &context)
            .unwrap();
        session.write(" end");
        session.finish().unwrap();

        assert_eq!(capture.text(), "start 1<2<A>3>4 B end\n");
    }

    #[test]
    fn test_emitted_line_inside_expression() {
        let (mut session, _) = session();
        let context = json!({"a": "A"});

        assert_eq!(
            session.expand(&host, "x@{line:  @{a}}", &context).unwrap(),
            "x\n  A"
        );
    }

    #[test]
    fn test_replacement_not_rescanned() {
        let (mut session, _) = session();
        let context = json!({"marker": "@{fail}"});

        assert_eq!(
            session.expand(&host, "@{marker}", &context).unwrap(),
            "@{fail}"
        );
    }

    #[test]
    fn test_emit_line_adjusts() {
        let (mut session, capture) = session();
        let context = json!({"body": "x();"});

        session.emit_inline(&host, "{", &context).unwrap();
        session
            .emit_line(&host, "        @{body}", 4, &context)
            .unwrap();
        session.emit_line(&host, "}", 0, &context).unwrap();
        session.finish().unwrap();

        assert_eq!(capture.text(), "{\n    x();\n}\n");
    }

    #[test]
    fn test_unterminated_expression() {
        let (mut session, _) = session();
        let error = session
            .expand(&host, "a @{ name", &json!({"name": 1}))
            .unwrap_err();

        assert_eq!(error.get_reason(), UNTERMINATED_EXPRESSION);
    }

    #[test]
    fn test_error_unwinds_frames() {
        let (mut session, _) = session();
        let result = session.expand(&host, "@{wrap:@{wrap:@{fail}}}", &json!({}));

        assert!(result.is_err());
        assert_eq!(session.depth(), 1);
    }

    #[test]
    fn test_redirection_ordering() {
        let directory = tempfile::tempdir().unwrap();
        let first = directory.path().join("first.txt");
        let second = directory.path().join("second.txt");
        let (mut session, capture) = session();
        let context = json!({});

        session.emit_inline(&host, "before", &context).unwrap();
        session.redirect_to_file(&first).unwrap();
        assert_eq!(capture.text(), "before\n");
        assert!(session.sink().is_file());

        session.emit_inline(&host, "in first", &context).unwrap();
        session.redirect_to_file(&second).unwrap();
        assert_eq!(fs::read_to_string(&first).unwrap(), "in first\n");

        session.emit_inline(&host, "in second", &context).unwrap();
        session.redirect_to_stdout().unwrap();
        assert_eq!(fs::read_to_string(&second).unwrap(), "in second\n");
        assert!(!session.sink().is_file());

        session.emit_inline(&host, "after", &context).unwrap();
        session.finish().unwrap();

        assert_eq!(capture.text(), "before\nafter\n");
        assert_eq!(fs::read_to_string(&first).unwrap(), "in first\n");
    }

    #[test]
    fn test_nested_redirect_aborts() {
        let directory = tempfile::tempdir().unwrap();
        let path = directory.path().join("never.txt");
        let (mut session, capture) = session();
        let context = json!({});
        let fragment = format!("@{{output:{}}}", path.display());

        session.emit_inline(&host, "partial", &context).unwrap();
        let error = session
            .emit_inline(&host, &fragment, &context)
            .unwrap_err();

        assert_eq!(error.get_reason(), NESTED_COMMAND);
        assert_eq!(session.depth(), 1);
        assert!(capture.text().is_empty());
        assert!(!path.exists());
    }

    #[test]
    fn test_execute_writes_to_current_buffer() {
        let (mut session, capture) = session();

        session.execute(&host, "wrap:top", &json!({})).unwrap();
        session.finish().unwrap();

        assert_eq!(capture.text(), "<top>\n");
    }

    #[test]
    fn test_close_resets_root() {
        let (mut session, capture) = session();

        session.write("one");
        session.close().unwrap();
        session.write("two");
        session.close().unwrap();

        assert_eq!(capture.text(), "one\ntwo\n");
    }
}
