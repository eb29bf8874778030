use serde_json::Value;
use std::fmt::{Arguments, Write};

/// Return the text that replaces an expression marker when the expression
/// produced the given [`Value`].
///
/// # Examples
///
/// ```
/// use ribosome::render_value;
/// use serde_json::json;
///
/// assert_eq!(render_value(&json!(2)), "2");
/// assert_eq!(render_value(&json!("two")), "two");
/// assert_eq!(render_value(&json!(null)), "");
/// ```
pub fn render_value(value: &Value) -> String {
    let mut buffer = String::new();
    Formatter::new(&mut buffer)
        .write_value(value)
        .expect("writing to a string should not fail");

    buffer
}

/// A wrapper around an underlying buffer which implements the Write trait
/// that provides methods to write various types in a desirable format.
pub struct Formatter<'a> {
    buffer: &'a mut (dyn Write + 'a),
}

impl<'a> Formatter<'a> {
    /// Create a new Formatter which writes to the given String.
    pub fn new(store: &'a mut String) -> Self {
        Self { buffer: store }
    }

    /// Write the given Value to the Formatter buffer.
    ///
    /// Strings are written without quotes and null is written as nothing
    /// at all, so generated code never contains a stray "null".
    ///
    /// # Errors
    ///
    /// The Formatter supports all Value types, so the only error that will
    /// be returned is propogated from the [write!] macro itself.
    pub fn write_value(&mut self, value: &Value) -> std::fmt::Result {
        match value {
            Value::Null => Ok(()),
            Value::Bool(bool) => write!(self.buffer, "{}", bool),
            Value::Number(number) => write!(self.buffer, "{}", number),
            Value::String(string) => write!(self.buffer, "{}", string),
            Value::Array(array) => {
                write!(self.buffer, "[")?;
                let mut iter = array.iter();
                if let Some(item) = iter.next() {
                    self.write_value(item)?;
                    for item in iter {
                        write!(self.buffer, ", ")?;
                        self.write_value(item)?;
                    }
                }
                write!(self.buffer, "]")
            }
            Value::Object(object) => {
                write!(self.buffer, "{{")?;
                let mut iter = object.iter();
                if let Some((key, value)) = iter.next() {
                    write!(self.buffer, "{}: ", key)?;
                    self.write_value(value)?;
                    for (key, value) in iter {
                        write!(self.buffer, ", {}: ", key)?;
                        self.write_value(value)?;
                    }
                }
                write!(self.buffer, "}}")
            }
        }
    }
}

impl Write for Formatter<'_> {
    #[inline]
    fn write_str(&mut self, s: &str) -> std::fmt::Result {
        Write::write_str(self.buffer, s)
    }

    #[inline]
    fn write_char(&mut self, c: char) -> std::fmt::Result {
        Write::write_char(self.buffer, c)
    }

    #[inline]
    fn write_fmt(&mut self, args: Arguments<'_>) -> std::fmt::Result {
        Write::write_fmt(self.buffer, args)
    }
}

#[cfg(test)]
mod tests {
    use super::render_value;
    use serde_json::json;

    #[test]
    fn test_render_scalars() {
        assert_eq!(render_value(&json!(true)), "true");
        assert_eq!(render_value(&json!(10)), "10");
        assert_eq!(render_value(&json!(2.5)), "2.5");
        assert_eq!(render_value(&json!("text")), "text");
        assert_eq!(render_value(&json!(null)), "");
    }

    #[test]
    fn test_render_collections() {
        assert_eq!(render_value(&json!([1, "two", 3])), "[1, two, 3]");
        assert_eq!(render_value(&json!({"a": 1, "b": [true]})), "{a: 1, b: [true]}");
        assert_eq!(render_value(&json!([])), "[]");
    }
}
