use tracing::trace;

/// A stack of text buffers, one per level of nested expression evaluation.
///
/// The bottom buffer is the root of the document and is never removed by
/// [`Stack::pop`]. Expression evaluation pushes a fresh buffer so that any
/// text emitted while evaluating lands in isolation, and pops it again once
/// the expression returns.
#[derive(Debug)]
pub struct Stack {
    frames: Vec<Vec<String>>,
}

impl Stack {
    /// Create a new [`Stack`] holding one empty root buffer.
    #[inline]
    pub fn new() -> Self {
        Self {
            frames: vec![vec![]],
        }
    }

    /// Push a new empty buffer on top of the [`Stack`].
    #[inline]
    pub fn push(&mut self) {
        self.frames.push(vec![]);
        trace!(depth = self.frames.len(), "pushed frame");
    }

    /// Append the text to the buffer on top of the [`Stack`].
    #[inline]
    pub fn write<T>(&mut self, text: T)
    where
        T: Into<String>,
    {
        self.frames
            .last_mut()
            .expect("stack must not be empty when writing")
            .push(text.into());
    }

    /// Remove the top buffer and return its fragments joined in append order.
    ///
    /// Returns `None` when nothing was written into the buffer, which is not
    /// the same as a buffer that holds empty text.
    ///
    /// # Panics
    ///
    /// Panics if only the root buffer remains.
    pub fn pop(&mut self) -> Option<String> {
        if self.frames.len() == 1 {
            panic!("root frame must never be removed");
        }
        let frame = self.frames.pop().unwrap_or_default();
        trace!(depth = self.frames.len(), fragments = frame.len(), "popped frame");

        if frame.is_empty() {
            None
        } else {
            Some(frame.concat())
        }
    }

    /// Remove the top buffer and return its fragments joined in append order.
    ///
    /// # Panics
    ///
    /// Panics if only the root buffer remains.
    #[inline]
    pub fn pop_and_join(&mut self) -> String {
        self.pop().unwrap_or_default()
    }

    /// Take every fragment of the root buffer and reset the [`Stack`] to a
    /// single empty root buffer.
    ///
    /// # Panics
    ///
    /// Panics if any buffer other than the root is still on the `Stack`.
    pub fn take_root(&mut self) -> Vec<String> {
        assert!(
            self.frames.len() == 1,
            "stack must only hold the root frame when flushing"
        );
        let root = std::mem::take(&mut self.frames[0]);
        self.frames = vec![vec![]];

        root
    }

    /// Return the number of buffers on the [`Stack`], including the root.
    #[inline]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Return true if evaluation is happening inside of a nested expression.
    #[inline]
    pub fn is_nested(&self) -> bool {
        self.frames.len() > 1
    }
}

impl Default for Stack {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::Stack;

    #[test]
    fn test_write_root() {
        let mut stack = Stack::new();
        stack.write("one");
        stack.write(" two");

        assert_eq!(stack.take_root(), vec!["one", " two"]);
        assert_eq!(stack.depth(), 1);
        assert!(stack.take_root().is_empty());
    }

    #[test]
    fn test_push_pop_isolation() {
        let mut stack = Stack::new();
        stack.write("root");
        stack.push();
        stack.write("a");
        stack.write("b");

        assert!(stack.is_nested());
        assert_eq!(stack.pop_and_join(), "ab");
        assert!(!stack.is_nested());
        assert_eq!(stack.take_root(), vec!["root"]);
    }

    #[test]
    fn test_pop_distinguishes_untouched_frame() {
        let mut stack = Stack::new();
        stack.push();
        assert_eq!(stack.pop(), None);

        stack.push();
        stack.write("");
        assert_eq!(stack.pop(), Some(String::new()));
    }

    #[test]
    #[should_panic(expected = "root frame must never be removed")]
    fn test_pop_root() {
        let mut stack = Stack::new();

        stack.pop();
    }

    #[test]
    #[should_panic(expected = "stack must only hold the root frame when flushing")]
    fn test_take_root_nested() {
        let mut stack = Stack::new();
        stack.push();

        stack.take_root();
    }
}
