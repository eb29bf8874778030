use super::{Pointer, RED, RESET};
use crate::{log::Visual, region::Region};
use std::fmt::{Debug, Display, Formatter, Result};

/// Describes an error, and allows adding a contextual help text and visualization.
///
/// # Examples
///
/// Creating an [`Error`] that includes a [`Visual`] of type [`Pointer`]:
///
/// ```
/// use ribosome::{Error, Region};
///
/// Error::build("invalid command")
///     .with_pointer("!separate", Region::new(1..9))
///     .with_name("template.dna")
///     .with_line(1)
///     .with_help("expected one of `output`, `stdout`");
/// ```
///
/// When printed with `println!("{:#}", error)` the [`Error`] produces this output:
///
/// ```text
/// error: template.dna:1 - invalid command
///   --> template.dna:1:2
///    |
///  1 | !separate
///    |  ^^^^^^^^
///    |
///   = help: expected one of `output`, `stdout`
/// ```
pub struct Error {
    /// Describes the cause of the [`Error`].
    reason: String,
    /// A visualization to help illustrate the [`Error`].
    visual: Option<Box<dyn Visual>>,
    /// Additional information to display with the [`Error`].
    help: Option<String>,
    /// The name of the template that the [`Error`] comes from.
    name: Option<String>,
    /// The one indexed template line that the [`Error`] comes from.
    line: Option<usize>,
}

impl Error {
    /// Create a new [`Error`] with the given reason text.
    ///
    /// The additional fields may be populated using the various methods
    /// defined on `Error`.
    ///
    /// # Examples
    ///
    /// ```
    /// use ribosome::Error;
    ///
    /// Error::build("invalid arguments")
    ///     .with_help("command `stdout` expects no arguments");
    /// ```
    pub fn build<T>(reason: T) -> Self
    where
        T: Into<String>,
    {
        Error {
            reason: reason.into(),
            name: None,
            visual: None,
            help: None,
            line: None,
        }
    }

    /// Set the name text, which is the name of the template that the [`Error`]
    /// is related to.
    pub fn with_name<T>(mut self, text: T) -> Self
    where
        T: Into<String>,
    {
        self.name = Some(text.into());

        self
    }

    /// Set the one indexed line of the template that the [`Error`] is related to.
    pub fn with_line(mut self, line: usize) -> Self {
        self.line = Some(line);

        self
    }

    /// Set the visualization to a new [`Pointer`] with the given source text and
    /// [`Region`].
    pub fn with_pointer<T>(mut self, source: &str, region: T) -> Self
    where
        T: Into<Region>,
    {
        self.visual = Some(Box::new(Pointer::new(source, region.into())));

        self
    }

    /// Set the visualization to a new [`Pointer`], unless the [`Error`]
    /// already has a visualization.
    pub fn or_pointer<T>(self, source: &str, region: T) -> Self
    where
        T: Into<Region>,
    {
        match self.visual {
            Some(_) => self,
            None => self.with_pointer(source, region),
        }
    }

    /// Return true if the [`Error`] has a visualization.
    pub fn is_visual(&self) -> bool {
        self.visual.is_some()
    }

    /// Set the help text, which is contextual information to accompany the
    /// reason text.
    pub fn with_help<T>(mut self, text: T) -> Self
    where
        T: Into<String>,
    {
        self.help = Some(text.into());

        self
    }

    /// Attach the template name and line, unless the [`Error`] already
    /// carries a location.
    pub fn locate<T>(self, name: T, line: usize) -> Self
    where
        T: Into<String>,
    {
        if self.name.is_some() || self.line.is_some() {
            return self;
        }

        self.with_name(name).with_line(line)
    }

    /// Return the reason text.
    pub fn get_reason(&self) -> &str {
        &self.reason
    }

    /// Return the help text, if any.
    pub fn get_help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    /// Return the name of the template that the error is related to.
    pub fn get_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Return the template line that the error is related to.
    pub fn get_line(&self) -> Option<usize> {
        self.line
    }
}

impl Debug for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        if !f.alternate() {
            writeln!(f, "{self:#}")?;
        }
        f.debug_struct("Error")
            .field("reason", &self.reason)
            .field("name", &self.name)
            .field("line", &self.line)
            .field("visual", &self.visual)
            .field("help", &self.help)
            .finish()?;

        Ok(())
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let header = format!("{RED}error{RESET}");
        write!(f, "{header}: ")?;
        if let (Some(name), Some(line)) = (&self.name, self.line) {
            write!(f, "{name}:{line} - ")?;
        }
        write!(f, "{}", self.reason)?;

        if f.alternate() {
            match &self.visual {
                Some(visual) => {
                    return visual.display(f, self.name.as_deref(), self.help.as_deref())
                }
                None => {
                    if let Some(help) = &self.help {
                        write!(f, "\n  = help: {help}")?;
                    }
                }
            }
        }

        Ok(())
    }
}

impl std::error::Error for Error {}

impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        self.reason == other.reason
            && self.help == other.help
            && self.name == other.name
            && self.line == other.line
    }
}
