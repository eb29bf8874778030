//! Templates that mix host code with output lines.
//!
//! Each line of a template is classified by its first character:
//!
//! - `.` copies the rest of the line to a new line of output, re-indented.
//! - `+` copies the rest of the line to the current line of output.
//! - `!` is a command, either `!output <expression>` or `!stdout`.
//! - Anything else is host code, evaluated for its effect.
//!
//! Empty lines are ignored.
use crate::{
    evaluate::Evaluator,
    log::{Error, INVALID_ARGUMENTS, INVALID_COMMAND},
    region::Region,
    session::Session,
};
use std::fmt::Display;
use tracing::{debug, trace};

/// One classified template line.
#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    /// Redirect output to the file whose name the expression evaluates to.
    Output(String),
    /// Redirect output to standard output.
    Stdout,
    /// Expand the text and write it on a new line at the given column.
    Line { text: String, column: usize },
    /// Expand the text and write it on the current line.
    Inline { text: String },
    /// Evaluate the code for its effect.
    Host(String),
}

impl Display for Instruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Instruction::Output(expression) => write!(f, "output {expression}"),
            Instruction::Stdout => write!(f, "stdout"),
            Instruction::Line { text, column } => write!(f, "line {column} {text:?}"),
            Instruction::Inline { text } => write!(f, "inline {text:?}"),
            Instruction::Host(code) => write!(f, "host {code}"),
        }
    }
}

/// A parsed template.
///
/// # Examples
///
/// ```
/// use ribosome::{Engine, Program, Session, Store};
///
/// let source = "\
/// .struct @{name} {
/// fields | each \"\\n    int @{item};\"
/// .}
/// ";
/// let program = Program::parse("point.dna", source).unwrap();
/// let store = Store::new()
///     .with_must("name", "point")
///     .with_must("fields", vec!["x", "y"]);
///
/// let mut session = Session::new();
/// program.run(&mut session, &Engine::with_builtins(), &store).unwrap();
/// session.finish().unwrap();
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    /// The name of the template, used when reporting errors.
    name: String,
    /// Instructions paired with their one indexed line.
    instructions: Vec<(usize, Instruction)>,
}

impl Program {
    /// Classify each line of the source.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if a command is unknown or has the wrong number
    /// of arguments. The `Error` carries the name and line.
    pub fn parse<T>(name: T, source: &str) -> Result<Self, Error>
    where
        T: Into<String>,
    {
        let name = name.into();
        let mut instructions = vec![];
        let mut offset = 0;

        for (index, raw) in source.split_inclusive('\n').enumerate() {
            let number = index + 1;
            let begin = offset;
            offset += raw.len();

            let line = raw.strip_suffix('\n').unwrap_or(raw);
            let line = line.strip_suffix('\r').unwrap_or(line);
            if line.trim().is_empty() {
                continue;
            }

            let instruction = match line.as_bytes()[0] {
                b'!' => parse_command(source, line, begin)
                    .map_err(|e| e.with_name(&name).with_line(number))?,
                b'.' => {
                    let (column, text) = ltrim(&line[1..]);
                    Instruction::Line {
                        text: text.to_owned(),
                        column,
                    }
                }
                b'+' => {
                    let (_, text) = ltrim(&line[1..]);
                    Instruction::Inline {
                        text: text.to_owned(),
                    }
                }
                _ => Instruction::Host(line.to_owned()),
            };
            trace!(line = number, %instruction, "classified line");
            instructions.push((number, instruction));
        }

        Ok(Self { name, instructions })
    }

    /// Return the name of the template.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Return the instructions paired with their one indexed line.
    pub fn instructions(&self) -> &[(usize, Instruction)] {
        &self.instructions
    }

    /// Execute each instruction in order.
    ///
    /// The [`Session`] is not finished, so that more than one `Program` may
    /// write to it.
    ///
    /// # Errors
    ///
    /// Returns the first [`Error`] encountered. An `Error` that does not
    /// already carry a location is given the name of the template and the
    /// line of the instruction.
    pub fn run<C, E>(&self, session: &mut Session, evaluator: &E, context: &C) -> Result<(), Error>
    where
        C: ?Sized,
        E: Evaluator<C> + ?Sized,
    {
        debug!(name = %self.name, instructions = self.instructions.len(), "running program");

        for (line, instruction) in &self.instructions {
            step(session, evaluator, context, instruction)
                .map_err(|e| e.locate(&self.name, *line))?;
        }

        Ok(())
    }
}

impl Display for Program {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (line, instruction) in &self.instructions {
            writeln!(f, "{}:{line:<4} {instruction}", self.name)?;
        }

        Ok(())
    }
}

/// Execute one instruction.
fn step<C, E>(
    session: &mut Session,
    evaluator: &E,
    context: &C,
    instruction: &Instruction,
) -> Result<(), Error>
where
    C: ?Sized,
    E: Evaluator<C> + ?Sized,
{
    match instruction {
        Instruction::Output(expression) => {
            let path = session.evaluate(evaluator, expression, context)?.into_text();
            session.redirect_to_file(path)
        }
        Instruction::Stdout => session.redirect_to_stdout(),
        Instruction::Line { text, column } => session.emit_line(evaluator, text, *column, context),
        Instruction::Inline { text } => session.emit_inline(evaluator, text, context),
        Instruction::Host(code) => session.execute(evaluator, code, context),
    }
}

/// Parse a command line, beginning with `!`.
fn parse_command(source: &str, line: &str, begin: usize) -> Result<Instruction, Error> {
    let words: Vec<&str> = line[1..].split_whitespace().collect();
    let region: Region = (begin..begin + line.len()).into();

    match words.as_slice() {
        ["output", path] => Ok(Instruction::Output(path.to_string())),
        ["output", ..] => Err(Error::build(INVALID_ARGUMENTS)
            .with_pointer(source, region)
            .with_help("command `output` expects one argument")),
        ["stdout"] => Ok(Instruction::Stdout),
        ["stdout", ..] => Err(Error::build(INVALID_ARGUMENTS)
            .with_pointer(source, region)
            .with_help("command `stdout` expects no arguments")),
        [command, ..] => Err(Error::build(INVALID_COMMAND)
            .with_pointer(source, region)
            .with_help(format!(
                "expected one of `output`, `stdout`, found `{command}`"
            ))),
        [] => Err(Error::build(INVALID_COMMAND)
            .with_pointer(source, region)
            .with_help("expected one of `output`, `stdout` after `!`")),
    }
}

/// Measure and remove the whitespace at the beginning of the text.
///
/// A space counts as one column, a tab as eight.
fn ltrim(text: &str) -> (usize, &str) {
    let mut column = 0;
    for (index, c) in text.char_indices() {
        match c {
            ' ' => column += 1,
            '\t' => column += 8,
            _ => return (column, &text[index..]),
        }
    }

    (column, "")
}
