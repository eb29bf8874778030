use crate::log::{error_io, Error};
use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};
use tracing::debug;

/// The destination that expanded documents are flushed to.
///
/// A `Sink` starts out writing to standard output. Redirecting it to a file
/// keeps the standard output handle around, so that a later redirect back to
/// standard output reuses it.
pub struct Sink {
    /// Standard output, or whatever stands in for it.
    stdout: Box<dyn Write>,
    /// The open file, when the `Sink` is file backed.
    file: Option<(PathBuf, BufWriter<File>)>,
}

impl Sink {
    /// Create a new [`Sink`] that writes to the process standard output.
    #[inline]
    pub fn new() -> Self {
        Self::with_stdout(io::stdout())
    }

    /// Create a new [`Sink`] that treats the given writer as standard output.
    #[inline]
    pub fn with_stdout<W>(writer: W) -> Self
    where
        W: Write + 'static,
    {
        Self {
            stdout: Box::new(writer),
            file: None,
        }
    }

    /// Return true if the [`Sink`] currently writes to a file.
    #[inline]
    pub fn is_file(&self) -> bool {
        self.file.is_some()
    }

    /// Return the path of the file the [`Sink`] writes to, if any.
    #[inline]
    pub fn path(&self) -> Option<&Path> {
        self.file.as_ref().map(|(path, _)| path.as_path())
    }

    /// Write the fragments followed by a newline, then close the file if the
    /// [`Sink`] is file backed.
    ///
    /// Once a file is closed the `Sink` falls back to standard output.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when writing or closing fails.
    pub fn flush<I, T>(&mut self, fragments: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let target = self.describe();
        let writer: &mut dyn Write = match self.file.as_mut() {
            Some((_, file)) => file,
            None => self.stdout.as_mut(),
        };

        for fragment in fragments {
            writer
                .write_all(fragment.as_ref().as_bytes())
                .map_err(|e| error_io(&target, e))?;
        }
        writer.write_all(b"\n").map_err(|e| error_io(&target, e))?;
        writer.flush().map_err(|e| error_io(&target, e))?;

        if let Some((path, file)) = self.file.take() {
            debug!(path = %path.display(), "closing output file");
            file.into_inner()
                .map_err(|e| error_io(&target, e.error()))?;
        }

        Ok(())
    }

    /// Open the file at the given path and make it the destination.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when the file cannot be created.
    pub fn open<P>(&mut self, path: P) -> Result<(), Error>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| error_io(&path.display().to_string(), e))?;
        debug!(path = %path.display(), "opened output file");
        self.file = Some((path.to_path_buf(), BufWriter::new(file)));

        Ok(())
    }

    /// Make standard output the destination.
    ///
    /// The previous file, if any, is dropped without flushing. Callers flush
    /// through [`Sink::flush`] first.
    #[inline]
    pub fn use_stdout(&mut self) {
        self.file = None;
    }

    fn describe(&self) -> String {
        match self.path() {
            Some(path) => path.display().to_string(),
            None => "<stdout>".to_string(),
        }
    }
}

impl Default for Sink {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Sink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sink").field("file", &self.path()).finish()
    }
}
