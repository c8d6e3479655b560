//! Console writer implementation

use crate::core::{LoggerError, Result, WriteHandle};
use parking_lot::Mutex;
use std::io::{self, Write};

/// Which standard stream a [`ConsoleWriter`] targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleStream {
    Stdout,
    Stderr,
}

impl ConsoleStream {
    fn label(self) -> &'static str {
        match self {
            ConsoleStream::Stdout => "stdout",
            ConsoleStream::Stderr => "stderr",
        }
    }
}

/// Writes encoded records to stdout or stderr.
///
/// Each record is written under the stream's lock so lines from concurrent
/// emitters never interleave.
pub struct ConsoleWriter {
    stream: ConsoleStream,
    closed: Mutex<bool>,
}

impl ConsoleWriter {
    pub fn new(stream: ConsoleStream) -> Self {
        Self {
            stream,
            closed: Mutex::new(false),
        }
    }

    pub fn stdout() -> Self {
        Self::new(ConsoleStream::Stdout)
    }

    pub fn stderr() -> Self {
        Self::new(ConsoleStream::Stderr)
    }

    pub fn stream(&self) -> ConsoleStream {
        self.stream
    }

    fn ensure_open(&self) -> Result<()> {
        if *self.closed.lock() {
            return Err(LoggerError::writer(format!("{} writer is closed", self.stream.label())));
        }
        Ok(())
    }
}

impl Default for ConsoleWriter {
    fn default() -> Self {
        Self::stdout()
    }
}

impl WriteHandle for ConsoleWriter {
    fn write_all(&self, buf: &[u8]) -> Result<()> {
        self.ensure_open()?;
        match self.stream {
            ConsoleStream::Stdout => io::stdout().lock().write_all(buf)?,
            ConsoleStream::Stderr => io::stderr().lock().write_all(buf)?,
        }
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        match self.stream {
            ConsoleStream::Stdout => io::stdout().flush()?,
            ConsoleStream::Stderr => io::stderr().flush()?,
        }
        Ok(())
    }

    fn close(&self) -> Result<()> {
        let mut closed = self.closed.lock();
        if *closed {
            return Ok(());
        }
        *closed = true;
        drop(closed);
        // The process owns the standard streams; closing only stops our writes
        self.flush()
    }

    fn destination(&self) -> &str {
        self.stream.label()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_close_rejects_later_writes() {
        let writer = ConsoleWriter::stderr();
        assert_eq!(writer.destination(), "stderr");

        writer.close().unwrap();
        writer.close().unwrap();
        assert!(writer.write_all(b"late\n").is_err());
    }
}
