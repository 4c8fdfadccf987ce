//! Indentation-aware text emission.
//!
//! `SourceWriter` is a scoped handle over one output sink. Each
//! generated file gets its own writer, created and finished on every
//! path, so there is no shared "currently open file" state to leak.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

const INDENT: &str = "    ";

/// Writes indented source text to an underlying sink.
pub struct SourceWriter<W: Write> {
    out: W,
    indent: usize,
    at_line_start: bool,
}

impl SourceWriter<BufWriter<File>> {
    /// Create a writer over a freshly created file.
    pub fn create(path: &Path) -> io::Result<Self> {
        let file = File::create(path)?;
        Ok(SourceWriter::new(BufWriter::new(file)))
    }
}

impl<W: Write> SourceWriter<W> {
    pub fn new(out: W) -> Self {
        SourceWriter {
            out,
            indent: 0,
            at_line_start: true,
        }
    }

    fn pad(&mut self) -> io::Result<()> {
        if self.at_line_start {
            for _ in 0..self.indent {
                self.out.write_all(INDENT.as_bytes())?;
            }
            self.at_line_start = false;
        }
        Ok(())
    }

    /// Write partial text, indenting if at the start of a line.
    pub fn write(&mut self, text: &str) -> io::Result<()> {
        self.pad()?;
        self.out.write_all(text.as_bytes())
    }

    /// Write partial text, then increase the indent for what follows.
    pub fn write_open(&mut self, text: &str) -> io::Result<()> {
        self.write(text)?;
        self.indent += 1;
        Ok(())
    }

    /// Write a full line at the current indent.
    pub fn line(&mut self, text: &str) -> io::Result<()> {
        self.pad()?;
        self.out.write_all(text.as_bytes())?;
        self.out.write_all(b"\n")?;
        self.at_line_start = true;
        Ok(())
    }

    /// Write a full line with no indentation (continuation text,
    /// preprocessor directives).
    pub fn line_raw(&mut self, text: &str) -> io::Result<()> {
        self.out.write_all(text.as_bytes())?;
        self.out.write_all(b"\n")?;
        self.at_line_start = true;
        Ok(())
    }

    pub fn blank(&mut self) -> io::Result<()> {
        self.line("")
    }

    /// Write a line, then increase the indent.
    pub fn open(&mut self, text: &str) -> io::Result<()> {
        self.line(text)?;
        self.indent += 1;
        Ok(())
    }

    /// Decrease the indent, then write a line.
    pub fn close(&mut self, text: &str) -> io::Result<()> {
        self.indent = self.indent.saturating_sub(1);
        self.line(text)
    }

    /// Flush and hand back the sink.
    pub fn finish(mut self) -> io::Result<W> {
        self.out.flush()?;
        Ok(self.out)
    }
}
