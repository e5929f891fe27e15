//! Line input for the player's commands

use std::io::{self, BufRead, Write};

use log::debug;

pub struct LineInput<R: BufRead> {
    reader: R,
    /// Input buffer for building lines
    buffer: String,
}

impl LineInput<io::StdinLock<'static>> {
    pub fn stdin() -> Self {
        LineInput::new(io::stdin().lock())
    }
}

impl<R: BufRead> LineInput<R> {
    pub fn new(reader: R) -> Self {
        LineInput {
            reader,
            buffer: String::new(),
        }
    }

    /// Show the prompt and read one command line.
    ///
    /// Returns `Ok(None)` at end of input, so a piped script ends the
    /// session instead of feeding empty commands forever.
    pub fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        let mut out = io::stdout();
        write!(out, "{}", prompt)?;
        out.flush()?;

        self.buffer.clear();
        let bytes_read = self.reader.read_line(&mut self.buffer)?;
        if bytes_read == 0 {
            debug!("Input: EOF");
            return Ok(None);
        }

        let line = self.buffer.trim_end_matches(['\n', '\r']).to_string();
        debug!("Input: '{}'", line);
        Ok(Some(line))
    }
}
