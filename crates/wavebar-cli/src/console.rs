//! Line-based console with a coloured message channel

use colored::Colorize;
use std::fmt::Display;
use std::io::{self, BufRead, Write};

/// Console over any line reader and writer
///
/// The session is generic over this so it can be driven by scripted input.
pub struct Console<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Next input line without its line ending, `None` at end of input
    pub fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let trimmed = line.trim_end_matches(['\r', '\n']).len();
        line.truncate(trimmed);
        Ok(Some(line))
    }

    /// Prompt label, left on the current line
    pub fn prompt(&mut self, label: &str) -> io::Result<()> {
        write!(self.output, "{}", label)?;
        self.output.flush()
    }

    pub fn line(&mut self, text: impl Display) -> io::Result<()> {
        writeln!(self.output, "{}", text)
    }

    /// Recoverable errors
    pub fn error(&mut self, text: impl Display) -> io::Result<()> {
        writeln!(self.output, "{}", text.to_string().red())
    }

    /// Status lines and menus
    pub fn highlight(&mut self, text: impl Display) -> io::Result<()> {
        writeln!(self.output, "{}", text.to_string().black().on_white())
    }

    /// Stream details and stored parameters
    pub fn notice(&mut self, text: impl Display) -> io::Result<()> {
        writeln!(self.output, "{}", text.to_string().yellow())
    }

    pub fn output(&self) -> &W {
        &self.output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_read_line_strips_line_endings() {
        let mut console = Console::new(Cursor::new("first\r\nsecond\n\nlast"), Vec::new());
        assert_eq!(console.read_line().unwrap().as_deref(), Some("first"));
        assert_eq!(console.read_line().unwrap().as_deref(), Some("second"));
        assert_eq!(console.read_line().unwrap().as_deref(), Some(""));
        assert_eq!(console.read_line().unwrap().as_deref(), Some("last"));
        assert_eq!(console.read_line().unwrap(), None);
    }

    #[test]
    fn test_messages_are_written() {
        let mut console = Console::new(Cursor::new(""), Vec::new());
        console.prompt("Set Block Size: ").unwrap();
        console.line("plain").unwrap();
        console.error("Not a valid file!").unwrap();

        let text = String::from_utf8(console.output().clone()).unwrap();
        assert!(text.starts_with("Set Block Size: plain\n"));
        assert!(text.contains("Not a valid file!"));
    }
}
