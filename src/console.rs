//! Operator text channel.
//!
//! The command processor talks to the operator only through the `Console`
//! trait, so the whole dispatch loop runs against a scripted channel in
//! tests. The terminal implementation echoes as it reads; the masked
//! variant echoes a mask character per input byte instead.

use std::io::Write;

use anyhow::Result;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

/// Reference input cap, characters per line.
pub const MAX_LINE: usize = 20;

/// Duplex line-oriented text channel.
///
/// Reads block until the operator finishes a line; `Ok(None)` means the
/// channel is gone (EOF or interrupt) and the caller should wind down.
pub trait Console {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>>;

    fn read_secret(&mut self, prompt: &str) -> Result<Option<String>>;

    fn print(&mut self, text: &str);

    fn println(&mut self, text: &str) {
        self.print(text);
        self.print("\n");
    }

    /// Audible signal (BEL).
    fn alert(&mut self);

    fn clear_screen(&mut self);
}

fn cap(line: &str) -> String {
    match line.char_indices().nth(MAX_LINE) {
        Some((idx, _)) => line[..idx].to_string(),
        None => line.to_string(),
    }
}

/// Live terminal backed by rustyline (echoed reads, history) and a
/// dialoguer password prompt for masked reads.
pub struct TerminalConsole {
    editor: DefaultEditor,
}

impl TerminalConsole {
    pub fn new() -> Result<Self> {
        Ok(Self {
            editor: DefaultEditor::new()?,
        })
    }
}

impl Console for TerminalConsole {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        match self.editor.readline(prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = self.editor.add_history_entry(line.as_str());
                }
                Ok(Some(cap(&line)))
            }
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn read_secret(&mut self, prompt: &str) -> Result<Option<String>> {
        // dialoguer renders its own "prompt:" suffix.
        let prompt = prompt.trim_end().trim_end_matches(':').to_string();
        match dialoguer::Password::new().with_prompt(prompt).interact() {
            Ok(line) => Ok(Some(cap(&line))),
            Err(dialoguer::Error::IO(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn print(&mut self, text: &str) {
        print!("{text}");
        let _ = std::io::stdout().flush();
    }

    fn alert(&mut self) {
        self.print("\x07");
    }

    fn clear_screen(&mut self) {
        self.print("\x1b[2J\x1b[1;1H");
    }
}
