//! The yes/no boundary consulted before a shredded file is deleted.

use std::io::{self, BufRead, Write};
use std::path::Path;

pub const DELETE_PROMPT: &str = "Do you want to delete the file completely? (Y/N)";

/// Decides whether a shredded file should be removed.
pub trait ConfirmationProvider: Send + Sync {
    fn confirm_deletion(&self, path: &Path) -> io::Result<bool>;
}

/// True iff `response`, minus its line terminator, is `Y` or `y`.
pub fn wants_deletion(response: &str) -> bool {
    response
        .trim_end_matches(['\r', '\n'])
        .eq_ignore_ascii_case("y")
}

/// Prompts on stdout and reads one line from stdin.
#[derive(Debug, Default)]
pub struct ConsolePrompt;

impl ConfirmationProvider for ConsolePrompt {
    fn confirm_deletion(&self, _path: &Path) -> io::Result<bool> {
        let mut stdout = io::stdout();
        writeln!(stdout, "{}", DELETE_PROMPT)?;
        write!(stdout, "# ")?;
        stdout.flush()?;

        let mut response = String::new();
        io::stdin().lock().read_line(&mut response)?;
        Ok(wants_deletion(&response))
    }
}

/// A scripted answer, parsed like console input.
#[derive(Debug, Clone)]
pub struct FixedResponse(pub String);

impl FixedResponse {
    pub fn new(response: impl Into<String>) -> Self {
        Self(response.into())
    }
}

impl ConfirmationProvider for FixedResponse {
    fn confirm_deletion(&self, _path: &Path) -> io::Result<bool> {
        Ok(wants_deletion(&self.0))
    }
}

/// Answers without asking.
#[derive(Debug, Clone, Copy)]
pub struct AutoConfirm(pub bool);

impl ConfirmationProvider for AutoConfirm {
    fn confirm_deletion(&self, _path: &Path) -> io::Result<bool> {
        Ok(self.0)
    }
}
