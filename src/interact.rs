//! Interactive prompts and text editing

use crate::error::{Error, Result};
use dialoguer::{Confirm, Editor, Select};
use std::io::ErrorKind;
use std::path::Path;

/// Asks the user questions
pub trait Prompter: Send + Sync {
    /// Yes/no question
    fn confirm(&self, prompt: &str, default: bool) -> Result<bool>;

    /// Pick one of `options`, returning its index
    fn select(&self, prompt: &str, default: Option<usize>, options: &[&str]) -> Result<usize>;
}

/// Edits text in the user's editor
pub trait TextEditor: Send + Sync {
    /// Open `text` in an editor; `file_name` decides the temp file's extension
    fn edit(&self, file_name: &str, text: &str) -> Result<String>;
}

/// Terminal prompts via dialoguer
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn confirm(&self, prompt: &str, default: bool) -> Result<bool> {
        Confirm::new()
            .with_prompt(prompt)
            .default(default)
            .interact()
            .map_err(|e| prompt_error("Failed to read confirmation", e))
    }

    fn select(&self, prompt: &str, default: Option<usize>, options: &[&str]) -> Result<usize> {
        let mut select = Select::new().with_prompt(prompt).items(options);
        if let Some(index) = default {
            select = select.default(index);
        }
        select
            .interact()
            .map_err(|e| prompt_error("Failed to read selection", e))
    }
}

/// Ctrl-C at a prompt is a cancellation, not a failure
fn prompt_error(context: &str, err: dialoguer::Error) -> Error {
    match err {
        dialoguer::Error::IO(io) if io.kind() == ErrorKind::Interrupted => Error::Cancelled,
        other => Error::Prompt(format!("{context}: {other}")),
    }
}

/// `$VISUAL`/`$EDITOR` editing via dialoguer
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalEditor;

impl TextEditor for TerminalEditor {
    fn edit(&self, file_name: &str, text: &str) -> Result<String> {
        let extension = Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map_or_else(|| ".txt".to_string(), |e| format!(".{e}"));

        let edited = Editor::new()
            .extension(&extension)
            .edit(text)
            .map_err(|e| Error::Prompt(format!("Failed to run editor: {e}")))?;

        // Closing the editor without saving keeps the text as it was
        Ok(edited.unwrap_or_else(|| text.to_string()))
    }
}
