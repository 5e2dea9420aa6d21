use crate::commands::CommandDispatcher;
use crate::config::Config;
use crate::core::error::LeetobError;

use console::style;
use rustyline::completion::{Completer, FilenameCompleter, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::{Hinter, HistoryHinter};
use rustyline::history::FileHistory;
use rustyline::validate::Validator;
use rustyline::{CompletionType, Config as EditorConfig, Context, EditMode, Editor, Helper};
use std::borrow::Cow;
use std::path::PathBuf;

/// Prefix for plugin commands typed in the console (`.ask`, `.set-model`, ...).
pub const COMMAND_PREFIX: char = '.';

/// Console-only commands handled by the REPL itself.
pub const META_COMMANDS: &[&str] = &["attach", "detach", "reply", "press", "help", "quit"];

/// Completes plugin commands after `.`, meta commands after `/`, and paths after `/attach `.
pub struct ReplCompleter {
    filename_completer: FilenameCompleter,
    command_registry: CommandDispatcher,
}

impl ReplCompleter {
    pub fn new(command_registry: CommandDispatcher) -> Self {
        Self {
            filename_completer: FilenameCompleter::new(),
            command_registry,
        }
    }
}

impl Completer for ReplCompleter {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let typed = &line[..pos];

        if typed.starts_with("/attach ") {
            return self.filename_completer.complete(line, pos, ctx);
        }

        let candidates: Vec<String> = if let Some(partial) = typed.strip_prefix(COMMAND_PREFIX) {
            self.command_registry
                .get_command_names()
                .into_iter()
                .filter(|cmd| cmd.starts_with(partial))
                .collect()
        } else if let Some(partial) = typed.strip_prefix('/') {
            META_COMMANDS
                .iter()
                .filter(|cmd| cmd.starts_with(partial))
                .map(|cmd| cmd.to_string())
                .collect()
        } else {
            Vec::new()
        };

        if candidates.is_empty() || typed.contains(char::is_whitespace) {
            return Ok((pos, Vec::new()));
        }

        let matches = candidates
            .into_iter()
            .map(|cmd| Pair {
                display: cmd.clone(),
                replacement: cmd,
            })
            .collect();
        Ok((1, matches)) // 1 is the position after the prefix
    }
}

/// Helper struct that combines the rustyline components
pub struct ReplHelper {
    completer: ReplCompleter,
    hinter: HistoryHinter,
}

impl ReplHelper {
    pub fn new(command_registry: CommandDispatcher) -> Self {
        Self {
            completer: ReplCompleter::new(command_registry),
            hinter: HistoryHinter {},
        }
    }
}

impl Helper for ReplHelper {}

impl Completer for ReplHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        self.completer.complete(line, pos, ctx)
    }
}

impl Hinter for ReplHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, ctx: &Context<'_>) -> Option<String> {
        self.hinter.hint(line, pos, ctx)
    }
}

impl Highlighter for ReplHelper {
    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        Cow::Owned(style(hint).dim().to_string())
    }
}

impl Validator for ReplHelper {}

fn history_path() -> PathBuf {
    Config::config_dir().join("input_history.txt")
}

/// Creates a configured rustyline editor
pub fn create_editor(
    command_registry: CommandDispatcher,
) -> Result<Editor<ReplHelper, FileHistory>, LeetobError> {
    let config = EditorConfig::builder()
        .history_ignore_space(true)
        .completion_type(CompletionType::List)
        .edit_mode(EditMode::Emacs)
        .build();

    let mut editor = Editor::with_config(config)
        .map_err(|e| LeetobError::Input(format!("Failed to create line editor: {}", e)))?;

    editor.set_helper(Some(ReplHelper::new(command_registry)));
    let _ = editor.load_history(&history_path());

    Ok(editor)
}

/// Reads a line of input. `None` means the user asked to leave.
pub fn read_input(
    editor: &mut Editor<ReplHelper, FileHistory>,
) -> Result<Option<String>, LeetobError> {
    let prompt = style("> ").bold().cyan().to_string();
    match editor.readline(&prompt) {
        Ok(line) => {
            if !line.trim().is_empty() {
                editor
                    .add_history_entry(&line)
                    .map_err(|e| LeetobError::Input(format!("Failed to add history entry: {}", e)))?;
            }
            Ok(Some(line))
        }
        Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
            println!("Exiting...");
            Ok(None)
        }
        Err(err) => Err(LeetobError::Input(format!("Input error: {}", err))),
    }
}

/// Saves the editor history
pub fn save_history(editor: &mut Editor<ReplHelper, FileHistory>) -> Result<(), LeetobError> {
    let history_path = history_path();

    if let Some(parent) = history_path.parent() {
        if !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|e| {
                LeetobError::Input(format!("Failed to create history directory: {}", e))
            })?;
        }
    }

    editor
        .save_history(&history_path)
        .map_err(|e| LeetobError::Input(format!("Failed to save history: {}", e)))
}
