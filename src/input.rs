use crate::commands::CommandDispatcher;
use crate::core::error::AppError;

use console::style;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{CompletionType, Config, Context, EditMode, Editor, Helper};

/// Source of user replies between turns.
pub trait LineSource {
    /// Next line of input, or `None` once the user has ended the session.
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>, AppError>;
}

/// Completes slash-command names after a leading `/`
pub struct CommandCompleter {
    command_registry: CommandDispatcher,
}

impl CommandCompleter {
    pub fn new(command_registry: CommandDispatcher) -> Self {
        Self { command_registry }
    }
}

impl Completer for CommandCompleter {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let Some(command_part) = line.get(..pos).and_then(|l| l.strip_prefix('/')) else {
            return Ok((0, Vec::new()));
        };

        let matches: Vec<Pair> = self
            .command_registry
            .get_command_names()
            .into_iter()
            .filter(|cmd| cmd.starts_with(&command_part.to_lowercase()))
            .map(|cmd| Pair {
                display: cmd.clone(),
                replacement: cmd,
            })
            .collect();

        // 1 is the position after '/'
        Ok((1, matches))
    }
}

impl Helper for CommandCompleter {}

impl Hinter for CommandCompleter {
    type Hint = String;
}

impl Highlighter for CommandCompleter {}

impl Validator for CommandCompleter {}

/// Interactive input backed by a rustyline editor.
pub struct EditorInput {
    editor: Editor<CommandCompleter, DefaultHistory>,
}

impl EditorInput {
    pub fn new(command_registry: CommandDispatcher) -> Result<Self, AppError> {
        let config = Config::builder()
            .history_ignore_space(true)
            .completion_type(CompletionType::List)
            .edit_mode(EditMode::Emacs)
            .build();

        let mut editor = Editor::with_config(config)
            .map_err(|e| AppError::Input(format!("failed to create line editor: {}", e)))?;
        editor.set_helper(Some(CommandCompleter::new(command_registry)));

        Ok(Self { editor })
    }
}

impl LineSource for EditorInput {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>, AppError> {
        let prompt = style(prompt).bold().cyan().to_string();
        match self.editor.readline(&prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = self.editor.add_history_entry(line.as_str());
                }
                Ok(Some(line))
            }
            // Ctrl-C / Ctrl-D
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(None),
            Err(err) => Err(AppError::Input(err.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::Command;

    fn complete(line: &str) -> (usize, Vec<String>) {
        let completer = CommandCompleter::new(CommandDispatcher::default());
        let history = DefaultHistory::new();
        let ctx = Context::new(&history);
        let (start, pairs) = completer.complete(line, line.len(), &ctx).unwrap();
        let mut names: Vec<String> = pairs.into_iter().map(|p| p.replacement).collect();
        names.sort();
        (start, names)
    }

    #[test]
    fn completes_command_names() {
        assert_eq!(complete("/c"), (1, vec!["copy".to_string()]));
        assert_eq!(complete("/e"), (1, vec!["exit".to_string()]));
        assert_eq!(complete("/").1.len(), Command::NAMES.len());
    }

    #[test]
    fn plain_text_is_not_completed() {
        assert!(complete("hello").1.is_empty());
    }
}
