use super::{Command, handler};
use crate::core::clipboard::ClipboardSink;
use crate::core::error::CommandError;
use std::io::Write;
use std::sync::Arc;

/// What the conversation loop does after a command ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    Continue,
    Exit,
}

#[derive(Clone, Default)]
pub struct CommandDispatcher {
    clipboard: Option<Arc<dyn ClipboardSink>>,
}

impl CommandDispatcher {
    pub fn new(clipboard: Option<Arc<dyn ClipboardSink>>) -> Self {
        Self { clipboard }
    }

    pub fn execute(
        &self,
        command: &Command,
        last_reply: Option<&str>,
        out: &mut dyn Write,
    ) -> Result<CommandOutcome, CommandError> {
        match command {
            Command::Bye | Command::Quit | Command::Exit => handler::handle_exit(out),
            Command::Copy => handler::handle_copy(last_reply, self.clipboard.as_deref(), out),
            Command::Help => handler::handle_help(out),
            Command::Unknown(name) => Err(CommandError::Unknown(name.clone())),
        }
    }

    pub fn get_command_names(&self) -> Vec<String> {
        Command::NAMES.iter().map(|name| name.to_string()).collect()
    }
}
