pub mod dispatcher;
pub mod handler;

pub use dispatcher::{CommandDispatcher, CommandOutcome};

/// Slash commands accepted between turns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Copy,
    Bye,
    Quit,
    Exit,
    Help,
    Unknown(String),
}

impl Command {
    /// Names offered for completion, without the leading slash.
    pub const NAMES: &'static [&'static str] = &["copy", "bye", "quit", "exit", "help"];

    /// Parses a `/`-prefixed line. Returns `None` for ordinary input.
    pub fn parse(input: &str) -> Option<Command> {
        let name = input.trim().strip_prefix('/')?.trim().to_lowercase();

        Some(match name.as_str() {
            "copy" => Command::Copy,
            "bye" => Command::Bye,
            "quit" => Command::Quit,
            "exit" => Command::Exit,
            "help" => Command::Help,
            _ => Command::Unknown(name),
        })
    }
}
