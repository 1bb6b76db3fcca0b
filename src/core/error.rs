use std::io;
use thiserror::Error;

/// Longest slice of a non-2xx response body kept for diagnostics.
const BODY_SNIPPET_LIMIT: usize = 512;

/// Unified error type for prompt-builder
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration file missing or unreadable
    #[error("config error: {0}")]
    Config(String),

    /// System prompt file could not be read
    #[error("system prompt not found: {0}")]
    SystemPrompt(String),

    /// No model in config and none given on the command line
    #[error("no model specified\n\nSet 'model' in config or use --model flag")]
    NoModel,

    /// The request could not be established
    #[error("failed to connect to LLM server: {0}")]
    Connection(String),

    /// Backend answered with a non-2xx status
    #[error("LLM request failed: {status} - {body}")]
    Status { status: u16, body: String },

    /// A streamed frame could not be decoded
    #[error("failed to parse streaming chunk: {0}")]
    Parse(String),

    /// The response body broke off while streaming
    #[error("error reading stream: {0}")]
    Stream(String),

    /// IO-related errors, including failures of the output sinks
    #[error("IO error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },

    /// Non-interactive run where the backend asked a question
    #[error("LLM requested clarification but stdin is not a TTY")]
    Clarification,

    /// User input errors
    #[error("failed to read input: {0}")]
    Input(String),
}

impl AppError {
    pub fn status(status: u16, body: &str) -> Self {
        let body = body.trim();
        let body = match body.char_indices().nth(BODY_SNIPPET_LIMIT) {
            Some((idx, _)) => format!("{}...", &body[..idx]),
            None => body.to_string(),
        };
        AppError::Status { status, body }
    }

    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            AppError::Connection(_)
                | AppError::Status { .. }
                | AppError::Parse(_)
                | AppError::Stream(_)
        )
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::NoModel => exitcode::NO_MODEL,
            e if e.is_transport() => exitcode::LLM_ERROR,
            _ => exitcode::CONFIG_ERROR,
        }
    }
}

pub mod exitcode {
    pub const CONFIG_ERROR: i32 = 1;
    pub const LLM_ERROR: i32 = 2;
    pub const NO_MODEL: i32 = 3;
    pub const INTERRUPTED: i32 = 130;
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_builder() || err.is_request() {
            AppError::Connection(err.to_string())
        } else if err.is_timeout() {
            AppError::Connection(format!("request timed out: {}", err))
        } else {
            AppError::Stream(err.to_string())
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Parse(err.to_string())
    }
}

/// Errors raised by slash commands. Reported to the user, never fatal.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CommandError {
    #[error("No response to copy from")]
    NoResponse,

    #[error("No code block to copy")]
    NoCodeBlock,

    #[error("Clipboard not available")]
    ClipboardUnavailable,

    #[error("Unknown command: /{0}. Type /help for available commands.")]
    Unknown(String),

    #[error("failed to write output: {0}")]
    Output(String),
}
