use super::CommandOutcome;
use crate::core::clipboard::ClipboardSink;
use crate::core::error::CommandError;
use crate::display;
use crate::utils::text::extract_last_code_block;
use std::io::{self, Write};
use tracing::{debug, warn};

fn output_error(e: io::Error) -> CommandError {
    CommandError::Output(e.to_string())
}

pub fn handle_exit(out: &mut dyn Write) -> Result<CommandOutcome, CommandError> {
    display::display_farewell(out).map_err(output_error)?;
    Ok(CommandOutcome::Exit)
}

pub fn handle_help(out: &mut dyn Write) -> Result<CommandOutcome, CommandError> {
    display::display_help(out).map_err(output_error)?;
    Ok(CommandOutcome::Continue)
}

pub fn handle_copy(
    last_reply: Option<&str>,
    clipboard: Option<&dyn ClipboardSink>,
    out: &mut dyn Write,
) -> Result<CommandOutcome, CommandError> {
    let reply = last_reply
        .filter(|r| !r.is_empty())
        .ok_or(CommandError::NoResponse)?;

    let block = extract_last_code_block(reply);
    if block.is_empty() {
        return Err(CommandError::NoCodeBlock);
    }

    let clipboard = clipboard.ok_or(CommandError::ClipboardUnavailable)?;
    clipboard.write(block).map_err(|e| {
        warn!(error = %e, "clipboard write failed");
        CommandError::ClipboardUnavailable
    })?;
    debug!(chars = block.len(), "copied code block");

    display::display_copied(out).map_err(output_error)?;
    Ok(CommandOutcome::Exit)
}
