use console::style;
use std::fmt::Display;
use std::io::{self, Write};

pub const PROMPT: &str = "> ";

const HELP_ENTRIES: &[(&str, &str)] = &[
    ("/copy", "Copy last code block to clipboard and exit"),
    ("/bye", "Exit conversation"),
    ("/quit", "Exit conversation"),
    ("/exit", "Exit conversation"),
    ("/help", "Show this help"),
];

pub fn display_farewell(out: &mut dyn Write) -> io::Result<()> {
    writeln!(out, "{}", style("Goodbye").bold().cyan())
}

pub fn display_copied(out: &mut dyn Write) -> io::Result<()> {
    writeln!(out, "{}", style("✓ Copied to clipboard").bold().green())
}

pub fn display_help(out: &mut dyn Write) -> io::Result<()> {
    writeln!(out, "{}", style("Commands:").bold().underlined())?;
    for (name, description) in HELP_ENTRIES {
        writeln!(out, "  {:<7} {}", style(name).bold().cyan(), description)?;
    }
    Ok(())
}

/// Reports a recoverable problem on the diagnostic sink.
pub fn display_error(err: &mut dyn Write, message: impl Display) -> io::Result<()> {
    writeln!(err, "{}", style(message).red())?;
    err.flush()
}

/// One-line diagnostic printed before a non-zero exit.
pub fn display_fatal(message: impl Display) {
    eprintln!("{} {}", style("Error:").bold().red(), message);
}
