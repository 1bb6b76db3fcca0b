use std::env;
use std::io::{self, Write};
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::debug;

const CANDIDATES: &[&str] = &[
    "wl-copy",
    "xclip -selection clipboard",
    "xsel --clipboard --input",
    "pbcopy",
];

/// Destination for `/copy`.
pub trait ClipboardSink: Send + Sync {
    fn write(&self, text: &str) -> io::Result<()>;
}

/// Clipboard backed by an external command that reads the text on stdin.
#[derive(Debug, Clone)]
pub struct CommandClipboard {
    program: String,
    args: Vec<String>,
}

impl CommandClipboard {
    pub fn from_command_line(command_line: &str) -> Option<Self> {
        let mut parts = command_line.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self {
            program,
            args: parts.collect(),
        })
    }

    /// Uses `override_cmd` when set, otherwise the first known clipboard tool on `PATH`.
    pub fn detect(override_cmd: Option<&str>) -> Option<Self> {
        if let Some(cmd) = override_cmd.filter(|c| !c.trim().is_empty()) {
            return Self::from_command_line(cmd);
        }

        let found = CANDIDATES.iter().find(|candidate| {
            candidate
                .split_whitespace()
                .next()
                .is_some_and(is_on_path)
        })?;
        debug!(command = %found, "detected clipboard command");
        Self::from_command_line(found)
    }
}

impl ClipboardSink for CommandClipboard {
    fn write(&self, text: &str) -> io::Result<()> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(text.as_bytes())?;
        }

        let status = child.wait()?;
        if status.success() {
            Ok(())
        } else {
            Err(io::Error::other(format!(
                "{} exited with {}",
                self.program, status
            )))
        }
    }
}

fn is_on_path(program: &str) -> bool {
    env::var_os("PATH")
        .map(|paths| env::split_paths(&paths).any(|dir| is_executable(&dir.join(program))))
        .unwrap_or(false)
}

fn is_executable(path: &Path) -> bool {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        path.metadata()
            .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
            .unwrap_or(false)
    }
    #[cfg(not(unix))]
    {
        path.is_file()
    }
}
