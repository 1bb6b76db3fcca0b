use clap::Parser;
use std::path::PathBuf;

/// Turn a short idea into a fully-specified prompt through a guided conversation.
#[derive(Parser, Debug)]
#[command(name = "prompt-builder", author, version, about, long_about = None)]
pub struct Args {
    /// The idea to build a prompt from
    pub idea: String,

    /// Override model from config
    #[arg(short, long)]
    pub model: Option<String>,

    /// Use alternate config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Don't copy to clipboard
    #[arg(long)]
    pub no_copy: bool,

    /// Suppress conversation output
    #[arg(short, long)]
    pub quiet: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_flags_and_idea() {
        let args = Args::try_parse_from([
            "prompt-builder",
            "-m",
            "qwen",
            "--config",
            "/tmp/c.yaml",
            "--no-copy",
            "-q",
            "a haiku generator",
        ])
        .unwrap();

        assert_eq!(args.idea, "a haiku generator");
        assert_eq!(args.model.as_deref(), Some("qwen"));
        assert_eq!(args.config, Some(PathBuf::from("/tmp/c.yaml")));
        assert!(args.no_copy);
        assert!(args.quiet);
    }

    #[test]
    fn idea_is_required() {
        assert!(Args::try_parse_from(["prompt-builder"]).is_err());
    }
}
