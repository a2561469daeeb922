// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::config::parse_duration;

/// Command-line arguments for `blaker`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "blaker",
    version,
    about = "Run a command unless its break time has passed.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Falls back to `BLAKER_CONFIG`, then `blaker.toml` if it exists.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Store document holding the break time; overrides `[store].path`.
    #[arg(long, value_name = "PATH")]
    pub store: Option<PathBuf>,

    /// Table holding the break time item; overrides `[store].table`.
    #[arg(long, value_name = "NAME")]
    pub table: Option<String>,

    /// Name of the break time item; overrides `[store].key`.
    #[arg(long, value_name = "NAME")]
    pub key: Option<String>,

    /// Kill the command if it runs longer than this (e.g. "30s", "10m").
    /// "0s" disables the limit.
    #[arg(long, value_name = "DURATION", value_parser = parse_duration)]
    pub wait: Option<Duration>,

    /// Log run phases at info level.
    #[arg(short, long)]
    pub verbose: bool,

    /// Accepted for compatibility; has no effect on the run.
    #[arg(long)]
    pub no_delay: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `BLAKER_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Check the break time and print the decision, but don't run anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Command to run.
    #[arg(value_name = "COMMAND", required = true)]
    pub command: String,

    /// Arguments passed to the command verbatim.
    #[arg(value_name = "ARGS", trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_args_keep_their_hyphens() {
        let args = CliArgs::try_parse_from(["blaker", "--wait", "5s", "--", "ls", "-la", "/tmp"]).unwrap();
        assert_eq!(args.command, "ls");
        assert_eq!(args.args, vec!["-la", "/tmp"]);
        assert_eq!(args.wait, Some(Duration::from_secs(5)));
    }

    #[test]
    fn flags_before_command() {
        let args = CliArgs::try_parse_from([
            "blaker", "--verbose", "--no-delay", "--table", "ops", "--key", "cutover", "deploy.sh",
        ])
        .unwrap();
        assert!(args.verbose);
        assert!(args.no_delay);
        assert_eq!(args.table.as_deref(), Some("ops"));
        assert_eq!(args.key.as_deref(), Some("cutover"));
        assert_eq!(args.command, "deploy.sh");
        assert!(args.args.is_empty());
    }

    #[test]
    fn command_is_required() {
        assert!(CliArgs::try_parse_from(["blaker"]).is_err());
    }

    #[test]
    fn bad_wait_is_rejected() {
        assert!(CliArgs::try_parse_from(["blaker", "--wait", "forever", "true"]).is_err());
    }

    #[test]
    fn overflowing_wait_is_a_parse_error() {
        let err = CliArgs::try_parse_from(["blaker", "--wait", "5124095576030432h", "true"]).unwrap_err();
        assert!(err.to_string().contains("too large"), "{err}");
    }
}
