//! CLI module for questline
//!
//! ## Commands
//!
//! - `check [root]` - Load every package and report diagnostics
//! - `tokens <instruction>` - Dump tokens and bound arguments of one instruction (debug)
//! - `resolve <root> --list <list> <id>` - Resolve a reference from a package
//!
//! `check` exits with 1 when a package has errors, or warnings under `--deny-warnings`. `resolve` exits with 1
//! when the reference resolves to nothing.

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod commands;

use std::fmt;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use questline_core::lang::lists::ListKind;

// ============================================================================
// CLI Error handling
// ============================================================================

/// Process exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    pub const FAILURE: ExitCode = ExitCode(1);
}

/// A load or lookup failure, printed to stderr before exiting.
#[derive(Debug)]
pub struct CliError {
    pub message: String,
    pub exit_code: ExitCode,
}

impl CliError {
    pub fn new(message: impl Into<String>, exit_code: ExitCode) -> Self {
        Self {
            message: message.into(),
            exit_code,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(message, ExitCode::FAILURE)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub type CliResult<T> = Result<T, CliError>;

const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Clap CLI definition
// ============================================================================

/// Check and explore quest packages
#[derive(Parser, Debug)]
#[command(name = "questline")]
#[command(version = VERSION)]
#[command(about = "Check and explore quest packages", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Load every package under a workspace root and report diagnostics
    Check {
        /// Workspace root
        #[arg(value_name = "ROOT", default_value = ".")]
        root: PathBuf,
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
        format: OutputFormat,
        /// Exit with failure on warnings too
        #[arg(long)]
        deny_warnings: bool,
    },

    /// Tokenize and bind one instruction (debug)
    Tokens {
        /// Instruction text, e.g. `give emerald amount:5`
        #[arg(value_name = "INSTRUCTION")]
        instruction: String,
        /// List the instruction belongs to
        #[arg(long, value_enum, default_value_t = ListArg::Events)]
        list: ListArg,
    },

    /// Resolve a reference as written in a package
    Resolve {
        /// Workspace root
        #[arg(value_name = "ROOT")]
        root: PathBuf,
        /// Package the reference is written in (empty for the root package)
        #[arg(long, default_value = "")]
        package: String,
        /// List the reference points into
        #[arg(long, value_enum)]
        list: ListArg,
        /// Reference text, e.g. `quest-intro.started`
        #[arg(value_name = "ID", allow_hyphen_values = true)]
        id: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ListArg {
    Events,
    Conditions,
    Objectives,
}

impl From<ListArg> for ListKind {
    fn from(list: ListArg) -> Self {
        match list {
            ListArg::Events => ListKind::Events,
            ListArg::Conditions => ListKind::Conditions,
            ListArg::Objectives => ListKind::Objectives,
        }
    }
}

// ============================================================================
// CLI entry point
// ============================================================================

/// Run the command named on the command line and exit with its status.
pub fn run() {
    let cli = Cli::parse();

    match execute(cli) {
        Ok(exit_code) => {
            if exit_code.0 != 0 {
                process::exit(exit_code.0);
            }
        }
        Err(e) => {
            if !e.message.is_empty() {
                eprintln!("{}", e.message);
            }
            process::exit(e.exit_code.0);
        }
    }
}

fn execute(cli: Cli) -> CliResult<ExitCode> {
    match cli.command {
        Some(Command::Check {
            root,
            format,
            deny_warnings,
        }) => commands::check(&root, format, deny_warnings),
        Some(Command::Tokens { instruction, list }) => commands::tokens(&instruction, list.into()),
        Some(Command::Resolve { root, package, list, id }) => commands::resolve(&root, &package, list.into(), &id),
        None => Err(CliError::failure("No command given, see `questline --help`")),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_check() {
        let cli = Cli::try_parse_from(["questline", "check", "quests", "--format", "json", "--deny-warnings"]).unwrap();
        if let Some(Command::Check {
            root,
            format,
            deny_warnings,
        }) = cli.command
        {
            assert_eq!(root, PathBuf::from("quests"));
            assert_eq!(format, OutputFormat::Json);
            assert!(deny_warnings);
        } else {
            panic!("Expected Check command");
        }
    }

    #[test]
    fn test_cli_parse_check_defaults() {
        let cli = Cli::try_parse_from(["questline", "check"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Command::Check {
                format: OutputFormat::Human,
                deny_warnings: false,
                ..
            })
        ));
    }

    #[test]
    fn test_cli_parse_resolve() {
        let cli = Cli::try_parse_from([
            "questline",
            "resolve",
            "quests",
            "--package",
            "quest-intro",
            "--list",
            "conditions",
            "--",
            "-side.hint",
        ])
        .unwrap();
        if let Some(Command::Resolve { package, list, id, .. }) = cli.command {
            assert_eq!(package, "quest-intro");
            assert_eq!(ListKind::from(list), ListKind::Conditions);
            assert_eq!(id, "-side.hint");
        } else {
            panic!("Expected Resolve command");
        }
    }

    #[test]
    fn test_cli_rejects_unknown_list() {
        assert!(Cli::try_parse_from(["questline", "tokens", "kill", "--list", "items"]).is_err());
    }
}
