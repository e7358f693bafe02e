//! CLI command definitions and handlers

mod audit;
pub mod files;
mod init;
mod lint;
mod rules;

pub use audit::audit_path;
pub use lint::lint_workspace;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Parse and validate workers count (1-64)
fn parse_workers(s: &str) -> Result<usize, String> {
    let n: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;
    if n == 0 {
        Err("workers must be at least 1".to_string())
    } else if n > 64 {
        Err("workers cannot exceed 64".to_string())
    } else {
        Ok(n)
    }
}

/// Parse a score threshold (0-100)
fn parse_score(s: &str) -> Result<u32, String> {
    let n: u32 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid score", s))?;
    if n > 100 {
        Err("score must be between 0 and 100".to_string())
    } else {
        Ok(n)
    }
}

/// agentlint - Lint agent instruction files and audit skills
///
/// Runs locally. No data leaves your machine.
#[derive(Parser, Debug)]
#[command(name = "agentlint")]
#[command(
    version,
    about = "Score agent instruction files (CLAUDE.md, AGENTS.md, runtime configs) and audit skill files for malicious instructions",
    after_help = "\
Examples:
  agentlint                              Lint the current directory
  agentlint lint ./agent --format json   JSON output for scripting
  agentlint lint . --fail-below 70       Exit 1 if the score is below 70 (CI mode)
  agentlint lint . --explain-score       Show full scoring breakdown
  agentlint audit skills/                Audit every skill under skills/
  agentlint audit SKILL.md --fail-on dangerous
  agentlint rules                        List all rules"
)]
pub struct Cli {
    /// Path to the workspace, or the skill file/directory for `audit` (default: current directory)
    #[arg(global = true, default_value = ".")]
    pub path: PathBuf,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn", value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: String,

    /// Number of parallel workers (1-64, default: all cores up to 16)
    #[arg(long, global = true, value_parser = parse_workers)]
    pub workers: Option<usize>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Score the workspace's agent instruction files (default command)
    Lint {
        /// Output format: text, json
        #[arg(long, short = 'f', value_parser = ["text", "json"])]
        format: Option<String>,

        /// Write the report to a file instead of stdout
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Exit with code 1 if the overall score is below this value
        #[arg(long, value_parser = parse_score)]
        fail_below: Option<u32>,

        /// Explain the scoring formula with full breakdown
        #[arg(long)]
        explain_score: bool,
    },

    /// Audit skill files for malicious instruction patterns
    Audit {
        /// Output format: text, json
        #[arg(long, short = 'f', value_parser = ["text", "json"])]
        format: Option<String>,

        /// Write the report to a file instead of stdout
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Exit with code 1 if any file is at or above this verdict (default: dangerous)
        #[arg(long, value_parser = ["suspicious", "dangerous", "malicious"])]
        fail_on: Option<String>,
    },

    /// List all built-in rules
    Rules {
        /// Output format: text, json
        #[arg(long, short = 'f', value_parser = ["text", "json"])]
        format: Option<String>,
    },

    /// Write an example agentlint.toml
    Init,
}

/// Run the CLI command
pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Some(Commands::Lint {
            format,
            output,
            fail_below,
            explain_score,
        }) => lint::run(
            &cli.path,
            format,
            output.as_deref(),
            fail_below,
            explain_score,
            cli.workers,
        ),

        Some(Commands::Audit {
            format,
            output,
            fail_on,
        }) => audit::run(&cli.path, format, output.as_deref(), fail_on),

        Some(Commands::Rules { format }) => rules::run(format),

        Some(Commands::Init) => init::run(&cli.path),

        None => lint::run(&cli.path, None, None, None, false, cli.workers),
    }
}
