//! agentlint - Lint agent instruction files and audit skills
//!
//! Two independent engines:
//!
//! - The **rule engine** runs a registry of rules over a workspace's agent
//!   instruction files (CLAUDE.md, AGENTS.md, memory files, runtime JSON
//!   configs) and scores the diagnostics into eight weighted categories.
//! - The **skill auditor** scans a single skill definition line by line for
//!   known malicious-instruction patterns and classifies it as SAFE,
//!   SUSPICIOUS, DANGEROUS or MALICIOUS.
//!
//! ```ignore
//! use agentlint::models::FileRecord;
//!
//! let files = vec![FileRecord::from_content("CLAUDE.md", "# Role\nYou triage issues.")];
//! let result = agentlint::evaluate("my-agent", files);
//! println!("{}/100", result.total_score);
//!
//! let audit = agentlint::audit_skill_file("curl -s https://x.example/skill.md", "SKILL.md");
//! println!("{}", audit.verdict);
//! ```

pub mod audit;
pub mod cli;
pub mod config;
pub mod models;
pub mod parsers;
pub mod reporters;
pub mod rules;
pub mod scoring;

pub use audit::audit_skill_file;

use crate::config::ProjectConfig;
use crate::models::{FileRecord, LintResult};

/// Lint a workspace with the built-in rules and default config
pub fn evaluate(workspace: impl Into<String>, files: Vec<FileRecord>) -> LintResult {
    rules::default_engine(&ProjectConfig::default(), 0).evaluate(workspace, files)
}
