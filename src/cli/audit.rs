//! Audit command - check skill files for malicious instruction patterns

use super::files::collect_skill_files;
use crate::audit::audit_many;
use crate::config::load_project_config;
use crate::models::{AuditResult, Verdict};
use crate::reporters::{self, OutputFormat};
use anyhow::{anyhow, Context, Result};
use console::style;
use std::path::Path;
use std::str::FromStr;
use tracing::info;

/// Audit a skill file, or every markdown file under a directory
pub fn audit_path(target: &Path) -> Result<Vec<AuditResult>> {
    if !target.exists() {
        anyhow::bail!("Path does not exist: {}", target.display());
    }
    let exclude = load_project_config(config_root(target)).exclude;

    let files = collect_skill_files(target, &exclude)?;
    if files.is_empty() {
        anyhow::bail!("No skill files (*.md) found in {}", target.display());
    }
    info!("Auditing {} skill files", files.len());
    Ok(audit_many(&files))
}

/// Directory whose project config applies to `target`
fn config_root(target: &Path) -> &Path {
    if target.is_dir() {
        target
    } else {
        target.parent().unwrap_or(Path::new("."))
    }
}

/// Parse a `--fail-on` verdict name
pub fn parse_fail_on(value: &str) -> Result<Verdict> {
    Verdict::parse(value).ok_or_else(|| {
        anyhow!(
            "Unknown verdict '{}'. Valid values: suspicious, dangerous, malicious",
            value
        )
    })
}

/// Verdict at which `audit` exits 1 when neither the flag nor the project
/// config names one
pub const DEFAULT_FAIL_ON: Verdict = Verdict::Dangerous;

/// Resolve the failing verdict from the flag, then the config default
fn resolve_fail_on(flag: Option<String>, config_default: Option<String>) -> Result<Verdict> {
    match flag.or(config_default) {
        Some(value) => parse_fail_on(&value),
        None => Ok(DEFAULT_FAIL_ON),
    }
}

/// Run the audit command
pub fn run(
    target: &Path,
    format: Option<String>,
    output: Option<&Path>,
    fail_on: Option<String>,
) -> Result<()> {
    let config = load_project_config(config_root(target));
    let format = format
        .or_else(|| config.defaults.format.clone())
        .unwrap_or_else(|| "text".to_string());
    let format = OutputFormat::from_str(&format)?;
    let fail_on = resolve_fail_on(fail_on, config.defaults.fail_on.clone())?;

    let results = audit_path(target)?;
    let rendered = reporters::report_audit(&results, format)?;

    match output {
        Some(out_path) => {
            std::fs::write(out_path, &rendered)
                .with_context(|| format!("Failed to write report to {}", out_path.display()))?;
            eprintln!(
                "{} Report written to {}",
                style("✓").green(),
                style(out_path.display()).cyan()
            );
        }
        None => println!("{}", rendered),
    }

    check_fail_threshold(fail_on, &results)
}

/// Exit with code 1 when any file reaches the verdict threshold
fn check_fail_threshold(threshold: Verdict, results: &[AuditResult]) -> Result<()> {
    if let Some(worst) = results.iter().map(|r| r.verdict).max() {
        if worst >= threshold {
            eprintln!("Failing due to --fail-on={} (worst verdict {})", threshold, worst);
            std::process::exit(1);
        }
    }
    Ok(())
}
