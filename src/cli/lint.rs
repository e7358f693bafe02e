//! Lint command - score the agent instruction files of a workspace

use super::files::collect_workspace_files;
use crate::config::{load_project_config, ProjectConfig};
use crate::models::LintResult;
use crate::reporters::{self, OutputFormat};
use crate::rules::default_engine;
use crate::scoring::CategoryScorer;
use anyhow::{Context, Result};
use console::style;
use std::path::Path;
use std::str::FromStr;
use tracing::info;

/// Lint the workspace at `path` with its project config
pub fn lint_workspace(path: &Path, config: &ProjectConfig, workers: usize) -> Result<LintResult> {
    let root = path
        .canonicalize()
        .with_context(|| format!("Path does not exist: {}", path.display()))?;
    if !root.is_dir() {
        anyhow::bail!("Path is not a directory: {}", root.display());
    }

    let files = collect_workspace_files(&root, &config.exclude)?;
    if files.is_empty() {
        anyhow::bail!(
            "No agent instruction files (*.md, clawdbot.json, openclaw.json) found in {}",
            root.display()
        );
    }
    info!("Linting {} files in {}", files.len(), root.display());

    let workspace = root
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| root.display().to_string());
    let engine = default_engine(config, workers);
    Ok(engine.evaluate(workspace, files))
}

/// Run the lint command
pub fn run(
    path: &Path,
    format: Option<String>,
    output: Option<&Path>,
    fail_below: Option<u32>,
    explain_score: bool,
    workers: Option<usize>,
) -> Result<()> {
    let config = load_project_config(path);

    // CLI flags win over project defaults
    let format = format
        .or_else(|| config.defaults.format.clone())
        .unwrap_or_else(|| "text".to_string());
    let format = OutputFormat::from_str(&format)?;
    let workers = workers.or(config.defaults.workers).unwrap_or(0);
    let fail_below = fail_below.or(config.defaults.fail_below);

    let result = lint_workspace(path, &config, workers)?;
    let mut rendered = reporters::report_with_format(&result, format)?;

    if explain_score && format == OutputFormat::Text {
        let explanation = CategoryScorer::new(&config.scoring).explain(&result);
        rendered.push_str(&format!("\n{}\n{}", style("─".repeat(60)).dim(), explanation));
    }

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

    check_fail_threshold(fail_below, &result)
}

/// Exit with code 1 when the score is below the threshold
fn check_fail_threshold(fail_below: Option<u32>, result: &LintResult) -> Result<()> {
    if let Some(threshold) = fail_below {
        if result.total_score < threshold {
            eprintln!(
                "Failing: score {} is below --fail-below={}",
                result.total_score, threshold
            );
            std::process::exit(1);
        }
    }
    Ok(())
}
