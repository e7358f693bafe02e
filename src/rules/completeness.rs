//! Completeness rules: the workspace should say who the agent is and what it
//! must not do

use crate::models::{Category, Diagnostic, FileRecord, Severity};
use crate::rules::base::{
    markdown_files, prose_lines, prose_sections, rule, Rule, RuleMeta, MAX_DIAGNOSTICS_PER_FILE,
};
use anyhow::Result;
use regex::Regex;
use std::sync::{Arc, OnceLock};

pub const MAIN_FILE: RuleMeta = RuleMeta::new(
    "completeness/main-file",
    Category::Completeness,
    Severity::Error,
    "Workspace should have a primary instruction file",
);
pub const IDENTITY: RuleMeta = RuleMeta::new(
    "completeness/identity",
    Category::Completeness,
    Severity::Warning,
    "Primary instructions should define the agent's role",
);
pub const BOUNDARIES: RuleMeta = RuleMeta::new(
    "completeness/boundaries",
    Category::Completeness,
    Severity::Warning,
    "Instructions should state boundaries and constraints",
);
pub const PLACEHOLDERS: RuleMeta = RuleMeta::new(
    "completeness/placeholders",
    Category::Completeness,
    Severity::Warning,
    "Instructions should not contain unfinished placeholders",
);

/// Base names of primary instruction files
pub const PRIMARY_FILE_NAMES: &[&str] = &["CLAUDE.md", "AGENTS.md", "GEMINI.md", "SOUL.md"];
pub const COPILOT_INSTRUCTIONS: &str = ".github/copilot-instructions.md";

static IDENTITY_RE: OnceLock<Regex> = OnceLock::new();
static BOUNDARY_RE: OnceLock<Regex> = OnceLock::new();
static PLACEHOLDER_RE: OnceLock<Regex> = OnceLock::new();

fn identity_re() -> &'static Regex {
    IDENTITY_RE.get_or_init(|| {
        Regex::new(r"(?i)\b(role|identity|persona|about|purpose|overview|who you are)\b").unwrap()
    })
}

fn boundary_re() -> &'static Regex {
    BOUNDARY_RE.get_or_init(|| {
        Regex::new(r"(?i)(boundar|\brules?\b|constraint|guideline|restriction|safety|\bnever\b|don'?t)")
            .unwrap()
    })
}

fn placeholder_re() -> &'static Regex {
    PLACEHOLDER_RE.get_or_init(|| {
        Regex::new(r"\b(TODO|TBD|FIXME)\b|(?i:<insert[^>]*>|\[placeholder\])").unwrap()
    })
}

pub fn is_primary_file(file: &FileRecord) -> bool {
    file.name == COPILOT_INSTRUCTIONS
        || PRIMARY_FILE_NAMES
            .iter()
            .any(|n| file.base_name().eq_ignore_ascii_case(n))
}

pub fn rules() -> Vec<Arc<dyn Rule>> {
    vec![
        rule(MAIN_FILE, check_main_file),
        rule(IDENTITY, check_identity),
        rule(BOUNDARIES, check_boundaries),
        rule(PLACEHOLDERS, check_placeholders),
    ]
}

fn check_main_file(meta: &RuleMeta, files: &[FileRecord]) -> Result<Vec<Diagnostic>> {
    if files.iter().any(is_primary_file) {
        return Ok(vec![]);
    }
    Ok(vec![meta
        .diagnostic(
            "(workspace)",
            "No primary instruction file (CLAUDE.md, AGENTS.md, GEMINI.md, SOUL.md) found.",
        )
        .with_fix("Create CLAUDE.md or AGENTS.md at the workspace root.")])
}

fn check_identity(meta: &RuleMeta, files: &[FileRecord]) -> Result<Vec<Diagnostic>> {
    let primary: Vec<&FileRecord> = files.iter().filter(|f| is_primary_file(f)).collect();
    let Some(first) = primary.first() else {
        return Ok(vec![]);
    };
    let defined = primary
        .iter()
        .copied()
        .flat_map(prose_sections)
        .any(|s| identity_re().is_match(&s.heading));
    if defined {
        return Ok(vec![]);
    }
    Ok(vec![meta
        .diagnostic(&first.name, "No section describes the agent's role or identity.")
        .with_fix("Add a \"## Role\" section stating who the agent is and who it serves.")])
}

fn check_boundaries(meta: &RuleMeta, files: &[FileRecord]) -> Result<Vec<Diagnostic>> {
    let mut markdown = markdown_files(files).peekable();
    if markdown.peek().is_none() {
        return Ok(vec![]);
    }
    let stated = markdown
        .flat_map(prose_sections)
        .any(|s| boundary_re().is_match(&s.heading));
    if stated {
        return Ok(vec![]);
    }
    Ok(vec![meta
        .diagnostic("(workspace)", "No section sets boundaries or constraints for the agent.")
        .with_fix("Add a \"## Boundaries\" section listing what the agent must never do.")])
}

fn check_placeholders(meta: &RuleMeta, files: &[FileRecord]) -> Result<Vec<Diagnostic>> {
    let mut diagnostics = Vec::new();
    for file in markdown_files(files) {
        let hits = prose_lines(file)
            .filter_map(|(line_num, line)| placeholder_re().find(line).map(|m| (line_num, m.as_str())))
            .take(MAX_DIAGNOSTICS_PER_FILE)
            .map(|(line_num, marker)| {
                meta.diagnostic(&file.name, format!("Unfinished placeholder \"{}\".", marker))
                    .at_line(line_num)
                    .with_fix("Fill in the missing instruction or remove the marker.")
            });
        diagnostics.extend(hits);
    }
    Ok(diagnostics)
}
