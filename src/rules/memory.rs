//! Memory rules: persistent agent memory files and how they are maintained

use crate::models::{Category, Diagnostic, FileRecord, Severity};
use crate::rules::base::{markdown_files, rule, Rule, RuleMeta};
use anyhow::Result;
use regex::Regex;
use std::sync::{Arc, OnceLock};

pub const MEMORY_FILE: RuleMeta = RuleMeta::new(
    "memory/memory-file",
    Category::Memory,
    Severity::Info,
    "Workspace should keep a persistent memory file",
);
pub const MEMORY_SIZE: RuleMeta = RuleMeta::new(
    "memory/memory-size",
    Category::Memory,
    Severity::Warning,
    "Memory files should be curated to stay small",
);
pub const PERSISTENCE_GUIDANCE: RuleMeta = RuleMeta::new(
    "memory/no-persistence-guidance",
    Category::Memory,
    Severity::Info,
    "Instructions should explain when to update memory",
);

const MAX_MEMORY_LINES: usize = 200;

static GUIDANCE_RE: OnceLock<Regex> = OnceLock::new();

fn guidance_re() -> &'static Regex {
    GUIDANCE_RE.get_or_init(|| {
        Regex::new(
            r"(?i)\b(update|write|append|record|save|store)\b.{0,40}\bmemory|\bmemory\b.{0,40}\b(update|write|append|record|save|store)",
        )
        .unwrap()
    })
}

/// `MEMORY.md` anywhere, or any markdown file under a `memory/` directory
pub fn is_memory_file(file: &FileRecord) -> bool {
    file.is_markdown()
        && (file.base_name().eq_ignore_ascii_case("MEMORY.md")
            || file.name.starts_with("memory/")
            || file.name.contains("/memory/"))
}

pub fn rules() -> Vec<Arc<dyn Rule>> {
    vec![
        rule(MEMORY_FILE, check_memory_file),
        rule(MEMORY_SIZE, check_memory_size),
        rule(PERSISTENCE_GUIDANCE, check_persistence_guidance),
    ]
}

fn check_memory_file(meta: &RuleMeta, files: &[FileRecord]) -> Result<Vec<Diagnostic>> {
    if markdown_files(files).next().is_none() || files.iter().any(is_memory_file) {
        return Ok(vec![]);
    }
    Ok(vec![meta
        .diagnostic("(workspace)", "No memory file (MEMORY.md or memory/) found.")
        .with_fix("Create MEMORY.md so the agent can keep durable notes between sessions.")])
}

fn check_memory_size(meta: &RuleMeta, files: &[FileRecord]) -> Result<Vec<Diagnostic>> {
    Ok(files
        .iter()
        .filter(|f| is_memory_file(f) && f.lines.len() > MAX_MEMORY_LINES)
        .map(|f| {
            meta.diagnostic(
                &f.name,
                format!(
                    "Memory file is {} lines (limit {}); stale entries crowd out context.",
                    f.lines.len(),
                    MAX_MEMORY_LINES
                ),
            )
            .with_fix("Prune outdated entries and move history into dated files.")
        })
        .collect())
}

fn check_persistence_guidance(meta: &RuleMeta, files: &[FileRecord]) -> Result<Vec<Diagnostic>> {
    let Some(memory) = files.iter().find(|f| is_memory_file(f)) else {
        return Ok(vec![]);
    };
    let guided = markdown_files(files)
        .filter(|f| !is_memory_file(f))
        .any(|f| guidance_re().is_match(&f.content));
    if guided {
        return Ok(vec![]);
    }
    Ok(vec![meta
        .diagnostic(
            &memory.name,
            "No instruction file says when or how to update memory.",
        )
        .with_fix("Add a \"## Memory\" section describing what to record and when.")])
}
