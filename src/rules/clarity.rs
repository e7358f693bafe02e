//! Clarity rules: hedging language and unreadable walls of text

use crate::models::{Category, Diagnostic, FileRecord, Severity};
use crate::rules::base::{markdown_files, prose_lines, rule, Rule, RuleMeta, MAX_DIAGNOSTICS_PER_FILE};
use anyhow::Result;
use regex::Regex;
use std::sync::{Arc, OnceLock};

pub const VAGUE_LANGUAGE: RuleMeta = RuleMeta::new(
    "clarity/vague-language",
    Category::Clarity,
    Severity::Warning,
    "Instructions should be direct rather than hedged",
);
pub const WALL_OF_TEXT: RuleMeta = RuleMeta::new(
    "clarity/wall-of-text",
    Category::Clarity,
    Severity::Info,
    "Very long lines should be broken into lists or paragraphs",
);

const MAX_LINE_CHARS: usize = 400;

static VAGUE_RE: OnceLock<Regex> = OnceLock::new();

fn vague_re() -> &'static Regex {
    VAGUE_RE.get_or_init(|| {
        Regex::new(
            r"(?i)\b(try to|if possible|maybe|perhaps|as needed|when appropriate|you might want to|ideally|somewhat|etc\.)",
        )
        .unwrap()
    })
}

pub fn rules() -> Vec<Arc<dyn Rule>> {
    vec![
        rule(VAGUE_LANGUAGE, check_vague_language),
        rule(WALL_OF_TEXT, check_wall_of_text),
    ]
}

fn check_vague_language(meta: &RuleMeta, files: &[FileRecord]) -> Result<Vec<Diagnostic>> {
    let mut diagnostics = Vec::new();
    for file in markdown_files(files) {
        let hits = prose_lines(file)
            .filter_map(|(line_num, line)| vague_re().find(line).map(|m| (line_num, m.as_str())))
            .take(MAX_DIAGNOSTICS_PER_FILE)
            .map(|(line_num, phrase)| {
                meta.diagnostic(
                    &file.name,
                    format!("Vague phrase \"{}\" weakens the instruction.", phrase),
                )
                .at_line(line_num)
                .with_fix("State exactly what the agent must do, and when.")
            });
        diagnostics.extend(hits);
    }
    Ok(diagnostics)
}

fn check_wall_of_text(meta: &RuleMeta, files: &[FileRecord]) -> Result<Vec<Diagnostic>> {
    let mut diagnostics = Vec::new();
    for file in markdown_files(files) {
        let hits = prose_lines(file)
            .filter(|(_, line)| line.chars().count() > MAX_LINE_CHARS)
            .take(MAX_DIAGNOSTICS_PER_FILE)
            .map(|(line_num, line)| {
                meta.diagnostic(
                    &file.name,
                    format!("Line is {} characters long.", line.chars().count()),
                )
                .at_line(line_num)
                .with_fix("Break it into a bulleted list or shorter paragraphs.")
            });
        diagnostics.extend(hits);
    }
    Ok(diagnostics)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vague_language_outside_fences() {
        let files = vec![FileRecord::from_content(
            "CLAUDE.md",
            "# Rules\nTry to keep answers short.\n```\nmaybe();\n```\nAlways cite sources.",
        )];
        let d = check_vague_language(&VAGUE_LANGUAGE, &files).unwrap();
        assert_eq!(d.len(), 1);
        assert_eq!(d[0].line, Some(2));
        assert!(d[0].message.contains("Try to"));
    }

    #[test]
    fn test_vague_language_capped_per_file() {
        let content = "Maybe do this.\n".repeat(30);
        let files = vec![FileRecord::from_content("AGENTS.md", &content)];
        let d = check_vague_language(&VAGUE_LANGUAGE, &files).unwrap();
        assert_eq!(d.len(), MAX_DIAGNOSTICS_PER_FILE);
    }

    #[test]
    fn test_word_boundaries() {
        let files = vec![FileRecord::from_content("CLAUDE.md", "Use the etcd cluster.")];
        assert!(check_vague_language(&VAGUE_LANGUAGE, &files).unwrap().is_empty());
    }

    #[test]
    fn test_wall_of_text() {
        let content = format!("# Notes\n{}\nshort", "word ".repeat(100));
        let files = vec![FileRecord::from_content("CLAUDE.md", &content)];
        let d = check_wall_of_text(&WALL_OF_TEXT, &files).unwrap();
        assert_eq!(d.len(), 1);
        assert_eq!(d[0].line, Some(2));
    }
}
