//! Consistency rules

use crate::models::{Category, Diagnostic, FileRecord, Severity};
use crate::rules::base::{
    markdown_files, prose_lines, prose_sections, rule, Rule, RuleMeta, MAX_DIAGNOSTICS_PER_FILE,
};
use anyhow::Result;
use regex::Regex;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

pub const DUPLICATE_HEADINGS: RuleMeta = RuleMeta::new(
    "consistency/duplicate-headings",
    Category::Consistency,
    Severity::Warning,
    "A file should not repeat the same heading at the same level",
);
pub const CONTRADICTORY_DIRECTIVES: RuleMeta = RuleMeta::new(
    "consistency/contradictory-directives",
    Category::Consistency,
    Severity::Warning,
    "Instructions should not say both \"always X\" and \"never X\"",
);
pub const MIXED_BULLETS: RuleMeta = RuleMeta::new(
    "consistency/mixed-bullets",
    Category::Consistency,
    Severity::Info,
    "A file should use one list marker style",
);

static DIRECTIVE_RE: OnceLock<Regex> = OnceLock::new();

fn directive_re() -> &'static Regex {
    DIRECTIVE_RE.get_or_init(|| Regex::new(r"(?i)\b(always|never)\s+([^.,;:!?()]+)").unwrap())
}

pub fn rules() -> Vec<Arc<dyn Rule>> {
    vec![
        rule(DUPLICATE_HEADINGS, check_duplicate_headings),
        rule(CONTRADICTORY_DIRECTIVES, check_contradictions),
        rule(MIXED_BULLETS, check_mixed_bullets),
    ]
}

fn check_duplicate_headings(meta: &RuleMeta, files: &[FileRecord]) -> Result<Vec<Diagnostic>> {
    let mut diagnostics = Vec::new();
    for file in markdown_files(files) {
        let mut seen: HashMap<(u8, String), usize> = HashMap::new();
        for section in prose_sections(file) {
            let key = (section.level, section.heading.trim().to_lowercase());
            match seen.get(&key) {
                Some(first_line) => diagnostics.push(
                    meta.diagnostic(
                        &file.name,
                        format!(
                            "Heading \"{}\" duplicates the one on line {}.",
                            section.heading, first_line
                        ),
                    )
                    .at_line(section.start_line)
                    .with_fix("Merge the two sections."),
                ),
                None => {
                    seen.insert(key, section.start_line);
                }
            }
        }
    }
    Ok(diagnostics)
}

/// Lowercased directive object with collapsed whitespace
fn normalize_directive(text: &str) -> String {
    text.split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase())
        .filter(|w| !w.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn check_contradictions(meta: &RuleMeta, files: &[FileRecord]) -> Result<Vec<Diagnostic>> {
    // object -> first (file, line) where it is required
    let mut always: HashMap<String, (String, usize)> = HashMap::new();
    let mut never: Vec<(String, String, usize)> = Vec::new();

    for file in markdown_files(files) {
        for (line_num, line) in prose_lines(file) {
            for caps in directive_re().captures_iter(line) {
                let object = normalize_directive(&caps[2]);
                if object.is_empty() {
                    continue;
                }
                if caps[1].eq_ignore_ascii_case("always") {
                    always
                        .entry(object)
                        .or_insert_with(|| (file.name.clone(), line_num));
                } else {
                    never.push((object, file.name.clone(), line_num));
                }
            }
        }
    }

    Ok(never
        .into_iter()
        .filter_map(|(object, file, line_num)| {
            let (always_file, always_line) = always.get(&object)?;
            Some(
                meta.diagnostic(
                    file,
                    format!(
                        "\"never {}\" contradicts \"always {}\" ({}:{}).",
                        object, object, always_file, always_line
                    ),
                )
                .at_line(line_num)
                .with_fix("Keep one of the two directives, or state when each applies."),
            )
        })
        .take(MAX_DIAGNOSTICS_PER_FILE)
        .collect())
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Bullet {
    Dash,
    Star,
}

fn bullet_of(line: &str) -> Option<Bullet> {
    let trimmed = line.trim_start();
    if trimmed.starts_with("- ") {
        Some(Bullet::Dash)
    } else if trimmed.starts_with("* ") {
        Some(Bullet::Star)
    } else {
        None
    }
}

fn check_mixed_bullets(meta: &RuleMeta, files: &[FileRecord]) -> Result<Vec<Diagnostic>> {
    let mut diagnostics = Vec::new();
    for file in markdown_files(files) {
        let mut first: Option<Bullet> = None;
        for (line_num, line) in prose_lines(file) {
            let Some(bullet) = bullet_of(line) else {
                continue;
            };
            match first {
                None => first = Some(bullet),
                Some(style) if style != bullet => {
                    diagnostics.push(
                        meta.diagnostic(&file.name, "File mixes `-` and `*` list markers.")
                            .at_line(line_num)
                            .with_fix("Use `-` for every bullet."),
                    );
                    break;
                }
                Some(_) => {}
            }
        }
    }
    Ok(diagnostics)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_headings() {
        let files = vec![FileRecord::from_content(
            "CLAUDE.md",
            "# Rules\n## Testing\nx\n## testing\ny\n### Testing\nz",
        )];
        let d = check_duplicate_headings(&DUPLICATE_HEADINGS, &files).unwrap();
        assert_eq!(d.len(), 1);
        assert_eq!(d[0].line, Some(4));
        assert!(d[0].message.contains("line 2"));
    }

    #[test]
    fn test_fenced_comments_are_not_duplicate_headings() {
        let files = vec![FileRecord::from_content(
            "CLAUDE.md",
            "# Build\n```bash\n# Build\nmake\n```\n# Test\n```bash\n# build\nmake test\n```",
        )];
        assert!(check_duplicate_headings(&DUPLICATE_HEADINGS, &files).unwrap().is_empty());
    }

    #[test]
    fn test_contradictions_across_files() {
        let files = vec![
            FileRecord::from_content("CLAUDE.md", "Always use tabs.\nNever guess."),
            FileRecord::from_content("AGENTS.md", "# Style\nYou must never use  Tabs!"),
        ];
        let d = check_contradictions(&CONTRADICTORY_DIRECTIVES, &files).unwrap();
        assert_eq!(d.len(), 1);
        assert_eq!(d[0].file, "AGENTS.md");
        assert_eq!(d[0].line, Some(2));
        assert!(d[0].message.contains("CLAUDE.md:1"));
    }

    #[test]
    fn test_no_contradiction_for_different_objects() {
        let files = vec![FileRecord::from_content(
            "CLAUDE.md",
            "Always run tests.\nNever skip review.",
        )];
        assert!(check_contradictions(&CONTRADICTORY_DIRECTIVES, &files).unwrap().is_empty());
    }

    #[test]
    fn test_mixed_bullets() {
        let files = vec![
            FileRecord::from_content("CLAUDE.md", "- one\n- two\n* three\n* four"),
            FileRecord::from_content("AGENTS.md", "- one\n**bold** text\n- two"),
        ];
        let d = check_mixed_bullets(&MIXED_BULLETS, &files).unwrap();
        assert_eq!(d.len(), 1);
        assert_eq!(d[0].file, "CLAUDE.md");
        assert_eq!(d[0].line, Some(3));
    }
}
