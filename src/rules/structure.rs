//! Structure rules: headings, section layout and file size

use crate::models::{Category, Diagnostic, FileRecord, Severity};
use crate::rules::base::{markdown_files, prose_sections, rule, Rule, RuleMeta};
use anyhow::Result;
use std::sync::Arc;

pub const HAS_HEADINGS: RuleMeta = RuleMeta::new(
    "structure/has-headings",
    Category::Structure,
    Severity::Warning,
    "Instruction files should be organized with headings",
);
pub const HEADING_HIERARCHY: RuleMeta = RuleMeta::new(
    "structure/heading-hierarchy",
    Category::Structure,
    Severity::Warning,
    "Heading levels should not skip (e.g. # followed by ###)",
);
pub const EMPTY_SECTION: RuleMeta = RuleMeta::new(
    "structure/empty-section",
    Category::Structure,
    Severity::Info,
    "Sections should have content",
);
pub const FILE_LENGTH: RuleMeta = RuleMeta::new(
    "structure/file-length",
    Category::Structure,
    Severity::Warning,
    "Instruction files should stay short enough to fit in context",
);

/// Non-blank lines before a file without headings is reported
const MIN_LINES_FOR_HEADINGS: usize = 10;
const MAX_FILE_LINES: usize = 500;

pub fn rules() -> Vec<Arc<dyn Rule>> {
    vec![
        rule(HAS_HEADINGS, check_has_headings),
        rule(HEADING_HIERARCHY, check_heading_hierarchy),
        rule(EMPTY_SECTION, check_empty_sections),
        rule(FILE_LENGTH, check_file_length),
    ]
}

fn check_has_headings(meta: &RuleMeta, files: &[FileRecord]) -> Result<Vec<Diagnostic>> {
    Ok(markdown_files(files)
        .filter(|f| prose_sections(f).is_empty())
        .filter(|f| f.lines.iter().filter(|l| !l.trim().is_empty()).count() >= MIN_LINES_FOR_HEADINGS)
        .map(|f| {
            meta.diagnostic(&f.name, "File has no headings; agents navigate instructions by section.")
                .with_fix("Split the file into sections with `#` / `##` headings.")
        })
        .collect())
}

fn check_heading_hierarchy(meta: &RuleMeta, files: &[FileRecord]) -> Result<Vec<Diagnostic>> {
    let mut diagnostics = Vec::new();
    for file in markdown_files(files) {
        for pair in prose_sections(file).windows(2) {
            let (prev, next) = (pair[0], pair[1]);
            if next.level > prev.level + 1 {
                diagnostics.push(
                    meta.diagnostic(
                        &file.name,
                        format!(
                            "Heading \"{}\" jumps from level {} to level {}.",
                            next.heading, prev.level, next.level
                        ),
                    )
                    .at_line(next.start_line)
                    .with_fix(format!("Use a level {} heading here.", prev.level + 1)),
                );
            }
        }
    }
    Ok(diagnostics)
}

fn check_empty_sections(meta: &RuleMeta, files: &[FileRecord]) -> Result<Vec<Diagnostic>> {
    let mut diagnostics = Vec::new();
    for file in markdown_files(files) {
        let sections = prose_sections(file);
        for (i, section) in sections.iter().enumerate() {
            // A parent whose body is only subsections is not empty
            let has_child = sections
                .get(i + 1)
                .is_some_and(|next| next.level > section.level);
            if section.content.trim().is_empty() && !has_child {
                diagnostics.push(
                    meta.diagnostic(&file.name, format!("Section \"{}\" is empty.", section.heading))
                        .at_line(section.start_line)
                        .with_fix("Add content or remove the heading."),
                );
            }
        }
    }
    Ok(diagnostics)
}

fn check_file_length(meta: &RuleMeta, files: &[FileRecord]) -> Result<Vec<Diagnostic>> {
    Ok(markdown_files(files)
        .filter(|f| f.lines.len() > MAX_FILE_LINES)
        .map(|f| {
            meta.diagnostic(
                &f.name,
                format!(
                    "File is {} lines long (limit {}); long files dilute the agent's attention.",
                    f.lines.len(),
                    MAX_FILE_LINES
                ),
            )
            .with_fix("Move reference material into separate files and link to them.")
        })
        .collect())
}
