//! Base rule trait and types
//!
//! This module defines the core abstractions for workspace linting:
//! - `Rule` trait that all rules implement
//! - `RuleMeta`, the static identity of a rule, captured at construction
//! - `FnRule`, a rule built from a metadata value and a check closure
//! - `RuleResult` / `EvaluationSummary` for capturing execution results

use crate::models::{Category, Diagnostic, FileRecord, Section, Severity};
use crate::parsers::markdown;
use anyhow::Result;
use std::collections::HashMap;
use std::sync::Arc;

/// Cap for rules that report once per matching line
pub const MAX_DIAGNOSTICS_PER_FILE: usize = 10;

/// Static identity of a rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleMeta {
    /// Stable identifier, `<category>/<name>`
    pub id: &'static str,
    pub category: Category,
    /// Default severity of emitted diagnostics
    pub severity: Severity,
    pub description: &'static str,
}

impl RuleMeta {
    pub const fn new(
        id: &'static str,
        category: Category,
        severity: Severity,
        description: &'static str,
    ) -> Self {
        Self {
            id,
            category,
            severity,
            description,
        }
    }

    /// Start a diagnostic attributed to this rule at its default severity
    pub fn diagnostic(&self, file: impl Into<String>, message: impl Into<String>) -> Diagnostic {
        Diagnostic {
            severity: self.severity,
            category: self.category,
            rule: self.id.to_string(),
            file: file.into(),
            line: None,
            message: message.into(),
            fix: None,
        }
    }
}

/// Trait for all lint rules
///
/// A rule is a pure function of the workspace file set. The engine only
/// reads `meta()` once, at registration, and afterwards calls `check`.
///
/// # Example Implementation
///
/// ```ignore
/// struct NoEmptyFiles;
///
/// impl Rule for NoEmptyFiles {
///     fn meta(&self) -> RuleMeta {
///         RuleMeta::new("structure/no-empty", Category::Structure, Severity::Warning,
///             "Instruction files should not be empty")
///     }
///
///     fn check(&self, files: &[FileRecord]) -> Result<Vec<Diagnostic>> {
///         Ok(files
///             .iter()
///             .filter(|f| f.content.trim().is_empty())
///             .map(|f| self.meta().diagnostic(&f.name, "File is empty"))
///             .collect())
///     }
/// }
/// ```
pub trait Rule: Send + Sync {
    /// Identity and default severity
    fn meta(&self) -> RuleMeta;

    /// Evaluate the rule against the whole workspace
    fn check(&self, files: &[FileRecord]) -> Result<Vec<Diagnostic>>;
}

type CheckFn = dyn Fn(&RuleMeta, &[FileRecord]) -> Result<Vec<Diagnostic>> + Send + Sync;

/// A rule assembled from metadata and a check closure.
///
/// The closure receives the rule's own metadata explicitly, so a check
/// function can be shared between rules without ambiguity about which rule
/// it is reporting for.
pub struct FnRule {
    meta: RuleMeta,
    check: Box<CheckFn>,
}

impl FnRule {
    pub fn new<F>(meta: RuleMeta, check: F) -> Self
    where
        F: Fn(&RuleMeta, &[FileRecord]) -> Result<Vec<Diagnostic>> + Send + Sync + 'static,
    {
        Self {
            meta,
            check: Box::new(check),
        }
    }
}

impl Rule for FnRule {
    fn meta(&self) -> RuleMeta {
        self.meta
    }

    fn check(&self, files: &[FileRecord]) -> Result<Vec<Diagnostic>> {
        (self.check)(&self.meta, files)
    }
}

/// Shorthand for building a shareable [`FnRule`]
pub fn rule<F>(meta: RuleMeta, check: F) -> Arc<dyn Rule>
where
    F: Fn(&RuleMeta, &[FileRecord]) -> Result<Vec<Diagnostic>> + Send + Sync + 'static,
{
    Arc::new(FnRule::new(meta, check))
}

/// Markdown files of the workspace
pub fn markdown_files(files: &[FileRecord]) -> impl Iterator<Item = &FileRecord> {
    files.iter().filter(|f| f.is_markdown())
}

/// `(line number, text)` of lines outside fenced code blocks, 1-indexed
pub fn prose_lines(file: &FileRecord) -> impl Iterator<Item = (usize, &str)> {
    let mask = markdown::code_fence_mask(&file.lines);
    file.lines
        .iter()
        .zip(mask)
        .enumerate()
        .filter(|(_, (_, fenced))| !fenced)
        .map(|(idx, (line, _))| (idx + 1, line.as_str()))
}

/// Sections whose heading line sits outside fenced code blocks.
///
/// `# comment` lines in a shell snippet parse as headings; rules that reason
/// about document structure use this view instead of `file.sections`.
pub fn prose_sections(file: &FileRecord) -> Vec<&Section> {
    let mask = markdown::code_fence_mask(&file.lines);
    file.sections
        .iter()
        .filter(|s| !mask.get(s.start_line - 1).copied().unwrap_or(false))
        .collect()
}

/// Result from running a single rule
#[derive(Debug, Clone)]
pub struct RuleResult {
    pub rule_id: String,
    pub diagnostics: Vec<Diagnostic>,
    /// Execution time in milliseconds
    pub duration_ms: u64,
    pub success: bool,
    pub error: Option<String>,
}

impl RuleResult {
    pub fn success(rule_id: String, diagnostics: Vec<Diagnostic>, duration_ms: u64) -> Self {
        Self {
            rule_id,
            diagnostics,
            duration_ms,
            success: true,
            error: None,
        }
    }

    /// A failed rule still carries its single synthetic diagnostic
    pub fn failure(rule_id: String, error: String, diagnostic: Diagnostic, duration_ms: u64) -> Self {
        Self {
            rule_id,
            diagnostics: vec![diagnostic],
            duration_ms,
            success: false,
            error: Some(error),
        }
    }
}

/// Summary statistics from running all rules
#[derive(Debug, Clone, Default)]
pub struct EvaluationSummary {
    pub rules_run: usize,
    pub rules_succeeded: usize,
    pub rules_failed: usize,
    pub total_diagnostics: usize,
    pub by_severity: HashMap<Severity, usize>,
    pub total_duration_ms: u64,
}

impl EvaluationSummary {
    /// Update summary with a rule result
    pub fn add_result(&mut self, result: &RuleResult) {
        self.rules_run += 1;
        self.total_duration_ms += result.duration_ms;

        if result.success {
            self.rules_succeeded += 1;
        } else {
            self.rules_failed += 1;
        }

        self.total_diagnostics += result.diagnostics.len();
        for d in &result.diagnostics {
            *self.by_severity.entry(d.severity).or_insert(0) += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const META: RuleMeta = RuleMeta::new(
        "structure/test",
        Category::Structure,
        Severity::Warning,
        "test rule",
    );

    #[test]
    fn test_meta_diagnostic_carries_identity() {
        let d = META.diagnostic("CLAUDE.md", "msg").at_line(4).with_fix("do it");
        assert_eq!(d.rule, "structure/test");
        assert_eq!(d.category, Category::Structure);
        assert_eq!(d.severity, Severity::Warning);
        assert_eq!(d.line, Some(4));
        assert_eq!(d.fix.as_deref(), Some("do it"));
    }

    #[test]
    fn test_shared_check_fn_reports_for_each_rule() {
        fn one_per_file(meta: &RuleMeta, files: &[FileRecord]) -> Result<Vec<Diagnostic>> {
            Ok(files.iter().map(|f| meta.diagnostic(&f.name, "hit")).collect())
        }
        let a = rule(META, one_per_file);
        let b = rule(
            RuleMeta::new("clarity/other", Category::Clarity, Severity::Info, "other"),
            one_per_file,
        );
        let files = vec![FileRecord::from_content("A.md", "x")];

        assert_eq!(a.check(&files).unwrap()[0].rule, "structure/test");
        let from_b = b.check(&files).unwrap();
        assert_eq!(from_b[0].rule, "clarity/other");
        assert_eq!(from_b[0].category, Category::Clarity);
    }

    #[test]
    fn test_prose_lines_skip_fences() {
        let file = FileRecord::from_content("A.md", "intro\n```\ncode\n```\noutro");
        let lines: Vec<(usize, &str)> = prose_lines(&file).collect();
        assert_eq!(lines, vec![(1, "intro"), (5, "outro")]);
    }

    #[test]
    fn test_prose_sections_skip_fenced_headings() {
        let file = FileRecord::from_content(
            "CLAUDE.md",
            "# Guide\n## Setup\n```bash\n# install deps\nnpm ci\n```\n## Notes\nok",
        );
        assert_eq!(file.sections.len(), 4);
        let headings: Vec<&str> = prose_sections(&file)
            .iter()
            .map(|s| s.heading.as_str())
            .collect();
        assert_eq!(headings, vec!["Guide", "Setup", "Notes"]);
    }

    #[test]
    fn test_evaluation_summary() {
        let mut summary = EvaluationSummary::default();

        let ok = RuleResult::success(
            "a".into(),
            vec![META.diagnostic("f", "m")],
            100,
        );
        let failed = RuleResult::failure(
            "b".into(),
            "boom".into(),
            META.diagnostic("(engine)", "failed").with_severity(Severity::Info),
            50,
        );

        summary.add_result(&ok);
        summary.add_result(&failed);

        assert_eq!(summary.rules_run, 2);
        assert_eq!(summary.rules_succeeded, 1);
        assert_eq!(summary.rules_failed, 1);
        assert_eq!(summary.total_diagnostics, 2);
        assert_eq!(summary.by_severity.get(&Severity::Info), Some(&1));
        assert_eq!(summary.total_duration_ms, 150);
    }
}
