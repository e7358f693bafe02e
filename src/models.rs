//! Core data models for agentlint
//!
//! These models are shared by the rule engine, the scorer, the skill
//! auditor and the reporters. Their serialized JSON shape is consumed by
//! external tooling, so field names are part of the public contract.

use crate::parsers::markdown;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Severity levels for lint diagnostics
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Info,
    Warning,
    Error,
}

impl Severity {
    /// Parse a severity name as used in config files
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "error" | "critical" | "high" => Some(Severity::Error),
            "warning" | "warn" | "medium" => Some(Severity::Warning),
            "info" | "low" => Some(Severity::Info),
            _ => None,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// The eight fixed lint dimensions.
///
/// Adding a category is a breaking change: the weight table in
/// [`Category::weight`] is matched exhaustively and the JSON report always
/// carries one entry per category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    Structure,
    Clarity,
    Completeness,
    Security,
    Consistency,
    Memory,
    Runtime,
    SkillSafety,
}

impl Category {
    /// All categories in report order
    pub const ALL: [Category; 8] = [
        Category::Structure,
        Category::Clarity,
        Category::Completeness,
        Category::Security,
        Category::Consistency,
        Category::Memory,
        Category::Runtime,
        Category::SkillSafety,
    ];

    /// Fixed contribution of this category to the overall score
    pub fn weight(&self) -> f64 {
        match self {
            Category::Structure => 0.12,
            Category::Clarity => 0.20,
            Category::Completeness => 0.12,
            Category::Security => 0.15,
            Category::Consistency => 0.08,
            Category::Memory => 0.10,
            Category::Runtime => 0.13,
            Category::SkillSafety => 0.10,
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            Category::Structure => "Structure",
            Category::Clarity => "Clarity",
            Category::Completeness => "Completeness",
            Category::Security => "Security",
            Category::Consistency => "Consistency",
            Category::Memory => "Memory",
            Category::Runtime => "Runtime Config",
            Category::SkillSafety => "Skill Safety",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tag = match self {
            Category::Structure => "structure",
            Category::Clarity => "clarity",
            Category::Completeness => "completeness",
            Category::Security => "security",
            Category::Consistency => "consistency",
            Category::Memory => "memory",
            Category::Runtime => "runtime",
            Category::SkillSafety => "skillSafety",
        };
        f.write_str(tag)
    }
}

/// A markdown section delimited by headings.
///
/// Lines are 1-indexed. `end_line` is inclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub heading: String,
    pub level: u8,
    pub start_line: usize,
    pub end_line: usize,
    pub content: String,
}

/// A single parsed workspace artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Workspace-relative name with `/` separators (e.g. `.clawdbot/clawdbot.json`)
    pub name: String,
    pub path: String,
    pub content: String,
    pub lines: Vec<String>,
    pub sections: Vec<Section>,
}

impl FileRecord {
    pub fn new(name: impl Into<String>, path: impl Into<String>, content: impl Into<String>) -> Self {
        let content = content.into();
        let lines = markdown::split_lines(&content);
        let sections = markdown::parse_sections(&lines);
        Self {
            name: name.into(),
            path: path.into(),
            content,
            lines,
            sections,
        }
    }

    /// Build a record whose path equals its name (in-memory sources, tests)
    pub fn from_content(name: &str, content: &str) -> Self {
        Self::new(name, name, content)
    }

    /// Final path component of `name`
    pub fn base_name(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or(&self.name)
    }

    pub fn is_markdown(&self) -> bool {
        self.name.to_lowercase().ends_with(".md")
    }
}

/// One issue reported by a lint rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub category: Category,
    pub rule: String,
    pub file: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fix: Option<String>,
}

impl Diagnostic {
    /// Attach a 1-indexed line number
    pub fn at_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    /// Attach a suggested fix
    pub fn with_fix(mut self, fix: impl Into<String>) -> Self {
        self.fix = Some(fix.into());
        self
    }

    /// Replace the severity
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }
}

/// Score for one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryScore {
    pub category: Category,
    pub score: u32,
    pub weight: f64,
    pub diagnostics: Vec<Diagnostic>,
}

/// Summary of diagnostics by severity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticsSummary {
    pub errors: usize,
    pub warnings: usize,
    pub infos: usize,
    pub total: usize,
}

impl DiagnosticsSummary {
    pub fn from_diagnostics(diagnostics: &[Diagnostic]) -> Self {
        let mut summary = Self::default();
        for d in diagnostics {
            match d.severity {
                Severity::Error => summary.errors += 1,
                Severity::Warning => summary.warnings += 1,
                Severity::Info => summary.infos += 1,
            }
            summary.total += 1;
        }
        summary
    }
}

/// Complete result of one workspace scan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LintResult {
    pub workspace: String,
    pub files: Vec<FileRecord>,
    pub categories: Vec<CategoryScore>,
    pub total_score: u32,
    pub diagnostics: Vec<Diagnostic>,
    pub timestamp: DateTime<Utc>,
}

impl LintResult {
    /// Calculate letter grade from the overall score
    pub fn grade_from_score(score: u32) -> &'static str {
        match score {
            s if s >= 90 => "A",
            s if s >= 80 => "B",
            s if s >= 70 => "C",
            s if s >= 60 => "D",
            _ => "F",
        }
    }

    pub fn grade(&self) -> &'static str {
        Self::grade_from_score(self.total_score)
    }

    pub fn summary(&self) -> DiagnosticsSummary {
        DiagnosticsSummary::from_diagnostics(&self.diagnostics)
    }

    pub fn category(&self, category: Category) -> Option<&CategoryScore> {
        self.categories.iter().find(|c| c.category == category)
    }
}

/// Severity levels for skill audit findings
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum AuditSeverity {
    Info,
    Warning,
    Critical,
}

impl AuditSeverity {
    /// Risk points contributed by one finding of this severity
    pub fn points(&self) -> u32 {
        match self {
            AuditSeverity::Critical => 25,
            AuditSeverity::Warning => 10,
            AuditSeverity::Info => 3,
        }
    }

    /// Equivalent lint severity
    pub fn as_severity(&self) -> Severity {
        match self {
            AuditSeverity::Critical => Severity::Error,
            AuditSeverity::Warning => Severity::Warning,
            AuditSeverity::Info => Severity::Info,
        }
    }
}

impl std::fmt::Display for AuditSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuditSeverity::Critical => write!(f, "CRITICAL"),
            AuditSeverity::Warning => write!(f, "WARNING"),
            AuditSeverity::Info => write!(f, "INFO"),
        }
    }
}

/// Four-level classification of an audited skill file.
///
/// Ordered from least to most severe.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    Safe,
    Suspicious,
    Dangerous,
    Malicious,
}

impl Verdict {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "safe" => Some(Verdict::Safe),
            "suspicious" => Some(Verdict::Suspicious),
            "dangerous" => Some(Verdict::Dangerous),
            "malicious" => Some(Verdict::Malicious),
            _ => None,
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Verdict::Safe => write!(f, "SAFE"),
            Verdict::Suspicious => write!(f, "SUSPICIOUS"),
            Verdict::Dangerous => write!(f, "DANGEROUS"),
            Verdict::Malicious => write!(f, "MALICIOUS"),
        }
    }
}

/// One pattern match reported by the skill auditor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditFinding {
    pub severity: AuditSeverity,
    /// Threat family label, e.g. "Remote Fetch" or "Additional: exfiltration"
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    #[serde(rename = "match")]
    pub matched: String,
    pub message: String,
    pub recommendation: String,
}

/// Result of auditing one skill file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditResult {
    pub file: String,
    pub findings: Vec<AuditFinding>,
    pub risk_score: u32,
    pub verdict: Verdict,
}

impl AuditResult {
    pub fn count(&self, severity: AuditSeverity) -> usize {
        self.findings.iter().filter(|f| f.severity == severity).count()
    }

    pub fn critical_count(&self) -> usize {
        self.count(AuditSeverity::Critical)
    }
}
