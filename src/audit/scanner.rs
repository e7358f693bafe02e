//! Line-by-line skill scanner

use super::patterns::{
    families, rate_patterns, red_flags, PatternFamily, RATE_LIMITS, RATE_LIMIT_PREFIX,
    RATE_LIMIT_RECOMMENDATION, RATE_REPORT_THRESHOLD, RATE_WARNING_THRESHOLD, RED_FLAG_PREFIX,
};
use crate::models::{AuditFinding, AuditSeverity};
use std::collections::HashSet;

/// Maximum characters of the offending line kept in a finding
pub const MATCH_PREVIEW_CHARS: usize = 80;

/// Fixed families scanned before the rate-limit family
const FAMILIES_BEFORE_RATE: usize = 3;

/// Scanner state carried across lines
#[derive(Debug, Default)]
pub struct LineScanner {
    in_code_block: bool,
    findings: Vec<AuditFinding>,
}

impl LineScanner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn in_code_block(&self) -> bool {
        self.in_code_block
    }

    /// Scan one line. `line_num` is 1-indexed.
    pub fn scan_line(&mut self, line_num: usize, line: &str) {
        let trimmed = line.trim();
        // The fence line itself is scanned with the toggled state
        if trimmed.starts_with("```") {
            self.in_code_block = !self.in_code_block;
        }

        let preview = preview(trimmed);
        let (before, after) = families().split_at(FAMILIES_BEFORE_RATE.min(families().len()));

        for family in before {
            self.scan_family(family, line_num, line, &preview);
        }
        self.scan_rate_limits(line_num, line, &preview);
        for family in after {
            self.scan_family(family, line_num, line, &preview);
        }
        self.scan_red_flags(line_num, line, &preview);
    }

    pub fn finish(self) -> Vec<AuditFinding> {
        self.findings
    }

    fn scan_family(&mut self, family: &PatternFamily, line_num: usize, line: &str, preview: &str) {
        if let Some(pattern) = family.first_match(line) {
            self.push(
                family.severity_for(self.in_code_block),
                family.category.to_string(),
                line_num,
                preview,
                format!("{}: {}", family.prefix, pattern.label),
                family.recommendation,
            );
        }
    }

    fn scan_rate_limits(&mut self, line_num: usize, line: &str, preview: &str) {
        for pattern in rate_patterns() {
            let Some(caps) = pattern.regex.captures(line) else {
                continue;
            };
            let num = caps.get(1).map(|m| parse_count(m.as_str())).unwrap_or(0);
            if num < RATE_REPORT_THRESHOLD {
                continue;
            }
            let severity = if num >= RATE_WARNING_THRESHOLD {
                AuditSeverity::Warning
            } else {
                AuditSeverity::Info
            };
            self.push(
                severity,
                RATE_LIMITS.to_string(),
                line_num,
                preview,
                format!("{} ({}): {}", RATE_LIMIT_PREFIX, num, pattern.label),
                RATE_LIMIT_RECOMMENDATION,
            );
            return;
        }
    }

    fn scan_red_flags(&mut self, line_num: usize, line: &str, preview: &str) {
        let mut reported = HashSet::new();
        for flag in red_flags() {
            if reported.contains(&flag.kind) || !flag.regex.is_match(line) {
                continue;
            }
            reported.insert(flag.kind);
            self.push(
                flag.kind.severity(),
                flag.kind.category_label(),
                line_num,
                preview,
                format!("{}: {}", RED_FLAG_PREFIX, flag.label),
                flag.kind.recommendation(),
            );
        }
    }

    fn push(
        &mut self,
        severity: AuditSeverity,
        category: String,
        line_num: usize,
        preview: &str,
        message: String,
        recommendation: &str,
    ) {
        self.findings.push(AuditFinding {
            severity,
            category,
            line: Some(line_num),
            matched: preview.to_string(),
            message,
            recommendation: recommendation.to_string(),
        });
    }
}

/// First characters of a trimmed line, cut on a char boundary
pub fn preview(trimmed: &str) -> String {
    trimmed.chars().take(MATCH_PREVIEW_CHARS).collect()
}

/// Parse a captured digit run; values beyond `u64` saturate
fn parse_count(digits: &str) -> u64 {
    digits.parse().unwrap_or(u64::MAX)
}
