//! Text (terminal) reporter with colors and formatting

use crate::models::{AuditResult, AuditSeverity, CategoryScore, Diagnostic, LintResult, Severity, Verdict};
use anyhow::Result;

/// Grade colors (ANSI escape codes)
fn grade_color(grade: &str) -> &'static str {
    match grade {
        "A" => "\x1b[32m", // Green
        "B" => "\x1b[92m", // Light green
        "C" => "\x1b[33m", // Yellow
        "D" => "\x1b[91m", // Light red
        "F" => "\x1b[31m", // Red
        _ => "\x1b[0m",
    }
}

fn severity_color(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "\x1b[31m",   // Red
        Severity::Warning => "\x1b[33m", // Yellow
        Severity::Info => "\x1b[90m",    // Gray
    }
}

fn verdict_color(verdict: Verdict) -> &'static str {
    match verdict {
        Verdict::Safe => "\x1b[32m",
        Verdict::Suspicious => "\x1b[33m",
        Verdict::Dangerous => "\x1b[91m",
        Verdict::Malicious => "\x1b[41m\x1b[97m", // White on red
    }
}

/// Reset ANSI color
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";

/// Diagnostics shown per category before truncating
const MAX_SHOWN_PER_CATEGORY: usize = 10;

fn severity_tag(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "[E]",
        Severity::Warning => "[W]",
        Severity::Info => "[I]",
    }
}

fn audit_tag(severity: AuditSeverity) -> &'static str {
    match severity {
        AuditSeverity::Critical => "\x1b[31m[CRITICAL]",
        AuditSeverity::Warning => "\x1b[33m[WARNING]",
        AuditSeverity::Info => "\x1b[90m[INFO]",
    }
}

/// Render lint result as formatted terminal output
pub fn render(result: &LintResult) -> Result<String> {
    let mut out = String::new();
    let grade = result.grade();
    let grade_c = grade_color(grade);

    // Header
    out.push_str(&format!("\n{BOLD}agentlint{RESET} {DIM}{}{RESET}\n", result.workspace));
    out.push_str(&format!(
        "{DIM}──────────────────────────────────────{RESET}\n"
    ));
    out.push_str(&format!(
        "Score: {BOLD}{}/100{RESET}  Grade: {grade_c}{BOLD}{}{RESET}  Files: {}\n\n",
        result.total_score,
        grade,
        result.files.len()
    ));

    // Category scores
    out.push_str(&format!("{BOLD}CATEGORIES{RESET}\n"));
    for category in &result.categories {
        out.push_str(&format!(
            "  {:<16} {}  {DIM}x{:.2}{RESET}\n",
            category.category.label(),
            format_score(category.score),
            category.weight
        ));
    }
    out.push('\n');

    // Diagnostics summary
    let summary = result.summary();
    out.push_str(&format!("{BOLD}DIAGNOSTICS{RESET} ({} total)\n", summary.total));
    let mut parts = Vec::new();
    if summary.errors > 0 {
        parts.push(format!("\x1b[31m{} errors{RESET}", summary.errors));
    }
    if summary.warnings > 0 {
        parts.push(format!("\x1b[33m{} warnings{RESET}", summary.warnings));
    }
    if summary.infos > 0 {
        parts.push(format!("\x1b[90m{} info{RESET}", summary.infos));
    }
    if !parts.is_empty() {
        out.push_str(&format!("  {}\n", parts.join(" | ")));
    }
    out.push('\n');

    for category in result.categories.iter().filter(|c| !c.diagnostics.is_empty()) {
        render_category(&mut out, category);
    }

    match grade {
        "A" => out.push_str(&format!("{DIM}Excellent! Your agent instructions are in great shape.{RESET}\n")),
        "B" => out.push_str(&format!("{DIM}Good shape. Address remaining warnings for an A.{RESET}\n")),
        _ => out.push_str(&format!(
            "{DIM}Fix errors first: they cost the most points.{RESET}\n"
        )),
    }

    Ok(out)
}

fn render_category(out: &mut String, category: &CategoryScore) {
    out.push_str(&format!(
        "{BOLD}{}{RESET} {}\n",
        category.category.label(),
        format_score(category.score)
    ));
    for d in category.diagnostics.iter().take(MAX_SHOWN_PER_CATEGORY) {
        let sev_c = severity_color(d.severity);
        out.push_str(&format!(
            "  {sev_c}{}{RESET} {}  {DIM}{} {}{RESET}\n",
            severity_tag(d.severity),
            d.message,
            format_location(d),
            d.rule
        ));
        if let Some(fix) = &d.fix {
            out.push_str(&format!("      {DIM}fix: {}{RESET}\n", fix));
        }
    }
    let remaining = category.diagnostics.len().saturating_sub(MAX_SHOWN_PER_CATEGORY);
    if remaining > 0 {
        out.push_str(&format!(
            "  {DIM}...and {} more (use --format json for all){RESET}\n",
            remaining
        ));
    }
    out.push('\n');
}

/// Render audit results as formatted terminal output
pub fn render_audit(results: &[AuditResult]) -> Result<String> {
    let mut out = String::new();
    out.push_str(&format!("\n{BOLD}agentlint skill audit{RESET}\n"));
    out.push_str(&format!(
        "{DIM}──────────────────────────────────────{RESET}\n"
    ));

    for result in results {
        let vc = verdict_color(result.verdict);
        out.push_str(&format!(
            "\n{BOLD}{}{RESET}  {vc}{BOLD} {} {RESET}  risk {}/100\n",
            result.file, result.verdict, result.risk_score
        ));
        if result.findings.is_empty() {
            out.push_str(&format!("  {DIM}No threat patterns found.{RESET}\n"));
            continue;
        }
        for f in &result.findings {
            let line = f.line.map(|l| format!("L{}", l)).unwrap_or_default();
            out.push_str(&format!(
                "  {}{RESET} {} {DIM}{} ({}){RESET}\n",
                audit_tag(f.severity),
                f.message,
                line,
                f.category
            ));
            out.push_str(&format!("      {DIM}> {}{RESET}\n", f.matched));
            out.push_str(&format!("      {DIM}{}{RESET}\n", f.recommendation));
        }
    }

    let flagged = results.iter().filter(|r| r.verdict != Verdict::Safe).count();
    out.push_str(&format!(
        "\n{} file(s) audited, {} flagged\n",
        results.len(),
        flagged
    ));
    Ok(out)
}

fn format_location(d: &Diagnostic) -> String {
    match d.line {
        Some(line) => format!("{}:{}", d.file, line),
        None => d.file.clone(),
    }
}

fn format_score(score: u32) -> String {
    let color = if score >= 80 {
        "\x1b[32m"
    } else if score >= 60 {
        "\x1b[33m"
    } else {
        "\x1b[31m"
    };
    format!("{color}{:>3}{RESET}", score)
}
