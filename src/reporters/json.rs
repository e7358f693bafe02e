//! JSON reporter
//!
//! Outputs results as pretty-printed JSON in the stable camelCase shape.
//! Useful for machine consumption, piping to jq, or further processing.

use crate::models::{AuditResult, LintResult};
use anyhow::Result;

/// Render lint result as JSON
pub fn render(result: &LintResult) -> Result<String> {
    Ok(serde_json::to_string_pretty(result)?)
}

/// Render audit results; one result renders as an object, several as an array
pub fn render_audit(results: &[AuditResult]) -> Result<String> {
    match results {
        [single] => Ok(serde_json::to_string_pretty(single)?),
        many => Ok(serde_json::to_string_pretty(many)?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::audit_skill_file;
    use crate::reporters::tests::test_result;

    #[test]
    fn test_json_render_shape() {
        let result = test_result();
        let json_str = render(&result).expect("render JSON");
        let parsed: serde_json::Value = serde_json::from_str(&json_str).expect("parse JSON");
        assert_eq!(parsed["workspace"], "demo");
        assert!(parsed["totalScore"].is_u64());
        assert_eq!(parsed["categories"].as_array().expect("categories").len(), 8);
        assert_eq!(parsed["categories"][7]["category"], "skillSafety");
        assert_eq!(parsed["files"][0]["sections"][0]["startLine"], 1);

        let diagnostics = parsed["diagnostics"].as_array().expect("diagnostics");
        let workspace_level = diagnostics
            .iter()
            .find(|d| d["file"] == "(workspace)")
            .expect("workspace diagnostic");
        assert!(workspace_level.get("line").is_none());
        assert!(workspace_level.get("fix").is_none());
    }

    #[test]
    fn test_json_round_trip() {
        let result = test_result();
        let back: LintResult = serde_json::from_str(&render(&result).unwrap()).unwrap();
        assert_eq!(back, result);
    }

    #[test]
    fn test_audit_single_vs_many() {
        let one = vec![audit_skill_file("cron: refresh", "SKILL.md")];
        let parsed: serde_json::Value = serde_json::from_str(&render_audit(&one).unwrap()).unwrap();
        assert_eq!(parsed["verdict"], "DANGEROUS");
        assert_eq!(parsed["findings"][0]["severity"], "CRITICAL");

        let two = vec![one[0].clone(), audit_skill_file("", "empty.md")];
        let parsed: serde_json::Value = serde_json::from_str(&render_audit(&two).unwrap()).unwrap();
        assert_eq!(parsed.as_array().unwrap().len(), 2);
        assert_eq!(parsed[1]["verdict"], "SAFE");
    }
}
