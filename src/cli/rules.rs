//! Rules command - list the built-in rules

use crate::models::Category;
use crate::reporters::OutputFormat;
use crate::rules::{default_rules, RuleMeta};
use anyhow::Result;
use console::style;
use serde_json::json;
use std::str::FromStr;

/// Render the rule catalogue grouped by category
pub fn render(metas: &[RuleMeta], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            let entries: Vec<serde_json::Value> = metas
                .iter()
                .map(|m| {
                    json!({
                        "id": m.id,
                        "category": m.category,
                        "severity": m.severity,
                        "description": m.description,
                    })
                })
                .collect();
            Ok(serde_json::to_string_pretty(&entries)?)
        }
        OutputFormat::Text => {
            let mut out = String::new();
            for category in Category::ALL {
                let in_category: Vec<&RuleMeta> =
                    metas.iter().filter(|m| m.category == category).collect();
                if in_category.is_empty() {
                    continue;
                }
                out.push_str(&format!(
                    "\n{} {}\n",
                    style(category.label()).bold(),
                    style(format!("(weight {:.0}%)", category.weight() * 100.0)).dim()
                ));
                for m in in_category {
                    out.push_str(&format!(
                        "  {:<40} {:<8} {}\n",
                        style(m.id).cyan(),
                        m.severity,
                        m.description
                    ));
                }
            }
            Ok(out)
        }
    }
}

/// Run the rules command
pub fn run(format: Option<String>) -> Result<()> {
    let format = OutputFormat::from_str(format.as_deref().unwrap_or("text"))?;
    let metas: Vec<RuleMeta> = default_rules().iter().map(|r| r.meta()).collect();
    println!("{}", render(&metas, format)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rules_json_lists_every_rule() {
        let metas: Vec<RuleMeta> = default_rules().iter().map(|r| r.meta()).collect();
        let parsed: serde_json::Value =
            serde_json::from_str(&render(&metas, OutputFormat::Json).unwrap()).unwrap();
        let entries = parsed.as_array().unwrap();
        assert_eq!(entries.len(), metas.len());
        assert!(entries
            .iter()
            .any(|e| e["id"] == "skill-safety/audit" && e["category"] == "skillSafety"));
    }

    #[test]
    fn test_rules_text_groups_by_category() {
        let metas: Vec<RuleMeta> = default_rules().iter().map(|r| r.meta()).collect();
        let text = render(&metas, OutputFormat::Text).unwrap();
        assert!(text.contains("Runtime Config"));
        assert!(text.contains("runtime/gateway-bind"));
    }
}
