//! Severity-penalty scorer for the eight lint categories

use crate::config::{PenaltyConfig, ScoringConfig};
use crate::models::{Category, CategoryScore, Diagnostic, LintResult};
use tracing::{debug, info};

const MAX_SCORE: u32 = 100;

/// Computes category and overall scores from diagnostics
#[derive(Debug, Clone, Default)]
pub struct CategoryScorer {
    penalties: PenaltyConfig,
}

impl CategoryScorer {
    pub fn new(config: &ScoringConfig) -> Self {
        Self {
            penalties: config.penalties,
        }
    }

    pub fn with_penalties(penalties: PenaltyConfig) -> Self {
        Self { penalties }
    }

    /// Score every category. Always returns all eight, in [`Category::ALL`] order.
    pub fn score_categories(&self, diagnostics: &[Diagnostic]) -> Vec<CategoryScore> {
        Category::ALL
            .iter()
            .map(|&category| {
                let attributed: Vec<Diagnostic> = diagnostics
                    .iter()
                    .filter(|d| d.category == category)
                    .cloned()
                    .collect();

                let penalty: u32 = attributed
                    .iter()
                    .map(|d| self.penalties.for_severity(d.severity))
                    .fold(0u32, |acc, p| acc.saturating_add(p));
                let score = MAX_SCORE.saturating_sub(penalty);

                debug!(
                    "Category {}: {} diagnostics, penalty {}, score {}",
                    category,
                    attributed.len(),
                    penalty,
                    score
                );

                CategoryScore {
                    category,
                    score,
                    weight: category.weight(),
                    diagnostics: attributed,
                }
            })
            .collect()
    }

    /// Weighted sum of category scores, rounded to the nearest integer
    pub fn overall(categories: &[CategoryScore]) -> u32 {
        let weighted: f64 = categories
            .iter()
            .map(|c| f64::from(c.score.min(MAX_SCORE)) * c.weight)
            .sum();
        let overall = weighted.round().clamp(0.0, f64::from(MAX_SCORE)) as u32;

        info!(
            "Overall score: {} ({})",
            overall,
            LintResult::grade_from_score(overall)
        );
        overall
    }

    /// Generate human-readable explanation of the score
    pub fn explain(&self, result: &LintResult) -> String {
        let mut lines = Vec::new();

        lines.push(format!(
            "# Score: {} ({})\n",
            result.total_score,
            result.grade()
        ));

        lines.push("## Scoring Formula\n".to_string());
        lines.push("```".to_string());
        lines.push("Category = max(0, 100 - penalties)".to_string());
        lines.push(format!(
            "Penalty  = error {} / warning {} / info {}",
            self.penalties.error, self.penalties.warning, self.penalties.info
        ));
        lines.push("Overall  = Σ Category × Weight".to_string());
        lines.push("```\n".to_string());

        for cat in &result.categories {
            let contribution = f64::from(cat.score) * cat.weight;
            lines.push(format!(
                "- **{}** ({:.0}%): {} → {:.1} pts, {} diagnostics",
                cat.category.label(),
                cat.weight * 100.0,
                cat.score,
                contribution,
                cat.diagnostics.len()
            ));
        }

        lines.join("\n")
    }
}
