//! Rule execution engine with parallel support
//!
//! The RuleEngine orchestrates the execution of all registered rules:
//! - Captures each rule's metadata once, at registration
//! - Runs rules in parallel using rayon over an immutable file snapshot
//! - Converts failing or panicking rules into a single info diagnostic
//! - Scores the merged diagnostics into a `LintResult`
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                      RuleEngine                         │
//! ├─────────────────────────────────────────────────────────┤
//! │  1. Register rules (metadata captured by value)         │
//! │  2. Drop rules disabled in config                       │
//! │  3. Run rules in parallel (rayon)                       │
//! │  4. Isolate failures, apply severity overrides          │
//! │  5. Score categories and build the LintResult           │
//! └─────────────────────────────────────────────────────────┘
//! ```

use crate::config::ProjectConfig;
use crate::models::{Diagnostic, FileRecord, LintResult, Severity};
use crate::rules::base::{EvaluationSummary, Rule, RuleMeta, RuleResult};
use crate::scoring::CategoryScorer;
use chrono::Utc;
use rayon::prelude::*;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// File name used for diagnostics that describe engine-level problems
pub const ENGINE_FILE: &str = "(engine)";

/// A rule together with the metadata captured when it was registered
#[derive(Clone)]
pub struct RegisteredRule {
    pub meta: RuleMeta,
    rule: Arc<dyn Rule>,
}

impl RegisteredRule {
    pub fn new(rule: Arc<dyn Rule>) -> Self {
        Self {
            meta: rule.meta(),
            rule,
        }
    }
}

/// Orchestrates workspace linting across all registered rules
pub struct RuleEngine {
    rules: Vec<RegisteredRule>,
    /// Number of worker threads for parallel execution
    workers: usize,
    disabled: HashSet<String>,
    severity_overrides: HashMap<String, Severity>,
    scorer: CategoryScorer,
}

impl RuleEngine {
    /// Create a new rule engine
    ///
    /// # Arguments
    /// * `workers` - Number of worker threads (0 = auto-detect)
    pub fn new(workers: usize) -> Self {
        let actual_workers = if workers == 0 {
            std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(4)
                .min(16) // Cap at 16 threads
        } else {
            workers
        };

        Self {
            rules: Vec::new(),
            workers: actual_workers,
            disabled: HashSet::new(),
            severity_overrides: HashMap::new(),
            scorer: CategoryScorer::default(),
        }
    }

    /// Apply rule toggles, severity overrides and penalties from project config
    pub fn with_config(mut self, config: &ProjectConfig) -> Self {
        for (id, cfg) in &config.rules {
            if cfg.enabled == Some(false) {
                self.disabled.insert(id.clone());
            }
            if let Some(severity) = config.severity_override(id) {
                self.severity_overrides.insert(id.clone(), severity);
            }
        }
        self.scorer = CategoryScorer::new(&config.scoring);
        self
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Register a rule
    pub fn register(&mut self, rule: Arc<dyn Rule>) {
        let registered = RegisteredRule::new(rule);
        debug!("Registering rule: {}", registered.meta.id);
        self.rules.push(registered);
    }

    /// Register multiple rules at once
    pub fn register_all(&mut self, rules: impl IntoIterator<Item = Arc<dyn Rule>>) {
        for rule in rules {
            self.register(rule);
        }
    }

    /// Get the number of registered rules
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Metadata of all registered rules, in registration order
    pub fn rule_metas(&self) -> Vec<RuleMeta> {
        self.rules.iter().map(|r| r.meta).collect()
    }

    /// Whether a rule will run
    pub fn is_enabled(&self, id: &str) -> bool {
        !self.disabled.contains(id)
    }

    /// Run all enabled rules and return per-rule results in registration order
    pub fn run_detailed(&self, files: &[FileRecord]) -> (Vec<RuleResult>, EvaluationSummary) {
        let start = Instant::now();
        let active: Vec<&RegisteredRule> = self
            .rules
            .iter()
            .filter(|r| {
                let enabled = self.is_enabled(r.meta.id);
                if !enabled {
                    debug!("Skipping disabled rule: {}", r.meta.id);
                }
                enabled
            })
            .collect();

        info!(
            "Running {} rules on {} files with {} workers",
            active.len(),
            files.len(),
            self.workers
        );

        let results: Vec<RuleResult> = match rayon::ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .build()
        {
            Ok(pool) => pool.install(|| {
                active
                    .par_iter()
                    .map(|rule| self.run_single_rule(rule, files))
                    .collect()
            }),
            Err(e) => {
                warn!("Failed to build worker pool ({}), running rules sequentially", e);
                active
                    .iter()
                    .map(|rule| self.run_single_rule(rule, files))
                    .collect()
            }
        };

        let mut summary = EvaluationSummary::default();
        for result in &results {
            summary.add_result(result);
            if let Some(err) = &result.error {
                warn!("Rule {} failed: {}", result.rule_id, err);
            }
        }
        summary.total_duration_ms = start.elapsed().as_millis() as u64;

        (results, summary)
    }

    /// Run all enabled rules and collect their diagnostics
    pub fn run(&self, files: &[FileRecord]) -> Vec<Diagnostic> {
        let (results, summary) = self.run_detailed(files);

        info!(
            "Evaluation complete: {} diagnostics from {}/{} rules in {}ms",
            summary.total_diagnostics,
            summary.rules_succeeded,
            summary.rules_run,
            summary.total_duration_ms
        );

        results.into_iter().flat_map(|r| r.diagnostics).collect()
    }

    /// Lint a workspace and score it
    pub fn evaluate(&self, workspace: impl Into<String>, files: Vec<FileRecord>) -> LintResult {
        let diagnostics = self.run(&files);
        let categories = self.scorer.score_categories(&diagnostics);
        let total_score = CategoryScorer::overall(&categories);

        LintResult {
            workspace: workspace.into(),
            files,
            categories,
            total_score,
            diagnostics,
            timestamp: Utc::now(),
        }
    }

    /// Run a single rule with error handling and timing
    fn run_single_rule(&self, registered: &RegisteredRule, files: &[FileRecord]) -> RuleResult {
        let meta = registered.meta;
        let id = meta.id.to_string();
        let start = Instant::now();

        debug!("Running rule: {}", id);

        // Wrap in catch_unwind to handle panics
        let check_result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            registered.rule.check(files)
        }));

        let duration = start.elapsed().as_millis() as u64;
        match check_result {
            Ok(Ok(diagnostics)) => {
                let diagnostics = self.apply_severity_override(meta.id, diagnostics);
                debug!(
                    "Rule {} produced {} diagnostics in {}ms",
                    id,
                    diagnostics.len(),
                    duration
                );
                RuleResult::success(id, diagnostics, duration)
            }
            Ok(Err(e)) => {
                let message = format!("{:#}", e);
                let diagnostic = failure_diagnostic(&meta, &message);
                RuleResult::failure(id, message, diagnostic, duration)
            }
            Err(panic_info) => {
                let panic_msg = if let Some(s) = panic_info.downcast_ref::<&str>() {
                    s.to_string()
                } else if let Some(s) = panic_info.downcast_ref::<String>() {
                    s.clone()
                } else {
                    "Unknown panic".to_string()
                };
                error!("Rule {} panicked: {}", id, panic_msg);
                let message = format!("Panic: {}", panic_msg);
                let diagnostic = failure_diagnostic(&meta, &message);
                RuleResult::failure(id, message, diagnostic, duration)
            }
        }
    }

    fn apply_severity_override(&self, id: &str, diagnostics: Vec<Diagnostic>) -> Vec<Diagnostic> {
        match self.severity_overrides.get(id) {
            Some(&severity) => diagnostics
                .into_iter()
                .map(|d| d.with_severity(severity))
                .collect(),
            None => diagnostics,
        }
    }
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new(0)
    }
}

/// The single informational diagnostic standing in for a failed rule
fn failure_diagnostic(meta: &RuleMeta, error: &str) -> Diagnostic {
    meta.diagnostic(
        ENGINE_FILE,
        format!("Rule {} failed and was skipped: {}", meta.id, error),
    )
    .with_severity(Severity::Info)
}
