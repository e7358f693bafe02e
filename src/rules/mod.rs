//! Lint rules for agent workspaces
//!
//! This module provides the rule framework and the built-in rule set.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        RuleEngine                           │
//! │  - Registers rules (metadata captured at registration)      │
//! │  - Runs rules in parallel (rayon)                           │
//! │  - Turns failing rules into info diagnostics                │
//! │  - Scores diagnostics into a LintResult                     │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         Rule Trait                          │
//! │  - meta(): id, category, default severity, description      │
//! │  - check(files): evaluate the workspace, return diagnostics │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!              ┌───────────────┼───────────────┐
//!              ▼               ▼               ▼
//! ┌──────────────────┐ ┌──────────────┐ ┌──────────────────┐
//! │ Markdown rules   │ │ Config rules │ │ Skill audit      │
//! │ (structure,      │ │ (runtime,    │ │ (skillSafety)    │
//! │  clarity, ...)   │ │ ConfigSource)│ │                  │
//! └──────────────────┘ └──────────────┘ └──────────────────┘
//! ```
//!
//! Rules are registered in category order: structure, clarity,
//! completeness, security, consistency, memory, runtime, skillSafety.

pub mod base;
pub mod clarity;
pub mod completeness;
pub mod config_source;
pub mod consistency;
pub mod engine;
pub mod memory;
pub mod runtime;
pub mod security;
pub mod skill_safety;
pub mod structure;

pub use base::{
    markdown_files, prose_lines, prose_sections, rule, EvaluationSummary, FnRule, Rule, RuleMeta,
    RuleResult, MAX_DIAGNOSTICS_PER_FILE,
};
pub use config_source::{
    lookup, ConfigSource, RuntimeConfig, StaticConfigSource, WorkspaceConfigSource,
    RUNTIME_CONFIG_NAMES,
};
pub use engine::{RegisteredRule, RuleEngine, ENGINE_FILE};

use crate::config::ProjectConfig;
use std::sync::Arc;

/// Every built-in rule, with runtime rules reading config through `source`
pub fn rules_with_source(source: Arc<dyn ConfigSource>) -> Vec<Arc<dyn Rule>> {
    let mut rules = Vec::new();
    rules.extend(structure::rules());
    rules.extend(clarity::rules());
    rules.extend(completeness::rules());
    rules.extend(security::rules());
    rules.extend(consistency::rules());
    rules.extend(memory::rules());
    rules.extend(runtime::rules(source));
    rules.extend(skill_safety::rules());
    rules
}

/// Every built-in rule
pub fn default_rules() -> Vec<Arc<dyn Rule>> {
    rules_with_source(Arc::new(WorkspaceConfigSource))
}

/// An engine with all built-in rules, configured from project config
pub fn default_engine(config: &ProjectConfig, workers: usize) -> RuleEngine {
    let mut engine = RuleEngine::new(workers).with_config(config);
    engine.register_all(default_rules());
    engine
}
