//! Configuration module for agentlint
//!
//! This module handles:
//! - Workspace-level configuration (agentlint.toml)
//! - Per-rule enable/severity overrides
//! - Scoring penalties
//! - CLI defaults

mod project_config;

pub use project_config::{
    glob_match, load_config_file, load_project_config, parse_json_config, parse_toml_config,
    CliDefaults, ConfigError, ExcludeConfig, PenaltyConfig, ProjectConfig, RuleConfigOverride,
    ScoringConfig, CONFIG_FILE_NAMES, DEFAULT_EXCLUDE_PATTERNS,
};
