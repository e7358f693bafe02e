//! Project-level configuration support
//!
//! Loads per-workspace configuration from `agentlint.toml` or
//! `.agentlintrc.json` in the workspace root.
//!
//! # Configuration Format
//!
//! ```toml
//! # agentlint.toml
//!
//! [rules."clarity/vague-language"]
//! enabled = false
//!
//! [rules."structure/file-length"]
//! severity = "info"  # Override default severity
//!
//! [scoring.penalties]
//! error = 25
//! warning = 10
//! info = 3
//!
//! [exclude]
//! paths = ["drafts/", "archive/**"]
//!
//! [defaults]
//! format = "text"
//! workers = 8
//! fail_below = 70
//! ```

use crate::models::Severity;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// File names searched for, in order
pub const CONFIG_FILE_NAMES: &[&str] = &["agentlint.toml", ".agentlintrc.json"];

/// Built-in default exclusion patterns for vendored/third-party content.
/// These are applied automatically unless `skip_defaults = true` in config.
pub const DEFAULT_EXCLUDE_PATTERNS: &[&str] = &[
    "**/node_modules/**",
    "**/vendor/**",
    "**/third_party/**",
    "**/dist/**",
    "**/build/**",
    "**/target/**",
    "**/.git/**",
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid TOML in {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("unknown severity '{value}' for rule {rule} (expected error, warning or info)")]
    UnknownSeverity { rule: String, value: String },
}

/// Workspace configuration loaded from agentlint.toml or similar
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ProjectConfig {
    /// Per-rule overrides keyed by rule id
    #[serde(default)]
    pub rules: HashMap<String, RuleConfigOverride>,

    /// Scoring configuration
    #[serde(default)]
    pub scoring: ScoringConfig,

    /// Path exclusion patterns
    #[serde(default)]
    pub exclude: ExcludeConfig,

    /// Default CLI flags
    #[serde(default)]
    pub defaults: CliDefaults,
}

/// Configuration override for a specific rule
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RuleConfigOverride {
    /// Whether the rule is enabled (default: true)
    #[serde(default)]
    pub enabled: Option<bool>,

    /// Force every diagnostic of the rule to this severity (error, warning, info)
    #[serde(default)]
    pub severity: Option<String>,
}

/// Scoring configuration for category score calculation
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ScoringConfig {
    #[serde(default)]
    pub penalties: PenaltyConfig,
}

/// Points deducted from a category per diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PenaltyConfig {
    #[serde(default = "default_error_penalty")]
    pub error: u32,
    #[serde(default = "default_warning_penalty")]
    pub warning: u32,
    #[serde(default = "default_info_penalty")]
    pub info: u32,
}

impl Default for PenaltyConfig {
    fn default() -> Self {
        Self {
            error: default_error_penalty(),
            warning: default_warning_penalty(),
            info: default_info_penalty(),
        }
    }
}

// Same point scale the skill auditor uses for CRITICAL / WARNING / INFO
fn default_error_penalty() -> u32 {
    25
}
fn default_warning_penalty() -> u32 {
    10
}
fn default_info_penalty() -> u32 {
    3
}

impl PenaltyConfig {
    pub fn for_severity(&self, severity: Severity) -> u32 {
        match severity {
            Severity::Error => self.error,
            Severity::Warning => self.warning,
            Severity::Info => self.info,
        }
    }

    /// Penalties must keep error >= warning >= info
    pub fn is_valid(&self) -> bool {
        self.error >= self.warning && self.warning >= self.info
    }
}

/// Path exclusion configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ExcludeConfig {
    /// Paths/patterns to exclude from the scan
    #[serde(default)]
    pub paths: Vec<String>,

    /// If true, disable built-in default exclusion patterns
    #[serde(default)]
    pub skip_defaults: bool,
}

impl ExcludeConfig {
    /// Returns effective exclusion patterns (defaults + user patterns).
    /// If `skip_defaults` is true, only user patterns are returned.
    pub fn effective_patterns(&self) -> Vec<String> {
        let mut patterns = Vec::new();

        if !self.skip_defaults {
            patterns.extend(DEFAULT_EXCLUDE_PATTERNS.iter().map(|s| s.to_string()));
        }

        for p in &self.paths {
            if !patterns.contains(p) {
                patterns.push(p.clone());
            }
        }

        patterns
    }

    /// Whether a workspace-relative path is excluded
    pub fn is_excluded(&self, rel_path: &str) -> bool {
        self.effective_patterns()
            .iter()
            .any(|p| glob_match(p, rel_path))
    }
}

/// Default CLI flags that can be set in project config
#[derive(Debug, Clone, Deserialize, Default)]
pub struct CliDefaults {
    /// Default output format (text, json)
    #[serde(default)]
    pub format: Option<String>,

    /// Default number of workers
    #[serde(default)]
    pub workers: Option<usize>,

    /// Fail `lint` when the overall score is below this value
    #[serde(default)]
    pub fail_below: Option<u32>,

    /// Fail `audit` at or above this verdict
    #[serde(default)]
    pub fail_on: Option<String>,
}

/// Load project configuration from the workspace root.
///
/// Searches for configuration files in this order:
/// 1. `agentlint.toml`
/// 2. `.agentlintrc.json`
///
/// Returns default configuration if no config file is found or the file is
/// malformed (the problem is logged).
pub fn load_project_config(root: &Path) -> ProjectConfig {
    for name in CONFIG_FILE_NAMES {
        let path = root.join(name);
        if !path.exists() {
            continue;
        }
        match load_config_file(&path) {
            Ok(config) => {
                debug!("Loaded project config from {}", path.display());
                return config;
            }
            Err(e) => {
                warn!("{}", e);
            }
        }
    }

    debug!("No project config found, using defaults");
    ProjectConfig::default()
}

/// Load and validate one configuration file
pub fn load_config_file(path: &Path) -> Result<ProjectConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let config = if is_json {
        parse_json_config(&content).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })?
    } else {
        parse_toml_config(&content).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })?
    };

    config.validate()?;
    Ok(config)
}

/// Parse configuration from TOML text
pub fn parse_toml_config(content: &str) -> Result<ProjectConfig, toml::de::Error> {
    toml::from_str(content)
}

/// Parse configuration from JSON text
pub fn parse_json_config(content: &str) -> Result<ProjectConfig, serde_json::Error> {
    serde_json::from_str(content)
}

impl ProjectConfig {
    /// Reject overrides the engine cannot apply
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (rule, cfg) in &self.rules {
            if let Some(value) = &cfg.severity {
                if Severity::parse(value).is_none() {
                    return Err(ConfigError::UnknownSeverity {
                        rule: rule.clone(),
                        value: value.clone(),
                    });
                }
            }
        }
        if !self.scoring.penalties.is_valid() {
            warn!(
                "Scoring penalties are not ordered error >= warning >= info: {:?}",
                self.scoring.penalties
            );
        }
        Ok(())
    }

    /// Severity override for a rule (if any)
    pub fn severity_override(&self, id: &str) -> Option<Severity> {
        self.rules
            .get(id)
            .and_then(|c| c.severity.as_deref())
            .and_then(Severity::parse)
    }
}

/// Minimal glob matching for exclusion patterns.
///
/// Supports `**/dir/**`, `prefix/**`, `**/*.ext`, `*.ext` and plain
/// directory prefixes (`drafts/`).
pub fn glob_match(pattern: &str, path: &str) -> bool {
    // **/X/** matches X as any directory component
    if pattern.starts_with("**/") && pattern.ends_with("/**") {
        let middle = pattern.trim_start_matches("**/").trim_end_matches("/**");
        return path.contains(&format!("/{}/", middle)) || path.starts_with(&format!("{}/", middle));
    }

    if let Some(suffix) = pattern.strip_prefix("**/") {
        return match suffix.strip_prefix('*') {
            Some(ext) => path.ends_with(ext),
            None => path == suffix || path.ends_with(&format!("/{}", suffix)),
        };
    }

    if let Some(prefix) = pattern.strip_suffix("/**") {
        return path.starts_with(&format!("{}/", prefix));
    }

    if let Some(ext) = pattern.strip_prefix('*') {
        let file_name = path.rsplit('/').next().unwrap_or(path);
        return file_name.ends_with(ext);
    }

    if pattern.ends_with('/') {
        return path.starts_with(pattern);
    }

    path == pattern || path.starts_with(&format!("{}/", pattern))
}

#[cfg(test)]
mod tests;
