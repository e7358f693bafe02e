//! Init command - write an example agentlint.toml

use anyhow::{Context, Result};
use console::style;
use std::path::Path;

pub const DEFAULT_CONFIG: &str = r#"# agentlint configuration

# Disable a rule or change its severity (error, warning, info)
# [rules."clarity/vague-language"]
# enabled = false
#
# [rules."structure/file-length"]
# severity = "info"

[scoring.penalties]
# Points deducted from a category per diagnostic
error = 25
warning = 10
info = 3

[exclude]
# Extra paths to skip (gitignore-style prefixes and globs)
paths = []
# Set to true to scan node_modules, vendor, dist, build and target too
skip_defaults = false

[defaults]
# Default output format (text, json)
format = "text"
# Exit 1 from `lint` when the overall score is below this value
# fail_below = 70
# Exit 1 from `audit` at or above this verdict (suspicious, dangerous, malicious)
# fail_on = "dangerous"
"#;

/// Run the init command
pub fn run(path: &Path) -> Result<()> {
    let root = path
        .canonicalize()
        .with_context(|| format!("Path does not exist: {}", path.display()))?;

    if !root.is_dir() {
        anyhow::bail!("Path is not a directory: {}", root.display());
    }

    let config_path = root.join("agentlint.toml");
    if config_path.exists() {
        println!(
            "{} Config already exists at {}",
            style("✓").green(),
            style(config_path.display()).cyan()
        );
        return Ok(());
    }

    std::fs::write(&config_path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;
    println!(
        "{} Created {}",
        style("✓").green(),
        style(config_path.display()).cyan()
    );
    println!(
        "\nNext: run {} to score your agent instructions.",
        style("agentlint lint").bold()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_parses() {
        let config = crate::config::parse_toml_config(DEFAULT_CONFIG).unwrap();
        assert_eq!(config.scoring.penalties.error, 25);
        assert_eq!(config.defaults.format.as_deref(), Some("text"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_init_writes_once() {
        let dir = tempfile::tempdir().unwrap();
        run(dir.path()).unwrap();
        let path = dir.path().join("agentlint.toml");
        assert!(path.exists());

        std::fs::write(&path, "# custom").unwrap();
        run(dir.path()).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# custom");
    }
}
