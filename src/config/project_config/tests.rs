use super::*;

#[test]
fn test_glob_match() {
    // ** patterns
    assert!(glob_match("**/node_modules/**", "pkg/node_modules/x/SKILL.md"));
    assert!(glob_match("**/node_modules/**", "node_modules/x.md"));
    assert!(glob_match("**/*.bak.md", "notes/old.bak.md"));
    assert!(glob_match("archive/**", "archive/2024/CLAUDE.md"));

    // Prefix patterns
    assert!(glob_match("drafts/", "drafts/AGENTS.md"));
    assert!(!glob_match("drafts/", "src/drafts/AGENTS.md"));
    assert!(glob_match("*.tmp.md", "x/y.tmp.md"));
    assert!(glob_match("NOTES.md", "NOTES.md"));
    assert!(!glob_match("NOTES.md", "OTHER.md"));
}

#[test]
fn test_default_config() {
    let config = ProjectConfig::default();
    assert!(config.rules.is_empty());
    assert_eq!(config.severity_override("structure/has-headings"), None);
    assert_eq!(config.scoring.penalties, PenaltyConfig::default());
    assert_eq!(config.scoring.penalties.for_severity(Severity::Error), 25);
    assert_eq!(config.scoring.penalties.for_severity(Severity::Warning), 10);
    assert_eq!(config.scoring.penalties.for_severity(Severity::Info), 3);
}

#[test]
fn test_parse_toml_config() {
    let toml = r#"
[rules."clarity/vague-language"]
enabled = false

[rules."structure/file-length"]
severity = "info"

[scoring.penalties]
error = 20

[exclude]
paths = ["drafts/"]

[defaults]
format = "json"
workers = 4
fail_below = 70
"#;
    let config = parse_toml_config(toml).expect("valid toml");
    assert_eq!(config.rules["clarity/vague-language"].enabled, Some(false));
    assert!(!config.rules.contains_key("clarity/wall-of-text"));
    assert_eq!(config.rules["structure/file-length"].enabled, None);
    assert_eq!(
        config.severity_override("structure/file-length"),
        Some(Severity::Info)
    );
    assert_eq!(config.scoring.penalties.error, 20);
    // Unset penalties keep their defaults
    assert_eq!(config.scoring.penalties.warning, 10);
    assert_eq!(config.defaults.format.as_deref(), Some("json"));
    assert_eq!(config.defaults.workers, Some(4));
    assert_eq!(config.defaults.fail_below, Some(70));
    assert!(config.exclude.is_excluded("drafts/CLAUDE.md"));
    assert!(config.exclude.is_excluded("a/node_modules/b.md"));
    assert!(!config.exclude.is_excluded("CLAUDE.md"));
}

#[test]
fn test_parse_json_config() {
    let json = r#"{ "rules": { "memory/memory-file": { "enabled": false } }, "exclude": { "skip_defaults": true } }"#;
    let config = parse_json_config(json).expect("valid json");
    assert_eq!(config.rules["memory/memory-file"].enabled, Some(false));
    assert!(!config.exclude.is_excluded("node_modules/x.md"));
}

#[test]
fn test_unknown_severity_rejected() {
    let config = parse_toml_config("[rules.\"a/b\"]\nseverity = \"catastrophic\"\n").unwrap();
    let err = config.validate().unwrap_err();
    assert!(matches!(err, ConfigError::UnknownSeverity { .. }));
}

#[test]
fn test_load_project_config_from_dir() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("agentlint.toml"),
        "[defaults]\nworkers = 2\n",
    )
    .unwrap();
    let config = load_project_config(dir.path());
    assert_eq!(config.defaults.workers, Some(2));
}

#[test]
fn test_malformed_config_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("agentlint.toml"), "[defaults\nworkers = ").unwrap();
    let config = load_project_config(dir.path());
    assert_eq!(config.defaults.workers, None);

    let err = load_config_file(&dir.path().join("agentlint.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Toml { .. }));
}

#[test]
fn test_missing_config_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = load_project_config(dir.path());
    assert!(config.rules.is_empty());
}
