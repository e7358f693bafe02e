//! Runtime config rules
//!
//! Checks the agent runtime config (`clawdbot.json` / `openclaw.json`) for
//! a network-exposed gateway, disabled auth, weak tokens, open channel
//! policies and plaintext secrets.

use crate::models::{Category, Diagnostic, FileRecord, Severity};
use crate::rules::base::{rule, Rule, RuleMeta};
use crate::rules::config_source::{ConfigSource, RuntimeConfig, WorkspaceConfigSource};
use anyhow::Result;
use serde_json::Value;
use std::sync::Arc;

pub const CONFIG_EXISTS: RuleMeta = RuleMeta::new(
    "runtime/config-exists",
    Category::Runtime,
    Severity::Info,
    "Agent runtime config file should exist for full analysis",
);
pub const GATEWAY_BIND: RuleMeta = RuleMeta::new(
    "runtime/gateway-bind",
    Category::Runtime,
    Severity::Error,
    "Gateway must bind to loopback (localhost) only",
);
pub const AUTH_MODE: RuleMeta = RuleMeta::new(
    "runtime/auth-mode",
    Category::Runtime,
    Severity::Error,
    "Gateway authentication must be enabled",
);
pub const TOKEN_STRENGTH: RuleMeta = RuleMeta::new(
    "runtime/token-strength",
    Category::Runtime,
    Severity::Warning,
    "Gateway auth token should be at least 32 characters",
);
pub const DM_POLICY: RuleMeta = RuleMeta::new(
    "runtime/dm-policy",
    Category::Runtime,
    Severity::Warning,
    "Open DM policy should have allowFrom restrictions",
);
pub const GROUP_POLICY: RuleMeta = RuleMeta::new(
    "runtime/group-policy",
    Category::Runtime,
    Severity::Warning,
    "Group policy should use allowlist",
);
pub const CONFIG_SECRETS: RuleMeta = RuleMeta::new(
    "runtime/config-secrets",
    Category::Runtime,
    Severity::Warning,
    "Config should use env var references instead of plaintext secrets",
);

const LOOPBACK_BINDS: &[&str] = &["loopback", "localhost", "127.0.0.1", "::1"];
const DISABLED_AUTH_MODES: &[&str] = &["off", "none"];
const OPEN_GROUP_POLICIES: &[&str] = &["open", "any"];
const MIN_TOKEN_CHARS: usize = 16;
const RECOMMENDED_TOKEN_CHARS: usize = 32;
const SENSITIVE_KEYS: &[&str] = &[
    "password",
    "secret",
    "apikey",
    "api_key",
    "privatekey",
    "private_key",
    "token",
];
/// Values under sensitive keys that name a mode rather than hold a secret
const MODE_WORDS: &[&str] = &["token", "password", "off", "none", "pairing", "allowlist", "open"];

/// All runtime rules, reading config through `source`
pub fn rules(source: Arc<dyn ConfigSource>) -> Vec<Arc<dyn Rule>> {
    let exists_source = source.clone();
    vec![
        rule(CONFIG_EXISTS, move |meta, files| {
            check_config_exists(meta, exists_source.as_ref(), files)
        }),
        with_config(source.clone(), GATEWAY_BIND, check_gateway_bind),
        with_config(source.clone(), AUTH_MODE, check_auth_mode),
        with_config(source.clone(), TOKEN_STRENGTH, check_token_strength),
        with_config(source.clone(), DM_POLICY, check_dm_policy),
        with_config(source.clone(), GROUP_POLICY, check_group_policy),
        with_config(source, CONFIG_SECRETS, check_config_secrets),
    ]
}

/// Runtime rules reading the workspace config files
pub fn default_rules() -> Vec<Arc<dyn Rule>> {
    rules(Arc::new(WorkspaceConfigSource))
}

type ConfigCheck = fn(&RuleMeta, &RuntimeConfig) -> Vec<Diagnostic>;

/// Wrap a config check so it runs only when the source yields a document
fn with_config(source: Arc<dyn ConfigSource>, meta: RuleMeta, check: ConfigCheck) -> Arc<dyn Rule> {
    rule(meta, move |meta, files| -> Result<Vec<Diagnostic>> {
        Ok(source
            .load(files)
            .map(|config| check(meta, &config))
            .unwrap_or_default())
    })
}

fn check_config_exists(
    meta: &RuleMeta,
    source: &dyn ConfigSource,
    files: &[FileRecord],
) -> Result<Vec<Diagnostic>> {
    if source.exists(files) {
        return Ok(vec![]);
    }
    Ok(vec![meta
        .diagnostic(
            "(workspace)",
            "No runtime config (clawdbot.json / openclaw.json) found. Runtime checks skipped.",
        )
        .with_fix(
            "If using Clawdbot/OpenClaw, ensure clawdbot.json exists in ~/.clawdbot/ or project root.",
        )])
}

fn check_gateway_bind(meta: &RuleMeta, config: &RuntimeConfig) -> Vec<Diagnostic> {
    match config.get_str("gateway.bind") {
        Some(bind) if !bind.is_empty() && !LOOPBACK_BINDS.contains(&bind) => vec![meta
            .diagnostic(
                &config.file_name,
                format!(
                    "Gateway bind is \"{}\", which exposes the agent to the network. Must be loopback.",
                    bind
                ),
            )
            .with_fix("Set gateway.bind to \"loopback\" or remove the key (default is loopback).")],
        _ => vec![],
    }
}

fn check_auth_mode(meta: &RuleMeta, config: &RuntimeConfig) -> Vec<Diagnostic> {
    match config.get_str("gateway.auth.mode") {
        Some(mode) if DISABLED_AUTH_MODES.contains(&mode) => vec![meta
            .diagnostic(
                &config.file_name,
                format!(
                    "Auth mode is \"{}\": anyone who can reach the gateway can control your agent.",
                    mode
                ),
            )
            .with_fix("Set gateway.auth.mode to \"token\" and configure a strong token.")],
        _ => vec![],
    }
}

fn check_token_strength(meta: &RuleMeta, config: &RuntimeConfig) -> Vec<Diagnostic> {
    // Password length is not judged
    if config.get_str("gateway.auth.mode") == Some("password") {
        return vec![];
    }
    let Some(token) = config.get_str("gateway.auth.token").filter(|t| !t.is_empty()) else {
        return vec![];
    };

    let len = token.chars().count();
    if len < MIN_TOKEN_CHARS {
        vec![meta
            .diagnostic(
                &config.file_name,
                format!("Auth token is only {} characters, vulnerable to brute-force.", len),
            )
            .with_severity(Severity::Error)
            .with_fix("Use a token of at least 32 characters. Generate one with: openssl rand -hex 32")]
    } else if len < RECOMMENDED_TOKEN_CHARS {
        vec![meta
            .diagnostic(
                &config.file_name,
                format!("Auth token is {} characters; consider using 32+.", len),
            )
            .with_fix("Generate a stronger token: openssl rand -hex 32")]
    } else {
        vec![]
    }
}

/// `(name, settings)` for every object-valued entry under `channels`
fn channels(config: &RuntimeConfig) -> impl Iterator<Item = (&String, &serde_json::Map<String, Value>)> {
    config
        .get("channels")
        .and_then(Value::as_object)
        .into_iter()
        .flatten()
        .filter_map(|(name, value)| value.as_object().map(|settings| (name, settings)))
}

fn check_dm_policy(meta: &RuleMeta, config: &RuntimeConfig) -> Vec<Diagnostic> {
    channels(config)
        .filter(|(_, ch)| {
            let open = ch.get("dmPolicy").and_then(Value::as_str) == Some("open");
            let restricted = ch
                .get("allowFrom")
                .and_then(Value::as_array)
                .is_some_and(|list| !list.is_empty());
            open && !restricted
        })
        .map(|(name, _)| {
            meta.diagnostic(
                &config.file_name,
                format!(
                    "Channel \"{}\": DM policy is \"open\" with no allowFrom, so anyone can command your agent.",
                    name
                ),
            )
            .with_fix("Add allowFrom with authorized user IDs, or set dmPolicy to \"pairing\".")
        })
        .collect()
}

fn check_group_policy(meta: &RuleMeta, config: &RuntimeConfig) -> Vec<Diagnostic> {
    channels(config)
        .filter_map(|(name, ch)| {
            let policy = ch.get("groupPolicy").and_then(Value::as_str)?;
            OPEN_GROUP_POLICIES.contains(&policy).then(|| {
                meta.diagnostic(
                    &config.file_name,
                    format!(
                        "Channel \"{}\": Group policy is \"{}\", so any group can trigger your agent.",
                        name, policy
                    ),
                )
                .with_fix("Set groupPolicy to \"allowlist\" and define allowed groups.")
            })
        })
        .collect()
}

fn check_config_secrets(meta: &RuleMeta, config: &RuntimeConfig) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    scan_secrets(meta, &config.file_name, &config.document, "", &mut diagnostics);
    diagnostics
}

fn is_sensitive_key(key: &str) -> bool {
    let key = key.to_lowercase();
    SENSITIVE_KEYS.iter().any(|s| key.contains(s))
}

fn scan_secrets(
    meta: &RuleMeta,
    file: &str,
    value: &Value,
    path: &str,
    out: &mut Vec<Diagnostic>,
) {
    let entries: Vec<(String, &Value)> = match value {
        Value::Object(map) => map.iter().map(|(k, v)| (k.clone(), v)).collect(),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, v)| (i.to_string(), v))
            .collect(),
        _ => return,
    };

    for (key, child) in entries {
        let child_path = if path.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", path, key)
        };
        match child {
            Value::String(s) => {
                if s.is_empty() || s.starts_with('$') || !is_sensitive_key(&key) {
                    continue;
                }
                if MODE_WORDS.contains(&s.as_str()) {
                    continue;
                }
                out.push(
                    meta.diagnostic(
                        file,
                        format!(
                            "Plaintext secret at \"{}\". Use an environment variable reference instead.",
                            child_path
                        ),
                    )
                    .with_fix(format!(
                        "Replace with \"${{{}}}\" and set the env var.",
                        key.to_uppercase()
                    )),
                );
            }
            Value::Object(_) | Value::Array(_) => scan_secrets(meta, file, child, &child_path, out),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::config_source::StaticConfigSource;
    use serde_json::json;

    fn run(meta: RuleMeta, doc: Value) -> Vec<Diagnostic> {
        let source: Arc<dyn ConfigSource> =
            Arc::new(StaticConfigSource(Some(RuntimeConfig::new(doc, "clawdbot.json"))));
        let rule = rules(source)
            .into_iter()
            .find(|r| r.meta().id == meta.id)
            .unwrap();
        rule.check(&[]).unwrap()
    }

    #[test]
    fn test_config_exists() {
        let missing = check_config_exists(&CONFIG_EXISTS, &WorkspaceConfigSource, &[]).unwrap();
        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].file, "(workspace)");
        assert_eq!(missing[0].severity, Severity::Info);

        // Unparseable still counts as present
        let present = vec![FileRecord::from_content(".clawdbot/clawdbot.json", "{ broken")];
        assert!(check_config_exists(&CONFIG_EXISTS, &WorkspaceConfigSource, &present)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_config_exists_follows_injected_source() {
        assert!(run(CONFIG_EXISTS, json!({"gateway": {}})).is_empty());

        let workspace_file = vec![FileRecord::from_content("clawdbot.json", "{}")];
        let empty_source: Arc<dyn ConfigSource> = Arc::new(StaticConfigSource(None));
        let rule = rules(empty_source)
            .into_iter()
            .find(|r| r.meta().id == CONFIG_EXISTS.id)
            .unwrap();
        assert_eq!(rule.check(&workspace_file).unwrap().len(), 1);
    }

    #[test]
    fn test_no_config_means_no_findings() {
        for rule in default_rules().into_iter().skip(1) {
            assert!(rule.check(&[]).unwrap().is_empty());
        }
    }

    #[test]
    fn test_gateway_bind() {
        let d = run(GATEWAY_BIND, json!({"gateway": {"bind": "0.0.0.0"}}));
        assert_eq!(d.len(), 1);
        assert_eq!(d[0].severity, Severity::Error);
        assert!(d[0].message.contains("0.0.0.0"));
        assert!(run(GATEWAY_BIND, json!({"gateway": {"bind": "127.0.0.1"}})).is_empty());
        assert!(run(GATEWAY_BIND, json!({})).is_empty());
    }

    #[test]
    fn test_auth_mode() {
        assert_eq!(run(AUTH_MODE, json!({"gateway": {"auth": {"mode": "none"}}})).len(), 1);
        assert!(run(AUTH_MODE, json!({"gateway": {"auth": {"mode": "token"}}})).is_empty());
    }

    #[test]
    fn test_token_strength() {
        let short = run(TOKEN_STRENGTH, json!({"gateway": {"auth": {"token": "abc123"}}}));
        assert_eq!(short[0].severity, Severity::Error);

        let medium = run(TOKEN_STRENGTH, json!({"gateway": {"auth": {"token": "a".repeat(20)}}}));
        assert_eq!(medium[0].severity, Severity::Warning);

        assert!(run(TOKEN_STRENGTH, json!({"gateway": {"auth": {"token": "a".repeat(32)}}})).is_empty());
        assert!(run(
            TOKEN_STRENGTH,
            json!({"gateway": {"auth": {"mode": "password", "token": "x"}}})
        )
        .is_empty());
    }

    #[test]
    fn test_channel_policies() {
        let doc = json!({"channels": {
            "discord": {"dmPolicy": "open", "groupPolicy": "any"},
            "telegram": {"dmPolicy": "open", "allowFrom": ["42"]},
            "slack": {"dmPolicy": "pairing", "groupPolicy": "allowlist"},
            "broken": "yes"
        }});
        let dm = run(DM_POLICY, doc.clone());
        assert_eq!(dm.len(), 1);
        assert!(dm[0].message.contains("discord"));

        let group = run(GROUP_POLICY, doc);
        assert_eq!(group.len(), 1);
        assert!(group[0].message.contains("\"any\""));
    }

    #[test]
    fn test_config_secrets() {
        let doc = json!({
            "gateway": {"auth": {"mode": "token", "token": "${GATEWAY_TOKEN}"}},
            "providers": [{"apiKey": "sk-live-123"}],
            "db": {"password": "hunter2", "passwordMode": "none"}
        });
        let d = run(CONFIG_SECRETS, doc);
        let paths: Vec<&str> = d.iter().map(|d| d.message.as_str()).collect();
        assert_eq!(d.len(), 2, "{:?}", paths);
        assert!(d.iter().any(|d| d.message.contains("\"providers.0.apiKey\"")));
        assert!(d.iter().any(|d| d.message.contains("\"db.password\"")));
        assert!(d
            .iter()
            .any(|d| d.fix.as_deref() == Some("Replace with \"${PASSWORD}\" and set the env var.")));
    }
}
