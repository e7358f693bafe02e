//! Runtime config provider for the `runtime` rule family
//!
//! Rules never parse the agent runtime config themselves. They ask a
//! [`ConfigSource`] for it, which lets tests inject a document directly.

use crate::models::FileRecord;
use serde_json::Value;
use tracing::{debug, warn};

/// Workspace file names recognised as the agent runtime config, in priority order
pub const RUNTIME_CONFIG_NAMES: &[&str] =
    &["clawdbot.json", "openclaw.json", ".clawdbot/clawdbot.json"];

/// A parsed runtime config document
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeConfig {
    pub document: Value,
    /// Workspace name of the file the document came from
    pub file_name: String,
}

impl RuntimeConfig {
    pub fn new(document: Value, file_name: impl Into<String>) -> Self {
        Self {
            document,
            file_name: file_name.into(),
        }
    }

    /// Dotted-path lookup into the document
    pub fn get(&self, path: &str) -> Option<&Value> {
        lookup(&self.document, path)
    }

    /// Dotted-path lookup returning only string values
    pub fn get_str(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(Value::as_str)
    }
}

/// Supplies the runtime config to rules
pub trait ConfigSource: Send + Sync {
    /// `None` when no config exists or it cannot be parsed
    fn load(&self, files: &[FileRecord]) -> Option<RuntimeConfig>;

    /// Whether a config is present, parseable or not
    fn exists(&self, files: &[FileRecord]) -> bool {
        self.load(files).is_some()
    }
}

/// Finds the runtime config among the workspace files
#[derive(Debug, Default, Clone, Copy)]
pub struct WorkspaceConfigSource;

impl WorkspaceConfigSource {
    /// The highest-priority runtime config present in the workspace
    pub fn find(files: &[FileRecord]) -> Option<&FileRecord> {
        RUNTIME_CONFIG_NAMES
            .iter()
            .find_map(|name| files.iter().find(|f| f.name == *name))
    }
}

impl ConfigSource for WorkspaceConfigSource {
    fn exists(&self, files: &[FileRecord]) -> bool {
        Self::find(files).is_some()
    }

    fn load(&self, files: &[FileRecord]) -> Option<RuntimeConfig> {
        let file = Self::find(files)?;
        match serde_json::from_str::<Value>(&file.content) {
            Ok(document) => {
                debug!("Loaded runtime config from {}", file.name);
                Some(RuntimeConfig::new(document, &file.name))
            }
            Err(e) => {
                warn!("Failed to parse runtime config {}: {}", file.name, e);
                None
            }
        }
    }
}

/// A fixed document, for callers that already hold the config
#[derive(Debug, Clone)]
pub struct StaticConfigSource(pub Option<RuntimeConfig>);

impl ConfigSource for StaticConfigSource {
    fn load(&self, _files: &[FileRecord]) -> Option<RuntimeConfig> {
        self.0.clone()
    }
}

/// Descend `value` along a dotted path.
///
/// Only objects are traversed; a missing key or a non-object intermediate
/// yields `None`.
pub fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(value, |current, segment| current.as_object()?.get(segment))
}
