//! Workspace discovery for the lint and audit commands

use crate::config::ExcludeConfig;
use crate::models::FileRecord;
use crate::rules::RUNTIME_CONFIG_NAMES;
use anyhow::{Context, Result};
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Workspace-relative name with `/` separators
pub fn relative_name(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn is_markdown_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("md"))
}

/// Walk `root`, respecting .gitignore. Hidden directories are included so
/// `.github/` and `.clawdbot/` are found; `.git/` is never entered.
fn walk(root: &Path) -> impl Iterator<Item = PathBuf> {
    let mut builder = WalkBuilder::new(root);
    builder
        .hidden(false)
        .git_ignore(true)
        .git_global(false)
        .git_exclude(true)
        .require_git(false)
        .filter_entry(|entry| entry.file_name() != ".git");

    builder
        .build()
        .flatten()
        .filter(|entry| entry.file_type().is_some_and(|t| t.is_file()))
        .map(|entry| entry.into_path())
}

/// Read a file as text. Invalid UTF-8 is replaced rather than rejected, so
/// one stray binary file cannot abort a scan.
pub fn read_lossy(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    match String::from_utf8(bytes) {
        Ok(text) => Ok(text),
        Err(e) => {
            warn!("{} is not valid UTF-8; invalid bytes replaced", path.display());
            Ok(String::from_utf8_lossy(e.as_bytes()).into_owned())
        }
    }
}

/// Collect every markdown file and runtime config in the workspace, sorted by name
pub fn collect_workspace_files(root: &Path, exclude: &ExcludeConfig) -> Result<Vec<FileRecord>> {
    let mut files = Vec::new();

    for path in walk(root) {
        let name = relative_name(root, &path);
        if exclude.is_excluded(&name) {
            debug!("Excluded {}", name);
            continue;
        }
        if !is_markdown_path(&path) && !RUNTIME_CONFIG_NAMES.contains(&name.as_str()) {
            continue;
        }
        let content = read_lossy(&path)?;
        files.push(FileRecord::new(name, path.display().to_string(), content));
    }

    files.sort_by(|a, b| a.name.cmp(&b.name));
    debug!("Collected {} workspace files under {}", files.len(), root.display());
    Ok(files)
}

/// Skill files to audit: `target` itself, or every markdown file beneath it.
///
/// Returns `(display name, content)` pairs sorted by name. A single target
/// file is named by its file name; files found under a directory by their
/// path relative to it.
pub fn collect_skill_files(target: &Path, exclude: &ExcludeConfig) -> Result<Vec<(String, String)>> {
    if target.is_file() {
        let content = read_lossy(target)?;
        let name = target
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| target.display().to_string());
        return Ok(vec![(name, content)]);
    }

    let mut files = Vec::new();
    for path in walk(target).filter(|p| is_markdown_path(p)) {
        let name = relative_name(target, &path);
        if exclude.is_excluded(&name) {
            continue;
        }
        let content = read_lossy(&path)?;
        files.push((name, content));
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_collects_markdown_and_runtime_config() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("CLAUDE.md"), "# Role").unwrap();
        fs::write(root.join("clawdbot.json"), "{}").unwrap();
        fs::write(root.join("package.json"), "{}").unwrap();
        fs::create_dir_all(root.join(".github")).unwrap();
        fs::write(root.join(".github/copilot-instructions.md"), "# Copilot").unwrap();
        fs::create_dir_all(root.join("node_modules/pkg")).unwrap();
        fs::write(root.join("node_modules/pkg/README.md"), "# vendored").unwrap();
        fs::create_dir_all(root.join("drafts")).unwrap();
        fs::write(root.join("drafts/idea.md"), "# draft").unwrap();

        let exclude = ExcludeConfig {
            paths: vec!["drafts/".into()],
            skip_defaults: false,
        };
        let files = collect_workspace_files(root, &exclude).unwrap();
        let names: Vec<&str> = files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(
            names,
            vec![".github/copilot-instructions.md", "CLAUDE.md", "clawdbot.json"]
        );
    }

    #[test]
    fn test_skill_target_file_or_directory() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("weather")).unwrap();
        fs::write(root.join("weather/SKILL.md"), "# Weather").unwrap();
        fs::write(root.join("notes.txt"), "ignored").unwrap();

        let all = collect_skill_files(root, &ExcludeConfig::default()).unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].0, "weather/SKILL.md");

        let single = collect_skill_files(&root.join("weather/SKILL.md"), &ExcludeConfig::default()).unwrap();
        assert_eq!(single[0].0, "SKILL.md");
        assert_eq!(single[0].1, "# Weather");
    }

    #[test]
    fn test_invalid_utf8_is_read_lossily() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("CLAUDE.md"), "# Role\nYou triage issues.").unwrap();
        fs::create_dir_all(root.join("docs")).unwrap();
        fs::write(root.join("docs/legacy.md"), b"# Legacy\n\xff\xfe caf\xe9\n").unwrap();

        let files = collect_workspace_files(root, &ExcludeConfig::default()).unwrap();
        assert_eq!(files.len(), 2);
        let legacy = files.iter().find(|f| f.name == "docs/legacy.md").unwrap();
        assert_eq!(legacy.sections[0].heading, "Legacy");
        assert!(legacy.content.contains('\u{FFFD}'));

        let skills = collect_skill_files(&root.join("docs/legacy.md"), &ExcludeConfig::default()).unwrap();
        assert!(skills[0].1.starts_with("# Legacy"));
    }
}
