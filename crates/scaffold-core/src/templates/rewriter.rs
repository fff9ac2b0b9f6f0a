//! `package.json` rewriting: project name and pinned dependency versions

use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::{Component, Path};

static NO_PINS: BTreeMap<String, String> = BTreeMap::new();

/// Version pins and the manifest sections they apply to
#[derive(Debug, Clone, Copy)]
pub struct VersionPins<'a> {
    pub versions: &'a BTreeMap<String, String>,
    pub sections: &'a [String],
}

impl Default for VersionPins<'_> {
    fn default() -> Self {
        Self {
            versions: &NO_PINS,
            sections: &[],
        }
    }
}

/// Name for a project given the user's directory input.
///
/// Input that resolves to the current directory (`.`, `./`, empty) takes the
/// base name of `cwd` instead.
pub fn project_name(input: &str, cwd: &Path) -> String {
    let trimmed = input.trim();
    if is_current_dir(trimmed) {
        return cwd
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| trimmed.to_string());
    }
    trimmed.to_string()
}

/// True when `input` names the current directory
pub fn is_current_dir(input: &str) -> bool {
    Path::new(input)
        .components()
        .all(|c| matches!(c, Component::CurDir))
}

/// Set `name` and apply `pins` to a parsed manifest.
///
/// Only entries already present in a pinned section are changed; nothing is added.
pub fn apply(manifest: &mut Map<String, Value>, name: &str, pins: &VersionPins<'_>) -> usize {
    manifest.insert("name".to_string(), Value::String(name.to_string()));

    let mut pinned = 0;
    for section in pins.sections {
        let Some(Value::Object(deps)) = manifest.get_mut(section) else {
            continue;
        };
        for (dep, version) in deps.iter_mut() {
            if let Some(pin) = pins.versions.get(dep) {
                *version = Value::String(pin.clone());
                pinned += 1;
            }
        }
    }
    pinned
}

/// Parse, rewrite, and serialise manifest text
pub fn rewrite_str(content: &str, name: &str, pins: &VersionPins<'_>) -> Result<String> {
    let value: Value = serde_json::from_str(content).context("Invalid JSON")?;
    let Value::Object(mut manifest) = value else {
        anyhow::bail!("Manifest is not a JSON object");
    };

    apply(&mut manifest, name, pins);

    let mut out = serde_json::to_string_pretty(&Value::Object(manifest))?;
    out.push('\n');
    Ok(out)
}

/// Read the manifest at `src`, rewrite it, and write the result to `dest`
pub async fn rewrite_manifest(
    src: &Path,
    dest: &Path,
    name: &str,
    pins: &VersionPins<'_>,
) -> Result<()> {
    let content = tokio::fs::read_to_string(src)
        .await
        .with_context(|| format!("Failed to read {}", src.display()))?;
    let rewritten = rewrite_str(&content, name, pins)
        .with_context(|| format!("Failed to rewrite {}", src.display()))?;

    if let Some(parent) = dest.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    tokio::fs::write(dest, rewritten)
        .await
        .with_context(|| format!("Failed to write {}", dest.display()))?;

    tracing::debug!(manifest = %dest.display(), name, "rewrote manifest");
    Ok(())
}
