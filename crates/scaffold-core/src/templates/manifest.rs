//! Template manifest types and parsing

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// File name of the manifest at the root of a template tree
pub const TEMPLATE_MANIFEST: &str = "template.yaml";

fn default_placeholder() -> String {
    ".gitkeep".to_string()
}

fn default_pinned_sections() -> Vec<String> {
    vec!["dependencies".to_string(), "devDependencies".to_string()]
}

/// A package manifest inside the template that gets renamed for the new project
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PackageManifest {
    /// Path relative to the template root (e.g. `api/package.json`)
    pub path: String,

    /// Appended to the project name (e.g. `-api`)
    #[serde(default)]
    pub suffix: Option<String>,
}

impl PackageManifest {
    /// Package name for this manifest in a project called `project_name`
    pub fn package_name(&self, project_name: &str) -> String {
        match &self.suffix {
            Some(suffix) => format!("{}{}", project_name, suffix),
            None => project_name.to_string(),
        }
    }

    /// True when the manifest sits at the template root
    pub fn is_top_level(&self) -> bool {
        !self.path.contains('/')
    }
}

/// Template manifest (template/template.yaml)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateManifest {
    /// Display name of the template
    pub name: String,

    /// Description of what the template provides
    #[serde(default)]
    pub description: String,

    /// Marker file that keeps empty directories in version control; never copied
    #[serde(default = "default_placeholder")]
    pub placeholder: String,

    /// Package manifests to rewrite after copying
    pub manifests: Vec<PackageManifest>,

    /// Sub-project directories that get package-manager setup, in order
    #[serde(default)]
    pub subprojects: Vec<String>,

    /// Dependency name -> version written into every manifest that lists it
    #[serde(default)]
    pub pinned_versions: BTreeMap<String, String>,

    /// Manifest sections the pinned versions apply to
    #[serde(default = "default_pinned_sections")]
    pub pinned_sections: Vec<String>,
}

impl TemplateManifest {
    /// Read and parse `<template_root>/template.yaml`
    pub async fn load(template_root: &Path) -> Result<Self> {
        let path = template_root.join(TEMPLATE_MANIFEST);
        let content = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let manifest: TemplateManifest = serde_yaml::from_str(content)?;
        if manifest.manifests.is_empty() {
            anyhow::bail!("template manifest lists no package manifests");
        }
        Ok(manifest)
    }

    /// Top-level entries the copier must leave out: the template manifest itself
    /// and every root-level package manifest (those are written by the rewriter)
    pub fn copy_exclusions(&self) -> Vec<String> {
        let mut excluded = vec![TEMPLATE_MANIFEST.to_string()];
        excluded.extend(
            self.manifests
                .iter()
                .filter(|m| m.is_top_level())
                .map(|m| m.path.clone()),
        );
        excluded
    }
}
