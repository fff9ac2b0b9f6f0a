//! Template loading, copying, and manifest rewriting
//!
//! This module provides:
//! - The template manifest (`template.yaml`) types
//! - Recursive copying of the template tree into a project directory
//! - `package.json` rewriting with the project name and pinned versions
//! - Validation of the pinned version table

pub mod copier;
pub mod manifest;
pub mod rewriter;
pub mod version;

use crate::product::ProductConfig;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

pub use copier::{copy_template, CopyOptions, CopyReport};
pub use manifest::{PackageManifest, TemplateManifest, TEMPLATE_MANIFEST};
pub use rewriter::{project_name, rewrite_manifest, VersionPins};
pub use version::validate_pins;

/// Where the template tree comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSource {
    /// `--template-dir` on the command line
    Flag(PathBuf),
    /// The product's override environment variable
    Env(PathBuf),
    /// A `template/` directory shipped next to the executable
    Bundled(PathBuf),
    /// Compiled-in default
    Default(PathBuf),
}

impl TemplateSource {
    /// Resolve the template root: flag, then env var, then next to the
    /// executable, then the product default
    pub fn resolve<C: ProductConfig>(config: &C, flag: Option<&Path>) -> Self {
        if let Some(path) = flag {
            return Self::Flag(path.to_path_buf());
        }
        if let Some(path) = std::env::var_os(config.template_dir_env()) {
            return Self::Env(PathBuf::from(path));
        }
        if let Some(path) = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(|dir| dir.join("template")))
            .filter(|path| path.join(TEMPLATE_MANIFEST).is_file())
        {
            return Self::Bundled(path);
        }
        Self::Default(config.default_template_dir())
    }

    pub fn path(&self) -> &Path {
        match self {
            Self::Flag(p) | Self::Env(p) | Self::Bundled(p) | Self::Default(p) => p,
        }
    }
}

/// Result of copying a template into a project directory
#[derive(Debug, Clone)]
pub struct Materialized {
    pub manifest: TemplateManifest,
    pub report: CopyReport,
    /// Rewritten manifests, relative to the project directory
    pub rewritten: Vec<PathBuf>,
    /// Problems with the pin table that did not stop the run
    pub warnings: Vec<String>,
}

/// Copy the template at `template_root` into `target_dir` and rewrite its
/// package manifests for `project_name`
pub async fn materialize(
    template_root: &Path,
    target_dir: &Path,
    project_name: &str,
) -> Result<Materialized> {
    let manifest = TemplateManifest::load(template_root).await?;
    let warnings = validate_pins(&manifest.pinned_versions);

    let options = CopyOptions {
        placeholder: Some(manifest.placeholder.clone()),
        exclude: manifest.copy_exclusions(),
    };
    let report = copy_template(template_root, target_dir, &options)
        .await
        .with_context(|| format!("Failed to copy template into {}", target_dir.display()))?;

    let pins = VersionPins {
        versions: &manifest.pinned_versions,
        sections: &manifest.pinned_sections,
    };
    let mut rewritten = Vec::with_capacity(manifest.manifests.len());
    for package in &manifest.manifests {
        let relative = PathBuf::from(&package.path);
        rewrite_manifest(
            &template_root.join(&relative),
            &target_dir.join(&relative),
            &package.package_name(project_name),
            &pins,
        )
        .await?;
        rewritten.push(relative);
    }

    Ok(Materialized {
        manifest,
        report,
        rewritten,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn sample_template() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(
            root,
            "template.yaml",
            "name: sample\n\
             manifests:\n\
             \x20 - path: package.json\n\
             \x20 - path: api/package.json\n\
             \x20   suffix: -api\n\
             subprojects: [api]\n\
             pinned_versions:\n\
             \x20 typescript: 5.4.5\n\
             \x20 broken: latest\n",
        );
        write(root, "package.json", r#"{"name":"root","workspaces":["api"]}"#);
        write(
            root,
            "api/package.json",
            r#"{"name":"api","devDependencies":{"typescript":"*"}}"#,
        );
        write(root, "api/src/main.ts", "console.log('hi');\n");
        write(root, "api/src/routes/.gitkeep", "");
        dir
    }

    #[tokio::test]
    async fn test_materialize_copies_and_rewrites() {
        let template = sample_template();
        let target = tempfile::tempdir().unwrap();
        let project = target.path().join("shop");

        let result = materialize(template.path(), &project, "shop").await.unwrap();

        assert!(!project.join("template.yaml").exists());
        assert!(project.join("api/src/routes").is_dir());
        assert!(!project.join("api/src/routes/.gitkeep").exists());
        assert_eq!(
            fs::read_to_string(project.join("api/src/main.ts")).unwrap(),
            "console.log('hi');\n"
        );

        let root: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(project.join("package.json")).unwrap())
                .unwrap();
        assert_eq!(root["name"], "shop");
        let api: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(project.join("api/package.json")).unwrap())
                .unwrap();
        assert_eq!(api["name"], "shop-api");
        assert_eq!(api["devDependencies"]["typescript"], "5.4.5");

        assert_eq!(result.rewritten.len(), 2);
        assert_eq!(result.warnings.len(), 1);
    }

    #[tokio::test]
    async fn test_materialize_aborts_on_malformed_manifest() {
        let template = sample_template();
        write(template.path(), "api/package.json", "{ oops");
        let target = tempfile::tempdir().unwrap();

        let err = materialize(template.path(), target.path(), "shop")
            .await
            .unwrap_err();
        assert!(format!("{:#}", err).contains("api/package.json"));
    }

    #[test]
    fn test_flag_wins_over_everything() {
        #[derive(Clone)]
        struct Fixed;
        impl ProductConfig for Fixed {
            fn name(&self) -> &'static str {
                "fixed"
            }
            fn display_name(&self) -> &'static str {
                "Fixed"
            }
            fn default_project_name(&self) -> &'static str {
                "app"
            }
            fn template_dir_env(&self) -> &'static str {
                "SCAFFOLD_CORE_TEST_TEMPLATE_DIR_UNSET"
            }
            fn default_template_dir(&self) -> PathBuf {
                PathBuf::from("/default/template")
            }
            fn next_steps(&self, _dir: &Path, _subprojects: &[String]) -> Vec<String> {
                Vec::new()
            }
        }

        let flag = PathBuf::from("/from/flag");
        assert_eq!(
            TemplateSource::resolve(&Fixed, Some(&flag)),
            TemplateSource::Flag(flag.clone())
        );
        assert_eq!(
            TemplateSource::resolve(&Fixed, None).path(),
            Path::new("/default/template")
        );
    }
}
