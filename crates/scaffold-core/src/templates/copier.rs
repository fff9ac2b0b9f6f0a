//! Recursive template tree copying

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use walkdir::WalkDir;

/// What to leave out while copying a template tree
#[derive(Debug, Clone, Default)]
pub struct CopyOptions {
    /// File name marking an otherwise-empty directory; its directory is created
    /// but the file itself is not copied
    pub placeholder: Option<String>,

    /// Literal entry names skipped at the top level of the walk only
    pub exclude: Vec<String>,
}

/// Paths (relative to the destination) touched by a copy
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CopyReport {
    pub files: Vec<PathBuf>,
    pub directories: Vec<PathBuf>,
}

/// Copy `src` into `dest`, recursing through directories.
///
/// Existing files at the destination are overwritten. Errors propagate as soon
/// as they happen, so a failure leaves whatever was already copied in place.
pub async fn copy_template(src: &Path, dest: &Path, options: &CopyOptions) -> Result<CopyReport> {
    let mut report = CopyReport::default();

    let metadata = fs::metadata(src)
        .await
        .with_context(|| format!("Failed to read template: {}", src.display()))?;
    if !metadata.is_dir() {
        copy_file(src, dest).await?;
        report.files.push(PathBuf::new());
        return Ok(report);
    }

    let walker = WalkDir::new(src)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_excluded(entry, &options.exclude));

    for entry in walker {
        let entry = entry.with_context(|| format!("Failed to walk {}", src.display()))?;
        let relative = entry
            .path()
            .strip_prefix(src)
            .with_context(|| format!("{} is outside the template", entry.path().display()))?;
        let target = dest.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)
                .await
                .with_context(|| format!("Failed to create directory: {}", target.display()))?;
            if entry.depth() > 0 {
                report.directories.push(relative.to_path_buf());
            }
            continue;
        }

        if is_placeholder(entry.file_name(), options.placeholder.as_deref()) {
            tracing::trace!(path = %relative.display(), "skipping placeholder");
            continue;
        }

        copy_file(entry.path(), &target).await?;
        report.files.push(relative.to_path_buf());
    }

    tracing::debug!(
        files = report.files.len(),
        directories = report.directories.len(),
        dest = %dest.display(),
        "copied template"
    );

    Ok(report)
}

async fn copy_file(from: &Path, to: &Path) -> Result<()> {
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    fs::copy(from, to)
        .await
        .with_context(|| format!("Failed to copy {} to {}", from.display(), to.display()))?;
    Ok(())
}

fn is_excluded(entry: &walkdir::DirEntry, exclude: &[String]) -> bool {
    entry.depth() == 1
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| exclude.iter().any(|e| e == name))
}

fn is_placeholder(name: &std::ffi::OsStr, placeholder: Option<&str>) -> bool {
    placeholder.is_some_and(|p| name == p)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs as stdfs;

    fn options() -> CopyOptions {
        CopyOptions {
            placeholder: Some(".gitkeep".to_string()),
            exclude: vec!["package.json".to_string()],
        }
    }

    fn sample_tree() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        stdfs::create_dir_all(root.join("api/src")).unwrap();
        stdfs::create_dir_all(root.join("web/src/services")).unwrap();
        stdfs::write(root.join("package.json"), "{}").unwrap();
        stdfs::write(root.join("README.md"), "# readme\n").unwrap();
        stdfs::write(root.join("api/package.json"), "{\"name\":\"api\"}").unwrap();
        stdfs::write(root.join("api/src/index.ts"), [0u8, 159, 146, 150]).unwrap();
        stdfs::write(root.join("web/src/services/.gitkeep"), "").unwrap();
        dir
    }

    #[tokio::test]
    async fn test_copies_every_file_byte_for_byte() {
        let src = sample_tree();
        let dest = tempfile::tempdir().unwrap();

        copy_template(src.path(), dest.path(), &options()).await.unwrap();

        for rel in ["README.md", "api/package.json", "api/src/index.ts"] {
            assert_eq!(
                stdfs::read(src.path().join(rel)).unwrap(),
                stdfs::read(dest.path().join(rel)).unwrap(),
                "{} differs",
                rel
            );
        }
    }

    #[tokio::test]
    async fn test_placeholder_creates_directory_without_file() {
        let src = sample_tree();
        let dest = tempfile::tempdir().unwrap();

        let report = copy_template(src.path(), dest.path(), &options()).await.unwrap();

        assert!(dest.path().join("web/src/services").is_dir());
        assert!(!dest.path().join("web/src/services/.gitkeep").exists());
        assert!(report.directories.contains(&PathBuf::from("web/src/services")));
    }

    #[tokio::test]
    async fn test_exclusion_applies_to_top_level_only() {
        let src = sample_tree();
        let dest = tempfile::tempdir().unwrap();

        let report = copy_template(src.path(), dest.path(), &options()).await.unwrap();

        assert!(!dest.path().join("package.json").exists());
        assert!(dest.path().join("api/package.json").exists());
        assert!(!report.files.contains(&PathBuf::from("package.json")));
    }

    #[tokio::test]
    async fn test_creates_missing_destination_parents() {
        let src = sample_tree();
        let dest = tempfile::tempdir().unwrap();
        let nested = dest.path().join("a/b/project");

        copy_template(src.path(), &nested, &options()).await.unwrap();

        assert!(nested.join("README.md").is_file());
    }

    #[tokio::test]
    async fn test_second_copy_overwrites_existing_files() {
        let src = sample_tree();
        let dest = tempfile::tempdir().unwrap();
        copy_template(src.path(), dest.path(), &options()).await.unwrap();

        stdfs::write(dest.path().join("README.md"), "local edits").unwrap();
        copy_template(src.path(), dest.path(), &options()).await.unwrap();

        assert_eq!(
            stdfs::read_to_string(dest.path().join("README.md")).unwrap(),
            "# readme\n"
        );
    }

    #[tokio::test]
    async fn test_single_file_source() {
        let src = sample_tree();
        let dest = tempfile::tempdir().unwrap();
        let target = dest.path().join("copy/README.md");

        copy_template(&src.path().join("README.md"), &target, &CopyOptions::default())
            .await
            .unwrap();

        assert_eq!(stdfs::read_to_string(target).unwrap(), "# readme\n");
    }

    #[tokio::test]
    async fn test_missing_source_is_an_error() {
        let dest = tempfile::tempdir().unwrap();
        let missing = dest.path().join("nope");
        assert!(copy_template(&missing, dest.path(), &options()).await.is_err());
    }
}
