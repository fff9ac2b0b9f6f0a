//! Bootstrap command sequences and their manual equivalents

use crate::config::ENV_FILE_NAME;
use crate::runtime::Invocation;
use std::path::{Path, PathBuf};

/// stderr fragments that mean compose could not do anything useful
pub const COMPOSE_FATAL_OUTPUT: &[&str] = &[
    "Cannot connect to the Docker daemon",
    "error during connect",
    "command not found",
    "is not recognized as an internal or external command",
    "no configuration file provided",
];

/// One package-manager command run inside each sub-project
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackageManagerStep {
    pub args: &'static [&'static str],
    /// Failure is reported and skipped instead of stopping the run
    pub optional: bool,
}

/// Run in order for every sub-project
pub const PACKAGE_MANAGER_STEPS: &[PackageManagerStep] = &[
    PackageManagerStep {
        args: &["set", "version", "stable"],
        optional: false,
    },
    PackageManagerStep {
        args: &["install"],
        optional: false,
    },
    PackageManagerStep {
        args: &["dlx", "@yarnpkg/sdks", "vscode"],
        optional: true,
    },
];

/// A step bound to a concrete sub-project directory
#[derive(Debug, Clone)]
pub struct PlannedStep {
    pub subproject: String,
    pub invocation: Invocation,
    pub optional: bool,
}

/// Every package-manager invocation, sub-project by sub-project
pub fn package_manager_plan(
    program: &str,
    project_dir: &Path,
    subprojects: &[String],
) -> Vec<PlannedStep> {
    subprojects
        .iter()
        .flat_map(|sub| {
            let cwd = project_dir.join(sub);
            PACKAGE_MANAGER_STEPS.iter().map(move |step| PlannedStep {
                subproject: sub.clone(),
                invocation: Invocation::new(program, step.args.iter().copied(), &cwd),
                optional: step.optional,
            })
        })
        .collect()
}

/// `docker compose up -d` in the project root
pub fn compose_up(program: &str, project_dir: &Path) -> Invocation {
    Invocation::new(program, ["compose", "up", "-d"], project_dir)
        .fatal_output(COMPOSE_FATAL_OUTPUT.iter().copied())
}

/// Shell lines equivalent to the package-manager setup
pub fn manual_package_manager(
    program: &str,
    project_dir: &Path,
    subprojects: &[String],
    cwd: &Path,
) -> Vec<String> {
    let mut lines = Vec::new();
    for sub in subprojects {
        lines.push(format!(
            "cd {}",
            display_dir(&project_dir.join(sub), cwd).display()
        ));
        for step in PACKAGE_MANAGER_STEPS {
            lines.push(format!("{} {}", program, step.args.join(" ")));
        }
        lines.push("cd -".to_string());
    }
    lines
}

/// Shell lines (and one reminder) equivalent to the database setup
pub fn manual_database(
    program: &str,
    project_dir: &Path,
    cwd: &Path,
    env_written: bool,
) -> Vec<String> {
    let mut lines = Vec::new();
    let dir = display_dir(project_dir, cwd);
    if dir != Path::new(".") {
        lines.push(format!("cd {}", dir.display()));
    }
    if !env_written {
        lines.push(format!(
            "# create {} with DB_HOST, DB_PORT, DB_USER, DB_PASSWORD, DB_CONTAINER_NAME, DB_DATABASE",
            ENV_FILE_NAME
        ));
    }
    lines.push(format!("{} compose up -d", program));
    lines
}

/// `dir` relative to `cwd` when it lives below it, `.` when they are the same
pub fn display_dir(dir: &Path, cwd: &Path) -> PathBuf {
    match dir.strip_prefix(cwd) {
        Ok(rel) if rel.as_os_str().is_empty() => PathBuf::from("."),
        Ok(rel) => rel.to_path_buf(),
        Err(_) => dir.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subs() -> Vec<String> {
        vec!["api".to_string(), "web".to_string()]
    }

    #[test]
    fn test_plan_orders_subprojects_then_steps() {
        let plan = package_manager_plan("yarn", Path::new("/work/shop"), &subs());
        let rendered: Vec<_> = plan
            .iter()
            .map(|s| format!("{}: {}", s.invocation.cwd.display(), s.invocation.display()))
            .collect();
        assert_eq!(
            rendered,
            vec![
                "/work/shop/api: yarn set version stable",
                "/work/shop/api: yarn install",
                "/work/shop/api: yarn dlx @yarnpkg/sdks vscode",
                "/work/shop/web: yarn set version stable",
                "/work/shop/web: yarn install",
                "/work/shop/web: yarn dlx @yarnpkg/sdks vscode",
            ]
        );
        assert_eq!(plan.iter().filter(|s| s.optional).count(), 2);
    }

    #[test]
    fn test_manual_package_manager_text() {
        let lines = manual_package_manager(
            "yarn",
            Path::new("/work/shop"),
            &subs()[..1],
            Path::new("/work"),
        );
        assert_eq!(
            lines,
            vec![
                "cd shop/api",
                "yarn set version stable",
                "yarn install",
                "yarn dlx @yarnpkg/sdks vscode",
                "cd -",
            ]
        );
    }

    #[test]
    fn test_manual_database_text() {
        let lines = manual_database("docker", Path::new("/work/shop"), Path::new("/work"), true);
        assert_eq!(lines, vec!["cd shop", "docker compose up -d"]);

        let lines = manual_database("docker", Path::new("/work"), Path::new("/work"), false);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("# create .env"));
    }

    #[test]
    fn test_display_dir_outside_cwd_stays_absolute() {
        assert_eq!(
            display_dir(Path::new("/srv/shop"), Path::new("/work")),
            PathBuf::from("/srv/shop")
        );
    }

    #[test]
    fn test_compose_up_carries_fatal_patterns() {
        let inv = compose_up("docker", Path::new("/work/shop"));
        assert_eq!(inv.display(), "docker compose up -d");
        assert!(inv
            .fatal_output
            .iter()
            .any(|p| p == "Cannot connect to the Docker daemon"));
    }
}
