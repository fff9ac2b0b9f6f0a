//! Detection of the external tools the bootstrap steps call

use std::process::Command;

/// Tool detection result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInfo {
    pub name: String,
    pub version: Option<String>,
    pub available: bool,
}

impl ToolInfo {
    /// `yarn (4.1.0)` or `yarn (not installed)`
    pub fn describe(&self) -> String {
        match (&self.version, self.available) {
            (Some(version), true) => format!("{} ({})", self.name, version),
            (None, true) => format!("{} (unknown version)", self.name),
            (_, false) => format!("{} (not installed)", self.name),
        }
    }
}

/// Run `<program> <args>` and report whether it succeeded, with its first line of output
pub fn check_tool(display_name: &str, program: &str, args: &[&str]) -> ToolInfo {
    let output = Command::new(program).args(args).output();

    match output {
        Ok(out) if out.status.success() => {
            let version = String::from_utf8_lossy(&out.stdout)
                .lines()
                .next()
                .map(|line| line.trim().to_string())
                .filter(|line| !line.is_empty());
            ToolInfo {
                name: display_name.to_string(),
                version,
                available: true,
            }
        }
        _ => ToolInfo {
            name: display_name.to_string(),
            version: None,
            available: false,
        },
    }
}

/// Whether `program` resolves on PATH (or as a path), without starting it
pub fn is_on_path(program: &str) -> bool {
    which::which(program).is_ok()
}

/// Check the package manager with `<program> --version`
pub fn check_package_manager(program: &str) -> ToolInfo {
    check_tool(program, program, &["--version"])
}

/// Check the compose plugin with `<program> compose version --short`
pub fn check_compose(program: &str) -> ToolInfo {
    check_tool(
        &format!("{} compose", program),
        program,
        &["compose", "version", "--short"],
    )
}
