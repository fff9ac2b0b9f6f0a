//! Product configuration trait for CLI binaries
//!
//! The binary implements this trait to pick its identity, the template it ships
//! with, and the external tools the bootstrap steps call into.

use crate::config::DatabaseSettings;
use std::path::{Path, PathBuf};

/// Configuration trait for a scaffolding product
pub trait ProductConfig: Clone + Send + Sync + 'static {
    /// Internal product name (used for the binary name and env vars)
    fn name(&self) -> &'static str;

    /// Human-readable display name
    fn display_name(&self) -> &'static str;

    /// Project name offered when the user just presses enter
    fn default_project_name(&self) -> &'static str;

    /// Environment variable name for overriding the template directory
    fn template_dir_env(&self) -> &'static str;

    /// Template directory used when nothing else is configured
    fn default_template_dir(&self) -> PathBuf;

    /// Package manager binary driven by the install step
    fn package_manager(&self) -> &'static str {
        "yarn"
    }

    /// Container orchestration binary driven by the database step
    fn compose_program(&self) -> &'static str {
        "docker"
    }

    /// Defaults offered by the database prompts
    fn default_database(&self, project_name: &str) -> DatabaseSettings {
        DatabaseSettings::for_project(project_name)
    }

    /// Generate the "next steps" instructions after project creation
    fn next_steps(&self, dir: &Path, subprojects: &[String]) -> Vec<String>;
}
