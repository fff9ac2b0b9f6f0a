//! Scaffold Core - project scaffolding and bootstrap library
//!
//! This library copies a bundled template tree into a new project directory,
//! renames its `package.json` manifests, and optionally bootstraps the result
//! with the package manager and docker compose.
//!
//! # Architecture
//!
//! The library is organized into layers:
//!
//! - **Layer 1: Core Operations** - Template copying, manifest rewriting, command execution
//! - **Layer 2: Workflow Orchestration** - `ProductConfig` trait and the `Bootstrap` flow
//! - **Layer 3: CLI/TUI Interface** - Optional cliclack-based prompts (feature-gated)
//!
//! # Feature Flags
//!
//! - `tui` (default): Enables the cliclack-based TUI prompts module
//!
//! # Example Usage (without TUI)
//!
//! ```ignore
//! use scaffold_core::templates;
//!
//! let done = templates::materialize(&template_root, &target_dir, "shop").await?;
//! println!("{} files copied", done.report.files.len());
//! ```

pub mod bootstrap;
pub mod config;
pub mod error;
pub mod product;
pub mod runtime;
pub mod templates;

#[cfg(feature = "tui")]
pub mod tui;

// Re-export main types for convenience
pub use bootstrap::{Bootstrap, CreateOptions, Created, Interaction, SetupOutcome};
pub use error::CommandError;
pub use product::ProductConfig;
pub use runtime::{CommandExecutor, CommandRunner, Invocation};
pub use templates::{materialize, TemplateManifest, TemplateSource};

#[cfg(feature = "tui")]
pub use tui::run;
