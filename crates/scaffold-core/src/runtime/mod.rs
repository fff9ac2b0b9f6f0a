//! External process execution and tool detection
//!
//! This module provides:
//! - A command runner that streams and captures child output
//! - Detection of the package manager and container tooling

pub mod check;
pub mod command;

pub use check::{check_compose, check_package_manager, check_tool, is_on_path, ToolInfo};
pub use command::{
    CommandExecutor, CommandOutput, CommandRunner, Invocation, StdioConfig, StdioMode,
};
