//! Error types for external command execution

use thiserror::Error;

/// Why an external command did not complete successfully
#[derive(Error, Debug)]
pub enum CommandError {
    /// The process could not be started (binary missing, bad working directory)
    #[error("Failed to start `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The process exited with a non-zero status
    #[error("`{command}` exited with {}", exit_description(.code))]
    Failed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    /// The process printed a known fatal message to stderr
    #[error("`{command}` reported a fatal error: {matched}")]
    Fatal {
        command: String,
        matched: String,
        stderr: String,
    },

    /// Reading the process output or waiting on it failed
    #[error("I/O error while running `{command}`: {source}")]
    Io {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

impl CommandError {
    /// Captured stderr, if the process got far enough to produce any
    pub fn stderr(&self) -> Option<&str> {
        match self {
            CommandError::Failed { stderr, .. } | CommandError::Fatal { stderr, .. } => {
                Some(stderr.as_str()).filter(|s| !s.trim().is_empty())
            }
            CommandError::Spawn { .. } | CommandError::Io { .. } => None,
        }
    }
}

fn exit_description(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "no exit code (terminated by signal)".to_string(),
    }
}
