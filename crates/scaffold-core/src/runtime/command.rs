//! External command execution with streamed, captured output

use super::check::{check_compose, check_package_manager, is_on_path, ToolInfo};
use crate::error::CommandError;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command as TokioCommand;
use tokio::sync::mpsc;

/// How one standard stream of the child is wired
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StdioMode {
    /// Share the parent's stream
    Inherit,
    /// Capture through a pipe (and stream to the progress callback)
    Piped,
    /// Discard / provide nothing
    Null,
}

impl StdioMode {
    fn to_stdio(self) -> Stdio {
        match self {
            StdioMode::Inherit => Stdio::inherit(),
            StdioMode::Piped => Stdio::piped(),
            StdioMode::Null => Stdio::null(),
        }
    }
}

/// Wiring for stdin, stdout, and stderr
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StdioConfig {
    pub stdin: StdioMode,
    pub stdout: StdioMode,
    pub stderr: StdioMode,
}

impl Default for StdioConfig {
    fn default() -> Self {
        Self {
            stdin: StdioMode::Null,
            stdout: StdioMode::Piped,
            stderr: StdioMode::Piped,
        }
    }
}

/// A single external command to run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
    pub stdio: StdioConfig,
    /// Substrings of stderr that mark the run as failed even on exit code 0
    pub fatal_output: Vec<String>,
}

impl Invocation {
    pub fn new<I, S>(program: impl Into<String>, args: I, cwd: impl AsRef<Path>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            cwd: cwd.as_ref().to_path_buf(),
            stdio: StdioConfig::default(),
            fatal_output: Vec::new(),
        }
    }

    pub fn stdio(mut self, stdio: StdioConfig) -> Self {
        self.stdio = stdio;
        self
    }

    pub fn fatal_output<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fatal_output = patterns.into_iter().map(Into::into).collect();
        self
    }

    /// Command line as a user would type it
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// First fatal pattern found in `text`
    fn find_fatal(&self, text: &str) -> Option<&str> {
        self.fatal_output
            .iter()
            .map(String::as_str)
            .find(|pattern| text.contains(pattern))
    }
}

/// Output of a command that completed successfully
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Runs invocations to completion. Implemented by [`CommandRunner`] and by test doubles.
#[allow(async_fn_in_trait)]
pub trait CommandExecutor {
    /// Run `invocation`, calling `on_line` for each line of piped output
    async fn run(
        &self,
        invocation: &Invocation,
        on_line: &mut dyn FnMut(&str),
    ) -> Result<CommandOutput, CommandError>;

    /// Cheap presence check used before the user has agreed to anything
    fn is_installed(&self, program: &str) -> bool {
        is_on_path(program)
    }

    /// Check the package manager version once the user has agreed to run it
    fn package_manager_info(&self, program: &str) -> ToolInfo {
        check_package_manager(program)
    }

    /// Check the compose plugin version once the user has agreed to run it
    fn compose_info(&self, program: &str) -> ToolInfo {
        check_compose(program)
    }
}

/// Spawns real processes with tokio
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandRunner;

impl CommandRunner {
    pub fn new() -> Self {
        Self
    }
}

#[derive(Debug, Clone, Copy)]
enum Stream {
    Stdout,
    Stderr,
}

impl CommandExecutor for CommandRunner {
    async fn run(
        &self,
        invocation: &Invocation,
        on_line: &mut dyn FnMut(&str),
    ) -> Result<CommandOutput, CommandError> {
        let command = invocation.display();
        tracing::debug!(%command, cwd = %invocation.cwd.display(), "spawning");

        let mut child = TokioCommand::new(&invocation.program)
            .args(&invocation.args)
            .current_dir(&invocation.cwd)
            .stdin(invocation.stdio.stdin.to_stdio())
            .stdout(invocation.stdio.stdout.to_stdio())
            .stderr(invocation.stdio.stderr.to_stdio())
            .spawn()
            .map_err(|source| CommandError::Spawn {
                command: command.clone(),
                source,
            })?;

        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut readers = Vec::new();
        if let Some(stdout) = child.stdout.take() {
            readers.push(tokio::spawn(forward_lines(stdout, Stream::Stdout, tx.clone())));
        }
        if let Some(stderr) = child.stderr.take() {
            readers.push(tokio::spawn(forward_lines(stderr, Stream::Stderr, tx.clone())));
        }
        drop(tx);

        let mut output = CommandOutput::default();
        while let Some((stream, line)) = rx.recv().await {
            on_line(&line);
            let buf = match stream {
                Stream::Stdout => &mut output.stdout,
                Stream::Stderr => &mut output.stderr,
            };
            buf.push_str(&line);
            buf.push('\n');
        }

        let io_error = |source: std::io::Error| CommandError::Io {
            command: command.clone(),
            source,
        };
        for reader in readers {
            reader
                .await
                .map_err(std::io::Error::other)
                .and_then(|read| read)
                .map_err(io_error)?;
        }
        let status = child.wait().await.map_err(io_error)?;

        tracing::debug!(%command, code = ?status.code(), "finished");

        if let Some(matched) = invocation.find_fatal(&output.stderr) {
            return Err(CommandError::Fatal {
                command,
                matched: matched.to_string(),
                stderr: output.stderr,
            });
        }
        if !status.success() {
            return Err(CommandError::Failed {
                command,
                code: status.code(),
                stderr: output.stderr,
            });
        }

        Ok(output)
    }
}

async fn forward_lines<R>(
    reader: R,
    stream: Stream,
    tx: mpsc::UnboundedSender<(Stream, String)>,
) -> std::io::Result<()>
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            return Ok(());
        }
        let line = String::from_utf8_lossy(&buf)
            .trim_end_matches(|c: char| c == '\n' || c == '\r')
            .to_string();
        if tx.send((stream, line)).is_err() {
            return Ok(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_joins_program_and_args() {
        let inv = Invocation::new("yarn", ["set", "version", "stable"], "/tmp");
        assert_eq!(inv.display(), "yarn set version stable");
        assert_eq!(inv.stdio, StdioConfig::default());
    }

    #[cfg(unix)]
    mod unix {
        use super::*;

        fn sh(script: &str) -> Invocation {
            Invocation::new("sh", ["-c", script], std::env::temp_dir())
        }

        #[tokio::test]
        async fn test_success_captures_both_streams() {
            let mut lines = Vec::new();
            let output = CommandRunner::new()
                .run(&sh("echo out; echo err >&2"), &mut |l| lines.push(l.to_string()))
                .await
                .unwrap();

            assert_eq!(output.stdout, "out\n");
            assert_eq!(output.stderr, "err\n");
            lines.sort();
            assert_eq!(lines, vec!["err", "out"]);
        }

        #[tokio::test]
        async fn test_runs_in_working_directory() {
            let dir = tempfile::tempdir().unwrap();
            std::fs::write(dir.path().join("marker"), "").unwrap();

            let inv = Invocation::new("ls", Vec::<String>::new(), dir.path());
            let output = CommandRunner::new().run(&inv, &mut |_| {}).await.unwrap();

            assert_eq!(output.stdout, "marker\n");
        }

        #[tokio::test]
        async fn test_nonzero_exit_is_failed() {
            let err = CommandRunner::new()
                .run(&sh("echo broken >&2; exit 3"), &mut |_| {})
                .await
                .unwrap_err();

            match err {
                CommandError::Failed { code, stderr, .. } => {
                    assert_eq!(code, Some(3));
                    assert_eq!(stderr, "broken\n");
                }
                other => panic!("unexpected error: {other}"),
            }
        }

        #[tokio::test]
        async fn test_fatal_output_fails_despite_zero_exit() {
            let inv = sh("echo 'Cannot connect to the Docker daemon at unix:///var/run/docker.sock' >&2")
                .fatal_output(["Cannot connect to the Docker daemon"]);

            let err = CommandRunner::new().run(&inv, &mut |_| {}).await.unwrap_err();

            assert!(matches!(err, CommandError::Fatal { ref matched, .. }
                if matched == "Cannot connect to the Docker daemon"));
        }

        #[tokio::test]
        async fn test_missing_program_is_spawn_error() {
            let inv = Invocation::new(
                "definitely-not-a-real-binary-4f1c",
                Vec::<String>::new(),
                std::env::temp_dir(),
            );
            let err = CommandRunner::new().run(&inv, &mut |_| {}).await.unwrap_err();
            assert!(matches!(err, CommandError::Spawn { .. }));
        }

        #[tokio::test]
        async fn test_null_streams_capture_nothing() {
            let inv = sh("echo hidden").stdio(StdioConfig {
                stdin: StdioMode::Null,
                stdout: StdioMode::Null,
                stderr: StdioMode::Null,
            });
            let output = CommandRunner::new().run(&inv, &mut |_| {}).await.unwrap();
            assert_eq!(output, CommandOutput::default());
        }
    }
}
