//! Charm-style CLI prompts using cliclack

use crate::bootstrap::{Bootstrap, CreateOptions, Created, Interaction};
use crate::product::ProductConfig;
use crate::runtime::CommandRunner;
use crate::templates::TemplateSource;
use anyhow::Result;
use cliclack::ProgressBar;
use std::path::PathBuf;

/// CLI arguments for the create command
#[derive(Debug, Clone, Default)]
pub struct CreateArgs {
    /// Local directory to use for the template instead of the bundled one
    pub template_dir: Option<PathBuf>,

    /// Project name (skips the prompt)
    pub name: Option<String>,

    /// Auto-confirm all prompts (non-interactive mode)
    pub yes: bool,

    /// Do not run package-manager setup
    pub skip_install: bool,

    /// Do not start the database container
    pub skip_database: bool,
}

impl From<&CreateArgs> for CreateOptions {
    fn from(args: &CreateArgs) -> Self {
        CreateOptions {
            name: args.name.clone(),
            yes: args.yes,
            skip_install: args.skip_install,
            skip_database: args.skip_database,
        }
    }
}

/// Run the CLI with interactive prompts
pub async fn run<C: ProductConfig>(config: &C, args: CreateArgs) -> Result<Created> {
    let source = TemplateSource::resolve(config, args.template_dir.as_deref());
    tracing::debug!(?source, "template source");
    let cwd = std::env::current_dir()?;

    let mut ui = ClackUi::default();
    let runner = CommandRunner::new();
    Bootstrap::new(
        config,
        &mut ui,
        &runner,
        source.path().to_path_buf(),
        cwd,
        CreateOptions::from(&args),
    )
    .run()
    .await
}

/// [`Interaction`] backed by cliclack
#[derive(Default)]
pub struct ClackUi {
    spinner: Option<ProgressBar>,
}

impl Interaction for ClackUi {
    fn intro(&mut self, title: &str) -> Result<()> {
        cliclack::intro(title)?;
        Ok(())
    }

    fn input(&mut self, prompt: &str, default: &str) -> Result<String> {
        let value: String = cliclack::input(prompt)
            .placeholder(default)
            .default_input(default)
            .interact()?;
        Ok(value)
    }

    fn password(&mut self, prompt: &str) -> Result<String> {
        let value = cliclack::password(prompt)
            .mask('▪')
            .validate(|input: &String| {
                if input.is_empty() {
                    Err("Please enter a password")
                } else {
                    Ok(())
                }
            })
            .interact()?;
        Ok(value)
    }

    fn confirm(&mut self, prompt: &str, default: bool) -> Result<bool> {
        let value = cliclack::confirm(prompt).initial_value(default).interact()?;
        Ok(value)
    }

    fn info(&mut self, message: &str) -> Result<()> {
        cliclack::log::info(message)?;
        Ok(())
    }

    fn success(&mut self, message: &str) -> Result<()> {
        cliclack::log::success(message)?;
        Ok(())
    }

    fn warning(&mut self, message: &str) -> Result<()> {
        cliclack::log::warning(message)?;
        Ok(())
    }

    fn error(&mut self, message: &str) -> Result<()> {
        cliclack::log::error(message)?;
        Ok(())
    }

    fn instructions(&mut self, title: &str, lines: &[String]) -> Result<()> {
        cliclack::note(title, lines.join("\n"))?;
        Ok(())
    }

    fn start_task(&mut self, message: &str) {
        let spinner = cliclack::spinner();
        spinner.start(message);
        self.spinner = Some(spinner);
    }

    fn task_output(&mut self, line: &str) {
        let line = line.trim();
        if line.is_empty() {
            return;
        }
        if let Some(spinner) = &self.spinner {
            spinner.set_message(truncate(line, 60));
        }
    }

    fn finish_task(&mut self, message: &str, ok: bool) {
        if let Some(spinner) = self.spinner.take() {
            if ok {
                spinner.stop(message);
            } else {
                spinner.error(message);
            }
        }
    }

    fn outro(&mut self, message: &str) -> Result<()> {
        cliclack::outro(message)?;
        Ok(())
    }
}

fn truncate(line: &str, max: usize) -> String {
    match line.char_indices().nth(max) {
        Some((idx, _)) => format!("{}…", &line[..idx]),
        None => line.to_string(),
    }
}
