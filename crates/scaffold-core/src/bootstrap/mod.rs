//! The create flow: name, copy, package-manager setup, database setup
//!
//! The flow is strictly sequential. Each stage finishes before the next one
//! starts, and only the first two stages (and mandatory install commands)
//! can stop the run; the database stage always degrades to printed
//! instructions.

pub mod steps;

use crate::config::{write_env_file, DatabaseSettings};
use crate::product::ProductConfig;
use crate::runtime::{CommandExecutor, Invocation};
use crate::templates::{self, rewriter};
use anyhow::Result;
use std::path::{Path, PathBuf};

/// Everything the flow needs from the terminal.
///
/// Prompt methods return an error when the user cancels.
pub trait Interaction {
    fn intro(&mut self, title: &str) -> Result<()>;
    fn input(&mut self, prompt: &str, default: &str) -> Result<String>;
    fn password(&mut self, prompt: &str) -> Result<String>;
    fn confirm(&mut self, prompt: &str, default: bool) -> Result<bool>;

    fn info(&mut self, message: &str) -> Result<()>;
    fn success(&mut self, message: &str) -> Result<()>;
    fn warning(&mut self, message: &str) -> Result<()>;
    fn error(&mut self, message: &str) -> Result<()>;

    /// Show commands the user can run by hand
    fn instructions(&mut self, title: &str, lines: &[String]) -> Result<()>;

    /// Progress indicator around a long-running task
    fn start_task(&mut self, message: &str);
    fn task_output(&mut self, line: &str);
    fn finish_task(&mut self, message: &str, ok: bool);

    fn outro(&mut self, message: &str) -> Result<()>;
}

/// Stages of the create flow, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    CollectName,
    Materialize,
    OfferPackageManagerSetup,
    OfferDatabaseSetup,
    Done,
}

/// How an optional setup stage ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupOutcome {
    Completed,
    Declined,
    /// Failed; the manual instructions were shown instead
    FellBack,
}

/// Answers supplied up front instead of prompting
#[derive(Debug, Clone, Default)]
pub struct CreateOptions {
    /// Project directory / name
    pub name: Option<String>,
    /// Accept every default without asking
    pub yes: bool,
    /// Decline package-manager setup
    pub skip_install: bool,
    /// Decline database setup
    pub skip_database: bool,
}

/// Result of a completed run
#[derive(Debug, Clone)]
pub struct Created {
    pub project_name: String,
    pub project_dir: PathBuf,
    pub subprojects: Vec<String>,
    pub install: SetupOutcome,
    pub database: SetupOutcome,
}

/// Drives the create flow against a terminal and a command executor
pub struct Bootstrap<'a, C, U, E> {
    config: &'a C,
    ui: &'a mut U,
    executor: &'a E,
    template_root: PathBuf,
    cwd: PathBuf,
    options: CreateOptions,
}

impl<'a, C, U, E> Bootstrap<'a, C, U, E>
where
    C: ProductConfig,
    U: Interaction,
    E: CommandExecutor,
{
    pub fn new(
        config: &'a C,
        ui: &'a mut U,
        executor: &'a E,
        template_root: PathBuf,
        cwd: PathBuf,
        options: CreateOptions,
    ) -> Self {
        Self {
            config,
            ui,
            executor,
            template_root,
            cwd,
            options,
        }
    }

    pub async fn run(mut self) -> Result<Created> {
        self.ui.intro(self.config.display_name())?;

        enter(Stage::CollectName);
        let (project_name, project_dir) = self.collect_name()?;

        enter(Stage::Materialize);
        let subprojects = self.materialize(&project_name, &project_dir).await?;

        enter(Stage::OfferPackageManagerSetup);
        let install = self.offer_package_manager(&project_dir, &subprojects).await?;

        enter(Stage::OfferDatabaseSetup);
        let database = self.offer_database(&project_name, &project_dir).await?;

        enter(Stage::Done);
        self.print_next_steps(&project_dir, &subprojects)?;

        Ok(Created {
            project_name,
            project_dir,
            subprojects,
            install,
            database,
        })
    }

    fn collect_name(&mut self) -> Result<(String, PathBuf)> {
        let input = match &self.options.name {
            Some(name) => name.clone(),
            None if self.options.yes => self.config.default_project_name().to_string(),
            None => self
                .ui
                .input("Project name:", self.config.default_project_name())?,
        };

        let input = input.trim();
        let project_dir = if rewriter::is_current_dir(input) {
            self.cwd.clone()
        } else {
            self.cwd.join(input)
        };
        let project_name = rewriter::project_name(input, &self.cwd);
        tracing::debug!(%project_name, dir = %project_dir.display(), "project selected");

        Ok((project_name, project_dir))
    }

    async fn materialize(
        &mut self,
        project_name: &str,
        project_dir: &Path,
    ) -> Result<Vec<String>> {
        self.ui.start_task("Creating project...");

        match templates::materialize(&self.template_root, project_dir, project_name).await {
            Ok(done) => {
                self.ui.finish_task(
                    &format!(
                        "Created {} files in {}",
                        done.report.files.len() + done.rewritten.len(),
                        project_dir.display()
                    ),
                    true,
                );
                for warning in &done.warnings {
                    self.ui.warning(warning)?;
                }
                Ok(done.manifest.subprojects)
            }
            Err(e) => {
                self.ui.finish_task("Failed to create project", false);
                Err(e)
            }
        }
    }

    async fn offer_package_manager(
        &mut self,
        project_dir: &Path,
        subprojects: &[String],
    ) -> Result<SetupOutcome> {
        let program = self.config.package_manager();
        if subprojects.is_empty() {
            return Ok(SetupOutcome::Declined);
        }

        let accepted = if self.options.skip_install {
            false
        } else if self.options.yes {
            true
        } else {
            let found = self.executor.is_installed(program);
            if !found {
                self.ui.warning(&format!("{} was not found on PATH", program))?;
            }
            self.ui.confirm(
                &format!("Set up {} in {}?", program, subprojects.join(", ")),
                found,
            )?
        };

        let lines = steps::manual_package_manager(program, project_dir, subprojects, &self.cwd);
        if !accepted {
            self.ui.instructions("Install dependencies", &lines)?;
            return Ok(SetupOutcome::Declined);
        }

        let tool = self.executor.package_manager_info(program);
        if !tool.available {
            self.ui.warning(&format!("Cannot run {}", tool.describe()))?;
            self.ui.instructions("Install dependencies", &lines)?;
            return Ok(SetupOutcome::FellBack);
        }
        self.ui.info(&format!("Using {}", tool.describe()))?;

        for step in steps::package_manager_plan(program, project_dir, subprojects) {
            let label = format!("{}: {}", step.subproject, step.invocation.display());
            match self.execute(&label, &step.invocation).await? {
                Ok(()) => {}
                Err(message) if step.optional => {
                    self.ui
                        .warning(&format!("Skipped optional step ({})", message))?;
                }
                Err(message) => {
                    anyhow::bail!("{} failed: {}", label, message);
                }
            }
        }

        self.ui.success("Dependencies installed")?;
        Ok(SetupOutcome::Completed)
    }

    async fn offer_database(
        &mut self,
        project_name: &str,
        project_dir: &Path,
    ) -> Result<SetupOutcome> {
        let program = self.config.compose_program();

        let accepted = if self.options.skip_database {
            false
        } else if self.options.yes {
            true
        } else {
            let found = self.executor.is_installed(program);
            self.ui.confirm(
                &format!("Start a development database with {} compose?", program),
                found,
            )?
        };

        if !accepted {
            let lines = steps::manual_database(program, project_dir, &self.cwd, false);
            self.ui.instructions("Start the database", &lines)?;
            return Ok(SetupOutcome::Declined);
        }

        let tool = self.executor.compose_info(program);
        if !tool.available {
            self.ui.warning(&format!("Cannot run {}", tool.describe()))?;
            return self.database_fallback(project_dir, false);
        }
        self.ui.info(&format!("Using {}", tool.describe()))?;

        let settings = self.database_settings(project_name)?;
        let env_path = match write_env_file(project_dir, &settings).await {
            Ok(path) => path,
            Err(e) => {
                self.ui.error(&format!("{:#}", e))?;
                return self.database_fallback(project_dir, false);
            }
        };
        self.ui
            .info(&format!("Wrote {}", steps::display_dir(&env_path, &self.cwd).display()))?;

        let invocation = steps::compose_up(program, project_dir);
        match self.execute("Starting database container", &invocation).await? {
            Ok(()) => {
                self.ui.success(&format!(
                    "Database container '{}' is up",
                    settings.container_name
                ))?;
                Ok(SetupOutcome::Completed)
            }
            Err(_) => self.database_fallback(project_dir, true),
        }
    }

    fn database_fallback(
        &mut self,
        project_dir: &Path,
        env_written: bool,
    ) -> Result<SetupOutcome> {
        let lines = steps::manual_database(
            self.config.compose_program(),
            project_dir,
            &self.cwd,
            env_written,
        );
        self.ui.instructions("Start the database manually", &lines)?;
        Ok(SetupOutcome::FellBack)
    }

    fn database_settings(&mut self, project_name: &str) -> Result<DatabaseSettings> {
        let mut settings = self.config.default_database(project_name);
        if self.options.yes {
            return Ok(settings);
        }

        settings.container_name = self
            .ui
            .input("Container name:", &settings.container_name)?;
        settings.database = self.ui.input("Database name:", &settings.database)?;
        settings.user = self.ui.input("Database user:", &settings.user)?;
        settings.password = self.ui.password("Database password:")?;
        Ok(settings)
    }

    /// Run one command behind the progress indicator. On failure the error
    /// (and captured stderr) is shown and its message returned in the inner
    /// result; the outer one carries terminal errors.
    async fn execute(
        &mut self,
        label: &str,
        invocation: &Invocation,
    ) -> Result<Result<(), String>> {
        self.ui.start_task(label);
        let ui = &mut *self.ui;
        let result = self
            .executor
            .run(invocation, &mut |line| ui.task_output(line))
            .await;

        match result {
            Ok(_) => {
                self.ui.finish_task(label, true);
                Ok(Ok(()))
            }
            Err(e) => {
                self.ui.finish_task(label, false);
                let message = e.to_string();
                let shown = match e.stderr() {
                    Some(stderr) => format!("{}\n{}", message, stderr.trim_end()),
                    None => message.clone(),
                };
                self.ui.error(&shown)?;
                Ok(Err(message))
            }
        }
    }

    fn print_next_steps(&mut self, project_dir: &Path, subprojects: &[String]) -> Result<()> {
        let steps = self.config.next_steps(project_dir, subprojects);
        if !steps.is_empty() {
            self.ui.instructions("Next steps", &steps)?;
        }
        self.ui.outro("Happy coding!")
    }
}

fn enter(stage: Stage) {
    tracing::debug!(?stage, "entering stage");
}
