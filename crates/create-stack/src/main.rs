//! create-stack - scaffold an api + web project and bootstrap it

use anyhow::Result;
use clap::Parser;
use scaffold_core::tui::CreateArgs;
use scaffold_core::ProductConfig;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// create-stack product configuration
#[derive(Clone)]
pub struct StackConfig;

impl ProductConfig for StackConfig {
    fn name(&self) -> &'static str {
        "create-stack"
    }

    fn display_name(&self) -> &'static str {
        "create-stack"
    }

    fn default_project_name(&self) -> &'static str {
        "my-stack"
    }

    fn template_dir_env(&self) -> &'static str {
        "CREATE_STACK_TEMPLATE_DIR"
    }

    fn default_template_dir(&self) -> PathBuf {
        PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/../../template"))
    }

    fn next_steps(&self, dir: &Path, subprojects: &[String]) -> Vec<String> {
        let mut steps = Vec::new();
        let current = std::env::current_dir().ok();

        if current.as_deref() != Some(dir) {
            steps.push(format!("cd {}", dir.display()));
        }
        for sub in subprojects {
            steps.push(format!("(cd {} && {} dev)", sub, self.package_manager()));
        }
        steps
    }
}

#[derive(Parser, Debug)]
#[command(name = "create-stack")]
#[command(about = "Scaffold an api + web project, then optionally install it and start its database")]
#[command(version)]
pub struct Args {
    /// Project name / directory (prompted when omitted; `.` uses the current directory)
    #[arg(short, long)]
    pub name: Option<String>,

    /// Local directory to use for the template instead of the bundled one
    #[arg(long = "template-dir")]
    pub template_dir: Option<PathBuf>,

    /// Auto-confirm all prompts (non-interactive mode)
    #[arg(short, long)]
    pub yes: bool,

    /// Skip package-manager setup and print the commands instead
    #[arg(long = "skip-install")]
    pub skip_install: bool,

    /// Skip the database container and print the commands instead
    #[arg(long = "skip-database")]
    pub skip_database: bool,

    /// Increase diagnostic output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl From<Args> for CreateArgs {
    fn from(args: Args) -> Self {
        CreateArgs {
            template_dir: args.template_dir,
            name: args.name,
            yes: args.yes,
            skip_install: args.skip_install,
            skip_database: args.skip_database,
        }
    }
}

/// Diagnostics go to stderr and stay quiet unless asked for; `RUST_LOG` wins.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Ensure terminal cursor is restored on panic
    let default_panic = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = console::Term::stderr().show_cursor();
        default_panic(info);
    }));

    // Handle Ctrl+C outside of prompts (e.g. while a command is running)
    ctrlc::set_handler(move || {
        let _ = console::Term::stderr().show_cursor();
        std::process::exit(130);
    })
    .ok();

    let args = Args::parse();
    init_tracing(args.verbose);

    let result = scaffold_core::run(&StackConfig, args.into()).await;

    // Ensure cursor is visible on normal exit
    let _ = console::Term::stderr().show_cursor();

    result.map(|_| ())
}
