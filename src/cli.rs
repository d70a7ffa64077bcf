use crate::config::{Config, DEFAULT_API_URL, DEFAULT_GIT_HOST};
use crate::controller::AutoCommitController;
use crate::git::GitWorkingCopy;
use crate::host;
use crate::log_debug;
use crate::logger;
use crate::notify::ConsoleNotifier;
use crate::prompt::{ConsolePrompter, LineReader};
use crate::remote::GitHubClient;
use crate::ui;
use anyhow::{Context, Result};
use clap::builder::{Styles, styling::AnsiColor};
use clap::{Parser, Subcommand, crate_version};
use std::path::PathBuf;
use std::sync::Arc;

const LOG_FILE: &str = "gh-autocommit-debug.log";

/// CLI structure defining the available commands and global arguments
#[derive(Parser)]
#[command(
    author,
    version = crate_version!(),
    about = "Keep a GitHub repository updated with an automatic commit every minute",
    long_about = "Prompts for a GitHub token and a repository name, creates the repository if needed, \
                  clones it into the workspace and then appends to its README, commits and pushes every minute.",
    disable_version_flag = true,
    styles = get_styles(),
)]
pub struct Cli {
    /// Subcommands available for the CLI
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Directory the repository is cloned into (as `<workspace>/<repo>`)
    #[arg(
        short = 'w',
        long = "workspace",
        global = true,
        help = "Workspace directory the repository is cloned into (default: current directory)"
    )]
    pub workspace: Option<PathBuf>,

    /// GitHub API endpoint
    #[arg(
        long = "api-url",
        global = true,
        default_value = DEFAULT_API_URL,
        help = "GitHub API endpoint (for GitHub Enterprise)"
    )]
    pub api_url: String,

    /// Host used for HTTPS clone URLs
    #[arg(
        long = "git-host",
        global = true,
        default_value = DEFAULT_GIT_HOST,
        help = "Host used for HTTPS clone URLs"
    )]
    pub git_host: String,

    /// Log debug messages to a file
    #[arg(
        short = 'l',
        long = "log",
        global = true,
        help = "Log debug messages to a file"
    )]
    pub log: bool,

    /// Specify a custom log file path
    #[arg(
        long = "log-file",
        global = true,
        help = "Specify a custom log file path"
    )]
    pub log_file: Option<String>,

    /// Suppress non-essential output
    #[arg(
        short = 'q',
        long = "quiet",
        global = true,
        help = "Suppress non-essential output"
    )]
    pub quiet: bool,

    /// Display the version
    #[arg(
        short = 'v',
        long = "version",
        global = true,
        help = "Display the version"
    )]
    pub version: bool,
}

/// Enumeration of available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Interactive shell with `start`, `stop`, `status` and `quit` (default)
    #[command(about = "Interactive shell with start/stop/status/quit commands")]
    Shell,

    /// Start right away and run until Ctrl-C
    #[command(about = "Start auto-committing right away and run until Ctrl-C")]
    Run,
}

/// Define custom styles for Clap
fn get_styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::Magenta.on_default().bold())
        .usage(AnsiColor::Cyan.on_default().bold())
        .literal(AnsiColor::Green.on_default().bold())
        .placeholder(AnsiColor::Yellow.on_default())
        .valid(AnsiColor::Blue.on_default().bold())
        .invalid(AnsiColor::Red.on_default().bold())
        .error(AnsiColor::Red.on_default().bold())
}

/// Parse the command-line arguments
pub fn parse_args() -> Cli {
    Cli::parse()
}

impl Cli {
    /// Build the runtime configuration from the parsed flags
    pub fn to_config(&self) -> Result<Config> {
        let workspace_root = match &self.workspace {
            Some(path) => path.clone(),
            None => std::env::current_dir().context("Failed to determine current directory")?,
        };

        Ok(Config::default()
            .with_workspace_root(workspace_root)
            .with_api_url(self.api_url.clone())
            .with_git_host(self.git_host.clone()))
    }
}

/// Wire the production collaborators into a controller.
///
/// `lines` is shared with the host loop so only one reader consumes stdin.
pub fn build_controller(config: Config, lines: LineReader) -> AutoCommitController {
    let remote = Arc::new(GitHubClient::new(&config));
    AutoCommitController::new(
        config,
        Arc::new(ConsolePrompter::new(lines)),
        remote,
        Arc::new(GitWorkingCopy::new()),
        Arc::new(ConsoleNotifier),
    )
}

/// Main entry point for the CLI
pub async fn main() -> Result<()> {
    let args = parse_args();

    if args.version {
        ui::print_version(crate_version!());
        return Ok(());
    }

    if args.log {
        logger::enable_logging();
        logger::set_log_to_stdout(false);
        let log_file = args.log_file.as_deref().unwrap_or(LOG_FILE);
        logger::set_log_file(log_file).context("Failed to open log file")?;
    } else {
        logger::disable_logging();
    }

    if args.quiet {
        ui::set_quiet_mode(true);
    }

    let config = args.to_config()?;
    log_debug!("Configuration: {:?}", config);
    let lines = LineReader::stdin()?;
    let controller = build_controller(config, lines.clone());

    match args.command {
        Some(Commands::Run) => host::run_until_interrupted(controller).await,
        Some(Commands::Shell) | None => host::run_interactive(controller, lines).await,
    }
}
