//! Terminal host for the controller
//!
//! Registers the `start` and `stop` commands in a small command loop.
//! Leaving the loop (`quit`, end of input, Ctrl-C) deactivates the
//! controller first. Input comes from a [`LineReader`] thread, so nothing
//! keeps the process alive once the loop has returned.

use anyhow::{Context, Result};
use std::future::Future;
use std::str::FromStr;

use crate::controller::{AutoCommitController, ControllerStatus};
use crate::prompt::LineReader;
use crate::ui;
use crate::{log_debug, log_info};

/// Commands understood by the interactive host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostCommand {
    Start,
    Stop,
    Status,
    Help,
    Quit,
}

impl FromStr for HostCommand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "start" => Ok(Self::Start),
            "stop" => Ok(Self::Stop),
            "status" => Ok(Self::Status),
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" | "q" => Ok(Self::Quit),
            other => Err(format!("Unknown command '{other}'. Type 'help' for a list.")),
        }
    }
}

/// Outcome of dispatching one command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Executes a single host command against the controller.
///
/// Controller errors have already been reported through its notifier, so
/// they never end the loop.
pub async fn dispatch(controller: &mut AutoCommitController, command: HostCommand) -> Flow {
    log_debug!("Host command: {:?}", command);
    match command {
        HostCommand::Start => {
            let _ = controller.start().await;
        }
        HostCommand::Stop => {
            if !controller.stop() {
                ui::print_message("Auto-commit is not running.");
            }
        }
        HostCommand::Status => print_status(&controller.status()),
        HostCommand::Help => print_help(),
        HostCommand::Quit => return Flow::Exit,
    }
    Flow::Continue
}

/// Interactive loop: reads commands until quit, end of input or Ctrl-C.
pub async fn run_interactive(controller: AutoCommitController, lines: LineReader) -> Result<()> {
    run_interactive_until(controller, lines, interrupted()).await
}

/// Interactive loop ending early when `interrupt` resolves.
///
/// The interrupt is honoured while waiting for input and while a command
/// runs, so a `start` still prompting or cloning is abandoned.
pub async fn run_interactive_until<F>(
    mut controller: AutoCommitController,
    lines: LineReader,
    interrupt: F,
) -> Result<()>
where
    F: Future<Output = Result<()>>,
{
    tokio::pin!(interrupt);
    print_banner();
    print_help();

    loop {
        ui::print_prompt("autocommit>");
        let line = tokio::select! {
            line = lines.next_line() => line?,
            signal = &mut interrupt => {
                signal?;
                log_info!("Interrupt received");
                None
            }
        };

        let Some(line) = line else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        match line.parse::<HostCommand>() {
            Ok(command) => {
                let flow = tokio::select! {
                    flow = dispatch(&mut controller, command) => flow,
                    signal = &mut interrupt => {
                        signal?;
                        log_info!("Interrupt received while running {:?}", command);
                        Flow::Exit
                    }
                };
                if flow == Flow::Exit {
                    break;
                }
            }
            Err(message) => ui::print_warning(&message),
        }
    }

    controller.deactivate();
    ui::print_message("Goodbye.");
    Ok(())
}

/// Starts immediately and keeps running until Ctrl-C.
pub async fn run_until_interrupted(controller: AutoCommitController) -> Result<()> {
    run_until(controller, interrupted()).await
}

/// Starts immediately and keeps running until `interrupt` resolves.
pub async fn run_until<F>(mut controller: AutoCommitController, interrupt: F) -> Result<()>
where
    F: Future<Output = Result<()>>,
{
    tokio::pin!(interrupt);
    print_banner();

    let started = tokio::select! {
        result = controller.start() => Some(result.is_ok()),
        signal = &mut interrupt => {
            signal?;
            None
        }
    };
    match started {
        None => {
            log_info!("Interrupted during setup");
            return Ok(());
        }
        Some(false) => anyhow::bail!("Auto-commit could not be started"),
        Some(true) => {}
    }

    ui::print_message("Press Ctrl-C to stop.");
    interrupt.as_mut().await?;

    controller.stop();
    Ok(())
}

async fn interrupted() -> Result<()> {
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for ctrl+c signal")
}

fn print_banner() {
    ui::print_message(&ui::create_gradient_text("gh-autocommit"));
}

fn print_help() {
    ui::print_message("Commands:");
    ui::print_message("  start   prompt for a token and repository, then commit every interval");
    ui::print_message("  stop    stop the running auto-commit");
    ui::print_message("  status  show what is running");
    ui::print_message("  quit    stop and exit");
}

fn print_status(status: &ControllerStatus) {
    match status {
        ControllerStatus::Idle => ui::print_message("Auto-commit is idle."),
        ControllerStatus::Running {
            repository,
            branch,
            path,
        } => ui::print_info(&format!(
            "Auto-commit running for {repository} ({branch}) in {}",
            path.display()
        )),
    }
}
