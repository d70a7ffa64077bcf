use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use std::io::{self, BufRead};
use std::sync::mpsc;
use std::thread;
use tokio::sync::oneshot;

use crate::error::REPO_NAME_RULE;
use crate::log_warn;
use crate::repo_name::is_valid_repo_name;
use crate::ui;

/// Collects the per-session inputs from the user.
///
/// `Ok(None)` means the user gave no value or cancelled.
#[async_trait]
pub trait Prompter: Send + Sync {
    /// Personal access token, read without echo
    async fn auth_token(&self) -> Result<Option<String>>;

    /// Name of the repository to create or reuse
    async fn repo_name(&self) -> Result<Option<String>>;
}

type LineReply = oneshot::Sender<Result<Option<String>>>;

/// Line input served by a dedicated OS thread.
///
/// The thread only reads when a line is requested, so the host loop and the
/// prompts can share one input. It is not part of the tokio blocking pool:
/// a read still waiting when the host exits does not hold the runtime open.
#[derive(Clone, Debug)]
pub struct LineReader {
    requests: mpsc::Sender<LineReply>,
}

impl LineReader {
    /// Reads from the process's standard input
    pub fn stdin() -> Result<Self> {
        Self::spawn_with(|| read_line(&mut io::stdin().lock()))
    }

    /// Reads from any buffered reader
    pub fn from_reader<R: BufRead + Send + 'static>(mut input: R) -> Result<Self> {
        Self::spawn_with(move || read_line(&mut input))
    }

    fn spawn_with<F>(mut read: F) -> Result<Self>
    where
        F: FnMut() -> Result<Option<String>> + Send + 'static,
    {
        let (requests, pending) = mpsc::channel::<LineReply>();
        thread::Builder::new()
            .name("line-reader".to_string())
            .spawn(move || {
                while let Ok(reply) = pending.recv() {
                    let _ = reply.send(read());
                }
            })
            .context("Failed to start input thread")?;
        Ok(Self { requests })
    }

    /// Next line without its line ending; `None` at end of input
    pub async fn next_line(&self) -> Result<Option<String>> {
        let (reply, response) = oneshot::channel();
        self.requests
            .send(reply)
            .map_err(|_| anyhow!("Input thread is not running"))?;
        response.await.context("Input thread stopped")?
    }
}

/// Runs `op` on its own thread and waits for the result without blocking
/// the runtime. Dropping the returned future abandons the thread.
async fn on_thread<T, F>(op: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    let (reply, response) = oneshot::channel();
    thread::Builder::new()
        .name("prompt".to_string())
        .spawn(move || {
            let _ = reply.send(op());
        })
        .context("Failed to start prompt thread")?;
    response.await.context("Prompt thread stopped")?
}

/// Terminal prompter: masked token input, repository name re-prompted
/// until it is valid or left empty.
#[derive(Clone, Debug)]
pub struct ConsolePrompter {
    lines: LineReader,
}

impl ConsolePrompter {
    pub fn new(lines: LineReader) -> Self {
        Self { lines }
    }
}

#[async_trait]
impl Prompter for ConsolePrompter {
    async fn auth_token(&self) -> Result<Option<String>> {
        on_thread(|| {
            let token = rpassword::prompt_password("Enter your GitHub Personal Access Token: ")
                .context("Failed to read token")?;
            Ok(non_empty(token))
        })
        .await
    }

    async fn repo_name(&self) -> Result<Option<String>> {
        loop {
            ui::print_prompt("Enter repository name:");
            let Some(name) = self.lines.next_line().await? else {
                return Ok(None);
            };
            let Some(name) = non_empty(name) else {
                return Ok(None);
            };
            if is_valid_repo_name(&name) {
                return Ok(Some(name));
            }
            log_warn!("Rejected repository name: {:?}", name);
            ui::print_warning(REPO_NAME_RULE);
        }
    }
}

/// Reads one line without its line ending; `None` at end of input
pub fn read_line(input: &mut impl BufRead) -> Result<Option<String>> {
    let mut line = String::new();
    let read = input.read_line(&mut line).context("Failed to read input")?;
    if read == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else if trimmed.len() == value.len() {
        Some(value)
    } else {
        Some(trimmed.to_string())
    }
}
