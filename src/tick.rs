//! The repeating auto-commit action
//!
//! One tick appends an update block to `README.md`, stages everything,
//! commits and pushes to the session's default branch.

use anyhow::Context;
use chrono::{DateTime, SecondsFormat, Utc};
use std::path::Path;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

use crate::config::README_FILE;
use crate::error::AutoCommitError;
use crate::git::{CommitResult, WorkingCopy};
use crate::log_debug;
use crate::session::Session;

/// Prefix of every commit message produced by a tick
pub const COMMIT_MESSAGE_PREFIX: &str = "Auto-update: ";

/// UTC timestamp with millisecond precision, e.g. `2024-05-01T12:00:00.000Z`
pub fn format_timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// The block appended to the README on every tick
pub fn update_block(repo_name: &str, timestamp: &str) -> String {
    format!(
        "# {repo_name}\nLast updated: {timestamp}\n\nThis repository is automatically updated every minute."
    )
}

pub fn commit_message(timestamp: &str) -> String {
    format!("{COMMIT_MESSAGE_PREFIX}{timestamp}")
}

/// Appends `block` to the file at `path`, creating it if needed.
/// Existing content is never rewritten.
pub async fn append_block(path: &Path, block: &str) -> std::io::Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await?;
    file.write_all(block.as_bytes()).await?;
    file.flush().await
}

/// Runs one tick against the session's working copy.
pub async fn run_tick(
    session: &Session,
    working_copy: &dyn WorkingCopy,
    remote_name: &str,
) -> Result<CommitResult, AutoCommitError> {
    run_tick_at(session, working_copy, remote_name, Utc::now()).await
}

/// Same as [`run_tick`] with an explicit clock reading.
pub async fn run_tick_at(
    session: &Session,
    working_copy: &dyn WorkingCopy,
    remote_name: &str,
    now: DateTime<Utc>,
) -> Result<CommitResult, AutoCommitError> {
    let timestamp = format_timestamp(now);
    let path = session.local_path();
    let readme_path = path.join(README_FILE);

    log_debug!("Updating README at: {}", readme_path.display());
    append_block(
        &readme_path,
        &update_block(session.repo_name().as_str(), &timestamp),
    )
    .await
    .with_context(|| format!("Failed to update {}", readme_path.display()))
    .map_err(AutoCommitError::PeriodicTask)?;

    working_copy
        .stage_all(path)
        .await
        .map_err(AutoCommitError::PeriodicTask)?;
    let result = working_copy
        .commit(path, &commit_message(&timestamp))
        .await
        .map_err(AutoCommitError::PeriodicTask)?;
    working_copy
        .push(
            path,
            remote_name,
            session.default_branch(),
            session.credentials(),
        )
        .await
        .map_err(AutoCommitError::PeriodicTask)?;

    log_debug!("Changes pushed successfully ({})", result.commit_hash);
    Ok(result)
}
