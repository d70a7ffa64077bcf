//! Error kinds surfaced by the auto-commit controller

use std::path::PathBuf;

use crate::remote::RemoteError;

pub const REPO_NAME_RULE: &str =
    "Repository name can only contain letters, numbers, hyphens, and underscores";

/// Everything that can abort `start()` or fail a tick
#[derive(Debug, thiserror::Error)]
pub enum AutoCommitError {
    #[error("GitHub token is required!")]
    MissingCredential,

    #[error("Repository name is required!")]
    MissingRepoName,

    #[error("Invalid repository name '{0}': {rule}", rule = REPO_NAME_RULE)]
    InvalidRepoName(String),

    #[error("Please open a workspace folder first! ({})", .0.display())]
    WorkspaceUnavailable(PathBuf),

    #[error("Authentication failed: {0}")]
    Authentication(#[source] RemoteError),

    #[error("Failed to look up repository {owner}/{name}: {source}")]
    RepositoryLookup {
        owner: String,
        name: String,
        #[source]
        source: RemoteError,
    },

    #[error("Failed to create repository {name}: {source}")]
    RepositoryCreate {
        name: String,
        #[source]
        source: RemoteError,
    },

    #[error("Failed to clear local directory {}: {source}", path.display())]
    LocalDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to clone {url} into {}: {source}", path.display())]
    Clone {
        url: String,
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("Error updating repository: {0}")]
    PeriodicTask(#[source] anyhow::Error),

    #[error("Auto-commit is already running; stop it first")]
    AlreadyRunning,

    #[error("Failed to read input: {0}")]
    Prompt(#[source] anyhow::Error),
}
