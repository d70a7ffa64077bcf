//! Remote repository service
//!
//! The controller only needs three calls from the hosting service: resolve
//! the identity behind a token, look up a repository, and create one.
//! `GitHubClient` implements them against the GitHub REST API.

mod github;

pub use github::GitHubClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// The account a token belongs to
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Identity {
    pub login: String,
}

/// The repository fields the controller relies on
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RepositoryMetadata {
    pub name: String,
    pub owner: String,
    pub default_branch: String,
    /// HTTPS URL the working copy is cloned from and pushed to
    pub clone_url: String,
}

/// Options for repository creation
#[derive(Clone, Debug, Serialize)]
pub struct CreateRepositoryOptions {
    /// Create an initial commit so the default branch exists right away
    pub auto_init: bool,
    pub private: bool,
}

impl Default for CreateRepositoryOptions {
    fn default() -> Self {
        Self {
            auto_init: true,
            private: false,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("Not found")]
    NotFound,
    #[error("{message} (HTTP {status})")]
    Api { status: u16, message: String },
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Invalid API URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl RemoteError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }
}

/// Hosting service operations used during setup
#[async_trait]
pub trait RemoteService: Send + Sync {
    /// Resolve the identity the token authenticates as
    async fn authenticate(&self, token: &str) -> Result<Identity, RemoteError>;

    /// Fetch repository metadata; `RemoteError::NotFound` when it does not exist
    async fn get_repository(
        &self,
        token: &str,
        owner: &str,
        name: &str,
    ) -> Result<RepositoryMetadata, RemoteError>;

    /// Create a repository owned by the authenticated identity
    async fn create_repository(
        &self,
        token: &str,
        name: &str,
        options: &CreateRepositoryOptions,
    ) -> Result<RepositoryMetadata, RemoteError>;
}
