//! Working copy manager used by the controller
//!
//! Each operation is independent and may fail on its own; callers compose
//! them (`stage_all` → `commit` → `push`) and stop at the first error.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::git::{CommitResult, Credentials, GitRepo};

#[async_trait]
pub trait WorkingCopy: Send + Sync {
    /// Clone `url` into `dest`
    async fn clone_repo(&self, url: &str, dest: &Path, credentials: &Credentials) -> Result<()>;

    /// Stage every change under `path`, returning how many paths are staged
    async fn stage_all(&self, path: &Path) -> Result<usize>;

    /// Commit the staged changes under `path`
    async fn commit(&self, path: &Path, message: &str) -> Result<CommitResult>;

    /// Push `branch` of the working copy at `path` to `remote`
    async fn push(
        &self,
        path: &Path,
        remote: &str,
        branch: &str,
        credentials: &Credentials,
    ) -> Result<()>;
}

/// `WorkingCopy` backed by libgit2.
///
/// libgit2 calls block, so every operation runs on the blocking pool.
#[derive(Debug, Clone, Copy, Default)]
pub struct GitWorkingCopy;

impl GitWorkingCopy {
    pub fn new() -> Self {
        Self
    }
}

async fn blocking<T, F>(op: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(op)
        .await
        .context("Git task panicked or was cancelled")?
}

#[async_trait]
impl WorkingCopy for GitWorkingCopy {
    async fn clone_repo(&self, url: &str, dest: &Path, credentials: &Credentials) -> Result<()> {
        let url = url.to_string();
        let dest: PathBuf = dest.to_path_buf();
        let credentials = credentials.clone();
        blocking(move || GitRepo::clone_from(&url, &dest, &credentials).map(|_| ())).await
    }

    async fn stage_all(&self, path: &Path) -> Result<usize> {
        let repo = GitRepo::new(path);
        blocking(move || repo.stage_all()).await
    }

    async fn commit(&self, path: &Path, message: &str) -> Result<CommitResult> {
        let repo = GitRepo::new(path);
        let message = message.to_string();
        blocking(move || repo.commit(&message)).await
    }

    async fn push(
        &self,
        path: &Path,
        remote: &str,
        branch: &str,
        credentials: &Credentials,
    ) -> Result<()> {
        let repo = GitRepo::new(path);
        let remote = remote.to_string();
        let branch = branch.to_string();
        let credentials = credentials.clone();
        blocking(move || repo.push(&remote, &branch, &credentials)).await
    }
}
