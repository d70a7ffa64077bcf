use crate::git::commit::{self, CommitResult};
use crate::git::credentials::{Credentials, remote_callbacks};
use crate::log_debug;
use anyhow::{Context as AnyhowContext, Result, anyhow};
use git2::build::RepoBuilder;
use git2::{FetchOptions, PushOptions, Repository};
use std::cell::RefCell;
use std::path::{Path, PathBuf};

/// A local working copy and the git operations performed on it.
#[derive(Debug, Clone)]
pub struct GitRepo {
    repo_path: PathBuf,
}

impl GitRepo {
    /// Creates a new `GitRepo` instance for an existing working copy.
    pub fn new(repo_path: &Path) -> Self {
        Self {
            repo_path: repo_path.to_path_buf(),
        }
    }

    /// Clones `url` into `dest` and returns the new working copy.
    ///
    /// `dest` must not exist or must be empty. When the cloned repository has
    /// no commit identity available from git config, one is derived from the
    /// credentials' username and stored in the clone's local config.
    pub fn clone_from(url: &str, dest: &Path, credentials: &Credentials) -> Result<Self> {
        log_debug!("Cloning {} into {}", url, dest.display());

        let mut fetch_options = FetchOptions::new();
        fetch_options.remote_callbacks(remote_callbacks(credentials));

        let repo = RepoBuilder::new()
            .fetch_options(fetch_options)
            .clone(url, dest)
            .map_err(|e| anyhow!("Failed to clone repository: {}", e.message()))?;

        ensure_identity(&repo, credentials)?;

        log_debug!("Successfully cloned repository to {}", dest.display());
        Ok(Self::new(dest))
    }

    /// Open the repository at the stored path
    pub fn open_repo(&self) -> Result<Repository> {
        Repository::open(&self.repo_path)
            .with_context(|| format!("Not a git repository: {}", self.repo_path.display()))
    }

    /// Retrieves the current branch name.
    pub fn get_current_branch(&self) -> Result<String> {
        let repo = self.open_repo()?;
        let head = repo.head()?;
        Ok(head.shorthand().unwrap_or("HEAD detached").to_string())
    }

    /// Stage all changes in the working tree.
    pub fn stage_all(&self) -> Result<usize> {
        let repo = self.open_repo()?;
        commit::stage_all(&repo)
    }

    /// Commits the staged changes with the given message.
    pub fn commit(&self, message: &str) -> Result<CommitResult> {
        let repo = self.open_repo()?;
        commit::commit(&repo, message)
    }

    /// Pushes the local `branch` to the same branch on `remote_name`.
    ///
    /// A reference update rejected by the server (for example a
    /// non-fast-forward) is an error even though the transport succeeded.
    pub fn push(&self, remote_name: &str, branch: &str, credentials: &Credentials) -> Result<()> {
        let repo = self.open_repo()?;
        let mut remote = repo
            .find_remote(remote_name)
            .with_context(|| format!("Remote '{remote_name}' not found"))?;

        let rejection: RefCell<Option<String>> = RefCell::new(None);
        {
            let mut callbacks = remote_callbacks(credentials);
            callbacks.push_update_reference(|refname, status| {
                if let Some(message) = status {
                    *rejection.borrow_mut() = Some(format!("{refname}: {message}"));
                }
                Ok(())
            });

            let mut push_options = PushOptions::new();
            push_options.remote_callbacks(callbacks);

            let refspec = format!("refs/heads/{branch}:refs/heads/{branch}");
            log_debug!("Pushing {} to {}", refspec, remote_name);
            remote
                .push(&[refspec.as_str()], Some(&mut push_options))
                .map_err(|e| anyhow!("Failed to push to {}: {}", remote_name, e.message()))?;
        }

        if let Some(reason) = rejection.into_inner() {
            return Err(anyhow!("Push rejected by remote: {}", reason));
        }

        log_debug!("Pushed {} to {}", branch, remote_name);
        Ok(())
    }
}

/// Makes sure commits can be signed in a fresh clone.
fn ensure_identity(repo: &Repository, credentials: &Credentials) -> Result<()> {
    if repo.signature().is_ok() {
        return Ok(());
    }

    let name = credentials.username();
    let email = format!("{name}@users.noreply.github.com");
    log_debug!("No git identity configured, using {} <{}>", name, email);

    let mut config = repo.config().context("Failed to open repository config")?;
    config.set_str("user.name", name)?;
    config.set_str("user.email", &email)?;
    Ok(())
}
