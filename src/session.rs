use std::path::{Path, PathBuf};

use crate::git::Credentials;
use crate::repo_name::RepoName;

/// Everything established by a successful `start()`.
///
/// Lives only in memory and is never changed after creation; the working
/// copy at `local_path` is where every git operation of the session runs.
#[derive(Debug, Clone)]
pub struct Session {
    credentials: Credentials,
    repo_name: RepoName,
    default_branch: String,
    clone_url: String,
    local_path: PathBuf,
}

impl Session {
    pub fn new(
        credentials: Credentials,
        repo_name: RepoName,
        default_branch: String,
        clone_url: String,
        local_path: PathBuf,
    ) -> Self {
        Self {
            credentials,
            repo_name,
            default_branch,
            clone_url,
            local_path,
        }
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn owner_login(&self) -> &str {
        self.credentials.username()
    }

    pub fn repo_name(&self) -> &RepoName {
        &self.repo_name
    }

    pub fn default_branch(&self) -> &str {
        &self.default_branch
    }

    pub fn clone_url(&self) -> &str {
        &self.clone_url
    }

    pub fn local_path(&self) -> &Path {
        &self.local_path
    }

    /// `owner/name`, as shown to the user
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner_login(), self.repo_name)
    }
}
