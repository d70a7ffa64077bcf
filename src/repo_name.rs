use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use crate::error::AutoCommitError;

static REPO_NAME_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_-]+$").ok());

/// Returns true if `name` is acceptable as a repository name: one or more
/// ASCII letters, digits, hyphens or underscores.
pub fn is_valid_repo_name(name: &str) -> bool {
    REPO_NAME_PATTERN
        .as_ref()
        .is_some_and(|pattern| pattern.is_match(name))
}

/// A repository name that passed validation.
///
/// Because only `[a-zA-Z0-9_-]` is allowed, the name is also safe to use
/// as a single path component and inside a URL path.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RepoName(String);

impl RepoName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for RepoName {
    type Err = AutoCommitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(AutoCommitError::MissingRepoName);
        }
        if is_valid_repo_name(s) {
            Ok(Self(s.to_string()))
        } else {
            Err(AutoCommitError::InvalidRepoName(s.to_string()))
        }
    }
}

impl TryFrom<String> for RepoName {
    type Error = AutoCommitError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl AsRef<str> for RepoName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RepoName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
