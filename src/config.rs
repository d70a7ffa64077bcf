use std::path::PathBuf;
use std::time::Duration;

/// Interval between two automatic commits
pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_millis(60_000);

/// GitHub REST API endpoint
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Host used to build HTTPS clone URLs
pub const DEFAULT_GIT_HOST: &str = "github.com";

/// File inside the working copy that every tick appends to
pub const README_FILE: &str = "README.md";

/// Remote that ticks push to
pub const DEFAULT_REMOTE: &str = "origin";

/// Runtime configuration for the auto-commit host.
///
/// There is no configuration file. Session parameters (token and repository
/// name) are always collected interactively; everything here is a host-level
/// setting with a sensible default, optionally overridden from the command line.
#[derive(Clone, Debug)]
pub struct Config {
    /// Directory under which the working copy `<workspace_root>/<repo>` is created
    pub workspace_root: PathBuf,
    /// Period of the repeating commit-and-push action
    pub tick_period: Duration,
    /// Base URL of the hosting service API
    pub api_url: String,
    /// Host name used in `https://<host>/<owner>/<repo>.git`
    pub git_host: String,
    /// Remote name pushed to on every tick
    pub remote_name: String,
    /// User agent sent with API requests
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            workspace_root: PathBuf::from("."),
            tick_period: DEFAULT_TICK_PERIOD,
            api_url: DEFAULT_API_URL.to_string(),
            git_host: DEFAULT_GIT_HOST.to_string(),
            remote_name: DEFAULT_REMOTE.to_string(),
            user_agent: format!("gh-autocommit/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl Config {
    /// Use a different workspace root
    pub fn with_workspace_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.workspace_root = root.into();
        self
    }

    /// Use a different tick period
    pub fn with_tick_period(mut self, period: Duration) -> Self {
        self.tick_period = period;
        self
    }

    /// Point API calls at a different endpoint (GitHub Enterprise, tests)
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_git_host(mut self, git_host: impl Into<String>) -> Self {
        self.git_host = git_host.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.tick_period, Duration::from_secs(60));
        assert_eq!(config.api_url, "https://api.github.com");
        assert_eq!(config.git_host, "github.com");
        assert_eq!(config.remote_name, "origin");
        assert!(config.user_agent.starts_with("gh-autocommit/"));
    }

    #[test]
    fn test_api_url_trailing_slash_is_trimmed() {
        let config = Config::default().with_api_url("http://localhost:8080/");
        assert_eq!(config.api_url, "http://localhost:8080");
    }
}
