//! Auto-commit controller
//!
//! Two states, `Idle` and `Running`. `start()` runs the setup pipeline
//! (prompt → authenticate → ensure repository → clone) and then spawns the
//! tick task; `stop()` cancels it.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::config::Config;
use crate::error::AutoCommitError;
use crate::git::{Credentials, WorkingCopy};
use crate::notify::Notifier;
use crate::prompt::Prompter;
use crate::remote::{CreateRepositoryOptions, RemoteService};
use crate::repo_name::RepoName;
use crate::session::Session;
use crate::tick;
use crate::{log_debug, log_error, log_info};

pub const STARTED_MESSAGE: &str = "Auto-commit started successfully!";
pub const STOPPED_MESSAGE: &str = "Auto-commit stopped!";
pub const PUSHED_MESSAGE: &str = "Successfully pushed changes!";

/// What the host sees when it asks for the controller's state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerStatus {
    Idle,
    Running {
        repository: String,
        branch: String,
        path: PathBuf,
    },
}

/// The live tick task; at most one exists at a time
struct TickTask {
    session: Arc<Session>,
    cancel: CancellationToken,
}

enum State {
    Idle,
    Running(TickTask),
}

pub struct AutoCommitController {
    config: Config,
    prompter: Arc<dyn Prompter>,
    remote: Arc<dyn RemoteService>,
    working_copy: Arc<dyn WorkingCopy>,
    notifier: Arc<dyn Notifier>,
    state: State,
}

impl AutoCommitController {
    pub fn new(
        config: Config,
        prompter: Arc<dyn Prompter>,
        remote: Arc<dyn RemoteService>,
        working_copy: Arc<dyn WorkingCopy>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            config,
            prompter,
            remote,
            working_copy,
            notifier,
            state: State::Idle,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, State::Running(_))
    }

    pub fn status(&self) -> ControllerStatus {
        match &self.state {
            State::Idle => ControllerStatus::Idle,
            State::Running(task) => ControllerStatus::Running {
                repository: task.session.full_name(),
                branch: task.session.default_branch().to_string(),
                path: task.session.local_path().to_path_buf(),
            },
        }
    }

    /// The active session, if running
    pub fn session(&self) -> Option<&Session> {
        match &self.state {
            State::Idle => None,
            State::Running(task) => Some(&task.session),
        }
    }

    /// Runs the setup pipeline and starts the repeating tick.
    ///
    /// Any failure is reported through the notifier and returned; the
    /// controller then stays idle. Calling this while running is rejected
    /// before anything is prompted.
    pub async fn start(&mut self) -> Result<(), AutoCommitError> {
        if self.is_running() {
            let error = AutoCommitError::AlreadyRunning;
            self.notifier.error(&error.to_string());
            return Err(error);
        }

        match self.setup().await {
            Ok(session) => {
                let task = self.spawn_tick_task(Arc::new(session));
                log_info!(
                    "Auto-commit running for {} ({}) every {:?}",
                    task.session.full_name(),
                    task.session.clone_url(),
                    self.config.tick_period
                );
                self.state = State::Running(task);
                self.notifier.info(STARTED_MESSAGE);
                Ok(())
            }
            Err(error) => {
                log_error!("Error in auto-commit setup: {}", error);
                self.notifier.error(&format!("Error: {error}"));
                Err(error)
            }
        }
    }

    /// Cancels the tick task. Returns `false` (and does nothing) when idle.
    ///
    /// A tick already in progress is not interrupted; it finishes on its own
    /// and no further tick is scheduled.
    pub fn stop(&mut self) -> bool {
        if !self.cancel_task() {
            return false;
        }
        self.notifier.info(STOPPED_MESSAGE);
        true
    }

    /// Host shutdown: stop without notifying
    pub fn deactivate(&mut self) {
        self.cancel_task();
    }

    fn cancel_task(&mut self) -> bool {
        match std::mem::replace(&mut self.state, State::Idle) {
            State::Idle => false,
            State::Running(task) => {
                log_debug!("Cancelling tick task for {}", task.session.full_name());
                task.cancel.cancel();
                true
            }
        }
    }

    async fn setup(&self) -> Result<Session, AutoCommitError> {
        let token = self
            .prompter
            .auth_token()
            .await
            .map_err(AutoCommitError::Prompt)?
            .filter(|token| !token.is_empty())
            .ok_or(AutoCommitError::MissingCredential)?;
        log_debug!("Token received");

        let repo_name: RepoName = self
            .prompter
            .repo_name()
            .await
            .map_err(AutoCommitError::Prompt)?
            .ok_or(AutoCommitError::MissingRepoName)?
            .parse()?;
        log_debug!("Repository name received: {}", repo_name);

        let workspace_root = self.config.workspace_root.clone();
        if !workspace_root.is_dir() {
            return Err(AutoCommitError::WorkspaceUnavailable(workspace_root));
        }

        let identity = self
            .remote
            .authenticate(&token)
            .await
            .map_err(AutoCommitError::Authentication)?;
        self.notifier
            .progress(&format!("Authenticated as: {}", identity.login));

        self.ensure_repository(&token, &identity.login, &repo_name)
            .await?;

        // Fetched again so the branch reflects what the service settled on
        let metadata = self
            .remote
            .get_repository(&token, &identity.login, repo_name.as_str())
            .await
            .map_err(|source| AutoCommitError::RepositoryLookup {
                owner: identity.login.clone(),
                name: repo_name.to_string(),
                source,
            })?;
        log_debug!("Default branch: {}", metadata.default_branch);

        let local_path = workspace_root.join(repo_name.as_str());
        clear_directory(&local_path)?;

        let credentials = Credentials::new(identity.login, token);
        self.notifier
            .progress(&format!("Cloning from: {}", metadata.clone_url));
        self.working_copy
            .clone_repo(&metadata.clone_url, &local_path, &credentials)
            .await
            .map_err(|source| AutoCommitError::Clone {
                url: metadata.clone_url.clone(),
                path: local_path.clone(),
                source,
            })?;
        self.notifier.progress("Repository cloned successfully");

        Ok(Session::new(
            credentials,
            repo_name,
            metadata.default_branch,
            metadata.clone_url,
            local_path,
        ))
    }

    /// Looks the repository up and creates it when it does not exist
    async fn ensure_repository(
        &self,
        token: &str,
        owner: &str,
        repo_name: &RepoName,
    ) -> Result<(), AutoCommitError> {
        match self
            .remote
            .get_repository(token, owner, repo_name.as_str())
            .await
        {
            Ok(existing) => {
                log_debug!("Repository already exists: {}", existing.name);
                Ok(())
            }
            Err(error) if error.is_not_found() => {
                self.notifier
                    .progress(&format!("Creating repository: {repo_name}"));
                self.remote
                    .create_repository(token, repo_name.as_str(), &CreateRepositoryOptions::default())
                    .await
                    .map_err(|source| AutoCommitError::RepositoryCreate {
                        name: repo_name.to_string(),
                        source,
                    })?;
                log_info!("Repository created successfully");
                Ok(())
            }
            Err(source) => Err(AutoCommitError::RepositoryLookup {
                owner: owner.to_string(),
                name: repo_name.to_string(),
                source,
            }),
        }
    }

    fn spawn_tick_task(&self, session: Arc<Session>) -> TickTask {
        let cancel = CancellationToken::new();
        let period = self.config.tick_period;
        let remote_name = self.config.remote_name.clone();
        let working_copy = Arc::clone(&self.working_copy);
        let notifier = Arc::clone(&self.notifier);
        let task_session = Arc::clone(&session);
        let task_cancel = cancel.clone();
        let span = tracing::info_span!("auto_commit", repo = %session.full_name());

        tokio::spawn(async move {
            // Ticks run inline in this loop, so a slow tick delays the next
            // one instead of overlapping it; boundaries it overran are skipped.
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    () = task_cancel.cancelled() => break,
                    _ = interval.tick() => {
                        match tick::run_tick(&task_session, working_copy.as_ref(), &remote_name).await {
                            Ok(result) => {
                                log_debug!("Tick committed {}", result.commit_hash);
                                notifier.info(PUSHED_MESSAGE);
                            }
                            Err(error) => {
                                log_error!("Error in auto-commit interval: {}", error);
                                notifier.error(&error.to_string());
                            }
                        }
                    }
                }
            }
            log_debug!("Tick task for {} finished", task_session.full_name());
        }
        .instrument(span));

        TickTask { session, cancel }
    }
}

impl Drop for AutoCommitController {
    fn drop(&mut self) {
        self.cancel_task();
    }
}

/// Removes `path` recursively if it exists. Irreversible.
fn clear_directory(path: &Path) -> Result<(), AutoCommitError> {
    let exists = path
        .try_exists()
        .map_err(|source| AutoCommitError::LocalDirectory {
            path: path.to_path_buf(),
            source,
        })?;
    if !exists {
        return Ok(());
    }

    log_debug!("Removing existing directory {}", path.display());
    let removed = if path.is_dir() {
        std::fs::remove_dir_all(path)
    } else {
        std::fs::remove_file(path)
    };
    removed.map_err(|source| AutoCommitError::LocalDirectory {
        path: path.to_path_buf(),
        source,
    })
}
