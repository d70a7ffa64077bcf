#![allow(dead_code)]

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use gh_autocommit::config::Config;
use gh_autocommit::controller::AutoCommitController;
use gh_autocommit::git::{CommitResult, Credentials, WorkingCopy};
use gh_autocommit::notify::Notifier;
use gh_autocommit::prompt::Prompter;
use gh_autocommit::remote::{
    CreateRepositoryOptions, Identity, RemoteError, RemoteService, RepositoryMetadata,
};
use git2::{Repository, Signature};
use parking_lot::Mutex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tempfile::TempDir;

pub const TOKEN: &str = "ghp_test_token";
pub const LOGIN: &str = "octocat";

/// Prompter answering with fixed values and counting how often it was asked
pub struct ScriptedPrompter {
    token: Option<String>,
    repo_name: Option<String>,
    pub asked: AtomicUsize,
}

impl ScriptedPrompter {
    pub fn new(token: Option<&str>, repo_name: Option<&str>) -> Self {
        Self {
            token: token.map(str::to_string),
            repo_name: repo_name.map(str::to_string),
            asked: AtomicUsize::new(0),
        }
    }

    pub fn answering(repo_name: &str) -> Self {
        Self::new(Some(TOKEN), Some(repo_name))
    }

    pub fn asked(&self) -> usize {
        self.asked.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Prompter for ScriptedPrompter {
    async fn auth_token(&self) -> Result<Option<String>> {
        self.asked.fetch_add(1, Ordering::SeqCst);
        Ok(self.token.clone())
    }

    async fn repo_name(&self) -> Result<Option<String>> {
        self.asked.fetch_add(1, Ordering::SeqCst);
        Ok(self.repo_name.clone())
    }
}

/// In-memory hosting service
pub struct FakeRemote {
    exists: AtomicBool,
    reject_token: bool,
    lookup_failure: Option<u16>,
    pub clone_url: String,
    pub default_branch: String,
    pub auth_calls: AtomicUsize,
    pub get_calls: AtomicUsize,
    pub create_calls: AtomicUsize,
}

impl FakeRemote {
    pub fn new(exists: bool) -> Self {
        Self {
            exists: AtomicBool::new(exists),
            reject_token: false,
            lookup_failure: None,
            clone_url: "https://github.com/octocat/repo.git".to_string(),
            default_branch: "main".to_string(),
            auth_calls: AtomicUsize::new(0),
            get_calls: AtomicUsize::new(0),
            create_calls: AtomicUsize::new(0),
        }
    }

    pub fn rejecting_token() -> Self {
        Self {
            reject_token: true,
            ..Self::new(true)
        }
    }

    pub fn failing_lookup(status: u16) -> Self {
        Self {
            lookup_failure: Some(status),
            ..Self::new(true)
        }
    }

    pub fn with_clone_url(mut self, url: impl Into<String>) -> Self {
        self.clone_url = url.into();
        self
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    fn metadata(&self, owner: &str, name: &str) -> RepositoryMetadata {
        RepositoryMetadata {
            name: name.to_string(),
            owner: owner.to_string(),
            default_branch: self.default_branch.clone(),
            clone_url: self.clone_url.clone(),
        }
    }
}

#[async_trait]
impl RemoteService for FakeRemote {
    async fn authenticate(&self, token: &str) -> Result<Identity, RemoteError> {
        self.auth_calls.fetch_add(1, Ordering::SeqCst);
        if self.reject_token || token != TOKEN {
            return Err(RemoteError::Api {
                status: 401,
                message: "Bad credentials".to_string(),
            });
        }
        Ok(Identity {
            login: LOGIN.to_string(),
        })
    }

    async fn get_repository(
        &self,
        _token: &str,
        owner: &str,
        name: &str,
    ) -> Result<RepositoryMetadata, RemoteError> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(status) = self.lookup_failure {
            return Err(RemoteError::Api {
                status,
                message: "Server Error".to_string(),
            });
        }
        if self.exists.load(Ordering::SeqCst) {
            Ok(self.metadata(owner, name))
        } else {
            Err(RemoteError::NotFound)
        }
    }

    async fn create_repository(
        &self,
        _token: &str,
        name: &str,
        options: &CreateRepositoryOptions,
    ) -> Result<RepositoryMetadata, RemoteError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        assert!(options.auto_init, "repositories are created with an initial commit");
        self.exists.store(true, Ordering::SeqCst);
        Ok(self.metadata(LOGIN, name))
    }
}

/// Working copy that fakes git: clone writes the "remote" files, the other
/// operations only count calls. Pushes can be made to fail.
#[derive(Default)]
pub struct FakeWorkingCopy {
    fail_push: AtomicBool,
    fail_clone: AtomicBool,
    pub clones: AtomicUsize,
    pub stages: AtomicUsize,
    pub commits: Mutex<Vec<String>>,
    pub pushes: AtomicUsize,
}

impl FakeWorkingCopy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_push() -> Self {
        let fake = Self::default();
        fake.fail_push.store(true, Ordering::SeqCst);
        fake
    }

    pub fn failing_clone() -> Self {
        let fake = Self::default();
        fake.fail_clone.store(true, Ordering::SeqCst);
        fake
    }

    pub fn set_fail_push(&self, fail: bool) {
        self.fail_push.store(fail, Ordering::SeqCst);
    }

    pub fn commit_count(&self) -> usize {
        self.commits.lock().len()
    }

    pub fn push_count(&self) -> usize {
        self.pushes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WorkingCopy for FakeWorkingCopy {
    async fn clone_repo(&self, _url: &str, dest: &Path, _credentials: &Credentials) -> Result<()> {
        self.clones.fetch_add(1, Ordering::SeqCst);
        if self.fail_clone.load(Ordering::SeqCst) {
            return Err(anyhow!("could not resolve host"));
        }
        fs::create_dir_all(dest)?;
        fs::write(dest.join("README.md"), "# remote\n")?;
        fs::write(dest.join("remote.txt"), "from the remote")?;
        Ok(())
    }

    async fn stage_all(&self, _path: &Path) -> Result<usize> {
        self.stages.fetch_add(1, Ordering::SeqCst);
        Ok(1)
    }

    async fn commit(&self, _path: &Path, message: &str) -> Result<CommitResult> {
        let mut commits = self.commits.lock();
        commits.push(message.to_string());
        Ok(CommitResult {
            branch: "main".to_string(),
            commit_hash: format!("{:07}", commits.len()),
            files_changed: 1,
        })
    }

    async fn push(
        &self,
        _path: &Path,
        _remote: &str,
        _branch: &str,
        _credentials: &Credentials,
    ) -> Result<()> {
        self.pushes.fetch_add(1, Ordering::SeqCst);
        if self.fail_push.load(Ordering::SeqCst) {
            return Err(anyhow!("network unreachable"));
        }
        Ok(())
    }
}

/// Notifier that remembers what it was told
#[derive(Default)]
pub struct RecordingNotifier {
    pub infos: Mutex<Vec<String>>,
    pub errors: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn infos(&self) -> Vec<String> {
        self.infos.lock().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn info(&self, message: &str) {
        self.infos.lock().push(message.to_string());
    }

    fn error(&self, message: &str) {
        self.errors.lock().push(message.to_string());
    }
}

/// A controller wired to test doubles, plus handles on those doubles
pub struct Harness {
    pub workspace: TempDir,
    pub prompter: Arc<ScriptedPrompter>,
    pub remote: Arc<FakeRemote>,
    pub working_copy: Arc<FakeWorkingCopy>,
    pub notifier: Arc<RecordingNotifier>,
    pub controller: AutoCommitController,
}

impl Harness {
    pub fn new(prompter: ScriptedPrompter, remote: FakeRemote, working_copy: FakeWorkingCopy) -> Self {
        let workspace = TempDir::new().expect("Failed to create temporary directory");
        Self::in_workspace(workspace, prompter, remote, working_copy)
    }

    pub fn in_workspace(
        workspace: TempDir,
        prompter: ScriptedPrompter,
        remote: FakeRemote,
        working_copy: FakeWorkingCopy,
    ) -> Self {
        let config = Config::default().with_workspace_root(workspace.path());
        let prompter = Arc::new(prompter);
        let remote = Arc::new(remote);
        let working_copy = Arc::new(working_copy);
        let notifier = Arc::new(RecordingNotifier::default());
        let controller = AutoCommitController::new(
            config,
            prompter.clone(),
            remote.clone(),
            working_copy.clone(),
            notifier.clone(),
        );
        Self {
            workspace,
            prompter,
            remote,
            working_copy,
            notifier,
            controller,
        }
    }

    pub fn repo_path(&self, name: &str) -> PathBuf {
        self.workspace.path().join(name)
    }
}

/// Creates a bare repository with one commit on `main` containing `README.md`.
/// Returns the temp dir and the bare repository path.
pub fn setup_bare_remote() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temporary directory");
    let bare_path = temp_dir.path().join("remote.git");
    let repo = Repository::init_bare(&bare_path).expect("Failed to initialize bare repository");

    let blob = repo
        .blob(b"# remote\n")
        .expect("Failed to write README blob");
    let mut builder = repo.treebuilder(None).expect("Failed to create tree builder");
    builder
        .insert("README.md", blob, 0o100_644)
        .expect("Failed to insert README");
    let tree_id = builder.write().expect("Failed to write tree");
    let tree = repo.find_tree(tree_id).expect("Failed to find tree");
    let signature = Signature::now("Test User", "test@example.com").expect("signature");
    repo.commit(
        Some("refs/heads/main"),
        &signature,
        &signature,
        "Initial commit",
        &tree,
        &[],
    )
    .expect("Failed to commit");
    repo.set_head("refs/heads/main")
        .expect("Failed to point HEAD at main");

    (temp_dir, bare_path)
}

/// Message of the commit `refs/heads/<branch>` points to in `repo_path`
pub fn head_message(repo_path: &Path, branch: &str) -> String {
    let repo = Repository::open(repo_path).expect("Failed to open repository");
    let reference = repo
        .find_reference(&format!("refs/heads/{branch}"))
        .expect("branch exists");
    let commit = reference.peel_to_commit().expect("branch points to a commit");
    commit.message().unwrap_or_default().to_string()
}

/// Adds a commit to `refs/heads/main` of the bare repository directly, as if
/// someone else had pushed. Clones made before this call fall behind.
pub fn advance_remote(bare_path: &Path, message: &str) {
    let repo = Repository::open_bare(bare_path).expect("Failed to open bare repository");
    let parent = repo
        .find_reference("refs/heads/main")
        .and_then(|r| r.peel_to_commit())
        .expect("main has a commit");
    let blob = repo.blob(message.as_bytes()).expect("Failed to write blob");
    let base_tree = parent.tree().expect("parent tree");
    let mut builder = repo
        .treebuilder(Some(&base_tree))
        .expect("Failed to create tree builder");
    builder
        .insert("OTHER.md", blob, 0o100_644)
        .expect("Failed to insert file");
    let tree_id = builder.write().expect("Failed to write tree");
    let tree = repo.find_tree(tree_id).expect("Failed to find tree");
    let signature = Signature::now("Someone Else", "other@example.com").expect("signature");
    repo.commit(
        Some("refs/heads/main"),
        &signature,
        &signature,
        message,
        &tree,
        &[&parent],
    )
    .expect("Failed to commit");
}
