use crate::log_debug;
use anyhow::{Context, Result};
use git2::{IndexAddOption, Repository};

/// Results from a commit operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitResult {
    pub branch: String,
    pub commit_hash: String,
    pub files_changed: usize,
}

/// Stages every change in the working tree: new, modified and deleted files.
///
/// Equivalent to `git add --all`; paths ignored by `.gitignore` stay ignored.
pub fn stage_all(repo: &Repository) -> Result<usize> {
    let mut index = repo.index().context("Failed to open repository index")?;

    index
        .add_all(["*"], IndexAddOption::DEFAULT, None)
        .context("Failed to stage new and modified files")?;
    index
        .update_all(["*"], None)
        .context("Failed to stage deleted files")?;
    index.write().context("Failed to write repository index")?;

    let staged = repo
        .statuses(None)?
        .iter()
        .filter(|entry| {
            entry.status().intersects(
                git2::Status::INDEX_NEW
                    | git2::Status::INDEX_MODIFIED
                    | git2::Status::INDEX_DELETED
                    | git2::Status::INDEX_RENAMED
                    | git2::Status::INDEX_TYPECHANGE,
            )
        })
        .count();

    log_debug!("Staged {} path(s)", staged);
    Ok(staged)
}

/// Commits the current index on top of `HEAD`.
///
/// Works on an unborn branch too, in which case the commit has no parent.
pub fn commit(repo: &Repository, message: &str) -> Result<CommitResult> {
    let signature = repo
        .signature()
        .context("No commit identity configured (user.name / user.email)")?;
    let mut index = repo.index()?;
    let tree_id = index.write_tree()?;
    let tree = repo.find_tree(tree_id)?;

    let parent_commit = match repo.head() {
        Ok(head) => Some(head.peel_to_commit()?),
        Err(e) if e.code() == git2::ErrorCode::UnbornBranch => None,
        Err(e) => return Err(e).context("Failed to resolve HEAD"),
    };
    let parents: Vec<&git2::Commit> = parent_commit.iter().collect();

    let commit_oid = repo.commit(
        Some("HEAD"),
        &signature,
        &signature,
        message,
        &tree,
        &parents,
    )?;

    let branch_name = repo.head()?.shorthand().unwrap_or("HEAD").to_string();
    let commit_hash = commit_oid.to_string().chars().take(7).collect();

    let parent_tree = parent_commit.as_ref().map(git2::Commit::tree).transpose()?;
    let diff = repo.diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), None)?;
    let files_changed = diff.deltas().len();

    log_debug!(
        "Committed {} on {} ({} file(s) changed)",
        commit_hash,
        branch_name,
        files_changed
    );

    Ok(CommitResult {
        branch: branch_name,
        commit_hash,
        files_changed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn init_repo() -> (TempDir, Repository) {
        let temp_dir = TempDir::new().expect("Failed to create temporary directory");
        let repo = Repository::init(temp_dir.path()).expect("Failed to initialize repository");
        let mut config = repo.config().expect("Failed to get repository config");
        config
            .set_str("user.name", "Test User")
            .expect("Failed to set user name");
        config
            .set_str("user.email", "test@example.com")
            .expect("Failed to set user email");
        (temp_dir, repo)
    }

    #[test]
    fn test_first_commit_on_unborn_branch() {
        let (temp_dir, repo) = init_repo();
        fs::write(temp_dir.path().join("README.md"), "hello").expect("write");

        assert_eq!(stage_all(&repo).expect("stage"), 1);
        let result = commit(&repo, "Initial commit").expect("commit");

        assert_eq!(result.files_changed, 1);
        assert_eq!(result.commit_hash.len(), 7);
        let head = repo.head().expect("head").peel_to_commit().expect("commit");
        assert_eq!(head.parent_count(), 0);
        assert_eq!(head.message(), Some("Initial commit"));
    }

    #[test]
    fn test_stage_all_picks_up_deletions() {
        let (temp_dir, repo) = init_repo();
        fs::write(temp_dir.path().join("a.txt"), "a").expect("write");
        fs::write(temp_dir.path().join("b.txt"), "b").expect("write");
        stage_all(&repo).expect("stage");
        commit(&repo, "two files").expect("commit");

        fs::remove_file(temp_dir.path().join("a.txt")).expect("remove");
        fs::write(temp_dir.path().join("b.txt"), "bb").expect("write");
        assert_eq!(stage_all(&repo).expect("stage"), 2);

        let result = commit(&repo, "second").expect("commit");
        assert_eq!(result.files_changed, 2);
        let head = repo.head().expect("head").peel_to_commit().expect("commit");
        assert_eq!(head.parent_count(), 1);
        assert!(head.tree().expect("tree").get_name("a.txt").is_none());
    }
}
