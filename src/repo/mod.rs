//! Local repository access
//!
//! Everything the merge engine does to the local checkout goes through
//! [`LocalBranchManager`], so the engine can be driven against a mock in tests.

mod git;

pub use git::GitRepo;

use crate::error::{Error, Result};

/// A git remote
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitRemote {
    /// Remote name (e.g., "origin")
    pub name: String,
    /// Remote URL
    pub url: String,
}

/// Local branch inspection and mutation
pub trait LocalBranchManager: Send + Sync {
    /// Currently checked-out branch, `None` when HEAD is detached
    fn current_branch(&self) -> Result<Option<String>>;

    /// Whether `refs/heads/<branch>` exists
    fn has_local_branch(&self, branch: &str) -> Result<bool>;

    /// Check out an existing local branch
    fn checkout(&self, branch: &str) -> Result<()>;

    /// Create `branch` tracking `remote_ref` and check it out
    fn checkout_new_tracking(&self, branch: &str, remote_ref: &str) -> Result<()>;

    /// Delete a local branch, even if unmerged
    fn delete_local_branch(&self, branch: &str) -> Result<()>;

    /// Fast-forward the current branch from `remote`/`branch`
    fn pull_fast_forward(&self, remote: &str, branch: &str) -> Result<()>;

    /// Full commit hash of `rev`
    fn commit_hash(&self, rev: &str) -> Result<String>;
}

/// Select the remote to use
///
/// An explicitly requested remote must exist. Otherwise "origin" wins,
/// falling back to the first remote.
pub fn select_remote(remotes: &[GitRemote], requested: Option<&str>) -> Result<String> {
    if let Some(name) = requested {
        return remotes
            .iter()
            .find(|r| r.name == name)
            .map(|r| r.name.clone())
            .ok_or_else(|| Error::RemoteNotFound(name.to_string()));
    }

    remotes
        .iter()
        .find(|r| r.name == "origin")
        .or_else(|| remotes.first())
        .map(|r| r.name.clone())
        .ok_or_else(|| Error::RemoteNotFound("no git remotes configured".to_string()))
}
