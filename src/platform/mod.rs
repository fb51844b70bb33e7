//! Platform services for GitHub
//!
//! Provides the remote half of a merge: finding the pull request and
//! issuing merge, auto-merge and branch deletion calls.

mod detection;
mod github;
mod selector;

pub use detection::{parse_repo_arg, parse_repo_info};
pub use github::{GitHubService, build_merge_input};
pub use selector::PrSelector;

use crate::error::Result;
use crate::types::{MergeCapabilities, MergeMessage, MergeMethod, MergeRequest, PullRequest, Repository};
use async_trait::async_trait;

/// Looks up the pull request a command operates on
#[async_trait]
pub trait PullRequestFinder: Send + Sync {
    /// Find a pull request by number, URL or head branch name
    ///
    /// Returns the pull request together with the repository that owns it,
    /// which may differ from the configured one when a URL is given.
    async fn find_pr(&self, selector: &PrSelector) -> Result<(PullRequest, Repository)>;
}

/// Remote merge operations
///
/// Every method is a single remote call. Nothing is retried; errors are
/// returned to the caller unchanged.
#[async_trait]
pub trait PlatformService: Send + Sync {
    /// Merge a pull request now
    async fn merge_pr(&self, request: &MergeRequest) -> Result<()>;

    /// Enable auto-merge, or enqueue when the base branch uses a merge queue
    async fn enable_auto_merge(&self, request: &MergeRequest) -> Result<()>;

    /// Disable auto-merge
    async fn disable_auto_merge(&self, pr_id: &str) -> Result<()>;

    /// Delete a branch on the remote
    ///
    /// A branch that no longer exists counts as deleted.
    async fn delete_remote_branch(&self, repo: &Repository, branch: &str) -> Result<()>;

    /// Fetch allowed merge methods and the merge queue method for `base_branch`
    async fn fetch_merge_capabilities(
        &self,
        repo: &Repository,
        base_branch: &str,
    ) -> Result<MergeCapabilities>;

    /// Fetch the commit headline/body the server would use for `method`
    async fn fetch_merge_message_defaults(
        &self,
        pr_id: &str,
        method: MergeMethod,
    ) -> Result<MergeMessage>;
}
