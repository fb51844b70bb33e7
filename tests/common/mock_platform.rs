//! Mock platform service for testing
//!
//! These are test utilities - not all may be used in every test binary.

#![allow(dead_code)]

use async_trait::async_trait;
use prmerge::error::{Error, Result};
use prmerge::platform::{PlatformService, PrSelector, PullRequestFinder};
use prmerge::types::{
    MergeCapabilities, MergeMessage, MergeMethod, MergeRequest, PullRequest, Repository,
};
use std::sync::Mutex;

/// Call record for `delete_remote_branch`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteBranchCall {
    pub repo: String,
    pub branch: String,
}

/// Simple mock platform service for testing
///
/// This manually implements both `PullRequestFinder` and `PlatformService`
/// rather than using mockall, so call logs can be inspected directly.
///
/// Features:
/// - A single configurable pull request for the finder
/// - Call tracking for verification
/// - Configurable capabilities and message defaults
/// - Error injection for failure path testing
pub struct MockPlatformService {
    config: Repository,
    pr: Mutex<Option<PullRequest>>,
    pr_repo: Mutex<Option<Repository>>,
    capabilities: Mutex<MergeCapabilities>,
    message_defaults: Mutex<MergeMessage>,
    // Call tracking
    find_pr_calls: Mutex<Vec<PrSelector>>,
    merge_pr_calls: Mutex<Vec<MergeRequest>>,
    enable_auto_calls: Mutex<Vec<MergeRequest>>,
    disable_auto_calls: Mutex<Vec<String>>,
    delete_branch_calls: Mutex<Vec<DeleteBranchCall>>,
    capabilities_calls: Mutex<Vec<String>>,
    message_defaults_calls: Mutex<Vec<MergeMethod>>,
    // Error injection
    error_on_merge_pr: Mutex<Option<String>>,
    error_on_enable_auto: Mutex<Option<String>>,
    error_on_delete_branch: Mutex<Option<String>>,
}

impl MockPlatformService {
    /// Create a new mock with the given base repository
    pub fn with_config(config: Repository) -> Self {
        Self {
            config,
            pr: Mutex::new(None),
            pr_repo: Mutex::new(None),
            capabilities: Mutex::new(MergeCapabilities {
                merge_commit_allowed: true,
                rebase_merge_allowed: true,
                squash_merge_allowed: true,
                merge_queue_method: None,
            }),
            message_defaults: Mutex::new(MergeMessage::default()),
            find_pr_calls: Mutex::new(Vec::new()),
            merge_pr_calls: Mutex::new(Vec::new()),
            enable_auto_calls: Mutex::new(Vec::new()),
            disable_auto_calls: Mutex::new(Vec::new()),
            delete_branch_calls: Mutex::new(Vec::new()),
            capabilities_calls: Mutex::new(Vec::new()),
            message_defaults_calls: Mutex::new(Vec::new()),
            error_on_merge_pr: Mutex::new(None),
            error_on_enable_auto: Mutex::new(None),
            error_on_delete_branch: Mutex::new(None),
        }
    }

    // === Setup ===

    /// Pull request returned by `find_pr`
    pub fn set_pr(&self, pr: PullRequest) {
        *self.pr.lock().unwrap() = Some(pr);
    }

    /// Repository returned alongside the pull request (default: the config)
    pub fn set_pr_repo(&self, repo: Repository) {
        *self.pr_repo.lock().unwrap() = Some(repo);
    }

    /// Response for `fetch_merge_capabilities`
    pub fn set_capabilities(&self, capabilities: MergeCapabilities) {
        *self.capabilities.lock().unwrap() = capabilities;
    }

    /// Response for `fetch_merge_message_defaults`
    pub fn set_message_defaults(&self, headline: &str, body: &str) {
        *self.message_defaults.lock().unwrap() = MergeMessage {
            headline: headline.to_string(),
            body: body.to_string(),
        };
    }

    // === Error injection methods ===

    /// Make `merge_pr` return an error
    pub fn fail_merge_pr(&self, msg: &str) {
        *self.error_on_merge_pr.lock().unwrap() = Some(msg.to_string());
    }

    /// Make `enable_auto_merge` return an error
    pub fn fail_enable_auto(&self, msg: &str) {
        *self.error_on_enable_auto.lock().unwrap() = Some(msg.to_string());
    }

    /// Make `delete_remote_branch` return an error
    pub fn fail_delete_branch(&self, msg: &str) {
        *self.error_on_delete_branch.lock().unwrap() = Some(msg.to_string());
    }

    // === Call inspection ===

    pub fn get_find_pr_calls(&self) -> Vec<PrSelector> {
        self.find_pr_calls.lock().unwrap().clone()
    }

    pub fn get_merge_pr_calls(&self) -> Vec<MergeRequest> {
        self.merge_pr_calls.lock().unwrap().clone()
    }

    pub fn get_enable_auto_calls(&self) -> Vec<MergeRequest> {
        self.enable_auto_calls.lock().unwrap().clone()
    }

    pub fn get_disable_auto_calls(&self) -> Vec<String> {
        self.disable_auto_calls.lock().unwrap().clone()
    }

    pub fn get_delete_branch_calls(&self) -> Vec<DeleteBranchCall> {
        self.delete_branch_calls.lock().unwrap().clone()
    }

    pub fn get_capabilities_calls(&self) -> Vec<String> {
        self.capabilities_calls.lock().unwrap().clone()
    }

    pub fn get_message_defaults_calls(&self) -> Vec<MergeMethod> {
        self.message_defaults_calls.lock().unwrap().clone()
    }

    /// Number of calls that change something on the remote
    pub fn mutation_count(&self) -> usize {
        self.merge_pr_calls.lock().unwrap().len()
            + self.enable_auto_calls.lock().unwrap().len()
            + self.disable_auto_calls.lock().unwrap().len()
            + self.delete_branch_calls.lock().unwrap().len()
    }

    /// Number of calls of any kind, lookups included
    pub fn total_call_count(&self) -> usize {
        self.mutation_count()
            + self.find_pr_calls.lock().unwrap().len()
            + self.capabilities_calls.lock().unwrap().len()
            + self.message_defaults_calls.lock().unwrap().len()
    }

    // === Assertions ===

    pub fn assert_merge_called_with_method(&self, pr_id: &str, method: MergeMethod) {
        let calls = self.get_merge_pr_calls();
        assert!(
            calls.iter().any(|c| c.pr_id == pr_id && c.method == method),
            "expected merge_pr({pr_id}, {method}), got: {calls:?}"
        );
    }

    pub fn assert_merge_not_called(&self) {
        let calls = self.get_merge_pr_calls();
        assert!(calls.is_empty(), "expected no merge_pr calls, got: {calls:?}");
    }

    pub fn assert_remote_delete_called(&self, branch: &str) {
        let calls = self.get_delete_branch_calls();
        assert!(
            calls.iter().any(|c| c.branch == branch),
            "expected delete_remote_branch({branch}), got: {calls:?}"
        );
    }

    pub fn assert_remote_delete_not_called(&self) {
        let calls = self.get_delete_branch_calls();
        assert!(
            calls.is_empty(),
            "expected no delete_remote_branch calls, got: {calls:?}"
        );
    }

    pub fn assert_no_calls(&self) {
        assert_eq!(self.total_call_count(), 0, "expected no platform calls");
    }
}

#[async_trait]
impl PullRequestFinder for MockPlatformService {
    async fn find_pr(&self, selector: &PrSelector) -> Result<(PullRequest, Repository)> {
        self.find_pr_calls.lock().unwrap().push(selector.clone());
        let pr = self
            .pr
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| Error::PullRequestNotFound(selector.to_string()))?;
        let repo = self
            .pr_repo
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| self.config.clone());
        Ok((pr, repo))
    }
}

#[async_trait]
impl PlatformService for MockPlatformService {
    async fn merge_pr(&self, request: &MergeRequest) -> Result<()> {
        self.merge_pr_calls.lock().unwrap().push(request.clone());
        if let Some(msg) = self.error_on_merge_pr.lock().unwrap().as_ref() {
            return Err(Error::GitHubApi(msg.clone()));
        }
        Ok(())
    }

    async fn enable_auto_merge(&self, request: &MergeRequest) -> Result<()> {
        self.enable_auto_calls.lock().unwrap().push(request.clone());
        if let Some(msg) = self.error_on_enable_auto.lock().unwrap().as_ref() {
            return Err(Error::GitHubApi(msg.clone()));
        }
        Ok(())
    }

    async fn disable_auto_merge(&self, pr_id: &str) -> Result<()> {
        self.disable_auto_calls
            .lock()
            .unwrap()
            .push(pr_id.to_string());
        Ok(())
    }

    async fn delete_remote_branch(&self, repo: &Repository, branch: &str) -> Result<()> {
        self.delete_branch_calls.lock().unwrap().push(DeleteBranchCall {
            repo: repo.full_name(),
            branch: branch.to_string(),
        });
        if let Some(msg) = self.error_on_delete_branch.lock().unwrap().as_ref() {
            return Err(Error::GitHubApi(msg.clone()));
        }
        Ok(())
    }

    async fn fetch_merge_capabilities(
        &self,
        _repo: &Repository,
        base_branch: &str,
    ) -> Result<MergeCapabilities> {
        self.capabilities_calls
            .lock()
            .unwrap()
            .push(base_branch.to_string());
        Ok(self.capabilities.lock().unwrap().clone())
    }

    async fn fetch_merge_message_defaults(
        &self,
        _pr_id: &str,
        method: MergeMethod,
    ) -> Result<MergeMessage> {
        self.message_defaults_calls.lock().unwrap().push(method);
        Ok(self.message_defaults.lock().unwrap().clone())
    }
}
