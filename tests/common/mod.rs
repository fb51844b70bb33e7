//! Shared test fixtures
//!
//! These are test utilities - not all may be used in every test binary.

#![allow(dead_code)]

mod mock_platform;

pub use mock_platform::{DeleteBranchCall, MockPlatformService};

use async_trait::async_trait;
use prmerge::error::{Error, Result};
use prmerge::interact::{Prompter, TextEditor};
use prmerge::merge::ProgressCallback;
use prmerge::repo::LocalBranchManager;
use prmerge::types::{MergeStateStatus, PrCommit, PrState, PullRequest, Repository};
use std::collections::VecDeque;
use std::path::Path;
use std::process::Command;
use std::sync::Mutex;
use tempfile::TempDir;

/// Base repository used throughout the tests
pub fn github_config() -> Repository {
    Repository::new("acme", "widgets")
}

/// An open, CLEAN pull request from `head` into `main` in the same repository
pub fn make_pr(number: u64, head: &str, title: &str) -> PullRequest {
    PullRequest {
        id: format!("PR_node{number}"),
        number,
        title: title.to_string(),
        state: PrState::Open,
        merge_state_status: MergeStateStatus::Clean,
        head_ref: head.to_string(),
        base_ref: "main".to_string(),
        head_repository_owner: "acme".to_string(),
        is_in_merge_queue: false,
        is_merge_queue_enabled: false,
        commits: vec![PrCommit {
            oid: "1111111111111111111111111111111111111111".to_string(),
        }],
    }
}

/// Same as [`make_pr`], with the head branch in someone else's fork
pub fn make_fork_pr(number: u64, head: &str, title: &str) -> PullRequest {
    PullRequest {
        head_repository_owner: "contributor".to_string(),
        ..make_pr(number, head, title)
    }
}

// =============================================================================
// Local git mock
// =============================================================================

/// In-memory stand-in for a local checkout
pub struct MockGit {
    current: Mutex<Option<String>>,
    branches: Mutex<Vec<String>>,
    head_hash: Mutex<String>,
    calls: Mutex<Vec<String>>,
    fail_checkout: Mutex<Option<String>>,
    fail_delete: Mutex<Option<String>>,
    fail_pull: Mutex<Option<String>>,
}

impl MockGit {
    /// Checkout of `current` with the given local branches
    pub fn new(current: Option<&str>, branches: &[&str]) -> Self {
        Self {
            current: Mutex::new(current.map(str::to_string)),
            branches: Mutex::new(branches.iter().map(|b| (*b).to_string()).collect()),
            head_hash: Mutex::new("1111111111111111111111111111111111111111".to_string()),
            calls: Mutex::new(Vec::new()),
            fail_checkout: Mutex::new(None),
            fail_delete: Mutex::new(None),
            fail_pull: Mutex::new(None),
        }
    }

    pub fn set_head_hash(&self, hash: &str) {
        *self.head_hash.lock().unwrap() = hash.to_string();
    }

    pub fn fail_checkout(&self, msg: &str) {
        *self.fail_checkout.lock().unwrap() = Some(msg.to_string());
    }

    pub fn fail_delete(&self, msg: &str) {
        *self.fail_delete.lock().unwrap() = Some(msg.to_string());
    }

    pub fn fail_pull(&self, msg: &str) {
        *self.fail_pull.lock().unwrap() = Some(msg.to_string());
    }

    /// Mutating commands run so far, in git syntax
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn current(&self) -> Option<String> {
        self.current.lock().unwrap().clone()
    }

    pub fn branches(&self) -> Vec<String> {
        self.branches.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn injected(slot: &Mutex<Option<String>>) -> Result<()> {
        match slot.lock().unwrap().as_ref() {
            Some(msg) => Err(Error::Git(msg.clone())),
            None => Ok(()),
        }
    }
}

impl LocalBranchManager for MockGit {
    fn current_branch(&self) -> Result<Option<String>> {
        Ok(self.current())
    }

    fn has_local_branch(&self, branch: &str) -> Result<bool> {
        Ok(self.branches.lock().unwrap().iter().any(|b| b == branch))
    }

    fn checkout(&self, branch: &str) -> Result<()> {
        self.record(format!("checkout {branch}"));
        Self::injected(&self.fail_checkout)?;
        if !self.has_local_branch(branch)? {
            return Err(Error::Git(format!("pathspec '{branch}' did not match")));
        }
        *self.current.lock().unwrap() = Some(branch.to_string());
        Ok(())
    }

    fn checkout_new_tracking(&self, branch: &str, remote_ref: &str) -> Result<()> {
        self.record(format!("checkout -b {branch} --track {remote_ref}"));
        Self::injected(&self.fail_checkout)?;
        self.branches.lock().unwrap().push(branch.to_string());
        *self.current.lock().unwrap() = Some(branch.to_string());
        Ok(())
    }

    fn delete_local_branch(&self, branch: &str) -> Result<()> {
        self.record(format!("branch -D {branch}"));
        Self::injected(&self.fail_delete)?;
        if self.current().as_deref() == Some(branch) {
            return Err(Error::Git(format!(
                "cannot delete branch '{branch}' checked out"
            )));
        }
        self.branches.lock().unwrap().retain(|b| b != branch);
        Ok(())
    }

    fn pull_fast_forward(&self, remote: &str, branch: &str) -> Result<()> {
        self.record(format!("pull --ff-only {remote} {branch}"));
        Self::injected(&self.fail_pull)
    }

    fn commit_hash(&self, _rev: &str) -> Result<String> {
        Ok(self.head_hash.lock().unwrap().clone())
    }
}

// =============================================================================
// Scripted interaction
// =============================================================================

/// Answers prompts from a script, failing on anything unscripted
#[derive(Default)]
pub struct ScriptedPrompter {
    confirms: Mutex<VecDeque<(String, bool)>>,
    selects: Mutex<VecDeque<(String, usize)>>,
    asked: Mutex<Vec<String>>,
}

impl ScriptedPrompter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer the next confirm whose prompt contains `expected`
    pub fn on_confirm(self, expected: &str, answer: bool) -> Self {
        self.confirms
            .lock()
            .unwrap()
            .push_back((expected.to_string(), answer));
        self
    }

    /// Answer the next select whose prompt contains `expected` with option `index`
    pub fn on_select(self, expected: &str, index: usize) -> Self {
        self.selects
            .lock()
            .unwrap()
            .push_back((expected.to_string(), index));
        self
    }

    /// Prompts shown so far
    pub fn asked(&self) -> Vec<String> {
        self.asked.lock().unwrap().clone()
    }
}

impl Prompter for ScriptedPrompter {
    fn confirm(&self, prompt: &str, _default: bool) -> Result<bool> {
        self.asked.lock().unwrap().push(prompt.to_string());
        match self.confirms.lock().unwrap().pop_front() {
            Some((expected, answer)) if prompt.contains(&expected) => Ok(answer),
            _ => Err(Error::Prompt(format!("no such prompt: {prompt}"))),
        }
    }

    fn select(&self, prompt: &str, _default: Option<usize>, options: &[&str]) -> Result<usize> {
        self.asked.lock().unwrap().push(prompt.to_string());
        match self.selects.lock().unwrap().pop_front() {
            Some((expected, index)) if prompt.contains(&expected) && index < options.len() => {
                Ok(index)
            }
            _ => Err(Error::Prompt(format!("no such prompt: {prompt}"))),
        }
    }
}

/// Returns scripted editor results and records what was opened
#[derive(Default)]
pub struct ScriptedEditor {
    results: Mutex<VecDeque<String>>,
    opened: Mutex<Vec<(String, String)>>,
}

impl ScriptedEditor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the text the next edit returns
    pub fn returning(self, text: &str) -> Self {
        self.results.lock().unwrap().push_back(text.to_string());
        self
    }

    /// `(file_name, initial_text)` for each edit
    pub fn opened(&self) -> Vec<(String, String)> {
        self.opened.lock().unwrap().clone()
    }
}

impl TextEditor for ScriptedEditor {
    fn edit(&self, file_name: &str, text: &str) -> Result<String> {
        self.opened
            .lock()
            .unwrap()
            .push((file_name.to_string(), text.to_string()));
        self.results
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| Error::Prompt("unexpected editor session".to_string()))
    }
}

/// Collects status lines
#[derive(Default)]
pub struct RecordingProgress {
    successes: Mutex<Vec<String>>,
    warnings: Mutex<Vec<String>>,
}

impl RecordingProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn successes(&self) -> Vec<String> {
        self.successes.lock().unwrap().clone()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.warnings.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProgressCallback for RecordingProgress {
    async fn on_success(&self, message: &str) {
        self.successes.lock().unwrap().push(message.to_string());
    }

    async fn on_warning(&self, message: &str) {
        self.warnings.lock().unwrap().push(message.to_string());
    }
}

// =============================================================================
// Real git fixture
// =============================================================================

/// Temporary git repository with one commit on `main`
pub struct TempGitRepo {
    pub dir: TempDir,
}

impl TempGitRepo {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        let repo = Self { dir };
        repo.git(&["init", "--quiet"]);
        repo.git(&["symbolic-ref", "HEAD", "refs/heads/main"]);
        repo.git(&["config", "user.email", "test@example.com"]);
        repo.git(&["config", "user.name", "Test"]);
        repo.git(&["config", "commit.gpgsign", "false"]);
        std::fs::write(repo.path().join("README.md"), "hello\n").expect("write failed");
        repo.git(&["add", "README.md"]);
        repo.git(&["commit", "--quiet", "-m", "initial"]);
        repo
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Run git in the repository, panicking on failure
    pub fn git(&self, args: &[&str]) -> String {
        let output = Command::new("git")
            .args(args)
            .current_dir(self.path())
            .output()
            .expect("failed to run git");
        assert!(
            output.status.success(),
            "git {} failed: {}",
            args.join(" "),
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    }
}
