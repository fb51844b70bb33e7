//! Branch cleanup after a merge
//!
//! Planning is pure; execution runs each step on its own so a failure in one
//! never undoes or skips the others.

use crate::error::Result;
use crate::interact::Prompter;
use crate::merge::progress::ProgressCallback;
use crate::platform::PlatformService;
use crate::repo::LocalBranchManager;
use crate::types::{PullRequest, Repository};
use tracing::debug;

/// Local checkout state relevant to cleanup
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalState {
    /// Currently checked-out branch
    pub current_branch: Option<String>,
    /// PR head branch exists locally
    pub head_exists: bool,
    /// PR base branch exists locally
    pub base_exists: bool,
}

impl LocalState {
    /// Read the state from a local checkout
    pub fn inspect(git: &dyn LocalBranchManager, pr: &PullRequest) -> Result<Self> {
        Ok(Self {
            current_branch: git.current_branch()?,
            head_exists: git.has_local_branch(&pr.head_ref)?,
            base_exists: git.has_local_branch(&pr.base_ref)?,
        })
    }
}

/// Switching off the branch about to be deleted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseSwitch {
    /// Branch to switch to
    pub branch: String,
    /// Remote ref to create a tracking branch from, when none exists locally
    pub create_from: Option<String>,
}

/// Which cleanup steps apply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchDeletionPlan {
    /// Branch being cleaned up
    pub branch: String,
    /// Switch to the base branch first
    pub switch_to_base: Option<BaseSwitch>,
    /// Delete the local branch
    pub delete_local: bool,
    /// Delete the remote branch
    pub delete_remote: bool,
}

impl BranchDeletionPlan {
    /// A plan that does nothing
    pub fn empty(branch: &str) -> Self {
        Self {
            branch: branch.to_string(),
            switch_to_base: None,
            delete_local: false,
            delete_remote: false,
        }
    }

    /// Whether no step applies
    pub const fn is_empty(&self) -> bool {
        self.switch_to_base.is_none() && !self.delete_local && !self.delete_remote
    }
}

/// Outcome of one cleanup step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// Step did not apply
    Skipped,
    /// Step succeeded
    Done,
    /// Step failed with this message
    Failed(String),
}

impl StepOutcome {
    /// Whether the step failed
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Per-step result of branch cleanup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupReport {
    /// The plan that was executed
    pub plan: BranchDeletionPlan,
    /// Switching to the base branch
    pub switch: StepOutcome,
    /// Fast-forwarding the base branch (a failure here is only a warning)
    pub pull: StepOutcome,
    /// Deleting the local branch
    pub local_delete: StepOutcome,
    /// Deleting the remote branch
    pub remote_delete: StepOutcome,
}

impl CleanupReport {
    fn skipped(plan: BranchDeletionPlan) -> Self {
        Self {
            plan,
            switch: StepOutcome::Skipped,
            pull: StepOutcome::Skipped,
            local_delete: StepOutcome::Skipped,
            remote_delete: StepOutcome::Skipped,
        }
    }

    /// Whether every step that ran succeeded
    pub const fn is_success(&self) -> bool {
        !self.switch.is_failed() && !self.local_delete.is_failed() && !self.remote_delete.is_failed()
    }

    /// Failure messages, in step order
    pub fn failures(&self) -> Vec<String> {
        [&self.switch, &self.local_delete, &self.remote_delete]
            .into_iter()
            .filter_map(|s| match s {
                StepOutcome::Failed(msg) => Some(msg.clone()),
                _ => None,
            })
            .collect()
    }
}

/// Build the cleanup plan (PURE)
///
/// `local` is `None` when there is no local checkout to touch. Remote
/// deletion is never planned for a head branch in someone else's fork.
#[must_use]
pub fn plan_branch_cleanup(
    pr: &PullRequest,
    repo: &Repository,
    delete: bool,
    local: Option<&LocalState>,
    remote_name: &str,
) -> BranchDeletionPlan {
    if !delete {
        return BranchDeletionPlan::empty(&pr.head_ref);
    }

    let delete_local = local.is_some_and(|l| l.head_exists);
    let switch_to_base = local
        .filter(|l| delete_local && l.current_branch.as_deref() == Some(pr.head_ref.as_str()))
        .map(|l| BaseSwitch {
            branch: pr.base_ref.clone(),
            create_from: (!l.base_exists).then(|| format!("{remote_name}/{}", pr.base_ref)),
        });

    BranchDeletionPlan {
        branch: pr.head_ref.clone(),
        switch_to_base,
        delete_local,
        delete_remote: !pr.is_cross_repository(repo),
    }
}

/// Decide whether to delete the branch
///
/// An explicit flag wins. Otherwise an interactive session is asked, with
/// "yes" as the default unless the branch lives in a fork. Without a prompt
/// nothing is deleted.
pub fn resolve_delete_intent(
    pr: &PullRequest,
    repo: &Repository,
    explicit: Option<bool>,
    already_merged: bool,
    local_head_exists: bool,
    interactive: bool,
    prompter: &dyn Prompter,
) -> Result<bool> {
    if let Some(delete) = explicit {
        return Ok(delete);
    }
    if !interactive {
        return Ok(false);
    }

    let fork = pr.is_cross_repository(repo);
    let question = match (local_head_exists, fork) {
        (true, true) => "Delete the branch locally?",
        (true, false) => "Delete the branch locally and on GitHub?",
        (false, false) => "Delete the branch on GitHub?",
        // Nothing this command may delete
        (false, true) => return Ok(false),
    };
    let prompt = if already_merged {
        format!(
            "Pull request {} was already merged. {question}",
            pr.reference(repo)
        )
    } else {
        question.to_string()
    };

    prompter.confirm(&prompt, !fork)
}

/// Collaborators used to carry out a cleanup plan
pub struct CleanupRunner<'a> {
    /// Remote branch deletion
    pub platform: &'a dyn PlatformService,
    /// Local checkout, if any
    pub git: Option<&'a dyn LocalBranchManager>,
    /// Status lines
    pub progress: &'a dyn ProgressCallback,
    /// Remote to pull from
    pub remote_name: &'a str,
}

impl CleanupRunner<'_> {
    /// Execute `plan`, reporting each step independently
    pub async fn execute(&self, plan: BranchDeletionPlan, repo: &Repository) -> CleanupReport {
        let mut report = CleanupReport::skipped(plan.clone());
        if plan.is_empty() {
            return report;
        }

        if let (Some(git), Some(switch)) = (self.git, &plan.switch_to_base) {
            let (switch_outcome, pull_outcome) = self.switch_to_base(git, switch).await;
            report.switch = switch_outcome;
            report.pull = pull_outcome;
        }

        if let (Some(git), true) = (self.git, plan.delete_local) {
            report.local_delete = match git.delete_local_branch(&plan.branch) {
                Ok(()) => {
                    self.progress
                        .on_success(&format!("Deleted local branch {}", plan.branch))
                        .await;
                    StepOutcome::Done
                }
                Err(e) => {
                    let msg = format!("failed to delete local branch {}: {e}", plan.branch);
                    self.progress.on_warning(&msg).await;
                    StepOutcome::Failed(msg)
                }
            };
        }

        if plan.delete_remote {
            report.remote_delete = match self.platform.delete_remote_branch(repo, &plan.branch).await {
                Ok(()) => {
                    self.progress
                        .on_success(&format!("Deleted remote branch {}", plan.branch))
                        .await;
                    StepOutcome::Done
                }
                Err(e) => {
                    let msg = format!("failed to delete remote branch {}: {e}", plan.branch);
                    self.progress.on_warning(&msg).await;
                    StepOutcome::Failed(msg)
                }
            };
        }

        debug!(?report, "branch cleanup finished");
        report
    }

    async fn switch_to_base(
        &self,
        git: &dyn LocalBranchManager,
        switch: &BaseSwitch,
    ) -> (StepOutcome, StepOutcome) {
        let checkout = match &switch.create_from {
            Some(remote_ref) => git.checkout_new_tracking(&switch.branch, remote_ref),
            None => git.checkout(&switch.branch),
        };
        if let Err(e) = checkout {
            let msg = format!("failed to switch to branch {}: {e}", switch.branch);
            self.progress.on_warning(&msg).await;
            return (StepOutcome::Failed(msg), StepOutcome::Skipped);
        }
        self.progress
            .on_success(&format!("Switched to branch {}", switch.branch))
            .await;

        let pull = match git.pull_fast_forward(self.remote_name, &switch.branch) {
            Ok(()) => StepOutcome::Done,
            Err(e) => {
                let msg = format!("not possible to fast-forward to {}: {e}", switch.branch);
                self.progress.on_warning(&msg).await;
                StepOutcome::Failed(msg)
            }
        };
        (StepOutcome::Done, pull)
    }
}
