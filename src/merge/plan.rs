//! Merge classification - pure functions for choosing the merge action
//!
//! This module contains the pure, testable logic that maps a pull request
//! snapshot and the caller's intent to exactly one `MergeAction`.
//! No I/O happens here - all data is passed in, making it easy to unit test.

use crate::merge::options::MergeOptions;
use crate::types::{MergeStateStatus, PrState, PullRequest};

/// Why a pull request cannot be merged right now
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockReason {
    /// Base branch protection prohibits the merge
    BasePolicy,
    /// Head branch is behind the base branch
    Behind,
    /// No clean merge commit can be created
    Dirty,
    /// PR was closed without merging
    Closed,
    /// Branch deletion requested although the merge queue owns the branch
    DeleteBranchWithQueue,
}

impl BlockReason {
    /// Human-readable reason, phrased to follow "is not mergeable: "
    pub const fn describe(self) -> &'static str {
        match self {
            Self::BasePolicy => "the base branch policy prohibits the merge",
            Self::Behind => "the head branch is not up to date with the base branch",
            Self::Dirty => "the merge commit cannot be cleanly created",
            Self::Closed => "the pull request is closed",
            Self::DeleteBranchWithQueue => "the merge queue manages the head branch",
        }
    }
}

/// The single action taken for one merge invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeAction {
    /// Merge now
    DirectMerge,
    /// Add to the merge queue
    EnqueueToQueue,
    /// Turn on auto-merge
    EnableAutoMerge,
    /// Turn off auto-merge
    DisableAutoMerge,
    /// Already merged; only clean up branches
    ReportAlreadyMerged,
    /// Refuse with a reason
    ReportBlocked(BlockReason),
    /// Already in the merge queue; nothing to do
    ReportAlreadyQueued,
}

impl MergeAction {
    /// Whether branch cleanup follows this action
    pub const fn runs_cleanup(self) -> bool {
        matches!(
            self,
            Self::DirectMerge | Self::EnqueueToQueue | Self::ReportAlreadyMerged
        )
    }

    /// Whether this action calls the remote service
    pub const fn mutates_remote(self) -> bool {
        matches!(
            self,
            Self::DirectMerge | Self::EnqueueToQueue | Self::EnableAutoMerge | Self::DisableAutoMerge
        )
    }
}

impl std::fmt::Display for MergeAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DirectMerge => write!(f, "merge"),
            Self::EnqueueToQueue => write!(f, "add to merge queue"),
            Self::EnableAutoMerge => write!(f, "enable auto-merge"),
            Self::DisableAutoMerge => write!(f, "disable auto-merge"),
            Self::ReportAlreadyMerged => write!(f, "already merged"),
            Self::ReportBlocked(reason) => write!(f, "blocked: {}", reason.describe()),
            Self::ReportAlreadyQueued => write!(f, "already queued"),
        }
    }
}

/// Every input axis the classification depends on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct MergeInputs {
    /// PR state
    pub state: PrState,
    /// Server-computed mergeability
    pub status: MergeStateStatus,
    /// PR is in the merge queue
    pub in_merge_queue: bool,
    /// Base branch requires the merge queue
    pub merge_queue_enabled: bool,
    /// `--admin`
    pub admin: bool,
    /// `--delete-branch` given and true
    pub delete_branch_requested: bool,
    /// `--auto`
    pub auto_merge: bool,
    /// `--disable-auto`
    pub disable_auto_merge: bool,
}

impl MergeInputs {
    /// Collect the inputs from a PR snapshot and the caller's options
    pub const fn new(pr: &PullRequest, options: &MergeOptions) -> Self {
        Self {
            state: pr.state,
            status: pr.merge_state_status,
            in_merge_queue: pr.is_in_merge_queue,
            merge_queue_enabled: pr.is_merge_queue_enabled,
            admin: options.admin,
            delete_branch_requested: options.delete_branch_requested(),
            auto_merge: options.auto_merge,
            disable_auto_merge: options.disable_auto_merge,
        }
    }
}

/// Choose the merge action (PURE - no I/O, easily testable)
///
/// Precedence, first match wins:
/// 1. merged PRs only get branch cleanup
/// 2. queued PRs are left alone
/// 3. closed PRs are refused
/// 4. branch deletion conflicts with a merge queue
/// 5. disabling auto-merge works in any open state
/// 6. queue-enabled branches enqueue unless `--admin` bypasses the queue
/// 7. enabling auto-merge works in any open state
/// 8. BLOCKED/BEHIND are refused unless `--admin`; DIRTY is always refused
/// 9. otherwise merge directly
#[must_use]
pub const fn classify_merge(inputs: &MergeInputs) -> MergeAction {
    if matches!(inputs.state, PrState::Merged) {
        return MergeAction::ReportAlreadyMerged;
    }
    if inputs.in_merge_queue {
        return MergeAction::ReportAlreadyQueued;
    }
    if matches!(inputs.state, PrState::Closed) {
        return MergeAction::ReportBlocked(BlockReason::Closed);
    }
    if inputs.delete_branch_requested && inputs.merge_queue_enabled {
        return MergeAction::ReportBlocked(BlockReason::DeleteBranchWithQueue);
    }
    if inputs.disable_auto_merge {
        return MergeAction::DisableAutoMerge;
    }
    if inputs.merge_queue_enabled && !inputs.admin {
        return MergeAction::EnqueueToQueue;
    }
    if inputs.auto_merge {
        return MergeAction::EnableAutoMerge;
    }

    match inputs.status {
        MergeStateStatus::Dirty => MergeAction::ReportBlocked(BlockReason::Dirty),
        MergeStateStatus::Blocked if !inputs.admin => {
            MergeAction::ReportBlocked(BlockReason::BasePolicy)
        }
        MergeStateStatus::Behind if !inputs.admin => MergeAction::ReportBlocked(BlockReason::Behind),
        _ => MergeAction::DirectMerge,
    }
}

/// Convenience wrapper over [`classify_merge`]
#[must_use]
pub const fn classify(pr: &PullRequest, options: &MergeOptions) -> MergeAction {
    classify_merge(&MergeInputs::new(pr, options))
}
