//! Merge engine for a single pull request
//!
//! Three-phase pattern:
//! 1. Gather - fetch the PR snapshot and resolve caller intent (effectful, bounded)
//! 2. Classify - choose exactly one `MergeAction` (pure, testable)
//! 3. Execute - merge, enqueue or toggle auto-merge, then clean up branches (effectful)

mod cleanup;
mod execute;
mod message;
mod method;
mod options;
mod plan;
mod progress;

pub use cleanup::{
    BaseSwitch, BranchDeletionPlan, CleanupReport, CleanupRunner, LocalState, StepOutcome,
    plan_branch_cleanup, resolve_delete_intent,
};
pub use execute::{MergeEnvironment, MergeOutcome, execute_merge, run_merge};
pub use message::{CommitMessage, Composer, SubmitAction};
pub use method::{
    MethodResolver, MethodSource, ResolvedMethod, method_from_flags, survey_merge_method,
};
pub use options::MergeOptions;
pub use plan::{BlockReason, MergeAction, MergeInputs, classify, classify_merge};
pub use progress::{NoopProgress, ProgressCallback};
