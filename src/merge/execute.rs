//! Merge execution - effectful operations
//!
//! This module contains the effectful code that actually performs merges.
//! It takes the `MergeAction` chosen by the pure classification and carries
//! it out against the platform, then runs branch cleanup.

use crate::error::{Error, Result};
use crate::interact::{Prompter, TextEditor};
use crate::merge::cleanup::{
    BranchDeletionPlan, CleanupReport, CleanupRunner, LocalState, plan_branch_cleanup,
    resolve_delete_intent,
};
use crate::merge::message::{CommitMessage, Composer};
use crate::merge::method::{MethodResolver, MethodSource, ResolvedMethod};
use crate::merge::options::MergeOptions;
use crate::merge::plan::{BlockReason, MergeAction, classify};
use crate::merge::progress::ProgressCallback;
use crate::platform::{PlatformService, PrSelector, PullRequestFinder};
use crate::repo::LocalBranchManager;
use crate::types::{MergeMethod, MergeRequest, MergeStateStatus, PullRequest, Repository};
use tracing::debug;

/// Collaborators for one merge invocation
pub struct MergeEnvironment<'a> {
    /// Remote merge operations
    pub platform: &'a dyn PlatformService,
    /// Local checkout; `None` when operating on a repository not checked out here
    pub git: Option<&'a dyn LocalBranchManager>,
    /// Interactive questions
    pub prompter: &'a dyn Prompter,
    /// Commit message editing
    pub editor: &'a dyn TextEditor,
    /// Status lines
    pub progress: &'a dyn ProgressCallback,
    /// Whether prompts may be shown
    pub interactive: bool,
    /// Git remote that tracks the base repository
    pub remote_name: String,
}

/// Result of a merge invocation
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    /// The action taken
    pub action: MergeAction,
    /// Method used, for actions that have one
    pub method: Option<MergeMethod>,
    /// Branch cleanup results, for actions followed by cleanup
    pub cleanup: Option<CleanupReport>,
}

impl MergeOutcome {
    /// Whether the merge and every cleanup step succeeded
    pub fn is_success(&self) -> bool {
        self.cleanup.as_ref().is_none_or(CleanupReport::is_success)
    }
}

/// Validate options, find the pull request and merge it (EFFECTFUL)
///
/// Flag conflicts are reported before the finder or any other collaborator
/// is touched.
pub async fn run_merge(
    env: &MergeEnvironment<'_>,
    finder: &dyn PullRequestFinder,
    options: &MergeOptions,
) -> Result<MergeOutcome> {
    options.validate()?;

    let selector = match options.selector.as_deref() {
        Some(arg) => PrSelector::parse(arg)?,
        None => PrSelector::Branch(current_branch(env)?),
    };

    debug!(%selector, "looking up pull request");
    let (pr, repo) = finder.find_pr(&selector).await?;
    execute_merge(env, &pr, &repo, options).await
}

fn current_branch(env: &MergeEnvironment<'_>) -> Result<String> {
    let no_branch = || {
        Error::InvalidArgument(
            "could not determine the current branch; specify a pull request number, URL, or branch"
                .to_string(),
        )
    };
    env.git.ok_or_else(no_branch)?.current_branch()?.ok_or_else(no_branch)
}

/// Carry out the merge for an already-fetched pull request (EFFECTFUL)
pub async fn execute_merge(
    env: &MergeEnvironment<'_>,
    pr: &PullRequest,
    repo: &Repository,
    options: &MergeOptions,
) -> Result<MergeOutcome> {
    options.validate()?;
    let requested = options.requested_method()?;
    let action = classify(pr, options);
    debug!(pr_number = pr.number, %action, status = %pr.merge_state_status, "classified merge");

    let pr_ref = pr.reference(repo);
    let mut resolver = MethodResolver::new(
        env.platform,
        env.prompter,
        env.interactive,
        repo,
        &pr.base_ref,
    );

    let mut outcome = MergeOutcome {
        action,
        method: None,
        cleanup: None,
    };

    match action {
        MergeAction::ReportAlreadyQueued => return Err(Error::AlreadyQueued(pr_ref)),
        MergeAction::ReportBlocked(BlockReason::DeleteBranchWithQueue) => {
            return Err(Error::MergeQueueConflict);
        }
        MergeAction::ReportBlocked(reason) => {
            return Err(blocked_error(reason, pr, &pr_ref, options, &env.remote_name));
        }
        MergeAction::DisableAutoMerge => {
            env.platform.disable_auto_merge(&pr.id).await?;
            env.progress
                .on_success(&format!("Auto-merge disabled for pull request {pr_ref}"))
                .await;
        }
        MergeAction::EnableAutoMerge => {
            let resolved = resolver.resolve(requested, false).await?;
            let request = build_request(pr, resolved.method, CommitMessage::default(), options);
            env.platform.enable_auto_merge(&request).await?;
            env.progress
                .on_success(&format!(
                    "Pull request {pr_ref} will be automatically merged via {} when all requirements are met",
                    resolved.method
                ))
                .await;
            outcome.method = Some(resolved.method);
        }
        MergeAction::EnqueueToQueue => {
            if options.has_method_flag() {
                env.progress
                    .on_warning(&format!(
                        "The merge strategy for {} is set by the merge queue",
                        pr.base_ref
                    ))
                    .await;
            }
            warn_if_diverged(env, pr, &pr_ref).await;
            let resolved = resolver.resolve(requested, true).await?;
            let message = compose(env, pr, resolved, options).await?;
            let request = build_request(pr, resolved.method, message, options);
            env.platform.enable_auto_merge(&request).await?;
            env.progress
                .on_success(&format!(
                    "Pull request {pr_ref} will be added to the merge queue for {} when ready",
                    pr.base_ref
                ))
                .await;
            outcome.method = Some(resolved.method);
            // The queue owns the head branch from here on
            outcome.cleanup = Some(run_cleanup(env, pr, repo, Some(false), false).await?);
        }
        MergeAction::DirectMerge => {
            warn_if_diverged(env, pr, &pr_ref).await;
            let resolved = resolver.resolve(requested, false).await?;
            let message = compose(env, pr, resolved, options).await?;
            let request = build_request(pr, resolved.method, message, options);
            env.platform.merge_pr(&request).await?;
            env.progress
                .on_success(&format!(
                    "{} pull request {pr_ref} ({})",
                    resolved.method.past_tense(),
                    pr.title
                ))
                .await;
            outcome.method = Some(resolved.method);
            outcome.cleanup = Some(run_cleanup(env, pr, repo, options.delete_branch, false).await?);
        }
        MergeAction::ReportAlreadyMerged => {
            env.progress
                .on_warning(&format!("Pull request {pr_ref} was already merged"))
                .await;
            outcome.cleanup = Some(run_cleanup(env, pr, repo, options.delete_branch, true).await?);
        }
    }

    Ok(outcome)
}

async fn compose(
    env: &MergeEnvironment<'_>,
    pr: &PullRequest,
    resolved: ResolvedMethod,
    options: &MergeOptions,
) -> Result<CommitMessage> {
    let composer = Composer {
        platform: env.platform,
        prompter: env.prompter,
        editor: env.editor,
    };
    // Only a user who picked the method interactively gets the submit loop
    let confirm = env.interactive && resolved.source == MethodSource::Survey;
    composer.compose(&pr.id, resolved.method, options, confirm).await
}

fn build_request(
    pr: &PullRequest,
    method: MergeMethod,
    message: CommitMessage,
    options: &MergeOptions,
) -> MergeRequest {
    MergeRequest {
        pr_id: pr.id.clone(),
        method,
        commit_headline: message.headline,
        commit_body: message.body,
        author_email: options.author_email.clone(),
        expected_head_oid: options.match_head_commit.clone(),
    }
}

/// Warn when the local head branch and the PR point at different commits
///
/// Best-effort: any git failure just skips the check.
async fn warn_if_diverged(env: &MergeEnvironment<'_>, pr: &PullRequest, pr_ref: &str) {
    let Some(git) = env.git else {
        return;
    };
    let Some(pr_head) = pr.last_commit_oid() else {
        return;
    };

    match git.current_branch() {
        Ok(Some(branch)) if branch == pr.head_ref => {}
        Ok(_) => return,
        Err(e) => {
            debug!(error = %e, "skipping divergence check");
            return;
        }
    }

    match git.commit_hash("HEAD") {
        Ok(local_head) if local_head != pr_head => {
            env.progress
                .on_warning(&format!(
                    "Pull request {pr_ref} ({}) has diverged from local branch",
                    pr.title
                ))
                .await;
        }
        Ok(_) => {}
        Err(e) => debug!(error = %e, "skipping divergence check"),
    }
}

async fn run_cleanup(
    env: &MergeEnvironment<'_>,
    pr: &PullRequest,
    repo: &Repository,
    explicit: Option<bool>,
    already_merged: bool,
) -> Result<CleanupReport> {
    let runner = CleanupRunner {
        platform: env.platform,
        git: env.git,
        progress: env.progress,
        remote_name: &env.remote_name,
    };
    if explicit == Some(false) {
        return Ok(runner.execute(BranchDeletionPlan::empty(&pr.head_ref), repo).await);
    }

    let local = env.git.and_then(|git| {
        LocalState::inspect(git, pr)
            .map_err(|e| debug!(error = %e, "cannot inspect local branches"))
            .ok()
    });
    let head_exists = local.as_ref().is_some_and(|l| l.head_exists);

    let delete = resolve_delete_intent(
        pr,
        repo,
        explicit,
        already_merged,
        head_exists,
        env.interactive,
        env.prompter,
    )?;
    let plan = plan_branch_cleanup(pr, repo, delete, local.as_ref(), &env.remote_name);
    debug!(?plan, "planned branch cleanup");
    Ok(runner.execute(plan, repo).await)
}

fn blocked_error(
    reason: BlockReason,
    pr: &PullRequest,
    pr_ref: &str,
    options: &MergeOptions,
    remote_name: &str,
) -> Error {
    let mut hints = Vec::new();

    if reason != BlockReason::Closed {
        hints.push(
            "To have the pull request merged after all the requirements have been met, add the `--auto` flag."
                .to_string(),
        );
    }

    if reason == BlockReason::Dirty {
        let merge_or_rebase = if options.rebase { "rebase" } else { "merge" };
        hints.push(format!(
            "Run the following to resolve the merge conflicts locally:\n  git checkout {head} && git fetch {remote_name} {base} && git {merge_or_rebase} {remote_name}/{base}",
            head = pr.head_ref,
            base = pr.base_ref,
        ));
    }

    let bypassable = match reason {
        BlockReason::BasePolicy => MergeStateStatus::Blocked.admin_can_bypass(),
        BlockReason::Behind => MergeStateStatus::Behind.admin_can_bypass(),
        _ => false,
    };
    if bypassable && !options.admin {
        hints.push(
            "To use administrator privileges to immediately merge the pull request, add the `--admin` flag."
                .to_string(),
        );
    }

    Error::NotMergeable {
        pr: pr_ref.to_string(),
        reason: reason.describe().to_string(),
        hints,
    }
}
