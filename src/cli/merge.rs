//! Merge command - merge one pull request and clean up its branch

use crate::cli::CliProgress;
use crate::cli::context::{CommandContext, RepoArgs};
use crate::cli::style::{Stylize, spinner_style};
use async_trait::async_trait;
use indicatif::ProgressBar;
use prmerge::config::Config;
use prmerge::error::{Error, Result};
use prmerge::interact::{TerminalEditor, TerminalPrompter};
use prmerge::merge::{MergeEnvironment, MergeOptions, run_merge};
use prmerge::platform::{PrSelector, PullRequestFinder};
use prmerge::repo::LocalBranchManager;
use prmerge::types::{PullRequest, Repository};
use std::time::Duration;
use tracing::debug;

/// Shows a spinner while the pull request is looked up
struct SpinnerFinder<'a> {
    inner: &'a dyn PullRequestFinder,
}

#[async_trait]
impl PullRequestFinder for SpinnerFinder<'_> {
    async fn find_pr(&self, selector: &PrSelector) -> Result<(PullRequest, Repository)> {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(spinner_style());
        spinner.set_message(format!("Looking up pull request {}...", selector.accent()));
        spinner.enable_steady_tick(Duration::from_millis(80));

        let result = self.inner.find_pr(selector).await;
        spinner.finish_and_clear();
        result
    }
}

/// Run the merge command
pub async fn run_merge_command(
    repo_args: &RepoArgs<'_>,
    config: &Config,
    mut options: MergeOptions,
) -> Result<()> {
    if options.default_method.is_none() {
        options.default_method = config.merge.method;
    }

    let ctx = CommandContext::new(repo_args, config).await?;

    let env = MergeEnvironment {
        platform: &ctx.platform,
        git: ctx.git.as_ref().map(|g| g as &dyn LocalBranchManager),
        prompter: &TerminalPrompter,
        editor: &TerminalEditor,
        progress: &CliProgress,
        interactive: ctx.interactive,
        remote_name: ctx.remote_name.clone(),
    };
    let finder = SpinnerFinder {
        inner: &ctx.platform,
    };

    let outcome = run_merge(&env, &finder, &options).await?;
    debug!(action = %outcome.action, method = ?outcome.method, "merge finished");

    match outcome.cleanup {
        Some(report) if !report.is_success() => {
            Err(Error::CleanupIncomplete(report.failures().join("; ")))
        }
        _ => Ok(()),
    }
}
