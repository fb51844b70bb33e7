//! Shared command context for CLI commands
//!
//! Resolves the repository, the git remote and credentials before any
//! merge logic runs.

use prmerge::auth::get_github_auth;
use prmerge::config::Config;
use prmerge::error::{Error, Result};
use prmerge::platform::{GitHubService, parse_repo_arg, parse_repo_info};
use prmerge::repo::{GitRepo, select_remote};
use std::io::IsTerminal;
use std::path::Path;
use tracing::debug;

/// Where the command should find its repository
#[derive(Debug, Clone, Default)]
pub struct RepoArgs<'a> {
    /// Working directory holding the local checkout
    pub path: Option<&'a Path>,
    /// `--repo [HOST/]OWNER/REPO`
    pub repo: Option<&'a str>,
    /// `--remote`
    pub remote: Option<&'a str>,
    /// `--no-prompt`
    pub no_prompt: bool,
}

/// Shared context for CLI commands that talk to GitHub
///
/// This struct encapsulates the common setup:
/// - Opening the local checkout (skipped with `--repo`)
/// - Selecting and validating the remote
/// - Detecting the repository and creating the service
pub struct CommandContext {
    /// Local checkout, `None` with `--repo`
    pub git: Option<GitRepo>,
    /// GitHub service (finder and merge client)
    pub platform: GitHubService,
    /// Remote that tracks the base repository
    pub remote_name: String,
    /// Whether prompts may be shown
    pub interactive: bool,
}

impl CommandContext {
    /// Create a new command context
    pub async fn new(args: &RepoArgs<'_>, config: &Config) -> Result<Self> {
        let requested_remote = args.remote.or(config.remote.as_deref());

        let (git, repo, remote_name) = if let Some(repo_arg) = args.repo {
            let repo = parse_repo_arg(repo_arg, config.github.host.as_deref())?;
            let remote_name = requested_remote.unwrap_or("origin").to_string();
            (None, repo, remote_name)
        } else {
            let git = GitRepo::open(args.path.unwrap_or_else(|| Path::new(".")))?;
            let remotes = git.remotes()?;
            let remote_name = select_remote(&remotes, requested_remote)?;
            let remote = remotes
                .iter()
                .find(|r| r.name == remote_name)
                .ok_or_else(|| Error::RemoteNotFound(remote_name.clone()))?;
            let repo = parse_repo_info(&remote.url)?;
            (Some(git), repo, remote_name)
        };
        debug!(repo = %repo, remote = %remote_name, local = git.is_some(), "resolved repository");

        let auth = get_github_auth(repo.host.as_deref()).await?;
        debug!(source = ?auth.source, "authenticated");
        let platform = GitHubService::new(&auth.token, repo)?;

        let interactive =
            !args.no_prompt && std::io::stdin().is_terminal() && std::io::stdout().is_terminal();

        Ok(Self {
            git,
            platform,
            remote_name,
            interactive,
        })
    }
}
