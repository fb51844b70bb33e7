//! Error types for prmerge

use thiserror::Error;

/// Errors produced while merging a pull request
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid or conflicting command-line input
    #[error("{0}")]
    InvalidArgument(String),

    /// Branch deletion was requested for a queue-managed merge
    #[error("cannot use `-d` or `--delete-branch` when merge queue enabled")]
    MergeQueueConflict,

    /// No merge method could be resolved without prompting
    #[error("--merge, --rebase, or --squash required when not running interactively")]
    MethodRequired,

    /// PR cannot be merged in its current state
    #[error("Pull request {pr} is not mergeable: {reason}.{}", format_hints(.hints))]
    NotMergeable {
        /// `OWNER/REPO#N`
        pr: String,
        /// Why the server refuses the merge
        reason: String,
        /// Remediation lines shown to the user
        hints: Vec<String>,
    },

    /// PR is already in the merge queue
    #[error("Pull request {0} is already queued to merge")]
    AlreadyQueued(String),

    /// User cancelled an interactive step
    #[error("Cancelled.")]
    Cancelled,

    /// Merge succeeded but some branch cleanup steps failed
    #[error("branch cleanup incomplete: {0}")]
    CleanupIncomplete(String),

    /// GitHub API error
    #[error("GitHub API error: {0}")]
    GitHubApi(String),

    /// Pull request lookup failed
    #[error("no pull requests found for {0}")]
    PullRequestNotFound(String),

    /// Local git command failed
    #[error("git error: {0}")]
    Git(String),

    /// Remote not found
    #[error("remote not found: {0}")]
    RemoteNotFound(String),

    /// Remote URL could not be parsed as a GitHub repository
    #[error("no GitHub repository found in remote URL: {0}")]
    UnsupportedRemote(String),

    /// Prompt failed or was not expected
    #[error("prompt error: {0}")]
    Prompt(String),

    /// Authentication error
    #[error("authentication error: {0}")]
    Auth(String),

    /// Configuration error
    #[error("config error: {0}")]
    Config(String),

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Octocrab transport or API error
    #[error("GitHub API error: {0}")]
    Octocrab(#[from] octocrab::Error),
}

impl Error {
    /// Errors whose message is already user-facing and needs no `error:` prefix
    pub const fn is_silent(&self) -> bool {
        matches!(
            self,
            Self::Cancelled | Self::NotMergeable { .. } | Self::AlreadyQueued(_)
        )
    }
}

fn format_hints(hints: &[String]) -> String {
    hints.iter().fold(String::new(), |mut out, hint| {
        out.push('\n');
        out.push_str(hint);
        out
    })
}

/// Result type alias for prmerge
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_mergeable_includes_hints() {
        let err = Error::NotMergeable {
            pr: "acme/widgets#7".to_string(),
            reason: "the base branch policy prohibits the merge".to_string(),
            hints: vec!["add `--auto`".to_string(), "add `--admin`".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Pull request acme/widgets#7 is not mergeable: the base branch policy prohibits the merge.\nadd `--auto`\nadd `--admin`"
        );
        assert!(err.is_silent());
    }

    #[test]
    fn test_cancelled_message() {
        assert_eq!(Error::Cancelled.to_string(), "Cancelled.");
    }
}
