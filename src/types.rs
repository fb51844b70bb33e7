//! Core types for prmerge

use serde::{Deserialize, Serialize};

/// A GitHub repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    /// Repository owner (user or organization)
    pub owner: String,
    /// Repository name
    pub name: String,
    /// Custom host (None for github.com)
    pub host: Option<String>,
}

impl Repository {
    /// Create a repository on github.com
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
            host: None,
        }
    }

    /// `OWNER/REPO`
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

impl std::fmt::Display for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// PR state (open, closed, merged)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PrState {
    /// PR is open and can be merged
    Open,
    /// PR was closed without merging
    Closed,
    /// PR was merged
    Merged,
}

impl std::fmt::Display for PrState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Closed => write!(f, "closed"),
            Self::Merged => write!(f, "merged"),
        }
    }
}

/// Server-computed mergeability of a pull request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MergeStateStatus {
    /// Mergeable and passing commit status
    Clean,
    /// Blocked by base branch policy (reviews, required checks)
    Blocked,
    /// Head branch is out of date with the base branch
    Behind,
    /// Merge commit cannot be cleanly created
    Dirty,
    /// Mergeable with non-passing commit status
    Unstable,
    /// Mergeable with passing status and pre-receive hooks
    HasHooks,
    /// Blocked because the PR is a draft
    Draft,
    /// Not yet computed by the server
    #[serde(other)]
    Unknown,
}

impl MergeStateStatus {
    /// Whether an administrator may bypass this state
    ///
    /// A DIRTY pull request has no mergeable commit, so admin privilege
    /// cannot help there.
    pub const fn admin_can_bypass(self) -> bool {
        matches!(self, Self::Blocked | Self::Behind)
    }
}

impl std::fmt::Display for MergeStateStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Clean => "CLEAN",
            Self::Blocked => "BLOCKED",
            Self::Behind => "BEHIND",
            Self::Dirty => "DIRTY",
            Self::Unstable => "UNSTABLE",
            Self::HasHooks => "HAS_HOOKS",
            Self::Draft => "DRAFT",
            Self::Unknown => "UNKNOWN",
        };
        f.write_str(s)
    }
}

/// A commit recorded on a pull request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrCommit {
    /// Full commit hash
    pub oid: String,
}

/// Snapshot of a pull request taken at the start of a merge attempt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequest {
    /// GraphQL node ID, used for mutations
    pub id: String,
    /// PR number
    pub number: u64,
    /// PR title
    pub title: String,
    /// Current state of the PR
    pub state: PrState,
    /// Server-computed mergeability
    pub merge_state_status: MergeStateStatus,
    /// Head branch name
    pub head_ref: String,
    /// Base branch name
    pub base_ref: String,
    /// Login of the head repository owner (differs from base owner for forks)
    pub head_repository_owner: String,
    /// Whether the PR currently sits in the merge queue
    pub is_in_merge_queue: bool,
    /// Whether the base branch requires the merge queue
    pub is_merge_queue_enabled: bool,
    /// Commits in PR order (oldest first)
    pub commits: Vec<PrCommit>,
}

impl PullRequest {
    /// Hash of the most recent commit recorded on the PR
    pub fn last_commit_oid(&self) -> Option<&str> {
        self.commits.last().map(|c| c.oid.as_str())
    }

    /// Whether the head branch lives in a repository owned by someone else
    pub fn is_cross_repository(&self, base: &Repository) -> bool {
        !self.head_repository_owner.eq_ignore_ascii_case(&base.owner)
    }

    /// `OWNER/REPO#N`
    pub fn reference(&self, repo: &Repository) -> String {
        format!("{}#{}", repo.full_name(), self.number)
    }
}

/// Merge strategy/method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeMethod {
    /// Create a merge commit
    Merge,
    /// Rebase commits onto base branch
    Rebase,
    /// Squash all commits into one
    Squash,
}

impl MergeMethod {
    /// All methods in survey order
    pub const ALL: [Self; 3] = [Self::Merge, Self::Rebase, Self::Squash];

    /// GraphQL `PullRequestMergeMethod` value
    pub const fn as_graphql(self) -> &'static str {
        match self {
            Self::Merge => "MERGE",
            Self::Rebase => "REBASE",
            Self::Squash => "SQUASH",
        }
    }

    /// Parse a GraphQL `PullRequestMergeMethod` value
    pub fn from_graphql(value: &str) -> Option<Self> {
        match value {
            "MERGE" => Some(Self::Merge),
            "REBASE" => Some(Self::Rebase),
            "SQUASH" => Some(Self::Squash),
            _ => None,
        }
    }

    /// Whether a commit headline/body applies to this method
    pub const fn takes_commit_message(self) -> bool {
        !matches!(self, Self::Rebase)
    }

    /// Past-tense verb used when reporting a completed merge
    pub const fn past_tense(self) -> &'static str {
        match self {
            Self::Merge => "Merged",
            Self::Rebase => "Rebased and merged",
            Self::Squash => "Squashed and merged",
        }
    }

    /// Label shown in the interactive method survey
    pub const fn survey_label(self) -> &'static str {
        match self {
            Self::Merge => "Create a merge commit",
            Self::Rebase => "Rebase and merge",
            Self::Squash => "Squash and merge",
        }
    }
}

impl std::fmt::Display for MergeMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Merge => write!(f, "merge"),
            Self::Rebase => write!(f, "rebase"),
            Self::Squash => write!(f, "squash"),
        }
    }
}

/// Which merge methods a repository allows
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct MergeCapabilities {
    /// Merge commits allowed
    pub merge_commit_allowed: bool,
    /// Rebase merging allowed
    pub rebase_merge_allowed: bool,
    /// Squash merging allowed
    pub squash_merge_allowed: bool,
    /// Method pinned by the base branch's merge queue, if any
    pub merge_queue_method: Option<MergeMethod>,
}

impl MergeCapabilities {
    /// Whether the repository allows `method`
    pub const fn allows(&self, method: MergeMethod) -> bool {
        match method {
            MergeMethod::Merge => self.merge_commit_allowed,
            MergeMethod::Rebase => self.rebase_merge_allowed,
            MergeMethod::Squash => self.squash_merge_allowed,
        }
    }

    /// Allowed methods in survey order
    pub fn allowed_methods(&self) -> Vec<MergeMethod> {
        MergeMethod::ALL
            .into_iter()
            .filter(|m| self.allows(*m))
            .collect()
    }
}

/// Server-computed default commit text for a merge method
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeMessage {
    /// Default commit headline
    pub headline: String,
    /// Default commit body
    pub body: String,
}

/// Input for a merge or auto-merge/enqueue mutation
///
/// Optional fields left as `None` are not sent, so the server applies its
/// own defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeRequest {
    /// GraphQL node ID of the pull request
    pub pr_id: String,
    /// Merge method
    pub method: MergeMethod,
    /// Commit headline
    pub commit_headline: Option<String>,
    /// Commit body
    pub commit_body: Option<String>,
    /// Author email for the merge commit
    pub author_email: Option<String>,
    /// Head commit the server must still see before merging
    pub expected_head_oid: Option<String>,
}

impl MergeRequest {
    /// Request with no optional fields set
    pub fn new(pr_id: impl Into<String>, method: MergeMethod) -> Self {
        Self {
            pr_id: pr_id.into(),
            method,
            commit_headline: None,
            commit_body: None,
            author_email: None,
            expected_head_oid: None,
        }
    }
}
