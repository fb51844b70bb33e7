//! Caller intent for a merge

use crate::error::{Error, Result};
use crate::merge::method::method_from_flags;
use crate::types::MergeMethod;
use regex::Regex;
use std::io::Read;
use std::path::PathBuf;
use std::sync::LazyLock;

static COMMIT_SHA_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9a-fA-F]{7,40}$").expect("valid regex"));

/// Options for the merge command
///
/// Built once from flags and configuration, read-only afterwards.
#[derive(Debug, Clone, Default)]
#[allow(clippy::struct_excessive_bools)]
pub struct MergeOptions {
    /// PR number, URL or branch; `None` means the current branch
    pub selector: Option<String>,
    /// `--merge`
    pub merge: bool,
    /// `--rebase`
    pub rebase: bool,
    /// `--squash`
    pub squash: bool,
    /// Method from configuration, used when no method flag is given
    pub default_method: Option<MergeMethod>,
    /// `--delete-branch`: `None` when not given
    pub delete_branch: Option<bool>,
    /// `--body`
    pub body: Option<String>,
    /// `--body-file` (`-` reads standard input)
    pub body_file: Option<PathBuf>,
    /// `--subject`
    pub subject: Option<String>,
    /// `--author-email`
    pub author_email: Option<String>,
    /// `--match-head-commit`
    pub match_head_commit: Option<String>,
    /// `--admin`
    pub admin: bool,
    /// `--auto`
    pub auto_merge: bool,
    /// `--disable-auto`
    pub disable_auto_merge: bool,
}

impl MergeOptions {
    /// Reject conflicting or malformed flags before any I/O happens
    pub fn validate(&self) -> Result<()> {
        method_from_flags(self.merge, self.rebase, self.squash)?;

        let exclusive = [self.auto_merge, self.disable_auto_merge, self.admin];
        if exclusive.iter().filter(|set| **set).count() > 1 {
            return Err(Error::InvalidArgument(
                "specify only one of `--auto`, `--disable-auto`, or `--admin`".to_string(),
            ));
        }

        if self.body.is_some() && self.body_file.is_some() {
            return Err(Error::InvalidArgument(
                "specify only one of `--body` or `--body-file`".to_string(),
            ));
        }

        if let Some(sha) = &self.match_head_commit
            && !COMMIT_SHA_RE.is_match(sha)
        {
            return Err(Error::InvalidArgument(format!(
                "invalid value for `--match-head-commit`: {sha}"
            )));
        }

        if self.selector.as_deref().is_some_and(|s| s.trim().is_empty()) {
            return Err(Error::InvalidArgument(
                "pull request selector cannot be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Whether a method flag was passed on the command line
    pub const fn has_method_flag(&self) -> bool {
        self.merge || self.rebase || self.squash
    }

    /// Method from flags, falling back to the configured default
    pub fn requested_method(&self) -> Result<Option<MergeMethod>> {
        Ok(method_from_flags(self.merge, self.rebase, self.squash)?.or(self.default_method))
    }

    /// Whether branch deletion was explicitly requested
    pub const fn delete_branch_requested(&self) -> bool {
        matches!(self.delete_branch, Some(true))
    }

    /// Commit body from `--body` or `--body-file`
    pub fn read_body(&self) -> Result<Option<String>> {
        if let Some(body) = &self.body {
            return Ok(Some(body.clone()));
        }
        let Some(path) = &self.body_file else {
            return Ok(None);
        };

        let body = if path.as_os_str() == "-" {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        } else {
            std::fs::read_to_string(path).map_err(|e| {
                Error::InvalidArgument(format!("failed to read {}: {e}", path.display()))
            })?
        };
        Ok(Some(body))
    }
}
