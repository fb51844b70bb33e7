//! `git` CLI backed repository

use super::{GitRemote, LocalBranchManager};
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tracing::debug;

/// A local git checkout driven through the `git` executable
#[derive(Debug, Clone)]
pub struct GitRepo {
    root: PathBuf,
}

impl GitRepo {
    /// Open the repository containing `path`
    pub fn open(path: &Path) -> Result<Self> {
        let output = Command::new("git")
            .arg("-C")
            .arg(path)
            .args(["rev-parse", "--show-toplevel"])
            .output()
            .map_err(|e| Error::Git(format!("failed to run git: {e}")))?;

        if !output.status.success() {
            return Err(Error::Git(format!(
                "not a git repository: {}",
                path.display()
            )));
        }

        let root = String::from_utf8_lossy(&output.stdout).trim().to_string();
        Ok(Self {
            root: PathBuf::from(root),
        })
    }

    /// Configured remotes with their fetch URLs
    pub fn remotes(&self) -> Result<Vec<GitRemote>> {
        let stdout = self.run_checked(&["remote", "-v"])?;
        let mut remotes: Vec<GitRemote> = Vec::new();
        for line in stdout.lines() {
            let mut parts = line.split_whitespace();
            let (Some(name), Some(url)) = (parts.next(), parts.next()) else {
                continue;
            };
            if !remotes.iter().any(|r| r.name == name) {
                remotes.push(GitRemote {
                    name: name.to_string(),
                    url: url.to_string(),
                });
            }
        }
        Ok(remotes)
    }

    fn run(&self, args: &[&str]) -> Result<Output> {
        debug!(?args, "running git");
        Command::new("git")
            .arg("-C")
            .arg(&self.root)
            .args(args)
            .output()
            .map_err(|e| Error::Git(format!("failed to run git {}: {e}", args.join(" "))))
    }

    fn run_checked(&self, args: &[&str]) -> Result<String> {
        let output = self.run(args)?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Git(format!(
                "git {} failed: {}",
                args.join(" "),
                stderr.trim()
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

impl LocalBranchManager for GitRepo {
    fn current_branch(&self) -> Result<Option<String>> {
        let name = self.run_checked(&["rev-parse", "--abbrev-ref", "HEAD"])?;
        Ok((name != "HEAD").then_some(name))
    }

    fn has_local_branch(&self, branch: &str) -> Result<bool> {
        let refname = format!("refs/heads/{branch}");
        let output = self.run(&["show-ref", "--verify", "--quiet", &refname])?;
        Ok(output.status.success())
    }

    fn checkout(&self, branch: &str) -> Result<()> {
        self.run_checked(&["checkout", branch]).map(drop)
    }

    fn checkout_new_tracking(&self, branch: &str, remote_ref: &str) -> Result<()> {
        self.run_checked(&["checkout", "-b", branch, "--track", remote_ref])
            .map(drop)
    }

    fn delete_local_branch(&self, branch: &str) -> Result<()> {
        self.run_checked(&["branch", "-D", branch]).map(drop)
    }

    fn pull_fast_forward(&self, remote: &str, branch: &str) -> Result<()> {
        self.run_checked(&["pull", "--ff-only", remote, branch])
            .map(drop)
    }

    fn commit_hash(&self, rev: &str) -> Result<String> {
        self.run_checked(&["rev-parse", rev])
    }
}
