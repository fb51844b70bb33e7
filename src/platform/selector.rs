//! Pull request selector parsing

use crate::error::{Error, Result};
use crate::types::Repository;
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

static NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#?(\d+)$").expect("valid regex"));

static PULL_PATH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^/([^/]+)/([^/]+)/pull/(\d+)(?:/.*)?$").expect("valid regex"));

/// How the user identified the pull request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrSelector {
    /// `12` or `#12`
    Number(u64),
    /// `https://github.com/OWNER/REPO/pull/12`
    Url {
        /// Repository taken from the URL
        repo: Repository,
        /// PR number
        number: u64,
    },
    /// Head branch name
    Branch(String),
}

impl PrSelector {
    /// Parse a selector argument
    pub fn parse(arg: &str) -> Result<Self> {
        let arg = arg.trim();
        if arg.is_empty() {
            return Err(Error::InvalidArgument(
                "pull request selector cannot be empty".to_string(),
            ));
        }

        if let Some(caps) = NUMBER_RE.captures(arg) {
            let number = caps[1]
                .parse()
                .map_err(|_| Error::InvalidArgument(format!("invalid pull request number: {arg}")))?;
            return Ok(Self::Number(number));
        }

        if arg.starts_with("https://") || arg.starts_with("http://") {
            return parse_pull_url(arg);
        }

        Ok(Self::Branch(arg.to_string()))
    }
}

impl std::fmt::Display for PrSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "#{n}"),
            Self::Url { repo, number } => write!(f, "{repo}#{number}"),
            Self::Branch(b) => write!(f, "branch {b}"),
        }
    }
}

fn parse_pull_url(arg: &str) -> Result<PrSelector> {
    let invalid = || Error::InvalidArgument(format!("invalid pull request URL: {arg}"));
    let url = Url::parse(arg).map_err(|_| invalid())?;
    let host = url.host_str().ok_or_else(invalid)?;
    let caps = PULL_PATH_RE.captures(url.path()).ok_or_else(invalid)?;
    let number = caps[3].parse().map_err(|_| invalid())?;

    Ok(PrSelector::Url {
        repo: Repository {
            owner: caps[1].to_string(),
            name: caps[2].to_string(),
            host: (host != "github.com").then(|| host.to_string()),
        },
        number,
    })
}
