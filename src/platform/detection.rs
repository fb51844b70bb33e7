//! Repository detection from git remote URLs

use crate::error::{Error, Result};
use crate::types::Repository;
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

static SCP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[\w.-]+@)?([\w.-]+):([^/][^:]*)$").expect("valid regex")
});

/// Parse a GitHub remote URL into a repository
///
/// Accepts `https://host/owner/repo(.git)`, `ssh://git@host/owner/repo(.git)`
/// and `git@host:owner/repo(.git)`.
pub fn parse_repo_info(remote_url: &str) -> Result<Repository> {
    let unsupported = || Error::UnsupportedRemote(remote_url.to_string());
    let trimmed = remote_url.trim();

    let (host, path) = if trimmed.contains("://") {
        let url = Url::parse(trimmed).map_err(|_| unsupported())?;
        let host = url.host_str().ok_or_else(unsupported)?.to_string();
        (host, url.path().to_string())
    } else if let Some(caps) = SCP_RE.captures(trimmed) {
        (caps[1].to_string(), caps[2].to_string())
    } else {
        return Err(unsupported());
    };

    let segments: Vec<&str> = path
        .trim_matches('/')
        .split('/')
        .filter(|s| !s.is_empty())
        .collect();
    let [owner, name] = segments.as_slice() else {
        return Err(unsupported());
    };
    let name = name.strip_suffix(".git").unwrap_or(name);
    if name.is_empty() {
        return Err(unsupported());
    }

    Ok(Repository {
        owner: (*owner).to_string(),
        name: name.to_string(),
        host: (host != "github.com").then_some(host),
    })
}

/// Parse a `--repo` argument: `OWNER/REPO`, `HOST/OWNER/REPO` or a URL
///
/// `default_host` applies to the two-segment form.
pub fn parse_repo_arg(arg: &str, default_host: Option<&str>) -> Result<Repository> {
    let trimmed = arg.trim();
    if trimmed.contains("://") {
        return parse_repo_info(trimmed);
    }

    let invalid = || {
        Error::InvalidArgument(format!(
            "expected the \"[HOST/]OWNER/REPO\" format, got \"{arg}\""
        ))
    };
    let segments: Vec<&str> = trimmed.split('/').collect();
    if segments.iter().any(|s| s.is_empty()) {
        return Err(invalid());
    }

    let (host, owner, name) = match segments.as_slice() {
        [owner, name] => (default_host, *owner, *name),
        [host, owner, name] => (Some(*host), *owner, *name),
        _ => return Err(invalid()),
    };

    Ok(Repository {
        owner: owner.to_string(),
        name: name.to_string(),
        host: host
            .filter(|h| !h.eq_ignore_ascii_case("github.com"))
            .map(str::to_string),
    })
}
