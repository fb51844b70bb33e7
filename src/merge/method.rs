//! Merge method resolution
//!
//! Order: the merge queue's configured method, then an explicitly requested
//! method, then an interactive survey over the methods the repository allows.

use crate::error::{Error, Result};
use crate::interact::Prompter;
use crate::platform::PlatformService;
use crate::types::{MergeCapabilities, MergeMethod, Repository};
use tracing::debug;

/// Where the resolved method came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodSource {
    /// Pinned by the merge queue configuration
    Queue,
    /// Flag or configuration
    Requested,
    /// Chosen by the user in the survey
    Survey,
}

/// A resolved merge method
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedMethod {
    /// The method to use
    pub method: MergeMethod,
    /// Where it came from
    pub source: MethodSource,
}

/// Turn the three method flags into at most one method
pub fn method_from_flags(merge: bool, rebase: bool, squash: bool) -> Result<Option<MergeMethod>> {
    let selected: Vec<MergeMethod> = [
        (merge, MergeMethod::Merge),
        (rebase, MergeMethod::Rebase),
        (squash, MergeMethod::Squash),
    ]
    .into_iter()
    .filter_map(|(set, method)| set.then_some(method))
    .collect();

    match selected.as_slice() {
        [] => Ok(None),
        [method] => Ok(Some(*method)),
        _ => Err(Error::InvalidArgument(
            "only one of --merge, --rebase, or --squash can be enabled".to_string(),
        )),
    }
}

/// Ask the user to pick one of the repository's allowed methods
pub fn survey_merge_method(
    prompter: &dyn Prompter,
    capabilities: &MergeCapabilities,
) -> Result<MergeMethod> {
    let allowed = capabilities.allowed_methods();
    if allowed.is_empty() {
        return Err(Error::InvalidArgument(
            "the base repository does not allow any merge methods".to_string(),
        ));
    }

    let labels: Vec<&str> = allowed.iter().map(|m| m.survey_label()).collect();
    let index = prompter.select("What merge method would you like to use?", Some(0), &labels)?;
    allowed
        .get(index)
        .copied()
        .ok_or_else(|| Error::Prompt(format!("invalid merge method selection: {index}")))
}

/// Resolves the merge method, fetching repository capabilities at most once
/// and only when they are actually needed
pub struct MethodResolver<'a> {
    platform: &'a dyn PlatformService,
    prompter: &'a dyn Prompter,
    interactive: bool,
    repo: &'a Repository,
    base_branch: &'a str,
    capabilities: Option<MergeCapabilities>,
}

impl<'a> MethodResolver<'a> {
    /// Create a resolver for a pull request targeting `base_branch`
    pub fn new(
        platform: &'a dyn PlatformService,
        prompter: &'a dyn Prompter,
        interactive: bool,
        repo: &'a Repository,
        base_branch: &'a str,
    ) -> Self {
        Self {
            platform,
            prompter,
            interactive,
            repo,
            base_branch,
            capabilities: None,
        }
    }

    /// Repository capabilities, fetched on first use
    pub async fn capabilities(&mut self) -> Result<&MergeCapabilities> {
        if self.capabilities.is_none() {
            let caps = self
                .platform
                .fetch_merge_capabilities(self.repo, self.base_branch)
                .await?;
            self.capabilities = Some(caps);
        }
        self.capabilities
            .as_ref()
            .ok_or_else(|| Error::Internal("merge capabilities not loaded".to_string()))
    }

    /// Resolve the method for a merge
    ///
    /// `queued` means the merge goes through the merge queue, whose
    /// configured method takes precedence over `requested`.
    pub async fn resolve(
        &mut self,
        requested: Option<MergeMethod>,
        queued: bool,
    ) -> Result<ResolvedMethod> {
        if queued && let Some(method) = self.capabilities().await?.merge_queue_method {
            debug!(%method, "using merge queue method");
            return Ok(ResolvedMethod {
                method,
                source: MethodSource::Queue,
            });
        }

        if let Some(method) = requested {
            return Ok(ResolvedMethod {
                method,
                source: MethodSource::Requested,
            });
        }

        if !self.interactive {
            return Err(Error::MethodRequired);
        }

        let prompter = self.prompter;
        let method = survey_merge_method(prompter, self.capabilities().await?)?;
        Ok(ResolvedMethod {
            method,
            source: MethodSource::Survey,
        })
    }
}
