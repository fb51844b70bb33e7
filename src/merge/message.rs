//! Commit message composition for merge and squash
//!
//! Flags win over the body file, the interactive loop edits whatever is
//! current, and server defaults only seed the editor. Anything still unset is
//! left out of the request so the server fills it in.

use crate::error::{Error, Result};
use crate::interact::{Prompter, TextEditor};
use crate::merge::options::MergeOptions;
use crate::platform::PlatformService;
use crate::types::{MergeMessage, MergeMethod};

/// Commit headline/body to send with a merge
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitMessage {
    /// Commit headline, `None` for the server default
    pub headline: Option<String>,
    /// Commit body, `None` for the server default
    pub body: Option<String>,
}

/// Choices offered by the interactive submit loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitAction {
    /// Merge with the current message
    Submit,
    /// Edit the full commit body
    EditMessage,
    /// Edit the headline only
    EditSubject,
    /// Abort the merge
    Cancel,
}

impl SubmitAction {
    const fn label(self) -> &'static str {
        match self {
            Self::Submit => "Submit",
            Self::EditMessage => "Edit commit message",
            Self::EditSubject => "Edit commit subject",
            Self::Cancel => "Cancel",
        }
    }

    /// Actions offered for `method`
    pub fn offered(method: MergeMethod) -> Vec<Self> {
        if method.takes_commit_message() {
            vec![Self::Submit, Self::EditMessage, Self::EditSubject, Self::Cancel]
        } else {
            vec![Self::Submit, Self::Cancel]
        }
    }
}

/// Everything the composer talks to
pub struct Composer<'a> {
    /// Source of server defaults
    pub platform: &'a dyn PlatformService,
    /// Prompt for the submit loop
    pub prompter: &'a dyn Prompter,
    /// Editor for message edits
    pub editor: &'a dyn TextEditor,
}

impl Composer<'_> {
    /// Work out the commit message for a merge of `pr_id` with `method`
    ///
    /// With `confirm` set the user gets the submit/edit/cancel loop;
    /// choosing cancel yields [`Error::Cancelled`].
    pub async fn compose(
        &self,
        pr_id: &str,
        method: MergeMethod,
        options: &MergeOptions,
        confirm: bool,
    ) -> Result<CommitMessage> {
        let mut message = if method.takes_commit_message() {
            CommitMessage {
                headline: options.subject.clone().filter(|s| !s.trim().is_empty()),
                body: options.read_body()?,
            }
        } else {
            CommitMessage::default()
        };

        if !confirm {
            return Ok(message);
        }

        let actions = SubmitAction::offered(method);
        let labels: Vec<&str> = actions.iter().map(|a| a.label()).collect();
        let mut defaults: Option<MergeMessage> = None;

        loop {
            let index = self.prompter.select("What's next?", Some(0), &labels)?;
            let action = actions
                .get(index)
                .copied()
                .ok_or_else(|| Error::Prompt(format!("invalid selection: {index}")))?;

            match action {
                SubmitAction::Submit => return Ok(message),
                SubmitAction::Cancel => return Err(Error::Cancelled),
                SubmitAction::EditMessage => {
                    let current = match message.body.take() {
                        Some(body) => body,
                        None => self.defaults(&mut defaults, pr_id, method).await?.body.clone(),
                    };
                    message.body = Some(self.editor.edit("*.md", &current)?);
                }
                SubmitAction::EditSubject => {
                    let current = match message.headline.take().filter(|h| !h.is_empty()) {
                        Some(headline) => headline,
                        None => self
                            .defaults(&mut defaults, pr_id, method)
                            .await?
                            .headline
                            .clone(),
                    };
                    let edited = self.editor.edit("*.md", &current)?;
                    message.headline = Some(edited.trim().to_string()).filter(|h| !h.is_empty());
                }
            }
        }
    }

    async fn defaults<'c>(
        &self,
        cache: &'c mut Option<MergeMessage>,
        pr_id: &str,
        method: MergeMethod,
    ) -> Result<&'c MergeMessage> {
        if cache.is_none() {
            *cache = Some(
                self.platform
                    .fetch_merge_message_defaults(pr_id, method)
                    .await?,
            );
        }
        cache
            .as_ref()
            .ok_or_else(|| Error::Internal("merge message defaults not loaded".to_string()))
    }
}
