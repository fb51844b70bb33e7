//! prmerge - merge GitHub pull requests from the command line
//!
//! Merges a pull request directly, adds it to the merge queue, or toggles
//! auto-merge, then cleans up the head branch locally and on GitHub.
//!
//! The engine in [`merge`] talks to its collaborators through traits
//! ([`platform::PullRequestFinder`], [`platform::PlatformService`],
//! [`repo::LocalBranchManager`], [`interact::Prompter`]) so it can run
//! against mocks.

pub mod auth;
pub mod config;
pub mod error;
pub mod interact;
pub mod merge;
pub mod platform;
pub mod repo;
pub mod types;

pub use error::{Error, Result};
