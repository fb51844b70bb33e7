//! CLI commands and shared output plumbing

pub mod context;
pub mod merge;
pub mod style;

use anstream::eprintln;
use async_trait::async_trait;
use prmerge::merge::ProgressCallback;
use style::{Stylize, WARN, check};

/// Prints engine status lines to stderr
#[derive(Debug, Clone, Copy, Default)]
pub struct CliProgress;

#[async_trait]
impl ProgressCallback for CliProgress {
    async fn on_success(&self, message: &str) {
        eprintln!("{} {message}", check());
    }

    async fn on_warning(&self, message: &str) {
        eprintln!("{} {message}", WARN.warn());
    }
}
