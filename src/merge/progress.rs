//! Progress reporting for the merge engine

use async_trait::async_trait;

/// Receives user-facing status lines as the merge proceeds
///
/// The engine never prints directly; the CLI decides how lines look.
#[async_trait]
pub trait ProgressCallback: Send + Sync {
    /// A step completed
    async fn on_success(&self, message: &str);

    /// Something the user should know about that does not stop the merge
    async fn on_warning(&self, message: &str);
}

/// Progress callback that discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopProgress;

#[async_trait]
impl ProgressCallback for NoopProgress {
    async fn on_success(&self, _message: &str) {}
    async fn on_warning(&self, _message: &str) {}
}
