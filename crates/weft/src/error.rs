//! Error types for template expansion.

use weft_fetch::FetchError;

/// Failure that aborts a whole expansion.
///
/// Expression failures, non-success responses, missing templates and
/// non-array iteration sources are logged and absorbed where they occur; only
/// the conditions below reach the caller of [`Engine::run`](crate::Engine::run).
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum EngineError {
    /// Transport-level fetch failure.
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    /// Fetched data is not valid JSON.
    #[error("invalid JSON data: {0}")]
    Json(#[from] serde_json::Error),

    /// No element carries the requested container id.
    #[error("container element not found: #{0}")]
    ContainerNotFound(String),
}
