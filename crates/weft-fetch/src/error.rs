//! Error types for resource fetching.

/// Transport-level failure. Non-success HTTP statuses are not errors.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum FetchError {
    /// HTTP request failed (network error, timeout, etc).
    #[error("HTTP request failed: {0}")]
    Http(#[from] ureq::Error),

    /// URL could not be parsed or resolved against the base URL.
    #[error("invalid URL {url:?}: {source}")]
    InvalidUrl {
        /// URL as given by the caller.
        url: String,
        /// Parse failure.
        #[source]
        source: url::ParseError,
    },

    /// Blocking request task panicked or was cancelled.
    #[error("fetch task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// Host could not be reached.
    #[error("{url} is unreachable: {message}")]
    Unreachable {
        /// Requested URL.
        url: String,
        /// Failure description.
        message: String,
    },
}
