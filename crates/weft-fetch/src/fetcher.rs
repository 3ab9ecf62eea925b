//! Fetcher trait definition.

use futures_util::future::LocalBoxFuture;

use crate::error::FetchError;

/// Status and body of a completed GET request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body as text.
    pub body: String,
}

impl FetchResponse {
    /// Create a response.
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Whether the status is in the 2xx range.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Retrieves resources by URL.
///
/// Futures are `!Send`: the engine drives them on a single thread alongside
/// its `Rc`-shared document tree.
pub trait Fetcher {
    /// Issue a GET for `url`.
    ///
    /// Resolves to the response for any status the server returns.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] when no response could be obtained.
    fn fetch<'a>(&'a self, url: &'a str) -> LocalBoxFuture<'a, Result<FetchResponse, FetchError>>;
}
