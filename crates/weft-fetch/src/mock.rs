//! Mock fetcher implementation for testing.
//!
//! Provides [`MockFetcher`] for unit testing without network access.

use std::cell::RefCell;
use std::collections::HashMap;

use futures_util::FutureExt;
use futures_util::future::{LocalBoxFuture, ready};

use crate::error::FetchError;
use crate::fetcher::{FetchResponse, Fetcher};

#[derive(Debug, Clone)]
enum Canned {
    Response(FetchResponse),
    Failure(String),
}

/// Mock fetcher for testing.
///
/// Serves canned responses by exact URL and records every request. Unknown
/// URLs answer `404` with an empty body.
///
/// # Example
///
/// ```ignore
/// use weft_fetch::{Fetcher, MockFetcher};
///
/// let fetcher = MockFetcher::new()
///     .with_body("/card.html", "<b>{title}</b>")
///     .with_status("/gone.json", 410, "");
///
/// let response = fetcher.fetch("/card.html").await?;
/// assert_eq!(fetcher.requests(), vec!["/card.html"]);
/// ```
#[derive(Debug, Default)]
pub struct MockFetcher {
    responses: RefCell<HashMap<String, Canned>>,
    requests: RefCell<Vec<String>>,
}

impl MockFetcher {
    /// Create a mock that knows no URLs.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `url` with status 200 and `body`.
    #[must_use]
    pub fn with_body(self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.set_response(url, 200, body);
        self
    }

    /// Answer `url` with status 200 and `value` serialized as JSON.
    #[must_use]
    pub fn with_json(self, url: impl Into<String>, value: &serde_json::Value) -> Self {
        self.set_response(url, 200, value.to_string());
        self
    }

    /// Answer `url` with the given status and body.
    #[must_use]
    pub fn with_status(self, url: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        self.set_response(url, status, body);
        self
    }

    /// Fail requests for `url` at the transport level.
    #[must_use]
    pub fn with_failure(self, url: impl Into<String>, message: impl Into<String>) -> Self {
        self.responses
            .borrow_mut()
            .insert(url.into(), Canned::Failure(message.into()));
        self
    }

    /// Replace the response for `url` on an existing mock.
    pub fn set_response(&self, url: impl Into<String>, status: u16, body: impl Into<String>) {
        self.responses.borrow_mut().insert(
            url.into(),
            Canned::Response(FetchResponse::new(status, body)),
        );
    }

    /// URLs requested so far, in request order.
    #[must_use]
    pub fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }

    /// Number of requests made for `url`.
    #[must_use]
    pub fn request_count(&self, url: &str) -> usize {
        self.requests.borrow().iter().filter(|r| *r == url).count()
    }
}

impl Fetcher for MockFetcher {
    fn fetch<'a>(&'a self, url: &'a str) -> LocalBoxFuture<'a, Result<FetchResponse, FetchError>> {
        self.requests.borrow_mut().push(url.to_owned());
        let result = match self.responses.borrow().get(url) {
            Some(Canned::Response(response)) => Ok(response.clone()),
            Some(Canned::Failure(message)) => Err(FetchError::Unreachable {
                url: url.to_owned(),
                message: message.clone(),
            }),
            None => Ok(FetchResponse::new(404, "")),
        };
        ready(result).boxed_local()
    }
}
