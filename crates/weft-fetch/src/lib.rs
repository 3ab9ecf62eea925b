//! Resource transport for weft.
//!
//! The engine reads remote templates and data through the [`Fetcher`] trait,
//! which performs a single GET and reports the status and body text. Status
//! handling is left to the caller: only transport failures are errors.
//!
//! The crate provides:
//! - [`HttpFetcher`], a blocking `ureq` client driven from tokio's blocking pool
//! - [`MockFetcher`] for testing (behind `mock` feature flag)

mod error;
mod fetcher;
mod http;
#[cfg(feature = "mock")]
mod mock;

pub use error::FetchError;
pub use fetcher::{FetchResponse, Fetcher};
pub use http::HttpFetcher;
#[cfg(feature = "mock")]
pub use mock::MockFetcher;
