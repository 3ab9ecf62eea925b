//! HTTP transport over `ureq`.

use std::time::Duration;

use futures_util::FutureExt;
use futures_util::future::LocalBoxFuture;
use ureq::Agent;
use url::Url;
use weft_config::FetchConfig;

use crate::error::FetchError;
use crate::fetcher::{FetchResponse, Fetcher};

/// HTTP fetcher.
///
/// Each request runs the blocking `ureq` call on tokio's blocking pool, so
/// sibling fetches proceed concurrently. Must be awaited inside a tokio runtime.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    agent: Agent,
    base_url: Option<Url>,
    user_agent: String,
}

impl HttpFetcher {
    /// Create a fetcher with default settings and no base URL.
    #[must_use]
    pub fn new() -> Self {
        let config = FetchConfig::default();
        Self::with_agent(build_agent(config.timeout()), None, config.user_agent)
    }

    /// Create a fetcher from the `[fetch]` configuration section.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::InvalidUrl`] if `base_url` does not parse.
    pub fn from_config(config: &FetchConfig) -> Result<Self, FetchError> {
        let base_url = config
            .base_url
            .as_deref()
            .map(|base| {
                Url::parse(base).map_err(|source| FetchError::InvalidUrl {
                    url: base.to_owned(),
                    source,
                })
            })
            .transpose()?;

        Ok(Self::with_agent(
            build_agent(config.timeout()),
            base_url,
            config.user_agent.clone(),
        ))
    }

    fn with_agent(agent: Agent, base_url: Option<Url>, user_agent: String) -> Self {
        Self {
            agent,
            base_url,
            user_agent,
        }
    }

    /// Resolve `url` against the base URL, if one is configured.
    fn resolve(&self, url: &str) -> Result<Url, FetchError> {
        let resolved = match self.base_url {
            Some(ref base) => base.join(url),
            None => Url::parse(url),
        };
        resolved.map_err(|source| FetchError::InvalidUrl {
            url: url.to_owned(),
            source,
        })
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

fn build_agent(timeout: Duration) -> Agent {
    Agent::config_builder()
        .timeout_global(Some(timeout))
        .http_status_as_error(false)
        .build()
        .into()
}

/// Blocking GET returning status and body for any status code.
fn get(agent: &Agent, url: &str, user_agent: &str) -> Result<FetchResponse, FetchError> {
    let response = agent
        .get(url)
        .header("User-Agent", user_agent)
        .header("Accept", "text/html, application/json, */*")
        .call()
        .map_err(|e| classify(url, e))?;

    let status = response.status().as_u16();
    let mut body_reader = response.into_body();

    let body = if (200..300).contains(&status) {
        body_reader.read_to_string()?
    } else {
        body_reader.read_to_string().unwrap_or_default()
    };

    Ok(FetchResponse { status, body })
}

/// Separate failures to reach the host from other HTTP errors.
fn classify(url: &str, error: ureq::Error) -> FetchError {
    match error {
        ureq::Error::HostNotFound
        | ureq::Error::ConnectionFailed
        | ureq::Error::Io(_)
        | ureq::Error::Timeout(_) => FetchError::Unreachable {
            url: url.to_owned(),
            message: error.to_string(),
        },
        other => FetchError::Http(other),
    }
}

impl Fetcher for HttpFetcher {
    fn fetch<'a>(&'a self, url: &'a str) -> LocalBoxFuture<'a, Result<FetchResponse, FetchError>> {
        async move {
            let resolved = self.resolve(url)?.to_string();
            tracing::debug!(url = %resolved, "Fetching resource");

            let agent = self.agent.clone();
            let user_agent = self.user_agent.clone();
            let response =
                tokio::task::spawn_blocking(move || get(&agent, &resolved, &user_agent)).await??;

            tracing::debug!(url = %url, status = response.status, "Fetched resource");
            Ok(response)
        }
        .boxed_local()
    }
}
