//=========================================================================
// Fetchers
//=========================================================================
//
// Network side of the asset cache.
//
//   Fetcher (trait)
//     ├─ HttpFetcher:     ureq agent with a fixed timeout
//     └─ RetryingFetcher: wraps any fetcher, linear backoff
//
//=========================================================================

//=== External Dependencies ===============================================

use std::io::Read;
use std::thread;
use std::time::Duration;

use log::debug;
use thiserror::Error;

//=== FetchError ==========================================================

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("could not reach {url}: {reason}")]
    Transport { url: String, reason: String },

    #[error("failed to read body of {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: std::io::Error,
    },

    #[error("no cached copy of {0} and the network is unavailable")]
    Unavailable(String),
}

//=== Fetcher Trait =======================================================

/// Retrieves the raw bytes behind a URL.
pub trait Fetcher: Send + Sync {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

//=== HttpFetcher =========================================================

pub struct HttpFetcher {
    agent: ureq::Agent,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Self {
        Self {
            agent: ureq::AgentBuilder::new().timeout(timeout).build(),
        }
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let response = self.agent.get(url).call().map_err(|err| match err {
            ureq::Error::Status(status, _) => FetchError::Status {
                url: url.to_string(),
                status,
            },
            ureq::Error::Transport(transport) => FetchError::Transport {
                url: url.to_string(),
                reason: transport.to_string(),
            },
        })?;

        let mut body = Vec::new();
        response
            .into_reader()
            .read_to_end(&mut body)
            .map_err(|source| FetchError::Body {
                url: url.to_string(),
                source,
            })?;

        debug!(target: "asset_cache", "Fetched {} ({} bytes)", url, body.len());
        Ok(body)
    }
}

//=== RetryingFetcher =====================================================

/// Retries the inner fetcher `max_retries` times, sleeping
/// `retry_delay × attempt` between tries.
pub struct RetryingFetcher<F: Fetcher> {
    inner: F,
    max_retries: u32,
    retry_delay: Duration,
}

impl<F: Fetcher> RetryingFetcher<F> {
    pub fn new(inner: F, max_retries: u32, retry_delay: Duration) -> Self {
        Self {
            inner,
            max_retries,
            retry_delay,
        }
    }
}

impl<F: Fetcher> Fetcher for RetryingFetcher<F> {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let mut attempt = 1;
        loop {
            match self.inner.fetch(url) {
                Ok(body) => return Ok(body),
                Err(e) if attempt <= self.max_retries => {
                    debug!(target: "asset_cache", "Fetch {} attempt {} failed: {}", url, attempt, e);
                    thread::sleep(self.retry_delay * attempt);
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
