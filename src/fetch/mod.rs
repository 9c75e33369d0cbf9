// src/fetch/mod.rs
// =============================================================================
// This module retrieves the raw listings page.
//
// Submodules:
// - http: The reqwest-backed fetcher and its browser-like sessions
// - session: When to throw a session away and start a fresh one
//
// The monitor never talks to reqwest directly. It talks to the `Fetcher`
// trait defined here, which keeps the loop testable without a network.
// =============================================================================

mod http;
mod session;

pub use http::ReqwestFetcher;
pub use session::{RenewalPolicy, SessionManager};

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use url::Url;

// Why a request (or building a session) failed
//
// A non-200 status is NOT an error here - that comes back as a normal
// FetchResponse and the monitor decides what to do with it.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,
    #[error("too many redirects")]
    TooManyRedirects,
    #[error("could not resolve hostname: {0}")]
    Dns(String),
    #[error("connection failed: {0}")]
    Connect(String),
    #[error("SSL/TLS error: {0}")]
    Tls(String),
    #[error("could not create scraping session: {0}")]
    Session(String),
    #[error("{0}")]
    Other(String),
}

// What came back from the server
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// HTTP status code
    pub status: u16,
    /// Page body (empty unless the status was 200)
    pub body: String,
}

impl FetchResponse {
    /// Only an exact 200 counts as a usable page
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

// Anything that can open scraping sessions and fetch pages with them
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Opaque per-session state (cookies, user agent, ...)
    type Session: Send + Sync;

    /// Creates a brand new session
    fn open_session(&self) -> Result<Self::Session, FetchError>;

    /// GETs `url` using `session`, giving up after `timeout`
    async fn get(
        &self,
        session: &Self::Session,
        url: &Url,
        timeout: Duration,
    ) -> Result<FetchResponse, FetchError>;
}
