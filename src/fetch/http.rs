// src/fetch/http.rs
// =============================================================================
// This module fetches the listings page over HTTP.
//
// Key functionality:
// - Each session is its own reqwest Client with its own cookie jar
// - Each session picks a random desktop browser User-Agent
// - Sends browser-like headers so the page treats us like a normal visitor
// - Sorts reqwest failures into FetchError variants (timeout, DNS, SSL, ...)
//
// Why a fresh Client per session?
// - Long-lived sessions (same cookies, same fingerprint) get flagged by
//   anti-bot systems. Renewing the whole Client resets all of that.
// =============================================================================

use async_trait::async_trait;
use rand::{rng, Rng};
use reqwest::header::{
    HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL, UPGRADE_INSECURE_REQUESTS,
};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::debug;
use url::Url;

use super::{FetchError, FetchResponse, Fetcher};

// Desktop browsers we rotate between, one per session
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Safari/605.1.15",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:125.0) Gecko/20100101 Firefox/125.0",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
];

// Fetcher that talks to the real site
#[derive(Debug, Default)]
pub struct ReqwestFetcher;

impl ReqwestFetcher {
    pub fn new() -> Self {
        Self
    }
}

// One scraping session: a client plus the identity it presents
pub struct BrowserSession {
    client: Client,
    user_agent: &'static str,
}

#[async_trait]
impl Fetcher for ReqwestFetcher {
    type Session = BrowserSession;

    fn open_session(&self) -> Result<BrowserSession, FetchError> {
        let user_agent = USER_AGENTS[rng().random_range(0..USER_AGENTS.len())];

        let client = Client::builder()
            .user_agent(user_agent)
            .default_headers(browser_headers())
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|e| FetchError::Session(e.to_string()))?;

        debug!("Opened session with user agent: {}", user_agent);

        Ok(BrowserSession { client, user_agent })
    }

    async fn get(
        &self,
        session: &BrowserSession,
        url: &Url,
        timeout: Duration,
    ) -> Result<FetchResponse, FetchError> {
        debug!("GET {} as {}", url, session.user_agent);
        let response = session
            .client
            .get(url.clone())
            .timeout(timeout)
            .send()
            .await
            .map_err(categorize_error)?;

        let status = response.status();

        // Don't bother downloading error pages
        if status != StatusCode::OK {
            return Ok(FetchResponse {
                status: status.as_u16(),
                body: String::new(),
            });
        }

        let body = response.text().await.map_err(categorize_error)?;

        Ok(FetchResponse {
            status: status.as_u16(),
            body,
        })
    }
}

// Headers a regular browser sends on a top-level navigation
fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8",
        ),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));
    headers
}

// Categorizes different error types from reqwest
//
// reqwest errors can happen for many reasons:
// - Network timeout
// - DNS resolution failure
// - SSL certificate issues
// - Too many redirects
// - etc.
fn categorize_error(error: reqwest::Error) -> FetchError {
    // Convert error to string once to avoid lifetime issues
    let error_string = error.to_string();

    if error.is_timeout() {
        FetchError::Timeout
    } else if error.is_redirect() {
        FetchError::TooManyRedirects
    } else if error.is_connect() {
        // Connection errors often mean DNS issues or host unreachable
        if error_string.contains("dns") {
            FetchError::Dns(error_string)
        } else {
            FetchError::Connect(error_string)
        }
    } else if error_string.contains("certificate") || error_string.contains("ssl") {
        FetchError::Tls(error_string)
    } else {
        FetchError::Other(error_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_session_picks_known_user_agent() {
        let fetcher = ReqwestFetcher::new();
        let session = fetcher.open_session().unwrap();
        assert!(USER_AGENTS.contains(&session.user_agent));
    }

    #[test]
    fn test_browser_headers() {
        let headers = browser_headers();
        assert!(headers.contains_key(ACCEPT));
        assert_eq!(headers.get(ACCEPT_LANGUAGE).unwrap(), "en-US,en;q=0.9");
    }

    #[tokio::test]
    async fn test_connection_refused_is_hard_error() {
        // Port 9 (discard) on localhost is essentially never listening
        let fetcher = ReqwestFetcher::new();
        let session = fetcher.open_session().unwrap();
        let url = Url::parse("http://127.0.0.1:9/").unwrap();

        let result = fetcher.get(&session, &url, Duration::from_secs(2)).await;
        assert!(matches!(result, Err(FetchError::Connect(_))), "{:?}", result);
    }

    #[tokio::test]
    async fn test_unsupported_scheme_is_rejected_before_connecting() {
        // reqwest refuses non-http(s) URLs while building the request
        let fetcher = ReqwestFetcher::new();
        let session = fetcher.open_session().unwrap();
        let url = Url::parse("ftp://listings.invalid/units").unwrap();

        let result = fetcher.get(&session, &url, Duration::from_secs(2)).await;
        assert!(matches!(result, Err(FetchError::Other(_))), "{:?}", result);
    }
}
