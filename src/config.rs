// src/config.rs
// =============================================================================
// Everything the monitor needs to know before it starts, in one place.
//
// - Credentials: the Pushover user key + app token, read from a two-line file
// - Timing: every interval and jitter the scheduler uses
// - Config: the parsed CLI turned into the values above
//
// A bad credentials file is not fatal. The caller gets a typed error, logs it,
// and runs with notifications disabled.
// =============================================================================

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::cli::Cli;
use crate::fetch::RenewalPolicy;
use crate::units::Section;

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("could not read credentials file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid credentials format: expected 2 lines (user key, app token), found {found}")]
    Format { found: usize },
}

// Pushover credentials
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    user_key: String,
    app_token: String,
}

impl Credentials {
    pub fn load(path: &Path) -> Result<Self, CredentialError> {
        let content = std::fs::read_to_string(path).map_err(|source| CredentialError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    // Line 1 = user key, line 2 = app token, nothing else
    pub fn parse(content: &str) -> Result<Self, CredentialError> {
        let lines: Vec<&str> = content.trim().lines().collect();

        match lines.as_slice() {
            [user_key, app_token] => Ok(Credentials {
                user_key: user_key.to_string(),
                app_token: app_token.to_string(),
            }),
            _ => Err(CredentialError::Format { found: lines.len() }),
        }
    }

    pub fn user_key(&self) -> &str {
        &self.user_key
    }

    pub fn app_token(&self) -> &str {
        &self.app_token
    }
}

// Never print secrets, even in debug output
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user_key", &"<redacted>")
            .field("app_token", &"<redacted>")
            .finish()
    }
}

// Every interval the scheduler uses
#[derive(Debug, Clone, PartialEq)]
pub struct Timing {
    /// Mean delay between polls
    pub poll_interval: Duration,
    /// Std dev of the poll jitter, seconds
    pub poll_jitter_std_dev: f64,
    /// The poll delay is never shorter than this
    pub min_poll_delay: Duration,
    /// Mean session lifetime before renewal
    pub session_lifetime: Duration,
    /// Std dev of the renewal jitter, seconds
    pub session_jitter_std_dev: f64,
    /// Fixed wait after a hard failure
    pub error_backoff: Duration,
    /// Per-request timeout for the page fetch
    pub request_timeout: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Timing {
            poll_interval: Duration::from_secs(70),
            poll_jitter_std_dev: 20.0,
            min_poll_delay: Duration::from_secs(1),
            session_lifetime: Duration::from_secs(600),
            session_jitter_std_dev: 120.0,
            error_backoff: Duration::from_secs(30),
            request_timeout: Duration::from_secs(10),
        }
    }
}

impl Timing {
    pub fn renewal_policy(&self) -> RenewalPolicy {
        RenewalPolicy {
            lifetime: self.session_lifetime,
            jitter_std_dev: self.session_jitter_std_dev,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub target: Url,
    pub instance_name: String,
    pub credentials_path: PathBuf,
    pub sections: Vec<Section>,
    pub timing: Timing,
    /// None = retry forever
    pub max_consecutive_errors: Option<u32>,
}

impl Config {
    pub fn from_cli(cli: Cli) -> Self {
        let timing = Timing {
            poll_interval: Duration::from_secs(cli.poll_interval),
            poll_jitter_std_dev: cli.poll_jitter,
            session_lifetime: Duration::from_secs(cli.session_lifetime),
            session_jitter_std_dev: cli.session_jitter,
            error_backoff: Duration::from_secs(cli.error_backoff),
            request_timeout: Duration::from_secs(cli.request_timeout),
            ..Timing::default()
        };

        Config {
            target: cli.url,
            instance_name: cli.instance_name,
            credentials_path: cli.credentials,
            sections: cli.sections.iter().map(|id| Section::from_anchor(id)).collect(),
            timing,
            max_consecutive_errors: cli.max_consecutive_errors,
        }
    }
}
