// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Usage:
//   vacancy-watch <URL> <INSTANCE_NAME> [OPTIONS]
//
// Only the URL and the instance name are required. Everything else has a
// default that matches how the monitor is meant to run unattended: poll about
// once every 70 seconds, renew the session about every 10 minutes.
//
// Rust concepts:
// - Derive macros: clap generates all of the parsing code from this struct
// - value_parser: custom validation that runs before main() sees the value
// =============================================================================

use clap::Parser;
use url::Url;

#[derive(Parser, Debug)]
#[command(
    name = "vacancy-watch",
    version = "0.1.0",
    about = "Watch a rental listings page and get notified when available units change",
    long_about = "vacancy-watch polls an apartment listings page forever, with randomized timing, \
                  and sends a Pushover notification whenever the set of available units changes.",
    after_help = "Example: vacancy-watch 'https://www.equityapartments.com/new-york-city/jersey-city/the-pier-apartments' 'The Pier Apartments'"
)]
pub struct Cli {
    /// Listings page to monitor
    ///
    /// This is a positional argument (required). It must be a valid URL.
    pub url: Url,

    /// Display name used in notification titles
    ///
    /// Example: "The Pier Apartments"
    pub instance_name: String,

    /// Two-line credentials file: Pushover user key, then application token
    #[arg(long, env = "VACANCY_WATCH_CREDENTIALS", default_value = "credentials")]
    pub credentials: std::path::PathBuf,

    /// Id of a page section to read units from (repeatable)
    ///
    /// "bedroom-type-N" sections are labelled "NBR" in notifications.
    #[arg(long = "section", value_name = "ID", default_values_t = vec!["bedroom-type-2".to_string()])]
    pub sections: Vec<String>,

    /// Log filter used when RUST_LOG is not set (error, warn, info, debug, trace)
    #[arg(long, env = "VACANCY_WATCH_LOG", default_value = "info")]
    pub log_level: String,

    /// Average seconds between polls
    #[arg(long, value_name = "SECS", default_value_t = 70)]
    pub poll_interval: u64,

    /// Standard deviation of the poll jitter, in seconds
    #[arg(long, value_name = "SECS", default_value_t = 20.0, value_parser = parse_std_dev)]
    pub poll_jitter: f64,

    /// Average seconds a scraping session lives before it is renewed
    #[arg(long, value_name = "SECS", default_value_t = 600)]
    pub session_lifetime: u64,

    /// Standard deviation of the session renewal jitter, in seconds
    #[arg(long, value_name = "SECS", default_value_t = 120.0, value_parser = parse_std_dev)]
    pub session_jitter: f64,

    /// Seconds to wait after a network failure before trying again
    #[arg(long, value_name = "SECS", default_value_t = 30)]
    pub error_backoff: u64,

    /// Seconds before a page request is abandoned
    #[arg(long, value_name = "SECS", default_value_t = 10, value_parser = clap::value_parser!(u64).range(1..))]
    pub request_timeout: u64,

    /// Stop after this many network failures in a row (default: retry forever)
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    pub max_consecutive_errors: Option<u32>,
}

// A standard deviation has to be a finite, non-negative number
fn parse_std_dev(s: &str) -> Result<f64, String> {
    let value: f64 = s.parse().map_err(|_| format!("'{}' is not a number", s))?;
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(format!("'{}' must be a finite, non-negative number", s))
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why is `url` a Url and not a String?
//    - clap calls Url's FromStr for us, so a typo like "htps//" is rejected
//      with a usage error before the monitor ever starts
//
// 2. What does env = "..." do?
//    - If the flag isn't given, clap falls back to that environment variable
//    - Handy when running under systemd or in a container
//
// 3. Why Option<u32> for max_consecutive_errors?
//    - None means "no limit", which is the default
//    - Some(n) only exists when the user passed the flag
// -----------------------------------------------------------------------------
