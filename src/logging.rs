// src/logging.rs
// =============================================================================
// Sets up `tracing` output for the whole program.
//
// Every log line gets a timestamp and level from the fmt layer, which is all
// a long-running monitor needs to answer "what happened at 3am?".
//
// RUST_LOG wins if it is set (e.g. RUST_LOG=vacancy_watch=debug), otherwise
// the --log-level flag is used.
// =============================================================================

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub fn init_logging(log_level: &str) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(false))
        .init();

    tracing::debug!("Logging initialized at level: {}", log_level);
}
