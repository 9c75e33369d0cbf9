// src/notify/mod.rs
// =============================================================================
// This module tells a human that the listings changed.
//
// Submodules:
// - message: Builds the title and body text from a snapshot diff
// - pushover: Sends that message through the Pushover API
//
// Delivery is best effort. The monitor logs a failed send and carries on.
// =============================================================================

mod message;
mod pushover;

pub use message::ChangeMessage;
pub use pushover::PushoverNotifier;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("could not reach notification service: {0}")]
    Transport(String),
    #[error("notification rejected: {0}")]
    Rejected(String),
}

// Anything that can deliver a (title, body) message
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, message: &ChangeMessage) -> Result<(), NotifyError>;
}
