// src/notify/pushover.rs
// =============================================================================
// Sends change notifications through Pushover (https://pushover.net).
//
// Pushover takes a form POST with an application token, a user key, a title
// and a message, and answers with JSON:
//   {"status":1,"request":"..."}                  on success
//   {"status":0,"errors":["..."],"request":"..."} on failure
//
// When the credentials file was missing or malformed, the notifier is built
// without credentials and every send just logs a warning.
// =============================================================================

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, warn};

use super::{ChangeMessage, NotifyError, Notifier};
use crate::config::Credentials;

const MESSAGES_URL: &str = "https://api.pushover.net/1/messages.json";

// Form fields Pushover expects
#[derive(Debug, Serialize)]
struct PushoverRequest<'a> {
    token: &'a str,
    user: &'a str,
    title: &'a str,
    message: &'a str,
}

#[derive(Debug, Deserialize)]
struct PushoverResponse {
    status: i64,
    #[serde(default)]
    errors: Vec<String>,
}

pub struct PushoverNotifier {
    client: Client,
    credentials: Option<Credentials>,
}

impl PushoverNotifier {
    // `None` credentials give an inert notifier
    pub fn new(credentials: Option<Credentials>) -> Result<Self, NotifyError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| NotifyError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            credentials,
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.credentials.is_some()
    }
}

#[async_trait]
impl Notifier for PushoverNotifier {
    async fn notify(&self, message: &ChangeMessage) -> Result<(), NotifyError> {
        let Some(credentials) = &self.credentials else {
            warn!("Pushover credentials not available; skipping notification");
            return Ok(());
        };

        let request = PushoverRequest {
            token: credentials.app_token(),
            user: credentials.user_key(),
            title: &message.title,
            message: &message.body,
        };

        let response = self
            .client
            .post(MESSAGES_URL)
            .form(&request)
            .send()
            .await
            .map_err(|e| NotifyError::Transport(e.to_string()))?;

        let body = response
            .text()
            .await
            .map_err(|e| NotifyError::Transport(e.to_string()))?;

        check_response(&body)?;
        info!("Pushover notification sent successfully");
        Ok(())
    }
}

// Pushover reports errors in the body, with status 0
fn check_response(body: &str) -> Result<(), NotifyError> {
    let parsed: PushoverResponse = serde_json::from_str(body)
        .map_err(|e| NotifyError::Rejected(format!("unexpected response ({}): {}", e, body)))?;

    if parsed.status == 1 {
        Ok(())
    } else if parsed.errors.is_empty() {
        Err(NotifyError::Rejected(format!("status {}", parsed.status)))
    } else {
        Err(NotifyError::Rejected(parsed.errors.join("; ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_response_success() {
        assert!(check_response(r#"{"status":1,"request":"abc"}"#).is_ok());
    }

    #[test]
    fn test_check_response_errors() {
        let err = check_response(
            r#"{"user":"invalid","errors":["user identifier is invalid"],"status":0,"request":"abc"}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("user identifier is invalid"));
    }

    #[test]
    fn test_check_response_garbage() {
        assert!(matches!(
            check_response("<html>bad gateway</html>"),
            Err(NotifyError::Rejected(_))
        ));
    }

    #[tokio::test]
    async fn test_without_credentials_is_inert() {
        let notifier = PushoverNotifier::new(None).unwrap();
        assert!(!notifier.is_enabled());

        let message = ChangeMessage {
            title: "t".to_string(),
            body: "b".to_string(),
        };
        assert!(notifier.notify(&message).await.is_ok());
    }
}
