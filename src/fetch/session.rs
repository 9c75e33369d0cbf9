// src/fetch/session.rs
// =============================================================================
// This module decides when the scraping session has gone stale.
//
// How it works:
// 1. Every poll, the monitor draws a fresh jitter sample (normal, std 120 s)
// 2. The threshold for this poll is lifetime + jitter (600 s + jitter)
// 3. If the session is at least that old, open a new one and drop the old one
//
// The jitter is NOT clamped. A large negative sample can renew a young
// session; a large positive one keeps an old session around longer. Either
// way the renewal moment is unpredictable, which is the point.
// =============================================================================

use std::time::Duration;
use tokio::time::Instant;
use tracing::info;

use super::FetchError;

// How long a session nominally lives, and how much that wobbles
#[derive(Debug, Clone, PartialEq)]
pub struct RenewalPolicy {
    /// Nominal session lifetime (600 s by default)
    pub lifetime: Duration,
    /// Standard deviation of the per-poll jitter, in seconds (120 by default)
    pub jitter_std_dev: f64,
}

impl RenewalPolicy {
    /// Renewal threshold in seconds for one jitter sample, unclamped
    pub fn threshold_secs(&self, jitter: f64) -> f64 {
        self.lifetime.as_secs_f64() + jitter
    }
}

// A session and the moment it was created
struct SessionHandle<S> {
    session: S,
    created_at: Instant,
}

// Owns the current session and replaces it when the policy says so
pub struct SessionManager<S> {
    current: SessionHandle<S>,
    policy: RenewalPolicy,
}

impl<S> SessionManager<S> {
    pub fn new(session: S, created_at: Instant, policy: RenewalPolicy) -> Self {
        Self {
            current: SessionHandle {
                session,
                created_at,
            },
            policy,
        }
    }

    pub fn session(&self) -> &S {
        &self.current.session
    }

    pub fn created_at(&self) -> Instant {
        self.current.created_at
    }

    pub fn policy(&self) -> &RenewalPolicy {
        &self.policy
    }

    /// Whether the session is old enough to replace, for this jitter sample
    pub fn is_due(&self, now: Instant, jitter: f64) -> bool {
        let age = now.saturating_duration_since(self.created_at());
        age.as_secs_f64() >= self.policy.threshold_secs(jitter)
    }

    // Replaces the session if it is due
    //
    // Returns Ok(true) when a new session was opened. A failure from `open`
    // is handed straight back to the caller; the old session stays in place.
    pub fn renew_if_due<F>(&mut self, now: Instant, jitter: f64, open: F) -> Result<bool, FetchError>
    where
        F: FnOnce() -> Result<S, FetchError>,
    {
        if !self.is_due(now, jitter) {
            return Ok(false);
        }

        info!("Creating new scraper session...");
        let session = open()?;
        self.current = SessionHandle {
            session,
            created_at: now,
        };
        info!("New scraper session created");

        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> RenewalPolicy {
        RenewalPolicy {
            lifetime: Duration::from_secs(600),
            jitter_std_dev: 120.0,
        }
    }

    #[test]
    fn test_threshold_is_not_clamped() {
        let p = policy();
        assert_eq!(p.threshold_secs(0.0), 600.0);
        assert_eq!(p.threshold_secs(-550.0), 50.0);
        // Far below zero: no floor is applied
        assert_eq!(p.threshold_secs(-1_000.0), -400.0);
        // Far above: no ceiling either
        assert_eq!(p.threshold_secs(10_000.0), 10_600.0);
    }

    #[test]
    fn test_is_due() {
        let start = Instant::now();
        let manager = SessionManager::new(1u32, start, policy());

        let at_599 = start + Duration::from_secs(599);
        let at_600 = start + Duration::from_secs(600);

        assert!(!manager.is_due(at_599, 0.0));
        assert!(manager.is_due(at_600, 0.0));
        // Negative jitter renews early
        assert!(manager.is_due(start + Duration::from_secs(100), -500.0));
        // A negative threshold means "renew right now", even at age zero
        assert!(manager.is_due(start, -700.0));
        // Positive jitter renews late
        assert!(!manager.is_due(at_600, 1.0));
    }

    #[test]
    fn test_renew_replaces_session_and_timestamp() {
        let start = Instant::now();
        let mut manager = SessionManager::new(1u32, start, policy());

        let later = start + Duration::from_secs(700);
        let renewed = manager.renew_if_due(later, 0.0, || Ok(2)).unwrap();

        assert!(renewed);
        assert_eq!(*manager.session(), 2);
        assert_eq!(manager.created_at(), later);
    }

    #[test]
    fn test_not_due_does_not_open() {
        let start = Instant::now();
        let mut manager = SessionManager::new(1u32, start, policy());

        let renewed = manager
            .renew_if_due(start + Duration::from_secs(10), 0.0, || {
                panic!("should not open a session")
            })
            .unwrap();

        assert!(!renewed);
        assert_eq!(*manager.session(), 1);
    }

    #[test]
    fn test_failed_renewal_keeps_old_session() {
        let start = Instant::now();
        let mut manager = SessionManager::new(1u32, start, policy());

        let result = manager.renew_if_due(start + Duration::from_secs(900), 0.0, || {
            Err(FetchError::Session("boom".to_string()))
        });

        assert!(result.is_err());
        assert_eq!(*manager.session(), 1);
        assert_eq!(manager.created_at(), start);
    }
}
