// src/monitor/scheduler.rs
// =============================================================================
// The main loop.
//
// One iteration:
// 1. Maybe renew the scraping session (fetch/session.rs)
// 2. Fetch the page (10 s timeout)
//    - non-200 status  -> soft failure: log, skip straight to step 5
//    - anything else   -> hard failure: ErrorBackoff (fixed 30 s), then retry
// 3. Extract a Snapshot from the page
// 4. Diff against the previous Snapshot; if it changed, notify and store it
// 5. Sleep 70 s +/- jitter (never less than 1 s) and go again
//
// States:
//
//   Running --hard failure--> ErrorBackoff --30 s--> Running
//      |                           |
//      +------- Ctrl-C ------------+--------> Stopped
//
// Everything runs on one task, one iteration at a time. The only thing that
// can interrupt us is the cancellation token, and only while we sleep.
// =============================================================================

use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use url::Url;

use super::timing::{poll_delay, Jitter};
use crate::config::{Config, Timing};
use crate::fetch::{FetchError, Fetcher, SessionManager};
use crate::notify::{ChangeMessage, Notifier};
use crate::units::{diff, ExtractError, Extractor, Snapshot, UnitRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    ErrorBackoff,
    Stopped,
}

// A failure that sends the loop into ErrorBackoff
#[derive(Debug, Error)]
pub enum IterationError {
    #[error("session renewal failed: {0}")]
    Session(FetchError),
    #[error("fetch failed: {0}")]
    Fetch(FetchError),
    #[error("could not extract units: {0}")]
    Extract(ExtractError),
}

#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("could not open the initial scraping session: {0}")]
    Startup(FetchError),
    #[error("giving up after {count} consecutive failures (last: {last})")]
    TooManyFailures { count: u32, last: IterationError },
}

// What one fetch-and-extract step produced
#[derive(Debug)]
pub enum PollOutcome {
    /// A fresh snapshot of the page
    Success(Snapshot),
    /// The server answered, but not with a 200
    SoftFailure { status: u16 },
    /// Something went wrong that we can't reason about locally
    HardFailure(IterationError),
}

// State carried from one iteration to the next
struct MonitorState<S> {
    previous: Snapshot,
    sessions: SessionManager<S>,
}

pub struct Monitor<F: Fetcher, E, N, J> {
    target: Url,
    instance_name: String,
    timing: Timing,
    max_consecutive_errors: Option<u32>,
    fetcher: F,
    extractor: E,
    notifier: N,
    jitter: J,
    state: MonitorState<F::Session>,
    loop_state: LoopState,
    consecutive_failures: u32,
}

impl<F, E, N, J> Monitor<F, E, N, J>
where
    F: Fetcher,
    E: Extractor,
    N: Notifier,
    J: Jitter,
{
    // Builds the monitor and opens the first scraping session
    pub fn new(
        config: &Config,
        fetcher: F,
        extractor: E,
        notifier: N,
        jitter: J,
    ) -> Result<Self, MonitorError> {
        let session = fetcher.open_session().map_err(MonitorError::Startup)?;
        let sessions = SessionManager::new(session, Instant::now(), config.timing.renewal_policy());

        Ok(Monitor {
            target: config.target.clone(),
            instance_name: config.instance_name.clone(),
            timing: config.timing.clone(),
            max_consecutive_errors: config.max_consecutive_errors,
            fetcher,
            extractor,
            notifier,
            jitter,
            state: MonitorState {
                previous: Snapshot::new(),
                sessions,
            },
            loop_state: LoopState::Running,
            consecutive_failures: 0,
        })
    }

    pub fn state(&self) -> LoopState {
        self.loop_state
    }

    /// The snapshot every new poll is compared against
    pub fn previous(&self) -> &Snapshot {
        &self.state.previous
    }

    // Runs until `cancel` fires
    //
    // Only returns an error when a consecutive-failure limit was configured
    // and reached. Without one, this loops forever.
    pub async fn run(&mut self, cancel: &CancellationToken) -> Result<(), MonitorError> {
        info!("Starting apartment monitoring loop...");
        info!("Monitoring: {}", self.instance_name);
        info!("URL: {}", self.target);
        info!(
            "Checking for changes every {} seconds (±{} seconds)...",
            self.timing.poll_interval.as_secs(),
            self.timing.poll_jitter_std_dev
        );
        info!(
            "Renewing scraper session every {} seconds (±{} seconds)...",
            self.timing.session_lifetime.as_secs(),
            self.timing.session_jitter_std_dev
        );

        while !cancel.is_cancelled() {
            let delay = match self.step().await {
                Ok(delay) => delay,
                Err(e) => {
                    self.loop_state = LoopState::Stopped;
                    return Err(e);
                }
            };

            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(delay) => {}
            }

            if self.loop_state == LoopState::ErrorBackoff {
                info!("Resuming monitoring");
                self.loop_state = LoopState::Running;
            }
        }

        self.loop_state = LoopState::Stopped;
        info!("Monitoring stopped by user");
        Ok(())
    }

    // Runs one full iteration and returns how long to sleep afterwards
    //
    // Leaves the monitor in ErrorBackoff after a hard failure; `run` moves it
    // back to Running once the backoff sleep is over.
    pub async fn step(&mut self) -> Result<Duration, MonitorError> {
        match self.poll().await {
            PollOutcome::Success(current) => {
                self.consecutive_failures = 0;
                self.apply(current).await;
                Ok(self.next_poll_delay())
            }
            PollOutcome::SoftFailure { status } => {
                self.consecutive_failures = 0;
                warn!("Failed to retrieve page. Status code: {}", status);
                Ok(self.next_poll_delay())
            }
            PollOutcome::HardFailure(err) => {
                self.consecutive_failures += 1;
                error!("Error in main loop: {}", err);

                if let Some(max) = self.max_consecutive_errors {
                    if self.consecutive_failures >= max {
                        error!("{} consecutive failures, stopping", self.consecutive_failures);
                        return Err(MonitorError::TooManyFailures {
                            count: self.consecutive_failures,
                            last: err,
                        });
                    }
                }

                self.loop_state = LoopState::ErrorBackoff;
                info!(
                    "Waiting {} seconds before retrying...",
                    self.timing.error_backoff.as_secs_f64()
                );
                Ok(self.timing.error_backoff)
            }
        }
    }

    // Steps 1-3: renew if due, fetch, extract
    pub async fn poll(&mut self) -> PollOutcome {
        let jitter = self
            .jitter
            .sample(self.state.sessions.policy().jitter_std_dev);
        let fetcher = &self.fetcher;
        if let Err(e) = self
            .state
            .sessions
            .renew_if_due(Instant::now(), jitter, || fetcher.open_session())
        {
            return PollOutcome::HardFailure(IterationError::Session(e));
        }

        let response = match self
            .fetcher
            .get(
                self.state.sessions.session(),
                &self.target,
                self.timing.request_timeout,
            )
            .await
        {
            Ok(response) => response,
            Err(e) => return PollOutcome::HardFailure(IterationError::Fetch(e)),
        };

        if !response.is_ok() {
            return PollOutcome::SoftFailure {
                status: response.status,
            };
        }

        match self.extractor.parse(&response.body) {
            Ok(snapshot) => PollOutcome::Success(snapshot),
            Err(e) => PollOutcome::HardFailure(IterationError::Extract(e)),
        }
    }

    // Step 4: diff, notify, store
    async fn apply(&mut self, current: Snapshot) {
        let changes = diff(&self.state.previous, &current);

        if !changes.changed {
            info!("No changes detected ({} units)", current.len());
            return;
        }

        info!(
            "🔔 Changes detected! {} added, {} removed",
            changes.added.len(),
            changes.removed.len()
        );
        if current.is_empty() {
            info!("No units currently listed");
        } else {
            info!("Current units:");
            for (i, unit) in current.iter().enumerate() {
                info!("{}", unit_line(i + 1, unit));
            }
        }

        let message = ChangeMessage::new(&current, &self.state.previous, &self.instance_name);
        if let Err(e) = self.notifier.notify(&message).await {
            error!("Error sending notification: {}", e);
        }

        // Stored even if the notification failed
        self.state.previous = current;
    }

    // Step 5: 70 s + N(0, 20), floored at 1 s
    fn next_poll_delay(&mut self) -> Duration {
        let jitter = self.jitter.sample(self.timing.poll_jitter_std_dev);
        let delay = poll_delay(self.timing.poll_interval, jitter, self.timing.min_poll_delay);
        info!("Waiting {:.1} seconds until next check...", delay.as_secs_f64());
        delay
    }
}

// "  Unit 1: 2BR | $2,000 | 900 sq.ft. | Available Now"
fn unit_line(number: usize, unit: &UnitRecord) -> String {
    format!(
        "  Unit {}: {} | {} | {} | {}",
        number,
        unit.bedroom(),
        unit.price(),
        unit.sqft(),
        unit.availability()
    )
}
