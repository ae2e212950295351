//! Polling a freshly started cluster until it accepts client connections.
//!
//! Log output lags the moment the client listener is actually up, so the
//! first node's log is fetched repeatedly until the readiness marker shows up
//! or the attempt budget runs out.

use std::time::Duration;

use ccm_process::CommandRunner;
use regex::{Regex, RegexBuilder};
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::commands;
use crate::error::{Error, Result};
use crate::node::NodeIndex;

/// Log line written once a node accepts CQL client connections.
pub const READINESS_MARKER: &str = "Starting listening for CQL clients";

const DEFAULT_MAX_ATTEMPTS: u32 = 10;
const DEFAULT_INTERVAL: Duration = Duration::from_millis(1000);

/// What to report when the marker never appears.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExhaustionPolicy {
    /// Report the cluster as up anyway.
    ///
    /// This matches the historical behavior of the harness, which never failed
    /// a start because the marker was missing.
    #[default]
    ReportReady,

    /// Fail with [`Error::ReadinessExhausted`].
    Fail,
}

/// How readiness is polled.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReadinessPolicy {
    /// Text searched for in the log, case-insensitively.
    pub marker: String,

    /// Maximum number of log polls.
    pub max_attempts: u32,

    /// Delay between two polls.
    pub interval: Duration,

    /// Outcome when every poll misses the marker.
    pub on_exhaustion: ExhaustionPolicy,
}

impl Default for ReadinessPolicy {
    fn default() -> Self {
        Self {
            marker: READINESS_MARKER.to_string(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            interval: DEFAULT_INTERVAL,
            on_exhaustion: ExhaustionPolicy::default(),
        }
    }
}

/// Result of a poll session.
#[must_use]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Readiness {
    /// The marker was found on the given attempt.
    Satisfied {
        /// Number of polls made, including the successful one.
        attempts: u32,
    },

    /// Every attempt missed the marker and the policy reported success anyway.
    Exhausted {
        /// Number of polls made.
        attempts: u32,
    },
}

impl Readiness {
    /// Returns whether the marker was actually observed.
    #[must_use]
    pub const fn is_satisfied(self) -> bool {
        matches!(self, Self::Satisfied { .. })
    }

    /// Returns the number of polls made.
    #[must_use]
    pub const fn attempts(self) -> u32 {
        match self {
            Self::Satisfied { attempts } | Self::Exhausted { attempts } => attempts,
        }
    }
}

/// Progress of a single poll session.
struct RetryState {
    attempt: u32,
    interval: Duration,
    max_attempts: u32,
    satisfied: bool,
}

impl RetryState {
    const fn new(max_attempts: u32, interval: Duration) -> Self {
        Self {
            attempt: 0,
            interval,
            max_attempts,
            satisfied: false,
        }
    }

    const fn has_remaining(&self) -> bool {
        !self.satisfied && self.attempt < self.max_attempts
    }

    const fn outcome(&self) -> Option<Readiness> {
        if self.satisfied {
            Some(Readiness::Satisfied {
                attempts: self.attempt,
            })
        } else {
            None
        }
    }
}

/// Polls the first node's log for the readiness marker.
#[derive(Clone, Debug)]
pub struct UpPoller {
    interval: Duration,
    marker: Regex,
    max_attempts: u32,
    on_exhaustion: ExhaustionPolicy,
}

impl UpPoller {
    /// Creates a new `UpPoller`.
    ///
    /// A policy with `max_attempts` of 0 still polls once.
    ///
    /// # Errors
    ///
    /// Returns an error if the marker cannot be turned into a pattern.
    pub fn new(policy: &ReadinessPolicy) -> Result<Self> {
        let marker = RegexBuilder::new(&regex::escape(&policy.marker))
            .case_insensitive(true)
            .multi_line(true)
            .build()?;

        Ok(Self {
            interval: policy.interval,
            marker,
            max_attempts: policy.max_attempts.max(1),
            on_exhaustion: policy.on_exhaustion,
        })
    }

    /// Returns whether `log` contains the readiness marker.
    #[must_use]
    pub fn is_marker_present(&self, log: &str) -> bool {
        self.marker.is_match(log)
    }

    /// Polls until the marker appears or the attempt budget is spent.
    ///
    /// # Errors
    ///
    /// A failing log command ends polling immediately with its error.
    /// Exhaustion is an error only under [`ExhaustionPolicy::Fail`].
    pub async fn poll<R>(&self, runner: &R) -> Result<Readiness>
    where
        R: CommandRunner + ?Sized,
    {
        let command = commands::show_log(NodeIndex::FIRST);
        let mut state = RetryState::new(self.max_attempts, self.interval);

        loop {
            state.attempt += 1;

            let result = runner.execute(&command).await?;
            state.satisfied = self.is_marker_present(&result.stdout_text());

            if let Some(readiness) = state.outcome() {
                info!("cluster accepting clients after {} attempt(s)", state.attempt);

                return Ok(readiness);
            }

            if !state.has_remaining() {
                break;
            }

            debug!(
                "readiness marker not found (attempt {}/{}), retrying in {:?}",
                state.attempt, state.max_attempts, state.interval
            );

            sleep(state.interval).await;
        }

        match self.on_exhaustion {
            ExhaustionPolicy::ReportReady => {
                warn!(
                    "readiness marker not seen after {} attempts, reporting cluster as up",
                    state.attempt
                );

                Ok(Readiness::Exhausted {
                    attempts: state.attempt,
                })
            }
            ExhaustionPolicy::Fail => Err(Error::ReadinessExhausted {
                attempts: state.attempt,
            }),
        }
    }
}
