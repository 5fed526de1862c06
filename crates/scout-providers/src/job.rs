//! Snapshot jobs: the submit-then-poll protocol of dataset scrapers.
//!
//! A job is submitted elsewhere (the trigger call returns a snapshot id);
//! `SnapshotJob` then drives it through an explicit state machine:
//!
//! ```text
//! Submitted → Polling(1..=max_attempts) → Ready | Failed | TimedOut
//! ```
//!
//! The attempt ceiling in `PollPolicy` is the job's only timeout. Once it is
//! exhausted the job settles as `TimedOut` instead of waiting further.

use std::time::Duration;

use futures::future::BoxFuture;
use tracing::{debug, info, warn};

use scout_core::config::PollingConfig;
use scout_core::error::Result;

/// Status reported by the provider's progress endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotStatus {
    Running,
    Ready,
    Failed,
    Other(String),
}

impl SnapshotStatus {
    pub fn parse(status: &str) -> Self {
        match status {
            "running" => Self::Running,
            "ready" => Self::Ready,
            "failed" => Self::Failed,
            other => Self::Other(other.to_string()),
        }
    }
}

/// The two read endpoints a snapshot job needs.
pub trait SnapshotApi: Send + Sync {
    fn progress<'a>(&'a self, snapshot_id: &'a str) -> BoxFuture<'a, Result<SnapshotStatus>>;

    fn download<'a>(&'a self, snapshot_id: &'a str)
        -> BoxFuture<'a, Result<Vec<serde_json::Value>>>;
}

/// Bounded attempts with a fixed delay between polls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PollPolicy {
    pub max_attempts: u32,
    pub interval: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self::from(&PollingConfig::default())
    }
}

impl From<&PollingConfig> for PollPolicy {
    fn from(config: &PollingConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            interval: config.interval(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum JobPhase {
    Submitted { snapshot_id: String },
    /// `attempt` status checks have been made so far.
    Polling { snapshot_id: String, attempt: u32 },
    Ready { snapshot_id: String },
    Failed { reason: String },
    TimedOut { attempts: u32 },
}

impl JobPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Ready { .. } | Self::Failed { .. } | Self::TimedOut { .. }
        )
    }
}

/// How a job settled.
#[derive(Debug, Clone, PartialEq)]
pub enum JobOutcome {
    Ready(Vec<serde_json::Value>),
    Failed(String),
    TimedOut(u32),
}

pub struct SnapshotJob<'a> {
    api: &'a dyn SnapshotApi,
    policy: PollPolicy,
    phase: JobPhase,
}

impl<'a> SnapshotJob<'a> {
    pub fn new(api: &'a dyn SnapshotApi, snapshot_id: impl Into<String>, policy: PollPolicy) -> Self {
        Self {
            api,
            policy,
            phase: JobPhase::Submitted {
                snapshot_id: snapshot_id.into(),
            },
        }
    }

    pub fn phase(&self) -> &JobPhase {
        &self.phase
    }

    /// Advance the state machine by one transition. No-op once terminal.
    pub async fn step(&mut self) {
        let next = match &self.phase {
            JobPhase::Submitted { snapshot_id } => JobPhase::Polling {
                snapshot_id: snapshot_id.clone(),
                attempt: 0,
            },
            JobPhase::Polling {
                snapshot_id,
                attempt,
            } => self.poll(snapshot_id, *attempt).await,
            terminal => terminal.clone(),
        };
        self.phase = next;
    }

    async fn poll(&self, snapshot_id: &str, attempt: u32) -> JobPhase {
        if attempt >= self.policy.max_attempts {
            warn!(snapshot_id, attempts = attempt, "Max attempts reached without completing data collection");
            return JobPhase::TimedOut { attempts: attempt };
        }

        let attempt = attempt + 1;
        debug!(snapshot_id, attempt, "Checking snapshot status");

        match self.api.progress(snapshot_id).await {
            Ok(SnapshotStatus::Ready) => JobPhase::Ready {
                snapshot_id: snapshot_id.to_string(),
            },
            Ok(SnapshotStatus::Failed) => JobPhase::Failed {
                reason: "data collection failed".to_string(),
            },
            Ok(status) => {
                debug!(snapshot_id, attempt, status = ?status, "Snapshot not ready");
                if attempt < self.policy.max_attempts {
                    tokio::time::sleep(self.policy.interval).await;
                }
                JobPhase::Polling {
                    snapshot_id: snapshot_id.to_string(),
                    attempt,
                }
            }
            Err(e) => JobPhase::Failed {
                reason: format!("failed to get snapshot status: {}", e),
            },
        }
    }

    /// Drive the job to a terminal phase and download the data if it is ready.
    pub async fn run(mut self) -> JobOutcome {
        while !self.phase.is_terminal() {
            self.step().await;
        }

        match self.phase {
            JobPhase::Ready { snapshot_id } => match self.api.download(&snapshot_id).await {
                Ok(records) => {
                    info!(snapshot_id = %snapshot_id, records = records.len(), "Snapshot ready");
                    JobOutcome::Ready(records)
                }
                Err(e) => JobOutcome::Failed(format!("failed to get snapshot data: {}", e)),
            },
            JobPhase::Failed { reason } => JobOutcome::Failed(reason),
            JobPhase::TimedOut { attempts } => JobOutcome::TimedOut(attempts),
            // The loop above only exits on a terminal phase.
            JobPhase::Submitted { .. } | JobPhase::Polling { .. } => {
                JobOutcome::Failed("job did not settle".to_string())
            }
        }
    }
}
