//! Scheduled Jobs
//!
//! Background jobs for periodic maintenance tasks.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;

use crate::session::SessionStore;

// =========================================================================
// Expired Session Sweep
// =========================================================================

/// Remove sessions whose lifetime has passed
pub fn sweep_expired_sessions(sessions: &SessionStore) -> usize {
    let removed = sessions.purge_expired();

    if removed > 0 {
        tracing::info!(
            sessions_removed = removed,
            sessions_live = sessions.len(),
            "Swept expired sessions"
        );
    }

    removed
}

/// Sweep expired sessions every `every` until the task is aborted
pub async fn run_session_sweeper(sessions: Arc<SessionStore>, every: Duration) {
    tracing::info!(interval_secs = every.as_secs(), "Session sweeper started");

    let mut ticker = interval(every);
    loop {
        ticker.tick().await;
        sweep_expired_sessions(&sessions);
    }
}

// =========================================================================
// Job Scheduler
// =========================================================================

/// Configuration for job scheduler
#[derive(Debug, Clone)]
pub struct JobSchedulerConfig {
    /// Interval for the expired-session sweep (default: 5 minutes)
    pub session_sweep_interval: Duration,
}

impl Default for JobSchedulerConfig {
    fn default() -> Self {
        Self {
            session_sweep_interval: Duration::from_secs(300),
        }
    }
}

/// Job Scheduler - runs periodic maintenance tasks
pub struct JobScheduler {
    sessions: Arc<SessionStore>,
    config: JobSchedulerConfig,
}

impl JobScheduler {
    pub fn new(sessions: Arc<SessionStore>) -> Self {
        Self::with_config(sessions, JobSchedulerConfig::default())
    }

    pub fn with_config(sessions: Arc<SessionStore>, config: JobSchedulerConfig) -> Self {
        Self { sessions, config }
    }

    /// Start the job scheduler in the background
    /// Returns a handle that can be used to abort the scheduler
    pub fn start(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(run_session_sweeper(
            self.sessions,
            self.config.session_sweep_interval,
        ))
    }

    /// Run all maintenance jobs once (for manual trigger or testing)
    pub fn run_all_once(&self) -> MaintenanceReport {
        MaintenanceReport {
            sessions_removed: sweep_expired_sessions(&self.sessions),
            completed_at: Utc::now(),
        }
    }
}

/// Report from running maintenance jobs
#[derive(Debug, Clone, Default)]
pub struct MaintenanceReport {
    pub sessions_removed: usize,
    pub completed_at: DateTime<Utc>,
}

// =========================================================================
// Tests
// =========================================================================
