use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, trace};

use super::entities::{Labels, Session};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum TimerStatus {
    #[default]
    Idle,
    Running,
}

/// Counts whole seconds while running. Elapsed time is advanced by [SessionTimer::tick] which is
/// expected to be called once per second, so scheduling jitter accumulates as drift. The counter
/// is kept when the timer is stopped and cleared only by a commit.
#[derive(Debug, Clone, Default)]
pub struct SessionTimer {
    status: TimerStatus,
    elapsed: u64,
}

impl SessionTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> TimerStatus {
        self.status
    }

    pub fn elapsed(&self) -> u64 {
        self.elapsed
    }

    pub fn is_running(&self) -> bool {
        self.status == TimerStatus::Running
    }

    pub fn start(&mut self) {
        if self.is_running() {
            return;
        }
        debug!("Starting timer at {}s", self.elapsed);
        self.status = TimerStatus::Running;
    }

    pub fn stop(&mut self) {
        if !self.is_running() {
            return;
        }
        debug!("Stopping timer at {}s", self.elapsed);
        self.status = TimerStatus::Idle;
    }

    /// Registers one elapsed second. Ignored while idle.
    pub fn tick(&mut self) {
        if self.is_running() {
            self.elapsed += 1;
            trace!("Timer tick {}", self.elapsed);
        }
    }

    /// Turns the counted time into a session. Nothing is produced when no time was counted.
    pub fn commit(&mut self, labels: Labels, now: DateTime<Utc>) -> Option<Session> {
        if self.elapsed == 0 {
            return None;
        }
        let session = labels.into_session(self.elapsed, now);
        self.elapsed = 0;
        Some(session)
    }

    pub fn reset(&mut self, labels: Labels, now: DateTime<Utc>) -> Option<Session> {
        self.stop();
        self.commit(labels, now)
    }
}
