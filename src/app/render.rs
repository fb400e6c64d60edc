use serde::Serialize;

use crate::{
    domain::{
        aggregate::{format_duration, ClientGroups, ProjectTotal},
        entities::{Client, Labels, Project, Session},
        registry::RegistryError,
        timer::{SessionTimer, TimerStatus},
    },
    utils::time::ClockReading,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimerView {
    pub status: TimerStatus,
    pub elapsed: u64,
    pub display: String,
}

impl From<&SessionTimer> for TimerView {
    fn from(timer: &SessionTimer) -> Self {
        Self {
            status: timer.status(),
            elapsed: timer.elapsed(),
            display: format_duration(timer.elapsed()),
        }
    }
}

/// Plain copy of the application state together with everything derived from it. Renderers only
/// ever see this.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub sessions: Vec<Session>,
    pub projects: Vec<Project>,
    pub clients: Vec<Client>,
    pub timer: TimerView,
    pub labels: Labels,
    pub today_seconds: u64,
    pub week_seconds: u64,
    pub project_totals: Vec<ProjectTotal>,
    pub client_groups: ClientGroups,
}

/// Output side of the tracker. [Renderer::render] is called after every change of the state,
/// [Renderer::render_tick] once per second.
#[cfg_attr(test, mockall::automock)]
pub trait Renderer {
    fn render(&mut self, snapshot: &Snapshot);

    fn render_tick(&mut self, reading: &ClockReading, timer: &TimerView);

    /// Signals a rejected registry input.
    fn render_error(&mut self, error: &RegistryError);

    fn render_notice(&mut self, message: &str);
}
