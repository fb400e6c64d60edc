use std::io::{IsTerminal, Write};

use ansi_term::{Colour, Style};
use tracing::error;

use crate::{
    app::render::{Renderer, Snapshot, TimerView},
    domain::{
        aggregate::{format_duration, ClientGroups},
        entities::{Project, Session},
        registry::RegistryError,
        timer::TimerStatus,
    },
    utils::time::ClockReading,
};

/// What [TerminalRenderer::render] prints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Silent,
    /// Status block of the running `track` command.
    Live,
    Sessions,
    Summary,
    SummaryJson,
    Projects,
    Clients,
}

pub struct TerminalRenderer<W> {
    out: W,
    view: View,
    colored: bool,
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W, view: View, colored: bool) -> Self {
        Self { out, view, colored }
    }

    /// Colours output only when `out` is an interactive terminal, so piped output stays plain.
    pub fn detect_color(out: W, view: View) -> Self
    where
        W: IsTerminal,
    {
        let colored = out.is_terminal();
        Self::new(out, view, colored)
    }

    pub fn set_view(&mut self, view: View) {
        self.view = view;
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn paint(&self, style: Style, text: &str) -> String {
        if self.colored {
            style.paint(text).to_string()
        } else {
            text.to_string()
        }
    }

    fn write_lines(&mut self, lines: impl IntoIterator<Item = String>) {
        let result = lines
            .into_iter()
            .try_for_each(|line| writeln!(self.out, "{line}"))
            .and_then(|_| self.out.flush());
        if let Err(e) = result {
            error!("Failed to write to terminal {e:?}");
        }
    }

    fn live_lines(&self, snapshot: &Snapshot) -> Vec<String> {
        let status = match snapshot.timer.status {
            TimerStatus::Running => self.paint(Colour::Green.bold(), "running"),
            TimerStatus::Idle => self.paint(Style::new().dimmed(), "stopped"),
        };
        let labels = &snapshot.labels;
        vec![
            String::new(),
            format!("{}\t[{status}]", snapshot.timer.display),
            format!(
                "task: {}\tproject: {}\ttags: {}",
                or_dash(&labels.task),
                or_dash(&labels.project),
                or_dash(&labels.tags)
            ),
            format!(
                "today {}\tweek {}\tsessions {}",
                format_duration(snapshot.today_seconds),
                format_duration(snapshot.week_seconds),
                snapshot.sessions.len()
            ),
        ]
    }
}

impl<W: Write> Renderer for TerminalRenderer<W> {
    fn render(&mut self, snapshot: &Snapshot) {
        let lines = match self.view {
            View::Silent => return,
            View::Live => self.live_lines(snapshot),
            View::Sessions => format_sessions(&snapshot.sessions),
            View::Summary => format_summary(snapshot),
            View::SummaryJson => match serde_json::to_string_pretty(snapshot) {
                Ok(v) => vec![v],
                Err(e) => {
                    error!("Failed to serialize summary {e:?}");
                    return;
                }
            },
            View::Projects => format_projects(&snapshot.projects),
            View::Clients => format_clients(&snapshot.client_groups),
        };
        self.write_lines(lines);
    }

    fn render_tick(&mut self, reading: &ClockReading, timer: &TimerView) {
        if self.view != View::Live {
            return;
        }
        let result = write!(
            self.out,
            "\r{} {}  {}",
            reading.date, reading.time, timer.display
        )
        .and_then(|_| self.out.flush());
        if let Err(e) = result {
            error!("Failed to write to terminal {e:?}");
        }
    }

    fn render_error(&mut self, error: &RegistryError) {
        let line = self.paint(Colour::Red.bold(), &format!("✗ {error}"));
        self.write_lines([line]);
    }

    fn render_notice(&mut self, message: &str) {
        let line = self.paint(Colour::Yellow.normal(), message);
        self.write_lines([line]);
    }
}

fn or_dash(value: &str) -> &str {
    if value.trim().is_empty() {
        "-"
    } else {
        value
    }
}

pub fn format_sessions(sessions: &[Session]) -> Vec<String> {
    if sessions.is_empty() {
        return vec!["No sessions recorded".into()];
    }
    sessions
        .iter()
        .map(|v| {
            format!(
                "{}\t{}\t{}\t{}",
                v.task,
                v.project,
                format_duration(v.seconds),
                v.tags
            )
        })
        .collect()
}

pub fn format_summary(snapshot: &Snapshot) -> Vec<String> {
    let mut lines = vec![
        format!("Today\t{}", format_duration(snapshot.today_seconds)),
        format!("Week\t{}", format_duration(snapshot.week_seconds)),
        String::new(),
        "Projects".to_string(),
    ];
    if snapshot.project_totals.is_empty() {
        lines.push("--".into());
    }
    lines.extend(
        snapshot
            .project_totals
            .iter()
            .map(|v| format!("{}\t{}", format_duration(v.seconds), v.project)),
    );
    lines.push(String::new());
    lines.extend(format_clients(&snapshot.client_groups));
    lines
}

pub fn format_projects(projects: &[Project]) -> Vec<String> {
    if projects.is_empty() {
        return vec!["No projects".into()];
    }
    projects
        .iter()
        .map(|v| format!("{}\t{}", v.name, or_dash(&v.client)))
        .collect()
}

pub fn format_clients(groups: &ClientGroups) -> Vec<String> {
    let mut lines = vec![];
    for group in &groups.clients {
        lines.push(group.client.clone());
        lines.extend(group.projects.iter().map(|v| format!("  {v}")));
    }
    if !groups.unassigned.is_empty() {
        lines.push("No client".into());
        lines.extend(groups.unassigned.iter().map(|v| format!("  {v}")));
    }
    if lines.is_empty() {
        lines.push("No clients".into());
    }
    lines
}
