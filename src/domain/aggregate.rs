//! Summaries computed from the session collection. Every function here is pure: the collections
//! are passed in and nothing is cached, so summaries are simply recomputed after each change.

use std::{cmp::Ordering, collections::HashMap};

use chrono::{DateTime, NaiveDate, TimeZone};
use serde::Serialize;

use crate::utils::time::week_start;

use super::entities::{Client, Project, Session, NO_PROJECT};

/// Formats seconds as `HH:MM:SS`. The hour field grows when there are more than 99 hours.
pub fn format_duration(seconds: u64) -> String {
    format!(
        "{:02}:{:02}:{:02}",
        seconds / 3600,
        (seconds % 3600) / 60,
        seconds % 60
    )
}

/// Calendar day of a session in the timezone of `now`. Sessions without a timestamp belong to the
/// day of `now`.
fn session_day<Tz: TimeZone>(session: &Session, now: &DateTime<Tz>) -> NaiveDate {
    session
        .started_at
        .map(|v| v.with_timezone(&now.timezone()).date_naive())
        .unwrap_or_else(|| now.date_naive())
}

pub fn total_today<Tz: TimeZone>(sessions: &[Session], now: &DateTime<Tz>) -> u64 {
    let today = now.date_naive();
    sessions
        .iter()
        .filter(|v| session_day(v, now) == today)
        .map(|v| v.seconds)
        .sum()
}

/// Sums sessions started on or after midnight of the latest Monday.
pub fn total_this_week<Tz: TimeZone>(sessions: &[Session], now: &DateTime<Tz>) -> u64 {
    let monday = week_start(now.date_naive());
    sessions
        .iter()
        .filter(|v| session_day(v, now) >= monday)
        .map(|v| v.seconds)
        .sum()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectTotal {
    pub project: String,
    pub seconds: u64,
}

/// Returns time spent per project label, largest first.
pub fn totals_by_project(sessions: &[Session]) -> Vec<ProjectTotal> {
    let mut map = HashMap::<&str, u64>::new();

    for session in sessions {
        let label = session.project.trim();
        let label = if label.is_empty() { NO_PROJECT } else { label };
        *map.entry(label).or_default() += session.seconds;
    }

    let mut totals = map
        .into_iter()
        .map(|(project, seconds)| ProjectTotal {
            project: project.to_string(),
            seconds,
        })
        .collect::<Vec<_>>();
    // Ties are ordered by name to keep output stable between runs.
    totals.sort_by(|a, b| {
        b.seconds
            .cmp(&a.seconds)
            .then_with(|| compare_names(&a.project, &b.project))
    });
    totals
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientGroup {
    pub client: String,
    pub projects: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClientGroups {
    pub clients: Vec<ClientGroup>,
    /// Projects that don't name any client.
    pub unassigned: Vec<String>,
}

/// Groups project names under their clients. Client references ignore case, the same way client
/// names are kept unique. Projects referencing an unknown client appear in no group.
pub fn client_project_groups(projects: &[Project], clients: &[Client]) -> ClientGroups {
    let mut sorted = clients.iter().collect::<Vec<_>>();
    sorted.sort_by(|a, b| compare_names(&a.name, &b.name));

    let clients = sorted
        .into_iter()
        .map(|client| {
            let key = client.name.to_lowercase();
            ClientGroup {
                client: client.name.clone(),
                projects: projects
                    .iter()
                    .filter(|v| v.client.trim().to_lowercase() == key)
                    .map(|v| v.name.clone())
                    .collect(),
            }
        })
        .collect();

    let unassigned = projects
        .iter()
        .filter(|v| !v.has_client())
        .map(|v| v.name.clone())
        .collect();

    ClientGroups {
        clients,
        unassigned,
    }
}

/// Approximates locale collation: letters compare without regard to case, and the exact text only
/// breaks ties.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}
