use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const UNTITLED_TASK: &str = "untitled task";
pub const NO_PROJECT: &str = "no project";
pub const NO_TAGS: &str = "-";

/// One completed timed work interval. Sessions are never edited after being created, which is why
/// every field is a plain label rather than a reference into the registries.
#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub task: String,
    /// Denormalized project label. It may point to a project that was removed or never existed.
    pub project: String,
    pub tags: String,
    pub seconds: u64,
    /// Older records don't carry a timestamp. Those are treated as belonging to the current day.
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
}

#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub name: String,
    /// Name of a [Client]. Blank means the project isn't assigned to anyone.
    #[serde(default)]
    pub client: String,
    pub created_at: DateTime<Utc>,
}

impl Project {
    pub fn has_client(&self) -> bool {
        !self.client.trim().is_empty()
    }
}

#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Labels currently typed in by the user. They are copied into a [Session] when the timer is
/// committed.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct Labels {
    pub task: String,
    pub project: String,
    pub tags: String,
}

impl Labels {
    pub fn new(task: impl Into<String>, project: impl Into<String>, tags: impl Into<String>) -> Self {
        Self {
            task: task.into(),
            project: project.into(),
            tags: tags.into(),
        }
    }

    /// Creates a session out of the labels, replacing blank ones with placeholders.
    pub fn into_session(self, seconds: u64, started_at: DateTime<Utc>) -> Session {
        Session {
            task: or_placeholder(self.task, UNTITLED_TASK),
            project: or_placeholder(self.project, NO_PROJECT),
            tags: or_placeholder(self.tags, NO_TAGS),
            seconds,
            started_at: Some(started_at),
        }
    }
}

fn or_placeholder(value: String, placeholder: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        placeholder.to_string()
    } else {
        trimmed.to_string()
    }
}
