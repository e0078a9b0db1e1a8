// Data models for the task list

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A single to-do entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub completed: bool,
    /// Absent until first edited; `Some("")` is a valid, distinct value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl Task {
    /// Create an incomplete task with a fresh id
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            title: title.into(),
            completed: false,
            details: None,
        }
    }
}

/// Generate a fresh task id (UUIDv7, time-ordered)
pub fn new_id() -> String {
    uuid::Uuid::now_v7().to_string()
}

/// Light/dark appearance setting
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    /// The other theme
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(format!("unknown theme: {} (expected light or dark)", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    TaskAdded,
    TaskDeleted,
}

/// Ephemeral message for the presentation layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub title: &'static str,
    pub description: &'static str,
    /// Rendered in a destructive style (deletions)
    pub destructive: bool,
}

impl Notification {
    pub fn task_added() -> Self {
        Self {
            kind: NotificationKind::TaskAdded,
            title: "Task added",
            description: "Your new task has been added to the list.",
            destructive: false,
        }
    }

    pub fn task_deleted() -> Self {
        Self {
            kind: NotificationKind::TaskDeleted,
            title: "Task deleted",
            description: "The task has been removed from your list.",
            destructive: true,
        }
    }
}
