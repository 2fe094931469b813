//! Task model for parsed todo files.
//!
//! A parsed directory is a list of per-file root [`Task`]s. Each root has no
//! visible content of its own; its children are the top-level lines of the
//! file, and their children follow the grouping rules of the parser.
//!
//! # Wire Format
//!
//! Tasks serialize to the shape the dashboard frontend consumes:
//!
//! ```json
//! {
//!   "status": 1,
//!   "date": "2024-05-15",
//!   "source": "/home/user/todo/240515-notes.txt",
//!   "subtasks": [
//!     { "status": 2, "content": "Buy milk" },
//!     { "status": 0, "content": "Fix bug", "priority": 1, "tentative": true }
//!   ]
//! }
//! ```
//!
//! Status is encoded as `0..=3` and priority as `-1..=1`. Default-valued
//! optional fields are omitted.

use std::fmt;
use std::path::PathBuf;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Completion state of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Status {
    #[default]
    NotStarted,
    InProgress,
    Completed,
    Dropped,
}

impl Status {
    /// Maps a status marker character to its status.
    #[must_use]
    pub fn from_marker(marker: char) -> Option<Self> {
        match marker {
            'x' => Some(Self::Completed),
            '~' => Some(Self::InProgress),
            '#' => Some(Self::Dropped),
            _ => None,
        }
    }

    /// Returns `true` if a child with this status starts its parent group.
    ///
    /// Dropped children never promote a group.
    #[must_use]
    pub fn promotes_parent(self) -> bool {
        matches!(self, Self::InProgress | Self::Completed)
    }
}

impl From<Status> for u8 {
    fn from(status: Status) -> Self {
        match status {
            Status::NotStarted => 0,
            Status::InProgress => 1,
            Status::Completed => 2,
            Status::Dropped => 3,
        }
    }
}

impl TryFrom<u8> for Status {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::NotStarted),
            1 => Ok(Self::InProgress),
            2 => Ok(Self::Completed),
            3 => Ok(Self::Dropped),
            other => Err(format!("unknown status code {other}")),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::NotStarted => "Not Started",
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
            Self::Dropped => "Dropped",
        };
        f.write_str(label)
    }
}

/// Priority of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "i8", try_from = "i8")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    /// Maps a priority marker character to its priority.
    #[must_use]
    pub fn from_marker(marker: char) -> Option<Self> {
        match marker {
            '!' => Some(Self::High),
            '.' => Some(Self::Low),
            _ => None,
        }
    }

    /// Returns `true` for the default priority.
    #[must_use]
    pub fn is_medium(&self) -> bool {
        *self == Self::Medium
    }
}

impl From<Priority> for i8 {
    fn from(priority: Priority) -> Self {
        match priority {
            Priority::Low => -1,
            Priority::Medium => 0,
            Priority::High => 1,
        }
    }
}

impl TryFrom<i8> for Priority {
    type Error = String;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        match value {
            -1 => Ok(Self::Low),
            0 => Ok(Self::Medium),
            1 => Ok(Self::High),
            other => Err(format!("unknown priority code {other}")),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        };
        f.write_str(label)
    }
}

/// A node of the parsed task tree.
///
/// Per-file roots carry `source` and, when the file name starts with a
/// `YYMMDD` date, `date`. Every other node is reachable only through its
/// file's root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub status: Status,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub content: String,

    #[serde(default, skip_serializing_if = "Priority::is_medium")]
    pub priority: Priority,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub tentative: bool,

    #[serde(default, rename = "subtasks", skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Task>,
}

impl Task {
    /// Returns `true` if this task has any children.
    #[must_use]
    pub fn is_group(&self) -> bool {
        !self.children.is_empty()
    }

    /// Number of tasks in this subtree, including `self`.
    #[must_use]
    pub fn count(&self) -> usize {
        let mut total = 0;
        let mut pending = vec![self];
        while let Some(task) = pending.pop() {
            total += 1;
            pending.extend(task.children.iter());
        }
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(content: &str) -> Task {
        Task {
            content: content.to_string(),
            ..Task::default()
        }
    }

    #[test]
    fn defaults_are_not_started_and_medium() {
        let task = Task::default();
        assert_eq!(task.status, Status::NotStarted);
        assert_eq!(task.priority, Priority::Medium);
        assert!(!task.tentative);
        assert!(task.children.is_empty());
    }

    #[test]
    fn status_markers() {
        assert_eq!(Status::from_marker('x'), Some(Status::Completed));
        assert_eq!(Status::from_marker('~'), Some(Status::InProgress));
        assert_eq!(Status::from_marker('#'), Some(Status::Dropped));
        assert_eq!(Status::from_marker('!'), None);
    }

    #[test]
    fn priority_markers() {
        assert_eq!(Priority::from_marker('!'), Some(Priority::High));
        assert_eq!(Priority::from_marker('.'), Some(Priority::Low));
        assert_eq!(Priority::from_marker('x'), None);
    }

    #[test]
    fn dropped_does_not_promote() {
        assert!(Status::InProgress.promotes_parent());
        assert!(Status::Completed.promotes_parent());
        assert!(!Status::Dropped.promotes_parent());
        assert!(!Status::NotStarted.promotes_parent());
    }

    #[test]
    fn serializes_codes_and_omits_defaults() {
        let task = Task {
            status: Status::Completed,
            content: "Buy milk".to_string(),
            ..Task::default()
        };
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json, serde_json::json!({ "status": 2, "content": "Buy milk" }));
    }

    #[test]
    fn serializes_root_with_date_and_subtasks() {
        let root = Task {
            status: Status::InProgress,
            source: Some(PathBuf::from("/todo/240515-notes.txt")),
            date: NaiveDate::from_ymd_opt(2024, 5, 15),
            children: vec![Task {
                priority: Priority::Low,
                tentative: true,
                ..leaf("Maybe go")
            }],
            ..Task::default()
        };
        let json = serde_json::to_value(&root).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "status": 1,
                "date": "2024-05-15",
                "source": "/todo/240515-notes.txt",
                "subtasks": [
                    { "status": 0, "content": "Maybe go", "priority": -1, "tentative": true }
                ]
            })
        );
    }

    #[test]
    fn deserializes_wire_format() {
        let task: Task =
            serde_json::from_str(r#"{"status":3,"content":"Cancelled","priority":1}"#).unwrap();
        assert_eq!(task.status, Status::Dropped);
        assert_eq!(task.priority, Priority::High);
        assert_eq!(task.content, "Cancelled");
    }

    #[test]
    fn rejects_unknown_status_code() {
        let result: Result<Task, _> = serde_json::from_str(r#"{"status":9}"#);
        assert!(result.is_err());
    }

    #[test]
    fn count_walks_the_subtree() {
        let tree = Task {
            children: vec![
                Task {
                    children: vec![leaf("Child one"), leaf("Child two")],
                    ..leaf("Parent task")
                },
                leaf("Other"),
            ],
            ..Task::default()
        };
        assert_eq!(tree.count(), 5);
        assert!(tree.is_group());
    }

    #[test]
    fn display_labels() {
        assert_eq!(Status::NotStarted.to_string(), "Not Started");
        assert_eq!(Status::Dropped.to_string(), "Dropped");
        assert_eq!(Priority::High.to_string(), "High");
    }
}
