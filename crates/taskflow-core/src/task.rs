use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::error::StoreError;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];

    /// Sort weight; higher is more urgent.
    pub fn rank(self) -> u8 {
        match self {
            Priority::Low => 1,
            Priority::Medium => 2,
            Priority::High => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
        }
    }

    /// Caption shown under a task, e.g. "High Priority".
    pub fn caption(self) -> String {
        format!("{} Priority", self.label())
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = StoreError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" | "l" => Ok(Priority::Low),
            "medium" | "med" | "m" => Ok(Priority::Medium),
            "high" | "h" => Ok(Priority::High),
            other => Err(StoreError::Validation(format!("unknown priority '{other}'"))),
        }
    }
}

/// One row of the backend's `tasks` table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Task {
    pub id: Uuid,

    pub user_id: Uuid,

    pub title: String,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,

    #[serde(default)]
    pub priority: Priority,

    #[serde(default)]
    pub completed: bool,

    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
}

impl Task {
    pub fn is_pending(&self) -> bool {
        !self.completed
    }

    pub fn has_description(&self) -> bool {
        !self.description.trim().is_empty()
    }

    /// Completion time worth showing; a stamp left over on a reopened task is
    /// ignored.
    pub fn completion_stamp(&self) -> Option<DateTime<Utc>> {
        if self.completed { self.completed_at } else { None }
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

pub fn validate_title(title: &str) -> Result<(), StoreError> {
    if title.trim().is_empty() {
        return Err(StoreError::Validation("title must not be empty".to_string()));
    }
    Ok(())
}

/// Insert payload; the store adds the owner and `completed = false`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub priority: Priority,
}

impl NewTask {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        priority: Priority,
    ) -> Result<Self, StoreError> {
        let title = title.into();
        validate_title(&title)?;
        Ok(Self {
            title,
            description: description.into(),
            priority,
        })
    }
}

/// Full replacement of the editable fields.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TaskEdit {
    pub title: String,
    pub description: String,
    pub priority: Priority,
}

impl TaskEdit {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        priority: Priority,
    ) -> Result<Self, StoreError> {
        let title = title.into();
        validate_title(&title)?;
        Ok(Self {
            title,
            description: description.into(),
            priority,
        })
    }
}

/// Completion write. `completed_at: None` leaves the column untouched,
/// `Some(None)` writes null.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CompletionPatch {
    pub completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<Option<DateTime<Utc>>>,
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    use super::*;

    #[test]
    fn decodes_backend_row_with_null_description() {
        let row = json!({
            "id": "8a6e0804-2bd0-4672-b79d-d97027f9071a",
            "user_id": "b5e0c2a4-4f4e-4a53-9d0b-6c1b0e0c6a11",
            "title": "Water the tomatoes",
            "description": null,
            "priority": "high",
            "completed": true,
            "completed_at": "2024-01-15T10:30:00+00:00",
            "created_at": "2024-01-14T08:00:00.123456+00:00"
        });

        let task: Task = serde_json::from_value(row).expect("decode task row");
        assert_eq!(task.description, "");
        assert_eq!(task.priority, Priority::High);
        assert_eq!(
            task.completion_stamp(),
            Some(Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap())
        );
    }

    #[test]
    fn missing_priority_defaults_to_medium() {
        let row = json!({
            "id": "8a6e0804-2bd0-4672-b79d-d97027f9071a",
            "user_id": "b5e0c2a4-4f4e-4a53-9d0b-6c1b0e0c6a11",
            "title": "Call the vet",
            "created_at": "2024-01-14T08:00:00Z"
        });

        let task: Task = serde_json::from_value(row).expect("decode task row");
        assert_eq!(task.priority, Priority::Medium);
        assert!(task.is_pending());
        assert!(task.completed_at.is_none());
    }

    #[test]
    fn stale_stamp_on_reopened_task_is_hidden() {
        let mut task = Task {
            id: uuid::Uuid::new_v4(),
            user_id: uuid::Uuid::new_v4(),
            title: "Reopened".to_string(),
            description: String::new(),
            priority: Priority::Low,
            completed: false,
            completed_at: Some(Utc::now()),
            created_at: Utc::now(),
        };
        assert_eq!(task.completion_stamp(), None);
        task.completed = true;
        assert!(task.completion_stamp().is_some());
    }

    #[test]
    fn rejects_whitespace_title() {
        let err = NewTask::new("   ", "", Priority::Medium).unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
        assert!(TaskEdit::new("\t\n", "desc", Priority::High).is_err());
        assert!(NewTask::new(" keep spaces ", "", Priority::Low).is_ok());
    }

    #[test]
    fn priority_parses_and_ranks() {
        assert_eq!("HIGH".parse::<Priority>().unwrap(), Priority::High);
        assert_eq!("m".parse::<Priority>().unwrap(), Priority::Medium);
        assert!("urgent".parse::<Priority>().is_err());
        assert!(Priority::High.rank() > Priority::Medium.rank());
        assert!(Priority::Medium.rank() > Priority::Low.rank());
        assert_eq!(Priority::Low.caption(), "Low Priority");
    }

    #[test]
    fn completion_patch_serializes_explicit_null() {
        let clear = CompletionPatch {
            completed: false,
            completed_at: Some(None),
        };
        assert_eq!(
            serde_json::to_value(&clear).unwrap(),
            json!({ "completed": false, "completed_at": null })
        );

        let keep = CompletionPatch {
            completed: false,
            completed_at: None,
        };
        assert_eq!(
            serde_json::to_value(&keep).unwrap(),
            json!({ "completed": false })
        );
    }
}
