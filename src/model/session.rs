use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

use utoipa::ToSchema;

use crate::errors::SessionError;
use crate::model::location::Location;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TaskStatus {
    Completed,
    Pending,
    Blockage,
}

/// Arbitrary name/value pair attached to a task at checkout. Insertion order
/// is preserved for display and export.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CustomField {
    #[schema(example = "ticket")]
    pub name: String,
    #[schema(example = "ATT-17")]
    pub value: String,
}

/// Task summary recorded at checkout, immutable thereafter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRecord {
    pub description: String,
    pub status: TaskStatus,
    pub project_name: String,
    pub custom_fields: Vec<CustomField>,
}

impl TaskRecord {
    /// Validates the raw checkout payload into a task record.
    pub fn new(
        description: &str,
        status: &str,
        project_name: &str,
        custom_fields: Vec<CustomField>,
    ) -> Result<Self, SessionError> {
        let description = description.trim();
        if description.chars().count() < 5 {
            return Err(SessionError::InvalidTask(
                "Task description must be at least 5 characters".to_string(),
            ));
        }

        let status = status.trim().parse::<TaskStatus>().map_err(|_| {
            SessionError::InvalidTask(
                "Valid task status is required (pending, blockage, completed)".to_string(),
            )
        })?;

        let project_name = project_name.trim();
        if project_name.chars().count() < 2 {
            return Err(SessionError::InvalidTask(
                "Project name must be at least 2 characters".to_string(),
            ));
        }

        Ok(Self {
            description: description.to_string(),
            status,
            project_name: project_name.to_string(),
            custom_fields,
        })
    }
}

/// One user's continuous work period between check-in and check-out on a
/// given calendar day. Open while `check_out` is absent; a closed session
/// never reopens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceSession {
    pub id: Uuid,
    pub user_id: u64,
    pub date: NaiveDate,
    pub check_in: DateTime<Utc>,
    pub check_out: Option<DateTime<Utc>>,
    pub location: Location,
    pub task: Option<TaskRecord>,
}

impl AttendanceSession {
    pub fn is_open(&self) -> bool {
        self.check_out.is_none()
    }

    pub fn duration(&self) -> Option<Duration> {
        self.check_out.map(|out| out - self.check_in)
    }

    /// Fractional hours worked; undefined while open.
    pub fn hours(&self) -> Option<f64> {
        self.duration().map(|d| d.num_seconds() as f64 / 3600.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_requires_minimum_description() {
        let err = TaskRecord::new("Bug", "completed", "Auth", Vec::new()).unwrap_err();
        assert!(matches!(err, SessionError::InvalidTask(msg) if msg.contains("5 characters")));
    }

    #[test]
    fn task_requires_known_status() {
        let err = TaskRecord::new("Fixed login bug", "done", "Auth", Vec::new()).unwrap_err();
        assert!(matches!(err, SessionError::InvalidTask(msg) if msg.contains("pending, blockage, completed")));
    }

    #[test]
    fn task_requires_minimum_project_name() {
        let err = TaskRecord::new("Fixed login bug", "completed", "A", Vec::new()).unwrap_err();
        assert!(matches!(err, SessionError::InvalidTask(msg) if msg.contains("Project name")));
    }

    #[test]
    fn task_trims_and_keeps_custom_fields_in_order() {
        let fields = vec![
            CustomField { name: "ticket".to_string(), value: "ATT-17".to_string() },
            CustomField { name: "reviewer".to_string(), value: "priya".to_string() },
        ];
        let task = TaskRecord::new("  Fixed login bug  ", "completed", " Auth ", fields).unwrap();
        assert_eq!(task.description, "Fixed login bug");
        assert_eq!(task.project_name, "Auth");
        assert_eq!(task.status, TaskStatus::Completed);
        assert_eq!(task.custom_fields[0].name, "ticket");
        assert_eq!(task.custom_fields[1].name, "reviewer");
    }

    #[test]
    fn status_strings_are_lowercase() {
        assert_eq!(TaskStatus::Completed.to_string(), "completed");
        assert_eq!("blockage".parse::<TaskStatus>().unwrap(), TaskStatus::Blockage);
        assert!("Completed".parse::<TaskStatus>().is_err());
    }
}
