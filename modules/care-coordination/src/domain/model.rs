//! Domain models shared by the service, storage and REST layers.

use std::fmt;
use std::str::FromStr;

use carelink_auth::Role;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Declares a closed string-valued enum with a stable wire/storage spelling.
macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident { $($variant:ident => $text:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $text)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            #[must_use]
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $name::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str() == s)
                    .ok_or_else(|| format!("unknown {} '{}'", stringify!($name), s))
            }
        }
    };
}

string_enum! {
    pub enum TaskStatus {
        Pending => "Pending",
        InProgress => "In Progress",
        Completed => "Completed",
    }
}

string_enum! {
    pub enum AppointmentStatus {
        Scheduled => "Scheduled",
        Completed => "Completed",
        Cancelled => "Cancelled",
    }
}

string_enum! {
    /// What produced a notification.
    pub enum NotificationKind {
        TaskReminder => "task_reminder",
        CarePlanAdded => "careplan_added",
        CarePlanUpdated => "careplan_updated",
        TaskAssigned => "task_assigned",
    }
}

string_enum! {
    pub enum AlertSeverity {
        Low => "low",
        Medium => "medium",
        High => "high",
        Critical => "critical",
    }
}

// ==================== Users ====================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    /// Always stored lowercase.
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub contact: Option<String>,
    pub language_preference: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    pub contact: Option<String>,
    pub language_preference: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub name: Option<String>,
    pub contact: Option<String>,
    pub language_preference: Option<String>,
}

pub const DEFAULT_LANGUAGE: &str = "en";

// ==================== Care plans ====================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CarePlan {
    pub id: Uuid,
    /// Owner; the only user allowed to read or mutate the plan as a whole.
    pub user_id: Uuid,
    pub title: String,
    pub tasks: Vec<Task>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: Uuid,
    pub care_plan_id: Uuid,
    pub task_name: String,
    pub assigned_to: Uuid,
    pub status: TaskStatus,
    pub due_date: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewTask {
    /// Present when an update keeps an existing task.
    pub id: Option<Uuid>,
    pub task_name: String,
    pub assigned_to: Uuid,
    pub status: TaskStatus,
    pub due_date: OffsetDateTime,
}

/// Title and full task list; used for both create and replace.
#[derive(Debug, Clone)]
pub struct CarePlanDraft {
    pub title: String,
    pub tasks: Vec<NewTask>,
}

// ==================== Appointments ====================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Appointment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub doctor_name: String,
    pub location: String,
    /// `HH:mm`
    pub time: String,
    pub date: OffsetDateTime,
    pub status: AppointmentStatus,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewAppointment {
    pub doctor_name: String,
    pub location: String,
    pub time: String,
    pub date: OffsetDateTime,
    pub status: AppointmentStatus,
}

#[derive(Debug, Clone, Default)]
pub struct AppointmentPatch {
    pub doctor_name: Option<String>,
    pub location: Option<String>,
    pub time: Option<String>,
    pub date: Option<OffsetDateTime>,
    pub status: Option<AppointmentStatus>,
}

// ==================== Notifications ====================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub message: String,
    pub kind: NotificationKind,
    pub care_plan_id: Option<Uuid>,
    pub task_id: Option<Uuid>,
    pub read: bool,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewNotification {
    pub user_id: Uuid,
    pub message: String,
    pub kind: NotificationKind,
    pub care_plan_id: Option<Uuid>,
    pub task_id: Option<Uuid>,
}

// ==================== Records ====================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmergencyAlert {
    pub id: Uuid,
    pub user_id: Uuid,
    pub message: String,
    pub location: Option<String>,
    pub severity: AlertSeverity,
    pub resolved: bool,
    pub created_at: OffsetDateTime,
    pub resolved_at: Option<OffsetDateTime>,
}

#[derive(Debug, Clone)]
pub struct NewEmergencyAlert {
    pub message: String,
    pub location: Option<String>,
    pub severity: AlertSeverity,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Medication {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub dosage: String,
    pub frequency: String,
    pub start_date: OffsetDateTime,
    pub end_date: Option<OffsetDateTime>,
    pub notes: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Full medication body; used for both create and replace.
#[derive(Debug, Clone)]
pub struct MedicationDraft {
    pub name: String,
    pub dosage: String,
    pub frequency: String,
    pub start_date: OffsetDateTime,
    pub end_date: Option<OffsetDateTime>,
    pub notes: Option<String>,
}

/// Metadata for a file stored elsewhere (the bytes never pass through this service).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub care_plan_id: Option<Uuid>,
    pub file_name: String,
    pub url: String,
    pub mime_type: String,
    pub size_bytes: i64,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewFileRecord {
    pub care_plan_id: Option<Uuid>,
    pub file_name: String,
    pub url: String,
    pub mime_type: String,
    pub size_bytes: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FamilyLink {
    pub id: Uuid,
    pub user_id: Uuid,
    pub family_member_id: Uuid,
    pub relationship: String,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewFamilyLink {
    pub family_member_id: Uuid,
    pub relationship: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: Uuid,
    /// Sender.
    pub user_id: Uuid,
    pub recipient_id: Uuid,
    pub content: String,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewMessage {
    pub recipient_id: Uuid,
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_status_uses_display_spelling() {
        assert_eq!(TaskStatus::InProgress.as_str(), "In Progress");
        assert_eq!("In Progress".parse::<TaskStatus>(), Ok(TaskStatus::InProgress));
        assert!("in_progress".parse::<TaskStatus>().is_err());
    }

    #[test]
    fn notification_kind_serializes_snake_case() {
        let v = serde_json::to_value(NotificationKind::CarePlanAdded).unwrap();
        assert_eq!(v, serde_json::json!("careplan_added"));
    }
}
