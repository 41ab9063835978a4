//! REST DTOs. Requests are camelCase JSON and are turned into domain inputs by
//! their [`Validate`] impls; responses are built from domain models.

use carelink_auth::Role;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::api::rest::validation::{
    Validate, ValidationCtx, ValidationError, datetime, email, hhmm, length, max_length, one_of,
};
use crate::domain::events::NotificationEvent;
use crate::domain::model::{
    AlertSeverity, Appointment, AppointmentPatch, AppointmentStatus, CarePlan, CarePlanDraft,
    EmergencyAlert, FamilyLink, FileRecord, Medication, MedicationDraft, Message, NewAppointment,
    NewEmergencyAlert, NewFamilyLink, NewFileRecord, NewMessage, NewTask, NewUser, Notification,
    NotificationKind, Task, TaskStatus, User, UserPatch,
};
use crate::domain::service::PAST_DATE_MESSAGE;

fn uuid_field(field: &str, raw: &str) -> Result<Uuid, ValidationError> {
    Uuid::parse_str(raw).map_err(|_| ValidationError::new(format!("{field} must be a valid id")))
}

fn not_in_past(date: OffsetDateTime, ctx: &ValidationCtx) -> Result<(), ValidationError> {
    if date < ctx.now {
        return Err(ValidationError::new(PAST_DATE_MESSAGE));
    }
    Ok(())
}

// ==================== Users ====================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterReq {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    pub role: Option<String>,
    pub contact: Option<String>,
    pub language_preference: Option<String>,
}

impl Validate for RegisterReq {
    type Output = NewUser;

    fn validate(self, _ctx: &ValidationCtx) -> Result<NewUser, ValidationError> {
        let name = self.name.trim().to_owned();
        length("Name", &name, 2, 50)?;
        let email = email(&self.email)?;
        length("Password", &self.password, 8, 128)?;
        let role = match self.role.as_deref() {
            Some(r) => one_of::<Role>("Role", r, &Role::ALL)?,
            None => Role::default(),
        };
        if let Some(contact) = &self.contact {
            max_length("Contact", contact, 30)?;
        }
        if let Some(language) = &self.language_preference {
            length("Language preference", language, 2, 10)?;
        }
        Ok(NewUser {
            name,
            email,
            password: self.password,
            role,
            contact: self.contact,
            language_preference: self.language_preference,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginReq {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Validated credentials.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Validate for LoginReq {
    type Output = Credentials;

    fn validate(self, _ctx: &ValidationCtx) -> Result<Credentials, ValidationError> {
        let email = email(&self.email)?;
        if self.password.is_empty() {
            return Err(ValidationError::new("Password is required"));
        }
        Ok(Credentials {
            email,
            password: self.password,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileReq {
    pub name: Option<String>,
    pub contact: Option<String>,
    pub language_preference: Option<String>,
}

impl Validate for UpdateProfileReq {
    type Output = UserPatch;

    fn validate(self, _ctx: &ValidationCtx) -> Result<UserPatch, ValidationError> {
        let name = self.name.map(|n| n.trim().to_owned());
        if let Some(name) = &name {
            length("Name", name, 2, 50)?;
        }
        if let Some(contact) = &self.contact {
            max_length("Contact", contact, 30)?;
        }
        if let Some(language) = &self.language_preference {
            length("Language preference", language, 2, 10)?;
        }
        Ok(UserPatch {
            name,
            contact: self.contact,
            language_preference: self.language_preference,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
    pub language_preference: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<User> for UserDto {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            name: u.name,
            email: u.email,
            role: u.role,
            contact: u.contact,
            language_preference: u.language_preference,
            created_at: u.created_at,
            updated_at: u.updated_at,
        }
    }
}

/// Directory entry: enough to pick an assignee, nothing private.
#[derive(Debug, Clone, Serialize)]
pub struct UserSummaryDto {
    pub id: Uuid,
    pub name: String,
    pub role: Role,
}

impl From<User> for UserSummaryDto {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            name: u.name,
            role: u.role,
        }
    }
}

// ==================== Care plans ====================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskReq {
    /// Existing task id; only meaningful on update.
    pub id: Option<String>,
    #[serde(default)]
    pub task_name: String,
    #[serde(default)]
    pub assigned_to: String,
    pub status: Option<String>,
    #[serde(default)]
    pub due_date: String,
}

impl TaskReq {
    fn into_new_task(self, n: usize) -> Result<NewTask, ValidationError> {
        let id = self
            .id
            .as_deref()
            .map(|raw| uuid_field(&format!("Task {n} id"), raw))
            .transpose()?;
        let task_name = self.task_name.trim().to_owned();
        length("Task name", &task_name, 1, 200)?;
        let assigned_to = uuid_field("Assigned user", &self.assigned_to)?;
        let status = match self.status.as_deref() {
            Some(s) => one_of::<TaskStatus>("Status", s, TaskStatus::ALL)?,
            None => TaskStatus::Pending,
        };
        let due_date = datetime("Due date", &self.due_date)?;
        Ok(NewTask {
            id,
            task_name,
            assigned_to,
            status,
            due_date,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CarePlanReq {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub tasks: Vec<TaskReq>,
}

impl Validate for CarePlanReq {
    type Output = CarePlanDraft;

    fn validate(self, ctx: &ValidationCtx) -> Result<CarePlanDraft, ValidationError> {
        let title = self.title.trim().to_owned();
        length("Title", &title, 3, 100)?;
        let max = ctx.max_tasks_per_plan;
        if self.tasks.is_empty() || self.tasks.len() > max {
            return Err(ValidationError::new(format!(
                "A care plan must have between 1 and {max} tasks"
            )));
        }
        let tasks = self
            .tasks
            .into_iter()
            .enumerate()
            .map(|(i, t)| t.into_new_task(i + 1))
            .collect::<Result<_, _>>()?;
        Ok(CarePlanDraft { title, tasks })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TaskStatusReq {
    #[serde(default)]
    pub status: String,
}

impl Validate for TaskStatusReq {
    type Output = TaskStatus;

    fn validate(self, _ctx: &ValidationCtx) -> Result<TaskStatus, ValidationError> {
        one_of::<TaskStatus>("Status", &self.status, TaskStatus::ALL)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDto {
    pub id: Uuid,
    pub task_name: String,
    pub assigned_to: Uuid,
    pub status: TaskStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub due_date: OffsetDateTime,
}

impl From<Task> for TaskDto {
    fn from(t: Task) -> Self {
        Self {
            id: t.id,
            task_name: t.task_name,
            assigned_to: t.assigned_to,
            status: t.status,
            due_date: t.due_date,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CarePlanDto {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub tasks: Vec<TaskDto>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<CarePlan> for CarePlanDto {
    fn from(p: CarePlan) -> Self {
        Self {
            id: p.id,
            user_id: p.user_id,
            title: p.title,
            tasks: p.tasks.into_iter().map(Into::into).collect(),
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

// ==================== Appointments ====================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentReq {
    #[serde(default)]
    pub doctor_name: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub date: String,
    pub status: Option<String>,
}

impl Validate for AppointmentReq {
    type Output = NewAppointment;

    fn validate(self, ctx: &ValidationCtx) -> Result<NewAppointment, ValidationError> {
        let doctor_name = self.doctor_name.trim().to_owned();
        length("Doctor name", &doctor_name, 2, 100)?;
        let location = self.location.trim().to_owned();
        length("Location", &location, 2, 200)?;
        hhmm(&self.time)?;
        let date = datetime("Date", &self.date)?;
        not_in_past(date, ctx)?;
        let status = match self.status.as_deref() {
            Some(s) => one_of::<AppointmentStatus>("Status", s, AppointmentStatus::ALL)?,
            None => AppointmentStatus::Scheduled,
        };
        Ok(NewAppointment {
            doctor_name,
            location,
            time: self.time,
            date,
            status,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentPatchReq {
    pub doctor_name: Option<String>,
    pub location: Option<String>,
    pub time: Option<String>,
    pub date: Option<String>,
    pub status: Option<String>,
}

impl Validate for AppointmentPatchReq {
    type Output = AppointmentPatch;

    fn validate(self, ctx: &ValidationCtx) -> Result<AppointmentPatch, ValidationError> {
        let doctor_name = self.doctor_name.map(|s| s.trim().to_owned());
        if let Some(v) = &doctor_name {
            length("Doctor name", v, 2, 100)?;
        }
        let location = self.location.map(|s| s.trim().to_owned());
        if let Some(v) = &location {
            length("Location", v, 2, 200)?;
        }
        if let Some(v) = &self.time {
            hhmm(v)?;
        }
        let date = self
            .date
            .as_deref()
            .map(|raw| datetime("Date", raw))
            .transpose()?;
        if let Some(d) = date {
            not_in_past(d, ctx)?;
        }
        let status = self
            .status
            .as_deref()
            .map(|s| one_of::<AppointmentStatus>("Status", s, AppointmentStatus::ALL))
            .transpose()?;
        Ok(AppointmentPatch {
            doctor_name,
            location,
            time: self.time,
            date,
            status,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentDto {
    pub id: Uuid,
    pub user_id: Uuid,
    pub doctor_name: String,
    pub location: String,
    pub time: String,
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    pub status: AppointmentStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<Appointment> for AppointmentDto {
    fn from(a: Appointment) -> Self {
        Self {
            id: a.id,
            user_id: a.user_id,
            doctor_name: a.doctor_name,
            location: a.location,
            time: a.time,
            date: a.date,
            status: a.status,
            created_at: a.created_at,
            updated_at: a.updated_at,
        }
    }
}

// ==================== Notifications ====================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotificationsQuery {
    #[serde(default)]
    pub unread: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationDto {
    pub id: Uuid,
    pub user_id: Uuid,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub care_plan_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_id: Option<Uuid>,
    pub read: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<Notification> for NotificationDto {
    fn from(n: Notification) -> Self {
        Self {
            id: n.id,
            user_id: n.user_id,
            message: n.message,
            kind: n.kind,
            care_plan_id: n.care_plan_id,
            task_id: n.task_id,
            read: n.read,
            created_at: n.created_at,
        }
    }
}

/// Payload of a real-time event; the event name travels separately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationEventDto {
    pub notification_id: Uuid,
    pub user_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub care_plan_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub task_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub message: Option<String>,
}

impl From<&NotificationEvent> for NotificationEventDto {
    fn from(e: &NotificationEvent) -> Self {
        match e {
            NotificationEvent::Read {
                notification_id,
                user_id,
            }
            | NotificationEvent::Deleted {
                notification_id,
                user_id,
            } => Self {
                notification_id: *notification_id,
                user_id: *user_id,
                care_plan_id: None,
                task_id: None,
                message: None,
            },
            NotificationEvent::TaskReminder {
                notification_id,
                user_id,
                care_plan_id,
                task_id,
                message,
            } => Self {
                notification_id: *notification_id,
                user_id: *user_id,
                care_plan_id: Some(*care_plan_id),
                task_id: Some(*task_id),
                message: Some(message.clone()),
            },
        }
    }
}

// ==================== Emergency alerts ====================

#[derive(Debug, Clone, Deserialize)]
pub struct EmergencyAlertReq {
    #[serde(default)]
    pub message: String,
    pub location: Option<String>,
    pub severity: Option<String>,
}

impl Validate for EmergencyAlertReq {
    type Output = NewEmergencyAlert;

    fn validate(self, _ctx: &ValidationCtx) -> Result<NewEmergencyAlert, ValidationError> {
        let message = self.message.trim().to_owned();
        length("Message", &message, 1, 500)?;
        if let Some(location) = &self.location {
            max_length("Location", location, 200)?;
        }
        let severity = match self.severity.as_deref() {
            Some(s) => one_of::<AlertSeverity>("Severity", s, AlertSeverity::ALL)?,
            None => AlertSeverity::High,
        };
        Ok(NewEmergencyAlert {
            message,
            location: self.location,
            severity,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmergencyAlertDto {
    pub id: Uuid,
    pub user_id: Uuid,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub severity: AlertSeverity,
    pub resolved: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub resolved_at: Option<OffsetDateTime>,
}

impl From<EmergencyAlert> for EmergencyAlertDto {
    fn from(a: EmergencyAlert) -> Self {
        Self {
            id: a.id,
            user_id: a.user_id,
            message: a.message,
            location: a.location,
            severity: a.severity,
            resolved: a.resolved,
            created_at: a.created_at,
            resolved_at: a.resolved_at,
        }
    }
}

// ==================== Medications ====================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicationReq {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub dosage: String,
    #[serde(default)]
    pub frequency: String,
    #[serde(default)]
    pub start_date: String,
    pub end_date: Option<String>,
    pub notes: Option<String>,
}

impl Validate for MedicationReq {
    type Output = MedicationDraft;

    fn validate(self, _ctx: &ValidationCtx) -> Result<MedicationDraft, ValidationError> {
        let name = self.name.trim().to_owned();
        length("Name", &name, 1, 100)?;
        let dosage = self.dosage.trim().to_owned();
        length("Dosage", &dosage, 1, 100)?;
        let frequency = self.frequency.trim().to_owned();
        length("Frequency", &frequency, 1, 100)?;
        let start_date = datetime("Start date", &self.start_date)?;
        let end_date = self
            .end_date
            .as_deref()
            .map(|raw| datetime("End date", raw))
            .transpose()?;
        if end_date.is_some_and(|end| end < start_date) {
            return Err(ValidationError::new(
                "End date must be on or after start date",
            ));
        }
        if let Some(notes) = &self.notes {
            max_length("Notes", notes, 1000)?;
        }
        Ok(MedicationDraft {
            name,
            dosage,
            frequency,
            start_date,
            end_date,
            notes: self.notes,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicationDto {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub dosage: String,
    pub frequency: String,
    #[serde(with = "time::serde::rfc3339")]
    pub start_date: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub end_date: Option<OffsetDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<Medication> for MedicationDto {
    fn from(m: Medication) -> Self {
        Self {
            id: m.id,
            user_id: m.user_id,
            name: m.name,
            dosage: m.dosage,
            frequency: m.frequency,
            start_date: m.start_date,
            end_date: m.end_date,
            notes: m.notes,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

// ==================== Files ====================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileReq {
    #[serde(default)]
    pub file_name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub mime_type: String,
    #[serde(default)]
    pub size_bytes: i64,
    pub care_plan_id: Option<String>,
}

impl Validate for FileReq {
    type Output = NewFileRecord;

    fn validate(self, _ctx: &ValidationCtx) -> Result<NewFileRecord, ValidationError> {
        let file_name = self.file_name.trim().to_owned();
        length("File name", &file_name, 1, 255)?;
        if !(self.url.starts_with("http://") || self.url.starts_with("https://")) {
            return Err(ValidationError::new("URL must start with http:// or https://"));
        }
        max_length("URL", &self.url, 2048)?;
        if !self.mime_type.contains('/') {
            return Err(ValidationError::new("MIME type must look like type/subtype"));
        }
        max_length("MIME type", &self.mime_type, 255)?;
        if self.size_bytes < 0 {
            return Err(ValidationError::new("Size must not be negative"));
        }
        let care_plan_id = self
            .care_plan_id
            .as_deref()
            .map(|raw| uuid_field("Care plan", raw))
            .transpose()?;
        Ok(NewFileRecord {
            care_plan_id,
            file_name,
            url: self.url,
            mime_type: self.mime_type,
            size_bytes: self.size_bytes,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileDto {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub care_plan_id: Option<Uuid>,
    pub file_name: String,
    pub url: String,
    pub mime_type: String,
    pub size_bytes: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<FileRecord> for FileDto {
    fn from(f: FileRecord) -> Self {
        Self {
            id: f.id,
            user_id: f.user_id,
            care_plan_id: f.care_plan_id,
            file_name: f.file_name,
            url: f.url,
            mime_type: f.mime_type,
            size_bytes: f.size_bytes,
            created_at: f.created_at,
        }
    }
}

// ==================== Family links ====================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilyLinkReq {
    #[serde(default)]
    pub family_member_id: String,
    #[serde(default)]
    pub relationship: String,
}

impl Validate for FamilyLinkReq {
    type Output = NewFamilyLink;

    fn validate(self, _ctx: &ValidationCtx) -> Result<NewFamilyLink, ValidationError> {
        let family_member_id = uuid_field("Family member", &self.family_member_id)?;
        let relationship = self.relationship.trim().to_owned();
        length("Relationship", &relationship, 1, 50)?;
        Ok(NewFamilyLink {
            family_member_id,
            relationship,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilyLinkDto {
    pub id: Uuid,
    pub user_id: Uuid,
    pub family_member_id: Uuid,
    pub relationship: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<FamilyLink> for FamilyLinkDto {
    fn from(l: FamilyLink) -> Self {
        Self {
            id: l.id,
            user_id: l.user_id,
            family_member_id: l.family_member_id,
            relationship: l.relationship,
            created_at: l.created_at,
        }
    }
}

// ==================== Messages ====================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageReq {
    #[serde(default)]
    pub recipient_id: String,
    #[serde(default)]
    pub content: String,
}

impl Validate for MessageReq {
    type Output = NewMessage;

    fn validate(self, _ctx: &ValidationCtx) -> Result<NewMessage, ValidationError> {
        let recipient_id = uuid_field("Recipient", &self.recipient_id)?;
        if self.content.trim().is_empty() {
            return Err(ValidationError::new("Content is required"));
        }
        length("Content", &self.content, 1, 2000)?;
        Ok(NewMessage {
            recipient_id,
            content: self.content,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageDto {
    pub id: Uuid,
    /// Sender.
    pub user_id: Uuid,
    pub recipient_id: Uuid,
    pub content: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<Message> for MessageDto {
    fn from(m: Message) -> Self {
        Self {
            id: m.id,
            user_id: m.user_id,
            recipient_id: m.recipient_id,
            content: m.content,
            created_at: m.created_at,
        }
    }
}
