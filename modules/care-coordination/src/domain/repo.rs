//! Persistence ports the domain needs.
//!
//! Every ownership-scoped operation takes the owner id alongside the record id and
//! filters on both, so a record owned by someone else behaves exactly like a missing one.
//!
//! Object-safe and async-friendly via `async_trait`.

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::model::{
    Appointment, CarePlan, EmergencyAlert, FamilyLink, FileRecord, Medication, Message,
    Notification, Task, TaskStatus, User,
};

#[async_trait]
pub trait UsersRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>>;

    /// Lookup by (already lowercased) email.
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;

    async fn email_exists(&self, email: &str) -> anyhow::Result<bool>;

    async fn insert(&self, user: User) -> anyhow::Result<()>;

    /// Persist profile fields. Email, password and role are never rewritten.
    async fn update_profile(&self, user: &User) -> anyhow::Result<bool>;

    /// All users, ordered by name.
    async fn list(&self) -> anyhow::Result<Vec<User>>;
}

#[async_trait]
pub trait CarePlansRepository: Send + Sync {
    /// Insert the plan row and all of its tasks atomically.
    async fn insert(&self, plan: &CarePlan) -> anyhow::Result<()>;

    async fn find_owned(&self, owner: Uuid, id: Uuid) -> anyhow::Result<Option<CarePlan>>;

    /// Unscoped lookup; callers apply their own access rule.
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<CarePlan>>;

    /// Owner's plans, newest first.
    async fn list_owned(&self, owner: Uuid) -> anyhow::Result<Vec<CarePlan>>;

    /// Plans with at least one task assigned to `assignee`, newest first.
    async fn list_assigned_to(&self, assignee: Uuid) -> anyhow::Result<Vec<CarePlan>>;

    /// Overwrite title and task list. Returns `false` when `{id, user_id}` matches nothing.
    async fn replace(&self, plan: &CarePlan) -> anyhow::Result<bool>;

    async fn update_task_status(
        &self,
        plan_id: Uuid,
        task_id: Uuid,
        status: TaskStatus,
        updated_at: OffsetDateTime,
    ) -> anyhow::Result<bool>;

    /// Delete the plan and its tasks. Returns `false` when `{id, owner}` matches nothing.
    async fn delete_owned(&self, owner: Uuid, id: Uuid) -> anyhow::Result<bool>;

    /// Tasks with `from <= due_date < to`, across all plans.
    async fn tasks_due_between(
        &self,
        from: OffsetDateTime,
        to: OffsetDateTime,
    ) -> anyhow::Result<Vec<Task>>;
}

#[async_trait]
pub trait AppointmentsRepository: Send + Sync {
    async fn insert(&self, appointment: &Appointment) -> anyhow::Result<()>;
    async fn find_owned(&self, owner: Uuid, id: Uuid) -> anyhow::Result<Option<Appointment>>;
    /// Owner's appointments, soonest first.
    async fn list_owned(&self, owner: Uuid) -> anyhow::Result<Vec<Appointment>>;
    async fn update(&self, appointment: &Appointment) -> anyhow::Result<bool>;
    async fn delete_owned(&self, owner: Uuid, id: Uuid) -> anyhow::Result<bool>;
}

#[async_trait]
pub trait NotificationsRepository: Send + Sync {
    async fn insert(&self, notification: &Notification) -> anyhow::Result<()>;
    /// Newest first.
    async fn list_for_user(&self, owner: Uuid, unread_only: bool)
    -> anyhow::Result<Vec<Notification>>;
    async fn mark_read(&self, owner: Uuid, id: Uuid) -> anyhow::Result<bool>;
    async fn delete_owned(&self, owner: Uuid, id: Uuid) -> anyhow::Result<bool>;
}

#[async_trait]
pub trait EmergencyAlertsRepository: Send + Sync {
    async fn insert(&self, alert: &EmergencyAlert) -> anyhow::Result<()>;
    async fn find_owned(&self, owner: Uuid, id: Uuid) -> anyhow::Result<Option<EmergencyAlert>>;
    async fn list_owned(&self, owner: Uuid) -> anyhow::Result<Vec<EmergencyAlert>>;
    async fn mark_resolved(
        &self,
        owner: Uuid,
        id: Uuid,
        at: OffsetDateTime,
    ) -> anyhow::Result<bool>;
    async fn delete_owned(&self, owner: Uuid, id: Uuid) -> anyhow::Result<bool>;
}

#[async_trait]
pub trait MedicationsRepository: Send + Sync {
    async fn insert(&self, medication: &Medication) -> anyhow::Result<()>;
    async fn find_owned(&self, owner: Uuid, id: Uuid) -> anyhow::Result<Option<Medication>>;
    async fn list_owned(&self, owner: Uuid) -> anyhow::Result<Vec<Medication>>;
    async fn update(&self, medication: &Medication) -> anyhow::Result<bool>;
    async fn delete_owned(&self, owner: Uuid, id: Uuid) -> anyhow::Result<bool>;
}

#[async_trait]
pub trait FilesRepository: Send + Sync {
    async fn insert(&self, file: &FileRecord) -> anyhow::Result<()>;
    async fn list_owned(&self, owner: Uuid) -> anyhow::Result<Vec<FileRecord>>;
    async fn delete_owned(&self, owner: Uuid, id: Uuid) -> anyhow::Result<bool>;
}

#[async_trait]
pub trait FamilyLinksRepository: Send + Sync {
    async fn insert(&self, link: &FamilyLink) -> anyhow::Result<()>;
    async fn exists(&self, owner: Uuid, family_member_id: Uuid) -> anyhow::Result<bool>;
    async fn list_owned(&self, owner: Uuid) -> anyhow::Result<Vec<FamilyLink>>;
    async fn delete_owned(&self, owner: Uuid, id: Uuid) -> anyhow::Result<bool>;
}

#[async_trait]
pub trait MessagesRepository: Send + Sync {
    async fn insert(&self, message: &Message) -> anyhow::Result<()>;
    /// Messages sent or received by `user`, newest first.
    async fn list_for_user(&self, user: Uuid) -> anyhow::Result<Vec<Message>>;
    /// Only the sender may delete.
    async fn delete_sent(&self, sender: Uuid, id: Uuid) -> anyhow::Result<bool>;
}
