//! Entity <-> domain conversions.
//!
//! Enum-valued columns are stored as their wire spelling, so reading a row can fail
//! if the table was edited by hand. Those conversions are `TryFrom`.

use anyhow::anyhow;
use sea_orm::Set;

use crate::domain::model::{
    Appointment, CarePlan, EmergencyAlert, FamilyLink, FileRecord, Medication, Message,
    Notification, Task, User,
};
use crate::infra::storage::entity::{
    appointment, care_plan, care_plan_task, emergency_alert, family_link, file, medication,
    message, notification, user,
};

impl TryFrom<user::Model> for User {
    type Error = anyhow::Error;

    fn try_from(m: user::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: m.id,
            role: m.role.parse().map_err(|e| anyhow!("user {}: {e}", m.id))?,
            name: m.name,
            email: m.email,
            password_hash: m.password_hash,
            contact: m.contact,
            language_preference: m.language_preference,
            created_at: m.created_at,
            updated_at: m.updated_at,
        })
    }
}

pub(crate) fn user_active(u: &User) -> user::ActiveModel {
    user::ActiveModel {
        id: Set(u.id),
        name: Set(u.name.clone()),
        email: Set(u.email.clone()),
        password_hash: Set(u.password_hash.clone()),
        role: Set(u.role.as_str().to_owned()),
        contact: Set(u.contact.clone()),
        language_preference: Set(u.language_preference.clone()),
        created_at: Set(u.created_at),
        updated_at: Set(u.updated_at),
    }
}

impl TryFrom<care_plan_task::Model> for Task {
    type Error = anyhow::Error;

    fn try_from(m: care_plan_task::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: m.id,
            status: m.status.parse().map_err(|e| anyhow!("task {}: {e}", m.id))?,
            care_plan_id: m.care_plan_id,
            task_name: m.task_name,
            assigned_to: m.assigned_to,
            due_date: m.due_date,
        })
    }
}

pub(crate) fn task_active(t: &Task, position: i32) -> care_plan_task::ActiveModel {
    care_plan_task::ActiveModel {
        id: Set(t.id),
        care_plan_id: Set(t.care_plan_id),
        position: Set(position),
        task_name: Set(t.task_name.clone()),
        assigned_to: Set(t.assigned_to),
        status: Set(t.status.as_str().to_owned()),
        due_date: Set(t.due_date),
    }
}

/// Join a plan row with its task rows (already ordered by position).
pub(crate) fn care_plan_from_parts(
    plan: care_plan::Model,
    tasks: Vec<care_plan_task::Model>,
) -> anyhow::Result<CarePlan> {
    Ok(CarePlan {
        id: plan.id,
        user_id: plan.user_id,
        title: plan.title,
        tasks: tasks
            .into_iter()
            .map(Task::try_from)
            .collect::<anyhow::Result<_>>()?,
        created_at: plan.created_at,
        updated_at: plan.updated_at,
    })
}

pub(crate) fn care_plan_active(p: &CarePlan) -> care_plan::ActiveModel {
    care_plan::ActiveModel {
        id: Set(p.id),
        user_id: Set(p.user_id),
        title: Set(p.title.clone()),
        created_at: Set(p.created_at),
        updated_at: Set(p.updated_at),
    }
}

impl TryFrom<appointment::Model> for Appointment {
    type Error = anyhow::Error;

    fn try_from(m: appointment::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: m.id,
            status: m
                .status
                .parse()
                .map_err(|e| anyhow!("appointment {}: {e}", m.id))?,
            user_id: m.user_id,
            doctor_name: m.doctor_name,
            location: m.location,
            time: m.time,
            date: m.date,
            created_at: m.created_at,
            updated_at: m.updated_at,
        })
    }
}

pub(crate) fn appointment_active(a: &Appointment) -> appointment::ActiveModel {
    appointment::ActiveModel {
        id: Set(a.id),
        user_id: Set(a.user_id),
        doctor_name: Set(a.doctor_name.clone()),
        location: Set(a.location.clone()),
        time: Set(a.time.clone()),
        date: Set(a.date),
        status: Set(a.status.as_str().to_owned()),
        created_at: Set(a.created_at),
        updated_at: Set(a.updated_at),
    }
}

impl TryFrom<notification::Model> for Notification {
    type Error = anyhow::Error;

    fn try_from(m: notification::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: m.id,
            kind: m
                .kind
                .parse()
                .map_err(|e| anyhow!("notification {}: {e}", m.id))?,
            user_id: m.user_id,
            message: m.message,
            care_plan_id: m.care_plan_id,
            task_id: m.task_id,
            read: m.read,
            created_at: m.created_at,
        })
    }
}

pub(crate) fn notification_active(n: &Notification) -> notification::ActiveModel {
    notification::ActiveModel {
        id: Set(n.id),
        user_id: Set(n.user_id),
        message: Set(n.message.clone()),
        kind: Set(n.kind.as_str().to_owned()),
        care_plan_id: Set(n.care_plan_id),
        task_id: Set(n.task_id),
        read: Set(n.read),
        created_at: Set(n.created_at),
    }
}

impl TryFrom<emergency_alert::Model> for EmergencyAlert {
    type Error = anyhow::Error;

    fn try_from(m: emergency_alert::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: m.id,
            severity: m
                .severity
                .parse()
                .map_err(|e| anyhow!("emergency alert {}: {e}", m.id))?,
            user_id: m.user_id,
            message: m.message,
            location: m.location,
            resolved: m.resolved,
            created_at: m.created_at,
            resolved_at: m.resolved_at,
        })
    }
}

pub(crate) fn emergency_alert_active(a: &EmergencyAlert) -> emergency_alert::ActiveModel {
    emergency_alert::ActiveModel {
        id: Set(a.id),
        user_id: Set(a.user_id),
        message: Set(a.message.clone()),
        location: Set(a.location.clone()),
        severity: Set(a.severity.as_str().to_owned()),
        resolved: Set(a.resolved),
        created_at: Set(a.created_at),
        resolved_at: Set(a.resolved_at),
    }
}

impl From<medication::Model> for Medication {
    fn from(m: medication::Model) -> Self {
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

pub(crate) fn medication_active(m: &Medication) -> medication::ActiveModel {
    medication::ActiveModel {
        id: Set(m.id),
        user_id: Set(m.user_id),
        name: Set(m.name.clone()),
        dosage: Set(m.dosage.clone()),
        frequency: Set(m.frequency.clone()),
        start_date: Set(m.start_date),
        end_date: Set(m.end_date),
        notes: Set(m.notes.clone()),
        created_at: Set(m.created_at),
        updated_at: Set(m.updated_at),
    }
}

impl From<file::Model> for FileRecord {
    fn from(m: file::Model) -> Self {
        Self {
            id: m.id,
            user_id: m.user_id,
            care_plan_id: m.care_plan_id,
            file_name: m.file_name,
            url: m.url,
            mime_type: m.mime_type,
            size_bytes: m.size_bytes,
            created_at: m.created_at,
        }
    }
}

pub(crate) fn file_active(f: &FileRecord) -> file::ActiveModel {
    file::ActiveModel {
        id: Set(f.id),
        user_id: Set(f.user_id),
        care_plan_id: Set(f.care_plan_id),
        file_name: Set(f.file_name.clone()),
        url: Set(f.url.clone()),
        mime_type: Set(f.mime_type.clone()),
        size_bytes: Set(f.size_bytes),
        created_at: Set(f.created_at),
    }
}

impl From<family_link::Model> for FamilyLink {
    fn from(m: family_link::Model) -> Self {
        Self {
            id: m.id,
            user_id: m.user_id,
            family_member_id: m.family_member_id,
            relationship: m.relationship,
            created_at: m.created_at,
        }
    }
}

pub(crate) fn family_link_active(l: &FamilyLink) -> family_link::ActiveModel {
    family_link::ActiveModel {
        id: Set(l.id),
        user_id: Set(l.user_id),
        family_member_id: Set(l.family_member_id),
        relationship: Set(l.relationship.clone()),
        created_at: Set(l.created_at),
    }
}

impl From<message::Model> for Message {
    fn from(m: message::Model) -> Self {
        Self {
            id: m.id,
            user_id: m.user_id,
            recipient_id: m.recipient_id,
            content: m.content,
            created_at: m.created_at,
        }
    }
}

pub(crate) fn message_active(m: &Message) -> message::ActiveModel {
    message::ActiveModel {
        id: Set(m.id),
        user_id: Set(m.user_id),
        recipient_id: Set(m.recipient_id),
        content: Set(m.content.clone()),
        created_at: Set(m.created_at),
    }
}
