use uuid::Uuid;

/// Transport-agnostic real-time event, delivered to the channel of `user_id()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationEvent {
    Read {
        notification_id: Uuid,
        user_id: Uuid,
    },
    Deleted {
        notification_id: Uuid,
        user_id: Uuid,
    },
    TaskReminder {
        notification_id: Uuid,
        user_id: Uuid,
        care_plan_id: Uuid,
        task_id: Uuid,
        message: String,
    },
}

impl NotificationEvent {
    /// Event name on the wire.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            NotificationEvent::Read { .. } => "notification:read",
            NotificationEvent::Deleted { .. } => "notification:deleted",
            NotificationEvent::TaskReminder { .. } => "task:reminder",
        }
    }

    #[must_use]
    pub fn user_id(&self) -> Uuid {
        match self {
            NotificationEvent::Read { user_id, .. }
            | NotificationEvent::Deleted { user_id, .. }
            | NotificationEvent::TaskReminder { user_id, .. } => *user_id,
        }
    }
}
