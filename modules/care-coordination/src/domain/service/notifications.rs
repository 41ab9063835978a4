use std::sync::Arc;

use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::domain::error::{DomainError, db_err};
use crate::domain::events::NotificationEvent;
use crate::domain::model::{NewNotification, Notification};
use crate::domain::ports::{Clock, EventPublisher};
use crate::domain::repo::NotificationsRepository;

#[derive(Clone)]
pub struct NotificationService {
    repo: Arc<dyn NotificationsRepository>,
    events: Arc<dyn EventPublisher<NotificationEvent>>,
    clock: Arc<dyn Clock>,
}

impl NotificationService {
    pub fn new(
        repo: Arc<dyn NotificationsRepository>,
        events: Arc<dyn EventPublisher<NotificationEvent>>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repo,
            events,
            clock,
        }
    }

    #[instrument(skip(self, new), fields(user_id = %new.user_id, kind = %new.kind))]
    pub async fn create(&self, new: NewNotification) -> Result<Notification, DomainError> {
        let notification = Notification {
            id: Uuid::now_v7(),
            user_id: new.user_id,
            message: new.message,
            kind: new.kind,
            care_plan_id: new.care_plan_id,
            task_id: new.task_id,
            read: false,
            created_at: self.clock.now(),
        };
        self.repo.insert(&notification).await.map_err(db_err)?;
        debug!(notification_id = %notification.id, "notification stored");
        Ok(notification)
    }

    /// Side-effect notifications must not fail the request that caused them.
    pub async fn create_best_effort(&self, new: NewNotification) -> Option<Notification> {
        let user_id = new.user_id;
        let kind = new.kind;
        match self.create(new).await {
            Ok(n) => Some(n),
            Err(e) => {
                warn!(%user_id, %kind, error = %e, "failed to store notification (continuing)");
                None
            }
        }
    }

    pub fn publish(&self, event: &NotificationEvent) {
        self.events.publish(event);
    }

    #[instrument(skip(self), fields(user_id = %owner))]
    pub async fn list(
        &self,
        owner: Uuid,
        unread_only: bool,
    ) -> Result<Vec<Notification>, DomainError> {
        self.repo
            .list_for_user(owner, unread_only)
            .await
            .map_err(db_err)
    }

    #[instrument(skip(self), fields(user_id = %owner, notification_id = %id))]
    pub async fn mark_read(&self, owner: Uuid, id: Uuid) -> Result<(), DomainError> {
        if !self.repo.mark_read(owner, id).await.map_err(db_err)? {
            return Err(DomainError::not_found("Notification", id));
        }
        self.events.publish(&NotificationEvent::Read {
            notification_id: id,
            user_id: owner,
        });
        Ok(())
    }

    #[instrument(skip(self), fields(user_id = %owner, notification_id = %id))]
    pub async fn delete(&self, owner: Uuid, id: Uuid) -> Result<(), DomainError> {
        if !self.repo.delete_owned(owner, id).await.map_err(db_err)? {
            return Err(DomainError::not_found("Notification", id));
        }
        self.events.publish(&NotificationEvent::Deleted {
            notification_id: id,
            user_id: owner,
        });
        Ok(())
    }
}
