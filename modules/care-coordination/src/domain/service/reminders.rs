use std::sync::Arc;

use time::{Duration, OffsetDateTime, Time, UtcOffset};
use tracing::{info, instrument, warn};

use crate::domain::error::{DomainError, db_err};
use crate::domain::events::NotificationEvent;
use crate::domain::model::{NewNotification, NotificationKind, TaskStatus};
use crate::domain::repo::CarePlansRepository;
use crate::domain::service::NotificationService;

/// `[start of tomorrow, start of the day after)` in UTC, relative to `now`.
#[must_use]
pub fn reminder_window(now: OffsetDateTime) -> (OffsetDateTime, OffsetDateTime) {
    let today = now.to_offset(UtcOffset::UTC).date();
    let start = today.with_time(Time::MIDNIGHT).assume_utc() + Duration::days(1);
    (start, start + Duration::days(1))
}

#[derive(Clone)]
pub struct ReminderService {
    care_plans: Arc<dyn CarePlansRepository>,
    notifications: NotificationService,
}

impl ReminderService {
    pub fn new(care_plans: Arc<dyn CarePlansRepository>, notifications: NotificationService) -> Self {
        Self {
            care_plans,
            notifications,
        }
    }

    /// One reminder pass: for every unfinished task due tomorrow, store a
    /// `task_reminder` notification for its assignee and push `task:reminder` to
    /// their channel. Returns the number of reminders sent.
    ///
    /// Running the scan twice for the same day sends the reminders twice.
    #[instrument(skip(self), fields(now = %now))]
    pub async fn run_scan(&self, now: OffsetDateTime) -> Result<usize, DomainError> {
        let (from, to) = reminder_window(now);
        let due = self
            .care_plans
            .tasks_due_between(from, to)
            .await
            .map_err(db_err)?;

        let mut sent = 0;
        for task in due.into_iter().filter(|t| t.status != TaskStatus::Completed) {
            let message = format!("Reminder: \"{}\" is due tomorrow", task.task_name);
            let stored = self
                .notifications
                .create(NewNotification {
                    user_id: task.assigned_to,
                    message: message.clone(),
                    kind: NotificationKind::TaskReminder,
                    care_plan_id: Some(task.care_plan_id),
                    task_id: Some(task.id),
                })
                .await;

            match stored {
                Ok(notification) => {
                    self.notifications.publish(&NotificationEvent::TaskReminder {
                        notification_id: notification.id,
                        user_id: task.assigned_to,
                        care_plan_id: task.care_plan_id,
                        task_id: task.id,
                        message,
                    });
                    sent += 1;
                }
                Err(e) => {
                    warn!(task_id = %task.id, error = %e, "failed to store reminder (skipping)");
                }
            }
        }

        info!(sent, window_start = %from, "reminder scan finished");
        Ok(sent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn window_covers_the_next_utc_day() {
        let (from, to) = reminder_window(datetime!(2026-03-10 00:00 UTC));
        assert_eq!(from, datetime!(2026-03-11 00:00 UTC));
        assert_eq!(to, datetime!(2026-03-12 00:00 UTC));
    }

    #[test]
    fn window_is_computed_in_utc() {
        // 23:30 on the 10th at UTC-2 is already 01:30 on the 11th in UTC.
        let (from, _) = reminder_window(datetime!(2026-03-10 23:30 -2));
        assert_eq!(from, datetime!(2026-03-12 00:00 UTC));
    }
}
