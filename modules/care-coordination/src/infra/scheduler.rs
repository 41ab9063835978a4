//! Daily reminder trigger.

use std::sync::Arc;

use time::{Duration, OffsetDateTime, Time, UtcOffset};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::domain::ports::Clock;
use crate::domain::service::ReminderService;

/// The next instant strictly after `now` at `hour:minute` UTC.
#[must_use]
pub fn next_run_after(now: OffsetDateTime, at: Time) -> OffsetDateTime {
    let now = now.to_offset(UtcOffset::UTC);
    let today = now.date().with_time(at).assume_utc();
    if today > now {
        today
    } else {
        today + Duration::days(1)
    }
}

pub struct ReminderScheduler {
    reminders: ReminderService,
    clock: Arc<dyn Clock>,
    at: Time,
    run_on_startup: bool,
}

impl ReminderScheduler {
    pub fn new(
        reminders: ReminderService,
        clock: Arc<dyn Clock>,
        at: Time,
        run_on_startup: bool,
    ) -> Self {
        Self {
            reminders,
            clock,
            at,
            run_on_startup,
        }
    }

    async fn scan(&self, at: OffsetDateTime) {
        if let Err(e) = self.reminders.run_scan(at).await {
            error!(error = %e, "reminder scan failed");
        }
    }

    /// Sleep until the next trigger, scan, repeat. Returns when `cancel` fires.
    ///
    /// Each scan covers the day after the planned trigger, not after whatever the
    /// clock reads on waking.
    pub async fn run(self, cancel: CancellationToken) {
        info!(at = %self.at, run_on_startup = self.run_on_startup, "reminder scheduler started");
        if self.run_on_startup {
            self.scan(self.clock.now()).await;
        }

        loop {
            let now = self.clock.now();
            let next = next_run_after(now, self.at);
            let wait = (next - now).unsigned_abs();

            tokio::select! {
                () = cancel.cancelled() => break,
                () = tokio::time::sleep(wait) => self.scan(next).await,
            }
        }
        info!("reminder scheduler stopped");
    }
}
