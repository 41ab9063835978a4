#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Daily reminder scan over tasks due tomorrow.

mod support;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::http::{Method, StatusCode};
use care_coordination::domain::events::NotificationEvent;
use care_coordination::domain::ports::Clock;
use serde_json::json;
use support::{
    NOW, app, app_with, app_with_clock, create_plan, register, relaxed_config, send, task,
};
use time::OffsetDateTime;
use time::macros::datetime;
use tokio::sync::broadcast::error::TryRecvError;
use tokio_util::sync::CancellationToken;

const TOMORROW_MORNING: &str = "2030-01-16T09:00:00Z";
const DAY_AFTER_MIDNIGHT: &str = "2030-01-17T00:00:00Z";
const TODAY_EVENING: &str = "2030-01-15T20:00:00Z";

#[tokio::test]
async fn task_due_tomorrow_gets_one_notification_and_one_event() {
    let app = app().await;
    let ana = register(&app.router, "Ana Lima", "ana@example.org").await;
    let bo = register(&app.router, "Bo Chen", "bo@example.org").await;
    let plan = create_plan(
        &app.router,
        &ana,
        "Weekly care",
        vec![
            task("Refill prescription", bo.id, TOMORROW_MORNING),
            task("Too late", bo.id, DAY_AFTER_MIDNIGHT),
            task("Too early", bo.id, TODAY_EVENING),
            json!({ "taskName": "Already done", "assignedTo": bo.id,
                    "status": "Completed", "dueDate": TOMORROW_MORNING }),
        ],
    )
    .await;
    let due_task = plan["tasks"][0]["id"].as_str().unwrap().to_owned();

    let mut rx = app.module.channels().subscribe(bo.id);
    let sent = app.module.services().reminders.run_scan(NOW).await.unwrap();
    assert_eq!(sent, 1);

    match rx.try_recv().unwrap() {
        NotificationEvent::TaskReminder {
            user_id,
            task_id,
            message,
            ..
        } => {
            assert_eq!(user_id, bo.id);
            assert_eq!(task_id.to_string(), due_task);
            assert_eq!(message, "Reminder: \"Refill prescription\" is due tomorrow");
        }
        other => panic!("unexpected event {other:?}"),
    }
    assert_eq!(rx.try_recv().unwrap_err(), TryRecvError::Empty);

    let inbox = send(&app.router, Method::GET, "/api/notifications", Some(&bo.cookie), None).await;
    let reminders: Vec<_> = inbox
        .data()
        .as_array()
        .unwrap()
        .iter()
        .filter(|n| n["type"] == "task_reminder")
        .collect();
    assert_eq!(reminders.len(), 1);
    assert_eq!(reminders[0]["taskId"], due_task.as_str());
}

#[tokio::test]
async fn window_edges_hold_for_fractional_seconds() {
    let app = app().await;
    let ana = register(&app.router, "Ana Lima", "ana@example.org").await;
    create_plan(
        &app.router,
        &ana,
        "Edge cases",
        vec![
            task("Just after midnight", ana.id, "2030-01-16T00:00:00.25Z"),
            task("Last half second", ana.id, "2030-01-16T23:59:59.5Z"),
            task("Day after, fractional", ana.id, "2030-01-17T00:00:00.25Z"),
        ],
    )
    .await;

    let sent = app.module.services().reminders.run_scan(NOW).await.unwrap();
    assert_eq!(sent, 2);

    let inbox = send(&app.router, Method::GET, "/api/notifications", Some(&ana.cookie), None).await;
    let mut reminded: Vec<&str> = inbox
        .data()
        .as_array()
        .unwrap()
        .iter()
        .filter(|n| n["type"] == "task_reminder")
        .map(|n| n["message"].as_str().unwrap())
        .collect();
    reminded.sort_unstable();
    assert_eq!(
        reminded,
        [
            "Reminder: \"Just after midnight\" is due tomorrow",
            "Reminder: \"Last half second\" is due tomorrow",
        ]
    );
}

#[tokio::test]
async fn each_run_sends_again() {
    let app = app().await;
    let ana = register(&app.router, "Ana Lima", "ana@example.org").await;
    create_plan(
        &app.router,
        &ana,
        "Weekly care",
        vec![task("Refill prescription", ana.id, TOMORROW_MORNING)],
    )
    .await;

    let reminders = &app.module.services().reminders;
    assert_eq!(reminders.run_scan(NOW).await.unwrap(), 1);
    assert_eq!(reminders.run_scan(NOW).await.unwrap(), 1);

    let inbox = send(
        &app.router,
        Method::GET,
        "/api/notifications?unread=true",
        Some(&ana.cookie),
        None,
    )
    .await;
    assert_eq!(inbox.status, StatusCode::OK);
    let count = inbox
        .data()
        .as_array()
        .unwrap()
        .iter()
        .filter(|n| n["type"] == "task_reminder")
        .count();
    assert_eq!(count, 2);
}

#[tokio::test]
async fn scheduler_scans_on_startup_and_stops_on_cancel() {
    let mut cfg = relaxed_config();
    cfg.reminders.run_on_startup = true;
    let app = app_with(cfg).await;
    let ana = register(&app.router, "Ana Lima", "ana@example.org").await;
    create_plan(
        &app.router,
        &ana,
        "Weekly care",
        vec![task("Refill prescription", ana.id, TOMORROW_MORNING)],
    )
    .await;

    let mut rx = app.module.channels().subscribe(ana.id);
    let scheduler = app.module.reminder_scheduler().unwrap().unwrap();
    let cancel = CancellationToken::new();
    let handle = tokio::spawn(scheduler.run(cancel.clone()));

    let event = tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(event.name(), "task:reminder");

    cancel.cancel();
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .unwrap()
        .unwrap();
}

/// Clock the test can move, including backwards.
struct SettableClock(Mutex<OffsetDateTime>);

impl SettableClock {
    fn set(&self, at: OffsetDateTime) {
        *self.0.lock().unwrap() = at;
    }
}

impl Clock for SettableClock {
    fn now(&self) -> OffsetDateTime {
        *self.0.lock().unwrap()
    }
}

#[tokio::test]
async fn scheduled_scan_uses_planned_trigger_when_clock_steps_back() {
    let clock = Arc::new(SettableClock(Mutex::new(datetime!(2030-01-15 23:59:59 UTC))));
    let app = app_with_clock(relaxed_config(), clock.clone()).await;
    let ana = register(&app.router, "Ana Lima", "ana@example.org").await;
    create_plan(
        &app.router,
        &ana,
        "Weekly care",
        vec![task("Refill prescription", ana.id, "2030-01-17T09:00:00Z")],
    )
    .await;

    let mut rx = app.module.channels().subscribe(ana.id);
    let scheduler = app.module.reminder_scheduler().unwrap().unwrap();
    let cancel = CancellationToken::new();
    let handle = tokio::spawn(scheduler.run(cancel.clone()));

    // The midnight trigger is one second away; step the wall clock back meanwhile.
    tokio::time::sleep(Duration::from_millis(200)).await;
    clock.set(datetime!(2030-01-15 23:00 UTC));

    let event = tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .unwrap()
        .unwrap();
    match event {
        NotificationEvent::TaskReminder { message, .. } => {
            assert_eq!(message, "Reminder: \"Refill prescription\" is due tomorrow");
        }
        other => panic!("unexpected event {other:?}"),
    }

    cancel.cancel();
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .unwrap()
        .unwrap();
}

#[tokio::test]
async fn disabled_reminders_have_no_scheduler() {
    let mut cfg = relaxed_config();
    cfg.reminders.enabled = false;
    let app = app_with(cfg).await;
    assert!(app.module.reminder_scheduler().unwrap().is_none());
}
