#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Care plan CRUD, ownership isolation, task limits and the notifications the
//! care-plan endpoints produce.

mod support;

use axum::http::{Method, StatusCode};
use serde_json::{Value, json};
use support::{app, create_plan, days_from_now, register, send, task};

fn kinds(notifications: &Value) -> Vec<String> {
    notifications
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["type"].as_str().unwrap().to_owned())
        .collect()
}

#[tokio::test]
async fn owner_can_read_update_and_delete_plan() {
    let app = app().await;
    let ana = register(&app.router, "Ana Lima", "ana@example.org").await;
    let plan = create_plan(
        &app.router,
        &ana,
        "Post-op recovery",
        vec![task("Change dressing", ana.id, &days_from_now(2))],
    )
    .await;
    let id = plan["id"].as_str().unwrap();
    assert_eq!(plan["tasks"][0]["status"], "Pending");

    let got = send(
        &app.router,
        Method::GET,
        &format!("/api/care-plans/{id}"),
        Some(&ana.cookie),
        None,
    )
    .await;
    assert_eq!(got.status, StatusCode::OK);
    assert_eq!(got.data()["title"], "Post-op recovery");

    let task_id = plan["tasks"][0]["id"].as_str().unwrap();
    let updated = send(
        &app.router,
        Method::PUT,
        &format!("/api/care-plans/{id}"),
        Some(&ana.cookie),
        Some(json!({
            "title": "Post-op recovery, week 2",
            "tasks": [
                { "id": task_id, "taskName": "Change dressing", "assignedTo": ana.id,
                  "status": "In Progress", "dueDate": days_from_now(2) },
                task("Physio session", ana.id, &days_from_now(5)),
            ]
        })),
    )
    .await;
    assert_eq!(updated.status, StatusCode::OK, "{:?}", updated.body);
    assert_eq!(updated.data()["tasks"].as_array().unwrap().len(), 2);
    assert_eq!(updated.data()["tasks"][0]["id"], task_id);
    assert_eq!(updated.data()["tasks"][0]["status"], "In Progress");

    let deleted = send(
        &app.router,
        Method::DELETE,
        &format!("/api/care-plans/{id}"),
        Some(&ana.cookie),
        None,
    )
    .await;
    assert_eq!(deleted.status, StatusCode::OK);
    assert_eq!(deleted.message(), "Care plan deleted successfully");

    let gone = send(
        &app.router,
        Method::GET,
        &format!("/api/care-plans/{id}"),
        Some(&ana.cookie),
        None,
    )
    .await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn other_users_cannot_touch_a_plan() {
    let app = app().await;
    let ana = register(&app.router, "Ana Lima", "ana@example.org").await;
    let bo = register(&app.router, "Bo Chen", "bo@example.org").await;
    let plan = create_plan(
        &app.router,
        &ana,
        "Ana's plan",
        vec![task("Walk", ana.id, &days_from_now(1))],
    )
    .await;
    let uri = format!("/api/care-plans/{}", plan["id"].as_str().unwrap());

    let read = send(&app.router, Method::GET, &uri, Some(&bo.cookie), None).await;
    assert_eq!(read.status, StatusCode::NOT_FOUND);
    assert_eq!(read.message(), "Care plan not found");

    let update = send(
        &app.router,
        Method::PUT,
        &uri,
        Some(&bo.cookie),
        Some(json!({ "title": "Hijacked", "tasks": [task("Walk", bo.id, &days_from_now(1))] })),
    )
    .await;
    assert_eq!(update.status, StatusCode::NOT_FOUND);

    let delete = send(&app.router, Method::DELETE, &uri, Some(&bo.cookie), None).await;
    assert_eq!(delete.status, StatusCode::NOT_FOUND);

    let list = send(&app.router, Method::GET, "/api/care-plans", Some(&bo.cookie), None).await;
    assert!(list.data().as_array().unwrap().is_empty());

    let still_there = send(&app.router, Method::GET, &uri, Some(&ana.cookie), None).await;
    assert_eq!(still_there.data()["title"], "Ana's plan");
}

#[tokio::test]
async fn task_count_is_bounded() {
    let app = app().await;
    let ana = register(&app.router, "Ana Lima", "ana@example.org").await;
    let due = days_from_now(3);

    let empty = send(
        &app.router,
        Method::POST,
        "/api/care-plans",
        Some(&ana.cookie),
        Some(json!({ "title": "Empty plan", "tasks": [] })),
    )
    .await;
    assert_eq!(empty.status, StatusCode::BAD_REQUEST);
    assert_eq!(empty.message(), "A care plan must have between 1 and 50 tasks");

    let too_many: Vec<Value> = (0..51)
        .map(|i| task(&format!("Task {i}"), ana.id, &due))
        .collect();
    let over = send(
        &app.router,
        Method::POST,
        "/api/care-plans",
        Some(&ana.cookie),
        Some(json!({ "title": "Big plan", "tasks": too_many })),
    )
    .await;
    assert_eq!(over.status, StatusCode::BAD_REQUEST);

    let max: Vec<Value> = (0..50)
        .map(|i| task(&format!("Task {i}"), ana.id, &due))
        .collect();
    let plan = create_plan(&app.router, &ana, "Full plan", max).await;
    assert_eq!(plan["tasks"].as_array().unwrap().len(), 50);
}

#[tokio::test]
async fn invalid_path_id_is_a_bad_request() {
    let app = app().await;
    let ana = register(&app.router, "Ana Lima", "ana@example.org").await;
    let reply = send(
        &app.router,
        Method::GET,
        "/api/care-plans/42",
        Some(&ana.cookie),
        None,
    )
    .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.message(), "Invalid id");
}

#[tokio::test]
async fn create_notifies_owner_and_assignees() {
    let app = app().await;
    let ana = register(&app.router, "Ana Lima", "ana@example.org").await;
    let bo = register(&app.router, "Bo Chen", "bo@example.org").await;
    create_plan(
        &app.router,
        &ana,
        "Shared plan",
        vec![
            task("Own task", ana.id, &days_from_now(1)),
            task("Bo's task", bo.id, &days_from_now(1)),
        ],
    )
    .await;

    let ana_inbox = send(&app.router, Method::GET, "/api/notifications", Some(&ana.cookie), None).await;
    assert_eq!(kinds(ana_inbox.data()), ["careplan_added"]);

    let bo_inbox = send(&app.router, Method::GET, "/api/notifications", Some(&bo.cookie), None).await;
    assert_eq!(kinds(bo_inbox.data()), ["task_assigned"]);
}

#[tokio::test]
async fn assignee_can_update_task_status_and_sees_assigned_plans() {
    let app = app().await;
    let ana = register(&app.router, "Ana Lima", "ana@example.org").await;
    let bo = register(&app.router, "Bo Chen", "bo@example.org").await;
    let cy = register(&app.router, "Cy Diaz", "cy@example.org").await;
    let plan = create_plan(
        &app.router,
        &ana,
        "Shared plan",
        vec![task("Bo's task", bo.id, &days_from_now(1))],
    )
    .await;
    let uri = format!(
        "/api/care-plans/{}/tasks/{}",
        plan["id"].as_str().unwrap(),
        plan["tasks"][0]["id"].as_str().unwrap()
    );

    let assigned = send(
        &app.router,
        Method::GET,
        "/api/care-plans/assigned",
        Some(&bo.cookie),
        None,
    )
    .await;
    assert_eq!(assigned.data().as_array().unwrap().len(), 1);

    let done = send(
        &app.router,
        Method::PATCH,
        &uri,
        Some(&bo.cookie),
        Some(json!({ "status": "Completed" })),
    )
    .await;
    assert_eq!(done.status, StatusCode::OK);
    assert_eq!(done.data()["tasks"][0]["status"], "Completed");

    let stranger = send(
        &app.router,
        Method::PATCH,
        &uri,
        Some(&cy.cookie),
        Some(json!({ "status": "Pending" })),
    )
    .await;
    assert_eq!(stranger.status, StatusCode::NOT_FOUND);

    let bad_status = send(
        &app.router,
        Method::PATCH,
        &uri,
        Some(&bo.cookie),
        Some(json!({ "status": "Done" })),
    )
    .await;
    assert_eq!(bad_status.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        bad_status.message(),
        "Status must be one of: Pending, In Progress, Completed"
    );
}
