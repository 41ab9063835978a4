#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Emergency alerts, medications, file metadata, family links and messages.

mod support;

use axum::http::{Method, StatusCode};
use serde_json::json;
use support::{app, create_plan, days_from_now, register, send, task};

#[tokio::test]
async fn alert_defaults_to_high_and_resolves_once() {
    let app = app().await;
    let ana = register(&app.router, "Ana Lima", "ana@example.org").await;
    let bo = register(&app.router, "Bo Chen", "bo@example.org").await;

    let raised = send(
        &app.router,
        Method::POST,
        "/api/emergency-alerts",
        Some(&ana.cookie),
        Some(json!({ "message": "Fell in the kitchen", "location": "Home" })),
    )
    .await;
    assert_eq!(raised.status, StatusCode::CREATED);
    assert_eq!(raised.data()["severity"], "high");
    assert_eq!(raised.data()["resolved"], false);
    let uri = format!(
        "/api/emergency-alerts/{}/resolve",
        raised.data()["id"].as_str().unwrap()
    );

    let by_bo = send(&app.router, Method::PATCH, &uri, Some(&bo.cookie), None).await;
    assert_eq!(by_bo.status, StatusCode::NOT_FOUND);

    let first = send(&app.router, Method::PATCH, &uri, Some(&ana.cookie), None).await;
    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(first.data()["resolved"], true);
    let again = send(&app.router, Method::PATCH, &uri, Some(&ana.cookie), None).await;
    assert_eq!(again.status, StatusCode::OK);
    assert_eq!(again.data()["resolvedAt"], first.data()["resolvedAt"]);

    let bad = send(
        &app.router,
        Method::POST,
        "/api/emergency-alerts",
        Some(&ana.cookie),
        Some(json!({ "message": "Help", "severity": "urgent" })),
    )
    .await;
    assert_eq!(bad.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn medication_dates_are_ordered() {
    let app = app().await;
    let ana = register(&app.router, "Ana Lima", "ana@example.org").await;

    let backwards = send(
        &app.router,
        Method::POST,
        "/api/medications",
        Some(&ana.cookie),
        Some(json!({
            "name": "Amoxicillin", "dosage": "500 mg", "frequency": "3x daily",
            "startDate": days_from_now(5), "endDate": days_from_now(1)
        })),
    )
    .await;
    assert_eq!(backwards.status, StatusCode::BAD_REQUEST);
    assert_eq!(backwards.message(), "End date must be on or after start date");

    let created = send(
        &app.router,
        Method::POST,
        "/api/medications",
        Some(&ana.cookie),
        Some(json!({
            "name": "Amoxicillin", "dosage": "500 mg", "frequency": "3x daily",
            "startDate": days_from_now(0), "endDate": days_from_now(7)
        })),
    )
    .await;
    assert_eq!(created.status, StatusCode::CREATED);
    let uri = format!("/api/medications/{}", created.data()["id"].as_str().unwrap());

    let updated = send(
        &app.router,
        Method::PUT,
        &uri,
        Some(&ana.cookie),
        Some(json!({
            "name": "Amoxicillin", "dosage": "250 mg", "frequency": "3x daily",
            "startDate": days_from_now(0)
        })),
    )
    .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.data()["dosage"], "250 mg");

    let list = send(&app.router, Method::GET, "/api/medications", Some(&ana.cookie), None).await;
    assert_eq!(list.data().as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn file_may_only_reference_own_care_plan() {
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
    let file = |care_plan_id: &serde_json::Value| {
        json!({
            "fileName": "discharge.pdf",
            "url": "https://files.example.org/discharge.pdf",
            "mimeType": "application/pdf",
            "sizeBytes": 52_311,
            "carePlanId": care_plan_id
        })
    };

    let foreign = send(
        &app.router,
        Method::POST,
        "/api/files",
        Some(&bo.cookie),
        Some(file(&plan["id"])),
    )
    .await;
    assert_eq!(foreign.status, StatusCode::NOT_FOUND);

    let own = send(
        &app.router,
        Method::POST,
        "/api/files",
        Some(&ana.cookie),
        Some(file(&plan["id"])),
    )
    .await;
    assert_eq!(own.status, StatusCode::CREATED);

    let bad_url = send(
        &app.router,
        Method::POST,
        "/api/files",
        Some(&ana.cookie),
        Some(json!({ "fileName": "x.pdf", "url": "ftp://x", "mimeType": "application/pdf", "sizeBytes": 1 })),
    )
    .await;
    assert_eq!(bad_url.status, StatusCode::BAD_REQUEST);
    assert_eq!(bad_url.message(), "URL must start with http:// or https://");
}

#[tokio::test]
async fn family_links_reject_self_and_duplicates() {
    let app = app().await;
    let ana = register(&app.router, "Ana Lima", "ana@example.org").await;
    let bo = register(&app.router, "Bo Chen", "bo@example.org").await;

    let selfie = send(
        &app.router,
        Method::POST,
        "/api/family-links",
        Some(&ana.cookie),
        Some(json!({ "familyMemberId": ana.id, "relationship": "self" })),
    )
    .await;
    assert_eq!(selfie.status, StatusCode::BAD_REQUEST);
    assert_eq!(selfie.message(), "You cannot link yourself");

    let link = json!({ "familyMemberId": bo.id, "relationship": "son" });
    let first = send(&app.router, Method::POST, "/api/family-links", Some(&ana.cookie), Some(link.clone())).await;
    assert_eq!(first.status, StatusCode::CREATED);
    let dup = send(&app.router, Method::POST, "/api/family-links", Some(&ana.cookie), Some(link)).await;
    assert_eq!(dup.status, StatusCode::CONFLICT);
    assert_eq!(dup.message(), "Family link already exists");

    let unknown = send(
        &app.router,
        Method::POST,
        "/api/family-links",
        Some(&ana.cookie),
        Some(json!({ "familyMemberId": "0190f1f4-0000-7000-8000-000000000000", "relationship": "aunt" })),
    )
    .await;
    assert_eq!(unknown.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn messages_are_visible_to_both_parties_and_deletable_by_sender() {
    let app = app().await;
    let ana = register(&app.router, "Ana Lima", "ana@example.org").await;
    let bo = register(&app.router, "Bo Chen", "bo@example.org").await;

    let to_self = send(
        &app.router,
        Method::POST,
        "/api/messages",
        Some(&ana.cookie),
        Some(json!({ "recipientId": ana.id, "content": "note to self" })),
    )
    .await;
    assert_eq!(to_self.status, StatusCode::BAD_REQUEST);

    let sent = send(
        &app.router,
        Method::POST,
        "/api/messages",
        Some(&ana.cookie),
        Some(json!({ "recipientId": bo.id, "content": "Can you cover Tuesday?" })),
    )
    .await;
    assert_eq!(sent.status, StatusCode::CREATED);
    let uri = format!("/api/messages/{}", sent.data()["id"].as_str().unwrap());

    let bo_view = send(&app.router, Method::GET, "/api/messages", Some(&bo.cookie), None).await;
    assert_eq!(bo_view.data().as_array().unwrap().len(), 1);

    let by_recipient = send(&app.router, Method::DELETE, &uri, Some(&bo.cookie), None).await;
    assert_eq!(by_recipient.status, StatusCode::NOT_FOUND);

    let by_sender = send(&app.router, Method::DELETE, &uri, Some(&ana.cookie), None).await;
    assert_eq!(by_sender.status, StatusCode::OK);
    let bo_view = send(&app.router, Method::GET, "/api/messages", Some(&bo.cookie), None).await;
    assert!(bo_view.data().as_array().unwrap().is_empty());
}
