#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Per-IP fixed-window limits on the auth and care-plan endpoints.

mod support;

use axum::http::{Method, StatusCode, header};
use care_coordination::CareModuleConfig;
use carelink_auth::AuthConfig;
use serde_json::json;
use support::{app_with, days_from_now, register, send, send_from, task};

const LIMIT_MESSAGE: &str = "Too many requests from this IP, please try again after 15 minutes";

fn default_limits() -> CareModuleConfig {
    CareModuleConfig {
        auth: AuthConfig {
            jwt_secret: "integration-test-secret".to_owned(),
            ..AuthConfig::default()
        },
        ..CareModuleConfig::default()
    }
}

#[tokio::test]
async fn sixth_login_attempt_in_window_is_rejected() {
    let app = app_with(default_limits()).await;
    let creds = json!({ "email": "ana@example.org", "password": "wrong-password" });

    for _ in 0..5 {
        let reply = send_from(
            &app.router,
            "203.0.113.7:5000",
            Method::POST,
            "/api/users/login",
            None,
            Some(creds.clone()),
        )
        .await;
        assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    }

    let blocked = send_from(
        &app.router,
        "203.0.113.7:5001",
        Method::POST,
        "/api/users/login",
        None,
        Some(creds.clone()),
    )
    .await;
    assert_eq!(blocked.status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(blocked.message(), LIMIT_MESSAGE);
    assert!(blocked.headers.contains_key(header::RETRY_AFTER));

    // Another client is counted separately.
    let other = send_from(
        &app.router,
        "198.51.100.2:5000",
        Method::POST,
        "/api/users/login",
        None,
        Some(creds),
    )
    .await;
    assert_eq!(other.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn register_shares_the_auth_budget() {
    let app = app_with(default_limits()).await;
    for i in 0..5 {
        register(&app.router, "Ana Lima", &format!("ana{i}@example.org")).await;
    }
    let reply = send(
        &app.router,
        Method::POST,
        "/api/users/login",
        None,
        Some(json!({ "email": "ana0@example.org", "password": support::PASSWORD })),
    )
    .await;
    assert_eq!(reply.status, StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn care_plan_writes_have_their_own_budget() {
    let mut cfg = default_limits();
    cfg.rate_limit.care_plans_max = 2;
    let app = app_with(cfg).await;
    let ana = register(&app.router, "Ana Lima", "ana@example.org").await;
    let body = json!({ "title": "Daily care", "tasks": [task("Walk", ana.id, &days_from_now(1))] });

    for _ in 0..2 {
        let reply = send(
            &app.router,
            Method::POST,
            "/api/care-plans",
            Some(&ana.cookie),
            Some(body.clone()),
        )
        .await;
        assert_eq!(reply.status, StatusCode::CREATED);
    }
    let blocked = send(
        &app.router,
        Method::POST,
        "/api/care-plans",
        Some(&ana.cookie),
        Some(body),
    )
    .await;
    assert_eq!(blocked.status, StatusCode::TOO_MANY_REQUESTS);

    // Reads are not limited.
    let list = send(&app.router, Method::GET, "/api/care-plans", Some(&ana.cookie), None).await;
    assert_eq!(list.status, StatusCode::OK);
    assert_eq!(list.data().as_array().unwrap().len(), 2);
}
