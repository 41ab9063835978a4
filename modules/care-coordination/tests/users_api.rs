#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Registration, login, session cookie and profile endpoints.

mod support;

use axum::http::{Method, StatusCode, header};
use carelink_auth::Role;
use serde_json::json;
use support::{PASSWORD, app, register, send};
use time::{Duration, OffsetDateTime};

#[tokio::test]
async fn register_sets_http_only_session_cookie() {
    let app = app().await;
    let reply = send(
        &app.router,
        Method::POST,
        "/api/users/register",
        None,
        Some(json!({
            "name": "Ana Lima",
            "email": "Ana@Example.org",
            "password": PASSWORD,
            "role": "caregiver"
        })),
    )
    .await;

    assert_eq!(reply.status, StatusCode::CREATED);
    assert_eq!(reply.message(), "User registered successfully");
    assert_eq!(reply.data()["email"], "ana@example.org");
    assert_eq!(reply.data()["role"], "caregiver");
    assert_eq!(reply.data()["languagePreference"], "en");
    assert!(reply.data().get("passwordHash").is_none());

    let set_cookie = reply.headers[header::SET_COOKIE].to_str().unwrap();
    assert!(set_cookie.starts_with("token="));
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("SameSite=Strict"));
}

#[tokio::test]
async fn second_registration_with_same_email_is_rejected() {
    let app = app().await;
    register(&app.router, "Ana Lima", "ana@example.org").await;

    let reply = send(
        &app.router,
        Method::POST,
        "/api/users/register",
        None,
        Some(json!({ "name": "Ana Again", "email": "ANA@example.org", "password": PASSWORD })),
    )
    .await;

    assert_eq!(reply.status, StatusCode::CONFLICT);
    assert_eq!(reply.message(), "User with this email already exists");
}

#[tokio::test]
async fn register_reports_first_validation_error() {
    let app = app().await;
    let reply = send(
        &app.router,
        Method::POST,
        "/api/users/register",
        None,
        Some(json!({ "name": "A", "email": "not-an-email", "password": "short" })),
    )
    .await;

    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.message(), "Name must be between 2 and 50 characters");
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    let app = app().await;
    let reply = send(
        &app.router,
        Method::POST,
        "/api/users/login",
        None,
        Some(json!({ "email": 42, "password": "x" })),
    )
    .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert!(!reply.message().is_empty());
}

#[tokio::test]
async fn login_checks_password() {
    let app = app().await;
    register(&app.router, "Ana Lima", "ana@example.org").await;

    let bad = send(
        &app.router,
        Method::POST,
        "/api/users/login",
        None,
        Some(json!({ "email": "ana@example.org", "password": "wrong-password" })),
    )
    .await;
    assert_eq!(bad.status, StatusCode::UNAUTHORIZED);
    assert_eq!(bad.message(), "Invalid email or password");

    let unknown = send(
        &app.router,
        Method::POST,
        "/api/users/login",
        None,
        Some(json!({ "email": "nobody@example.org", "password": PASSWORD })),
    )
    .await;
    assert_eq!(unknown.status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown.message(), "Invalid email or password");

    let ok = send(
        &app.router,
        Method::POST,
        "/api/users/login",
        None,
        Some(json!({ "email": "ana@example.org", "password": PASSWORD })),
    )
    .await;
    assert_eq!(ok.status, StatusCode::OK);
    let me = send(&app.router, Method::GET, "/api/users/me", Some(&ok.cookie()), None).await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.data()["name"], "Ana Lima");
}

#[tokio::test]
async fn protected_routes_require_a_valid_token() {
    let app = app().await;
    let ana = register(&app.router, "Ana Lima", "ana@example.org").await;

    let missing = send(&app.router, Method::GET, "/api/care-plans", None, None).await;
    assert_eq!(missing.status, StatusCode::UNAUTHORIZED);
    assert_eq!(missing.message(), "Authentication required");

    let mut tampered = ana.cookie.clone();
    tampered.push('x');
    let reply = send(&app.router, Method::GET, "/api/care-plans", Some(&tampered), None).await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    assert_eq!(reply.message(), "Invalid token");

    let stale = app
        .module
        .tokens()
        .issue_at(ana.id, Role::User, OffsetDateTime::now_utc() - Duration::days(3))
        .unwrap();
    let reply = send(
        &app.router,
        Method::GET,
        "/api/care-plans",
        Some(&format!("token={stale}")),
        None,
    )
    .await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    assert_eq!(reply.message(), "Token expired");
}

#[tokio::test]
async fn logout_clears_cookie() {
    let app = app().await;
    let reply = send(&app.router, Method::POST, "/api/users/logout", None, None).await;
    assert_eq!(reply.status, StatusCode::OK);
    let set_cookie = reply.headers[header::SET_COOKIE].to_str().unwrap();
    assert!(set_cookie.starts_with("token="));
    assert!(set_cookie.contains("Max-Age=0"));
}

#[tokio::test]
async fn profile_update_keeps_email_and_role() {
    let app = app().await;
    let ana = register(&app.router, "Ana Lima", "ana@example.org").await;

    let reply = send(
        &app.router,
        Method::PUT,
        "/api/users/me",
        Some(&ana.cookie),
        Some(json!({ "name": "Ana L.", "contact": "+55 11 5555", "languagePreference": "pt" })),
    )
    .await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.data()["name"], "Ana L.");
    assert_eq!(reply.data()["languagePreference"], "pt");
    assert_eq!(reply.data()["email"], "ana@example.org");
    assert_eq!(reply.data()["role"], "user");
}

#[tokio::test]
async fn directory_lists_registered_users() {
    let app = app().await;
    let ana = register(&app.router, "Ana Lima", "ana@example.org").await;
    register(&app.router, "Bo Chen", "bo@example.org").await;

    let reply = send(&app.router, Method::GET, "/api/users", Some(&ana.cookie), None).await;
    assert_eq!(reply.status, StatusCode::OK);
    let users = reply.data().as_array().unwrap();
    assert_eq!(users.len(), 2);
    assert!(users.iter().all(|u| u.get("email").is_none()));
}

#[tokio::test]
async fn health_is_public() {
    let app = app().await;
    let reply = send(&app.router, Method::GET, "/api/health", None, None).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.message(), "ok");
}
