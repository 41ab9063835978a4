#![allow(clippy::unwrap_used, clippy::expect_used)]
#![allow(dead_code)] // Each test binary uses a different subset

//! Shared helpers for the care-coordination integration tests: an in-memory
//! SQLite database with migrations applied, a fully wired router on a fixed
//! clock, and small HTTP helpers.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::body::{Body, BodyDataStream};
use axum::extract::ConnectInfo;
use axum::http::{HeaderMap, Method, Request, Response, StatusCode, header};
use care_coordination::config::{CareConfig, RateLimitConfig};
use care_coordination::domain::ports::{Clock, FixedClock};
use care_coordination::{CareModule, CareModuleConfig};
use carelink_auth::AuthConfig;
use sea_orm::DatabaseConnection;
use serde_json::{Value, json};
use time::OffsetDateTime;
use time::macros::datetime;
use futures_util::StreamExt;
use tower::ServiceExt;
use uuid::Uuid;

/// The instant every test app believes it is.
pub const NOW: OffsetDateTime = datetime!(2030-01-15 12:00 UTC);

pub const PASSWORD: &str = "correct-horse-battery";

pub struct TestApp {
    pub module: CareModule,
    pub router: Router,
    pub conn: DatabaseConnection,
}

/// Config with limits high enough that ordinary tests never trip them.
#[must_use]
pub fn relaxed_config() -> CareModuleConfig {
    CareModuleConfig {
        auth: AuthConfig {
            jwt_secret: "integration-test-secret".to_owned(),
            ..AuthConfig::default()
        },
        rate_limit: RateLimitConfig {
            auth_max: 10_000,
            care_plans_max: 10_000,
            ..RateLimitConfig::default()
        },
        care: CareConfig::default(),
        ..CareModuleConfig::default()
    }
}

pub async fn app() -> TestApp {
    app_with(relaxed_config()).await
}

pub async fn app_with(cfg: CareModuleConfig) -> TestApp {
    app_with_clock(cfg, Arc::new(FixedClock(NOW))).await
}

pub async fn app_with_clock(cfg: CareModuleConfig, clock: Arc<dyn Clock>) -> TestApp {
    let conn = care_coordination::infra::storage::db::connect("sqlite::memory:", 1)
        .await
        .expect("connect sqlite");
    CareModule::migrate(&conn).await.expect("migrate");
    let module = CareModule::init_with_clock(&conn, cfg, clock).expect("module init");
    let router = module.router();
    TestApp {
        module,
        router,
        conn,
    }
}

pub struct Reply {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl Reply {
    pub fn message(&self) -> &str {
        self.body["message"].as_str().unwrap_or_default()
    }

    pub fn data(&self) -> &Value {
        &self.body["data"]
    }

    /// `name=value` from the `Set-Cookie` header.
    pub fn cookie(&self) -> String {
        let raw = self.headers[header::SET_COOKIE].to_str().unwrap();
        raw.split(';').next().unwrap().to_owned()
    }
}

/// One request as if sent from `peer`.
pub async fn send_from(
    router: &Router,
    peer: &str,
    method: Method,
    uri: &str,
    cookie: Option<&str>,
    body: Option<Value>,
) -> Reply {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(c) = cookie {
        builder = builder.header(header::COOKIE, c);
    }
    let body = match body {
        Some(v) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(serde_json::to_vec(&v).unwrap())
        }
        None => Body::empty(),
    };
    let mut req = builder.body(body).unwrap();
    req.extensions_mut()
        .insert(ConnectInfo(peer.parse::<SocketAddr>().unwrap()));

    let resp = router.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let headers = resp.headers().clone();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    Reply {
        status,
        headers,
        body,
    }
}

pub async fn send(
    router: &Router,
    method: Method,
    uri: &str,
    cookie: Option<&str>,
    body: Option<Value>,
) -> Reply {
    send_from(router, "10.0.0.1:40000", method, uri, cookie, body).await
}

/// A registered user and their session cookie.
pub struct Session {
    pub id: Uuid,
    pub cookie: String,
}

pub async fn register(router: &Router, name: &str, email: &str) -> Session {
    let reply = send(
        router,
        Method::POST,
        "/api/users/register",
        None,
        Some(json!({ "name": name, "email": email, "password": PASSWORD })),
    )
    .await;
    assert_eq!(reply.status, StatusCode::CREATED, "{:?}", reply.body);
    Session {
        id: reply.data()["id"].as_str().unwrap().parse().unwrap(),
        cookie: reply.cookie(),
    }
}

/// RFC 3339 timestamp `days` after [`NOW`].
pub fn days_from_now(days: i64) -> String {
    (NOW + time::Duration::days(days))
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap()
}

pub fn task(name: &str, assignee: Uuid, due: &str) -> Value {
    json!({ "taskName": name, "assignedTo": assignee, "dueDate": due })
}

pub async fn create_plan(router: &Router, owner: &Session, title: &str, tasks: Vec<Value>) -> Value {
    let reply = send(
        router,
        Method::POST,
        "/api/care-plans",
        Some(&owner.cookie),
        Some(json!({ "title": title, "tasks": tasks })),
    )
    .await;
    assert_eq!(reply.status, StatusCode::CREATED, "{:?}", reply.body);
    reply.data().clone()
}

/// `GET /api/notifications/stream`; the body stays open for [`next_event`].
pub async fn open_stream(router: &Router, cookie: &str) -> Response<Body> {
    let mut req = Request::builder()
        .method(Method::GET)
        .uri("/api/notifications/stream")
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .unwrap();
    req.extensions_mut()
        .insert(ConnectInfo("10.0.0.1:40000".parse::<SocketAddr>().unwrap()));
    router.clone().oneshot(req).await.unwrap()
}

/// Next named event on an SSE body as `(event, data)`. Keep-alive comments are
/// skipped.
pub async fn next_event(body: &mut BodyDataStream) -> (String, Value) {
    let mut buf = String::new();
    loop {
        while let Some(end) = buf.find("\n\n") {
            let frame: String = buf.drain(..end + 2).collect();
            let mut name = None;
            let mut data = None;
            for line in frame.lines() {
                if let Some(v) = line.strip_prefix("event:") {
                    name = Some(v.trim_start().to_owned());
                } else if let Some(v) = line.strip_prefix("data:") {
                    data = Some(serde_json::from_str(v.trim_start()).unwrap());
                }
            }
            if let (Some(name), Some(data)) = (name, data) {
                return (name, data);
            }
        }
        let chunk = tokio::time::timeout(std::time::Duration::from_secs(5), body.next())
            .await
            .expect("no event within 5s")
            .expect("stream ended")
            .unwrap();
        buf.push_str(std::str::from_utf8(&chunk).unwrap());
    }
}
