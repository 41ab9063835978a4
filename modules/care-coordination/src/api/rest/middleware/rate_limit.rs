//! Per-route, per-client fixed-window limits.
//!
//! Routes are keyed by `(Method, MatchedPath)`, so the layer must be installed
//! with `route_layer` where axum has already resolved the matched route.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{MatchedPath, Request, State};
use axum::http::{HeaderValue, Method, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::{debug, warn};

use crate::api::rest::error::ApiError;
use crate::api::rest::middleware::client_ip::client_ip;
use crate::infra::ratelimit::RateLimitStore;

pub const TOO_MANY_REQUESTS_MESSAGE: &str =
    "Too many requests from this IP, please try again after 15 minutes";

/// A named counter namespace and its per-window cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Policy {
    pub name: &'static str,
    pub limit: u64,
}

type RouteKey = (Method, &'static str);

#[derive(Clone)]
pub struct RateLimiter {
    store: Arc<dyn RateLimitStore>,
    window: Duration,
    trust_forwarded_for: bool,
    routes: Arc<HashMap<RouteKey, Policy>>,
}

impl RateLimiter {
    pub fn new(store: Arc<dyn RateLimitStore>, window: Duration, trust_forwarded_for: bool) -> Self {
        Self {
            store,
            window,
            trust_forwarded_for,
            routes: Arc::new(HashMap::new()),
        }
    }

    /// Limit `method path` under `policy`. `path` is the route pattern, e.g.
    /// `/api/care-plans/{id}`.
    #[must_use]
    pub fn route(mut self, method: Method, path: &'static str, policy: Policy) -> Self {
        Arc::make_mut(&mut self.routes).insert((method, path), policy);
        self
    }

    fn policy_for(&self, method: &Method, path: &str) -> Option<Policy> {
        self.routes
            .iter()
            .find(|((m, p), _)| m == method && *p == path)
            .map(|(_, policy)| *policy)
    }
}

pub async fn rate_limit_middleware(
    State(limiter): State<RateLimiter>,
    req: Request,
    next: Next,
) -> Response {
    let Some(path) = req.extensions().get::<MatchedPath>().map(|p| p.as_str().to_owned()) else {
        return next.run(req).await;
    };
    let Some(policy) = limiter.policy_for(req.method(), &path) else {
        return next.run(req).await;
    };

    let client = client_ip(&req, limiter.trust_forwarded_for)
        .map_or_else(|| "unknown".to_owned(), |ip| ip.to_string());
    let key = format!("{}:{client}", policy.name);

    let hit = match limiter.store.hit(&key, limiter.window).await {
        Ok(hit) => hit,
        Err(e) => {
            warn!(policy = policy.name, error = %e, "rate limit store failed; allowing request");
            return next.run(req).await;
        }
    };

    if hit.count > policy.limit {
        debug!(policy = policy.name, %client, count = hit.count, "rate limit exceeded");
        let mut resp = ApiError::new(
            axum::http::StatusCode::TOO_MANY_REQUESTS,
            TOO_MANY_REQUESTS_MESSAGE,
        )
        .into_response();
        let headers = resp.headers_mut();
        headers.insert(header::RETRY_AFTER, hit.reset_after.as_secs().max(1).into());
        headers.insert("x-ratelimit-limit", policy.limit.into());
        headers.insert("x-ratelimit-remaining", HeaderValue::from_static("0"));
        return resp;
    }

    let mut resp = next.run(req).await;
    let headers = resp.headers_mut();
    headers.insert("x-ratelimit-limit", policy.limit.into());
    headers.insert(
        "x-ratelimit-remaining",
        policy.limit.saturating_sub(hit.count).into(),
    );
    resp
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::ratelimit::{MemoryRateLimitStore, RateLimitError, WindowHit};
    use axum::Router;
    use axum::body::Body;
    use axum::http::StatusCode;
    use axum::routing::{delete, post};
    use tower::ServiceExt;

    fn app(store: Arc<dyn RateLimitStore>) -> Router {
        let limiter = RateLimiter::new(store, Duration::from_secs(900), false)
            .route(Method::POST, "/login", Policy { name: "auth", limit: 2 })
            .route(Method::DELETE, "/items/{id}", Policy { name: "items", limit: 1 });
        Router::new()
            .route("/login", post(|| async { "ok" }))
            .route("/items/{id}", delete(|| async { "gone" }))
            .route("/free", post(|| async { "ok" }))
            .route_layer(axum::middleware::from_fn_with_state(
                limiter,
                rate_limit_middleware,
            ))
    }

    async fn call(app: &Router, method: Method, uri: &str) -> Response {
        app.clone()
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn blocks_after_limit_with_fixed_message() {
        let app = app(Arc::new(MemoryRateLimitStore::new()));
        assert_eq!(call(&app, Method::POST, "/login").await.status(), StatusCode::OK);
        assert_eq!(call(&app, Method::POST, "/login").await.status(), StatusCode::OK);

        let resp = call(&app, Method::POST, "/login").await;
        assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(resp.headers().contains_key(header::RETRY_AFTER));
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let v: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(v["message"], TOO_MANY_REQUESTS_MESSAGE);
    }

    #[tokio::test]
    async fn matches_route_pattern_not_concrete_path() {
        let app = app(Arc::new(MemoryRateLimitStore::new()));
        assert_eq!(call(&app, Method::DELETE, "/items/a").await.status(), StatusCode::OK);
        assert_eq!(
            call(&app, Method::DELETE, "/items/b").await.status(),
            StatusCode::TOO_MANY_REQUESTS
        );
    }

    #[tokio::test]
    async fn unlisted_routes_are_not_counted() {
        let app = app(Arc::new(MemoryRateLimitStore::new()));
        for _ in 0..5 {
            assert_eq!(call(&app, Method::POST, "/free").await.status(), StatusCode::OK);
        }
    }

    struct BrokenStore;

    #[async_trait::async_trait]
    impl RateLimitStore for BrokenStore {
        async fn hit(&self, _key: &str, _window: Duration) -> Result<WindowHit, RateLimitError> {
            Err(RateLimitError::Backend("connection refused".to_owned()))
        }
    }

    #[tokio::test]
    #[tracing_test::traced_test]
    async fn store_failure_fails_open() {
        let app = app(Arc::new(BrokenStore));
        for _ in 0..3 {
            assert_eq!(call(&app, Method::POST, "/login").await.status(), StatusCode::OK);
        }
        assert!(logs_contain("allowing request"));
    }
}
