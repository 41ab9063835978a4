//! Route table for the `/api` surface.

use std::sync::Arc;
use std::time::Duration;

use axum::Extension;
use axum::Router;
use axum::http::Method;
use axum::middleware::from_fn_with_state;
use axum::routing::{delete, get, patch, post};
use carelink_auth::{AuthConfig, AuthState, TokenService, require_auth};
use tokio_util::sync::CancellationToken;

use crate::api::rest::handlers::{self, appointments, care_plans, notifications, records, users};
use crate::api::rest::middleware::rate_limit::{Policy, RateLimiter, rate_limit_middleware};
use crate::api::rest::validation::ValidationSettings;
use crate::config::RateLimitConfig;
use crate::domain::service::AppServices;
use crate::infra::ratelimit::RateLimitStore;
use crate::infra::realtime::UserChannels;

/// Everything the router hands to handlers and middleware.
#[derive(Clone)]
pub struct RouterDeps {
    pub services: Arc<AppServices>,
    pub auth: Arc<AuthConfig>,
    pub tokens: Arc<TokenService>,
    pub channels: UserChannels,
    pub validation: ValidationSettings,
    pub limiter: RateLimiter,
    /// Cancelled when the server begins shutting down; ends open event streams.
    pub shutdown: CancellationToken,
}

/// The `auth` and `care_plans` policies bound to their routes.
#[must_use]
pub fn rate_limiter(store: Arc<dyn RateLimitStore>, cfg: &RateLimitConfig) -> RateLimiter {
    let auth = Policy {
        name: "auth",
        limit: cfg.auth_max,
    };
    let care_plans = Policy {
        name: "care_plans",
        limit: cfg.care_plans_max,
    };
    RateLimiter::new(
        store,
        Duration::from_secs(cfg.window_secs),
        cfg.trust_forwarded_for,
    )
    .route(Method::POST, "/api/users/login", auth)
    .route(Method::POST, "/api/users/register", auth)
    .route(Method::POST, "/api/care-plans", care_plans)
    .route(Method::DELETE, "/api/care-plans/{id}", care_plans)
}

pub fn router(deps: RouterDeps) -> Router {
    let public = Router::new()
        .route("/api/health", get(handlers::health))
        .route("/api/users/register", post(users::register))
        .route("/api/users/login", post(users::login))
        .route("/api/users/logout", post(users::logout));

    let protected = Router::new()
        // Users
        .route("/api/users", get(users::directory))
        .route("/api/users/me", get(users::me).put(users::update_me))
        // Care plans
        .route(
            "/api/care-plans",
            post(care_plans::create).get(care_plans::list),
        )
        .route("/api/care-plans/assigned", get(care_plans::list_assigned))
        .route(
            "/api/care-plans/{id}",
            get(care_plans::get)
                .put(care_plans::update)
                .delete(care_plans::delete),
        )
        .route(
            "/api/care-plans/{id}/tasks/{task_id}",
            patch(care_plans::update_task_status),
        )
        // Appointments
        .route(
            "/api/appointments",
            post(appointments::create).get(appointments::list),
        )
        .route(
            "/api/appointments/{id}",
            get(appointments::get)
                .put(appointments::update)
                .delete(appointments::delete),
        )
        // Notifications
        .route("/api/notifications", get(notifications::list))
        .route("/api/notifications/stream", get(notifications::stream))
        .route(
            "/api/notifications/{id}/read",
            patch(notifications::mark_read),
        )
        .route("/api/notifications/{id}", delete(notifications::delete))
        // Emergency alerts
        .route(
            "/api/emergency-alerts",
            post(records::raise_alert).get(records::list_alerts),
        )
        .route(
            "/api/emergency-alerts/{id}/resolve",
            patch(records::resolve_alert),
        )
        .route("/api/emergency-alerts/{id}", delete(records::delete_alert))
        // Medications
        .route(
            "/api/medications",
            post(records::create_medication).get(records::list_medications),
        )
        .route(
            "/api/medications/{id}",
            get(records::get_medication)
                .put(records::update_medication)
                .delete(records::delete_medication),
        )
        // Files
        .route(
            "/api/files",
            post(records::register_file).get(records::list_files),
        )
        .route("/api/files/{id}", delete(records::delete_file))
        // Family links
        .route(
            "/api/family-links",
            post(records::link_family_member).get(records::list_family_links),
        )
        .route("/api/family-links/{id}", delete(records::delete_family_link))
        // Messages
        .route(
            "/api/messages",
            post(records::send_message).get(records::list_messages),
        )
        .route("/api/messages/{id}", delete(records::delete_message))
        .route_layer(from_fn_with_state(
            AuthState::new(deps.tokens, &deps.auth.cookie_name),
            require_auth,
        ));

    // Rate limiting wraps auth, so rejected logins and unauthenticated
    // care-plan writes are counted too.
    public
        .merge(protected)
        .route_layer(from_fn_with_state(deps.limiter, rate_limit_middleware))
        .layer(Extension(deps.services))
        .layer(Extension(deps.auth))
        .layer(Extension(deps.channels))
        .layer(Extension(deps.validation))
        .layer(Extension(deps.shutdown))
}
