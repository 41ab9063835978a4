//! Axum middleware and extractors for cookie-based auth

use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;

use crate::{errors::AuthError, token::TokenService, types::Identity};

#[derive(Clone)]
pub struct AuthState {
    tokens: Arc<TokenService>,
    cookie_name: Arc<str>,
}

impl AuthState {
    #[must_use]
    pub fn new(tokens: Arc<TokenService>, cookie_name: &str) -> Self {
        Self {
            tokens,
            cookie_name: Arc::from(cookie_name),
        }
    }

    fn authenticate(&self, jar: &CookieJar) -> Result<Identity, AuthError> {
        let cookie = jar
            .get(&self.cookie_name)
            .filter(|c| !c.value().is_empty())
            .ok_or(AuthError::Unauthenticated)?;
        self.tokens.verify(cookie.value())
    }
}

/// Reject requests without a valid session cookie; on success the decoded
/// [`Identity`] is stored in the request extensions.
pub async fn require_auth(State(state): State<AuthState>, mut req: Request, next: Next) -> Response {
    let jar = CookieJar::from_headers(req.headers());
    match state.authenticate(&jar) {
        Ok(identity) => {
            tracing::Span::current().record("user.id", tracing::field::display(identity.user_id));
            req.extensions_mut().insert(identity);
            next.run(req).await
        }
        Err(e) => e.into_response(),
    }
}

/// Extractor for the authenticated caller - requires `require_auth` to have run
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub Identity);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .copied()
            .map(AuthUser)
            .ok_or(AuthError::Unauthenticated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AuthConfig;
    use crate::types::Role;
    use axum::{Router, body::Body, http::StatusCode, middleware, routing::get};
    use tower::ServiceExt;
    use uuid::Uuid;

    fn app(tokens: Arc<TokenService>) -> Router {
        async fn whoami(AuthUser(identity): AuthUser) -> String {
            identity.user_id.to_string()
        }

        let state = AuthState::new(tokens, "token");
        Router::new()
            .route("/me", get(whoami))
            .layer(middleware::from_fn_with_state(state, require_auth))
    }

    fn tokens() -> Arc<TokenService> {
        Arc::new(TokenService::new(&AuthConfig::default()))
    }

    async fn call(app: Router, cookie: Option<String>) -> (StatusCode, String) {
        let mut req = axum::http::Request::builder().uri("/me");
        if let Some(c) = cookie {
            req = req.header(axum::http::header::COOKIE, c);
        }
        let resp = app.oneshot(req.body(Body::empty()).unwrap()).await.unwrap();
        let status = resp.status();
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8_lossy(&body).into_owned())
    }

    #[tokio::test]
    async fn missing_cookie_is_unauthorized() {
        let (status, body) = call(app(tokens()), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.contains("Authentication required"));
    }

    #[tokio::test]
    async fn valid_cookie_reaches_handler_with_identity() {
        let tokens = tokens();
        let user_id = Uuid::new_v4();
        let token = tokens.issue(user_id, Role::User).unwrap();

        let (status, body) = call(app(tokens), Some(format!("token={token}"))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, user_id.to_string());
    }

    #[tokio::test]
    async fn tampered_cookie_is_rejected() {
        let tokens = tokens();
        let token = tokens.issue(Uuid::new_v4(), Role::User).unwrap();

        let (status, body) = call(app(tokens), Some(format!("token={token}x"))).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.contains("Invalid token"));
    }
}
