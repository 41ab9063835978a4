//! HTTP-only session cookie carrying the signed token.

use axum_extra::extract::cookie::{Cookie, SameSite};

use crate::config::AuthConfig;

/// Build the session cookie for a freshly issued token.
#[must_use]
pub fn session_cookie(cfg: &AuthConfig, token: String) -> Cookie<'static> {
    Cookie::build((cfg.cookie_name.clone(), token))
        .http_only(true)
        .same_site(SameSite::Strict)
        .secure(cfg.cookie_secure)
        .path("/")
        .max_age(time::Duration::seconds(
            i64::try_from(cfg.token_ttl_secs).unwrap_or(i64::MAX),
        ))
        .build()
}

/// Build an expired cookie that makes the browser drop the session.
#[must_use]
pub fn cleared_session_cookie(cfg: &AuthConfig) -> Cookie<'static> {
    Cookie::build((cfg.cookie_name.clone(), String::new()))
        .http_only(true)
        .same_site(SameSite::Strict)
        .secure(cfg.cookie_secure)
        .path("/")
        .max_age(time::Duration::ZERO)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_cookie_is_http_only_and_strict() {
        let cfg = AuthConfig {
            token_ttl_secs: 60,
            ..AuthConfig::default()
        };
        let rendered = session_cookie(&cfg, "abc".to_owned()).to_string();

        assert!(rendered.starts_with("token=abc"));
        assert!(rendered.contains("HttpOnly"));
        assert!(rendered.contains("SameSite=Strict"));
        assert!(rendered.contains("Max-Age=60"));
        assert!(!rendered.contains("Secure"));
    }

    #[test]
    fn cleared_cookie_expires_immediately() {
        let rendered = cleared_session_cookie(&AuthConfig::default()).to_string();
        assert!(rendered.contains("Max-Age=0"));
    }
}
