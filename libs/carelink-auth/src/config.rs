use serde::{Deserialize, Serialize};

/// Session token and cookie settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthConfig {
    /// HMAC secret used to sign session tokens.
    pub jwt_secret: String,
    /// Token lifetime; also used as the cookie `Max-Age`.
    pub token_ttl_secs: u64,
    pub cookie_name: String,
    /// Set the `Secure` cookie attribute. Enable when served over HTTPS.
    pub cookie_secure: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "change-me-in-production".to_owned(),
            token_ttl_secs: 24 * 60 * 60,
            cookie_name: "token".to_owned(),
            cookie_secure: false,
        }
    }
}
