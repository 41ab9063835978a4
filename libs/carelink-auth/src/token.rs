//! Signed session tokens (HS256 JWT) carrying the user id and role.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::errors::AuthError;
use crate::types::{Identity, Role};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl_secs: i64,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("ttl_secs", &self.ttl_secs)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    #[must_use]
    pub fn new(cfg: &AuthConfig) -> Self {
        let secret = cfg.jwt_secret.as_bytes();
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl_secs: i64::try_from(cfg.token_ttl_secs).unwrap_or(i64::MAX),
        }
    }

    #[must_use]
    pub fn ttl_secs(&self) -> i64 {
        self.ttl_secs
    }

    /// Issue a token valid from now for the configured TTL.
    ///
    /// # Errors
    /// Returns [`AuthError::Signing`] if the token cannot be encoded.
    pub fn issue(&self, user_id: Uuid, role: Role) -> Result<String, AuthError> {
        self.issue_at(user_id, role, OffsetDateTime::now_utc())
    }

    /// Issue a token as if the current time were `now`.
    ///
    /// # Errors
    /// Returns [`AuthError::Signing`] if the token cannot be encoded.
    pub fn issue_at(
        &self,
        user_id: Uuid,
        role: Role,
        now: OffsetDateTime,
    ) -> Result<String, AuthError> {
        let iat = now.unix_timestamp();
        let claims = Claims {
            sub: user_id,
            role,
            iat,
            exp: iat.saturating_add(self.ttl_secs),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AuthError::Signing(e.to_string()))
    }

    /// Verify signature and expiry, returning the embedded identity.
    ///
    /// # Errors
    /// Returns [`AuthError::TokenExpired`] for an expired token and
    /// [`AuthError::InvalidToken`] for anything else that fails to verify.
    pub fn verify(&self, token: &str) -> Result<Identity, AuthError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken(e.to_string()),
            }
        })?;

        Ok(Identity {
            user_id: data.claims.sub,
            role: data.claims.role,
        })
    }
}
