//! CareLink authentication.
//!
//! - [`TokenService`] issues and verifies HS256 session tokens carrying the user id and role.
//! - [`password`] hashes and verifies passwords with Argon2id.
//! - [`cookie`] builds the HTTP-only, `SameSite=Strict` session cookie.
//! - [`require_auth`] / [`AuthUser`] guard axum routes and expose the caller's [`Identity`].
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod axum_ext;
pub mod config;
pub mod cookie;
pub mod errors;
pub mod password;
pub mod token;
pub mod types;

pub use axum_ext::{AuthState, AuthUser, require_auth};
pub use config::AuthConfig;
pub use errors::AuthError;
pub use token::{Claims, TokenService};
pub use types::{Identity, Role, UnknownRole};
