use std::sync::Arc;

use axum::Extension;
use axum_extra::extract::CookieJar;
use carelink_auth::cookie::{cleared_session_cookie, session_cookie};
use carelink_auth::{AuthConfig, AuthUser};
use tracing::{field::Empty, info};

use crate::api::rest::dto::{LoginReq, RegisterReq, UpdateProfileReq, UserDto, UserSummaryDto};
use crate::api::rest::error::ApiResult;
use crate::api::rest::response::Reply;
use crate::api::rest::validation::ValidJson;
use crate::domain::service::AppServices;

#[tracing::instrument(
    name = "care.users.register",
    skip(svc, auth, jar, new_user),
    fields(user.id = Empty)
)]
pub async fn register(
    Extension(svc): Extension<Arc<AppServices>>,
    Extension(auth): Extension<Arc<AuthConfig>>,
    jar: CookieJar,
    ValidJson(new_user): ValidJson<RegisterReq>,
) -> ApiResult<(CookieJar, Reply<UserDto>)> {
    let session = svc.users.register(new_user).await?;
    tracing::Span::current().record("user.id", tracing::field::display(session.user.id));
    let jar = jar.add(session_cookie(&auth, session.token));
    Ok((
        jar,
        Reply::created("User registered successfully", session.user.into()),
    ))
}

#[tracing::instrument(name = "care.users.login", skip(svc, auth, jar, creds))]
pub async fn login(
    Extension(svc): Extension<Arc<AppServices>>,
    Extension(auth): Extension<Arc<AuthConfig>>,
    jar: CookieJar,
    ValidJson(creds): ValidJson<LoginReq>,
) -> ApiResult<(CookieJar, Reply<UserDto>)> {
    let session = svc.users.login(&creds.email, &creds.password).await?;
    let jar = jar.add(session_cookie(&auth, session.token));
    Ok((jar, Reply::ok("Login successful", session.user.into())))
}

#[tracing::instrument(name = "care.users.logout", skip(auth, jar))]
pub async fn logout(
    Extension(auth): Extension<Arc<AuthConfig>>,
    jar: CookieJar,
) -> (CookieJar, Reply<()>) {
    info!("session cookie cleared");
    (
        jar.add(cleared_session_cookie(&auth)),
        Reply::message("Logged out successfully"),
    )
}

#[tracing::instrument(name = "care.users.me", skip(svc), fields(user.id = %user.user_id))]
pub async fn me(
    Extension(svc): Extension<Arc<AppServices>>,
    AuthUser(user): AuthUser,
) -> ApiResult<Reply<UserDto>> {
    let profile = svc.users.get(user.user_id).await?;
    Ok(Reply::ok("Profile retrieved", profile.into()))
}

#[tracing::instrument(
    name = "care.users.update_me",
    skip(svc, patch),
    fields(user.id = %user.user_id)
)]
pub async fn update_me(
    Extension(svc): Extension<Arc<AppServices>>,
    AuthUser(user): AuthUser,
    ValidJson(patch): ValidJson<UpdateProfileReq>,
) -> ApiResult<Reply<UserDto>> {
    let profile = svc.users.update_profile(user.user_id, patch).await?;
    Ok(Reply::ok("Profile updated successfully", profile.into()))
}

#[tracing::instrument(name = "care.users.directory", skip(svc), fields(user.id = %user.user_id))]
pub async fn directory(
    Extension(svc): Extension<Arc<AppServices>>,
    AuthUser(user): AuthUser,
) -> ApiResult<Reply<Vec<UserSummaryDto>>> {
    let users = svc.users.directory().await?;
    Ok(Reply::ok(
        "Users retrieved",
        users.into_iter().map(Into::into).collect(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[tracing_test::traced_test]
    async fn logout_clears_cookie_within_its_span() {
        let auth = Arc::new(AuthConfig::default());
        let (jar, _) = logout(Extension(auth.clone()), CookieJar::new()).await;

        let cookie = jar.get(&auth.cookie_name).unwrap();
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(time::Duration::ZERO));
        assert!(logs_contain("care.users.logout"));
    }
}
