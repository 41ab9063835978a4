use std::sync::Arc;

use axum::Extension;
use axum::extract::Path;
use carelink_auth::AuthUser;

use crate::api::rest::dto::{AppointmentDto, AppointmentPatchReq, AppointmentReq};
use crate::api::rest::error::ApiResult;
use crate::api::rest::response::Reply;
use crate::api::rest::validation::{ValidJson, parse_id};
use crate::domain::service::AppServices;

#[tracing::instrument(
    name = "care.appointments.create",
    skip(svc, new),
    fields(user.id = %user.user_id)
)]
pub async fn create(
    Extension(svc): Extension<Arc<AppServices>>,
    AuthUser(user): AuthUser,
    ValidJson(new): ValidJson<AppointmentReq>,
) -> ApiResult<Reply<AppointmentDto>> {
    let appointment = svc.appointments.create(user.user_id, new).await?;
    Ok(Reply::created(
        "Appointment created successfully",
        appointment.into(),
    ))
}

#[tracing::instrument(name = "care.appointments.list", skip(svc), fields(user.id = %user.user_id))]
pub async fn list(
    Extension(svc): Extension<Arc<AppServices>>,
    AuthUser(user): AuthUser,
) -> ApiResult<Reply<Vec<AppointmentDto>>> {
    let items = svc.appointments.list(user.user_id).await?;
    Ok(Reply::ok(
        "Appointments retrieved",
        items.into_iter().map(Into::into).collect(),
    ))
}

#[tracing::instrument(name = "care.appointments.get", skip(svc), fields(user.id = %user.user_id))]
pub async fn get(
    Extension(svc): Extension<Arc<AppServices>>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Reply<AppointmentDto>> {
    let id = parse_id(&id)?;
    let appointment = svc.appointments.get(user.user_id, id).await?;
    Ok(Reply::ok("Appointment retrieved", appointment.into()))
}

#[tracing::instrument(
    name = "care.appointments.update",
    skip(svc, patch),
    fields(user.id = %user.user_id)
)]
pub async fn update(
    Extension(svc): Extension<Arc<AppServices>>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
    ValidJson(patch): ValidJson<AppointmentPatchReq>,
) -> ApiResult<Reply<AppointmentDto>> {
    let id = parse_id(&id)?;
    let appointment = svc.appointments.update(user.user_id, id, patch).await?;
    Ok(Reply::ok(
        "Appointment updated successfully",
        appointment.into(),
    ))
}

#[tracing::instrument(
    name = "care.appointments.delete",
    skip(svc),
    fields(user.id = %user.user_id)
)]
pub async fn delete(
    Extension(svc): Extension<Arc<AppServices>>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Reply<()>> {
    let id = parse_id(&id)?;
    svc.appointments.delete(user.user_id, id).await?;
    Ok(Reply::message("Appointment deleted successfully"))
}
