use std::sync::Arc;

use axum::Extension;
use axum::extract::Path;
use carelink_auth::AuthUser;

use crate::api::rest::dto::{CarePlanDto, CarePlanReq, TaskStatusReq};
use crate::api::rest::error::ApiResult;
use crate::api::rest::response::Reply;
use crate::api::rest::validation::{ValidJson, parse_id};
use crate::domain::service::AppServices;

#[tracing::instrument(
    name = "care.care_plans.create",
    skip(svc, draft),
    fields(user.id = %user.user_id)
)]
pub async fn create(
    Extension(svc): Extension<Arc<AppServices>>,
    AuthUser(user): AuthUser,
    ValidJson(draft): ValidJson<CarePlanReq>,
) -> ApiResult<Reply<CarePlanDto>> {
    let plan = svc.care_plans.create(user.user_id, draft).await?;
    Ok(Reply::created("Care plan created successfully", plan.into()))
}

#[tracing::instrument(name = "care.care_plans.list", skip(svc), fields(user.id = %user.user_id))]
pub async fn list(
    Extension(svc): Extension<Arc<AppServices>>,
    AuthUser(user): AuthUser,
) -> ApiResult<Reply<Vec<CarePlanDto>>> {
    let plans = svc.care_plans.list(user.user_id).await?;
    Ok(Reply::ok(
        "Care plans retrieved",
        plans.into_iter().map(Into::into).collect(),
    ))
}

#[tracing::instrument(
    name = "care.care_plans.list_assigned",
    skip(svc),
    fields(user.id = %user.user_id)
)]
pub async fn list_assigned(
    Extension(svc): Extension<Arc<AppServices>>,
    AuthUser(user): AuthUser,
) -> ApiResult<Reply<Vec<CarePlanDto>>> {
    let plans = svc.care_plans.list_assigned(user.user_id).await?;
    Ok(Reply::ok(
        "Assigned care plans retrieved",
        plans.into_iter().map(Into::into).collect(),
    ))
}

#[tracing::instrument(name = "care.care_plans.get", skip(svc), fields(user.id = %user.user_id))]
pub async fn get(
    Extension(svc): Extension<Arc<AppServices>>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Reply<CarePlanDto>> {
    let id = parse_id(&id)?;
    let plan = svc.care_plans.get(user.user_id, id).await?;
    Ok(Reply::ok("Care plan retrieved", plan.into()))
}

#[tracing::instrument(
    name = "care.care_plans.update",
    skip(svc, draft),
    fields(user.id = %user.user_id)
)]
pub async fn update(
    Extension(svc): Extension<Arc<AppServices>>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
    ValidJson(draft): ValidJson<CarePlanReq>,
) -> ApiResult<Reply<CarePlanDto>> {
    let id = parse_id(&id)?;
    let plan = svc.care_plans.update(user.user_id, id, draft).await?;
    Ok(Reply::ok("Care plan updated successfully", plan.into()))
}

#[tracing::instrument(
    name = "care.care_plans.update_task_status",
    skip(svc, status),
    fields(user.id = %user.user_id)
)]
pub async fn update_task_status(
    Extension(svc): Extension<Arc<AppServices>>,
    AuthUser(user): AuthUser,
    Path((id, task_id)): Path<(String, String)>,
    ValidJson(status): ValidJson<TaskStatusReq>,
) -> ApiResult<Reply<CarePlanDto>> {
    let id = parse_id(&id)?;
    let task_id = parse_id(&task_id)?;
    let plan = svc
        .care_plans
        .update_task_status(user.user_id, id, task_id, status)
        .await?;
    Ok(Reply::ok("Task status updated", plan.into()))
}

#[tracing::instrument(name = "care.care_plans.delete", skip(svc), fields(user.id = %user.user_id))]
pub async fn delete(
    Extension(svc): Extension<Arc<AppServices>>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Reply<()>> {
    let id = parse_id(&id)?;
    svc.care_plans.delete(user.user_id, id).await?;
    Ok(Reply::message("Care plan deleted successfully"))
}
