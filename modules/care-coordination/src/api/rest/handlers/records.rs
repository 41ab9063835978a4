//! Handlers for the per-user record resources: emergency alerts, medications,
//! file metadata, family links and messages.

use std::sync::Arc;

use axum::Extension;
use axum::extract::Path;
use carelink_auth::AuthUser;

use crate::api::rest::dto::{
    EmergencyAlertDto, EmergencyAlertReq, FamilyLinkDto, FamilyLinkReq, FileDto, FileReq,
    MedicationDto, MedicationReq, MessageDto, MessageReq,
};
use crate::api::rest::error::ApiResult;
use crate::api::rest::response::Reply;
use crate::api::rest::validation::{ValidJson, parse_id};
use crate::domain::service::AppServices;

// ==================== Emergency alerts ====================

#[tracing::instrument(
    name = "care.alerts.raise",
    skip(svc, new),
    fields(user.id = %user.user_id)
)]
pub async fn raise_alert(
    Extension(svc): Extension<Arc<AppServices>>,
    AuthUser(user): AuthUser,
    ValidJson(new): ValidJson<EmergencyAlertReq>,
) -> ApiResult<Reply<EmergencyAlertDto>> {
    let alert = svc.alerts.raise(user.user_id, new).await?;
    Ok(Reply::created("Emergency alert sent", alert.into()))
}

#[tracing::instrument(name = "care.alerts.list", skip(svc), fields(user.id = %user.user_id))]
pub async fn list_alerts(
    Extension(svc): Extension<Arc<AppServices>>,
    AuthUser(user): AuthUser,
) -> ApiResult<Reply<Vec<EmergencyAlertDto>>> {
    let alerts = svc.alerts.list(user.user_id).await?;
    Ok(Reply::ok(
        "Emergency alerts retrieved",
        alerts.into_iter().map(Into::into).collect(),
    ))
}

#[tracing::instrument(name = "care.alerts.resolve", skip(svc), fields(user.id = %user.user_id))]
pub async fn resolve_alert(
    Extension(svc): Extension<Arc<AppServices>>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Reply<EmergencyAlertDto>> {
    let id = parse_id(&id)?;
    let alert = svc.alerts.resolve(user.user_id, id).await?;
    Ok(Reply::ok("Emergency alert resolved", alert.into()))
}

#[tracing::instrument(name = "care.alerts.delete", skip(svc), fields(user.id = %user.user_id))]
pub async fn delete_alert(
    Extension(svc): Extension<Arc<AppServices>>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Reply<()>> {
    let id = parse_id(&id)?;
    svc.alerts.delete(user.user_id, id).await?;
    Ok(Reply::message("Emergency alert deleted successfully"))
}

// ==================== Medications ====================

#[tracing::instrument(
    name = "care.medications.create",
    skip(svc, draft),
    fields(user.id = %user.user_id)
)]
pub async fn create_medication(
    Extension(svc): Extension<Arc<AppServices>>,
    AuthUser(user): AuthUser,
    ValidJson(draft): ValidJson<MedicationReq>,
) -> ApiResult<Reply<MedicationDto>> {
    let medication = svc.medications.create(user.user_id, draft).await?;
    Ok(Reply::created(
        "Medication added successfully",
        medication.into(),
    ))
}

#[tracing::instrument(name = "care.medications.list", skip(svc), fields(user.id = %user.user_id))]
pub async fn list_medications(
    Extension(svc): Extension<Arc<AppServices>>,
    AuthUser(user): AuthUser,
) -> ApiResult<Reply<Vec<MedicationDto>>> {
    let items = svc.medications.list(user.user_id).await?;
    Ok(Reply::ok(
        "Medications retrieved",
        items.into_iter().map(Into::into).collect(),
    ))
}

#[tracing::instrument(name = "care.medications.get", skip(svc), fields(user.id = %user.user_id))]
pub async fn get_medication(
    Extension(svc): Extension<Arc<AppServices>>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Reply<MedicationDto>> {
    let id = parse_id(&id)?;
    let medication = svc.medications.get(user.user_id, id).await?;
    Ok(Reply::ok("Medication retrieved", medication.into()))
}

#[tracing::instrument(
    name = "care.medications.update",
    skip(svc, draft),
    fields(user.id = %user.user_id)
)]
pub async fn update_medication(
    Extension(svc): Extension<Arc<AppServices>>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
    ValidJson(draft): ValidJson<MedicationReq>,
) -> ApiResult<Reply<MedicationDto>> {
    let id = parse_id(&id)?;
    let medication = svc.medications.update(user.user_id, id, draft).await?;
    Ok(Reply::ok(
        "Medication updated successfully",
        medication.into(),
    ))
}

#[tracing::instrument(name = "care.medications.delete", skip(svc), fields(user.id = %user.user_id))]
pub async fn delete_medication(
    Extension(svc): Extension<Arc<AppServices>>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Reply<()>> {
    let id = parse_id(&id)?;
    svc.medications.delete(user.user_id, id).await?;
    Ok(Reply::message("Medication deleted successfully"))
}

// ==================== Files ====================

#[tracing::instrument(
    name = "care.files.register",
    skip(svc, new),
    fields(user.id = %user.user_id)
)]
pub async fn register_file(
    Extension(svc): Extension<Arc<AppServices>>,
    AuthUser(user): AuthUser,
    ValidJson(new): ValidJson<FileReq>,
) -> ApiResult<Reply<FileDto>> {
    let record = svc.files.register(user.user_id, new).await?;
    Ok(Reply::created("File registered successfully", record.into()))
}

#[tracing::instrument(name = "care.files.list", skip(svc), fields(user.id = %user.user_id))]
pub async fn list_files(
    Extension(svc): Extension<Arc<AppServices>>,
    AuthUser(user): AuthUser,
) -> ApiResult<Reply<Vec<FileDto>>> {
    let items = svc.files.list(user.user_id).await?;
    Ok(Reply::ok(
        "Files retrieved",
        items.into_iter().map(Into::into).collect(),
    ))
}

#[tracing::instrument(name = "care.files.delete", skip(svc), fields(user.id = %user.user_id))]
pub async fn delete_file(
    Extension(svc): Extension<Arc<AppServices>>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Reply<()>> {
    let id = parse_id(&id)?;
    svc.files.delete(user.user_id, id).await?;
    Ok(Reply::message("File deleted successfully"))
}

// ==================== Family links ====================

#[tracing::instrument(
    name = "care.family.link",
    skip(svc, new),
    fields(user.id = %user.user_id)
)]
pub async fn link_family_member(
    Extension(svc): Extension<Arc<AppServices>>,
    AuthUser(user): AuthUser,
    ValidJson(new): ValidJson<FamilyLinkReq>,
) -> ApiResult<Reply<FamilyLinkDto>> {
    let link = svc.family_links.link(user.user_id, new).await?;
    Ok(Reply::created("Family member linked successfully", link.into()))
}

#[tracing::instrument(name = "care.family.list", skip(svc), fields(user.id = %user.user_id))]
pub async fn list_family_links(
    Extension(svc): Extension<Arc<AppServices>>,
    AuthUser(user): AuthUser,
) -> ApiResult<Reply<Vec<FamilyLinkDto>>> {
    let items = svc.family_links.list(user.user_id).await?;
    Ok(Reply::ok(
        "Family members retrieved",
        items.into_iter().map(Into::into).collect(),
    ))
}

#[tracing::instrument(name = "care.family.delete", skip(svc), fields(user.id = %user.user_id))]
pub async fn delete_family_link(
    Extension(svc): Extension<Arc<AppServices>>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Reply<()>> {
    let id = parse_id(&id)?;
    svc.family_links.delete(user.user_id, id).await?;
    Ok(Reply::message("Family member unlinked successfully"))
}

// ==================== Messages ====================

#[tracing::instrument(
    name = "care.messages.send",
    skip(svc, new),
    fields(user.id = %user.user_id)
)]
pub async fn send_message(
    Extension(svc): Extension<Arc<AppServices>>,
    AuthUser(user): AuthUser,
    ValidJson(new): ValidJson<MessageReq>,
) -> ApiResult<Reply<MessageDto>> {
    let msg = svc.messages.send(user.user_id, new).await?;
    Ok(Reply::created("Message sent", msg.into()))
}

#[tracing::instrument(name = "care.messages.list", skip(svc), fields(user.id = %user.user_id))]
pub async fn list_messages(
    Extension(svc): Extension<Arc<AppServices>>,
    AuthUser(user): AuthUser,
) -> ApiResult<Reply<Vec<MessageDto>>> {
    let items = svc.messages.list(user.user_id).await?;
    Ok(Reply::ok(
        "Messages retrieved",
        items.into_iter().map(Into::into).collect(),
    ))
}

#[tracing::instrument(name = "care.messages.delete", skip(svc), fields(user.id = %user.user_id))]
pub async fn delete_message(
    Extension(svc): Extension<Arc<AppServices>>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Reply<()>> {
    let id = parse_id(&id)?;
    svc.messages.delete(user.user_id, id).await?;
    Ok(Reply::message("Message deleted successfully"))
}
