use std::convert::Infallible;
use std::sync::Arc;

use axum::Extension;
use axum::extract::{Path, Query};
use axum::response::sse::{Event, KeepAlive, Sse};
use carelink_auth::AuthUser;
use futures_util::{Stream, StreamExt, future};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::api::rest::dto::{NotificationDto, NotificationEventDto, NotificationsQuery};
use crate::api::rest::error::ApiResult;
use crate::api::rest::response::Reply;
use crate::api::rest::validation::parse_id;
use crate::domain::events::NotificationEvent;
use crate::domain::service::AppServices;
use crate::infra::realtime::UserChannels;

#[tracing::instrument(
    name = "care.notifications.list",
    skip(svc, query),
    fields(user.id = %user.user_id)
)]
pub async fn list(
    Extension(svc): Extension<Arc<AppServices>>,
    AuthUser(user): AuthUser,
    Query(query): Query<NotificationsQuery>,
) -> ApiResult<Reply<Vec<NotificationDto>>> {
    let items = svc.notifications.list(user.user_id, query.unread).await?;
    Ok(Reply::ok(
        "Notifications retrieved",
        items.into_iter().map(Into::into).collect(),
    ))
}

#[tracing::instrument(
    name = "care.notifications.mark_read",
    skip(svc),
    fields(user.id = %user.user_id)
)]
pub async fn mark_read(
    Extension(svc): Extension<Arc<AppServices>>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Reply<()>> {
    let id = parse_id(&id)?;
    svc.notifications.mark_read(user.user_id, id).await?;
    Ok(Reply::message("Notification marked as read"))
}

#[tracing::instrument(
    name = "care.notifications.delete",
    skip(svc),
    fields(user.id = %user.user_id)
)]
pub async fn delete(
    Extension(svc): Extension<Arc<AppServices>>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Reply<()>> {
    let id = parse_id(&id)?;
    svc.notifications.delete(user.user_id, id).await?;
    Ok(Reply::message("Notification deleted successfully"))
}

/// The caller's real-time channel as Server-Sent Events. The event name is the
/// event type (`notification:read`, `notification:deleted`, `task:reminder`).
/// The stream ends when the server starts shutting down.
#[tracing::instrument(
    name = "care.notifications.stream",
    skip(channels, shutdown),
    fields(user.id = %user.user_id)
)]
pub async fn stream(
    Extension(channels): Extension<UserChannels>,
    Extension(shutdown): Extension<CancellationToken>,
    AuthUser(user): AuthUser,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    info!("new real-time subscriber");
    let rx = channels.subscribe(user.user_id);

    let events = BroadcastStream::new(rx)
        .filter_map(|msg| future::ready(to_sse_event(msg)))
        .take_until(shutdown.cancelled_owned());

    Sse::new(events).keep_alive(KeepAlive::default())
}

fn to_sse_event(
    msg: Result<NotificationEvent, BroadcastStreamRecvError>,
) -> Option<Result<Event, Infallible>> {
    match msg {
        Ok(ev) => match Event::default()
            .event(ev.name())
            .json_data(NotificationEventDto::from(&ev))
        {
            Ok(event) => Some(Ok(event)),
            Err(e) => {
                warn!(error = %e, "failed to encode real-time event");
                None
            }
        },
        Err(lagged) => {
            warn!(error = %lagged, "real-time subscriber lagged; events skipped");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use carelink_auth::{Identity, Role};
    use uuid::Uuid;

    use super::*;

    #[tokio::test]
    #[tracing_test::traced_test]
    async fn stream_subscribes_within_its_span() {
        let channels = UserChannels::default();
        let user = Identity {
            user_id: Uuid::now_v7(),
            role: Role::User,
        };
        let _sse = stream(
            Extension(channels.clone()),
            Extension(CancellationToken::new()),
            AuthUser(user),
        )
        .await;

        let delivered = channels.send_to(
            user.user_id,
            NotificationEvent::Read {
                notification_id: Uuid::now_v7(),
                user_id: user.user_id,
            },
        );
        assert_eq!(delivered, 1);
        assert!(logs_contain("care.notifications.stream"));
        assert!(logs_contain("new real-time subscriber"));
    }
}
