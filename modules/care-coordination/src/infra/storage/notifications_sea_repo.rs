use anyhow::Context;
use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};
use tracing::instrument;
use uuid::Uuid;

use crate::domain::model::Notification;
use crate::domain::repo::NotificationsRepository;
use crate::infra::storage::entity::notification::{Column, Entity as NotificationEntity};
use crate::infra::storage::mapper::notification_active;

pub struct SeaOrmNotificationsRepository {
    conn: DatabaseConnection,
}

impl SeaOrmNotificationsRepository {
    #[must_use]
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl NotificationsRepository for SeaOrmNotificationsRepository {
    #[instrument(
        name = "care.repo.notifications.insert",
        skip(self, notification),
        fields(
            db.operation = "INSERT",
            notification.id = %notification.id,
            notification.kind = %notification.kind
        )
    )]
    async fn insert(&self, notification: &Notification) -> anyhow::Result<()> {
        let _ = notification_active(notification)
            .insert(&self.conn)
            .await
            .context("insert notification failed")?;
        Ok(())
    }

    async fn list_for_user(
        &self,
        owner: Uuid,
        unread_only: bool,
    ) -> anyhow::Result<Vec<Notification>> {
        let mut query = NotificationEntity::find().filter(Column::UserId.eq(owner));
        if unread_only {
            query = query.filter(Column::Read.eq(false));
        }
        query
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id)
            .all(&self.conn)
            .await
            .context("list notifications failed")?
            .into_iter()
            .map(Notification::try_from)
            .collect()
    }

    #[instrument(
        name = "care.repo.notifications.mark_read",
        skip(self),
        fields(db.operation = "UPDATE", notification.id = %id)
    )]
    async fn mark_read(&self, owner: Uuid, id: Uuid) -> anyhow::Result<bool> {
        let res = NotificationEntity::update_many()
            .col_expr(Column::Read, Expr::value(true))
            .filter(Column::Id.eq(id))
            .filter(Column::UserId.eq(owner))
            .exec(&self.conn)
            .await
            .context("mark notification read failed")?;
        Ok(res.rows_affected > 0)
    }

    async fn delete_owned(&self, owner: Uuid, id: Uuid) -> anyhow::Result<bool> {
        let res = NotificationEntity::delete_many()
            .filter(Column::Id.eq(id))
            .filter(Column::UserId.eq(owner))
            .exec(&self.conn)
            .await
            .context("delete notification failed")?;
        Ok(res.rows_affected > 0)
    }
}
