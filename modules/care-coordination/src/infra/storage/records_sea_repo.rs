//! SeaORM-backed repositories for the per-user record tables: emergency alerts,
//! medications, file metadata, family links and messages.

use anyhow::Context;
use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder,
};
use time::OffsetDateTime;
use tracing::instrument;
use uuid::Uuid;

use crate::domain::model::{EmergencyAlert, FamilyLink, FileRecord, Medication, Message};
use crate::domain::repo::{
    EmergencyAlertsRepository, FamilyLinksRepository, FilesRepository, MedicationsRepository,
    MessagesRepository,
};
use crate::infra::storage::entity::{emergency_alert, family_link, file, medication, message};
use crate::infra::storage::mapper::{
    emergency_alert_active, family_link_active, file_active, medication_active, message_active,
};

// ==================== Emergency alerts ====================

pub struct SeaOrmEmergencyAlertsRepository {
    conn: DatabaseConnection,
}

impl SeaOrmEmergencyAlertsRepository {
    #[must_use]
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl EmergencyAlertsRepository for SeaOrmEmergencyAlertsRepository {
    #[instrument(
        name = "care.repo.alerts.insert",
        skip(self, alert),
        fields(db.operation = "INSERT", alert.id = %alert.id, alert.severity = %alert.severity)
    )]
    async fn insert(&self, alert: &EmergencyAlert) -> anyhow::Result<()> {
        let _ = emergency_alert_active(alert)
            .insert(&self.conn)
            .await
            .context("insert emergency alert failed")?;
        Ok(())
    }

    async fn find_owned(&self, owner: Uuid, id: Uuid) -> anyhow::Result<Option<EmergencyAlert>> {
        emergency_alert::Entity::find()
            .filter(emergency_alert::Column::Id.eq(id))
            .filter(emergency_alert::Column::UserId.eq(owner))
            .one(&self.conn)
            .await
            .context("find emergency alert failed")?
            .map(EmergencyAlert::try_from)
            .transpose()
    }

    async fn list_owned(&self, owner: Uuid) -> anyhow::Result<Vec<EmergencyAlert>> {
        emergency_alert::Entity::find()
            .filter(emergency_alert::Column::UserId.eq(owner))
            .order_by_desc(emergency_alert::Column::CreatedAt)
            .order_by_desc(emergency_alert::Column::Id)
            .all(&self.conn)
            .await
            .context("list emergency alerts failed")?
            .into_iter()
            .map(EmergencyAlert::try_from)
            .collect()
    }

    async fn mark_resolved(
        &self,
        owner: Uuid,
        id: Uuid,
        at: OffsetDateTime,
    ) -> anyhow::Result<bool> {
        let res = emergency_alert::Entity::update_many()
            .col_expr(emergency_alert::Column::Resolved, Expr::value(true))
            .col_expr(emergency_alert::Column::ResolvedAt, Expr::value(Some(at)))
            .filter(emergency_alert::Column::Id.eq(id))
            .filter(emergency_alert::Column::UserId.eq(owner))
            .exec(&self.conn)
            .await
            .context("resolve emergency alert failed")?;
        Ok(res.rows_affected > 0)
    }

    async fn delete_owned(&self, owner: Uuid, id: Uuid) -> anyhow::Result<bool> {
        let res = emergency_alert::Entity::delete_many()
            .filter(emergency_alert::Column::Id.eq(id))
            .filter(emergency_alert::Column::UserId.eq(owner))
            .exec(&self.conn)
            .await
            .context("delete emergency alert failed")?;
        Ok(res.rows_affected > 0)
    }
}

// ==================== Medications ====================

pub struct SeaOrmMedicationsRepository {
    conn: DatabaseConnection,
}

impl SeaOrmMedicationsRepository {
    #[must_use]
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl MedicationsRepository for SeaOrmMedicationsRepository {
    #[instrument(
        name = "care.repo.medications.insert",
        skip(self, medication),
        fields(db.operation = "INSERT", medication.id = %medication.id)
    )]
    async fn insert(&self, medication: &Medication) -> anyhow::Result<()> {
        let _ = medication_active(medication)
            .insert(&self.conn)
            .await
            .context("insert medication failed")?;
        Ok(())
    }

    async fn find_owned(&self, owner: Uuid, id: Uuid) -> anyhow::Result<Option<Medication>> {
        let found = medication::Entity::find()
            .filter(medication::Column::Id.eq(id))
            .filter(medication::Column::UserId.eq(owner))
            .one(&self.conn)
            .await
            .context("find medication failed")?;
        Ok(found.map(Into::into))
    }

    async fn list_owned(&self, owner: Uuid) -> anyhow::Result<Vec<Medication>> {
        let rows = medication::Entity::find()
            .filter(medication::Column::UserId.eq(owner))
            .order_by_desc(medication::Column::CreatedAt)
            .order_by_desc(medication::Column::Id)
            .all(&self.conn)
            .await
            .context("list medications failed")?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn update(&self, medication: &Medication) -> anyhow::Result<bool> {
        let res = medication::Entity::update_many()
            .set(medication_active(medication))
            .filter(medication::Column::Id.eq(medication.id))
            .filter(medication::Column::UserId.eq(medication.user_id))
            .exec(&self.conn)
            .await
            .context("update medication failed")?;
        Ok(res.rows_affected > 0)
    }

    async fn delete_owned(&self, owner: Uuid, id: Uuid) -> anyhow::Result<bool> {
        let res = medication::Entity::delete_many()
            .filter(medication::Column::Id.eq(id))
            .filter(medication::Column::UserId.eq(owner))
            .exec(&self.conn)
            .await
            .context("delete medication failed")?;
        Ok(res.rows_affected > 0)
    }
}

// ==================== Files ====================

pub struct SeaOrmFilesRepository {
    conn: DatabaseConnection,
}

impl SeaOrmFilesRepository {
    #[must_use]
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl FilesRepository for SeaOrmFilesRepository {
    async fn insert(&self, record: &FileRecord) -> anyhow::Result<()> {
        let _ = file_active(record)
            .insert(&self.conn)
            .await
            .context("insert file record failed")?;
        Ok(())
    }

    async fn list_owned(&self, owner: Uuid) -> anyhow::Result<Vec<FileRecord>> {
        let rows = file::Entity::find()
            .filter(file::Column::UserId.eq(owner))
            .order_by_desc(file::Column::CreatedAt)
            .order_by_desc(file::Column::Id)
            .all(&self.conn)
            .await
            .context("list file records failed")?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn delete_owned(&self, owner: Uuid, id: Uuid) -> anyhow::Result<bool> {
        let res = file::Entity::delete_many()
            .filter(file::Column::Id.eq(id))
            .filter(file::Column::UserId.eq(owner))
            .exec(&self.conn)
            .await
            .context("delete file record failed")?;
        Ok(res.rows_affected > 0)
    }
}

// ==================== Family links ====================

pub struct SeaOrmFamilyLinksRepository {
    conn: DatabaseConnection,
}

impl SeaOrmFamilyLinksRepository {
    #[must_use]
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl FamilyLinksRepository for SeaOrmFamilyLinksRepository {
    async fn insert(&self, link: &FamilyLink) -> anyhow::Result<()> {
        let _ = family_link_active(link)
            .insert(&self.conn)
            .await
            .context("insert family link failed")?;
        Ok(())
    }

    async fn exists(&self, owner: Uuid, family_member_id: Uuid) -> anyhow::Result<bool> {
        let count = family_link::Entity::find()
            .filter(family_link::Column::UserId.eq(owner))
            .filter(family_link::Column::FamilyMemberId.eq(family_member_id))
            .count(&self.conn)
            .await
            .context("family link lookup failed")?;
        Ok(count > 0)
    }

    async fn list_owned(&self, owner: Uuid) -> anyhow::Result<Vec<FamilyLink>> {
        let rows = family_link::Entity::find()
            .filter(family_link::Column::UserId.eq(owner))
            .order_by_desc(family_link::Column::CreatedAt)
            .order_by_desc(family_link::Column::Id)
            .all(&self.conn)
            .await
            .context("list family links failed")?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn delete_owned(&self, owner: Uuid, id: Uuid) -> anyhow::Result<bool> {
        let res = family_link::Entity::delete_many()
            .filter(family_link::Column::Id.eq(id))
            .filter(family_link::Column::UserId.eq(owner))
            .exec(&self.conn)
            .await
            .context("delete family link failed")?;
        Ok(res.rows_affected > 0)
    }
}

// ==================== Messages ====================

pub struct SeaOrmMessagesRepository {
    conn: DatabaseConnection,
}

impl SeaOrmMessagesRepository {
    #[must_use]
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl MessagesRepository for SeaOrmMessagesRepository {
    async fn insert(&self, msg: &Message) -> anyhow::Result<()> {
        let _ = message_active(msg)
            .insert(&self.conn)
            .await
            .context("insert message failed")?;
        Ok(())
    }

    async fn list_for_user(&self, user: Uuid) -> anyhow::Result<Vec<Message>> {
        let rows = message::Entity::find()
            .filter(
                Condition::any()
                    .add(message::Column::UserId.eq(user))
                    .add(message::Column::RecipientId.eq(user)),
            )
            .order_by_desc(message::Column::CreatedAt)
            .order_by_desc(message::Column::Id)
            .all(&self.conn)
            .await
            .context("list messages failed")?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn delete_sent(&self, sender: Uuid, id: Uuid) -> anyhow::Result<bool> {
        let res = message::Entity::delete_many()
            .filter(message::Column::Id.eq(id))
            .filter(message::Column::UserId.eq(sender))
            .exec(&self.conn)
            .await
            .context("delete message failed")?;
        Ok(res.rows_affected > 0)
    }
}
