//! SeaORM-backed appointments repository.

use anyhow::Context;
use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};
use tracing::instrument;
use uuid::Uuid;

use crate::domain::model::Appointment;
use crate::domain::repo::AppointmentsRepository;
use crate::infra::storage::entity::appointment::{Column, Entity as AppointmentEntity};
use crate::infra::storage::mapper::appointment_active;

pub struct SeaOrmAppointmentsRepository {
    conn: DatabaseConnection,
}

impl SeaOrmAppointmentsRepository {
    #[must_use]
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl AppointmentsRepository for SeaOrmAppointmentsRepository {
    #[instrument(
        name = "care.repo.appointments.insert",
        skip(self, appointment),
        fields(db.operation = "INSERT", appointment.id = %appointment.id)
    )]
    async fn insert(&self, appointment: &Appointment) -> anyhow::Result<()> {
        let _ = appointment_active(appointment)
            .insert(&self.conn)
            .await
            .context("insert appointment failed")?;
        Ok(())
    }

    async fn find_owned(&self, owner: Uuid, id: Uuid) -> anyhow::Result<Option<Appointment>> {
        AppointmentEntity::find()
            .filter(Column::Id.eq(id))
            .filter(Column::UserId.eq(owner))
            .one(&self.conn)
            .await
            .context("find appointment failed")?
            .map(Appointment::try_from)
            .transpose()
    }

    async fn list_owned(&self, owner: Uuid) -> anyhow::Result<Vec<Appointment>> {
        AppointmentEntity::find()
            .filter(Column::UserId.eq(owner))
            .order_by_asc(Column::Date)
            .order_by_asc(Column::Time)
            .all(&self.conn)
            .await
            .context("list appointments failed")?
            .into_iter()
            .map(Appointment::try_from)
            .collect()
    }

    #[instrument(
        name = "care.repo.appointments.update",
        skip(self, appointment),
        fields(db.operation = "UPDATE", appointment.id = %appointment.id)
    )]
    async fn update(&self, appointment: &Appointment) -> anyhow::Result<bool> {
        let res = AppointmentEntity::update_many()
            .set(appointment_active(appointment))
            .filter(Column::Id.eq(appointment.id))
            .filter(Column::UserId.eq(appointment.user_id))
            .exec(&self.conn)
            .await
            .context("update appointment failed")?;
        Ok(res.rows_affected > 0)
    }

    async fn delete_owned(&self, owner: Uuid, id: Uuid) -> anyhow::Result<bool> {
        let res = AppointmentEntity::delete_many()
            .filter(Column::Id.eq(id))
            .filter(Column::UserId.eq(owner))
            .exec(&self.conn)
            .await
            .context("delete appointment failed")?;
        Ok(res.rows_affected > 0)
    }
}
