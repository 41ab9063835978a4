use std::sync::Arc;

use time::OffsetDateTime;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::domain::error::{DomainError, db_err};
use crate::domain::model::{Appointment, AppointmentPatch, NewAppointment};
use crate::domain::ports::Clock;
use crate::domain::repo::AppointmentsRepository;

pub(crate) const PAST_DATE_MESSAGE: &str = "Appointment date cannot be in the past";

#[derive(Clone)]
pub struct AppointmentService {
    repo: Arc<dyn AppointmentsRepository>,
    clock: Arc<dyn Clock>,
}

impl AppointmentService {
    pub fn new(repo: Arc<dyn AppointmentsRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { repo, clock }
    }

    fn ensure_not_past(&self, date: OffsetDateTime) -> Result<(), DomainError> {
        if date < self.clock.now() {
            return Err(DomainError::validation(PAST_DATE_MESSAGE));
        }
        Ok(())
    }

    #[instrument(skip(self, new), fields(owner = %owner))]
    pub async fn create(
        &self,
        owner: Uuid,
        new: NewAppointment,
    ) -> Result<Appointment, DomainError> {
        self.ensure_not_past(new.date)?;
        let now = self.clock.now();
        let appointment = Appointment {
            id: Uuid::now_v7(),
            user_id: owner,
            doctor_name: new.doctor_name,
            location: new.location,
            time: new.time,
            date: new.date,
            status: new.status,
            created_at: now,
            updated_at: now,
        };
        self.repo.insert(&appointment).await.map_err(db_err)?;
        info!(appointment_id = %appointment.id, "appointment scheduled");
        Ok(appointment)
    }

    pub async fn get(&self, owner: Uuid, id: Uuid) -> Result<Appointment, DomainError> {
        self.repo
            .find_owned(owner, id)
            .await
            .map_err(db_err)?
            .ok_or_else(|| DomainError::not_found("Appointment", id))
    }

    pub async fn list(&self, owner: Uuid) -> Result<Vec<Appointment>, DomainError> {
        self.repo.list_owned(owner).await.map_err(db_err)
    }

    #[instrument(skip(self, patch), fields(owner = %owner, appointment_id = %id))]
    pub async fn update(
        &self,
        owner: Uuid,
        id: Uuid,
        patch: AppointmentPatch,
    ) -> Result<Appointment, DomainError> {
        let mut appointment = self.get(owner, id).await?;
        if let Some(date) = patch.date {
            self.ensure_not_past(date)?;
            appointment.date = date;
        }
        if let Some(doctor_name) = patch.doctor_name {
            appointment.doctor_name = doctor_name;
        }
        if let Some(location) = patch.location {
            appointment.location = location;
        }
        if let Some(time) = patch.time {
            appointment.time = time;
        }
        if let Some(status) = patch.status {
            appointment.status = status;
        }
        appointment.updated_at = self.clock.now();

        if !self.repo.update(&appointment).await.map_err(db_err)? {
            return Err(DomainError::not_found("Appointment", id));
        }
        Ok(appointment)
    }

    #[instrument(skip(self), fields(owner = %owner, appointment_id = %id))]
    pub async fn delete(&self, owner: Uuid, id: Uuid) -> Result<(), DomainError> {
        if !self.repo.delete_owned(owner, id).await.map_err(db_err)? {
            return Err(DomainError::not_found("Appointment", id));
        }
        Ok(())
    }
}
