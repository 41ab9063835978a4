//! Services for the simple per-user records: emergency alerts, medications,
//! file metadata, family links and messages.

use std::sync::Arc;

use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::domain::error::{DomainError, db_err};
use crate::domain::model::{
    EmergencyAlert, FamilyLink, FileRecord, Medication, MedicationDraft, Message,
    NewEmergencyAlert, NewFamilyLink, NewFileRecord, NewMessage,
};
use crate::domain::ports::Clock;
use crate::domain::repo::{
    CarePlansRepository, EmergencyAlertsRepository, FamilyLinksRepository, FilesRepository,
    MedicationsRepository, MessagesRepository,
};
use crate::domain::service::UserService;

// ==================== Emergency alerts ====================

#[derive(Clone)]
pub struct EmergencyAlertService {
    repo: Arc<dyn EmergencyAlertsRepository>,
    clock: Arc<dyn Clock>,
}

impl EmergencyAlertService {
    pub fn new(repo: Arc<dyn EmergencyAlertsRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { repo, clock }
    }

    #[instrument(skip(self, new), fields(owner = %owner, severity = %new.severity))]
    pub async fn raise(
        &self,
        owner: Uuid,
        new: NewEmergencyAlert,
    ) -> Result<EmergencyAlert, DomainError> {
        let alert = EmergencyAlert {
            id: Uuid::now_v7(),
            user_id: owner,
            message: new.message,
            location: new.location,
            severity: new.severity,
            resolved: false,
            created_at: self.clock.now(),
            resolved_at: None,
        };
        self.repo.insert(&alert).await.map_err(db_err)?;
        warn!(alert_id = %alert.id, severity = %alert.severity, "emergency alert raised");
        Ok(alert)
    }

    pub async fn list(&self, owner: Uuid) -> Result<Vec<EmergencyAlert>, DomainError> {
        self.repo.list_owned(owner).await.map_err(db_err)
    }

    /// Resolving an already resolved alert keeps its original `resolved_at`.
    #[instrument(skip(self), fields(owner = %owner, alert_id = %id))]
    pub async fn resolve(&self, owner: Uuid, id: Uuid) -> Result<EmergencyAlert, DomainError> {
        let mut alert = self
            .repo
            .find_owned(owner, id)
            .await
            .map_err(db_err)?
            .ok_or_else(|| DomainError::not_found("Emergency alert", id))?;
        if alert.resolved {
            return Ok(alert);
        }

        let now = self.clock.now();
        if !self.repo.mark_resolved(owner, id, now).await.map_err(db_err)? {
            return Err(DomainError::not_found("Emergency alert", id));
        }
        alert.resolved = true;
        alert.resolved_at = Some(now);
        info!("emergency alert resolved");
        Ok(alert)
    }

    pub async fn delete(&self, owner: Uuid, id: Uuid) -> Result<(), DomainError> {
        if !self.repo.delete_owned(owner, id).await.map_err(db_err)? {
            return Err(DomainError::not_found("Emergency alert", id));
        }
        Ok(())
    }
}

// ==================== Medications ====================

#[derive(Clone)]
pub struct MedicationService {
    repo: Arc<dyn MedicationsRepository>,
    clock: Arc<dyn Clock>,
}

fn check_medication_dates(draft: &MedicationDraft) -> Result<(), DomainError> {
    match draft.end_date {
        Some(end) if end < draft.start_date => Err(DomainError::validation(
            "End date must be on or after start date",
        )),
        _ => Ok(()),
    }
}

impl MedicationService {
    pub fn new(repo: Arc<dyn MedicationsRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { repo, clock }
    }

    #[instrument(skip(self, draft), fields(owner = %owner))]
    pub async fn create(
        &self,
        owner: Uuid,
        draft: MedicationDraft,
    ) -> Result<Medication, DomainError> {
        check_medication_dates(&draft)?;
        let now = self.clock.now();
        let medication = Medication {
            id: Uuid::now_v7(),
            user_id: owner,
            name: draft.name,
            dosage: draft.dosage,
            frequency: draft.frequency,
            start_date: draft.start_date,
            end_date: draft.end_date,
            notes: draft.notes,
            created_at: now,
            updated_at: now,
        };
        self.repo.insert(&medication).await.map_err(db_err)?;
        Ok(medication)
    }

    pub async fn get(&self, owner: Uuid, id: Uuid) -> Result<Medication, DomainError> {
        self.repo
            .find_owned(owner, id)
            .await
            .map_err(db_err)?
            .ok_or_else(|| DomainError::not_found("Medication", id))
    }

    pub async fn list(&self, owner: Uuid) -> Result<Vec<Medication>, DomainError> {
        self.repo.list_owned(owner).await.map_err(db_err)
    }

    #[instrument(skip(self, draft), fields(owner = %owner, medication_id = %id))]
    pub async fn update(
        &self,
        owner: Uuid,
        id: Uuid,
        draft: MedicationDraft,
    ) -> Result<Medication, DomainError> {
        check_medication_dates(&draft)?;
        let current = self.get(owner, id).await?;
        let medication = Medication {
            id,
            user_id: owner,
            name: draft.name,
            dosage: draft.dosage,
            frequency: draft.frequency,
            start_date: draft.start_date,
            end_date: draft.end_date,
            notes: draft.notes,
            created_at: current.created_at,
            updated_at: self.clock.now(),
        };
        if !self.repo.update(&medication).await.map_err(db_err)? {
            return Err(DomainError::not_found("Medication", id));
        }
        Ok(medication)
    }

    pub async fn delete(&self, owner: Uuid, id: Uuid) -> Result<(), DomainError> {
        if !self.repo.delete_owned(owner, id).await.map_err(db_err)? {
            return Err(DomainError::not_found("Medication", id));
        }
        Ok(())
    }
}

// ==================== Files ====================

#[derive(Clone)]
pub struct FileService {
    repo: Arc<dyn FilesRepository>,
    care_plans: Arc<dyn CarePlansRepository>,
    clock: Arc<dyn Clock>,
}

impl FileService {
    pub fn new(
        repo: Arc<dyn FilesRepository>,
        care_plans: Arc<dyn CarePlansRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repo,
            care_plans,
            clock,
        }
    }

    /// Attach metadata for a file hosted elsewhere. A referenced care plan must be
    /// one of the caller's own.
    #[instrument(skip(self, new), fields(owner = %owner))]
    pub async fn register(
        &self,
        owner: Uuid,
        new: NewFileRecord,
    ) -> Result<FileRecord, DomainError> {
        if let Some(plan_id) = new.care_plan_id {
            let owned = self
                .care_plans
                .find_owned(owner, plan_id)
                .await
                .map_err(db_err)?
                .is_some();
            if !owned {
                return Err(DomainError::not_found("Care plan", plan_id));
            }
        }

        let record = FileRecord {
            id: Uuid::now_v7(),
            user_id: owner,
            care_plan_id: new.care_plan_id,
            file_name: new.file_name,
            url: new.url,
            mime_type: new.mime_type,
            size_bytes: new.size_bytes,
            created_at: self.clock.now(),
        };
        self.repo.insert(&record).await.map_err(db_err)?;
        Ok(record)
    }

    pub async fn list(&self, owner: Uuid) -> Result<Vec<FileRecord>, DomainError> {
        self.repo.list_owned(owner).await.map_err(db_err)
    }

    pub async fn delete(&self, owner: Uuid, id: Uuid) -> Result<(), DomainError> {
        if !self.repo.delete_owned(owner, id).await.map_err(db_err)? {
            return Err(DomainError::not_found("File", id));
        }
        Ok(())
    }
}

// ==================== Family links ====================

#[derive(Clone)]
pub struct FamilyLinkService {
    repo: Arc<dyn FamilyLinksRepository>,
    users: UserService,
    clock: Arc<dyn Clock>,
}

impl FamilyLinkService {
    pub fn new(
        repo: Arc<dyn FamilyLinksRepository>,
        users: UserService,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { repo, users, clock }
    }

    #[instrument(skip(self, new), fields(owner = %owner, member = %new.family_member_id))]
    pub async fn link(&self, owner: Uuid, new: NewFamilyLink) -> Result<FamilyLink, DomainError> {
        if new.family_member_id == owner {
            return Err(DomainError::validation("You cannot link yourself"));
        }
        self.users.ensure_exists(new.family_member_id).await?;
        if self
            .repo
            .exists(owner, new.family_member_id)
            .await
            .map_err(db_err)?
        {
            return Err(DomainError::conflict("Family link already exists"));
        }

        let link = FamilyLink {
            id: Uuid::now_v7(),
            user_id: owner,
            family_member_id: new.family_member_id,
            relationship: new.relationship,
            created_at: self.clock.now(),
        };
        self.repo.insert(&link).await.map_err(db_err)?;
        Ok(link)
    }

    pub async fn list(&self, owner: Uuid) -> Result<Vec<FamilyLink>, DomainError> {
        self.repo.list_owned(owner).await.map_err(db_err)
    }

    pub async fn delete(&self, owner: Uuid, id: Uuid) -> Result<(), DomainError> {
        if !self.repo.delete_owned(owner, id).await.map_err(db_err)? {
            return Err(DomainError::not_found("Family link", id));
        }
        Ok(())
    }
}

// ==================== Messages ====================

#[derive(Clone)]
pub struct MessageService {
    repo: Arc<dyn MessagesRepository>,
    users: UserService,
    clock: Arc<dyn Clock>,
}

impl MessageService {
    pub fn new(
        repo: Arc<dyn MessagesRepository>,
        users: UserService,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { repo, users, clock }
    }

    #[instrument(skip(self, new), fields(sender = %sender, recipient = %new.recipient_id))]
    pub async fn send(&self, sender: Uuid, new: NewMessage) -> Result<Message, DomainError> {
        if new.recipient_id == sender {
            return Err(DomainError::validation("You cannot message yourself"));
        }
        self.users.ensure_exists(new.recipient_id).await?;

        let message = Message {
            id: Uuid::now_v7(),
            user_id: sender,
            recipient_id: new.recipient_id,
            content: new.content,
            created_at: self.clock.now(),
        };
        self.repo.insert(&message).await.map_err(db_err)?;
        Ok(message)
    }

    pub async fn list(&self, user: Uuid) -> Result<Vec<Message>, DomainError> {
        self.repo.list_for_user(user).await.map_err(db_err)
    }

    pub async fn delete(&self, sender: Uuid, id: Uuid) -> Result<(), DomainError> {
        if !self.repo.delete_sent(sender, id).await.map_err(db_err)? {
            return Err(DomainError::not_found("Message", id));
        }
        Ok(())
    }
}
