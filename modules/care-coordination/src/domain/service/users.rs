use std::sync::Arc;

use carelink_auth::{TokenService, password};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::domain::error::{DomainError, db_err};
use crate::domain::model::{DEFAULT_LANGUAGE, NewUser, User, UserPatch};
use crate::domain::ports::Clock;
use crate::domain::repo::UsersRepository;

/// A freshly authenticated user and the session token to hand back.
#[derive(Debug, Clone)]
pub struct Session {
    pub user: User,
    pub token: String,
}

#[derive(Clone)]
pub struct UserService {
    repo: Arc<dyn UsersRepository>,
    tokens: Arc<TokenService>,
    clock: Arc<dyn Clock>,
}

/// Argon2 is deliberately slow; keep it off the async workers.
async fn hash_off_thread(plain: String) -> Result<String, DomainError> {
    tokio::task::spawn_blocking(move || password::hash_password(&plain))
        .await
        .map_err(|e| DomainError::internal(format!("password hashing task failed: {e}")))?
        .map_err(DomainError::from)
}

async fn verify_off_thread(plain: String, stored: String) -> Result<bool, DomainError> {
    tokio::task::spawn_blocking(move || password::verify_password(&plain, &stored))
        .await
        .map_err(|e| DomainError::internal(format!("password verify task failed: {e}")))
}

impl UserService {
    pub fn new(
        repo: Arc<dyn UsersRepository>,
        tokens: Arc<TokenService>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repo,
            tokens,
            clock,
        }
    }

    #[instrument(skip(self, new_user), fields(role = %new_user.role))]
    pub async fn register(&self, new_user: NewUser) -> Result<Session, DomainError> {
        let email = new_user.email.trim().to_lowercase();
        if self.repo.email_exists(&email).await.map_err(db_err)? {
            debug!("registration rejected: email taken");
            return Err(DomainError::conflict("User with this email already exists"));
        }

        let password_hash = hash_off_thread(new_user.password).await?;
        let now = self.clock.now();
        let user = User {
            id: Uuid::now_v7(),
            name: new_user.name,
            email,
            password_hash,
            role: new_user.role,
            contact: new_user.contact,
            language_preference: new_user
                .language_preference
                .unwrap_or_else(|| DEFAULT_LANGUAGE.to_owned()),
            created_at: now,
            updated_at: now,
        };

        // A concurrent registration can still win the race; the unique index catches it.
        if let Err(e) = self.repo.insert(user.clone()).await {
            if self.repo.email_exists(&user.email).await.unwrap_or(false) {
                return Err(DomainError::conflict("User with this email already exists"));
            }
            return Err(db_err(e));
        }

        let token = self.tokens.issue(user.id, user.role)?;
        info!(user_id = %user.id, "user registered");
        Ok(Session { user, token })
    }

    #[instrument(skip(self, email, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, DomainError> {
        let email = email.trim().to_lowercase();
        let Some(user) = self.repo.find_by_email(&email).await.map_err(db_err)? else {
            debug!("login rejected: unknown email");
            return Err(DomainError::InvalidCredentials);
        };

        if !verify_off_thread(password.to_owned(), user.password_hash.clone()).await? {
            warn!(user_id = %user.id, "login rejected: wrong password");
            return Err(DomainError::InvalidCredentials);
        }

        let token = self.tokens.issue(user.id, user.role)?;
        info!(user_id = %user.id, "user logged in");
        Ok(Session { user, token })
    }

    #[instrument(skip(self), fields(user_id = %id))]
    pub async fn get(&self, id: Uuid) -> Result<User, DomainError> {
        self.repo
            .find_by_id(id)
            .await
            .map_err(db_err)?
            .ok_or_else(|| DomainError::not_found("User", id))
    }

    #[instrument(skip(self, patch), fields(user_id = %id))]
    pub async fn update_profile(&self, id: Uuid, patch: UserPatch) -> Result<User, DomainError> {
        let mut user = self.get(id).await?;
        if let Some(name) = patch.name {
            user.name = name;
        }
        if let Some(contact) = patch.contact {
            user.contact = Some(contact);
        }
        if let Some(language) = patch.language_preference {
            user.language_preference = language;
        }
        user.updated_at = self.clock.now();

        if !self.repo.update_profile(&user).await.map_err(db_err)? {
            return Err(DomainError::not_found("User", id));
        }
        Ok(user)
    }

    /// Everyone who can be assigned a task.
    pub async fn directory(&self) -> Result<Vec<User>, DomainError> {
        self.repo.list().await.map_err(db_err)
    }

    /// Existence check used by services that reference other users.
    pub(crate) async fn ensure_exists(&self, id: Uuid) -> Result<(), DomainError> {
        self.get(id).await.map(|_| ())
    }
}
