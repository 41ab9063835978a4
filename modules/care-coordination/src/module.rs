//! Composition root: wires storage, services, real-time channels and rate
//! limiting into a router and a reminder scheduler.

use std::sync::Arc;

use axum::Router;
use carelink_auth::{AuthConfig, TokenService};
use sea_orm::DatabaseConnection;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::api::rest::routes::{self, RouterDeps};
use crate::api::rest::validation::ValidationSettings;
use crate::config::{CareConfig, RateLimitBackend, RateLimitConfig, ReminderConfig};
use crate::domain::events::NotificationEvent;
use crate::domain::ports::{Clock, EventPublisher, SystemClock};
use crate::domain::service::{
    AppServices, AppointmentService, CarePlanService, EmergencyAlertService, FamilyLinkService,
    FileService, MedicationService, MessageService, NotificationService, ReminderService,
    ServiceConfig, UserService,
};
use crate::infra::ratelimit::{MemoryRateLimitStore, RateLimitStore};
use crate::infra::realtime::UserChannels;
use crate::infra::scheduler::ReminderScheduler;
use crate::infra::storage::{
    self, SeaOrmAppointmentsRepository, SeaOrmCarePlansRepository,
    SeaOrmEmergencyAlertsRepository, SeaOrmFamilyLinksRepository, SeaOrmFilesRepository,
    SeaOrmMedicationsRepository, SeaOrmMessagesRepository, SeaOrmNotificationsRepository,
    SeaOrmUsersRepository,
};

/// Settings the module is built from.
#[derive(Debug, Clone, Default)]
pub struct CareModuleConfig {
    pub auth: AuthConfig,
    pub rate_limit: RateLimitConfig,
    pub reminders: ReminderConfig,
    pub care: CareConfig,
}

pub struct CareModule {
    services: Arc<AppServices>,
    channels: UserChannels,
    tokens: Arc<TokenService>,
    auth: Arc<AuthConfig>,
    clock: Arc<dyn Clock>,
    limiter_store: Arc<dyn RateLimitStore>,
    shutdown: CancellationToken,
    cfg: CareModuleConfig,
}

impl CareModule {
    /// Apply the module's migrations to `conn`.
    ///
    /// # Errors
    /// If a migration fails.
    pub async fn migrate(conn: &DatabaseConnection) -> anyhow::Result<()> {
        storage::db::migrate(conn).await
    }

    /// # Errors
    /// If the configured rate-limit backend cannot be built.
    pub fn init(conn: &DatabaseConnection, cfg: CareModuleConfig) -> anyhow::Result<Self> {
        Self::init_with_clock(conn, cfg, Arc::new(SystemClock))
    }

    /// Like [`CareModule::init`] with an explicit clock.
    ///
    /// # Errors
    /// If the configured rate-limit backend cannot be built.
    pub fn init_with_clock(
        conn: &DatabaseConnection,
        cfg: CareModuleConfig,
        clock: Arc<dyn Clock>,
    ) -> anyhow::Result<Self> {
        info!("initializing care-coordination module");
        let store = build_rate_limit_store(&cfg.rate_limit)?;
        Ok(Self::with_rate_limit_store(conn, cfg, clock, store))
    }

    /// Build with a caller-supplied rate-limit store.
    pub fn with_rate_limit_store(
        conn: &DatabaseConnection,
        cfg: CareModuleConfig,
        clock: Arc<dyn Clock>,
        limiter_store: Arc<dyn RateLimitStore>,
    ) -> Self {
        let tokens = Arc::new(TokenService::new(&cfg.auth));
        let channels = UserChannels::default();
        let events: Arc<dyn EventPublisher<NotificationEvent>> = Arc::new(channels.clone());

        let users_repo = Arc::new(SeaOrmUsersRepository::new(conn.clone()));
        let care_plans_repo = Arc::new(SeaOrmCarePlansRepository::new(conn.clone()));

        let notifications = NotificationService::new(
            Arc::new(SeaOrmNotificationsRepository::new(conn.clone())),
            events,
            clock.clone(),
        );
        let users = UserService::new(users_repo, tokens.clone(), clock.clone());
        let service_cfg = ServiceConfig {
            max_tasks_per_plan: cfg.care.max_tasks_per_plan,
        };

        let services = AppServices {
            care_plans: CarePlanService::new(
                care_plans_repo.clone(),
                notifications.clone(),
                clock.clone(),
                service_cfg,
            ),
            appointments: AppointmentService::new(
                Arc::new(SeaOrmAppointmentsRepository::new(conn.clone())),
                clock.clone(),
            ),
            alerts: EmergencyAlertService::new(
                Arc::new(SeaOrmEmergencyAlertsRepository::new(conn.clone())),
                clock.clone(),
            ),
            medications: MedicationService::new(
                Arc::new(SeaOrmMedicationsRepository::new(conn.clone())),
                clock.clone(),
            ),
            files: FileService::new(
                Arc::new(SeaOrmFilesRepository::new(conn.clone())),
                care_plans_repo.clone(),
                clock.clone(),
            ),
            family_links: FamilyLinkService::new(
                Arc::new(SeaOrmFamilyLinksRepository::new(conn.clone())),
                users.clone(),
                clock.clone(),
            ),
            messages: MessageService::new(
                Arc::new(SeaOrmMessagesRepository::new(conn.clone())),
                users.clone(),
                clock.clone(),
            ),
            reminders: ReminderService::new(care_plans_repo, notifications.clone()),
            notifications,
            users,
        };

        info!("care-coordination module initialized");
        Self {
            services: Arc::new(services),
            channels,
            tokens,
            auth: Arc::new(cfg.auth.clone()),
            clock,
            limiter_store,
            shutdown: CancellationToken::new(),
            cfg,
        }
    }

    /// Tie open real-time streams to `token`: they end once it is cancelled,
    /// so a graceful shutdown is not held up by connected clients.
    #[must_use]
    pub fn with_shutdown(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    #[must_use]
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    #[must_use]
    pub fn services(&self) -> Arc<AppServices> {
        self.services.clone()
    }

    #[must_use]
    pub fn channels(&self) -> UserChannels {
        self.channels.clone()
    }

    #[must_use]
    pub fn tokens(&self) -> Arc<TokenService> {
        self.tokens.clone()
    }

    /// The full `/api` router.
    pub fn router(&self) -> Router {
        routes::router(RouterDeps {
            services: self.services.clone(),
            auth: self.auth.clone(),
            tokens: self.tokens.clone(),
            channels: self.channels.clone(),
            validation: ValidationSettings {
                clock: self.clock.clone(),
                max_tasks_per_plan: self.cfg.care.max_tasks_per_plan,
            },
            limiter: routes::rate_limiter(self.limiter_store.clone(), &self.cfg.rate_limit),
            shutdown: self.shutdown.clone(),
        })
    }

    /// The daily reminder loop, or `None` when reminders are disabled.
    ///
    /// # Errors
    /// If the configured trigger time is out of range.
    pub fn reminder_scheduler(&self) -> anyhow::Result<Option<ReminderScheduler>> {
        let cfg = &self.cfg.reminders;
        if !cfg.enabled {
            info!("reminder scheduler disabled");
            return Ok(None);
        }
        let at = cfg.run_at().map_err(|e| {
            anyhow::anyhow!(
                "invalid reminder time {:02}:{:02}: {e}",
                cfg.hour,
                cfg.minute
            )
        })?;
        Ok(Some(ReminderScheduler::new(
            self.services.reminders.clone(),
            self.clock.clone(),
            at,
            cfg.run_on_startup,
        )))
    }
}

fn build_rate_limit_store(cfg: &RateLimitConfig) -> anyhow::Result<Arc<dyn RateLimitStore>> {
    match cfg.backend {
        RateLimitBackend::Memory => {
            info!("rate limiting with in-memory counters");
            Ok(Arc::new(MemoryRateLimitStore::new()))
        }
        #[cfg(feature = "redis")]
        RateLimitBackend::Redis => {
            let url = cfg.redis_url.as_deref().ok_or_else(|| {
                anyhow::anyhow!("rate_limit.redis_url is required for the redis backend")
            })?;
            let store = crate::infra::ratelimit::RedisRateLimitStore::new(url, "carelink")?;
            info!("rate limiting with redis counters");
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "redis"))]
        RateLimitBackend::Redis => {
            anyhow::bail!("rate_limit.backend = redis requires the `redis` feature")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_backend_is_default() {
        assert!(build_rate_limit_store(&RateLimitConfig::default()).is_ok());
    }

    #[cfg(not(feature = "redis"))]
    #[test]
    fn redis_backend_needs_feature() {
        let cfg = RateLimitConfig {
            backend: RateLimitBackend::Redis,
            redis_url: Some("redis://127.0.0.1".to_owned()),
            ..RateLimitConfig::default()
        };
        let err = build_rate_limit_store(&cfg).err().unwrap();
        assert!(err.to_string().contains("redis"));
    }
}
