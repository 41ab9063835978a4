//! Domain services: the business rules behind every REST operation and the
//! reminder scan. Each service depends only on repository ports, the event
//! publisher and the clock.

mod appointments;
mod care_plans;
mod notifications;
mod records;
mod reminders;
mod users;

pub use appointments::AppointmentService;
pub(crate) use appointments::PAST_DATE_MESSAGE;
pub use care_plans::CarePlanService;
pub use notifications::NotificationService;
pub use records::{
    EmergencyAlertService, FamilyLinkService, FileService, MedicationService, MessageService,
};
pub use reminders::{ReminderService, reminder_window};
pub use users::{Session, UserService};

/// Tunables for the domain rules.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub max_tasks_per_plan: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            max_tasks_per_plan: 50,
        }
    }
}

/// Every service the REST layer and the scheduler need, wired once at startup.
#[derive(Clone)]
pub struct AppServices {
    pub users: UserService,
    pub care_plans: CarePlanService,
    pub appointments: AppointmentService,
    pub notifications: NotificationService,
    pub alerts: EmergencyAlertService,
    pub medications: MedicationService,
    pub files: FileService,
    pub family_links: FamilyLinkService,
    pub messages: MessageService,
    pub reminders: ReminderService,
}
