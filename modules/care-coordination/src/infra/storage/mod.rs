pub mod appointments_sea_repo;
pub mod care_plans_sea_repo;
pub mod db;
pub mod entity;
pub mod mapper;
pub mod migrations;
pub mod notifications_sea_repo;
pub mod records_sea_repo;
pub mod users_sea_repo;

pub use appointments_sea_repo::SeaOrmAppointmentsRepository;
pub use care_plans_sea_repo::SeaOrmCarePlansRepository;
pub use notifications_sea_repo::SeaOrmNotificationsRepository;
pub use records_sea_repo::{
    SeaOrmEmergencyAlertsRepository, SeaOrmFamilyLinksRepository, SeaOrmFilesRepository,
    SeaOrmMedicationsRepository, SeaOrmMessagesRepository,
};
pub use users_sea_repo::SeaOrmUsersRepository;
