pub mod appointment;
pub mod care_plan;
pub mod care_plan_task;
pub mod emergency_alert;
pub mod family_link;
pub mod file;
pub mod medication;
pub mod message;
pub mod notification;
pub mod user;
