use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::ConnectionTrait;

/// Users, care plans with their tasks, appointments and notifications.
#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();
        let conn = manager.get_connection();

        let sql = match backend {
            sea_orm::DatabaseBackend::Postgres => {
                r"
CREATE TABLE IF NOT EXISTS users (
    id UUID PRIMARY KEY NOT NULL,
    name VARCHAR(50) NOT NULL,
    email VARCHAR(255) NOT NULL,
    password_hash VARCHAR(255) NOT NULL,
    role VARCHAR(32) NOT NULL,
    contact VARCHAR(30),
    language_preference VARCHAR(10) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL
);
CREATE UNIQUE INDEX IF NOT EXISTS idx_users_email ON users(email);

CREATE TABLE IF NOT EXISTS care_plans (
    id UUID PRIMARY KEY NOT NULL,
    user_id UUID NOT NULL,
    title VARCHAR(100) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_care_plans_user ON care_plans(user_id, created_at);

CREATE TABLE IF NOT EXISTS care_plan_tasks (
    id UUID PRIMARY KEY NOT NULL,
    care_plan_id UUID NOT NULL REFERENCES care_plans(id),
    position INTEGER NOT NULL,
    task_name VARCHAR(200) NOT NULL,
    assigned_to UUID NOT NULL,
    status VARCHAR(16) NOT NULL,
    due_date TIMESTAMPTZ NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_care_plan_tasks_plan ON care_plan_tasks(care_plan_id, position);
CREATE INDEX IF NOT EXISTS idx_care_plan_tasks_assignee ON care_plan_tasks(assigned_to);
CREATE INDEX IF NOT EXISTS idx_care_plan_tasks_due ON care_plan_tasks(due_date);

CREATE TABLE IF NOT EXISTS appointments (
    id UUID PRIMARY KEY NOT NULL,
    user_id UUID NOT NULL,
    doctor_name VARCHAR(100) NOT NULL,
    location VARCHAR(200) NOT NULL,
    time VARCHAR(5) NOT NULL,
    date TIMESTAMPTZ NOT NULL,
    status VARCHAR(16) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_appointments_user ON appointments(user_id, date);

CREATE TABLE IF NOT EXISTS notifications (
    id UUID PRIMARY KEY NOT NULL,
    user_id UUID NOT NULL,
    message VARCHAR(500) NOT NULL,
    kind VARCHAR(32) NOT NULL,
    care_plan_id UUID,
    task_id UUID,
    read BOOLEAN NOT NULL DEFAULT FALSE,
    created_at TIMESTAMPTZ NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_notifications_user ON notifications(user_id, created_at);
                "
            }
            sea_orm::DatabaseBackend::MySql => {
                r"
CREATE TABLE IF NOT EXISTS users (
    id VARCHAR(36) PRIMARY KEY NOT NULL,
    name VARCHAR(50) NOT NULL,
    email VARCHAR(255) NOT NULL,
    password_hash VARCHAR(255) NOT NULL,
    role VARCHAR(32) NOT NULL,
    contact VARCHAR(30),
    language_preference VARCHAR(10) NOT NULL,
    created_at TIMESTAMP NOT NULL,
    updated_at TIMESTAMP NOT NULL,
    UNIQUE KEY idx_users_email (email)
);

CREATE TABLE IF NOT EXISTS care_plans (
    id VARCHAR(36) PRIMARY KEY NOT NULL,
    user_id VARCHAR(36) NOT NULL,
    title VARCHAR(100) NOT NULL,
    created_at TIMESTAMP NOT NULL,
    updated_at TIMESTAMP NOT NULL,
    KEY idx_care_plans_user (user_id, created_at)
);

CREATE TABLE IF NOT EXISTS care_plan_tasks (
    id VARCHAR(36) PRIMARY KEY NOT NULL,
    care_plan_id VARCHAR(36) NOT NULL,
    position INT NOT NULL,
    task_name VARCHAR(200) NOT NULL,
    assigned_to VARCHAR(36) NOT NULL,
    status VARCHAR(16) NOT NULL,
    due_date TIMESTAMP NOT NULL,
    KEY idx_care_plan_tasks_plan (care_plan_id, position),
    KEY idx_care_plan_tasks_assignee (assigned_to),
    KEY idx_care_plan_tasks_due (due_date),
    FOREIGN KEY (care_plan_id) REFERENCES care_plans(id)
);

CREATE TABLE IF NOT EXISTS appointments (
    id VARCHAR(36) PRIMARY KEY NOT NULL,
    user_id VARCHAR(36) NOT NULL,
    doctor_name VARCHAR(100) NOT NULL,
    location VARCHAR(200) NOT NULL,
    `time` VARCHAR(5) NOT NULL,
    `date` TIMESTAMP NOT NULL,
    status VARCHAR(16) NOT NULL,
    created_at TIMESTAMP NOT NULL,
    updated_at TIMESTAMP NOT NULL,
    KEY idx_appointments_user (user_id, `date`)
);

CREATE TABLE IF NOT EXISTS notifications (
    id VARCHAR(36) PRIMARY KEY NOT NULL,
    user_id VARCHAR(36) NOT NULL,
    message VARCHAR(500) NOT NULL,
    kind VARCHAR(32) NOT NULL,
    care_plan_id VARCHAR(36),
    task_id VARCHAR(36),
    `read` BOOLEAN NOT NULL DEFAULT FALSE,
    created_at TIMESTAMP NOT NULL,
    KEY idx_notifications_user (user_id, created_at)
);
                "
            }
            sea_orm::DatabaseBackend::Sqlite => {
                r"
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY NOT NULL,
    name TEXT NOT NULL,
    email TEXT NOT NULL,
    password_hash TEXT NOT NULL,
    role TEXT NOT NULL,
    contact TEXT,
    language_preference TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
CREATE UNIQUE INDEX IF NOT EXISTS idx_users_email ON users(email);

CREATE TABLE IF NOT EXISTS care_plans (
    id TEXT PRIMARY KEY NOT NULL,
    user_id TEXT NOT NULL,
    title TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_care_plans_user ON care_plans(user_id, created_at);

CREATE TABLE IF NOT EXISTS care_plan_tasks (
    id TEXT PRIMARY KEY NOT NULL,
    care_plan_id TEXT NOT NULL REFERENCES care_plans(id),
    position INTEGER NOT NULL,
    task_name TEXT NOT NULL,
    assigned_to TEXT NOT NULL,
    status TEXT NOT NULL,
    due_date TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_care_plan_tasks_plan ON care_plan_tasks(care_plan_id, position);
CREATE INDEX IF NOT EXISTS idx_care_plan_tasks_assignee ON care_plan_tasks(assigned_to);
CREATE INDEX IF NOT EXISTS idx_care_plan_tasks_due ON care_plan_tasks(due_date);

CREATE TABLE IF NOT EXISTS appointments (
    id TEXT PRIMARY KEY NOT NULL,
    user_id TEXT NOT NULL,
    doctor_name TEXT NOT NULL,
    location TEXT NOT NULL,
    time TEXT NOT NULL,
    date TEXT NOT NULL,
    status TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_appointments_user ON appointments(user_id, date);

CREATE TABLE IF NOT EXISTS notifications (
    id TEXT PRIMARY KEY NOT NULL,
    user_id TEXT NOT NULL,
    message TEXT NOT NULL,
    kind TEXT NOT NULL,
    care_plan_id TEXT,
    task_id TEXT,
    read INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_notifications_user ON notifications(user_id, created_at);
                "
            }
        };

        conn.execute_unprepared(sql).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let conn = manager.get_connection();
        conn.execute_unprepared(
            "DROP TABLE IF EXISTS notifications;
DROP TABLE IF EXISTS appointments;
DROP TABLE IF EXISTS care_plan_tasks;
DROP TABLE IF EXISTS care_plans;
DROP TABLE IF EXISTS users;",
        )
        .await?;
        Ok(())
    }
}
