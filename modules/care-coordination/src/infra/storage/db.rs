use std::time::Duration;

use anyhow::Context;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use tracing::{debug, info};

use crate::infra::storage::migrations::Migrator;

/// `sqlite::memory:` and friends live inside a single connection.
fn is_in_memory(dsn: &str) -> bool {
    dsn.contains(":memory:") || dsn.contains("mode=memory")
}

/// Open a pooled connection for `dsn`.
///
/// In-memory SQLite is pinned to one long-lived connection, otherwise each pooled
/// connection would see its own empty database.
pub async fn connect(dsn: &str, max_connections: u32) -> anyhow::Result<DatabaseConnection> {
    let mut opts = ConnectOptions::new(dsn.to_owned());
    opts.sqlx_logging(false);
    if is_in_memory(dsn) {
        opts.max_connections(1)
            .min_connections(1)
            .max_lifetime(Duration::from_secs(u64::from(u32::MAX)));
    } else {
        opts.max_connections(max_connections.max(1));
    }

    debug!(in_memory = is_in_memory(dsn), "connecting to database");
    Database::connect(opts)
        .await
        .with_context(|| format!("failed to connect to database '{}'", redact(dsn)))
}

/// Apply all pending migrations.
pub async fn migrate(conn: &DatabaseConnection) -> anyhow::Result<()> {
    Migrator::up(conn, None)
        .await
        .context("failed to apply care-coordination migrations")?;
    info!("care-coordination migrations applied");
    Ok(())
}

/// Strip credentials from a DSN before it reaches a log line or error.
fn redact(dsn: &str) -> String {
    match (dsn.find("://"), dsn.rfind('@')) {
        (Some(scheme), Some(at)) if at > scheme => {
            format!("{}://***{}", &dsn[..scheme], &dsn[at..])
        }
        _ => dsn.to_owned(),
    }
}
