use serde::Serialize;
use sqlx::{PgPool, migrate::Migrator, postgres::PgPoolOptions};

use crate::{config::DatabaseConfig, error::Result};

static MIGRATOR: Migrator = sqlx::migrate!();

/// Applied schema version against the newest migration shipped in the binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MigrationStatus {
    pub applied: Option<i64>,
    pub embedded: Option<i64>,
}

impl MigrationStatus {
    pub fn is_current(&self) -> bool {
        self.applied == self.embedded
    }
}

pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.url)
        .await?;

    MIGRATOR.run(&pool).await.map_err(sqlx::Error::from)?;

    let status = migration_status(&pool).await?;
    tracing::info!(
        "Connected to database ({} max connections), schema version {:?}",
        config.max_connections,
        status.applied
    );

    Ok(pool)
}

pub fn embedded_version() -> Option<i64> {
    MIGRATOR.iter().map(|migration| migration.version).max()
}

/// Also serves as the connectivity check: a dead pool fails the query.
pub async fn migration_status(pool: &PgPool) -> Result<MigrationStatus> {
    let applied: Option<i64> =
        sqlx::query_scalar("SELECT MAX(version) FROM _sqlx_migrations WHERE success")
            .fetch_one(pool)
            .await?;

    Ok(MigrationStatus {
        applied,
        embedded: embedded_version(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_version_is_the_newest_migration_file() {
        assert_eq!(embedded_version(), Some(20250101000001));
    }

    #[test]
    fn status_is_current_only_when_versions_match() {
        let current = MigrationStatus {
            applied: embedded_version(),
            embedded: embedded_version(),
        };
        assert!(current.is_current());

        let behind = MigrationStatus {
            applied: Some(20250101000000),
            embedded: embedded_version(),
        };
        assert!(!behind.is_current());

        let fresh = MigrationStatus {
            applied: None,
            ..current
        };
        assert!(!fresh.is_current());
    }
}
