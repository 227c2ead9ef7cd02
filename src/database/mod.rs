mod connection;

pub use connection::{MigrationStatus, create_pool, embedded_version, migration_status};
