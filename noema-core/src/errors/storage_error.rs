/// Storage-layer errors for SQLite operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("SQLite error: {message}")]
    Sqlite { message: String },

    #[error("migration failed at version {version}: {reason}")]
    MigrationFailed { version: u32, reason: String },

    #[error("no row in {table} with id {id}")]
    RowNotFound { table: String, id: String },

    #[error("connection lock poisoned: {message}")]
    PoolPoisoned { message: String },

    #[error("column serialization failed: {message}")]
    Serialization { message: String },
}
