/// Error type for connection management and migrations
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    /// Connection failed after retries
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Migration error: {0}")]
    MigrationError(String),
}

pub type DatabaseResult<T> = Result<T, DatabaseError>;
