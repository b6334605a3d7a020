use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("stored document is malformed: {0}")]
    Document(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("invalid input: {0}")]
    Invalid(String),

    #[error("database lock poisoned")]
    LockPoisoned,
}

pub type AppResult<T> = Result<T, AppError>;

// Commands hand plain strings to the frontend.
impl From<AppError> for String {
    fn from(err: AppError) -> Self {
        err.to_string()
    }
}
