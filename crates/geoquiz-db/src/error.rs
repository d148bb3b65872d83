use rusqlite::ErrorCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DbError>;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("unique constraint violation: {0}")]
    UniqueViolation(String),

    #[error("foreign key violation")]
    ForeignKeyViolation,

    #[error("record not found")]
    NotFound,

    #[error("database lock poisoned: {0}")]
    LockPoisoned(String),

    #[error("sqlite error: {0}")]
    Sqlite(rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<rusqlite::Error> for DbError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(code, msg) if code.code == ErrorCode::ConstraintViolation => {
                let msg = msg.unwrap_or_else(|| code.to_string());
                match code.extended_code {
                    rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY => Self::ForeignKeyViolation,
                    rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                    | rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY => Self::UniqueViolation(msg),
                    _ => Self::ConstraintViolation(msg),
                }
            }
            other => Self::Sqlite(other),
        }
    }
}

impl DbError {
    /// True for UNIQUE violations, e.g. a username that is already taken.
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, Self::UniqueViolation(_))
    }
}
