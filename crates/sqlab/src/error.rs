use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("failed to open database: {path}: {source}")]
    DbOpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Engine-side failure. The message is the driver's, passed through untranslated.
    #[error("Database error: {0}")]
    SqlError(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<rusqlite::Error> for AppError {
    fn from(e: rusqlite::Error) -> Self {
        AppError::SqlError(e.to_string())
    }
}

impl AppError {
    pub fn code(&self) -> &'static str {
        match self {
            AppError::InvalidRequest(_) => "INVALID_REQUEST",
            AppError::DbOpenFailed { .. } => "DB_OPEN_FAILED",
            AppError::SqlError(_) => "SQL_ERROR",
            AppError::Io(_) => "IO_ERROR",
            AppError::Json(_) => "JSON_ERROR",
            AppError::Internal(_) => "INTERNAL",
        }
    }
}

// Workers answer over channels, so the open failure is replayed once per queued task.
impl Clone for AppError {
    fn clone(&self) -> Self {
        match self {
            AppError::InvalidRequest(m) => AppError::InvalidRequest(m.clone()),
            AppError::DbOpenFailed { path, source } => AppError::Internal(format!(
                "failed to open database: {}: {source}",
                path.display()
            )),
            AppError::SqlError(m) => AppError::SqlError(m.clone()),
            AppError::Io(e) => AppError::Internal(format!("io error: {e}")),
            AppError::Json(e) => AppError::Internal(format!("json error: {e}")),
            AppError::Internal(m) => AppError::Internal(m.clone()),
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
