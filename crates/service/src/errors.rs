use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("malformed article {filename}: {reason}")]
    Malformed { filename: String, reason: String },
    #[error("storage error: {0}")]
    Storage(String),
}

impl ServiceError {
    pub fn storage(context: &str, err: std::io::Error) -> Self {
        Self::Storage(format!("{context}: {err}"))
    }
}
