use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Login form input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginInput {
    pub username: String,
    pub password: String,
}

/// Configured operator credentials
#[derive(Debug, Clone)]
pub struct AdminCredentials {
    pub username: String,
    pub password: Option<String>,
    /// Argon2 PHC string; wins over `password` when present.
    pub password_hash: Option<String>,
}

/// Issued after a successful login
#[derive(Debug, Clone)]
pub struct SessionToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Per-request view of the caller's session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionContext {
    subject: Option<String>,
}

impl SessionContext {
    pub fn anonymous() -> Self {
        Self { subject: None }
    }

    pub fn authenticated(subject: impl Into<String>) -> Self {
        Self { subject: Some(subject.into()) }
    }

    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }
}
