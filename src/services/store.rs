// src/services/store.rs
//! Storage contract shared by the local and remote registration stores

use async_trait::async_trait;

use crate::registrations::models::Registration;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Email already exists")]
    DuplicateEmail,

    #[error("Server is down")]
    Unavailable,

    #[error("Remote store rejected the request with status {0}")]
    Rejected(u16),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(reqwest::Error),
}

impl From<reqwest::Error> for StoreError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_connect() || e.is_timeout() {
            StoreError::Unavailable
        } else {
            StoreError::Http(e)
        }
    }
}

#[async_trait]
pub trait RegistrationStore: Send + Sync {
    /// All registrations accepted so far, oldest first
    async fn list(&self) -> Result<Vec<Registration>, StoreError>;

    /// Persists an accepted registration and returns it as stored
    async fn add(&self, registration: Registration) -> Result<Registration, StoreError>;

    /// Short label used in logs
    fn backend_name(&self) -> &'static str;
}
