//! Port abstraction for one-way password hashing.

use async_trait::async_trait;

use crate::domain::auth::RawPassword;

/// Errors raised by hashing adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("password hashing failed: {message}")]
pub struct HasherError {
    /// Adapter-specific detail.
    pub message: String,
}

impl HasherError {
    /// Construct a [`HasherError`].
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait]
pub trait PasswordHasher: Send + Sync {
    /// Produce an encoded hash for storage.
    async fn hash(&self, password: &RawPassword) -> Result<String, HasherError>;

    /// Check a candidate password against a stored encoded hash.
    async fn verify(&self, password: &RawPassword, encoded: &str) -> Result<bool, HasherError>;
}
