//! Driving port for account use-cases.
//!
//! Inbound adapters call this to register, authenticate, and maintain
//! accounts without importing the backing infrastructure, which keeps HTTP
//! handler tests deterministic with a test double.

use async_trait::async_trait;

use crate::domain::auth::{Credentials, ProfileUpdate, Registration};
use crate::domain::error::Error;
use crate::domain::user::{User, UserId};

/// Domain use-case port for registration, login, and profile maintenance.
#[async_trait]
pub trait AccountService: Send + Sync {
    /// Create a new account. Fails with `duplicate_email` when the address
    /// is taken.
    async fn register(&self, registration: Registration) -> Result<User, Error>;

    /// Validate credentials and return the authenticated user. The error is
    /// deliberately generic so callers cannot probe which emails exist.
    async fn login(&self, credentials: Credentials) -> Result<User, Error>;

    /// Resolve a user by id, e.g. from a session cookie.
    async fn fetch(&self, id: &UserId) -> Result<Option<User>, Error>;

    /// Apply a profile change. A password change requires the matching
    /// current password.
    async fn update_profile(&self, id: &UserId, update: ProfileUpdate) -> Result<User, Error>;
}
