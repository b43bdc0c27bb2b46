//! Account service: registration, login, and profile maintenance on top of
//! the user repository and password hasher ports.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::auth::{Credentials, ProfileUpdate, Registration};
use crate::domain::error::Error;
use crate::domain::ports::account::AccountService;
use crate::domain::ports::password_hasher::PasswordHasher;
use crate::domain::ports::user_repository::{UserPersistenceError, UserRepository};
use crate::domain::user::{User, UserId};

/// Login failures share one message so callers cannot probe which emails
/// exist.
const BAD_CREDENTIALS: &str = "Invalid email or password";

/// [`AccountService`] backed by a user repository and a password hasher.
pub struct PasswordAccountService {
    users: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
}

impl PasswordAccountService {
    /// Wire the service to its collaborators.
    pub fn new(users: Arc<dyn UserRepository>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { users, hasher }
    }

    fn map_persistence(err: UserPersistenceError) -> Error {
        match err {
            UserPersistenceError::DuplicateEmail => {
                Error::duplicate_email("Email address already registered")
            }
            other => Error::internal(other.to_string()),
        }
    }
}

#[async_trait]
impl AccountService for PasswordAccountService {
    async fn register(&self, registration: Registration) -> Result<User, Error> {
        let hash = self
            .hasher
            .hash(&registration.password)
            .await
            .map_err(|err| Error::internal(err.to_string()))?;
        let user = User::new(
            UserId::random(),
            registration.name,
            registration.email,
            hash,
            registration.role,
            registration.department,
        );
        self.users
            .insert(&user)
            .await
            .map_err(Self::map_persistence)?;
        Ok(user)
    }

    async fn login(&self, credentials: Credentials) -> Result<User, Error> {
        let user = self
            .users
            .find_by_email(&credentials.email)
            .await
            .map_err(Self::map_persistence)?
            .ok_or_else(|| Error::unauthorized(BAD_CREDENTIALS))?;
        let matches = self
            .hasher
            .verify(&credentials.password, user.password_hash())
            .await
            .map_err(|err| Error::internal(err.to_string()))?;
        if matches {
            Ok(user)
        } else {
            Err(Error::unauthorized(BAD_CREDENTIALS))
        }
    }

    async fn fetch(&self, id: &UserId) -> Result<Option<User>, Error> {
        self.users.find_by_id(id).await.map_err(Self::map_persistence)
    }

    async fn update_profile(&self, id: &UserId, update: ProfileUpdate) -> Result<User, Error> {
        let mut user = self
            .users
            .find_by_id(id)
            .await
            .map_err(Self::map_persistence)?
            .ok_or_else(|| Error::not_found("User not found"))?;
        if let Some(new_password) = update.new_password {
            let current = update.current_password.ok_or_else(|| {
                Error::invalid_request("Current password is required to change the password")
            })?;
            let matches = self
                .hasher
                .verify(&current, user.password_hash())
                .await
                .map_err(|err| Error::internal(err.to_string()))?;
            if !matches {
                return Err(Error::unauthorized("Current password is incorrect"));
            }
            let hash = self
                .hasher
                .hash(&new_password)
                .await
                .map_err(|err| Error::internal(err.to_string()))?;
            user.replace_password_hash(hash);
        }
        if let Some(name) = update.name {
            user.rename(name);
        }
        self.users
            .update(&user)
            .await
            .map_err(Self::map_persistence)?;
        Ok(user)
    }
}
