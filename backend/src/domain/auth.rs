//! Credential value objects for registration, login, and profile changes.

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::domain::user::{EmailAddress, Role, UserName, UserValidationError};

/// Minimum accepted password length.
pub const PASSWORD_MIN: usize = 6;

/// A plaintext password in transit between the HTTP layer and the hasher.
///
/// The inner string is wiped on drop. It never appears in `Debug` output and
/// never serialises.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct RawPassword(String);

impl RawPassword {
    /// Validate and wrap a plaintext password.
    pub fn new(password: impl Into<String>) -> Result<Self, UserValidationError> {
        let password = password.into();
        if password.chars().count() < PASSWORD_MIN {
            return Err(UserValidationError::PasswordTooShort { min: PASSWORD_MIN });
        }
        Ok(Self(password))
    }

    /// Wrap a password without length validation. Login must accept any
    /// input so short guesses still fail with the generic credential error
    /// rather than a validation error that leaks the policy.
    pub fn unchecked(password: impl Into<String>) -> Self {
        Self(password.into())
    }

    /// Expose the plaintext for hashing or verification.
    pub fn reveal(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for RawPassword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("RawPassword(***)")
    }
}

/// Validated registration request.
#[derive(Debug, Clone)]
pub struct Registration {
    /// Display name, already length checked.
    pub name: UserName,
    /// Normalised email address.
    pub email: EmailAddress,
    /// Plaintext password awaiting hashing.
    pub password: RawPassword,
    /// Requested role; defaults to student when omitted upstream.
    pub role: Role,
    /// Optional department affiliation.
    pub department: Option<String>,
}

/// Login request.
#[derive(Debug, Clone)]
pub struct Credentials {
    /// Normalised email address.
    pub email: EmailAddress,
    /// Candidate password; unvalidated on purpose.
    pub password: RawPassword,
}

/// Profile change request. A password change requires proof of the current
/// password.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    /// Replacement display name.
    pub name: Option<UserName>,
    /// Current password, required when `new_password` is set.
    pub current_password: Option<RawPassword>,
    /// Replacement password.
    pub new_password: Option<RawPassword>,
}
