//! User identity model.
//!
//! Strongly typed identity components with validating constructors. The
//! password credential lives on the entity but is deliberately opaque: the
//! entity never serialises, and inbound adapters build their own projections.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Validation errors returned by the user value-object constructors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    /// Name was missing or shorter than the minimum once trimmed.
    #[error("name must be at least {min} characters")]
    NameTooShort {
        /// Minimum accepted length.
        min: usize,
    },
    /// Email did not look like an address.
    #[error("email must be a valid address")]
    InvalidEmail,
    /// Password was shorter than the minimum.
    #[error("password must be at least {min} characters")]
    PasswordTooShort {
        /// Minimum accepted length.
        min: usize,
    },
    /// Role string was outside the enumerated set.
    #[error("role must be one of: student, officer, admin")]
    UnknownRole,
}

/// Stable user identifier backed by a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Wrap an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Generate a new random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for UserId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Minimum accepted length for a user name.
pub const NAME_MIN: usize = 3;

/// Display name for a user, at least [`NAME_MIN`] characters once trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserName(String);

impl UserName {
    /// Validate and construct a [`UserName`].
    pub fn new(name: impl Into<String>) -> Result<Self, UserValidationError> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.chars().count() < NAME_MIN {
            return Err(UserValidationError::NameTooShort { min: NAME_MIN });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for UserName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for UserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        // Deliberately loose: one @, no whitespace, a dot in the domain part.
        let pattern = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";
        Regex::new(pattern)
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Syntactically valid, lower-cased email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validate and construct an [`EmailAddress`].
    pub fn new(email: impl Into<String>) -> Result<Self, UserValidationError> {
        let email = email.into();
        let normalized = email.trim().to_lowercase();
        if !email_regex().is_match(&normalized) {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(normalized))
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

/// Access level attached to a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Default role: may submit, comment, and upvote.
    Student,
    /// May triage any grievance and see internal notes.
    Officer,
    /// Same grievance privileges as an officer.
    Admin,
}

impl Role {
    /// Wire spelling of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Officer => "officer",
            Self::Admin => "admin",
        }
    }

    /// True for the privileged triage roles.
    pub fn is_staff(&self) -> bool {
        matches!(self, Self::Officer | Self::Admin)
    }
}

impl Default for Role {
    fn default() -> Self {
        Self::Student
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = UserValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "student" => Ok(Self::Student),
            "officer" => Ok(Self::Officer),
            "admin" => Ok(Self::Admin),
            _ => Err(UserValidationError::UnknownRole),
        }
    }
}

/// Registered user account.
///
/// ## Invariants
/// - `email` is unique across accounts (enforced at creation by the user
///   repository).
/// - `password_hash` never leaves the domain; projections for API responses
///   are built from the other fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    name: UserName,
    email: EmailAddress,
    password_hash: String,
    role: Role,
    department: Option<String>,
}

impl User {
    /// Assemble a user from validated components.
    pub fn new(
        id: UserId,
        name: UserName,
        email: EmailAddress,
        password_hash: String,
        role: Role,
        department: Option<String>,
    ) -> Self {
        Self {
            id,
            name,
            email,
            password_hash,
            role,
            department,
        }
    }

    /// Stable identifier.
    pub fn id(&self) -> &UserId {
        &self.id
    }

    /// Display name.
    pub fn name(&self) -> &UserName {
        &self.name
    }

    /// Unique email address.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Encoded password hash. Only the credential component compares it.
    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }

    /// Access level.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Optional department affiliation.
    pub fn department(&self) -> Option<&str> {
        self.department.as_deref()
    }

    /// Replace the display name (profile update).
    pub fn rename(&mut self, name: UserName) {
        self.name = name;
    }

    /// Replace the stored credential with a freshly hashed one.
    pub fn replace_password_hash(&mut self, password_hash: String) {
        self.password_hash = password_hash;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", UserValidationError::NameTooShort { min: NAME_MIN })]
    #[case("ab", UserValidationError::NameTooShort { min: NAME_MIN })]
    #[case("  a  ", UserValidationError::NameTooShort { min: NAME_MIN })]
    fn rejects_short_names(#[case] name: &str, #[case] expected: UserValidationError) {
        assert_eq!(UserName::new(name).expect_err("must fail"), expected);
    }

    #[rstest]
    #[case("Lenni")]
    #[case("  Ada Lovelace  ")]
    fn accepts_and_trims_names(#[case] name: &str) {
        let parsed = UserName::new(name).expect("valid name");
        assert_eq!(parsed.as_ref(), name.trim());
    }

    #[rstest]
    #[case("not-an-email")]
    #[case("a@b")]
    #[case("two words@u.edu")]
    #[case("@u.edu")]
    fn rejects_malformed_emails(#[case] email: &str) {
        assert_eq!(
            EmailAddress::new(email).expect_err("must fail"),
            UserValidationError::InvalidEmail
        );
    }

    #[test]
    fn lowercases_email_addresses() {
        let email = EmailAddress::new("A@U.Edu").expect("valid email");
        assert_eq!(email.as_ref(), "a@u.edu");
    }

    #[rstest]
    #[case("student", Role::Student)]
    #[case("officer", Role::Officer)]
    #[case("admin", Role::Admin)]
    fn parses_roles(#[case] raw: &str, #[case] expected: Role) {
        assert_eq!(raw.parse::<Role>().expect("known role"), expected);
        assert_eq!(expected.as_str(), raw);
    }

    #[test]
    fn rejects_unknown_roles() {
        assert_eq!(
            "dean".parse::<Role>().expect_err("must fail"),
            UserValidationError::UnknownRole
        );
    }

    #[test]
    fn staff_flag_covers_officer_and_admin() {
        assert!(!Role::Student.is_staff());
        assert!(Role::Officer.is_staff());
        assert!(Role::Admin.is_staff());
    }
}
