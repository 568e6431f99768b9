//! User account model.
//!
//! Accounts are identified by email for login; the username is a unique
//! handle kept alongside it. Password hashes never leave the
//! [`UserAccount`] wrapper used by the identity store.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::domain::UserId;
use crate::domain::validation::{FieldViolation, TextViolation, bounded_text};

/// Maximum length of a username.
pub const USERNAME_MAX: usize = 150;
/// Maximum length of a display name.
pub const DISPLAY_NAME_MAX: usize = 255;
/// Maximum length of an email address.
pub const EMAIL_MAX: usize = 254;

/// Validation errors for account fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    Username(TextViolation),
    UsernameInvalidCharacters,
    Name(TextViolation),
    Email(TextViolation),
    EmailMalformed,
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Username(violation) => write!(f, "username {violation}"),
            Self::UsernameInvalidCharacters => f.write_str(
                "username may only contain letters, digits and @/./+/-/_ characters",
            ),
            Self::Name(violation) => write!(f, "name {violation}"),
            Self::Email(violation) => write!(f, "email {violation}"),
            Self::EmailMalformed => f.write_str("enter a valid email address"),
        }
    }
}

impl std::error::Error for UserValidationError {}

impl FieldViolation for UserValidationError {
    fn field(&self) -> &'static str {
        match self {
            Self::Username(_) | Self::UsernameInvalidCharacters => "username",
            Self::Name(_) => "name",
            Self::Email(_) | Self::EmailMalformed => "email",
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::Username(violation) | Self::Name(violation) | Self::Email(violation) => {
                violation.code()
            }
            Self::UsernameInvalidCharacters => "invalid_characters",
            Self::EmailMalformed => "invalid_email",
        }
    }
}

static USERNAME_RE: OnceLock<Regex> = OnceLock::new();
static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn username_regex() -> &'static Regex {
    USERNAME_RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9@.+\-_]+$")
            .unwrap_or_else(|error| panic!("username regex failed to compile: {error}"))
    })
}

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s.]+(\.[^@\s.]+)+$")
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Unique login handle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Username(String);

impl Username {
    /// Validate and construct a username.
    pub fn new(raw: &str) -> Result<Self, UserValidationError> {
        let value = bounded_text(raw, USERNAME_MAX).map_err(UserValidationError::Username)?;
        if !username_regex().is_match(&value) {
            return Err(UserValidationError::UsernameInvalidCharacters);
        }
        Ok(Self(value))
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

/// Human readable name shown for an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DisplayName(String);

impl DisplayName {
    /// Validate and construct a display name.
    pub fn new(raw: &str) -> Result<Self, UserValidationError> {
        bounded_text(raw, DISPLAY_NAME_MAX)
            .map(Self)
            .map_err(UserValidationError::Name)
    }
}

impl AsRef<str> for DisplayName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

/// Email address normalised to lowercase.
///
/// Comparison is therefore case-insensitive: `Ada@Example.org` and
/// `ada@example.org` are the same address.
///
/// # Examples
/// ```
/// use healthcare_backend::domain::EmailAddress;
///
/// let email = EmailAddress::new(" Ada@Example.org ").unwrap();
/// assert_eq!(email.as_ref(), "ada@example.org");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validate and normalise an email address.
    pub fn new(raw: &str) -> Result<Self, UserValidationError> {
        let value = bounded_text(raw, EMAIL_MAX).map_err(UserValidationError::Email)?;
        if !email_regex().is_match(&value) {
            return Err(UserValidationError::EmailMalformed);
        }
        Ok(Self(value.to_lowercase()))
    }

    /// Portion before the `@`.
    pub fn local_part(&self) -> &str {
        self.0.split('@').next().unwrap_or_default()
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Public view of an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    username: Username,
    name: DisplayName,
    email: EmailAddress,
}

impl User {
    /// Assemble a user from validated parts.
    pub fn new(id: UserId, username: Username, name: DisplayName, email: EmailAddress) -> Self {
        Self {
            id,
            username,
            name,
            email,
        }
    }

    pub fn id(&self) -> UserId {
        self.id
    }

    pub fn username(&self) -> &Username {
        &self.username
    }

    pub fn name(&self) -> &DisplayName {
        &self.name
    }

    pub fn email(&self) -> &EmailAddress {
        &self.email
    }
}

/// Stored account: the user plus its Argon2 PHC hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAccount {
    user: User,
    password_hash: String,
}

impl UserAccount {
    pub fn new(user: User, password_hash: impl Into<String>) -> Self {
        Self {
            user,
            password_hash: password_hash.into(),
        }
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn password_hash(&self) -> &str {
        self.password_hash.as_str()
    }

    pub fn into_user(self) -> User {
        self.user
    }
}
