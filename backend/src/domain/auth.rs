//! Authentication primitives: login credentials, registrations and tokens.
//!
//! Inbound adapters hand raw strings to these constructors so shape checks
//! happen before any port is invoked.

use std::fmt;

use serde_json::json;
use zeroize::Zeroizing;

use crate::domain::validation::{FieldViolation, field_error};
use crate::domain::{DisplayName, EmailAddress, Error, User, UserAttributes, UserValidationError, Username};

/// Uniform message for failed logins, whatever the cause.
pub const INVALID_CREDENTIALS: &str = "no active account found with the given credentials";
/// Uniform message for rejected bearer or refresh tokens.
pub const INVALID_TOKEN: &str = "token is invalid or expired";

/// Domain error returned when login payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginValidationError {
    /// Email was missing or blank once trimmed.
    EmptyEmail,
    /// Password was blank.
    EmptyPassword,
}

impl fmt::Display for LoginValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyEmail => write!(f, "email must not be empty"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
        }
    }
}

impl std::error::Error for LoginValidationError {}

impl FieldViolation for LoginValidationError {
    fn field(&self) -> &'static str {
        match self {
            Self::EmptyEmail => "email",
            Self::EmptyPassword => "password",
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::EmptyEmail => "empty_email",
            Self::EmptyPassword => "empty_password",
        }
    }
}

impl From<LoginValidationError> for Error {
    fn from(value: LoginValidationError) -> Self {
        field_error(value)
    }
}

/// Validated login credentials.
///
/// ## Invariants
/// - `email` is trimmed, lowercased and non-empty. It is not checked for
///   address syntax; an impossible address simply finds no account.
/// - `password` is non-empty and keeps caller-provided whitespace.
///
/// # Examples
/// ```
/// use healthcare_backend::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts("Ada@Example.org", "secret").unwrap();
/// assert_eq!(creds.email(), "ada@example.org");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, LoginValidationError> {
        let normalized = email.trim();
        if normalized.is_empty() {
            return Err(LoginValidationError::EmptyEmail);
        }
        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }
        Ok(Self {
            email: normalized.to_lowercase(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Raw registration form.
#[derive(Debug, Clone)]
pub struct RegistrationDraft {
    pub username: String,
    pub name: String,
    pub email: String,
    pub password: Zeroizing<String>,
    pub password2: Zeroizing<String>,
}

/// Registration shape failures, checked before the password policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    Field(UserValidationError),
    BlankPassword,
    PasswordMismatch,
}

impl fmt::Display for RegistrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field(inner) => fmt::Display::fmt(inner, f),
            Self::BlankPassword => f.write_str("password must not be blank"),
            Self::PasswordMismatch => f.write_str("passwords do not match"),
        }
    }
}

impl std::error::Error for RegistrationError {}

impl FieldViolation for RegistrationError {
    fn field(&self) -> &'static str {
        match self {
            Self::Field(inner) => inner.field(),
            Self::BlankPassword | Self::PasswordMismatch => "password",
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::Field(inner) => inner.code(),
            Self::BlankPassword => "blank",
            Self::PasswordMismatch => "password_mismatch",
        }
    }
}

impl From<RegistrationError> for Error {
    fn from(value: RegistrationError) -> Self {
        field_error(value)
    }
}

/// Registration whose fields have passed shape checks.
#[derive(Debug, Clone)]
pub struct Registration {
    username: Username,
    name: DisplayName,
    email: EmailAddress,
    password: Zeroizing<String>,
}

impl Registration {
    /// Check username, name and email shapes, then that both passwords match.
    pub fn try_from_draft(draft: RegistrationDraft) -> Result<Self, RegistrationError> {
        let username = Username::new(&draft.username).map_err(RegistrationError::Field)?;
        let name = DisplayName::new(&draft.name).map_err(RegistrationError::Field)?;
        let email = EmailAddress::new(&draft.email).map_err(RegistrationError::Field)?;
        if draft.password.is_empty() {
            return Err(RegistrationError::BlankPassword);
        }
        if *draft.password != *draft.password2 {
            return Err(RegistrationError::PasswordMismatch);
        }
        Ok(Self {
            username,
            name,
            email,
            password: draft.password,
        })
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

    pub fn password(&self) -> &str {
        self.password.as_str()
    }

    /// Attributes the password policy compares against.
    pub fn attributes(&self) -> UserAttributes<'_> {
        UserAttributes {
            username: self.username.as_ref(),
            email: self.email.as_ref(),
            name: self.name.as_ref(),
        }
    }
}

/// Build the error surfaced when a unique account field is already taken.
pub fn duplicate_account_field(field: &'static str) -> Error {
    Error::invalid_request(format!("a user with this {field} already exists"))
        .with_details(json!({ "field": field, "code": "unique" }))
}

/// Purpose a signed token was issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Access => "access",
            Self::Refresh => "refresh",
        }
    }
}

/// Access and refresh tokens issued together at login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// Successful login: the token pair plus the account it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginOutcome {
    pub tokens: TokenPair,
    pub user: User,
}
