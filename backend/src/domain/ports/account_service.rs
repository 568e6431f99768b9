//! Driving ports for registration, login and bearer authentication.
//!
//! Inbound adapters call these without knowing how accounts are stored or
//! tokens signed, so handler tests can substitute mocks.

use async_trait::async_trait;

use crate::domain::{Error, LoginCredentials, LoginOutcome, RegistrationDraft, User, UserId};

/// Account creation use-case.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RegistrationService: Send + Sync {
    /// Validate and store a new account.
    async fn register(&self, draft: RegistrationDraft) -> Result<User, Error>;
}

/// Credential exchange and token verification use-cases.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Exchange email and password for a token pair.
    async fn login(&self, credentials: &LoginCredentials) -> Result<LoginOutcome, Error>;

    /// Exchange a refresh token for a fresh access token.
    async fn refresh(&self, refresh_token: &str) -> Result<String, Error>;

    /// Resolve a bearer access token to its user.
    fn authenticate_bearer(&self, access_token: &str) -> Result<UserId, Error>;
}
