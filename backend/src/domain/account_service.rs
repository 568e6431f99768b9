//! Account use-cases: registration, login, token refresh and bearer checks.
//!
//! Only Argon2 hashes are stored. Login failures are indistinguishable to the
//! caller: unknown emails run a dummy verification and return the same error
//! as a wrong password.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::domain::ports::{
    LoginService, PasswordHashError, PasswordHasher, RegistrationService, TokenError, TokenIssuer,
    UserPersistenceError, UserRepository,
};
use crate::domain::{
    EmailAddress, Error, INVALID_CREDENTIALS, INVALID_TOKEN, LoginCredentials, LoginOutcome,
    PasswordPolicy, Registration, RegistrationDraft, TokenKind, TokenPair, User, UserAccount,
    UserId, duplicate_account_field,
};

fn map_user_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::DuplicateEmail => duplicate_account_field("email"),
        UserPersistenceError::DuplicateUsername => duplicate_account_field("username"),
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
    }
}

fn map_hash_error(error: PasswordHashError) -> Error {
    Error::internal(error.to_string())
}

fn map_token_error(error: TokenError) -> Error {
    match error {
        TokenError::Signing { message } => Error::internal(format!("token signing failed: {message}")),
        rejected => {
            debug!(reason = %rejected, "token rejected");
            Error::unauthorized(INVALID_TOKEN)
        }
    }
}

fn invalid_credentials() -> Error {
    Error::unauthorized(INVALID_CREDENTIALS)
}

/// Account service implementing the registration and login driving ports.
#[derive(Clone)]
pub struct AccountService<U, H, T> {
    users: Arc<U>,
    hasher: Arc<H>,
    tokens: Arc<T>,
    policy: PasswordPolicy,
}

impl<U, H, T> AccountService<U, H, T> {
    /// Create a service using the default password policy.
    pub fn new(users: Arc<U>, hasher: Arc<H>, tokens: Arc<T>) -> Self {
        Self {
            users,
            hasher,
            tokens,
            policy: PasswordPolicy::default(),
        }
    }

    /// Replace the password policy.
    #[must_use]
    pub fn with_policy(mut self, policy: PasswordPolicy) -> Self {
        self.policy = policy;
        self
    }
}

impl<U, H, T> AccountService<U, H, T>
where
    T: TokenIssuer,
{
    fn issue(&self, subject: &UserId, kind: TokenKind) -> Result<String, Error> {
        self.tokens.issue(subject, kind).map_err(map_token_error)
    }
}

#[async_trait]
impl<U, H, T> RegistrationService for AccountService<U, H, T>
where
    U: UserRepository,
    H: PasswordHasher,
    T: TokenIssuer,
{
    async fn register(&self, draft: RegistrationDraft) -> Result<User, Error> {
        let registration = Registration::try_from_draft(draft)?;
        self.policy
            .check(registration.password(), registration.attributes())?;

        let hash = self
            .hasher
            .hash(registration.password())
            .await
            .map_err(map_hash_error)?;
        let user = User::new(
            UserId::random(),
            registration.username().clone(),
            registration.name().clone(),
            registration.email().clone(),
        );
        let account = UserAccount::new(user, hash);
        self.users.insert(&account).await.map_err(map_user_error)?;

        info!(user_id = %account.user().id(), "account registered");
        Ok(account.into_user())
    }
}

#[async_trait]
impl<U, H, T> LoginService for AccountService<U, H, T>
where
    U: UserRepository,
    H: PasswordHasher,
    T: TokenIssuer,
{
    async fn login(&self, credentials: &LoginCredentials) -> Result<LoginOutcome, Error> {
        let account = match EmailAddress::new(credentials.email()) {
            Ok(email) => self
                .users
                .find_by_email(&email)
                .await
                .map_err(map_user_error)?,
            Err(_) => None,
        };

        let Some(account) = account else {
            self.hasher.verify_dummy(credentials.password()).await;
            return Err(invalid_credentials());
        };

        let verified = self
            .hasher
            .verify(credentials.password(), account.password_hash())
            .await
            .map_err(map_hash_error)?;
        if !verified {
            debug!(user_id = %account.user().id(), "password mismatch");
            return Err(invalid_credentials());
        }

        let subject = account.user().id();
        let tokens = TokenPair {
            access: self.issue(&subject, TokenKind::Access)?,
            refresh: self.issue(&subject, TokenKind::Refresh)?,
        };
        info!(user_id = %subject, "login succeeded");
        Ok(LoginOutcome {
            tokens,
            user: account.into_user(),
        })
    }

    async fn refresh(&self, refresh_token: &str) -> Result<String, Error> {
        let subject = self
            .tokens
            .verify(refresh_token, TokenKind::Refresh)
            .map_err(map_token_error)?;
        let user = self
            .users
            .find_by_id(&subject)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::unauthorized(INVALID_TOKEN))?;
        self.issue(&user.id(), TokenKind::Access)
    }

    fn authenticate_bearer(&self, access_token: &str) -> Result<UserId, Error> {
        self.tokens
            .verify(access_token, TokenKind::Access)
            .map_err(map_token_error)
    }
}

#[cfg(test)]
#[path = "account_service_tests.rs"]
mod tests;
