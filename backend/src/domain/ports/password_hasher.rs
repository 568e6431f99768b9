//! Driven port for one-way credential hashing.

use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Failures raised by hasher adapters.
    pub enum PasswordHashError {
        /// Hashing could not be performed.
        Hash { message: String } => "password hashing failed: {message}",
        /// The stored hash could not be parsed.
        MalformedHash { message: String } => "stored password hash is malformed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PasswordHasher: Send + Sync {
    /// Hash a password into a self-describing PHC string.
    async fn hash(&self, password: &str) -> Result<String, PasswordHashError>;

    /// Check a password against a stored hash.
    async fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordHashError>;

    /// Spend the same effort as [`verify`](Self::verify) without an account,
    /// so unknown emails cost as much as wrong passwords.
    async fn verify_dummy(&self, password: &str);
}
