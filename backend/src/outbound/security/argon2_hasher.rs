//! Argon2id implementation of the `PasswordHasher` port.
//!
//! Hashing is CPU bound, so each call runs on Tokio's blocking pool.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{
    Error as HashError, PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString,
};
use argon2::{Algorithm, Argon2, Params, Version};
use async_trait::async_trait;
use tracing::warn;
use zeroize::Zeroizing;

use crate::domain::ports::{PasswordHashError, PasswordHasher};

/// Argon2id hasher producing PHC strings.
///
/// Verification reads cost parameters from the stored hash, so changing
/// `params` only affects new hashes.
#[derive(Clone)]
pub struct Argon2PasswordHasher {
    params: Params,
    dummy_hash: String,
}

impl Argon2PasswordHasher {
    /// Hasher with the crate's recommended Argon2id parameters.
    ///
    /// # Errors
    ///
    /// Returns [`PasswordHashError::Hash`] if the dummy hash cannot be built.
    pub fn new() -> Result<Self, PasswordHashError> {
        Self::with_params(Params::default())
    }

    /// Hasher with explicit cost parameters.
    ///
    /// # Examples
    /// ```
    /// use argon2::Params;
    /// use healthcare_backend::outbound::security::Argon2PasswordHasher;
    ///
    /// let cheap = Params::new(Params::MIN_M_COST, 1, 1, None).unwrap();
    /// assert!(Argon2PasswordHasher::with_params(cheap).is_ok());
    /// ```
    pub fn with_params(params: Params) -> Result<Self, PasswordHashError> {
        let dummy_hash = hash_with(&params, "placeholder credential")?;
        Ok(Self { params, dummy_hash })
    }
}

fn argon2(params: &Params) -> Argon2<'static> {
    Argon2::new(Algorithm::Argon2id, Version::V0x13, params.clone())
}

fn hash_with(params: &Params, password: &str) -> Result<String, PasswordHashError> {
    let salt = SaltString::generate(&mut OsRng);
    argon2(params)
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|error| PasswordHashError::hash(error.to_string()))
}

fn verify_with(params: &Params, password: &str, stored: &str) -> Result<bool, PasswordHashError> {
    let parsed = PasswordHash::new(stored)
        .map_err(|error| PasswordHashError::malformed_hash(error.to_string()))?;
    match argon2(params).verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(HashError::Password) => Ok(false),
        Err(error) => Err(PasswordHashError::hash(error.to_string())),
    }
}

fn join_error(error: tokio::task::JoinError) -> PasswordHashError {
    PasswordHashError::hash(format!("hashing task failed: {error}"))
}

#[async_trait]
impl PasswordHasher for Argon2PasswordHasher {
    async fn hash(&self, password: &str) -> Result<String, PasswordHashError> {
        let params = self.params.clone();
        let password = Zeroizing::new(password.to_owned());
        tokio::task::spawn_blocking(move || hash_with(&params, &password))
            .await
            .map_err(join_error)?
    }

    async fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordHashError> {
        let params = self.params.clone();
        let password = Zeroizing::new(password.to_owned());
        let stored = hash.to_owned();
        tokio::task::spawn_blocking(move || verify_with(&params, &password, &stored))
            .await
            .map_err(join_error)?
    }

    async fn verify_dummy(&self, password: &str) {
        if let Err(error) = self.verify(password, &self.dummy_hash).await {
            warn!(%error, "dummy password verification failed");
        }
    }
}
