//! PostgreSQL-backed `UserRepository` implementation.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{
    DisplayName, EmailAddress, User, UserAccount, UserId, UserValidationError, Username,
};

use super::diesel_error_mapping::{classify_diesel_error, map_basic_pool_error};
use super::models::{NewUserRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::{constraints, users};

/// Diesel-backed identity store.
///
/// Uniqueness of email and username is enforced by the table constraints, so
/// concurrent registrations race safely.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserPersistenceError {
    map_basic_pool_error(error, UserPersistenceError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> UserPersistenceError {
    match classify_diesel_error(error) {
        failure if failure.is_unique(constraints::USERS_EMAIL) => {
            UserPersistenceError::duplicate_email()
        }
        failure if failure.is_unique(constraints::USERS_USERNAME) => {
            UserPersistenceError::duplicate_username()
        }
        failure => failure.into_basic(
            UserPersistenceError::query,
            UserPersistenceError::connection,
        ),
    }
}

fn row_to_user(row: &UserRow) -> Result<User, UserPersistenceError> {
    let corrupt = |error: UserValidationError| {
        UserPersistenceError::query(format!("stored user is invalid: {error}"))
    };
    Ok(User::new(
        UserId::from_uuid(row.id),
        Username::new(&row.username).map_err(corrupt)?,
        DisplayName::new(&row.name).map_err(corrupt)?,
        EmailAddress::new(&row.email).map_err(corrupt)?,
    ))
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn insert(&self, account: &UserAccount) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let user = account.user();
        let row = NewUserRow {
            id: *user.id().as_uuid(),
            username: user.username().as_ref(),
            name: user.name().as_ref(),
            email: user.email().as_ref(),
            password_hash: account.password_hash(),
        };

        diesel::insert_into(users::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<UserAccount>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserRow> = users::table
            .filter(users::email.eq(email.as_ref()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(|row| Ok(UserAccount::new(row_to_user(&row)?, row.password_hash)))
            .transpose()
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserRow> = users::table
            .filter(users::id.eq(id.as_uuid()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.as_ref().map(row_to_user).transpose()
    }
}
