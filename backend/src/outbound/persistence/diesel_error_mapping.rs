//! Shared Diesel error classification for the repository adapters.
//!
//! Each adapter turns a [`DieselFailure`] into its own port error, so the
//! constraint names from the migrations stay inside the persistence layer.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use super::pool::PoolError;

/// Database failure reduced to what the adapters act on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DieselFailure {
    /// A unique constraint rejected the write.
    Unique { constraint: Option<String> },
    /// A foreign key constraint rejected the write.
    ForeignKey { constraint: Option<String> },
    /// The connection dropped mid-operation.
    Connection(&'static str),
    /// Any other query failure.
    Query(&'static str),
}

impl DieselFailure {
    /// Whether this is a unique violation on `name`.
    pub(crate) fn is_unique(&self, name: &str) -> bool {
        matches!(self, Self::Unique { constraint: Some(found) } if found == name)
    }

    /// Whether this is a foreign key violation on `name`.
    pub(crate) fn is_foreign_key(&self, name: &str) -> bool {
        matches!(self, Self::ForeignKey { constraint: Some(found) } if found == name)
    }

    /// Collapse into connection/query constructors for the remaining cases.
    pub(crate) fn into_basic<E, Q, C>(self, query: Q, connection: C) -> E
    where
        Q: FnOnce(&'static str) -> E,
        C: FnOnce(&'static str) -> E,
    {
        match self {
            Self::Connection(message) => connection(message),
            Self::Query(message) => query(message),
            Self::Unique { .. } => query("unexpected unique violation"),
            Self::ForeignKey { .. } => query("unexpected foreign key violation"),
        }
    }
}

/// Map pool errors into a repository-specific connection error constructor.
pub(crate) fn map_basic_pool_error<E, C>(error: PoolError, connection: C) -> E
where
    C: FnOnce(String) -> E,
{
    let message = match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    };
    connection(message)
}

/// Classify a Diesel error, logging the driver detail at debug level.
pub(crate) fn classify_diesel_error(error: DieselError) -> DieselFailure {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(
                ?kind,
                message = info.message(),
                constraint = info.constraint_name(),
                "diesel operation failed"
            );
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            DieselFailure::Unique {
                constraint: info.constraint_name().map(str::to_owned),
            }
        }
        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info) => {
            DieselFailure::ForeignKey {
                constraint: info.constraint_name().map(str::to_owned),
            }
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            DieselFailure::Connection("database connection error")
        }
        DieselError::NotFound => DieselFailure::Query("record not found"),
        DieselError::QueryBuilderError(_) => DieselFailure::Query("database query error"),
        _ => DieselFailure::Query("database error"),
    }
}
