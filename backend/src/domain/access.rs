//! Authorization policy shared by every resource operation.
//!
//! Each record type declares, per [`Operation`], the [`PermissionLevel`] it
//! requires through the [`Resource`] capability trait. [`authorize`] turns an
//! explicit caller identity into a [`Grant`]; owner-level grants carry an
//! [`OwnerScope`], the only way to address Patient and Mapping storage.

use tracing::debug;

use crate::domain::{Error, UserId};

/// Message returned when a protected operation is attempted anonymously.
pub const CREDENTIALS_MISSING: &str = "authentication credentials were not provided";

/// Operation requested against a resource collection or item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    List,
    Retrieve,
    Create,
    Update,
    Delete,
}

impl Operation {
    /// `true` for `List` and `Retrieve`.
    #[must_use]
    pub fn is_read(self) -> bool {
        matches!(self, Self::List | Self::Retrieve)
    }
}

/// Level of identity an operation demands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PermissionLevel {
    /// Anyone, including anonymous callers.
    Public,
    /// Any authenticated caller.
    Authenticated,
    /// Authenticated, and results restricted to what the caller owns.
    Owner,
}

/// Record families guarded by the policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Patient,
    Doctor,
    Mapping,
}

/// Capability implemented by every guarded record type.
pub trait Resource {
    /// Family the record belongs to.
    const KIND: ResourceKind;

    /// Identity required to perform `operation`.
    fn permission(operation: Operation) -> PermissionLevel;
}

/// Caller identity used as a mandatory storage filter.
///
/// Only [`authorize`] constructs this type, so a Patient or Mapping query
/// cannot be issued without going through the guard first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OwnerScope {
    owner: UserId,
}

impl OwnerScope {
    /// The user whose records are visible through this scope.
    #[must_use]
    pub fn owner(&self) -> UserId {
        self.owner
    }

    /// Whether `candidate` is the scope owner.
    #[must_use]
    pub fn is_owner(&self, candidate: &UserId) -> bool {
        &self.owner == candidate
    }
}

/// Outcome of a successful authorization check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grant {
    Anonymous,
    Authenticated(UserId),
    Owner(OwnerScope),
}

impl Grant {
    /// Caller identity, when one was presented.
    #[must_use]
    pub fn caller(&self) -> Option<UserId> {
        match self {
            Self::Anonymous => None,
            Self::Authenticated(id) => Some(*id),
            Self::Owner(scope) => Some(scope.owner()),
        }
    }

    /// Owner scope carried by an owner-level grant.
    pub fn into_owner_scope(self) -> Result<OwnerScope, Error> {
        match self {
            Self::Owner(scope) => Ok(scope),
            other => Err(Error::internal(format!(
                "policy yielded {other:?} where an owner scope was required"
            ))),
        }
    }
}

/// Decide whether `caller` may perform `operation` on resources of type `R`.
///
/// # Examples
/// ```
/// use healthcare_backend::domain::access::{authorize, Grant, Operation};
/// use healthcare_backend::domain::{Doctor, Patient, UserId};
///
/// assert_eq!(authorize::<Doctor>(None, Operation::List).unwrap(), Grant::Anonymous);
/// assert!(authorize::<Patient>(None, Operation::List).is_err());
///
/// let caller = UserId::random();
/// let grant = authorize::<Patient>(Some(&caller), Operation::List).unwrap();
/// assert_eq!(grant.into_owner_scope().unwrap().owner(), caller);
/// ```
pub fn authorize<R: Resource>(caller: Option<&UserId>, operation: Operation) -> Result<Grant, Error> {
    let level = R::permission(operation);
    match (level, caller) {
        (PermissionLevel::Public, None) => Ok(Grant::Anonymous),
        (PermissionLevel::Public | PermissionLevel::Authenticated, Some(id)) => {
            Ok(Grant::Authenticated(*id))
        }
        (PermissionLevel::Owner, Some(id)) => Ok(Grant::Owner(OwnerScope { owner: *id })),
        (PermissionLevel::Authenticated | PermissionLevel::Owner, None) => {
            debug!(kind = ?R::KIND, ?operation, "anonymous caller rejected");
            Err(Error::unauthorized(CREDENTIALS_MISSING))
        }
    }
}

/// Shorthand for resources whose every operation is owner-scoped.
pub fn owner_scope<R: Resource>(caller: Option<&UserId>, operation: Operation) -> Result<OwnerScope, Error> {
    authorize::<R>(caller, operation)?.into_owner_scope()
}

/// Doctor entries are a shared directory: anyone may read, any
/// authenticated caller may write, and nothing is owner-restricted.
#[must_use]
pub fn doctor_access(operation: Operation) -> PermissionLevel {
    if operation.is_read() {
        PermissionLevel::Public
    } else {
        PermissionLevel::Authenticated
    }
}

#[cfg(test)]
mod tests;
