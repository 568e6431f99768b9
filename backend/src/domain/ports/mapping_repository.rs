//! Owner-scoped mapping storage port.
//!
//! A mapping is visible through an [`OwnerScope`] when its patient belongs to
//! the scope owner. Writes re-check that condition so a patient handed to
//! another account between validation and insert is not assigned.

use async_trait::async_trait;

use crate::domain::access::OwnerScope;
use crate::domain::{Assignment, Mapping, MappingId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by mapping repository adapters.
    pub enum MappingRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "mapping repository connection failed: {message}",
        /// Query failed during execution or row conversion.
        Query { message: String } => "mapping repository query failed: {message}",
        /// The patient-doctor pair is already assigned.
        DuplicatePair => "patient is already assigned to this doctor",
        /// The patient is unknown or outside the scope.
        PatientOutOfScope => "patient is not visible in this scope",
        /// The doctor does not exist.
        UnknownDoctor => "doctor does not exist",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MappingRepository: Send + Sync {
    /// Mappings whose patient the scope owns, ordered by assignment time then id.
    async fn list(&self, scope: &OwnerScope) -> Result<Vec<Mapping>, MappingRepositoryError>;

    async fn find(
        &self,
        scope: &OwnerScope,
        id: &MappingId,
    ) -> Result<Option<Mapping>, MappingRepositoryError>;

    /// Store a new assignment and return its read model.
    async fn insert(
        &self,
        scope: &OwnerScope,
        assignment: &Assignment,
    ) -> Result<Mapping, MappingRepositoryError>;

    /// Replace a visible assignment; `None` when nothing matched.
    async fn update(
        &self,
        scope: &OwnerScope,
        assignment: &Assignment,
    ) -> Result<Option<Mapping>, MappingRepositoryError>;

    /// Delete a visible mapping; `false` when nothing matched.
    async fn delete(&self, scope: &OwnerScope, id: &MappingId)
    -> Result<bool, MappingRepositoryError>;
}
