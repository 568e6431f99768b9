//! Owner-scoped patient storage port.
//!
//! Every read and write takes an [`OwnerScope`]; adapters must filter on its
//! owner so records belonging to another account are neither returned nor
//! mutated.

use async_trait::async_trait;

use crate::domain::access::OwnerScope;
use crate::domain::{Patient, PatientId, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by patient repository adapters.
    pub enum PatientRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "patient repository connection failed: {message}",
        /// Query failed during execution or row conversion.
        Query { message: String } => "patient repository query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PatientRepository: Send + Sync {
    /// Patients owned by the scope, ordered by creation time then id.
    async fn list(&self, scope: &OwnerScope) -> Result<Vec<Patient>, PatientRepositoryError>;

    /// A patient visible through the scope.
    async fn find(
        &self,
        scope: &OwnerScope,
        id: &PatientId,
    ) -> Result<Option<Patient>, PatientRepositoryError>;

    /// Store a new patient. The patient's owner must equal the scope owner.
    async fn insert(&self, scope: &OwnerScope, patient: &Patient)
    -> Result<(), PatientRepositoryError>;

    /// Replace a visible patient's details; `false` when nothing matched.
    async fn update(
        &self,
        scope: &OwnerScope,
        patient: &Patient,
    ) -> Result<bool, PatientRepositoryError>;

    /// Delete a visible patient and its mappings; `false` when nothing matched.
    async fn delete(&self, scope: &OwnerScope, id: &PatientId)
    -> Result<bool, PatientRepositoryError>;

    /// Owner of any patient, used only to tell an unknown patient apart from
    /// someone else's when assigning doctors. Returns no patient data.
    async fn owner_of(&self, id: &PatientId) -> Result<Option<UserId>, PatientRepositoryError>;
}
