//! Driving ports for patient records.
//!
//! Callers pass the request identity as-is; implementations run it through
//! the access policy before touching storage.

use async_trait::async_trait;

use crate::domain::{Error, Patient, PatientChanges, PatientDraft, PatientId, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PatientQuery: Send + Sync {
    async fn list_patients(&self, caller: Option<UserId>) -> Result<Vec<Patient>, Error>;

    async fn get_patient(&self, caller: Option<UserId>, id: PatientId) -> Result<Patient, Error>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PatientCommand: Send + Sync {
    /// Create a patient owned by the caller.
    async fn create_patient(
        &self,
        caller: Option<UserId>,
        draft: PatientDraft,
    ) -> Result<Patient, Error>;

    async fn update_patient(
        &self,
        caller: Option<UserId>,
        id: PatientId,
        changes: PatientChanges,
    ) -> Result<Patient, Error>;

    async fn delete_patient(&self, caller: Option<UserId>, id: PatientId) -> Result<(), Error>;
}
