//! Patient record use-cases.
//!
//! Every operation resolves an [`OwnerScope`] first, so another account's
//! patients are reported as missing rather than forbidden.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use crate::domain::access::{Operation, OwnerScope, owner_scope};
use crate::domain::ports::{
    PatientCommand, PatientQuery, PatientRepository, PatientRepositoryError,
};
use crate::domain::validation::field_error;
use crate::domain::{
    Error, Patient, PatientChanges, PatientDetails, PatientDraft, PatientId, UserId,
};

pub(crate) fn map_patient_error(error: PatientRepositoryError) -> Error {
    match error {
        PatientRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("patient repository unavailable: {message}"))
        }
        PatientRepositoryError::Query { message } => {
            Error::internal(format!("patient repository error: {message}"))
        }
    }
}

fn patient_not_found(id: PatientId) -> Error {
    Error::not_found(format!("patient {id} not found"))
}

/// Patient service implementing the query and command driving ports.
#[derive(Clone)]
pub struct PatientService<R> {
    patients: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<R> PatientService<R> {
    pub fn new(patients: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self { patients, clock }
    }
}

impl<R> PatientService<R>
where
    R: PatientRepository,
{
    async fn require(&self, scope: &OwnerScope, id: PatientId) -> Result<Patient, Error> {
        self.patients
            .find(scope, &id)
            .await
            .map_err(map_patient_error)?
            .ok_or_else(|| patient_not_found(id))
    }
}

#[async_trait]
impl<R> PatientQuery for PatientService<R>
where
    R: PatientRepository,
{
    async fn list_patients(&self, caller: Option<UserId>) -> Result<Vec<Patient>, Error> {
        let scope = owner_scope::<Patient>(caller.as_ref(), Operation::List)?;
        self.patients.list(&scope).await.map_err(map_patient_error)
    }

    async fn get_patient(&self, caller: Option<UserId>, id: PatientId) -> Result<Patient, Error> {
        let scope = owner_scope::<Patient>(caller.as_ref(), Operation::Retrieve)?;
        self.require(&scope, id).await
    }
}

#[async_trait]
impl<R> PatientCommand for PatientService<R>
where
    R: PatientRepository,
{
    async fn create_patient(
        &self,
        caller: Option<UserId>,
        draft: PatientDraft,
    ) -> Result<Patient, Error> {
        let scope = owner_scope::<Patient>(caller.as_ref(), Operation::Create)?;
        let details = PatientDetails::try_from_draft(&draft).map_err(field_error)?;
        let patient = Patient::new(PatientId::random(), scope.owner(), details, self.clock.utc());
        self.patients
            .insert(&scope, &patient)
            .await
            .map_err(map_patient_error)?;
        info!(patient_id = %patient.id(), owner = %scope.owner(), "patient created");
        Ok(patient)
    }

    async fn update_patient(
        &self,
        caller: Option<UserId>,
        id: PatientId,
        changes: PatientChanges,
    ) -> Result<Patient, Error> {
        let scope = owner_scope::<Patient>(caller.as_ref(), Operation::Update)?;
        let existing = self.require(&scope, id).await?;
        let updated = existing.apply(changes).map_err(field_error)?;
        let matched = self
            .patients
            .update(&scope, &updated)
            .await
            .map_err(map_patient_error)?;
        if !matched {
            return Err(patient_not_found(id));
        }
        Ok(updated)
    }

    async fn delete_patient(&self, caller: Option<UserId>, id: PatientId) -> Result<(), Error> {
        let scope = owner_scope::<Patient>(caller.as_ref(), Operation::Delete)?;
        let removed = self
            .patients
            .delete(&scope, &id)
            .await
            .map_err(map_patient_error)?;
        if !removed {
            return Err(patient_not_found(id));
        }
        info!(patient_id = %id, "patient deleted");
        Ok(())
    }
}

#[cfg(test)]
#[path = "patient_service_tests.rs"]
mod tests;
