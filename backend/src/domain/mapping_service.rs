//! Patient-doctor assignment use-cases.
//!
//! Assignment checks run in a fixed order: the patient must exist, the
//! doctor must exist, and only then is patient ownership compared with the
//! caller. Unknown references are input errors; someone else's patient is
//! forbidden.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::{info, warn};

use crate::domain::access::{Operation, OwnerScope, owner_scope};
use crate::domain::doctor_service::map_doctor_error;
use crate::domain::patient_service::map_patient_error;
use crate::domain::ports::{
    DoctorRepository, MappingCommand, MappingQuery, MappingRepository, MappingRepositoryError,
    PatientRepository,
};
use crate::domain::{
    Assignment, DoctorId, Error, FOREIGN_PATIENT, Mapping, MappingChanges, MappingDraft,
    MappingId, PatientId, UserId,
};

fn unknown_reference(field: &'static str, id: impl std::fmt::Display) -> Error {
    Error::invalid_request(format!("invalid {field} \"{id}\": object does not exist"))
        .with_details(json!({ "field": field, "code": "does_not_exist" }))
}

fn duplicate_pair() -> Error {
    Error::conflict("this patient is already assigned to this doctor")
        .with_details(json!({ "fields": ["patient", "doctor"], "code": "unique" }))
}

fn map_mapping_error(error: MappingRepositoryError, assignment: &Assignment) -> Error {
    match error {
        MappingRepositoryError::DuplicatePair => duplicate_pair(),
        MappingRepositoryError::PatientOutOfScope => {
            warn!(patient_id = %assignment.patient, "patient left scope during assignment");
            Error::forbidden(FOREIGN_PATIENT)
        }
        MappingRepositoryError::UnknownDoctor => unknown_reference("doctor", assignment.doctor),
        other => map_lookup_error(other),
    }
}

fn map_lookup_error(error: MappingRepositoryError) -> Error {
    match error {
        MappingRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("mapping repository unavailable: {message}"))
        }
        other => Error::internal(format!("mapping repository error: {other}")),
    }
}

fn mapping_not_found(id: MappingId) -> Error {
    Error::not_found(format!("mapping {id} not found"))
}

/// Mapping service implementing the query and command driving ports.
#[derive(Clone)]
pub struct MappingService<M, P, D> {
    mappings: Arc<M>,
    patients: Arc<P>,
    doctors: Arc<D>,
    clock: Arc<dyn Clock>,
}

impl<M, P, D> MappingService<M, P, D> {
    pub fn new(
        mappings: Arc<M>,
        patients: Arc<P>,
        doctors: Arc<D>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            mappings,
            patients,
            doctors,
            clock,
        }
    }
}

impl<M, P, D> MappingService<M, P, D>
where
    M: MappingRepository,
    P: PatientRepository,
    D: DoctorRepository,
{
    async fn check_assignable(
        &self,
        scope: &OwnerScope,
        patient: PatientId,
        doctor: DoctorId,
    ) -> Result<(), Error> {
        let owner = self
            .patients
            .owner_of(&patient)
            .await
            .map_err(map_patient_error)?
            .ok_or_else(|| unknown_reference("patient", patient))?;
        if self
            .doctors
            .find(&doctor)
            .await
            .map_err(map_doctor_error)?
            .is_none()
        {
            return Err(unknown_reference("doctor", doctor));
        }
        if !scope.is_owner(&owner) {
            return Err(Error::forbidden(FOREIGN_PATIENT));
        }
        Ok(())
    }

    async fn require(&self, scope: &OwnerScope, id: MappingId) -> Result<Mapping, Error> {
        self.mappings
            .find(scope, &id)
            .await
            .map_err(map_lookup_error)?
            .ok_or_else(|| mapping_not_found(id))
    }
}

#[async_trait]
impl<M, P, D> MappingQuery for MappingService<M, P, D>
where
    M: MappingRepository,
    P: PatientRepository,
    D: DoctorRepository,
{
    async fn list_mappings(&self, caller: Option<UserId>) -> Result<Vec<Mapping>, Error> {
        let scope = owner_scope::<Mapping>(caller.as_ref(), Operation::List)?;
        self.mappings.list(&scope).await.map_err(map_lookup_error)
    }

    async fn get_mapping(&self, caller: Option<UserId>, id: MappingId) -> Result<Mapping, Error> {
        let scope = owner_scope::<Mapping>(caller.as_ref(), Operation::Retrieve)?;
        self.require(&scope, id).await
    }
}

#[async_trait]
impl<M, P, D> MappingCommand for MappingService<M, P, D>
where
    M: MappingRepository,
    P: PatientRepository,
    D: DoctorRepository,
{
    async fn create_mapping(
        &self,
        caller: Option<UserId>,
        draft: MappingDraft,
    ) -> Result<Mapping, Error> {
        let scope = owner_scope::<Mapping>(caller.as_ref(), Operation::Create)?;
        self.check_assignable(&scope, draft.patient, draft.doctor)
            .await?;
        let assignment = Assignment {
            id: MappingId::random(),
            patient: draft.patient,
            doctor: draft.doctor,
            assigned_at: self.clock.utc(),
        };
        let mapping = self
            .mappings
            .insert(&scope, &assignment)
            .await
            .map_err(|error| map_mapping_error(error, &assignment))?;
        info!(
            mapping_id = %mapping.id(),
            patient_id = %mapping.patient(),
            doctor_id = %mapping.doctor(),
            "doctor assigned"
        );
        Ok(mapping)
    }

    async fn update_mapping(
        &self,
        caller: Option<UserId>,
        id: MappingId,
        changes: MappingChanges,
    ) -> Result<Mapping, Error> {
        let scope = owner_scope::<Mapping>(caller.as_ref(), Operation::Update)?;
        let existing = self.require(&scope, id).await?;
        let assignment = existing.reassigned(changes);
        if &assignment == existing.assignment() {
            return Ok(existing);
        }
        self.check_assignable(&scope, assignment.patient, assignment.doctor)
            .await?;
        self.mappings
            .update(&scope, &assignment)
            .await
            .map_err(|error| map_mapping_error(error, &assignment))?
            .ok_or_else(|| mapping_not_found(id))
    }

    async fn delete_mapping(&self, caller: Option<UserId>, id: MappingId) -> Result<(), Error> {
        let scope = owner_scope::<Mapping>(caller.as_ref(), Operation::Delete)?;
        if !self
            .mappings
            .delete(&scope, &id)
            .await
            .map_err(map_lookup_error)?
        {
            return Err(mapping_not_found(id));
        }
        info!(mapping_id = %id, "doctor unassigned");
        Ok(())
    }
}

#[cfg(test)]
#[path = "mapping_service_tests.rs"]
mod tests;
