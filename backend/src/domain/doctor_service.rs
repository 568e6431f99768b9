//! Doctor directory use-cases.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::info;

use crate::domain::access::{Operation, authorize};
use crate::domain::ports::{DoctorCommand, DoctorQuery, DoctorRepository, DoctorRepositoryError};
use crate::domain::validation::field_error;
use crate::domain::{Doctor, DoctorChanges, DoctorDetails, DoctorDraft, DoctorId, Error, UserId};

pub(crate) fn map_doctor_error(error: DoctorRepositoryError) -> Error {
    match error {
        DoctorRepositoryError::DuplicateEmail => {
            Error::invalid_request("a doctor with this email already exists")
                .with_details(json!({ "field": "email", "code": "unique" }))
        }
        DoctorRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("doctor repository unavailable: {message}"))
        }
        DoctorRepositoryError::Query { message } => {
            Error::internal(format!("doctor repository error: {message}"))
        }
    }
}

fn doctor_not_found(id: DoctorId) -> Error {
    Error::not_found(format!("doctor {id} not found"))
}

/// Doctor service implementing the query and command driving ports.
#[derive(Clone)]
pub struct DoctorService<R> {
    doctors: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<R> DoctorService<R> {
    pub fn new(doctors: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self { doctors, clock }
    }
}

impl<R> DoctorService<R>
where
    R: DoctorRepository,
{
    async fn require(&self, id: DoctorId) -> Result<Doctor, Error> {
        self.doctors
            .find(&id)
            .await
            .map_err(map_doctor_error)?
            .ok_or_else(|| doctor_not_found(id))
    }
}

#[async_trait]
impl<R> DoctorQuery for DoctorService<R>
where
    R: DoctorRepository,
{
    async fn list_doctors(&self, caller: Option<UserId>) -> Result<Vec<Doctor>, Error> {
        authorize::<Doctor>(caller.as_ref(), Operation::List)?;
        self.doctors.list().await.map_err(map_doctor_error)
    }

    async fn get_doctor(&self, caller: Option<UserId>, id: DoctorId) -> Result<Doctor, Error> {
        authorize::<Doctor>(caller.as_ref(), Operation::Retrieve)?;
        self.require(id).await
    }
}

#[async_trait]
impl<R> DoctorCommand for DoctorService<R>
where
    R: DoctorRepository,
{
    async fn create_doctor(
        &self,
        caller: Option<UserId>,
        draft: DoctorDraft,
    ) -> Result<Doctor, Error> {
        authorize::<Doctor>(caller.as_ref(), Operation::Create)?;
        let details = DoctorDetails::try_from_draft(&draft).map_err(field_error)?;
        let doctor = Doctor::new(DoctorId::random(), details, self.clock.utc());
        self.doctors
            .insert(&doctor)
            .await
            .map_err(map_doctor_error)?;
        info!(doctor_id = %doctor.id(), "doctor created");
        Ok(doctor)
    }

    async fn update_doctor(
        &self,
        caller: Option<UserId>,
        id: DoctorId,
        changes: DoctorChanges,
    ) -> Result<Doctor, Error> {
        authorize::<Doctor>(caller.as_ref(), Operation::Update)?;
        let existing = self.require(id).await?;
        let updated = existing.apply(changes).map_err(field_error)?;
        if !self
            .doctors
            .update(&updated)
            .await
            .map_err(map_doctor_error)?
        {
            return Err(doctor_not_found(id));
        }
        Ok(updated)
    }

    async fn delete_doctor(&self, caller: Option<UserId>, id: DoctorId) -> Result<(), Error> {
        authorize::<Doctor>(caller.as_ref(), Operation::Delete)?;
        if !self.doctors.delete(&id).await.map_err(map_doctor_error)? {
            return Err(doctor_not_found(id));
        }
        info!(doctor_id = %id, "doctor deleted");
        Ok(())
    }
}

#[cfg(test)]
#[path = "doctor_service_tests.rs"]
mod tests;
