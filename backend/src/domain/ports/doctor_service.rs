//! Driving ports for the doctor directory.

use async_trait::async_trait;

use crate::domain::{Doctor, DoctorChanges, DoctorDraft, DoctorId, Error, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DoctorQuery: Send + Sync {
    async fn list_doctors(&self, caller: Option<UserId>) -> Result<Vec<Doctor>, Error>;

    async fn get_doctor(&self, caller: Option<UserId>, id: DoctorId) -> Result<Doctor, Error>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DoctorCommand: Send + Sync {
    async fn create_doctor(&self, caller: Option<UserId>, draft: DoctorDraft)
    -> Result<Doctor, Error>;

    async fn update_doctor(
        &self,
        caller: Option<UserId>,
        id: DoctorId,
        changes: DoctorChanges,
    ) -> Result<Doctor, Error>;

    async fn delete_doctor(&self, caller: Option<UserId>, id: DoctorId) -> Result<(), Error>;
}
