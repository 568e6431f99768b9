//! Driving ports for patient-doctor mappings.

use async_trait::async_trait;

use crate::domain::{Error, Mapping, MappingChanges, MappingDraft, MappingId, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MappingQuery: Send + Sync {
    async fn list_mappings(&self, caller: Option<UserId>) -> Result<Vec<Mapping>, Error>;

    async fn get_mapping(&self, caller: Option<UserId>, id: MappingId) -> Result<Mapping, Error>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MappingCommand: Send + Sync {
    /// Assign a doctor to one of the caller's patients.
    async fn create_mapping(
        &self,
        caller: Option<UserId>,
        draft: MappingDraft,
    ) -> Result<Mapping, Error>;

    /// Reassign either side of a visible mapping.
    async fn update_mapping(
        &self,
        caller: Option<UserId>,
        id: MappingId,
        changes: MappingChanges,
    ) -> Result<Mapping, Error>;

    async fn delete_mapping(&self, caller: Option<UserId>, id: MappingId) -> Result<(), Error>;
}
