//! Doctor directory storage port.

use async_trait::async_trait;

use crate::domain::{Doctor, DoctorId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by doctor repository adapters.
    pub enum DoctorRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "doctor repository connection failed: {message}",
        /// Query failed during execution or row conversion.
        Query { message: String } => "doctor repository query failed: {message}",
        /// Another doctor already uses this email.
        DuplicateEmail => "doctor email already registered",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DoctorRepository: Send + Sync {
    /// All doctors ordered by creation time then id.
    async fn list(&self) -> Result<Vec<Doctor>, DoctorRepositoryError>;

    async fn find(&self, id: &DoctorId) -> Result<Option<Doctor>, DoctorRepositoryError>;

    async fn insert(&self, doctor: &Doctor) -> Result<(), DoctorRepositoryError>;

    /// Replace a doctor's details; `false` when the id is unknown.
    async fn update(&self, doctor: &Doctor) -> Result<bool, DoctorRepositoryError>;

    /// Delete a doctor and its mappings; `false` when the id is unknown.
    async fn delete(&self, id: &DoctorId) -> Result<bool, DoctorRepositoryError>;
}
