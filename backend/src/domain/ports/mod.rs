//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driving ports (`*Service`, `*Query`, `*Command`) are called by inbound
//! adapters. Driven ports (`*Repository`, [`PasswordHasher`],
//! [`TokenIssuer`]) are implemented by outbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod account_service;
mod doctor_repository;
mod doctor_service;
mod mapping_repository;
mod mapping_service;
mod password_hasher;
mod patient_repository;
mod patient_service;
mod token_issuer;
mod user_repository;

#[cfg(test)]
pub use account_service::{MockLoginService, MockRegistrationService};
pub use account_service::{LoginService, RegistrationService};
#[cfg(test)]
pub use doctor_repository::MockDoctorRepository;
pub use doctor_repository::{DoctorRepository, DoctorRepositoryError};
#[cfg(test)]
pub use doctor_service::{MockDoctorCommand, MockDoctorQuery};
pub use doctor_service::{DoctorCommand, DoctorQuery};
#[cfg(test)]
pub use mapping_repository::MockMappingRepository;
pub use mapping_repository::{MappingRepository, MappingRepositoryError};
#[cfg(test)]
pub use mapping_service::{MockMappingCommand, MockMappingQuery};
pub use mapping_service::{MappingCommand, MappingQuery};
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHashError, PasswordHasher};
#[cfg(test)]
pub use patient_repository::MockPatientRepository;
pub use patient_repository::{PatientRepository, PatientRepositoryError};
#[cfg(test)]
pub use patient_service::{MockPatientCommand, MockPatientQuery};
pub use patient_service::{PatientCommand, PatientQuery};
#[cfg(test)]
pub use token_issuer::MockTokenIssuer;
pub use token_issuer::{TokenError, TokenIssuer};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
