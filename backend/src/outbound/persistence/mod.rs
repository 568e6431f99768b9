//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Repository implementations only translate between Diesel rows and domain
//! types. Row structs (`models.rs`) and table definitions (`schema.rs`) stay
//! private to this module, and every database error is mapped to the owning
//! port's error type.
//!
//! # Example
//!
//! ```rust,no_run
//! use healthcare_backend::outbound::persistence::{
//!     DbPool, DieselPatientRepository, PoolConfig, run_migrations,
//! };
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let url = "postgres://localhost/records";
//! run_migrations(url).await?;
//! let pool = DbPool::new(PoolConfig::new(url)).await?;
//! let patients = DieselPatientRepository::new(pool);
//! # let _ = patients;
//! # Ok(())
//! # }
//! ```

mod diesel_doctor_repository;
mod diesel_error_mapping;
mod diesel_mapping_repository;
mod diesel_patient_repository;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_doctor_repository::DieselDoctorRepository;
pub use diesel_mapping_repository::DieselMappingRepository;
pub use diesel_patient_repository::DieselPatientRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MIGRATIONS, MigrationError, run_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
