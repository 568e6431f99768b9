//! Domain primitives, aggregates and use-case services.
//!
//! Purpose: Define strongly typed entities shared by the HTTP and persistence
//! adapters, the access policy that guards them, and the services that drive
//! the ports. Nothing in here depends on Actix or Diesel.
//!
//! Public surface:
//! - Error / ErrorCode: API error payload and its stable identifiers.
//! - User, Patient, Doctor, Mapping: stored records and their drafts.
//! - access: per-resource permission levels and [`access::OwnerScope`].
//! - ports: driving and driven traits at the hexagonal boundary.

pub mod access;
mod account_service;
mod auth;
mod doctor;
mod doctor_service;
pub mod error;
mod identifier;
mod mapping;
mod mapping_service;
mod password_policy;
mod patient;
mod patient_service;
pub mod ports;
mod trace_id;
mod user;
pub mod validation;

pub use self::account_service::AccountService;
pub use self::auth::{
    INVALID_CREDENTIALS, INVALID_TOKEN, LoginCredentials, LoginOutcome, LoginValidationError,
    Registration, RegistrationDraft, RegistrationError, TokenKind, TokenPair,
    duplicate_account_field,
};
pub use self::doctor::{
    DOCTOR_NAME_MAX, Doctor, DoctorChanges, DoctorDetails, DoctorDraft, DoctorValidationError,
    PHONE_MAX, SPECIALIZATION_MAX,
};
pub use self::doctor_service::DoctorService;
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::identifier::{DoctorId, IdentifierError, MappingId, PatientId, UserId};
pub use self::mapping::{Assignment, FOREIGN_PATIENT, Mapping, MappingChanges, MappingDraft};
pub use self::mapping_service::MappingService;
pub use self::password_policy::{
    DEFAULT_MIN_LENGTH, PasswordPolicy, PasswordRejected, PasswordRule, UserAttributes,
};
pub use self::patient::{
    ADDRESS_MAX, AGE_MAX, GENDER_MAX, PATIENT_NAME_MAX, Patient, PatientChanges, PatientDetails,
    PatientDraft, PatientValidationError,
};
pub use self::patient_service::PatientService;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    DISPLAY_NAME_MAX, DisplayName, EMAIL_MAX, EmailAddress, USERNAME_MAX, User, UserAccount,
    UserValidationError, Username,
};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use healthcare_backend::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
