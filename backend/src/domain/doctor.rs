//! Doctor directory entries.
//!
//! Doctors are not owned by any account. Reads are public and writes need an
//! authenticated caller, see [`doctor_access`](crate::domain::access::doctor_access).

use std::fmt;

use chrono::{DateTime, Utc};

use crate::domain::access::{Operation, PermissionLevel, Resource, ResourceKind, doctor_access};
use crate::domain::validation::{FieldViolation, TextViolation, bounded_text};
use crate::domain::{DoctorId, EmailAddress, UserValidationError};

pub const DOCTOR_NAME_MAX: usize = 255;
pub const SPECIALIZATION_MAX: usize = 255;
pub const PHONE_MAX: usize = 20;

/// Validation failures for doctor fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DoctorValidationError {
    Name(TextViolation),
    Specialization(TextViolation),
    Phone(TextViolation),
    Email(UserValidationError),
}

impl fmt::Display for DoctorValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(violation) => write!(f, "name {violation}"),
            Self::Specialization(violation) => write!(f, "specialization {violation}"),
            Self::Phone(violation) => write!(f, "phone {violation}"),
            Self::Email(inner) => fmt::Display::fmt(inner, f),
        }
    }
}

impl std::error::Error for DoctorValidationError {}

impl FieldViolation for DoctorValidationError {
    fn field(&self) -> &'static str {
        match self {
            Self::Name(_) => "name",
            Self::Specialization(_) => "specialization",
            Self::Phone(_) => "phone",
            Self::Email(_) => "email",
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::Name(violation) | Self::Specialization(violation) | Self::Phone(violation) => {
                violation.code()
            }
            Self::Email(inner) => inner.code(),
        }
    }
}

/// Raw doctor fields as submitted by a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoctorDraft {
    pub name: String,
    pub specialization: String,
    pub phone: String,
    pub email: String,
}

/// Partial update; `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DoctorChanges {
    pub name: Option<String>,
    pub specialization: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

impl From<DoctorDraft> for DoctorChanges {
    fn from(value: DoctorDraft) -> Self {
        Self {
            name: Some(value.name),
            specialization: Some(value.specialization),
            phone: Some(value.phone),
            email: Some(value.email),
        }
    }
}

/// Validated doctor fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoctorDetails {
    name: String,
    specialization: String,
    phone: String,
    email: EmailAddress,
}

impl DoctorDetails {
    pub fn try_from_draft(draft: &DoctorDraft) -> Result<Self, DoctorValidationError> {
        Ok(Self {
            name: bounded_text(&draft.name, DOCTOR_NAME_MAX)
                .map_err(DoctorValidationError::Name)?,
            specialization: bounded_text(&draft.specialization, SPECIALIZATION_MAX)
                .map_err(DoctorValidationError::Specialization)?,
            phone: bounded_text(&draft.phone, PHONE_MAX).map_err(DoctorValidationError::Phone)?,
            email: EmailAddress::new(&draft.email).map_err(DoctorValidationError::Email)?,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn specialization(&self) -> &str {
        &self.specialization
    }

    pub fn phone(&self) -> &str {
        &self.phone
    }

    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    fn to_draft(&self) -> DoctorDraft {
        DoctorDraft {
            name: self.name.clone(),
            specialization: self.specialization.clone(),
            phone: self.phone.clone(),
            email: self.email.as_ref().to_owned(),
        }
    }
}

/// Stored doctor entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Doctor {
    id: DoctorId,
    details: DoctorDetails,
    created_at: DateTime<Utc>,
}

impl Doctor {
    pub fn new(id: DoctorId, details: DoctorDetails, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            details,
            created_at,
        }
    }

    pub fn id(&self) -> DoctorId {
        self.id
    }

    pub fn details(&self) -> &DoctorDetails {
        &self.details
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Produce an updated copy with `changes` merged over the stored fields.
    pub fn apply(&self, changes: DoctorChanges) -> Result<Self, DoctorValidationError> {
        let current = self.details.to_draft();
        let draft = DoctorDraft {
            name: changes.name.unwrap_or(current.name),
            specialization: changes.specialization.unwrap_or(current.specialization),
            phone: changes.phone.unwrap_or(current.phone),
            email: changes.email.unwrap_or(current.email),
        };
        Ok(Self {
            details: DoctorDetails::try_from_draft(&draft)?,
            ..self.clone()
        })
    }
}

impl Resource for Doctor {
    const KIND: ResourceKind = ResourceKind::Doctor;

    fn permission(operation: Operation) -> PermissionLevel {
        doctor_access(operation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn draft() -> DoctorDraft {
        DoctorDraft {
            name: "Dr K".into(),
            specialization: "Cardiology".into(),
            phone: "+44 20 7946 0000".into(),
            email: "Dr.K@Clinic.example".into(),
        }
    }

    #[rstest]
    fn normalises_email(draft: DoctorDraft) {
        let details = DoctorDetails::try_from_draft(&draft).expect("valid draft");
        assert_eq!(details.email().as_ref(), "dr.k@clinic.example");
    }

    #[rstest]
    fn rejects_long_phone(mut draft: DoctorDraft) {
        draft.phone = "0".repeat(PHONE_MAX + 1);
        let err = DoctorDetails::try_from_draft(&draft).expect_err("phone too long");
        assert_eq!(err.field(), "phone");
        assert_eq!(err.code(), "too_long");
    }

    #[rstest]
    fn rejects_malformed_email(mut draft: DoctorDraft) {
        draft.email = "not-an-email".into();
        let err = DoctorDetails::try_from_draft(&draft).expect_err("bad email");
        assert_eq!(err.field(), "email");
        assert_eq!(err.code(), "invalid_email");
    }

    #[rstest]
    fn apply_merges_partial_changes(draft: DoctorDraft) {
        let doctor = Doctor::new(
            DoctorId::random(),
            DoctorDetails::try_from_draft(&draft).expect("valid draft"),
            Utc::now(),
        );
        let updated = doctor
            .apply(DoctorChanges {
                specialization: Some("Oncology".into()),
                ..DoctorChanges::default()
            })
            .expect("valid change");
        assert_eq!(updated.details().specialization(), "Oncology");
        assert_eq!(updated.details().name(), "Dr K");
        assert_eq!(updated.id(), doctor.id());
    }
}
