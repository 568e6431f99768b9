//! Patient records owned by a single user account.

use std::fmt;

use chrono::{DateTime, Utc};

use crate::domain::access::{Operation, PermissionLevel, Resource, ResourceKind};
use crate::domain::validation::{FieldViolation, TextViolation, bounded_text};
use crate::domain::{PatientId, UserId};

pub const PATIENT_NAME_MAX: usize = 255;
pub const GENDER_MAX: usize = 10;
/// Upper bound shared with the `INTEGER` storage column.
pub const AGE_MAX: i64 = i32::MAX as i64;
/// Address is free text; the bound only guards against abuse.
pub const ADDRESS_MAX: usize = 4096;

/// Validation failures for patient fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatientValidationError {
    Name(TextViolation),
    Age { value: i64 },
    Gender(TextViolation),
    Address(TextViolation),
}

impl fmt::Display for PatientValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(violation) => write!(f, "name {violation}"),
            Self::Age { value } if *value < 0 => {
                write!(f, "age must be a non-negative integer, got {value}")
            }
            Self::Age { value } => write!(f, "age must be at most {AGE_MAX}, got {value}"),
            Self::Gender(violation) => write!(f, "gender {violation}"),
            Self::Address(violation) => write!(f, "address {violation}"),
        }
    }
}

impl std::error::Error for PatientValidationError {}

impl FieldViolation for PatientValidationError {
    fn field(&self) -> &'static str {
        match self {
            Self::Name(_) => "name",
            Self::Age { .. } => "age",
            Self::Gender(_) => "gender",
            Self::Address(_) => "address",
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::Name(violation) | Self::Gender(violation) | Self::Address(violation) => {
                violation.code()
            }
            Self::Age { value } if *value < 0 => "negative",
            Self::Age { .. } => "out_of_range",
        }
    }
}

/// Raw patient fields as submitted by a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatientDraft {
    pub name: String,
    pub age: i64,
    pub gender: String,
    pub address: String,
}

/// Partial update; `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatientChanges {
    pub name: Option<String>,
    pub age: Option<i64>,
    pub gender: Option<String>,
    pub address: Option<String>,
}

impl From<PatientDraft> for PatientChanges {
    fn from(value: PatientDraft) -> Self {
        Self {
            name: Some(value.name),
            age: Some(value.age),
            gender: Some(value.gender),
            address: Some(value.address),
        }
    }
}

/// Validated, owner-independent patient fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatientDetails {
    name: String,
    age: u32,
    gender: String,
    address: String,
}

fn validate_age(value: i64) -> Result<u32, PatientValidationError> {
    if !(0..=AGE_MAX).contains(&value) {
        return Err(PatientValidationError::Age { value });
    }
    u32::try_from(value).map_err(|_| PatientValidationError::Age { value })
}

impl PatientDetails {
    /// Validate every field of a draft, in declaration order.
    pub fn try_from_draft(draft: &PatientDraft) -> Result<Self, PatientValidationError> {
        Ok(Self {
            name: bounded_text(&draft.name, PATIENT_NAME_MAX)
                .map_err(PatientValidationError::Name)?,
            age: validate_age(draft.age)?,
            gender: bounded_text(&draft.gender, GENDER_MAX)
                .map_err(PatientValidationError::Gender)?,
            address: bounded_text(&draft.address, ADDRESS_MAX)
                .map_err(PatientValidationError::Address)?,
        })
    }

    /// Reassemble details already validated by storage.
    pub fn from_trusted(name: String, age: u32, gender: String, address: String) -> Self {
        Self {
            name,
            age,
            gender,
            address,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn age(&self) -> u32 {
        self.age
    }

    pub fn gender(&self) -> &str {
        &self.gender
    }

    pub fn address(&self) -> &str {
        &self.address
    }
}

/// Stored patient record.
///
/// ## Invariants
/// - `owner` is fixed at creation and never reassigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patient {
    id: PatientId,
    owner: UserId,
    details: PatientDetails,
    created_at: DateTime<Utc>,
}

impl Patient {
    pub fn new(
        id: PatientId,
        owner: UserId,
        details: PatientDetails,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            owner,
            details,
            created_at,
        }
    }

    pub fn id(&self) -> PatientId {
        self.id
    }

    pub fn owner(&self) -> UserId {
        self.owner
    }

    pub fn details(&self) -> &PatientDetails {
        &self.details
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Produce an updated copy; owner, id and creation time are preserved.
    pub fn apply(&self, changes: PatientChanges) -> Result<Self, PatientValidationError> {
        let draft = PatientDraft {
            name: changes.name.unwrap_or_else(|| self.details.name.clone()),
            age: changes.age.unwrap_or(i64::from(self.details.age)),
            gender: changes.gender.unwrap_or_else(|| self.details.gender.clone()),
            address: changes
                .address
                .unwrap_or_else(|| self.details.address.clone()),
        };
        Ok(Self {
            details: PatientDetails::try_from_draft(&draft)?,
            ..self.clone()
        })
    }
}

impl Resource for Patient {
    const KIND: ResourceKind = ResourceKind::Patient;

    fn permission(_operation: Operation) -> PermissionLevel {
        PermissionLevel::Owner
    }
}
