//! Patient-doctor assignment records.
//!
//! A mapping is visible to the owner of its patient. The `(patient, doctor)`
//! pair is unique across the store.

use chrono::{DateTime, Utc};

use crate::domain::access::{Operation, PermissionLevel, Resource, ResourceKind};
use crate::domain::{DoctorId, MappingId, PatientId};

/// Message used when a caller assigns a doctor to someone else's patient.
pub const FOREIGN_PATIENT: &str = "you can only assign doctors to your own patients";

/// Requested assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MappingDraft {
    pub patient: PatientId,
    pub doctor: DoctorId,
}

/// Partial reassignment; `None` keeps the stored side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MappingChanges {
    pub patient: Option<PatientId>,
    pub doctor: Option<DoctorId>,
}

impl From<MappingDraft> for MappingChanges {
    fn from(value: MappingDraft) -> Self {
        Self {
            patient: Some(value.patient),
            doctor: Some(value.doctor),
        }
    }
}

/// Write model persisted by mapping repositories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assignment {
    pub id: MappingId,
    pub patient: PatientId,
    pub doctor: DoctorId,
    pub assigned_at: DateTime<Utc>,
}

/// Read model: the assignment plus the names of both sides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mapping {
    assignment: Assignment,
    patient_name: String,
    doctor_name: String,
}

impl Mapping {
    pub fn new(
        assignment: Assignment,
        patient_name: impl Into<String>,
        doctor_name: impl Into<String>,
    ) -> Self {
        Self {
            assignment,
            patient_name: patient_name.into(),
            doctor_name: doctor_name.into(),
        }
    }

    pub fn id(&self) -> MappingId {
        self.assignment.id
    }

    pub fn patient(&self) -> PatientId {
        self.assignment.patient
    }

    pub fn doctor(&self) -> DoctorId {
        self.assignment.doctor
    }

    pub fn assigned_at(&self) -> DateTime<Utc> {
        self.assignment.assigned_at
    }

    pub fn patient_name(&self) -> &str {
        &self.patient_name
    }

    pub fn doctor_name(&self) -> &str {
        &self.doctor_name
    }

    pub fn assignment(&self) -> &Assignment {
        &self.assignment
    }

    /// Assignment with `changes` applied; id and timestamp are kept.
    pub fn reassigned(&self, changes: MappingChanges) -> Assignment {
        Assignment {
            patient: changes.patient.unwrap_or(self.assignment.patient),
            doctor: changes.doctor.unwrap_or(self.assignment.doctor),
            ..self.assignment
        }
    }
}

impl Resource for Mapping {
    const KIND: ResourceKind = ResourceKind::Mapping;

    fn permission(_operation: Operation) -> PermissionLevel {
        PermissionLevel::Owner
    }
}
