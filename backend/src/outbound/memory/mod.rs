//! In-process store implementing every repository port.
//!
//! Used when no database URL is configured and by the HTTP test suites. All
//! tables sit behind one mutex, so each port call is atomic with respect to
//! the others, the same guarantee the Diesel adapters get from constraints
//! and transactions.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::access::OwnerScope;
use crate::domain::ports::{
    DoctorRepository, DoctorRepositoryError, MappingRepository, MappingRepositoryError,
    PatientRepository, PatientRepositoryError, UserPersistenceError, UserRepository,
};
use crate::domain::{
    Assignment, Doctor, DoctorId, EmailAddress, Mapping, MappingId, Patient, PatientId, User,
    UserAccount, UserId,
};

#[derive(Default)]
struct Tables {
    users: HashMap<UserId, UserAccount>,
    patients: HashMap<PatientId, Patient>,
    doctors: HashMap<DoctorId, Doctor>,
    mappings: HashMap<MappingId, Assignment>,
}

impl Tables {
    fn read_model(&self, assignment: &Assignment) -> Option<Mapping> {
        let patient = self.patients.get(&assignment.patient)?;
        let doctor = self.doctors.get(&assignment.doctor)?;
        Some(Mapping::new(
            *assignment,
            patient.details().name(),
            doctor.details().name(),
        ))
    }

    fn patient_in_scope(&self, scope: &OwnerScope, id: &PatientId) -> bool {
        self.patients
            .get(id)
            .is_some_and(|patient| scope.is_owner(&patient.owner()))
    }

    fn mapping_in_scope(&self, scope: &OwnerScope, id: &MappingId) -> bool {
        self.mappings
            .get(id)
            .is_some_and(|assignment| self.patient_in_scope(scope, &assignment.patient))
    }

    fn check_assignment(
        &self,
        scope: &OwnerScope,
        assignment: &Assignment,
    ) -> Result<(), MappingRepositoryError> {
        if !self.patient_in_scope(scope, &assignment.patient) {
            return Err(MappingRepositoryError::patient_out_of_scope());
        }
        if !self.doctors.contains_key(&assignment.doctor) {
            return Err(MappingRepositoryError::unknown_doctor());
        }
        let taken = self.mappings.values().any(|existing| {
            existing.id != assignment.id
                && existing.patient == assignment.patient
                && existing.doctor == assignment.doctor
        });
        if taken {
            return Err(MappingRepositoryError::duplicate_pair());
        }
        Ok(())
    }

    fn doctor_email_taken(&self, doctor: &Doctor) -> bool {
        self.doctors.values().any(|existing| {
            existing.id() != doctor.id() && existing.details().email() == doctor.details().email()
        })
    }
}

/// Shared in-memory tables for users, patients, doctors and mappings.
#[derive(Default)]
pub struct InMemoryStore {
    tables: Mutex<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock<E>(
        &self,
        poisoned: impl FnOnce(&'static str) -> E,
    ) -> Result<MutexGuard<'_, Tables>, E> {
        self.tables
            .lock()
            .map_err(|_| poisoned("in-memory store lock poisoned"))
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn insert(&self, account: &UserAccount) -> Result<(), UserPersistenceError> {
        let mut tables = self.lock(UserPersistenceError::query)?;
        let user = account.user();
        if tables
            .users
            .values()
            .any(|existing| existing.user().email() == user.email())
        {
            return Err(UserPersistenceError::duplicate_email());
        }
        if tables
            .users
            .values()
            .any(|existing| existing.user().username() == user.username())
        {
            return Err(UserPersistenceError::duplicate_username());
        }
        tables.users.insert(user.id(), account.clone());
        Ok(())
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<UserAccount>, UserPersistenceError> {
        let tables = self.lock(UserPersistenceError::query)?;
        Ok(tables
            .users
            .values()
            .find(|account| account.user().email() == email)
            .cloned())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let tables = self.lock(UserPersistenceError::query)?;
        Ok(tables.users.get(id).map(|account| account.user().clone()))
    }
}

#[async_trait]
impl PatientRepository for InMemoryStore {
    async fn list(&self, scope: &OwnerScope) -> Result<Vec<Patient>, PatientRepositoryError> {
        let tables = self.lock(PatientRepositoryError::query)?;
        let mut owned: Vec<Patient> = tables
            .patients
            .values()
            .filter(|patient| scope.is_owner(&patient.owner()))
            .cloned()
            .collect();
        owned.sort_by_key(|patient| (patient.created_at(), patient.id()));
        Ok(owned)
    }

    async fn find(
        &self,
        scope: &OwnerScope,
        id: &PatientId,
    ) -> Result<Option<Patient>, PatientRepositoryError> {
        let tables = self.lock(PatientRepositoryError::query)?;
        Ok(tables
            .patients
            .get(id)
            .filter(|patient| scope.is_owner(&patient.owner()))
            .cloned())
    }

    async fn insert(
        &self,
        scope: &OwnerScope,
        patient: &Patient,
    ) -> Result<(), PatientRepositoryError> {
        if !scope.is_owner(&patient.owner()) {
            return Err(PatientRepositoryError::query(
                "patient owner does not match the write scope",
            ));
        }
        let mut tables = self.lock(PatientRepositoryError::query)?;
        tables.patients.insert(patient.id(), patient.clone());
        Ok(())
    }

    async fn update(
        &self,
        scope: &OwnerScope,
        patient: &Patient,
    ) -> Result<bool, PatientRepositoryError> {
        let mut tables = self.lock(PatientRepositoryError::query)?;
        match tables.patients.get_mut(&patient.id()) {
            Some(stored) if scope.is_owner(&stored.owner()) && scope.is_owner(&patient.owner()) => {
                *stored = patient.clone();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete(
        &self,
        scope: &OwnerScope,
        id: &PatientId,
    ) -> Result<bool, PatientRepositoryError> {
        let mut tables = self.lock(PatientRepositoryError::query)?;
        if !tables.patient_in_scope(scope, id) {
            return Ok(false);
        }
        tables.patients.remove(id);
        tables.mappings.retain(|_, assignment| assignment.patient != *id);
        Ok(true)
    }

    async fn owner_of(&self, id: &PatientId) -> Result<Option<UserId>, PatientRepositoryError> {
        let tables = self.lock(PatientRepositoryError::query)?;
        Ok(tables.patients.get(id).map(Patient::owner))
    }
}

#[async_trait]
impl DoctorRepository for InMemoryStore {
    async fn list(&self) -> Result<Vec<Doctor>, DoctorRepositoryError> {
        let tables = self.lock(DoctorRepositoryError::query)?;
        let mut doctors: Vec<Doctor> = tables.doctors.values().cloned().collect();
        doctors.sort_by_key(|doctor| (doctor.created_at(), doctor.id()));
        Ok(doctors)
    }

    async fn find(&self, id: &DoctorId) -> Result<Option<Doctor>, DoctorRepositoryError> {
        let tables = self.lock(DoctorRepositoryError::query)?;
        Ok(tables.doctors.get(id).cloned())
    }

    async fn insert(&self, doctor: &Doctor) -> Result<(), DoctorRepositoryError> {
        let mut tables = self.lock(DoctorRepositoryError::query)?;
        if tables.doctor_email_taken(doctor) {
            return Err(DoctorRepositoryError::duplicate_email());
        }
        tables.doctors.insert(doctor.id(), doctor.clone());
        Ok(())
    }

    async fn update(&self, doctor: &Doctor) -> Result<bool, DoctorRepositoryError> {
        let mut tables = self.lock(DoctorRepositoryError::query)?;
        if !tables.doctors.contains_key(&doctor.id()) {
            return Ok(false);
        }
        if tables.doctor_email_taken(doctor) {
            return Err(DoctorRepositoryError::duplicate_email());
        }
        tables.doctors.insert(doctor.id(), doctor.clone());
        Ok(true)
    }

    async fn delete(&self, id: &DoctorId) -> Result<bool, DoctorRepositoryError> {
        let mut tables = self.lock(DoctorRepositoryError::query)?;
        if tables.doctors.remove(id).is_none() {
            return Ok(false);
        }
        tables.mappings.retain(|_, assignment| assignment.doctor != *id);
        Ok(true)
    }
}

#[async_trait]
impl MappingRepository for InMemoryStore {
    async fn list(&self, scope: &OwnerScope) -> Result<Vec<Mapping>, MappingRepositoryError> {
        let tables = self.lock(MappingRepositoryError::query)?;
        let mut visible: Vec<Mapping> = tables
            .mappings
            .values()
            .filter(|assignment| tables.patient_in_scope(scope, &assignment.patient))
            .filter_map(|assignment| tables.read_model(assignment))
            .collect();
        visible.sort_by_key(|mapping| (mapping.assigned_at(), mapping.id()));
        Ok(visible)
    }

    async fn find(
        &self,
        scope: &OwnerScope,
        id: &MappingId,
    ) -> Result<Option<Mapping>, MappingRepositoryError> {
        let tables = self.lock(MappingRepositoryError::query)?;
        if !tables.mapping_in_scope(scope, id) {
            return Ok(None);
        }
        Ok(tables
            .mappings
            .get(id)
            .and_then(|assignment| tables.read_model(assignment)))
    }

    async fn insert(
        &self,
        scope: &OwnerScope,
        assignment: &Assignment,
    ) -> Result<Mapping, MappingRepositoryError> {
        let mut tables = self.lock(MappingRepositoryError::query)?;
        tables.check_assignment(scope, assignment)?;
        tables.mappings.insert(assignment.id, *assignment);
        tables
            .read_model(assignment)
            .ok_or_else(|| MappingRepositoryError::query("inserted mapping is not readable"))
    }

    async fn update(
        &self,
        scope: &OwnerScope,
        assignment: &Assignment,
    ) -> Result<Option<Mapping>, MappingRepositoryError> {
        let mut tables = self.lock(MappingRepositoryError::query)?;
        if !tables.mapping_in_scope(scope, &assignment.id) {
            return Ok(None);
        }
        tables.check_assignment(scope, assignment)?;
        tables.mappings.insert(assignment.id, *assignment);
        Ok(tables.read_model(assignment))
    }

    async fn delete(
        &self,
        scope: &OwnerScope,
        id: &MappingId,
    ) -> Result<bool, MappingRepositoryError> {
        let mut tables = self.lock(MappingRepositoryError::query)?;
        if !tables.mapping_in_scope(scope, id) {
            return Ok(false);
        }
        Ok(tables.mappings.remove(id).is_some())
    }
}
