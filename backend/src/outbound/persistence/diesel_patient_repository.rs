//! PostgreSQL-backed `PatientRepository` implementation.
//!
//! Every statement carries `owner_id = scope.owner()` so the ownership filter
//! lives in SQL rather than in post-filtering.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::access::OwnerScope;
use crate::domain::ports::{PatientRepository, PatientRepositoryError};
use crate::domain::{Patient, PatientDetails, PatientId, UserId};

use super::diesel_error_mapping::{classify_diesel_error, map_basic_pool_error};
use super::models::{PatientRow, PatientUpdate};
use super::pool::{DbPool, PoolError};
use super::schema::patients;

/// Diesel-backed patient store.
#[derive(Clone)]
pub struct DieselPatientRepository {
    pool: DbPool,
}

impl DieselPatientRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> PatientRepositoryError {
    map_basic_pool_error(error, PatientRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> PatientRepositoryError {
    classify_diesel_error(error).into_basic(
        PatientRepositoryError::query,
        PatientRepositoryError::connection,
    )
}

fn age_to_column(age: u32) -> Result<i32, PatientRepositoryError> {
    i32::try_from(age)
        .map_err(|_| PatientRepositoryError::query(format!("age {age} exceeds column range")))
}

fn row_to_patient(row: PatientRow) -> Result<Patient, PatientRepositoryError> {
    let age = u32::try_from(row.age).map_err(|_| {
        PatientRepositoryError::query(format!("stored age {} is negative", row.age))
    })?;
    let details = PatientDetails::from_trusted(row.name, age, row.gender, row.address);
    Ok(Patient::new(
        PatientId::from_uuid(row.id),
        UserId::from_uuid(row.owner_id),
        details,
        row.created_at,
    ))
}

fn patient_to_row(patient: &Patient) -> Result<PatientRow, PatientRepositoryError> {
    let details = patient.details();
    Ok(PatientRow {
        id: *patient.id().as_uuid(),
        owner_id: *patient.owner().as_uuid(),
        name: details.name().to_owned(),
        age: age_to_column(details.age())?,
        gender: details.gender().to_owned(),
        address: details.address().to_owned(),
        created_at: patient.created_at(),
    })
}

fn ensure_scope_owns(scope: &OwnerScope, patient: &Patient) -> Result<(), PatientRepositoryError> {
    if scope.is_owner(&patient.owner()) {
        Ok(())
    } else {
        Err(PatientRepositoryError::query(
            "patient owner does not match the write scope",
        ))
    }
}

#[async_trait]
impl PatientRepository for DieselPatientRepository {
    async fn list(&self, scope: &OwnerScope) -> Result<Vec<Patient>, PatientRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<PatientRow> = patients::table
            .filter(patients::owner_id.eq(scope.owner().as_uuid()))
            .order((patients::created_at.asc(), patients::id.asc()))
            .select(PatientRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_patient).collect()
    }

    async fn find(
        &self,
        scope: &OwnerScope,
        id: &PatientId,
    ) -> Result<Option<Patient>, PatientRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<PatientRow> = patients::table
            .filter(patients::id.eq(id.as_uuid()))
            .filter(patients::owner_id.eq(scope.owner().as_uuid()))
            .select(PatientRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_patient).transpose()
    }

    async fn insert(
        &self,
        scope: &OwnerScope,
        patient: &Patient,
    ) -> Result<(), PatientRepositoryError> {
        ensure_scope_owns(scope, patient)?;
        let row = patient_to_row(patient)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::insert_into(patients::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn update(
        &self,
        scope: &OwnerScope,
        patient: &Patient,
    ) -> Result<bool, PatientRepositoryError> {
        ensure_scope_owns(scope, patient)?;
        let details = patient.details();
        let changes = PatientUpdate {
            name: details.name(),
            age: age_to_column(details.age())?,
            gender: details.gender(),
            address: details.address(),
        };
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let updated = diesel::update(
            patients::table
                .filter(patients::id.eq(patient.id().as_uuid()))
                .filter(patients::owner_id.eq(scope.owner().as_uuid())),
        )
        .set(&changes)
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;

        Ok(updated > 0)
    }

    async fn delete(
        &self,
        scope: &OwnerScope,
        id: &PatientId,
    ) -> Result<bool, PatientRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        // Mappings go with the patient through ON DELETE CASCADE.
        let deleted = diesel::delete(
            patients::table
                .filter(patients::id.eq(id.as_uuid()))
                .filter(patients::owner_id.eq(scope.owner().as_uuid())),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;

        Ok(deleted > 0)
    }

    async fn owner_of(&self, id: &PatientId) -> Result<Option<UserId>, PatientRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let owner: Option<uuid::Uuid> = patients::table
            .filter(patients::id.eq(id.as_uuid()))
            .select(patients::owner_id)
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        Ok(owner.map(UserId::from_uuid))
    }
}
