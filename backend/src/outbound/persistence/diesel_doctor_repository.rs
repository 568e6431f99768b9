//! PostgreSQL-backed `DoctorRepository` implementation.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{DoctorRepository, DoctorRepositoryError};
use crate::domain::{Doctor, DoctorDetails, DoctorDraft, DoctorId};

use super::diesel_error_mapping::{classify_diesel_error, map_basic_pool_error};
use super::models::{DoctorRow, DoctorUpdate};
use super::pool::{DbPool, PoolError};
use super::schema::{constraints, doctors};

/// Diesel-backed doctor directory.
#[derive(Clone)]
pub struct DieselDoctorRepository {
    pool: DbPool,
}

impl DieselDoctorRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> DoctorRepositoryError {
    map_basic_pool_error(error, DoctorRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> DoctorRepositoryError {
    match classify_diesel_error(error) {
        failure if failure.is_unique(constraints::DOCTORS_EMAIL) => {
            DoctorRepositoryError::duplicate_email()
        }
        failure => {
            failure.into_basic(DoctorRepositoryError::query, DoctorRepositoryError::connection)
        }
    }
}

fn row_to_doctor(row: DoctorRow) -> Result<Doctor, DoctorRepositoryError> {
    let id = DoctorId::from_uuid(row.id);
    let created_at = row.created_at;
    let details = DoctorDetails::try_from_draft(&DoctorDraft {
        name: row.name,
        specialization: row.specialization,
        phone: row.phone,
        email: row.email,
    })
    .map_err(|error| {
        DoctorRepositoryError::query(format!("stored doctor {id} is invalid: {error}"))
    })?;
    Ok(Doctor::new(id, details, created_at))
}

fn doctor_to_row(doctor: &Doctor) -> DoctorRow {
    let details = doctor.details();
    DoctorRow {
        id: *doctor.id().as_uuid(),
        name: details.name().to_owned(),
        specialization: details.specialization().to_owned(),
        phone: details.phone().to_owned(),
        email: details.email().as_ref().to_owned(),
        created_at: doctor.created_at(),
    }
}

#[async_trait]
impl DoctorRepository for DieselDoctorRepository {
    async fn list(&self) -> Result<Vec<Doctor>, DoctorRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<DoctorRow> = doctors::table
            .order((doctors::created_at.asc(), doctors::id.asc()))
            .select(DoctorRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_doctor).collect()
    }

    async fn find(&self, id: &DoctorId) -> Result<Option<Doctor>, DoctorRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<DoctorRow> = doctors::table
            .filter(doctors::id.eq(id.as_uuid()))
            .select(DoctorRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_doctor).transpose()
    }

    async fn insert(&self, doctor: &Doctor) -> Result<(), DoctorRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::insert_into(doctors::table)
            .values(&doctor_to_row(doctor))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn update(&self, doctor: &Doctor) -> Result<bool, DoctorRepositoryError> {
        let details = doctor.details();
        let changes = DoctorUpdate {
            name: details.name(),
            specialization: details.specialization(),
            phone: details.phone(),
            email: details.email().as_ref(),
        };
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let updated = diesel::update(doctors::table.filter(doctors::id.eq(doctor.id().as_uuid())))
            .set(&changes)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(updated > 0)
    }

    async fn delete(&self, id: &DoctorId) -> Result<bool, DoctorRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let deleted = diesel::delete(doctors::table.filter(doctors::id.eq(id.as_uuid())))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(deleted > 0)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rstest::rstest;
    use uuid::Uuid;

    use super::*;

    fn row(email: &str) -> DoctorRow {
        DoctorRow {
            id: Uuid::new_v4(),
            name: "Dr K".to_owned(),
            specialization: "Cardiology".to_owned(),
            phone: "555-0100".to_owned(),
            email: email.to_owned(),
            created_at: Utc::now(),
        }
    }

    #[rstest]
    fn rows_convert_both_ways() {
        let original = row("k@clinic.example");
        let doctor = row_to_doctor(original.clone()).expect("row converts");
        let back = doctor_to_row(&doctor);

        assert_eq!(back.id, original.id);
        assert_eq!(back.email, original.email);
        assert_eq!(back.phone, "555-0100");
    }

    #[rstest]
    fn corrupt_rows_are_query_errors() {
        let error = row_to_doctor(row("nope")).expect_err("invalid email");

        assert!(matches!(error, DoctorRepositoryError::Query { .. }));
    }
}
