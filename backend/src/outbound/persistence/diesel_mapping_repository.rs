//! PostgreSQL-backed `MappingRepository` implementation.
//!
//! Reads join both sides to expose patient and doctor names, filtered on the
//! patient's owner. Writes re-check patient ownership inside the same
//! transaction as the insert or update.

use async_trait::async_trait;
use diesel::dsl::exists;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::access::OwnerScope;
use crate::domain::ports::{MappingRepository, MappingRepositoryError};
use crate::domain::{Assignment, DoctorId, Mapping, MappingId, PatientId};

use super::diesel_error_mapping::{classify_diesel_error, map_basic_pool_error};
use super::models::{MappingReadRow, MappingRow};
use super::pool::{DbPool, PoolError};
use super::schema::{constraints, doctors, patient_doctor_mappings, patients};

/// Diesel-backed assignment store.
#[derive(Clone)]
pub struct DieselMappingRepository {
    pool: DbPool,
}

impl DieselMappingRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Failure inside a write transaction.
#[derive(Debug)]
enum WriteFailure {
    Diesel(diesel::result::Error),
    PatientOutOfScope,
}

impl From<diesel::result::Error> for WriteFailure {
    fn from(value: diesel::result::Error) -> Self {
        Self::Diesel(value)
    }
}

fn map_pool_error(error: PoolError) -> MappingRepositoryError {
    map_basic_pool_error(error, MappingRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> MappingRepositoryError {
    match classify_diesel_error(error) {
        failure if failure.is_unique(constraints::MAPPING_PAIR) => {
            MappingRepositoryError::duplicate_pair()
        }
        failure if failure.is_foreign_key(constraints::MAPPING_DOCTOR_FK) => {
            MappingRepositoryError::unknown_doctor()
        }
        failure if failure.is_foreign_key(constraints::MAPPING_PATIENT_FK) => {
            MappingRepositoryError::patient_out_of_scope()
        }
        failure => {
            failure.into_basic(MappingRepositoryError::query, MappingRepositoryError::connection)
        }
    }
}

fn map_write_failure(failure: WriteFailure) -> MappingRepositoryError {
    match failure {
        WriteFailure::Diesel(error) => map_diesel_error(error),
        WriteFailure::PatientOutOfScope => MappingRepositoryError::patient_out_of_scope(),
    }
}

fn read_row_to_mapping((row, patient_name, doctor_name): MappingReadRow) -> Mapping {
    let assignment = Assignment {
        id: MappingId::from_uuid(row.id),
        patient: PatientId::from_uuid(row.patient_id),
        doctor: DoctorId::from_uuid(row.doctor_id),
        assigned_at: row.assigned_at,
    };
    Mapping::new(assignment, patient_name, doctor_name)
}

fn assignment_to_row(assignment: &Assignment) -> MappingRow {
    MappingRow {
        id: *assignment.id.as_uuid(),
        patient_id: *assignment.patient.as_uuid(),
        doctor_id: *assignment.doctor.as_uuid(),
        assigned_at: assignment.assigned_at,
    }
}

/// Mappings whose patient belongs to `owner`, optionally narrowed to one id.
async fn load_visible(
    conn: &mut AsyncPgConnection,
    owner: Uuid,
    id: Option<Uuid>,
) -> QueryResult<Vec<MappingReadRow>> {
    let mut query = patient_doctor_mappings::table
        .inner_join(patients::table)
        .inner_join(doctors::table)
        .filter(patients::owner_id.eq(owner))
        .select((MappingRow::as_select(), patients::name, doctors::name))
        .into_boxed();
    if let Some(id) = id {
        query = query.filter(patient_doctor_mappings::id.eq(id));
    }
    query
        .order((
            patient_doctor_mappings::assigned_at.asc(),
            patient_doctor_mappings::id.asc(),
        ))
        .load::<MappingReadRow>(conn)
        .await
}

async fn patient_in_scope(
    conn: &mut AsyncPgConnection,
    owner: Uuid,
    patient: Uuid,
) -> QueryResult<bool> {
    diesel::select(exists(
        patients::table
            .filter(patients::id.eq(patient))
            .filter(patients::owner_id.eq(owner)),
    ))
    .get_result(conn)
    .await
}

async fn load_one(
    conn: &mut AsyncPgConnection,
    owner: Uuid,
    id: Uuid,
) -> QueryResult<Option<MappingReadRow>> {
    Ok(load_visible(conn, owner, Some(id)).await?.into_iter().next())
}

#[async_trait]
impl MappingRepository for DieselMappingRepository {
    async fn list(&self, scope: &OwnerScope) -> Result<Vec<Mapping>, MappingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows = load_visible(&mut conn, *scope.owner().as_uuid(), None)
            .await
            .map_err(map_diesel_error)?;

        Ok(rows.into_iter().map(read_row_to_mapping).collect())
    }

    async fn find(
        &self,
        scope: &OwnerScope,
        id: &MappingId,
    ) -> Result<Option<Mapping>, MappingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = load_one(&mut conn, *scope.owner().as_uuid(), *id.as_uuid())
            .await
            .map_err(map_diesel_error)?;

        Ok(row.map(read_row_to_mapping))
    }

    async fn insert(
        &self,
        scope: &OwnerScope,
        assignment: &Assignment,
    ) -> Result<Mapping, MappingRepositoryError> {
        let owner = *scope.owner().as_uuid();
        let row = assignment_to_row(assignment);
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let stored = conn
            .transaction(|conn| {
                async move {
                    if !patient_in_scope(conn, owner, row.patient_id).await? {
                        return Err(WriteFailure::PatientOutOfScope);
                    }
                    diesel::insert_into(patient_doctor_mappings::table)
                        .values(&row)
                        .execute(conn)
                        .await?;
                    Ok(load_one(conn, owner, row.id).await?)
                }
                .scope_boxed()
            })
            .await
            .map_err(map_write_failure)?;

        stored
            .map(read_row_to_mapping)
            .ok_or_else(|| MappingRepositoryError::query("inserted mapping is not readable"))
    }

    async fn update(
        &self,
        scope: &OwnerScope,
        assignment: &Assignment,
    ) -> Result<Option<Mapping>, MappingRepositoryError> {
        let owner = *scope.owner().as_uuid();
        let row = assignment_to_row(assignment);
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let stored = conn
            .transaction(|conn| {
                async move {
                    if load_one(conn, owner, row.id).await?.is_none() {
                        return Ok(None);
                    }
                    if !patient_in_scope(conn, owner, row.patient_id).await? {
                        return Err(WriteFailure::PatientOutOfScope);
                    }
                    diesel::update(
                        patient_doctor_mappings::table
                            .filter(patient_doctor_mappings::id.eq(row.id)),
                    )
                    .set((
                        patient_doctor_mappings::patient_id.eq(row.patient_id),
                        patient_doctor_mappings::doctor_id.eq(row.doctor_id),
                    ))
                    .execute(conn)
                    .await?;
                    Ok(load_one(conn, owner, row.id).await?)
                }
                .scope_boxed()
            })
            .await
            .map_err(map_write_failure)?;

        Ok(stored.map(read_row_to_mapping))
    }

    async fn delete(
        &self,
        scope: &OwnerScope,
        id: &MappingId,
    ) -> Result<bool, MappingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let owned_patients = patients::table
            .filter(patients::owner_id.eq(*scope.owner().as_uuid()))
            .select(patients::id);

        let deleted = diesel::delete(
            patient_doctor_mappings::table
                .filter(patient_doctor_mappings::id.eq(id.as_uuid()))
                .filter(patient_doctor_mappings::patient_id.eq_any(owned_patients)),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;

        Ok(deleted > 0)
    }
}
