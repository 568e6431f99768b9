//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. They exist solely to satisfy Diesel's
//! type requirements for queries and mutations.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{doctors, patient_doctor_mappings, patients, users};

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub username: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

/// Insertable struct for creating new user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub username: &'a str,
    pub name: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
}

// ---------------------------------------------------------------------------
// Patient models
// ---------------------------------------------------------------------------

/// Row struct for reading from the patients table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = patients)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct PatientRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub age: i32,
    pub gender: String,
    pub address: String,
    pub created_at: DateTime<Utc>,
}

/// Changeset for the mutable patient columns. Owner and creation time are
/// deliberately absent.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = patients)]
pub(crate) struct PatientUpdate<'a> {
    pub name: &'a str,
    pub age: i32,
    pub gender: &'a str,
    pub address: &'a str,
}

// ---------------------------------------------------------------------------
// Doctor models
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = doctors)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct DoctorRow {
    pub id: Uuid,
    pub name: String,
    pub specialization: String,
    pub phone: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = doctors)]
pub(crate) struct DoctorUpdate<'a> {
    pub name: &'a str,
    pub specialization: &'a str,
    pub phone: &'a str,
    pub email: &'a str,
}

// ---------------------------------------------------------------------------
// Mapping models
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Queryable, Selectable, Insertable)]
#[diesel(table_name = patient_doctor_mappings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct MappingRow {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub assigned_at: DateTime<Utc>,
}

/// Mapping row joined with the names of both sides.
pub(crate) type MappingReadRow = (MappingRow, String, String);
