//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. When a
//! migration changes a table, update the matching block here (or regenerate
//! it with `diesel print-schema`).

diesel::table! {
    /// Registered accounts. `username` and `email` are each unique.
    users (id) {
        id -> Uuid,
        username -> Varchar,
        name -> Varchar,
        /// Lowercased at the domain boundary before storage.
        email -> Varchar,
        /// PHC-formatted Argon2 hash.
        password_hash -> Text,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Patient records, each owned by exactly one user.
    patients (id) {
        id -> Uuid,
        owner_id -> Uuid,
        name -> Varchar,
        /// Non-negative, enforced by `patients_age_non_negative`.
        age -> Int4,
        gender -> Varchar,
        address -> Text,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Shared doctor directory. `email` is unique.
    doctors (id) {
        id -> Uuid,
        name -> Varchar,
        specialization -> Varchar,
        phone -> Varchar,
        email -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Patient-doctor assignments, unique per pair. Rows cascade with
    /// either side.
    patient_doctor_mappings (id) {
        id -> Uuid,
        patient_id -> Uuid,
        doctor_id -> Uuid,
        assigned_at -> Timestamptz,
    }
}

diesel::joinable!(patients -> users (owner_id));
diesel::joinable!(patient_doctor_mappings -> patients (patient_id));
diesel::joinable!(patient_doctor_mappings -> doctors (doctor_id));

diesel::allow_tables_to_appear_in_same_query!(users, patients, doctors, patient_doctor_mappings);

/// Unique constraint names used to classify violations.
pub(crate) mod constraints {
    pub const USERS_EMAIL: &str = "users_email_key";
    pub const USERS_USERNAME: &str = "users_username_key";
    pub const DOCTORS_EMAIL: &str = "doctors_email_key";
    pub const MAPPING_PAIR: &str = "patient_doctor_mappings_pair_key";
    pub const MAPPING_PATIENT_FK: &str = "patient_doctor_mappings_patient_id_fkey";
    pub const MAPPING_DOCTOR_FK: &str = "patient_doctor_mappings_doctor_id_fkey";
}
