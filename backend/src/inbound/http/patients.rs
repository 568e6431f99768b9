//! Patient HTTP handlers.
//!
//! ```text
//! GET    /api/patients
//! POST   /api/patients {"name":"Jo","age":30,"gender":"female","address":"1 Harbour Road"}
//! GET    /api/patients/{id}
//! PUT    /api/patients/{id}
//! PATCH  /api/patients/{id}
//! DELETE /api/patients/{id}
//! ```
//!
//! Every route needs a bearer token and only reaches the caller's own
//! patients. Ids owned by someone else answer 404, ahead of any complaint
//! about the body. A `user` field in the body is ignored: the owner is always
//! the caller.

use actix_web::{HttpResponse, delete, get, patch, post, put, web};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::domain::{Patient, PatientChanges, PatientDraft, PatientId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::SignedIn;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_id, parse_integer, required};

const ID: FieldName = FieldName::new("id");
const NAME: FieldName = FieldName::new("name");
const AGE: FieldName = FieldName::new("age");
const GENDER: FieldName = FieldName::new("gender");
const ADDRESS: FieldName = FieldName::new("address");

/// Patient fields accepted on create, replace and partial update.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct PatientRequest {
    pub name: Option<String>,
    /// Non-negative whole number; integer strings are accepted.
    #[schema(value_type = Option<i64>, example = 30)]
    pub age: Option<Value>,
    pub gender: Option<String>,
    pub address: Option<String>,
}

impl PatientRequest {
    fn into_draft(self) -> ApiResult<PatientDraft> {
        Ok(PatientDraft {
            name: required(self.name, NAME)?,
            age: parse_integer(required(self.age, AGE)?, AGE)?,
            gender: required(self.gender, GENDER)?,
            address: required(self.address, ADDRESS)?,
        })
    }

    fn into_changes(self) -> ApiResult<PatientChanges> {
        Ok(PatientChanges {
            name: self.name,
            age: self.age.map(|age| parse_integer(age, AGE)).transpose()?,
            gender: self.gender,
            address: self.address,
        })
    }
}

/// Patient as returned to its owner.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PatientResponse {
    pub id: String,
    pub name: String,
    pub age: u32,
    pub gender: String,
    pub address: String,
    /// RFC 3339 creation timestamp.
    pub created_at: String,
}

impl From<Patient> for PatientResponse {
    fn from(value: Patient) -> Self {
        let details = value.details();
        Self {
            id: value.id().to_string(),
            name: details.name().to_owned(),
            age: details.age(),
            gender: details.gender().to_owned(),
            address: details.address().to_owned(),
            created_at: value.created_at().to_rfc3339(),
        }
    }
}

fn patient_id(path: web::Path<String>) -> ApiResult<PatientId> {
    parse_id(&path.into_inner(), ID)
}

/// List the caller's patients.
#[utoipa::path(
    get,
    path = "/api/patients",
    responses(
        (status = 200, description = "Caller's patients", body = [PatientResponse]),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["patients"],
    operation_id = "listPatients"
)]
#[get("/patients")]
pub async fn list_patients(
    state: web::Data<HttpState>,
    user: SignedIn,
) -> ApiResult<web::Json<Vec<PatientResponse>>> {
    let patients = state.patients.list_patients(user.caller()).await?;
    Ok(web::Json(
        patients.into_iter().map(PatientResponse::from).collect(),
    ))
}

/// Create a patient owned by the caller.
#[utoipa::path(
    post,
    path = "/api/patients",
    request_body = PatientRequest,
    responses(
        (status = 201, description = "Patient created", body = PatientResponse),
        (status = 400, description = "Missing or invalid fields", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["patients"],
    operation_id = "createPatient"
)]
#[post("/patients")]
pub async fn create_patient(
    state: web::Data<HttpState>,
    user: SignedIn,
    payload: web::Json<PatientRequest>,
) -> ApiResult<HttpResponse> {
    let draft = payload.into_inner().into_draft()?;
    let patient = state
        .patient_commands
        .create_patient(user.caller(), draft)
        .await?;
    Ok(HttpResponse::Created().json(PatientResponse::from(patient)))
}

/// Fetch one of the caller's patients.
#[utoipa::path(
    get,
    path = "/api/patients/{id}",
    params(("id" = String, Path, description = "Patient id")),
    responses(
        (status = 200, description = "Patient", body = PatientResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Not found in the caller's patients", body = ErrorSchema)
    ),
    tags = ["patients"],
    operation_id = "getPatient"
)]
#[get("/patients/{id}")]
pub async fn get_patient(
    state: web::Data<HttpState>,
    user: SignedIn,
    path: web::Path<String>,
) -> ApiResult<web::Json<PatientResponse>> {
    let id = patient_id(path)?;
    let patient = state.patients.get_patient(user.caller(), id).await?;
    Ok(web::Json(PatientResponse::from(patient)))
}

/// Replace every field of one of the caller's patients.
#[utoipa::path(
    put,
    path = "/api/patients/{id}",
    params(("id" = String, Path, description = "Patient id")),
    request_body = PatientRequest,
    responses(
        (status = 200, description = "Updated patient", body = PatientResponse),
        (status = 400, description = "Missing or invalid fields", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Not found in the caller's patients", body = ErrorSchema)
    ),
    tags = ["patients"],
    operation_id = "replacePatient"
)]
#[put("/patients/{id}")]
pub async fn replace_patient(
    state: web::Data<HttpState>,
    user: SignedIn,
    path: web::Path<String>,
    payload: web::Json<PatientRequest>,
) -> ApiResult<web::Json<PatientResponse>> {
    let id = patient_id(path)?;
    state.patients.get_patient(user.caller(), id).await?;
    let changes = PatientChanges::from(payload.into_inner().into_draft()?);
    let patient = state
        .patient_commands
        .update_patient(user.caller(), id, changes)
        .await?;
    Ok(web::Json(PatientResponse::from(patient)))
}

/// Update the supplied fields of one of the caller's patients.
#[utoipa::path(
    patch,
    path = "/api/patients/{id}",
    params(("id" = String, Path, description = "Patient id")),
    request_body = PatientRequest,
    responses(
        (status = 200, description = "Updated patient", body = PatientResponse),
        (status = 400, description = "Invalid fields", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Not found in the caller's patients", body = ErrorSchema)
    ),
    tags = ["patients"],
    operation_id = "updatePatient"
)]
#[patch("/patients/{id}")]
pub async fn update_patient(
    state: web::Data<HttpState>,
    user: SignedIn,
    path: web::Path<String>,
    payload: web::Json<PatientRequest>,
) -> ApiResult<web::Json<PatientResponse>> {
    let id = patient_id(path)?;
    state.patients.get_patient(user.caller(), id).await?;
    let changes = payload.into_inner().into_changes()?;
    let patient = state
        .patient_commands
        .update_patient(user.caller(), id, changes)
        .await?;
    Ok(web::Json(PatientResponse::from(patient)))
}

/// Delete one of the caller's patients together with its mappings.
#[utoipa::path(
    delete,
    path = "/api/patients/{id}",
    params(("id" = String, Path, description = "Patient id")),
    responses(
        (status = 204, description = "Patient deleted"),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Not found in the caller's patients", body = ErrorSchema)
    ),
    tags = ["patients"],
    operation_id = "deletePatient"
)]
#[delete("/patients/{id}")]
pub async fn delete_patient(
    state: web::Data<HttpState>,
    user: SignedIn,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = patient_id(path)?;
    state
        .patient_commands
        .delete_patient(user.caller(), id)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
