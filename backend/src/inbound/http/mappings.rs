//! Patient-doctor mapping HTTP handlers.
//!
//! ```text
//! GET    /api/mappings
//! POST   /api/mappings {"patient":"<uuid>","doctor":"<uuid>"}
//! GET    /api/mappings/{id}
//! PUT    /api/mappings/{id}
//! PATCH  /api/mappings/{id}
//! DELETE /api/mappings/{id}
//! ```
//!
//! Mappings are visible to the owner of their patient. Assigning a doctor to
//! someone else's patient answers 403; assigning the same pair twice
//! answers 409.

use actix_web::{HttpResponse, delete, get, patch, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{DoctorId, Mapping, MappingChanges, MappingDraft, MappingId, PatientId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::SignedIn;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_id, required};

const ID: FieldName = FieldName::new("id");
const PATIENT: FieldName = FieldName::new("patient");
const DOCTOR: FieldName = FieldName::new("doctor");

/// Assignment fields accepted on create, replace and partial update.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct MappingRequest {
    /// Id of one of the caller's patients.
    pub patient: Option<String>,
    /// Id of any doctor.
    pub doctor: Option<String>,
}

impl MappingRequest {
    fn into_draft(self) -> ApiResult<MappingDraft> {
        let patient = required(self.patient, PATIENT)?;
        let doctor = required(self.doctor, DOCTOR)?;
        Ok(MappingDraft {
            patient: parse_id(&patient, PATIENT)?,
            doctor: parse_id(&doctor, DOCTOR)?,
        })
    }

    fn into_changes(self) -> ApiResult<MappingChanges> {
        Ok(MappingChanges {
            patient: self
                .patient
                .map(|raw| parse_id::<PatientId>(&raw, PATIENT))
                .transpose()?,
            doctor: self
                .doctor
                .map(|raw| parse_id::<DoctorId>(&raw, DOCTOR))
                .transpose()?,
        })
    }
}

/// Mapping with the names of both sides.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MappingResponse {
    pub id: String,
    pub patient: String,
    pub doctor: String,
    pub patient_name: String,
    pub doctor_name: String,
    /// RFC 3339 assignment timestamp.
    pub assigned_at: String,
}

impl From<Mapping> for MappingResponse {
    fn from(value: Mapping) -> Self {
        Self {
            id: value.id().to_string(),
            patient: value.patient().to_string(),
            doctor: value.doctor().to_string(),
            patient_name: value.patient_name().to_owned(),
            doctor_name: value.doctor_name().to_owned(),
            assigned_at: value.assigned_at().to_rfc3339(),
        }
    }
}

fn mapping_id(path: web::Path<String>) -> ApiResult<MappingId> {
    parse_id(&path.into_inner(), ID)
}

/// List mappings for the caller's patients.
#[utoipa::path(
    get,
    path = "/api/mappings",
    responses(
        (status = 200, description = "Caller's mappings", body = [MappingResponse]),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["mappings"],
    operation_id = "listMappings"
)]
#[get("/mappings")]
pub async fn list_mappings(
    state: web::Data<HttpState>,
    user: SignedIn,
) -> ApiResult<web::Json<Vec<MappingResponse>>> {
    let mappings = state.mappings.list_mappings(user.caller()).await?;
    Ok(web::Json(
        mappings.into_iter().map(MappingResponse::from).collect(),
    ))
}

/// Assign a doctor to one of the caller's patients.
#[utoipa::path(
    post,
    path = "/api/mappings",
    request_body = MappingRequest,
    responses(
        (status = 201, description = "Doctor assigned", body = MappingResponse),
        (status = 400, description = "Missing, malformed or unknown references", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Patient belongs to another user", body = ErrorSchema),
        (status = 409, description = "Pair already assigned", body = ErrorSchema)
    ),
    tags = ["mappings"],
    operation_id = "createMapping"
)]
#[post("/mappings")]
pub async fn create_mapping(
    state: web::Data<HttpState>,
    user: SignedIn,
    payload: web::Json<MappingRequest>,
) -> ApiResult<HttpResponse> {
    let draft = payload.into_inner().into_draft()?;
    let mapping = state
        .mapping_commands
        .create_mapping(user.caller(), draft)
        .await?;
    Ok(HttpResponse::Created().json(MappingResponse::from(mapping)))
}

/// Fetch a mapping for one of the caller's patients.
#[utoipa::path(
    get,
    path = "/api/mappings/{id}",
    params(("id" = String, Path, description = "Mapping id")),
    responses(
        (status = 200, description = "Mapping", body = MappingResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Not found in the caller's mappings", body = ErrorSchema)
    ),
    tags = ["mappings"],
    operation_id = "getMapping"
)]
#[get("/mappings/{id}")]
pub async fn get_mapping(
    state: web::Data<HttpState>,
    user: SignedIn,
    path: web::Path<String>,
) -> ApiResult<web::Json<MappingResponse>> {
    let id = mapping_id(path)?;
    let mapping = state.mappings.get_mapping(user.caller(), id).await?;
    Ok(web::Json(MappingResponse::from(mapping)))
}

/// Replace both sides of a mapping.
#[utoipa::path(
    put,
    path = "/api/mappings/{id}",
    params(("id" = String, Path, description = "Mapping id")),
    request_body = MappingRequest,
    responses(
        (status = 200, description = "Updated mapping", body = MappingResponse),
        (status = 400, description = "Missing, malformed or unknown references", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Patient belongs to another user", body = ErrorSchema),
        (status = 404, description = "Not found in the caller's mappings", body = ErrorSchema),
        (status = 409, description = "Pair already assigned", body = ErrorSchema)
    ),
    tags = ["mappings"],
    operation_id = "replaceMapping"
)]
#[put("/mappings/{id}")]
pub async fn replace_mapping(
    state: web::Data<HttpState>,
    user: SignedIn,
    path: web::Path<String>,
    payload: web::Json<MappingRequest>,
) -> ApiResult<web::Json<MappingResponse>> {
    let id = mapping_id(path)?;
    state.mappings.get_mapping(user.caller(), id).await?;
    let changes = MappingChanges::from(payload.into_inner().into_draft()?);
    let mapping = state
        .mapping_commands
        .update_mapping(user.caller(), id, changes)
        .await?;
    Ok(web::Json(MappingResponse::from(mapping)))
}

/// Reassign either side of a mapping.
#[utoipa::path(
    patch,
    path = "/api/mappings/{id}",
    params(("id" = String, Path, description = "Mapping id")),
    request_body = MappingRequest,
    responses(
        (status = 200, description = "Updated mapping", body = MappingResponse),
        (status = 400, description = "Malformed or unknown references", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Patient belongs to another user", body = ErrorSchema),
        (status = 404, description = "Not found in the caller's mappings", body = ErrorSchema),
        (status = 409, description = "Pair already assigned", body = ErrorSchema)
    ),
    tags = ["mappings"],
    operation_id = "updateMapping"
)]
#[patch("/mappings/{id}")]
pub async fn update_mapping(
    state: web::Data<HttpState>,
    user: SignedIn,
    path: web::Path<String>,
    payload: web::Json<MappingRequest>,
) -> ApiResult<web::Json<MappingResponse>> {
    let id = mapping_id(path)?;
    state.mappings.get_mapping(user.caller(), id).await?;
    let changes = payload.into_inner().into_changes()?;
    let mapping = state
        .mapping_commands
        .update_mapping(user.caller(), id, changes)
        .await?;
    Ok(web::Json(MappingResponse::from(mapping)))
}

/// Unassign a doctor.
#[utoipa::path(
    delete,
    path = "/api/mappings/{id}",
    params(("id" = String, Path, description = "Mapping id")),
    responses(
        (status = 204, description = "Mapping deleted"),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Not found in the caller's mappings", body = ErrorSchema)
    ),
    tags = ["mappings"],
    operation_id = "deleteMapping"
)]
#[delete("/mappings/{id}")]
pub async fn delete_mapping(
    state: web::Data<HttpState>,
    user: SignedIn,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = mapping_id(path)?;
    state
        .mapping_commands
        .delete_mapping(user.caller(), id)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
