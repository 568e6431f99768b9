//! Doctor directory HTTP handlers.
//!
//! ```text
//! GET    /api/doctors            (public)
//! GET    /api/doctors/{id}       (public)
//! POST   /api/doctors            (any authenticated caller)
//! PUT    /api/doctors/{id}       (any authenticated caller)
//! PATCH  /api/doctors/{id}       (any authenticated caller)
//! DELETE /api/doctors/{id}       (any authenticated caller)
//! ```
//!
//! Doctors are not owned by anyone, so writes are open to every signed-in
//! user.

use actix_web::{HttpResponse, delete, get, patch, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Doctor, DoctorChanges, DoctorDraft, DoctorId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::{Caller, SignedIn};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_id, required};

const ID: FieldName = FieldName::new("id");
const NAME: FieldName = FieldName::new("name");
const SPECIALIZATION: FieldName = FieldName::new("specialization");
const PHONE: FieldName = FieldName::new("phone");
const EMAIL: FieldName = FieldName::new("email");

/// Doctor fields accepted on create, replace and partial update.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct DoctorRequest {
    pub name: Option<String>,
    pub specialization: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

impl DoctorRequest {
    fn into_draft(self) -> ApiResult<DoctorDraft> {
        Ok(DoctorDraft {
            name: required(self.name, NAME)?,
            specialization: required(self.specialization, SPECIALIZATION)?,
            phone: required(self.phone, PHONE)?,
            email: required(self.email, EMAIL)?,
        })
    }
}

impl From<DoctorRequest> for DoctorChanges {
    fn from(value: DoctorRequest) -> Self {
        Self {
            name: value.name,
            specialization: value.specialization,
            phone: value.phone,
            email: value.email,
        }
    }
}

/// Doctor directory entry.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DoctorResponse {
    pub id: String,
    pub name: String,
    pub specialization: String,
    pub phone: String,
    pub email: String,
    /// RFC 3339 creation timestamp.
    pub created_at: String,
}

impl From<Doctor> for DoctorResponse {
    fn from(value: Doctor) -> Self {
        let details = value.details();
        Self {
            id: value.id().to_string(),
            name: details.name().to_owned(),
            specialization: details.specialization().to_owned(),
            phone: details.phone().to_owned(),
            email: details.email().to_string(),
            created_at: value.created_at().to_rfc3339(),
        }
    }
}

fn doctor_id(path: web::Path<String>) -> ApiResult<DoctorId> {
    parse_id(&path.into_inner(), ID)
}

/// List every doctor. No credentials required.
#[utoipa::path(
    get,
    path = "/api/doctors",
    responses(
        (status = 200, description = "Doctors", body = [DoctorResponse]),
        (status = 401, description = "A bearer token was sent but rejected", body = ErrorSchema)
    ),
    tags = ["doctors"],
    operation_id = "listDoctors",
    security([])
)]
#[get("/doctors")]
pub async fn list_doctors(
    state: web::Data<HttpState>,
    caller: Caller,
) -> ApiResult<web::Json<Vec<DoctorResponse>>> {
    let doctors = state.doctors.list_doctors(caller.user_id()).await?;
    Ok(web::Json(doctors.into_iter().map(DoctorResponse::from).collect()))
}

/// Fetch a doctor. No credentials required.
#[utoipa::path(
    get,
    path = "/api/doctors/{id}",
    params(("id" = String, Path, description = "Doctor id")),
    responses(
        (status = 200, description = "Doctor", body = DoctorResponse),
        (status = 404, description = "Unknown doctor", body = ErrorSchema)
    ),
    tags = ["doctors"],
    operation_id = "getDoctor",
    security([])
)]
#[get("/doctors/{id}")]
pub async fn get_doctor(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<String>,
) -> ApiResult<web::Json<DoctorResponse>> {
    let id = doctor_id(path)?;
    let doctor = state.doctors.get_doctor(caller.user_id(), id).await?;
    Ok(web::Json(DoctorResponse::from(doctor)))
}

/// Add a doctor to the directory.
#[utoipa::path(
    post,
    path = "/api/doctors",
    request_body = DoctorRequest,
    responses(
        (status = 201, description = "Doctor created", body = DoctorResponse),
        (status = 400, description = "Missing, invalid or duplicate fields", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["doctors"],
    operation_id = "createDoctor"
)]
#[post("/doctors")]
pub async fn create_doctor(
    state: web::Data<HttpState>,
    user: SignedIn,
    payload: web::Json<DoctorRequest>,
) -> ApiResult<HttpResponse> {
    let draft = payload.into_inner().into_draft()?;
    let doctor = state
        .doctor_commands
        .create_doctor(user.caller(), draft)
        .await?;
    Ok(HttpResponse::Created().json(DoctorResponse::from(doctor)))
}

/// Replace every field of a doctor.
#[utoipa::path(
    put,
    path = "/api/doctors/{id}",
    params(("id" = String, Path, description = "Doctor id")),
    request_body = DoctorRequest,
    responses(
        (status = 200, description = "Updated doctor", body = DoctorResponse),
        (status = 400, description = "Missing, invalid or duplicate fields", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Unknown doctor", body = ErrorSchema)
    ),
    tags = ["doctors"],
    operation_id = "replaceDoctor"
)]
#[put("/doctors/{id}")]
pub async fn replace_doctor(
    state: web::Data<HttpState>,
    user: SignedIn,
    path: web::Path<String>,
    payload: web::Json<DoctorRequest>,
) -> ApiResult<web::Json<DoctorResponse>> {
    let id = doctor_id(path)?;
    state.doctors.get_doctor(user.caller(), id).await?;
    let changes = DoctorChanges::from(payload.into_inner().into_draft()?);
    let doctor = state
        .doctor_commands
        .update_doctor(user.caller(), id, changes)
        .await?;
    Ok(web::Json(DoctorResponse::from(doctor)))
}

/// Update the supplied fields of a doctor.
#[utoipa::path(
    patch,
    path = "/api/doctors/{id}",
    params(("id" = String, Path, description = "Doctor id")),
    request_body = DoctorRequest,
    responses(
        (status = 200, description = "Updated doctor", body = DoctorResponse),
        (status = 400, description = "Invalid or duplicate fields", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Unknown doctor", body = ErrorSchema)
    ),
    tags = ["doctors"],
    operation_id = "updateDoctor"
)]
#[patch("/doctors/{id}")]
pub async fn update_doctor(
    state: web::Data<HttpState>,
    user: SignedIn,
    path: web::Path<String>,
    payload: web::Json<DoctorRequest>,
) -> ApiResult<web::Json<DoctorResponse>> {
    let id = doctor_id(path)?;
    let doctor = state
        .doctor_commands
        .update_doctor(user.caller(), id, DoctorChanges::from(payload.into_inner()))
        .await?;
    Ok(web::Json(DoctorResponse::from(doctor)))
}

/// Remove a doctor and every mapping that references it.
#[utoipa::path(
    delete,
    path = "/api/doctors/{id}",
    params(("id" = String, Path, description = "Doctor id")),
    responses(
        (status = 204, description = "Doctor deleted"),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Unknown doctor", body = ErrorSchema)
    ),
    tags = ["doctors"],
    operation_id = "deleteDoctor"
)]
#[delete("/doctors/{id}")]
pub async fn delete_doctor(
    state: web::Data<HttpState>,
    user: SignedIn,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = doctor_id(path)?;
    state
        .doctor_commands
        .delete_doctor(user.caller(), id)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
