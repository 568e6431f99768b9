//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every HTTP endpoint from the inbound layer, the
//! request and response schemas, the domain error wrappers
//! ([`ErrorSchema`], [`ErrorCodeSchema`]) and the bearer-token security
//! scheme.
//!
//! The generated document backs Swagger UI (debug builds) and is printed by
//! `cargo run --bin openapi-dump` for external tooling.

use crate::inbound::http::accounts::{
    LoginRequest, LoginResponse, LoginUserResponse, RefreshRequest, RefreshResponse,
    RegisterRequest, RegisteredUserResponse,
};
use crate::inbound::http::doctors::{DoctorRequest, DoctorResponse};
use crate::inbound::http::index::Banner;
use crate::inbound::http::mappings::{MappingRequest, MappingResponse};
use crate::inbound::http::patients::{PatientRequest, PatientResponse};
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Name of the bearer security scheme in the generated document.
pub const BEARER_SCHEME: &str = "BearerToken";

/// Enrich the generated document with the bearer-token security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            BEARER_SCHEME,
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some(
                        "Access token issued by POST /api/auth/login or /api/auth/token/refresh.",
                    ))
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Healthcare records API",
        description = "Registration, login and owner-scoped patient, doctor and mapping records.",
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("BearerToken" = [])),
    paths(
        crate::inbound::http::index::banner,
        crate::inbound::http::accounts::register,
        crate::inbound::http::accounts::login,
        crate::inbound::http::accounts::refresh,
        crate::inbound::http::patients::list_patients,
        crate::inbound::http::patients::create_patient,
        crate::inbound::http::patients::get_patient,
        crate::inbound::http::patients::replace_patient,
        crate::inbound::http::patients::update_patient,
        crate::inbound::http::patients::delete_patient,
        crate::inbound::http::doctors::list_doctors,
        crate::inbound::http::doctors::create_doctor,
        crate::inbound::http::doctors::get_doctor,
        crate::inbound::http::doctors::replace_doctor,
        crate::inbound::http::doctors::update_doctor,
        crate::inbound::http::doctors::delete_doctor,
        crate::inbound::http::mappings::list_mappings,
        crate::inbound::http::mappings::create_mapping,
        crate::inbound::http::mappings::get_mapping,
        crate::inbound::http::mappings::replace_mapping,
        crate::inbound::http::mappings::update_mapping,
        crate::inbound::http::mappings::delete_mapping,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        Banner,
        RegisterRequest,
        RegisteredUserResponse,
        LoginRequest,
        LoginResponse,
        LoginUserResponse,
        RefreshRequest,
        RefreshResponse,
        PatientRequest,
        PatientResponse,
        DoctorRequest,
        DoctorResponse,
        MappingRequest,
        MappingResponse,
    )),
    tags(
        (name = "auth", description = "Registration, login and token refresh"),
        (name = "patients", description = "Patients owned by the caller"),
        (name = "doctors", description = "Shared doctor directory"),
        (name = "mappings", description = "Doctor assignments for the caller's patients"),
        (name = "health", description = "Endpoints for health checks"),
        (name = "meta", description = "Service banner")
    )
)]
pub struct ApiDoc;
