//! Service banner listing the available routes.

use actix_web::{get, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Banner returned by `GET /`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Banner {
    pub message: String,
    /// Base path of the API.
    pub visit: String,
    pub auth: Vec<String>,
    pub resources: Vec<String>,
}

impl Default for Banner {
    fn default() -> Self {
        let routes = |paths: &[&str]| -> Vec<String> {
            paths.iter().map(|path| (*path).to_owned()).collect()
        };
        Self {
            message: "Welcome to the healthcare records API".to_owned(),
            visit: "/api/".to_owned(),
            auth: routes(&[
                "/api/auth/register/",
                "/api/auth/login/",
                "/api/auth/token/refresh/",
            ]),
            resources: routes(&["/api/patients/", "/api/doctors/", "/api/mappings/"]),
        }
    }
}

/// Describe the API entry points.
#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "Service banner", body = Banner)),
    tags = ["meta"],
    operation_id = "banner",
    security([])
)]
#[get("/")]
pub async fn banner() -> web::Json<Banner> {
    web::Json(Banner::default())
}
