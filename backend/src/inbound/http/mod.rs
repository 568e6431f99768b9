//! HTTP inbound adapter exposing REST endpoints.

pub mod accounts;
pub mod auth;
pub mod doctors;
pub mod error;
pub mod health;
pub mod index;
pub mod mappings;
pub mod patients;
pub mod schemas;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod token_config;
pub mod validation;

use actix_web::web;

pub use error::ApiResult;

/// Register the `/api` scope and the banner, with JSON, path and query
/// extractor errors mapped onto the domain error payload.
///
/// Callers supply [`state::HttpState`] as app data.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use healthcare_backend::inbound::http::configure_api;
///
/// let app = App::new().configure(configure_api);
/// ```
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(error::json_error_handler))
        .app_data(web::PathConfig::default().error_handler(error::path_error_handler))
        .app_data(web::QueryConfig::default().error_handler(error::query_error_handler))
        .service(index::banner)
        .service(
            web::scope("/api")
                .service(accounts::register)
                .service(accounts::login)
                .service(accounts::refresh)
                .service(patients::list_patients)
                .service(patients::create_patient)
                .service(patients::get_patient)
                .service(patients::replace_patient)
                .service(patients::update_patient)
                .service(patients::delete_patient)
                .service(doctors::list_doctors)
                .service(doctors::create_doctor)
                .service(doctors::get_doctor)
                .service(doctors::replace_doctor)
                .service(doctors::update_doctor)
                .service(doctors::delete_doctor)
                .service(mappings::list_mappings)
                .service(mappings::create_mapping)
                .service(mappings::get_mapping)
                .service(mappings::replace_mapping)
                .service(mappings::update_mapping)
                .service(mappings::delete_mapping),
        );
}
