//! Print the OpenAPI document as JSON.

use healthcare_backend::doc::ApiDoc;
use utoipa::OpenApi;

fn main() -> std::process::ExitCode {
    match ApiDoc::openapi().to_pretty_json() {
        Ok(json) => {
            println!("{json}");
            std::process::ExitCode::SUCCESS
        }
        Err(error) => {
            eprintln!("failed to serialise OpenAPI document: {error}");
            std::process::ExitCode::FAILURE
        }
    }
}
