//! Healthcare records backend.
//!
//! Hexagonal layout: [`domain`] holds records, the access policy, services
//! and ports; [`inbound`] adapts HTTP requests onto driving ports;
//! [`outbound`] implements driven ports over PostgreSQL, memory and
//! credential libraries.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
#[cfg(test)]
mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
