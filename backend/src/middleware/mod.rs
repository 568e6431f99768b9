//! Actix middleware shared by the server and the HTTP test apps.

pub mod trace;

pub use trace::{Trace, TraceMiddleware};
