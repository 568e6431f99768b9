//! Correlation id shared by the logs and error bodies of one request.
//!
//! The active id sits in Tokio task-local storage, so [`crate::domain::Error`]
//! constructors pick it up without it being passed around. Task-locals do not
//! follow `tokio::spawn` or `spawn_blocking`; re-enter [`TraceId::scope`] on
//! the other side when that matters.

use std::fmt;
use std::future::Future;
use std::str::FromStr;

use tokio::task_local;
use uuid::Uuid;

/// Header used both to accept an upstream id and to echo the active one.
pub const TRACE_ID_HEADER: &str = "trace-id";

task_local! {
    static ACTIVE: TraceId;
}

/// Request correlation id.
///
/// # Examples
/// ```
/// use healthcare_backend::TraceId;
///
/// let id: TraceId = "6f1c1b6e-3c2a-4f7e-9a57-0b4d8b1f2c10".parse().expect("uuid");
/// assert_eq!(id.to_string(), "6f1c1b6e-3c2a-4f7e-9a57-0b4d8b1f2c10");
/// assert!(TraceId::current().is_none());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TraceId(Uuid);

impl TraceId {
    pub(crate) fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Reuse a well-formed id forwarded by a gateway, or mint a fresh one.
    pub(crate) fn from_upstream(header: Option<&str>) -> Self {
        header
            .and_then(|raw| raw.trim().parse().ok())
            .unwrap_or_else(Self::generate)
    }

    /// Id of the request being served by the current task, if any.
    #[must_use]
    pub fn current() -> Option<Self> {
        ACTIVE.try_with(|id| *id).ok()
    }

    #[must_use]
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Run `fut` with `trace_id` as the active id.
    pub async fn scope<Fut: Future>(trace_id: TraceId, fut: Fut) -> Fut::Output {
        ACTIVE.scope(trace_id, fut).await
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0.hyphenated(), f)
    }
}

impl FromStr for TraceId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}
