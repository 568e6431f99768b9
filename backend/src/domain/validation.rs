//! Field-level validation shared by the domain record constructors.

use std::fmt;

use serde_json::json;

use crate::domain::Error;

/// A validation failure attributable to one request field.
pub trait FieldViolation: fmt::Display {
    /// Wire name of the offending field.
    fn field(&self) -> &'static str;

    /// Stable machine-readable reason.
    fn code(&self) -> &'static str;
}

/// Convert a field violation into an `InvalidRequest` domain error.
pub fn field_error<V: FieldViolation>(violation: V) -> Error {
    Error::invalid_request(violation.to_string()).with_details(json!({
        "field": violation.field(),
        "code": violation.code(),
    }))
}

/// Shape problems for bounded free-text fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextViolation {
    Blank,
    TooLong { max: usize },
}

impl TextViolation {
    pub(crate) fn code(self) -> &'static str {
        match self {
            Self::Blank => "blank",
            Self::TooLong { .. } => "too_long",
        }
    }
}

impl fmt::Display for TextViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Blank => f.write_str("must not be blank"),
            Self::TooLong { max } => write!(f, "must be at most {max} characters"),
        }
    }
}

/// Trim `value` and check it holds between one and `max` characters.
pub(crate) fn bounded_text(value: &str, max: usize) -> Result<String, TextViolation> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(TextViolation::Blank);
    }
    if trimmed.chars().count() > max {
        return Err(TextViolation::TooLong { max });
    }
    Ok(trimmed.to_owned())
}
