//! Password strength rules applied before hashing.
//!
//! All failing rules are collected so the caller can report every reason at
//! once rather than one per attempt.

use std::collections::HashSet;
use std::fmt;
use std::sync::OnceLock;

use serde_json::json;

use crate::domain::Error;

/// Default minimum password length.
pub const DEFAULT_MIN_LENGTH: usize = 8;

/// Attributes shorter than this are ignored by the similarity rule.
const SIMILARITY_MIN_ATTRIBUTE_LEN: usize = 3;

const COMMON_PASSWORDS: &str = include_str!("password_policy/common_passwords.txt");

static COMMON_SET: OnceLock<HashSet<&'static str>> = OnceLock::new();

fn common_passwords() -> &'static HashSet<&'static str> {
    COMMON_SET.get_or_init(|| {
        COMMON_PASSWORDS
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect()
    })
}

/// Single reason a password was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PasswordRule {
    TooShort { min: usize },
    EntirelyNumeric,
    Common,
    TooSimilar { attribute: &'static str },
}

impl PasswordRule {
    fn code(&self) -> &'static str {
        match self {
            Self::TooShort { .. } => "password_too_short",
            Self::EntirelyNumeric => "password_entirely_numeric",
            Self::Common => "password_too_common",
            Self::TooSimilar { .. } => "password_too_similar",
        }
    }
}

impl fmt::Display for PasswordRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooShort { min } => write!(
                f,
                "this password is too short; it must contain at least {min} characters"
            ),
            Self::EntirelyNumeric => f.write_str("this password is entirely numeric"),
            Self::Common => f.write_str("this password is too common"),
            Self::TooSimilar { attribute } => {
                write!(f, "the password is too similar to the {attribute}")
            }
        }
    }
}

/// Non-empty set of failed rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordRejected {
    rules: Vec<PasswordRule>,
}

impl PasswordRejected {
    pub fn rules(&self) -> &[PasswordRule] {
        &self.rules
    }
}

impl fmt::Display for PasswordRejected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .rules
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        f.write_str(&joined)
    }
}

impl std::error::Error for PasswordRejected {}

impl From<PasswordRejected> for Error {
    fn from(value: PasswordRejected) -> Self {
        let reasons: Vec<_> = value
            .rules
            .iter()
            .map(|rule| json!({ "code": rule.code(), "message": rule.to_string() }))
            .collect();
        Error::invalid_request(value.to_string()).with_details(json!({
            "field": "password",
            "code": "weak_password",
            "reasons": reasons,
        }))
    }
}

/// Account attributes the password must not resemble.
#[derive(Debug, Clone, Copy)]
pub struct UserAttributes<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub name: &'a str,
}

impl<'a> UserAttributes<'a> {
    fn labelled(&self) -> [(&'static str, String); 3] {
        let local_part = self.email.split('@').next().unwrap_or_default();
        [
            ("username", self.username.to_lowercase()),
            ("email address", local_part.to_lowercase()),
            ("name", self.name.to_lowercase()),
        ]
    }
}

/// Configurable password policy.
///
/// # Examples
/// ```
/// use healthcare_backend::domain::{PasswordPolicy, UserAttributes};
///
/// let attrs = UserAttributes { username: "ada", email: "ada@example.org", name: "Ada" };
/// assert!(PasswordPolicy::default().check("quiet-harbour-47", attrs).is_ok());
/// assert!(PasswordPolicy::default().check("12345678", attrs).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordPolicy {
    min_length: usize,
    reject_numeric: bool,
    reject_common: bool,
    reject_similar: bool,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: DEFAULT_MIN_LENGTH,
            reject_numeric: true,
            reject_common: true,
            reject_similar: true,
        }
    }
}

impl PasswordPolicy {
    #[must_use]
    pub fn with_min_length(mut self, min_length: usize) -> Self {
        self.min_length = min_length;
        self
    }

    #[must_use]
    pub fn with_numeric_check(mut self, enabled: bool) -> Self {
        self.reject_numeric = enabled;
        self
    }

    #[must_use]
    pub fn with_common_check(mut self, enabled: bool) -> Self {
        self.reject_common = enabled;
        self
    }

    #[must_use]
    pub fn with_similarity_check(mut self, enabled: bool) -> Self {
        self.reject_similar = enabled;
        self
    }

    /// Evaluate every enabled rule against `password`.
    pub fn check(&self, password: &str, attributes: UserAttributes<'_>) -> Result<(), PasswordRejected> {
        let mut rules = Vec::new();
        let lowered = password.to_lowercase();

        if password.chars().count() < self.min_length {
            rules.push(PasswordRule::TooShort {
                min: self.min_length,
            });
        }
        if self.reject_numeric
            && !password.is_empty()
            && password.chars().all(|c| c.is_ascii_digit())
        {
            rules.push(PasswordRule::EntirelyNumeric);
        }
        if self.reject_common && common_passwords().contains(lowered.trim()) {
            rules.push(PasswordRule::Common);
        }
        if self.reject_similar {
            if let Some(attribute) = similar_attribute(&lowered, &attributes) {
                rules.push(PasswordRule::TooSimilar { attribute });
            }
        }

        if rules.is_empty() {
            Ok(())
        } else {
            Err(PasswordRejected { rules })
        }
    }
}

fn similar_attribute(lowered: &str, attributes: &UserAttributes<'_>) -> Option<&'static str> {
    attributes
        .labelled()
        .into_iter()
        .filter(|(_, value)| value.chars().count() >= SIMILARITY_MIN_ATTRIBUTE_LEN)
        .find(|(_, value)| lowered.contains(value.as_str()) || value.contains(lowered))
        .map(|(label, _)| label)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn attributes() -> UserAttributes<'static> {
        UserAttributes {
            username: "jdoe",
            email: "jane.doe@example.org",
            name: "Jane Doe",
        }
    }

    #[rstest]
    fn accepts_strong_password(attributes: UserAttributes<'static>) {
        assert!(PasswordPolicy::default()
            .check("quiet-harbour-47", attributes)
            .is_ok());
    }

    #[rstest]
    #[case("short1!", PasswordRule::TooShort { min: 8 })]
    #[case("9384710562", PasswordRule::EntirelyNumeric)]
    #[case("password", PasswordRule::Common)]
    #[case("xxjdoexx-2024", PasswordRule::TooSimilar { attribute: "username" })]
    #[case("Jane.Doe#2024", PasswordRule::TooSimilar { attribute: "email address" })]
    fn reports_failed_rule(
        attributes: UserAttributes<'static>,
        #[case] password: &str,
        #[case] expected: PasswordRule,
    ) {
        let rejected = PasswordPolicy::default()
            .check(password, attributes)
            .expect_err("password should be rejected");
        assert!(rejected.rules().contains(&expected), "{rejected:?}");
    }

    #[rstest]
    fn collects_every_failure(attributes: UserAttributes<'static>) {
        let rejected = PasswordPolicy::default()
            .check("123456", attributes)
            .expect_err("password should be rejected");
        assert_eq!(
            rejected.rules(),
            &[
                PasswordRule::TooShort { min: 8 },
                PasswordRule::EntirelyNumeric,
                PasswordRule::Common,
            ]
        );
    }

    #[rstest]
    fn disabled_rules_are_skipped(attributes: UserAttributes<'static>) {
        let policy = PasswordPolicy::default()
            .with_min_length(4)
            .with_numeric_check(false)
            .with_common_check(false)
            .with_similarity_check(false);
        assert!(policy.check("123456", attributes).is_ok());
    }

    #[rstest]
    fn short_attributes_do_not_trigger_similarity() {
        let attributes = UserAttributes {
            username: "jo",
            email: "jo@example.org",
            name: "Jo",
        };
        assert!(PasswordPolicy::default()
            .check("jo-river-cabin", attributes)
            .is_ok());
    }

    #[rstest]
    fn converts_into_invalid_request_with_reasons(attributes: UserAttributes<'static>) {
        let rejected = PasswordPolicy::default()
            .check("password", attributes)
            .expect_err("common password");
        let error = Error::from(rejected);
        let details = error.details().expect("details present");
        assert_eq!(details["field"], "password");
        assert_eq!(details["reasons"][0]["code"], "password_too_common");
    }
}
