//! HTTP server configuration loaded via OrthoConfig.
//!
//! Every setting may come from the command line, a configuration file or a
//! `HEALTHCARE_` prefixed environment variable. [`ServerConfig`] is the
//! validated form the server is built from.

use std::net::SocketAddr;

use chrono::TimeDelta;
use ortho_config::OrthoConfig;
use serde::Deserialize;

use healthcare_backend::domain::PasswordPolicy;
use healthcare_backend::inbound::http::token_config::TokenKey;
use healthcare_backend::outbound::persistence::PoolConfig;
use healthcare_backend::outbound::security::{DEFAULT_ACCESS_TTL, DEFAULT_REFRESH_TTL};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// Raw settings as supplied by the operator.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "HEALTHCARE")]
pub struct ServerSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL. Records are kept in memory when absent.
    pub database_url: Option<String>,
    /// Upper bound on pooled database connections.
    pub pool_max_size: Option<u32>,
    /// Access token lifetime in seconds.
    pub access_token_ttl_secs: Option<i64>,
    /// Refresh token lifetime in seconds.
    pub refresh_token_ttl_secs: Option<i64>,
    /// Minimum password length accepted at registration.
    pub password_min_length: Option<usize>,
    /// Disable the entirely-numeric password rule.
    #[ortho_config(default = false)]
    pub password_allow_numeric: bool,
    /// Disable the common-password rule.
    #[ortho_config(default = false)]
    pub password_allow_common: bool,
    /// Disable the similar-to-account-attributes rule.
    #[ortho_config(default = false)]
    pub password_allow_similar: bool,
}

/// Settings that failed validation.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid bind address '{value}': {source}")]
    BindAddr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
    #[error("{name} must be a positive number of seconds, got {value}")]
    Lifetime { name: &'static str, value: i64 },
    #[error("pool_max_size must be at least 1")]
    PoolSize,
}

impl ServerSettings {
    fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse().map_err(|source| SettingsError::BindAddr {
            value: raw.to_owned(),
            source,
        })
    }

    fn pool_config(&self) -> Result<Option<PoolConfig>, SettingsError> {
        let Some(url) = self.database_url.as_deref() else {
            return Ok(None);
        };
        let config = PoolConfig::new(url);
        match self.pool_max_size {
            Some(0) => Err(SettingsError::PoolSize),
            Some(size) => Ok(Some(config.with_max_size(size))),
            None => Ok(Some(config)),
        }
    }

    fn password_policy(&self) -> PasswordPolicy {
        let policy = PasswordPolicy::default()
            .with_numeric_check(!self.password_allow_numeric)
            .with_common_check(!self.password_allow_common)
            .with_similarity_check(!self.password_allow_similar);
        match self.password_min_length {
            Some(min) => policy.with_min_length(min),
            None => policy,
        }
    }
}

fn lifetime(
    name: &'static str,
    seconds: Option<i64>,
    default: TimeDelta,
) -> Result<TimeDelta, SettingsError> {
    match seconds {
        None => Ok(default),
        Some(value) if value > 0 => Ok(TimeDelta::seconds(value)),
        Some(value) => Err(SettingsError::Lifetime { name, value }),
    }
}

/// Validated configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) database: Option<PoolConfig>,
    pub(crate) token_key: TokenKey,
    pub(crate) access_ttl: TimeDelta,
    pub(crate) refresh_ttl: TimeDelta,
    pub(crate) password_policy: PasswordPolicy,
}

impl ServerConfig {
    /// Validate `settings` and pair them with the token signing key.
    pub fn from_settings(settings: &ServerSettings, token_key: TokenKey) -> Result<Self, SettingsError> {
        Ok(Self {
            bind_addr: settings.bind_addr()?,
            database: settings.pool_config()?,
            token_key,
            access_ttl: lifetime(
                "access_token_ttl_secs",
                settings.access_token_ttl_secs,
                DEFAULT_ACCESS_TTL,
            )?,
            refresh_ttl: lifetime(
                "refresh_token_ttl_secs",
                settings.refresh_token_ttl_secs,
                DEFAULT_REFRESH_TTL,
            )?,
            password_policy: settings.password_policy(),
        })
    }

    /// Socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 9] = [
        "HEALTHCARE_BIND_ADDR",
        "HEALTHCARE_DATABASE_URL",
        "HEALTHCARE_POOL_MAX_SIZE",
        "HEALTHCARE_ACCESS_TOKEN_TTL_SECS",
        "HEALTHCARE_REFRESH_TOKEN_TTL_SECS",
        "HEALTHCARE_PASSWORD_MIN_LENGTH",
        "HEALTHCARE_PASSWORD_ALLOW_NUMERIC",
        "HEALTHCARE_PASSWORD_ALLOW_COMMON",
        "HEALTHCARE_PASSWORD_ALLOW_SIMILAR",
    ];

    fn load_with(overrides: &[(&str, &str)]) -> ServerSettings {
        let vars = VARS.map(|name| {
            let value = overrides
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value).to_owned());
            (name, value)
        });
        let _guard = lock_env(vars);
        ServerSettings::load_from_iter([OsString::from("healthcare-backend")])
            .expect("config should load")
    }

    fn settings() -> ServerSettings {
        ServerSettings {
            bind_addr: None,
            database_url: None,
            pool_max_size: None,
            access_token_ttl_secs: None,
            refresh_token_ttl_secs: None,
            password_min_length: None,
            password_allow_numeric: false,
            password_allow_common: false,
            password_allow_similar: false,
        }
    }

    #[rstest]
    fn defaults_apply_when_nothing_is_set() {
        let settings = load_with(&[]);

        assert_eq!(
            settings.bind_addr().expect("default address"),
            DEFAULT_BIND_ADDR.parse::<SocketAddr>().expect("literal")
        );
        assert!(settings.pool_config().expect("no database").is_none());
        assert_eq!(settings.password_policy(), PasswordPolicy::default());
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let settings = load_with(&[
            ("HEALTHCARE_BIND_ADDR", "127.0.0.1:9000"),
            ("HEALTHCARE_DATABASE_URL", "postgres://clinic@localhost/records"),
            ("HEALTHCARE_POOL_MAX_SIZE", "4"),
            ("HEALTHCARE_ACCESS_TOKEN_TTL_SECS", "60"),
            ("HEALTHCARE_PASSWORD_MIN_LENGTH", "12"),
            ("HEALTHCARE_PASSWORD_ALLOW_NUMERIC", "true"),
        ]);

        assert_eq!(settings.bind_addr.as_deref(), Some("127.0.0.1:9000"));
        let pool = settings.pool_config().expect("valid").expect("database set");
        assert_eq!(pool.database_url(), "postgres://clinic@localhost/records");
        assert_eq!(settings.access_token_ttl_secs, Some(60));
        assert_eq!(
            settings.password_policy(),
            PasswordPolicy::default()
                .with_min_length(12)
                .with_numeric_check(false)
        );
    }

    #[rstest]
    fn malformed_bind_address_is_reported() {
        let settings = ServerSettings {
            bind_addr: Some("localhost".to_owned()),
            ..settings()
        };

        let err = settings.bind_addr().expect_err("not a socket address");
        assert!(matches!(err, SettingsError::BindAddr { .. }));
    }

    #[rstest]
    #[case(Some(0))]
    #[case(Some(-30))]
    fn non_positive_lifetimes_are_rejected(#[case] seconds: Option<i64>) {
        let err = lifetime("access_token_ttl_secs", seconds, DEFAULT_ACCESS_TTL)
            .expect_err("rejected");
        assert!(matches!(err, SettingsError::Lifetime { .. }));
    }

    #[rstest]
    fn missing_lifetime_uses_default() {
        let ttl = lifetime("refresh_token_ttl_secs", None, DEFAULT_REFRESH_TTL).expect("default");
        assert_eq!(ttl, DEFAULT_REFRESH_TTL);
    }

    #[rstest]
    fn zero_pool_size_is_rejected() {
        let settings = ServerSettings {
            database_url: Some("postgres://localhost/records".to_owned()),
            pool_max_size: Some(0),
            ..settings()
        };

        assert!(matches!(
            settings.pool_config(),
            Err(SettingsError::PoolSize)
        ));
    }
}
