//! Token signing key configuration.
//!
//! The HS256 secret is read from a file named by `TOKEN_KEY_FILE`. Debug
//! builds fall back to a random per-process key when the file is missing;
//! release builds refuse to start unless the file exists and is long enough.

use std::path::PathBuf;

use mockable::Env;
use rand::RngCore;
use tracing::warn;
use zeroize::{Zeroize, Zeroizing};

const TOKEN_KEY_DEFAULT_PATH: &str = "/var/run/secrets/token_key";
const TOKEN_KEY_MIN_LEN: usize = 32;
const EPHEMERAL_KEY_LEN: usize = 64;
const KEY_FILE_ENV: &str = "TOKEN_KEY_FILE";
const ALLOW_EPHEMERAL_ENV: &str = "TOKEN_ALLOW_EPHEMERAL";
const BOOL_EXPECTED: &str = "1|0|true|false|yes|no|y|n";

/// Build mode for key validation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    /// Debug builds tolerate a missing key file and warn.
    Debug,
    /// Release builds require an explicit, sufficiently long key.
    Release,
}

impl BuildMode {
    /// Determine the build mode from `cfg!(debug_assertions)`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use healthcare_backend::inbound::http::token_config::BuildMode;
    ///
    /// let mode = BuildMode::from_debug_assertions();
    /// assert_eq!(mode == BuildMode::Debug, cfg!(debug_assertions));
    /// ```
    #[must_use]
    pub fn from_debug_assertions() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }

    fn is_debug(self) -> bool {
        matches!(self, Self::Debug)
    }
}

/// Signing material for bearer tokens.
pub struct TokenKey {
    secret: Zeroizing<Vec<u8>>,
    ephemeral: bool,
}

impl TokenKey {
    /// Raw HS256 secret.
    pub fn secret(&self) -> &[u8] {
        &self.secret
    }

    /// `true` when the key was generated for this process only; tokens will
    /// not survive a restart.
    pub fn is_ephemeral(&self) -> bool {
        self.ephemeral
    }
}

/// Errors raised while loading the token key.
#[derive(thiserror::Error, Debug)]
pub enum TokenConfigError {
    /// A variable is present but contains an invalid value.
    #[error("invalid value for {name}='{value}'; expected {expected}")]
    InvalidEnv {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
    /// Reading the key file failed.
    #[error("failed to read token key at {path}: {source}")]
    KeyRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The key file exists but is too short for release builds.
    #[error("token key at {path} too short: need >= {min_len} bytes, got {length}")]
    KeyTooShort {
        path: PathBuf,
        length: usize,
        min_len: usize,
    },
    /// Release builds must not allow ephemeral keys.
    #[error("TOKEN_ALLOW_EPHEMERAL must be 0 in release builds")]
    EphemeralNotAllowed,
}

/// Load the token signing key from the environment.
///
/// # Examples
///
/// ```rust
/// use healthcare_backend::inbound::http::token_config::{BuildMode, token_key_from_env};
/// use mockable::MockEnv;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let key_path = std::env::temp_dir().join("token_key_example");
/// std::fs::write(&key_path, vec![b'k'; 32])?;
///
/// let key_path = key_path.to_str().expect("valid path").to_string();
/// let mut env = MockEnv::new();
/// env.expect_string().returning(move |name| match name {
///     "TOKEN_KEY_FILE" => Some(key_path.clone()),
///     "TOKEN_ALLOW_EPHEMERAL" => Some("0".to_string()),
///     _ => None,
/// });
///
/// let key = token_key_from_env(&env, BuildMode::Release)?;
/// assert!(!key.is_ephemeral());
/// # Ok(())
/// # }
/// ```
pub fn token_key_from_env<E: Env>(env: &E, mode: BuildMode) -> Result<TokenKey, TokenConfigError> {
    let allow_ephemeral = allow_ephemeral_from_env(env, mode)?;
    let path = PathBuf::from(
        env.string(KEY_FILE_ENV)
            .unwrap_or_else(|| TOKEN_KEY_DEFAULT_PATH.to_string()),
    );

    match std::fs::read(&path) {
        Ok(mut bytes) => {
            let length = bytes.len();
            if mode == BuildMode::Release && length < TOKEN_KEY_MIN_LEN {
                bytes.zeroize();
                return Err(TokenConfigError::KeyTooShort {
                    path,
                    length,
                    min_len: TOKEN_KEY_MIN_LEN,
                });
            }
            Ok(TokenKey {
                secret: Zeroizing::new(bytes),
                ephemeral: false,
            })
        }
        Err(error) => {
            if mode.is_debug() || allow_ephemeral {
                warn!(
                    path = %path.display(),
                    error = %error,
                    "using temporary token key (dev only)"
                );
                let mut secret = Zeroizing::new(vec![0_u8; EPHEMERAL_KEY_LEN]);
                rand::thread_rng().fill_bytes(&mut secret);
                Ok(TokenKey {
                    secret,
                    ephemeral: true,
                })
            } else {
                Err(TokenConfigError::KeyRead {
                    path,
                    source: error,
                })
            }
        }
    }
}

fn allow_ephemeral_from_env<E: Env>(env: &E, mode: BuildMode) -> Result<bool, TokenConfigError> {
    let Some(value) = env.string(ALLOW_EPHEMERAL_ENV) else {
        return Ok(false);
    };
    match parse_bool(&value) {
        Some(true) if mode.is_debug() => Ok(true),
        Some(true) => Err(TokenConfigError::EphemeralNotAllowed),
        Some(false) => Ok(false),
        None if mode.is_debug() => {
            warn!(value = %value, "invalid TOKEN_ALLOW_EPHEMERAL; defaulting to disabled");
            Ok(false)
        }
        None => Err(TokenConfigError::InvalidEnv {
            name: ALLOW_EPHEMERAL_ENV,
            value,
            expected: BOOL_EXPECTED,
        }),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" => Some(true),
        "0" | "false" | "no" | "n" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use env_lock::lock_env;
    use mockable::{DefaultEnv, MockEnv};
    use rstest::rstest;
    use std::collections::HashMap;
    use tempfile::NamedTempFile;

    fn key_file(len: usize) -> NamedTempFile {
        let file = NamedTempFile::new().expect("temp file");
        std::fs::write(file.path(), vec![b'k'; len]).expect("write key");
        file
    }

    fn mock_env(vars: &[(&str, &str)]) -> MockEnv {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        let mut env = MockEnv::new();
        env.expect_string()
            .times(0..)
            .returning(move |key| vars.get(key).cloned());
        env
    }

    fn path_of(file: &NamedTempFile) -> &str {
        file.path().to_str().expect("utf-8 temp path")
    }

    #[rstest]
    fn release_reads_key_file() {
        let file = key_file(TOKEN_KEY_MIN_LEN);
        let env = mock_env(&[(KEY_FILE_ENV, path_of(&file))]);

        let key = token_key_from_env(&env, BuildMode::Release).expect("key loads");

        assert_eq!(key.secret(), vec![b'k'; TOKEN_KEY_MIN_LEN].as_slice());
        assert!(!key.is_ephemeral());
    }

    #[rstest]
    fn release_rejects_short_key() {
        let file = key_file(TOKEN_KEY_MIN_LEN - 1);
        let env = mock_env(&[(KEY_FILE_ENV, path_of(&file))]);

        let err = token_key_from_env(&env, BuildMode::Release)
            .err()
            .expect("short key rejected");

        assert!(matches!(err, TokenConfigError::KeyTooShort { length: 31, .. }));
    }

    #[rstest]
    fn debug_accepts_short_key() {
        let file = key_file(8);
        let env = mock_env(&[(KEY_FILE_ENV, path_of(&file))]);

        let key = token_key_from_env(&env, BuildMode::Debug).expect("debug tolerates");

        assert_eq!(key.secret().len(), 8);
    }

    #[rstest]
    fn release_missing_file_is_an_error() {
        let env = mock_env(&[(KEY_FILE_ENV, "/nonexistent/token_key")]);

        let err = token_key_from_env(&env, BuildMode::Release)
            .err()
            .expect("missing key rejected");

        assert!(matches!(err, TokenConfigError::KeyRead { .. }));
    }

    #[rstest]
    fn debug_missing_file_generates_ephemeral_key() {
        let env = mock_env(&[(KEY_FILE_ENV, "/nonexistent/token_key")]);

        let key = token_key_from_env(&env, BuildMode::Debug).expect("ephemeral key");

        assert!(key.is_ephemeral());
        assert_eq!(key.secret().len(), EPHEMERAL_KEY_LEN);
    }

    #[rstest]
    #[case("1")]
    #[case("yes")]
    fn release_refuses_ephemeral_opt_in(#[case] value: &str) {
        let env = mock_env(&[(ALLOW_EPHEMERAL_ENV, value)]);

        let err = token_key_from_env(&env, BuildMode::Release)
            .err()
            .expect("opt-in rejected");

        assert!(matches!(err, TokenConfigError::EphemeralNotAllowed));
    }

    #[rstest]
    fn release_rejects_unparseable_toggle() {
        let env = mock_env(&[(ALLOW_EPHEMERAL_ENV, "maybe")]);

        let err = token_key_from_env(&env, BuildMode::Release)
            .err()
            .expect("bad toggle rejected");

        assert!(matches!(
            err,
            TokenConfigError::InvalidEnv {
                name: ALLOW_EPHEMERAL_ENV,
                ..
            }
        ));
    }

    #[rstest]
    fn process_environment_names_the_key_file() {
        let file = key_file(TOKEN_KEY_MIN_LEN);
        let _guard = lock_env([
            (KEY_FILE_ENV, Some(path_of(&file))),
            (ALLOW_EPHEMERAL_ENV, None),
        ]);

        let key = token_key_from_env(&DefaultEnv::new(), BuildMode::Release).expect("key loads");

        assert!(!key.is_ephemeral());
        assert_eq!(key.secret().len(), TOKEN_KEY_MIN_LEN);
    }
}
