//! HS256 JSON Web Token implementation of the `TokenIssuer` port.
//!
//! Expiry is checked against the injected clock instead of the system time,
//! so tests can move time forward without sleeping.

use std::sync::Arc;

use chrono::TimeDelta;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::ports::{TokenError, TokenIssuer};
use crate::domain::{TokenKind, UserId};

/// Default access token lifetime.
pub const DEFAULT_ACCESS_TTL: TimeDelta = TimeDelta::minutes(5);
/// Default refresh token lifetime.
pub const DEFAULT_REFRESH_TTL: TimeDelta = TimeDelta::days(1);

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    iat: i64,
    exp: i64,
    jti: String,
    token_type: String,
}

/// Signs and verifies bearer tokens with a shared secret.
#[derive(Clone)]
pub struct JwtTokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    clock: Arc<dyn Clock>,
    access_ttl: TimeDelta,
    refresh_ttl: TimeDelta,
}

impl JwtTokenIssuer {
    /// Issuer using the default lifetimes.
    pub fn new(secret: &[u8], clock: Arc<dyn Clock>) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            clock,
            access_ttl: DEFAULT_ACCESS_TTL,
            refresh_ttl: DEFAULT_REFRESH_TTL,
        }
    }

    #[must_use]
    pub fn with_lifetimes(mut self, access: TimeDelta, refresh: TimeDelta) -> Self {
        self.access_ttl = access;
        self.refresh_ttl = refresh;
        self
    }

    fn ttl(&self, kind: TokenKind) -> TimeDelta {
        match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        }
    }

    fn validation() -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp", "sub"]);
        validation
    }
}

impl TokenIssuer for JwtTokenIssuer {
    fn issue(&self, subject: &UserId, kind: TokenKind) -> Result<String, TokenError> {
        let issued_at = self.clock.utc();
        let claims = Claims {
            sub: subject.to_string(),
            iat: issued_at.timestamp(),
            exp: (issued_at + self.ttl(kind)).timestamp(),
            jti: Uuid::new_v4().simple().to_string(),
            token_type: kind.as_str().to_owned(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|error| TokenError::signing(error.to_string()))
    }

    fn verify(&self, token: &str, expected: TokenKind) -> Result<UserId, TokenError> {
        let claims = decode::<Claims>(token, &self.decoding, &Self::validation())
            .map_err(|error| TokenError::invalid(error.to_string()))?
            .claims;

        if claims.exp <= self.clock.utc().timestamp() {
            return Err(TokenError::expired());
        }
        if claims.token_type != expected.as_str() {
            return Err(TokenError::wrong_kind(expected.as_str()));
        }
        UserId::new(&claims.sub).map_err(|error| TokenError::invalid(error.to_string()))
    }
}
