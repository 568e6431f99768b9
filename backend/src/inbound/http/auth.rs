//! Bearer-token identity for HTTP handlers.
//!
//! Public routes take a [`Caller`] and pass its optional user id to the
//! domain. Routes that always need an identity take [`SignedIn`] ahead of any
//! path or body extractor, so anonymous requests answer 401 before the
//! request is parsed. A missing `Authorization` header is an anonymous
//! caller; a header that is present but unusable is rejected with the same
//! message as an expired token.

use actix_web::http::header::{AUTHORIZATION, HeaderMap};
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::{Ready, ready};
use tracing::debug;

use crate::domain::access::CREDENTIALS_MISSING;
use crate::domain::{Error, INVALID_TOKEN, UserId};
use crate::inbound::http::state::HttpState;

const BEARER_SCHEME: &str = "Bearer";

/// Identity of the requester, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller(Option<UserId>);

impl Caller {
    /// The authenticated user id, or `None` for anonymous requests.
    #[must_use]
    pub fn user_id(&self) -> Option<UserId> {
        self.0
    }
}

/// Extract the raw token from an `Authorization: Bearer <token>` header.
///
/// Returns `Ok(None)` when the header is absent.
fn bearer_token(headers: &HeaderMap) -> Result<Option<&str>, Error> {
    let Some(value) = headers.get(AUTHORIZATION) else {
        return Ok(None);
    };
    let raw = value.to_str().map_err(|_| rejected("header is not ASCII"))?;
    let mut parts = raw.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some(token), None) if scheme.eq_ignore_ascii_case(BEARER_SCHEME) => {
            Ok(Some(token))
        }
        _ => Err(rejected("expected two space-delimited values: Bearer <token>")),
    }
}

fn rejected(reason: &'static str) -> Error {
    debug!(reason, "authorization header rejected");
    Error::unauthorized(INVALID_TOKEN)
}

/// Caller that presented a usable bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignedIn(UserId);

impl SignedIn {
    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.0
    }

    /// Identity in the form the domain services accept.
    #[must_use]
    pub fn caller(&self) -> Option<UserId> {
        Some(self.0)
    }
}

fn resolve(req: &HttpRequest) -> Result<Caller, Error> {
    let Some(token) = bearer_token(req.headers())? else {
        return Ok(Caller(None));
    };
    let state = req
        .app_data::<web::Data<HttpState>>()
        .ok_or_else(|| Error::internal("HTTP state is not configured"))?;
    state.login.authenticate_bearer(token).map(|id| Caller(Some(id)))
}

impl FromRequest for Caller {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(resolve(req))
    }
}

impl FromRequest for SignedIn {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let signed_in = resolve(req).and_then(|caller| match caller.0 {
            Some(id) => Ok(Self(id)),
            None => {
                debug!(path = req.path(), "anonymous request to a signed-in route");
                Err(Error::unauthorized(CREDENTIALS_MISSING))
            }
        });
        ready(signed_in)
    }
}
