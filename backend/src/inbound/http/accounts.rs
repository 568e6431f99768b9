//! Account HTTP handlers: registration, login and token refresh.
//!
//! ```text
//! POST /api/auth/register {"username":"ada","name":"Ada","email":"ada@example.org","password":"…","password2":"…"}
//! POST /api/auth/login {"email":"ada@example.org","password":"…"}
//! POST /api/auth/token/refresh {"refresh":"…"}
//! ```

use actix_web::{HttpResponse, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use zeroize::Zeroizing;

use crate::domain::{LoginCredentials, LoginOutcome, RegistrationDraft, User};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, required};

const USERNAME: FieldName = FieldName::new("username");
const NAME: FieldName = FieldName::new("name");
const EMAIL: FieldName = FieldName::new("email");
const PASSWORD: FieldName = FieldName::new("password");
const PASSWORD2: FieldName = FieldName::new("password2");
const REFRESH: FieldName = FieldName::new("refresh");

/// Registration request body.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    /// Must repeat `password` exactly.
    pub password2: Option<String>,
}

impl RegisterRequest {
    fn into_draft(self) -> ApiResult<RegistrationDraft> {
        Ok(RegistrationDraft {
            username: required(self.username, USERNAME)?,
            name: required(self.name, NAME)?,
            email: required(self.email, EMAIL)?,
            password: Zeroizing::new(required(self.password, PASSWORD)?),
            password2: Zeroizing::new(required(self.password2, PASSWORD2)?),
        })
    }
}

/// Registered account; credentials are never echoed.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RegisteredUserResponse {
    pub id: String,
    pub username: String,
    pub name: String,
    pub email: String,
}

impl From<User> for RegisteredUserResponse {
    fn from(value: User) -> Self {
        Self {
            id: value.id().to_string(),
            username: value.username().as_ref().to_owned(),
            name: value.name().as_ref().to_owned(),
            email: value.email().to_string(),
        }
    }
}

/// Login request body.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Identity echoed back on login.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginUserResponse {
    pub id: String,
    pub name: String,
    pub email: String,
}

/// Token pair issued on login.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    /// Short-lived bearer token for API calls.
    pub access: String,
    /// Longer-lived token accepted by the refresh endpoint.
    pub refresh: String,
    pub user: LoginUserResponse,
}

impl From<LoginOutcome> for LoginResponse {
    fn from(value: LoginOutcome) -> Self {
        let LoginOutcome { tokens, user } = value;
        Self {
            access: tokens.access,
            refresh: tokens.refresh,
            user: LoginUserResponse {
                id: user.id().to_string(),
                name: user.name().as_ref().to_owned(),
                email: user.email().to_string(),
            },
        }
    }
}

/// Refresh request body.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct RefreshRequest {
    pub refresh: Option<String>,
}

/// Fresh access token.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RefreshResponse {
    pub access: String,
}

/// Create an account.
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = RegisteredUserResponse),
        (status = 400, description = "Invalid or duplicate fields, or weak password", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "register",
    security([])
)]
#[post("/auth/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let draft = payload.into_inner().into_draft()?;
    let user = state.registration.register(draft).await?;
    Ok(HttpResponse::Created().json(RegisteredUserResponse::from(user)))
}

/// Exchange email and password for a token pair.
///
/// Unknown emails and wrong passwords produce the same 401 response.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = LoginResponse),
        (status = 400, description = "Missing or blank fields", body = ErrorSchema),
        (status = 401, description = "Invalid credentials", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/auth/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<LoginResponse>> {
    let LoginRequest { email, password } = payload.into_inner();
    let email = required(email, EMAIL)?;
    let password = Zeroizing::new(required(password, PASSWORD)?);
    let credentials = LoginCredentials::try_from_parts(&email, &password)?;
    let outcome = state.login.login(&credentials).await?;
    Ok(web::Json(LoginResponse::from(outcome)))
}

/// Exchange a refresh token for a new access token.
#[utoipa::path(
    post,
    path = "/api/auth/token/refresh",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "New access token", body = RefreshResponse),
        (status = 400, description = "Missing refresh token", body = ErrorSchema),
        (status = 401, description = "Token invalid or expired", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "refreshToken",
    security([])
)]
#[post("/auth/token/refresh")]
pub async fn refresh(
    state: web::Data<HttpState>,
    payload: web::Json<RefreshRequest>,
) -> ApiResult<web::Json<RefreshResponse>> {
    let token = required(payload.into_inner().refresh, REFRESH)?;
    let access = state.login.refresh(&token).await?;
    Ok(web::Json(RefreshResponse { access }))
}

#[cfg(test)]
#[path = "accounts_tests.rs"]
mod tests;
