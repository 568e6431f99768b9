//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::middleware::NormalizePath;
use actix_web::{App, web};
use argon2::Params;
use zeroize::Zeroizing;

use crate::Trace;
use crate::domain::ports::{
    MockDoctorCommand, MockDoctorQuery, MockLoginService, MockMappingCommand, MockMappingQuery,
    MockPatientCommand, MockPatientQuery, MockRegistrationService,
};
use crate::domain::{
    AccountService, DoctorService, LoginCredentials, MappingService, PatientService,
    RegistrationDraft, UserId,
};
use crate::inbound::http::configure_api;
use crate::inbound::http::state::HttpState;
use crate::outbound::memory::InMemoryStore;
use crate::outbound::security::{Argon2PasswordHasher, JwtTokenIssuer};
use crate::test_support::fixture_clock;

const TEST_SECRET: &[u8] = b"http-tests-signing-secret-0123456789";

/// State whose ports are all expectation-free mocks except `login`.
pub fn state_with_login(login: MockLoginService) -> HttpState {
    HttpState {
        registration: Arc::new(MockRegistrationService::new()),
        login: Arc::new(login),
        patients: Arc::new(MockPatientQuery::new()),
        patient_commands: Arc::new(MockPatientCommand::new()),
        doctors: Arc::new(MockDoctorQuery::new()),
        doctor_commands: Arc::new(MockDoctorCommand::new()),
        mappings: Arc::new(MockMappingQuery::new()),
        mapping_commands: Arc::new(MockMappingCommand::new()),
    }
}

/// State backed by real services over a fresh in-memory store.
///
/// Argon2 runs with minimum cost so registration stays fast.
pub fn memory_state() -> HttpState {
    let store = Arc::new(InMemoryStore::new());
    let clock = fixture_clock();
    let params = Params::new(Params::MIN_M_COST, 1, 1, None).expect("valid params");
    let hasher = Argon2PasswordHasher::with_params(params).expect("hasher builds");
    let tokens = JwtTokenIssuer::new(TEST_SECRET, clock.clone());
    HttpState::from_services(
        Arc::new(AccountService::new(
            store.clone(),
            Arc::new(hasher),
            Arc::new(tokens),
        )),
        Arc::new(PatientService::new(store.clone(), clock.clone())),
        Arc::new(DoctorService::new(store.clone(), clock.clone())),
        Arc::new(MappingService::new(store.clone(), store.clone(), store, clock)),
    )
}

/// Register an account directly through the service and return its access token.
pub async fn sign_up(state: &HttpState, username: &str) -> (UserId, String) {
    let email = format!("{username}@example.com");
    let user = state
        .registration
        .register(RegistrationDraft {
            username: username.to_owned(),
            name: format!("{username} tester"),
            email: email.clone(),
            password: Zeroizing::new("Quiet-Harbour-42".to_owned()),
            password2: Zeroizing::new("Quiet-Harbour-42".to_owned()),
        })
        .await
        .expect("registration succeeds");
    let credentials =
        LoginCredentials::try_from_parts(&email, "Quiet-Harbour-42").expect("credentials");
    let outcome = state.login.login(&credentials).await.expect("login succeeds");
    (user.id(), outcome.tokens.access)
}

/// `Authorization` header value for a bearer token.
pub fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {token}"))
}

/// Full API application over the given state.
pub fn test_app(
    state: HttpState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(state))
        .wrap(NormalizePath::trim())
        .wrap(Trace)
        .configure(configure_api)
}
