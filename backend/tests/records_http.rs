//! End-to-end HTTP tests over the in-memory store.
//!
//! Each test builds the full API application with real services, so the
//! requests travel through bearer extraction, access policy and the store
//! exactly as in a running server.

use std::sync::{Arc, Mutex};

use actix_http::Request;
use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::middleware::NormalizePath;
use actix_web::{App, test as actix_test, web};
use argon2::Params;
use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
use mockable::Clock;
use rstest::{fixture, rstest};
use serde_json::{Value, json};

use healthcare_backend::Trace;
use healthcare_backend::domain::{AccountService, DoctorService, MappingService, PatientService};
use healthcare_backend::inbound::http::configure_api;
use healthcare_backend::inbound::http::state::HttpState;
use healthcare_backend::outbound::memory::InMemoryStore;
use healthcare_backend::outbound::security::{
    Argon2PasswordHasher, DEFAULT_ACCESS_TTL, JwtTokenIssuer,
};

const SECRET: &[u8] = b"records-http-signing-secret-0123456789";
const PASSWORD: &str = "Quiet-Harbour-42";

/// Clock the tests can move forward to expire tokens.
struct SteppingClock(Mutex<DateTime<Utc>>);

impl SteppingClock {
    fn advance(&self, by: TimeDelta) {
        let mut now = self.0.lock().expect("clock lock");
        *now += by;
    }
}

impl Clock for SteppingClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.0.lock().expect("clock lock")
    }
}

struct Harness {
    state: HttpState,
    clock: Arc<SteppingClock>,
}

#[fixture]
fn harness() -> Harness {
    let start = Utc
        .with_ymd_and_hms(2026, 5, 4, 8, 0, 0)
        .single()
        .expect("timestamp");
    let clock = Arc::new(SteppingClock(Mutex::new(start)));
    let store = Arc::new(InMemoryStore::new());
    let params = Params::new(Params::MIN_M_COST, 1, 1, None).expect("valid params");
    let hasher = Argon2PasswordHasher::with_params(params).expect("hasher builds");
    let tokens = JwtTokenIssuer::new(SECRET, clock.clone());
    let state = HttpState::from_services(
        Arc::new(AccountService::new(
            store.clone(),
            Arc::new(hasher),
            Arc::new(tokens),
        )),
        Arc::new(PatientService::new(store.clone(), clock.clone())),
        Arc::new(DoctorService::new(store.clone(), clock.clone())),
        Arc::new(MappingService::new(
            store.clone(),
            store.clone(),
            store,
            clock.clone(),
        )),
    );
    Harness { state, clock }
}

async fn app(
    state: HttpState,
) -> impl Service<Request, Response = ServiceResponse<impl MessageBody>, Error = actix_web::Error> {
    actix_test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .wrap(NormalizePath::trim())
            .wrap(Trace)
            .configure(configure_api),
    )
    .await
}

async fn send<S, B>(app: &S, request: actix_test::TestRequest) -> (StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let response = actix_test::call_service(app, request.to_request()).await;
    let status = response.status();
    let body = actix_test::read_body(response).await;
    (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
}

fn authed(request: actix_test::TestRequest, token: &str) -> actix_test::TestRequest {
    request.insert_header(("Authorization", format!("Bearer {token}")))
}

struct Session {
    user_id: String,
    access: String,
    refresh: String,
}

async fn register_and_login<S, B>(app: &S, username: &str) -> Session
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let email = format!("{username}@example.com");
    let (status, registered) = send(
        app,
        actix_test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(json!({
                "username": username,
                "name": format!("{username} tester"),
                "email": email,
                "password": PASSWORD,
                "password2": PASSWORD,
            })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register: {registered}");
    assert!(registered.get("password").is_none());

    let (status, login) = send(
        app,
        actix_test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({ "email": email, "password": PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login: {login}");
    assert_eq!(login["user"]["id"], registered["id"]);

    Session {
        user_id: registered["id"].as_str().expect("id").to_owned(),
        access: login["access"].as_str().expect("access").to_owned(),
        refresh: login["refresh"].as_str().expect("refresh").to_owned(),
    }
}

async fn create<S, B>(app: &S, token: &str, uri: &str, body: Value) -> Value
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let (status, created) = send(
        app,
        authed(actix_test::TestRequest::post().uri(uri), token).set_json(body),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create {uri}: {created}");
    created
}

fn patient(name: &str, age: i64) -> Value {
    json!({ "name": name, "age": age, "gender": "female", "address": "1 Harbour Road" })
}

fn doctor(name: &str, email: &str) -> Value {
    json!({
        "name": name,
        "specialization": "Cardiology",
        "phone": "+44 20 7946 0000",
        "email": email,
    })
}

fn id_of(value: &Value) -> &str {
    value["id"].as_str().expect("id")
}

#[rstest]
#[actix_web::test]
async fn records_flow_from_registration_to_assignment(harness: Harness) {
    let app = app(harness.state).await;
    let session = register_and_login(&app, "ada").await;

    let jo = create(&app, &session.access, "/api/patients", patient("Jo", 30)).await;
    assert_eq!(jo["age"], 30);
    let dr_k = create(&app, &session.access, "/api/doctors", doctor("Dr K", "k@clinic.example")).await;

    let mapping = create(
        &app,
        &session.access,
        "/api/mappings",
        json!({ "patient": id_of(&jo), "doctor": id_of(&dr_k) }),
    )
    .await;
    assert_eq!(mapping["patient_name"], "Jo");
    assert_eq!(mapping["doctor_name"], "Dr K");

    let (status, body) = send(
        &app,
        authed(actix_test::TestRequest::post().uri("/api/mappings"), &session.access)
            .set_json(json!({ "patient": id_of(&jo), "doctor": id_of(&dr_k) })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "conflict");

    let (status, listed) = send(
        &app,
        authed(actix_test::TestRequest::get().uri("/api/mappings/"), &session.access),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().map(Vec::len), Some(1));
}

#[rstest]
#[actix_web::test]
async fn other_users_records_are_invisible(harness: Harness) {
    let app = app(harness.state).await;
    let owner = register_and_login(&app, "ada").await;
    let intruder = register_and_login(&app, "mallory").await;
    let jo = create(&app, &owner.access, "/api/patients", patient("Jo", 30)).await;
    let uri = format!("/api/patients/{}", id_of(&jo));

    let (status, listed) = send(
        &app,
        authed(actix_test::TestRequest::get().uri("/api/patients"), &intruder.access),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed, json!([]));

    for request in [
        actix_test::TestRequest::get().uri(&uri),
        actix_test::TestRequest::patch()
            .uri(&uri)
            .set_json(json!({ "age": 31 })),
        actix_test::TestRequest::delete().uri(&uri),
    ] {
        let (status, body) = send(&app, authed(request, &intruder.access)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "not_found");
    }

    let (status, body) = send(
        &app,
        authed(actix_test::TestRequest::get().uri(&uri), &owner.access),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["age"], 30);
}

#[rstest]
#[actix_web::test]
async fn assigning_to_someone_elses_patient_is_forbidden(harness: Harness) {
    let app = app(harness.state).await;
    let owner = register_and_login(&app, "ada").await;
    let intruder = register_and_login(&app, "mallory").await;
    let jo = create(&app, &owner.access, "/api/patients", patient("Jo", 30)).await;
    let dr_k = create(&app, &intruder.access, "/api/doctors", doctor("Dr K", "k@clinic.example")).await;

    let (status, body) = send(
        &app,
        authed(actix_test::TestRequest::post().uri("/api/mappings"), &intruder.access)
            .set_json(json!({ "patient": id_of(&jo), "doctor": id_of(&dr_k) })),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "forbidden");
}

#[rstest]
#[actix_web::test]
async fn unknown_references_are_bad_requests(harness: Harness) {
    let app = app(harness.state).await;
    let session = register_and_login(&app, "ada").await;
    let jo = create(&app, &session.access, "/api/patients", patient("Jo", 30)).await;

    let (status, body) = send(
        &app,
        authed(actix_test::TestRequest::post().uri("/api/mappings"), &session.access).set_json(
            json!({ "patient": id_of(&jo), "doctor": "00000000-0000-4000-8000-000000000000" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_request");
}

#[rstest]
#[actix_web::test]
async fn deleting_either_side_removes_its_mappings(harness: Harness) {
    let app = app(harness.state).await;
    let session = register_and_login(&app, "ada").await;
    let jo = create(&app, &session.access, "/api/patients", patient("Jo", 30)).await;
    let sam = create(&app, &session.access, "/api/patients", patient("Sam", 41)).await;
    let dr_k = create(&app, &session.access, "/api/doctors", doctor("Dr K", "k@clinic.example")).await;
    for patient in [&jo, &sam] {
        create(
            &app,
            &session.access,
            "/api/mappings",
            json!({ "patient": id_of(patient), "doctor": id_of(&dr_k) }),
        )
        .await;
    }

    let (status, _) = send(
        &app,
        authed(
            actix_test::TestRequest::delete().uri(&format!("/api/patients/{}", id_of(&jo))),
            &session.access,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, listed) = send(
        &app,
        authed(actix_test::TestRequest::get().uri("/api/mappings"), &session.access),
    )
    .await;
    assert_eq!(listed.as_array().map(Vec::len), Some(1));
    assert_eq!(listed[0]["patient_name"], "Sam");

    let (status, _) = send(
        &app,
        authed(
            actix_test::TestRequest::delete().uri(&format!("/api/doctors/{}", id_of(&dr_k))),
            &session.access,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, listed) = send(
        &app,
        authed(actix_test::TestRequest::get().uri("/api/mappings"), &session.access),
    )
    .await;
    assert_eq!(listed, json!([]));
}

#[rstest]
#[actix_web::test]
async fn duplicate_registration_email_is_rejected(harness: Harness) {
    let app = app(harness.state).await;
    register_and_login(&app, "ada").await;

    let (status, body) = send(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(json!({
                "username": "ada2",
                "name": "Ada Again",
                "email": "ada@example.com",
                "password": PASSWORD,
                "password2": PASSWORD,
            })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["field"], "email");
}

#[rstest]
#[actix_web::test]
async fn wrong_password_is_unauthorised(harness: Harness) {
    let app = app(harness.state).await;
    register_and_login(&app, "ada").await;

    let (status, body) = send(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({ "email": "ada@example.com", "password": "not-the-password" })),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "unauthorized");
}

#[rstest]
#[actix_web::test]
async fn expired_access_tokens_are_renewed_with_the_refresh_token(harness: Harness) {
    let clock = harness.clock.clone();
    let app = app(harness.state).await;
    let session = register_and_login(&app, "ada").await;

    clock.advance(DEFAULT_ACCESS_TTL + TimeDelta::seconds(1));
    let (status, _) = send(
        &app,
        authed(actix_test::TestRequest::get().uri("/api/patients"), &session.access),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app,
        authed(actix_test::TestRequest::get().uri("/api/patients"), &session.refresh),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED, "refresh token is not a bearer");

    let (status, renewed) = send(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/auth/token/refresh")
            .set_json(json!({ "refresh": session.refresh })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let access = renewed["access"].as_str().expect("access");

    let (status, _) = send(
        &app,
        authed(actix_test::TestRequest::get().uri("/api/patients"), access),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[rstest]
#[actix_web::test]
async fn access_tokens_cannot_refresh(harness: Harness) {
    let app = app(harness.state).await;
    let session = register_and_login(&app, "ada").await;

    let (status, _) = send(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/auth/token/refresh")
            .set_json(json!({ "refresh": session.access })),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[rstest]
#[actix_web::test]
async fn patient_records_need_credentials(harness: Harness) {
    let app = app(harness.state).await;

    let (status, body) = send(&app, actix_test::TestRequest::get().uri("/api/patients")).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["traceId"].is_string());
}

#[rstest]
#[actix_web::test]
async fn banner_lists_the_entry_points(harness: Harness) {
    let app = app(harness.state).await;

    let (status, body) = send(&app, actix_test::TestRequest::get().uri("/")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["visit"], "/api/");
    assert!(
        body["resources"]
            .as_array()
            .expect("resources")
            .iter()
            .any(|entry| entry == "/api/patients/")
    );
}

#[rstest]
#[actix_web::test]
async fn login_reports_the_account_owner(harness: Harness) {
    let app = app(harness.state).await;
    let session = register_and_login(&app, "ada").await;

    let (_, login) = send(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({ "email": "ada@example.com", "password": PASSWORD })),
    )
    .await;

    assert_eq!(login["user"]["id"], session.user_id);
    assert_eq!(login["user"]["name"], "ada tester");
}

#[rstest]
#[case::doctor_create(actix_test::TestRequest::post().uri("/api/doctors"), "{}")]
#[case::doctor_replace(actix_test::TestRequest::put().uri("/api/doctors/not-a-uuid"), "{}")]
#[case::doctor_malformed_json(actix_test::TestRequest::post().uri("/api/doctors"), "{\"name\":")]
#[case::patient_create(actix_test::TestRequest::post().uri("/api/patients"), "{\"name\":\"Jo\"}")]
#[case::patient_bad_id(actix_test::TestRequest::get().uri("/api/patients/not-a-uuid"), "")]
#[case::mapping_create(actix_test::TestRequest::post().uri("/api/mappings"), "{}")]
#[case::mapping_bad_id(actix_test::TestRequest::delete().uri("/api/mappings/not-a-uuid"), "")]
#[actix_web::test]
async fn anonymous_requests_are_unauthorised_before_the_request_is_parsed(
    harness: Harness,
    #[case] request: actix_test::TestRequest,
    #[case] body: &'static str,
) {
    let app = app(harness.state).await;
    let request = if body.is_empty() {
        request
    } else {
        request
            .insert_header(("content-type", "application/json"))
            .set_payload(body)
    };

    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "unauthorized");
}

#[rstest]
#[actix_web::test]
async fn foreign_ids_answer_not_found_before_the_body_is_checked(harness: Harness) {
    let app = app(harness.state).await;
    let owner = register_and_login(&app, "ada").await;
    let intruder = register_and_login(&app, "mallory").await;
    let jo = create(&app, &owner.access, "/api/patients", patient("Jo", 30)).await;
    let kim = create(
        &app,
        &owner.access,
        "/api/doctors",
        doctor("Dr Kim", "kim@clinic.example"),
    )
    .await;
    let mapping = create(
        &app,
        &owner.access,
        "/api/mappings",
        json!({ "patient": id_of(&jo), "doctor": id_of(&kim) }),
    )
    .await;
    let patient_uri = format!("/api/patients/{}", id_of(&jo));
    let mapping_uri = format!("/api/mappings/{}", id_of(&mapping));

    for request in [
        actix_test::TestRequest::put()
            .uri(&patient_uri)
            .set_json(json!({ "name": "Jo" })),
        actix_test::TestRequest::patch()
            .uri(&patient_uri)
            .set_json(json!({ "age": "old" })),
        actix_test::TestRequest::put()
            .uri(&mapping_uri)
            .set_json(json!({})),
        actix_test::TestRequest::patch()
            .uri(&mapping_uri)
            .set_json(json!({ "doctor": "7" })),
        actix_test::TestRequest::put()
            .uri("/api/doctors/00000000-0000-4000-8000-000000000000")
            .set_json(json!({})),
    ] {
        let (status, body) = send(&app, authed(request, &intruder.access)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "not_found");
    }

    let (status, body) = send(
        &app,
        authed(
            actix_test::TestRequest::patch()
                .uri(&patient_uri)
                .set_json(json!({ "age": "old" })),
            &owner.access,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["field"], "age");
}
