//! Tests for the account service.

use std::sync::Arc;

use rstest::rstest;
use zeroize::Zeroizing;

use super::*;
use crate::domain::ports::{MockPasswordHasher, MockTokenIssuer, MockUserRepository};
use crate::domain::{DisplayName, ErrorCode, Username};

const STRONG_PASSWORD: &str = "Tr1cky-Sunset!";

fn sample_user() -> User {
    User::new(
        UserId::random(),
        Username::new("jo_smith").expect("valid username"),
        DisplayName::new("Jo Smith").expect("valid name"),
        EmailAddress::new("jo@example.com").expect("valid email"),
    )
}

fn draft(password: &str, confirmation: &str) -> RegistrationDraft {
    RegistrationDraft {
        username: "jo_smith".to_owned(),
        name: "Jo Smith".to_owned(),
        email: "Jo@Example.com".to_owned(),
        password: Zeroizing::new(password.to_owned()),
        password2: Zeroizing::new(confirmation.to_owned()),
    }
}

fn credentials(email: &str) -> LoginCredentials {
    LoginCredentials::try_from_parts(email, STRONG_PASSWORD).expect("non-empty credentials")
}

fn service(
    users: MockUserRepository,
    hasher: MockPasswordHasher,
    tokens: MockTokenIssuer,
) -> AccountService<MockUserRepository, MockPasswordHasher, MockTokenIssuer> {
    AccountService::new(Arc::new(users), Arc::new(hasher), Arc::new(tokens))
}

fn kind_named_tokens() -> MockTokenIssuer {
    let mut tokens = MockTokenIssuer::new();
    tokens
        .expect_issue()
        .returning(|_, kind| Ok(format!("{}-token", kind.as_str())));
    tokens
}

#[tokio::test]
async fn register_stores_only_the_hash() {
    let mut hasher = MockPasswordHasher::new();
    hasher
        .expect_hash()
        .withf(|password| password == STRONG_PASSWORD)
        .times(1)
        .return_once(|_| Ok("$argon2id$stub".to_owned()));
    let mut users = MockUserRepository::new();
    users
        .expect_insert()
        .withf(|account| {
            account.password_hash() == "$argon2id$stub"
                && account.user().email().as_ref() == "jo@example.com"
        })
        .times(1)
        .return_once(|_| Ok(()));

    let user = service(users, hasher, MockTokenIssuer::new())
        .register(draft(STRONG_PASSWORD, STRONG_PASSWORD))
        .await
        .expect("registration succeeds");

    assert_eq!(user.username().as_ref(), "jo_smith");
    assert_eq!(user.name().as_ref(), "Jo Smith");
}

#[tokio::test]
async fn register_rejects_weak_password_before_hashing() {
    let mut hasher = MockPasswordHasher::new();
    hasher.expect_hash().times(0);
    let mut users = MockUserRepository::new();
    users.expect_insert().times(0);

    let error = service(users, hasher, MockTokenIssuer::new())
        .register(draft("12345678", "12345678"))
        .await
        .expect_err("weak password rejected");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
    let details = error.details().expect("details present");
    assert_eq!(details["field"], "password");
    assert_eq!(details["code"], "weak_password");
}

#[tokio::test]
async fn register_rejects_mismatched_confirmation() {
    let mut hasher = MockPasswordHasher::new();
    hasher.expect_hash().times(0);

    let error = service(MockUserRepository::new(), hasher, MockTokenIssuer::new())
        .register(draft(STRONG_PASSWORD, "Tr1cky-Sunrise!"))
        .await
        .expect_err("mismatch rejected");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
    assert_eq!(
        error.details().expect("details present")["code"],
        "password_mismatch"
    );
}

#[rstest]
#[case(UserPersistenceError::duplicate_email(), "email")]
#[case(UserPersistenceError::duplicate_username(), "username")]
#[tokio::test]
async fn register_reports_duplicate_fields(
    #[case] failure: UserPersistenceError,
    #[case] field: &str,
) {
    let mut hasher = MockPasswordHasher::new();
    hasher
        .expect_hash()
        .return_once(|_| Ok("$argon2id$stub".to_owned()));
    let mut users = MockUserRepository::new();
    users.expect_insert().return_once(move |_| Err(failure));

    let error = service(users, hasher, MockTokenIssuer::new())
        .register(draft(STRONG_PASSWORD, STRONG_PASSWORD))
        .await
        .expect_err("duplicate rejected");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
    let details = error.details().expect("details present");
    assert_eq!(details["field"], field);
    assert_eq!(details["code"], "unique");
}

#[tokio::test]
async fn login_issues_both_tokens() {
    let user = sample_user();
    let account = UserAccount::new(user.clone(), "$argon2id$stored");
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_email()
        .withf(|email| email.as_ref() == "jo@example.com")
        .return_once(move |_| Ok(Some(account)));
    let mut hasher = MockPasswordHasher::new();
    hasher
        .expect_verify()
        .withf(|password, hash| password == STRONG_PASSWORD && hash == "$argon2id$stored")
        .return_once(|_, _| Ok(true));

    let outcome = service(users, hasher, kind_named_tokens())
        .login(&credentials("JO@example.com"))
        .await
        .expect("login succeeds");

    assert_eq!(outcome.tokens.access, "access-token");
    assert_eq!(outcome.tokens.refresh, "refresh-token");
    assert_eq!(outcome.user, user);
}

#[tokio::test]
async fn login_failures_share_one_message() {
    let mut users = MockUserRepository::new();
    users.expect_find_by_email().times(1).return_once(|_| Ok(None));
    let mut hasher = MockPasswordHasher::new();
    hasher.expect_verify_dummy().times(1).return_const(());
    hasher.expect_verify().times(0);
    let unknown = service(users, hasher, MockTokenIssuer::new())
        .login(&credentials("nobody@example.com"))
        .await
        .expect_err("unknown email rejected");

    let account = UserAccount::new(sample_user(), "$argon2id$stored");
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_email()
        .return_once(move |_| Ok(Some(account)));
    let mut hasher = MockPasswordHasher::new();
    hasher.expect_verify().return_once(|_, _| Ok(false));
    let mut tokens = MockTokenIssuer::new();
    tokens.expect_issue().times(0);
    let wrong = service(users, hasher, tokens)
        .login(&credentials("jo@example.com"))
        .await
        .expect_err("wrong password rejected");

    assert_eq!(unknown.code(), ErrorCode::Unauthorized);
    assert_eq!(unknown, wrong);
    assert_eq!(unknown.message(), INVALID_CREDENTIALS);
}

#[tokio::test]
async fn login_with_malformed_email_skips_lookup() {
    let mut users = MockUserRepository::new();
    users.expect_find_by_email().times(0);
    let mut hasher = MockPasswordHasher::new();
    hasher.expect_verify_dummy().times(1).return_const(());

    let error = service(users, hasher, MockTokenIssuer::new())
        .login(&credentials("not-an-email"))
        .await
        .expect_err("rejected");

    assert_eq!(error.message(), INVALID_CREDENTIALS);
}

#[tokio::test]
async fn login_maps_connection_error_to_service_unavailable() {
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_email()
        .return_once(|_| Err(UserPersistenceError::connection("pool exhausted")));

    let error = service(users, MockPasswordHasher::new(), MockTokenIssuer::new())
        .login(&credentials("jo@example.com"))
        .await
        .expect_err("unavailable");

    assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
}

#[tokio::test]
async fn refresh_issues_new_access_token_for_existing_user() {
    let user = sample_user();
    let subject = user.id();
    let mut tokens = MockTokenIssuer::new();
    tokens
        .expect_verify()
        .withf(|token, kind| token == "refresh-token" && *kind == TokenKind::Refresh)
        .return_once(move |_, _| Ok(subject));
    tokens
        .expect_issue()
        .withf(move |id, kind| *id == subject && *kind == TokenKind::Access)
        .return_once(|_, _| Ok("fresh-access".to_owned()));
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(user)));

    let access = service(users, MockPasswordHasher::new(), tokens)
        .refresh("refresh-token")
        .await
        .expect("refresh succeeds");

    assert_eq!(access, "fresh-access");
}

#[rstest]
#[case(TokenError::wrong_kind("refresh"))]
#[case(TokenError::expired())]
#[case(TokenError::invalid("bad signature"))]
#[tokio::test]
async fn refresh_rejects_unusable_tokens(#[case] failure: TokenError) {
    let mut tokens = MockTokenIssuer::new();
    tokens.expect_verify().return_once(move |_, _| Err(failure));
    let mut users = MockUserRepository::new();
    users.expect_find_by_id().times(0);

    let error = service(users, MockPasswordHasher::new(), tokens)
        .refresh("access-token")
        .await
        .expect_err("rejected");

    assert_eq!(error.code(), ErrorCode::Unauthorized);
    assert_eq!(error.message(), INVALID_TOKEN);
}

#[tokio::test]
async fn refresh_rejects_tokens_of_removed_users() {
    let mut tokens = MockTokenIssuer::new();
    tokens
        .expect_verify()
        .return_once(|_, _| Ok(UserId::random()));
    tokens.expect_issue().times(0);
    let mut users = MockUserRepository::new();
    users.expect_find_by_id().return_once(|_| Ok(None));

    let error = service(users, MockPasswordHasher::new(), tokens)
        .refresh("refresh-token")
        .await
        .expect_err("rejected");

    assert_eq!(error.code(), ErrorCode::Unauthorized);
}

#[test]
fn authenticate_bearer_accepts_access_tokens_only() {
    let subject = UserId::random();
    let mut tokens = MockTokenIssuer::new();
    tokens
        .expect_verify()
        .withf(|_, kind| *kind == TokenKind::Access)
        .returning(move |token, _| {
            if token == "good" {
                Ok(subject)
            } else {
                Err(TokenError::wrong_kind("access"))
            }
        });
    let service = service(MockUserRepository::new(), MockPasswordHasher::new(), tokens);

    assert_eq!(service.authenticate_bearer("good").expect("valid"), subject);
    let error = service.authenticate_bearer("refresh").expect_err("rejected");
    assert_eq!(error.code(), ErrorCode::Unauthorized);
}

#[test]
fn signing_failures_are_internal() {
    let mut tokens = MockTokenIssuer::new();
    tokens
        .expect_issue()
        .return_once(|_, _| Err(TokenError::signing("key unavailable")));
    let service = service(MockUserRepository::new(), MockPasswordHasher::new(), tokens);

    let error = service
        .issue(&UserId::random(), TokenKind::Access)
        .expect_err("signing fails");

    assert_eq!(error.code(), ErrorCode::InternalError);
}
