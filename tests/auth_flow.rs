//! Integration tests for the authentication flows
//!
//! These tests drive the real handlers against a temp-file SQLite
//! database, with a recording mailer standing in for SMTP.

use async_trait::async_trait;
use axum::{
    body::to_bytes,
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use parking_lot::Mutex;
use std::sync::Arc;
use tempfile::NamedTempFile;

use shipway_backend::{
    auth::{
        api as auth_api,
        middleware::resolve_user,
        models::{ForgotPasswordRequest, LoginRequest, RegisterRequest, ResetPasswordRequest},
        JwtHandler, UserStore,
    },
    config::{AppMode, Config},
    db::Database,
    error::ApiError,
    mail::Mailer,
    shipping::ShippingStore,
    state::AppState,
};

/// Captures outbound mail instead of sending it
#[derive(Default)]
struct RecordingMailer {
    sent: Mutex<Vec<(String, String, String)>>,
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> anyhow::Result<()> {
        self.sent
            .lock()
            .push((to.to_string(), subject.to_string(), body.to_string()));
        Ok(())
    }
}

fn test_state() -> (AppState, Arc<RecordingMailer>, NamedTempFile) {
    let temp_file = NamedTempFile::new().unwrap();
    let db = Database::open(temp_file.path().to_str().unwrap()).unwrap();

    let config = Config {
        mode: AppMode::Development,
        port: 0,
        database_path: temp_file.path().to_string_lossy().to_string(),
        jwt_secret: "test-secret-key-12345".to_string(),
        token_ttl_hours: 24,
        cookie_expires_days: 1,
        // Minimum cost keeps the hashing in these flows fast
        bcrypt_cost: 4,
        frontend_url: "http://localhost:5173".to_string(),
        smtp: None,
    };

    let mailer = Arc::new(RecordingMailer::default());

    let state = AppState {
        users: Arc::new(UserStore::new(db.clone())),
        shipping: Arc::new(ShippingStore::new(db)),
        jwt: Arc::new(JwtHandler::new(config.jwt_secret.clone())),
        mailer: mailer.clone(),
        config: Arc::new(config),
    };

    (state, mailer, temp_file)
}

fn register_payload(email: &str) -> RegisterRequest {
    RegisterRequest {
        first_name: Some("Alice".to_string()),
        last_name: Some("Smith".to_string()),
        email: Some(email.to_string()),
        password: Some("hunter2hunter2".to_string()),
        address: Some("1 Main St".to_string()),
        telephone_number: Some("0771234567".to_string()),
        role: None,
        nic: None,
    }
}

fn empty_payload() -> RegisterRequest {
    RegisterRequest {
        first_name: None,
        last_name: None,
        email: None,
        password: None,
        address: None,
        telephone_number: None,
        role: None,
        nic: None,
    }
}

async fn register(state: &AppState, email: &str) -> axum::response::Response {
    auth_api::register_user(
        State(state.clone()),
        CookieJar::new(),
        Json(register_payload(email)),
    )
    .await
    .unwrap()
}

async fn login(state: &AppState, email: &str, password: &str) -> Result<StatusCode, ApiError> {
    auth_api::login(
        State(state.clone()),
        CookieJar::new(),
        Json(LoginRequest {
            email: Some(email.to_string()),
            password: Some(password.to_string()),
        }),
    )
    .await
    .map(|response| response.status())
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn error_parts(err: ApiError) -> (StatusCode, String) {
    let response = err.into_response();
    let status = response.status();
    let value = body_json(response).await;
    (
        status,
        value["message"].as_str().unwrap_or_default().to_string(),
    )
}

#[tokio::test]
async fn test_register_sets_cookie_and_sanitizes() {
    let (state, _mailer, _temp) = test_state();

    let response = register(&state, "alice@example.com").await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(cookie.starts_with("token="));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("Path=/"));

    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert!(!body["token"].as_str().unwrap().is_empty());
    assert_eq!(body["user"]["email"], "alice@example.com");
    assert_eq!(body["user"]["role"], "user");
    assert!(body["user"].get("password").is_none());
    assert!(body["user"].get("password_hash").is_none());
}

#[tokio::test]
async fn test_register_duplicate_email_conflicts() {
    let (state, _mailer, _temp) = test_state();

    register(&state, "alice@example.com").await;

    let err = auth_api::register_user(
        State(state.clone()),
        CookieJar::new(),
        Json(register_payload("alice@example.com")),
    )
    .await
    .unwrap_err();

    let (status, message) = error_parts(err).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(message, "User already exists");
}

#[tokio::test]
async fn test_register_empty_payload_lists_every_field() {
    let (state, _mailer, _temp) = test_state();

    let err = auth_api::register_user(
        State(state.clone()),
        CookieJar::new(),
        Json(empty_payload()),
    )
    .await
    .unwrap_err();

    let (status, message) = error_parts(err).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    for expected in [
        "First name is required",
        "Last name is required",
        "Address is required",
        "Email is required",
        "Phone number is required",
        "Password is required",
    ] {
        assert!(message.contains(expected), "missing: {}", expected);
    }
}

#[tokio::test]
async fn test_login_success() {
    let (state, _mailer, _temp) = test_state();

    register(&state, "alice@example.com").await;

    let status = login(&state, "alice@example.com", "hunter2hunter2")
        .await
        .unwrap();
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_login_failures_share_one_message() {
    let (state, _mailer, _temp) = test_state();

    register(&state, "alice@example.com").await;

    let wrong_password = login(&state, "alice@example.com", "wrong-password")
        .await
        .unwrap_err();
    let unknown_email = login(&state, "ghost@example.com", "hunter2hunter2")
        .await
        .unwrap_err();

    let (status_a, message_a) = error_parts(wrong_password).await;
    let (status_b, message_b) = error_parts(unknown_email).await;

    assert_eq!(status_a, StatusCode::UNAUTHORIZED);
    assert_eq!(status_b, StatusCode::UNAUTHORIZED);
    assert_eq!(message_a, "Invalid Email or Password");
    assert_eq!(message_a, message_b);
}

#[tokio::test]
async fn test_login_requires_both_fields() {
    let (state, _mailer, _temp) = test_state();

    let err = auth_api::login(
        State(state.clone()),
        CookieJar::new(),
        Json(LoginRequest {
            email: Some("alice@example.com".to_string()),
            password: None,
        }),
    )
    .await
    .unwrap_err();

    let (status, message) = error_parts(err).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(message, "Please enter email & password");
}

#[tokio::test]
async fn test_admin_bootstrap_rules() {
    let (state, _mailer, _temp) = test_state();

    // The first admin registers without any session
    let response = auth_api::register_admin(
        State(state.clone()),
        CookieJar::new(),
        None,
        Json(register_payload("admin1@example.com")),
    )
    .await
    .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["user"]["role"], "admin");

    // A second one without a session is refused
    let err = auth_api::register_admin(
        State(state.clone()),
        CookieJar::new(),
        None,
        Json(register_payload("admin2@example.com")),
    )
    .await
    .unwrap_err();
    let (status, message) = error_parts(err).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(message, "Access denied");

    // A non-admin session is refused as well
    register(&state, "user@example.com").await;
    let user = state
        .users
        .find_by_email("user@example.com")
        .unwrap()
        .unwrap();
    let err = auth_api::register_admin(
        State(state.clone()),
        CookieJar::new(),
        Some(Extension(user)),
        Json(register_payload("admin2@example.com")),
    )
    .await
    .unwrap_err();
    let (status, _) = error_parts(err).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // An admin session succeeds
    let admin = state
        .users
        .find_by_email("admin1@example.com")
        .unwrap()
        .unwrap();
    let response = auth_api::register_admin(
        State(state.clone()),
        CookieJar::new(),
        Some(Extension(admin)),
        Json(register_payload("admin2@example.com")),
    )
    .await
    .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn test_admin_driven_register_takes_role_from_body() {
    let (state, _mailer, _temp) = test_state();

    auth_api::register_admin(
        State(state.clone()),
        CookieJar::new(),
        None,
        Json(register_payload("admin1@example.com")),
    )
    .await
    .unwrap();
    let admin = state
        .users
        .find_by_email("admin1@example.com")
        .unwrap()
        .unwrap();

    // Default role is user
    let response = auth_api::register(
        State(state.clone()),
        CookieJar::new(),
        Extension(admin.clone()),
        Json(register_payload("bob@example.com")),
    )
    .await
    .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["user"]["role"], "user");

    // An explicit admin role is honored for an admin caller
    let mut payload = register_payload("carol@example.com");
    payload.role = Some("admin".to_string());
    let response = auth_api::register(
        State(state.clone()),
        CookieJar::new(),
        Extension(admin.clone()),
        Json(payload),
    )
    .await
    .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["user"]["role"], "admin");

    // Unknown roles are rejected up front
    let mut payload = register_payload("dave@example.com");
    payload.role = Some("root".to_string());
    let err = auth_api::register(
        State(state.clone()),
        CookieJar::new(),
        Extension(admin),
        Json(payload),
    )
    .await
    .unwrap_err();
    let (status, message) = error_parts(err).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(message, "Role is not valid");
}

#[tokio::test]
async fn test_password_reset_flow() {
    let (state, mailer, _temp) = test_state();

    register(&state, "alice@example.com").await;

    let Json(ack) = auth_api::forgot_password(
        State(state.clone()),
        Json(ForgotPasswordRequest {
            email: Some("alice@example.com".to_string()),
        }),
    )
    .await
    .unwrap();
    assert!(ack.success);
    assert_eq!(ack.message, "Email sent to alice@example.com successfully");

    let (to, subject, mail_body) = {
        let sent = mailer.sent.lock();
        assert_eq!(sent.len(), 1);
        sent[0].clone()
    };
    assert_eq!(to, "alice@example.com");
    assert_eq!(subject, "Shipway Password Recovery");

    let token = mail_body
        .split("/reset-password/")
        .nth(1)
        .unwrap()
        .split_whitespace()
        .next()
        .unwrap()
        .to_string();
    assert!(!token.is_empty());

    let response = auth_api::reset_password(
        State(state.clone()),
        CookieJar::new(),
        Path(token.clone()),
        Json(ResetPasswordRequest {
            password: Some("brand-new-password".to_string()),
        }),
    )
    .await
    .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Old password is gone, new one works
    assert!(login(&state, "alice@example.com", "hunter2hunter2")
        .await
        .is_err());
    assert_eq!(
        login(&state, "alice@example.com", "brand-new-password")
            .await
            .unwrap(),
        StatusCode::OK
    );
}

#[tokio::test]
async fn test_reset_token_reusable_until_expiry() {
    let (state, mailer, _temp) = test_state();

    register(&state, "alice@example.com").await;
    auth_api::forgot_password(
        State(state.clone()),
        Json(ForgotPasswordRequest {
            email: Some("alice@example.com".to_string()),
        }),
    )
    .await
    .unwrap();

    let mail_body = mailer.sent.lock()[0].2.clone();
    let token = mail_body
        .split("/reset-password/")
        .nth(1)
        .unwrap()
        .split_whitespace()
        .next()
        .unwrap()
        .to_string();

    for password in ["first-new-password", "second-new-password"] {
        let response = auth_api::reset_password(
            State(state.clone()),
            CookieJar::new(),
            Path(token.clone()),
            Json(ResetPasswordRequest {
                password: Some(password.to_string()),
            }),
        )
        .await
        .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    assert_eq!(
        login(&state, "alice@example.com", "second-new-password")
            .await
            .unwrap(),
        StatusCode::OK
    );
}

#[tokio::test]
async fn test_reset_rejects_bad_token_and_short_password() {
    let (state, _mailer, _temp) = test_state();

    register(&state, "alice@example.com").await;

    let err = auth_api::reset_password(
        State(state.clone()),
        CookieJar::new(),
        Path("garbage-token".to_string()),
        Json(ResetPasswordRequest {
            password: Some("long-enough-password".to_string()),
        }),
    )
    .await
    .unwrap_err();
    let (status, message) = error_parts(err).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(message, "Password reset token is invalid or has expired");

    let user = state
        .users
        .find_by_email("alice@example.com")
        .unwrap()
        .unwrap();
    let token = state.jwt.issue(user.id, chrono::Duration::hours(1)).unwrap();
    let err = auth_api::reset_password(
        State(state.clone()),
        CookieJar::new(),
        Path(token),
        Json(ResetPasswordRequest {
            password: Some("short".to_string()),
        }),
    )
    .await
    .unwrap_err();
    let (status, message) = error_parts(err).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(message, "Password should be of minimum 8 characters length");
}

#[tokio::test]
async fn test_forgot_password_unknown_email() {
    let (state, mailer, _temp) = test_state();

    let err = auth_api::forgot_password(
        State(state.clone()),
        Json(ForgotPasswordRequest {
            email: Some("ghost@example.com".to_string()),
        }),
    )
    .await
    .unwrap_err();

    let (status, message) = error_parts(err).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(message, "User not found with this email");
    assert!(mailer.sent.lock().is_empty());
}

#[tokio::test]
async fn test_session_gate() {
    let (state, _mailer, _temp) = test_state();

    // No cookie at all
    let err = resolve_user(&state, &CookieJar::new()).unwrap_err();
    let (status, message) = error_parts(err).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(message, "Please login to access this resource");

    // A cookie that is not a token
    let jar = CookieJar::new().add(Cookie::new("token", "garbage"));
    let err = resolve_user(&state, &jar).unwrap_err();
    let (status, message) = error_parts(err).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(message, "Invalid or expired token");

    // A valid token whose account no longer exists
    let ghost = state.jwt.issue(9999, chrono::Duration::hours(1)).unwrap();
    let jar = CookieJar::new().add(Cookie::new("token", ghost));
    let err = resolve_user(&state, &jar).unwrap_err();
    let (status, message) = error_parts(err).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(message, "User not found");

    // A live session resolves to the stored account
    register(&state, "alice@example.com").await;
    let user = state
        .users
        .find_by_email("alice@example.com")
        .unwrap()
        .unwrap();
    let token = state.jwt.issue(user.id, chrono::Duration::hours(1)).unwrap();
    let jar = CookieJar::new().add(Cookie::new("token", token));
    let resolved = resolve_user(&state, &jar).unwrap();
    assert_eq!(resolved.id, user.id);
    assert_eq!(resolved.email, "alice@example.com");
}
