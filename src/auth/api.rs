//! Authentication API Endpoints
//! Mission: Provide registration, login and password-recovery endpoints

use crate::auth::{
    middleware::{ensure_role, ADMIN_ONLY, AUTH_COOKIE},
    models::{
        AuthResponse, ForgotPasswordRequest, LoginRequest, MessageResponse, RegisterRequest,
        ResetPasswordRequest, User, UserResponse, UserRole,
    },
    password::{hash_password, verify_password},
    user_store::{is_duplicate_email, NewUser},
};
use crate::error::ApiError;
use crate::state::AppState;
use crate::validate::{validate_email_field, validate_password_field, validate_registration};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use tracing::{info, warn};

/// Password-reset links stay valid this long
const RESET_TOKEN_TTL_HOURS: i64 = 1;

/// Issue a session token for `user` and answer with it twice: in the
/// HTTP-only `token` cookie and in the JSON body.
fn send_token(
    state: &AppState,
    jar: CookieJar,
    user: &User,
    status: StatusCode,
) -> Result<Response, ApiError> {
    let token = state
        .jwt
        .issue(user.id, chrono::Duration::hours(state.config.token_ttl_hours))?;

    let cookie = Cookie::build((AUTH_COOKIE, token.clone()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::days(state.config.cookie_expires_days))
        .build();

    let body = Json(AuthResponse {
        success: true,
        token,
        user: UserResponse::from_user(user),
    });

    Ok((status, jar.add(cookie), body).into_response())
}

/// Registration flow shared by the three register routes. Gates run in
/// a fixed order and nothing is persisted unless every gate passes.
fn register_with_role(
    state: &AppState,
    jar: CookieJar,
    payload: &RegisterRequest,
    role: UserRole,
    caller: Option<&User>,
) -> Result<Response, ApiError> {
    let valid = validate_registration(payload).map_err(ApiError::Validation)?;

    // Cheap precheck; the UNIQUE index below still has the last word
    if state.users.find_by_email(&valid.email)?.is_some() {
        return Err(ApiError::EmailTaken);
    }

    // First admin bootstraps freely; every later one needs an admin caller
    if role == UserRole::Admin && state.users.admin_exists()? {
        ensure_role(caller, ADMIN_ONLY)?;
    }

    let password_hash = hash_password(&valid.password, state.config.bcrypt_cost)?;

    let user = state
        .users
        .create_user(NewUser {
            first_name: valid.first_name,
            last_name: valid.last_name,
            email: valid.email,
            telephone_number: valid.telephone_number,
            address: valid.address,
            password_hash,
            role,
        })
        .map_err(|e| {
            if is_duplicate_email(&e) {
                ApiError::EmailTaken
            } else {
                ApiError::from(e)
            }
        })?;

    send_token(state, jar, &user, StatusCode::CREATED)
}

fn role_from_payload(role: Option<&str>) -> Result<UserRole, ApiError> {
    match role {
        Some(r) => UserRole::from_str(r)
            .ok_or_else(|| ApiError::Validation(vec!["Role is not valid".to_string()])),
        None => Ok(UserRole::User),
    }
}

fn reset_link(frontend_url: &str, token: &str) -> String {
    format!(
        "{}/reset-password/{}",
        frontend_url.trim_end_matches('/'),
        token
    )
}

/// Self-service signup - POST /api/v1/register-user
pub async fn register_user(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<RegisterRequest>,
) -> Result<Response, ApiError> {
    register_with_role(&state, jar, &payload, UserRole::User, None)
}

/// Admin signup - POST /api/v1/register-admin
/// Open only until the first admin exists; after that the caller's own
/// session must belong to an admin.
pub async fn register_admin(
    State(state): State<AppState>,
    jar: CookieJar,
    caller: Option<Extension<User>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Response, ApiError> {
    let caller = caller.as_ref().map(|ext| &ext.0);
    register_with_role(&state, jar, &payload, UserRole::Admin, caller)
}

/// Admin-driven signup with role from the body - POST /api/v1/register
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Extension(caller): Extension<User>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Response, ApiError> {
    let role = role_from_payload(payload.role.as_deref())?;

    register_with_role(&state, jar, &payload, role, Some(&caller))
}

/// Login endpoint - POST /api/v1/login
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> Result<Response, ApiError> {
    let (email, password) = match (payload.email.as_deref(), payload.password.as_deref()) {
        (Some(e), Some(p)) if !e.trim().is_empty() && !p.is_empty() => (e.trim(), p),
        _ => return Err(ApiError::MissingCredentials),
    };

    info!("🔐 Login attempt: {}", email);

    let user = match state.users.find_by_email(email)? {
        Some(user) if verify_password(password, &user.password_hash) => user,
        // Same answer for unknown email and wrong password
        _ => {
            warn!("❌ Failed login attempt: {}", email);
            return Err(ApiError::InvalidCredentials);
        }
    };

    info!("✅ Login successful: {} ({})", user.email, user.role.as_str());

    send_token(&state, jar, &user, StatusCode::OK)
}

/// Request a password-reset link - POST /api/v1/forgot-password
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(payload): Json<ForgotPasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let email = validate_email_field(payload.email.as_deref())
        .map_err(|msg| ApiError::Validation(vec![msg]))?;

    // NOTE: the 404 here reveals whether an address is registered; kept
    // because the frontend relies on it.
    let user = state
        .users
        .find_by_email(&email)?
        .ok_or(ApiError::EmailNotFound)?;

    let token = state
        .jwt
        .issue(user.id, chrono::Duration::hours(RESET_TOKEN_TTL_HOURS))?;

    let reset_url = reset_link(&state.config.frontend_url, &token);
    let message = format!(
        "Your password reset link is as follows:\n\n{}\n\nIf you have not requested this email, then ignore it.",
        reset_url
    );

    // Delivery failure stays server-side; the caller still gets success
    if let Err(e) = state
        .mailer
        .send(&user.email, "Shipway Password Recovery", &message)
        .await
    {
        warn!("⚠️  Recovery mail to {} failed: {:#}", user.email, e);
    }

    Ok(Json(MessageResponse {
        success: true,
        message: format!("Email sent to {} successfully", user.email),
    }))
}

/// Set a new password with an emailed token - POST /api/v1/reset-password/:token
pub async fn reset_password(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(token): Path<String>,
    Json(payload): Json<ResetPasswordRequest>,
) -> Result<Response, ApiError> {
    let password = validate_password_field(payload.password.as_deref())
        .map_err(|msg| ApiError::Validation(vec![msg]))?;

    let user_id = state
        .jwt
        .verify(&token)
        .map_err(|_| ApiError::ResetTokenInvalid)?;

    let user = state
        .users
        .find_by_id(user_id)?
        .ok_or(ApiError::UserNotFound)?;

    let password_hash = hash_password(&password, state.config.bcrypt_cost)?;
    if !state.users.update_password_hash(user.id, &password_hash)? {
        return Err(ApiError::UserNotFound);
    }

    // Log the fresh credentials in immediately, like a normal login
    let user = User {
        password_hash,
        ..user
    };

    send_token(&state, jar, &user, StatusCode::OK)
}
