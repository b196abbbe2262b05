//! Authentication Middleware
//! Mission: Resolve the session cookie to a live account before handlers run

use crate::auth::models::{User, UserRole};
use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;

/// Name of the session cookie set at login
pub const AUTH_COOKIE: &str = "token";

/// Role list for admin-gated routes
pub const ADMIN_ONLY: &[UserRole] = &[UserRole::Admin];

/// Resolve the session cookie into a stored user. The token only names an
/// id; the account itself is re-read on every request so deleted users are
/// locked out even with a live token.
pub fn resolve_user(state: &AppState, jar: &CookieJar) -> Result<User, ApiError> {
    let token = jar.get(AUTH_COOKIE).ok_or(ApiError::MissingToken)?;

    let user_id = state
        .jwt
        .verify(token.value())
        .map_err(|_| ApiError::InvalidToken)?;

    state
        .users
        .find_by_id(user_id)?
        .ok_or(ApiError::UserGone)
}

/// Auth middleware that loads the cookie-holder into request extensions
pub async fn authenticate(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = resolve_user(&state, &jar)?;

    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}

/// Optional variant - anonymous requests pass through without a user
pub async fn authenticate_optional(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Response {
    if let Ok(user) = resolve_user(&state, &jar) {
        req.extensions_mut().insert(user);
    }

    next.run(req).await
}

/// Extract the authenticated user from a request (use after `authenticate`)
pub fn extract_user(req: &Request) -> Option<&User> {
    req.extensions().get::<User>()
}

/// Check that an identity is present and holds one of the allowed roles.
/// A missing identity is a role failure, not an auth failure.
pub fn ensure_role(user: Option<&User>, allowed: &[UserRole]) -> Result<(), ApiError> {
    match user {
        Some(user) if allowed.contains(&user.role) => Ok(()),
        _ => Err(ApiError::Forbidden),
    }
}

/// Role middleware layered after `authenticate`
pub async fn require_role(
    allowed: &'static [UserRole],
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    ensure_role(extract_user(&req), allowed)?;

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request as HttpRequest};

    fn create_test_user(role: UserRole) -> User {
        User {
            id: 1,
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            email: "test@example.com".to_string(),
            telephone_number: "0771234567".to_string(),
            address: "1 Main St".to_string(),
            password_hash: "hash".to_string(),
            role,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    #[test]
    fn test_ensure_role_allows_listed_role() {
        let admin = create_test_user(UserRole::Admin);
        assert!(ensure_role(Some(&admin), ADMIN_ONLY).is_ok());
    }

    #[test]
    fn test_ensure_role_rejects_other_roles() {
        let user = create_test_user(UserRole::User);
        let result = ensure_role(Some(&user), ADMIN_ONLY);
        assert!(matches!(result, Err(ApiError::Forbidden)));
    }

    #[test]
    fn test_ensure_role_rejects_missing_identity() {
        let result = ensure_role(None, ADMIN_ONLY);
        assert!(matches!(result, Err(ApiError::Forbidden)));
    }

    #[test]
    fn test_extract_user_from_request() {
        let mut req = HttpRequest::new(Body::empty());

        // No user initially
        assert!(extract_user(&req).is_none());

        req.extensions_mut().insert(create_test_user(UserRole::User));

        let extracted = extract_user(&req);
        assert!(extracted.is_some());
        assert_eq!(extracted.unwrap().email, "test@example.com");
    }
}
