//! Cookie-session authentication: signup/login/logout handlers, the
//! extractor that guards protected routes, and password hashing.

use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use axum::extract::{FromRequestParts, State};
use axum::http::request::Parts;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{AppendHeaders, IntoResponse};
use axum::Json;
use serde::Deserialize;

use crate::error::ServiceError;
use crate::models::UserProfile;
use crate::server::AppState;

pub const SESSION_COOKIE: &str = "session";

/// The authenticated caller, resolved from the session cookie.
///
/// Handlers for protected routes take this as an extractor; requests
/// without a live session are rejected with 401 before the handler runs.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// Hex form of the user's document id.
    pub user_id: String,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ServiceError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        session_token(&parts.headers)
            .and_then(|token| state.sessions.resolve(&token))
            .map(|user_id| AuthUser { user_id })
            .ok_or(ServiceError::Unauthorized)
    }
}

/// Resolves the caller on a public route, where a session is optional.
pub fn maybe_user(state: &AppState, headers: &HeaderMap) -> Option<String> {
    session_token(headers).and_then(|token| state.sessions.resolve(&token))
}

/// Extracts the session token from the Cookie header(s).
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    for value in headers.get_all(header::COOKIE) {
        let Ok(value) = value.to_str() else { continue };
        for pair in value.split(';') {
            if let Some(token) = pair.trim().strip_prefix("session=") {
                if !token.is_empty() {
                    return Some(token.to_string());
                }
            }
        }
    }
    None
}

fn session_cookie(token: &str, max_age_secs: u64) -> String {
    format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age_secs}")
}

fn clear_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

/// Hashes a password into a PHC string.
pub fn hash_password(password: &str) -> Result<String, ServiceError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| {
            tracing::error!("password hashing failed: {}", e);
            ServiceError::Internal
        })
}

/// Verifies a password against a stored PHC string. Unparseable hashes
/// verify as false rather than panicking on tampered data.
pub fn verify_password(hash: &str, password: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// POST /auth/signup: create an account and open a session for it.
pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let name = req.name.trim();
    let email = req.email.trim().to_lowercase();
    if name.is_empty() {
        return Err(ServiceError::Validation("name is required".into()));
    }
    if !email.contains('@') {
        return Err(ServiceError::Validation("a valid email is required".into()));
    }
    if req.password.len() < 8 {
        return Err(ServiceError::Validation(
            "password must be at least 8 characters".into(),
        ));
    }

    let hash = hash_password(&req.password)?;
    let user = state.store.users().create(name, &email, hash).await?;
    tracing::info!("new account for {}", user.email);

    let token = state.sessions.create(&user.id_hex());
    let cookie = session_cookie(&token, state.sessions.default_expiry().as_secs());
    Ok((
        StatusCode::CREATED,
        AppendHeaders([(header::SET_COOKIE, cookie)]),
        Json(UserProfile::from(user)),
    ))
}

/// POST /auth/login: verify credentials and set the session cookie.
///
/// Unknown email and wrong password are indistinguishable to the caller.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let email = req.email.trim().to_lowercase();
    let user = state
        .store
        .users()
        .by_email(&email)
        .await?
        .filter(|user| verify_password(&user.password, &req.password))
        .ok_or(ServiceError::Unauthorized)?;

    let token = state.sessions.create(&user.id_hex());
    let cookie = session_cookie(&token, state.sessions.default_expiry().as_secs());
    Ok((
        AppendHeaders([(header::SET_COOKIE, cookie)]),
        Json(UserProfile::from(user)),
    ))
}

/// POST /auth/logout: revoke the session and clear the cookie.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    if let Some(token) = session_token(&headers) {
        state.sessions.revoke(&token);
    }
    (
        StatusCode::NO_CONTENT,
        AppendHeaders([(header::SET_COOKIE, clear_session_cookie())]),
    )
}

/// GET /auth/me: the authenticated user's profile.
pub async fn me(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<UserProfile>, ServiceError> {
    let user = state
        .store
        .users()
        .by_id(&user.user_id)
        .await?
        .ok_or(ServiceError::Unauthorized)?;
    Ok(Json(UserProfile::from(user)))
}
