//! Authentication endpoints.
//!
//! Registration, login (token + cookie), logout and the current caller.

use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use stockroom_core::validation::validate_password;
use stockroom_core::{Caller, CoreError, NewUser, Role, User};
use tracing::{info, warn};

use crate::auth::{self, expired_cookie, resolve_caller, session_cookie, CurrentCaller};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    #[serde(default)]
    pub role: Role,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(alias = "username")]
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/me", get(me))
}

/// Creates an account. Anyone may register an employee; registering an
/// admin takes an admin's credentials.
async fn register(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<User>)> {
    if req.role == Role::Admin {
        let caller = resolve_caller(&state, &headers).await?.ok_or_else(|| {
            ApiError::unauthenticated("Registering an admin requires an admin session")
        })?;
        caller.require_admin()?;
    }

    validate_password(&req.password).map_err(CoreError::from)?;
    let password_hash = auth::hash_password(&req.password)?;

    let user = state
        .db
        .users()
        .create(&NewUser {
            email: req.email,
            name: req.name,
            role: req.role,
            password_hash,
        })
        .await?;

    info!(user_id = %user.id, role = %user.role, "Registered user");
    Ok((StatusCode::CREATED, Json(user)))
}

/// Exchanges credentials for an access token, also set as an `HttpOnly`
/// cookie.
async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let user = state.db.users().find_by_email(&req.email).await?;

    // Same answer for unknown email and wrong password
    let user = match user {
        Some(user) if auth::verify_password(&req.password, &user.password_hash) => user,
        _ => {
            warn!(email = %req.email, "Failed login attempt");
            return Err(ApiError::unauthenticated("Incorrect email or password"));
        }
    };

    let token = state.jwt.generate_access_token(&user)?;
    let lifetime = state.jwt.access_lifetime_secs();
    let cookie = session_cookie(&token, lifetime, state.config.cookie_secure);

    info!(user_id = %user.id, "User logged in");

    Ok((
        [(SET_COOKIE, cookie)],
        Json(LoginResponse {
            access_token: token,
            token_type: "bearer",
            expires_in: lifetime,
            user,
        }),
    ))
}

async fn logout(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(SET_COOKIE, expired_cookie(state.config.cookie_secure))],
        Json(MessageResponse {
            message: "Logged out",
        }),
    )
}

async fn me(CurrentCaller(caller): CurrentCaller) -> Json<Caller> {
    Json(caller)
}
