//! Account routes: sign-up, sign-in, sign-out, profile and password.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use softmax_core::validation::{normalize_optional, require, validate_email, validate_new_password};
use softmax_core::UserProfile;
use tracing::info;

use crate::auth::{hash_password, verify_sign_in};
use crate::error::{ApiError, ApiResult};
use crate::session::Session;
use crate::state::{Backend, SharedState};

pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/auth/sign-up", post(sign_up))
        .route("/auth/sign-in", post(sign_in))
        .route("/auth/sign-out", post(sign_out))
        .route("/auth/me", get(me))
        .route("/auth/profile", put(update_profile))
        .route("/auth/password", put(update_password))
}

#[derive(Debug, Deserialize)]
pub struct SignUpRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
}

#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ProfileRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PasswordRequest {
    #[serde(default)]
    pub new_password: String,
    #[serde(default)]
    pub confirm_password: String,
}

/// A signed-in session.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: UserProfile,
}

async fn open_session(backend: &Backend, user: UserProfile) -> ApiResult<AuthResponse> {
    let issued = backend.jwt.issue(&user.id)?;
    backend
        .db
        .sessions()
        .create(&issued.jti, &user.id, issued.expires_at)
        .await?;

    Ok(AuthResponse {
        token: issued.token,
        expires_at: issued.expires_at,
        user,
    })
}

/// Creates an account and signs it in.
async fn sign_up(
    backend: Backend,
    Json(req): Json<SignUpRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    let name = require("name", &req.name)?;
    let email = validate_email(&req.email)?;
    validate_new_password(&req.password, &req.confirm_password)?;

    let hash = hash_password(&req.password)?;
    let user = backend.db.users().insert(&name, &email, &hash).await?;
    info!(user_id = %user.id, "Account created");

    let response = open_session(&backend, user).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn sign_in(backend: Backend, Json(req): Json<SignInRequest>) -> ApiResult<Json<AuthResponse>> {
    let email = validate_email(&req.email)?;
    if req.password.is_empty() {
        return Err(softmax_core::ValidationError::required("password").into());
    }

    let account = backend.db.users().find_by_email(&email).await?;
    let verified = verify_sign_in(
        &req.password,
        account.as_ref().map(|a| a.password_hash.as_str()),
    );
    let account = match account {
        Some(account) if verified => account,
        _ => return Err(ApiError::unauthorized("Invalid email or password")),
    };

    info!(user_id = %account.profile.id, "Signed in");
    Ok(Json(open_session(&backend, account.profile).await?))
}

/// Revokes the token and drops the session's cart.
async fn sign_out(
    State(state): State<SharedState>,
    backend: Backend,
    session: Session,
) -> ApiResult<StatusCode> {
    backend.db.sessions().revoke(&session.jti).await?;
    state.carts.remove_session(&session.jti);
    info!(user_id = %session.user_id(), "Signed out");
    Ok(StatusCode::NO_CONTENT)
}

async fn me(session: Session) -> Json<UserProfile> {
    Json(session.user)
}

async fn update_profile(
    backend: Backend,
    session: Session,
    Json(req): Json<ProfileRequest>,
) -> ApiResult<Json<UserProfile>> {
    let name = require("name", &req.name)?;
    let email = validate_email(&req.email)?;
    let avatar_url = normalize_optional(req.avatar_url);

    let user = backend
        .db
        .users()
        .update_profile(session.user_id(), &name, &email, avatar_url.as_deref())
        .await?;
    Ok(Json(user))
}

/// Changes the password and signs out every other session of the account.
async fn update_password(
    State(state): State<SharedState>,
    backend: Backend,
    session: Session,
    Json(req): Json<PasswordRequest>,
) -> ApiResult<StatusCode> {
    validate_new_password(&req.new_password, &req.confirm_password)?;

    let hash = hash_password(&req.new_password)?;
    backend
        .db
        .users()
        .update_password_hash(session.user_id(), &hash)
        .await?;

    let revoked = backend
        .db
        .sessions()
        .revoke_others(session.user_id(), &session.jti)
        .await?;
    state
        .carts
        .remove_sessions(revoked.iter().map(String::as_str));

    info!(
        user_id = %session.user_id(),
        revoked = revoked.len(),
        "Password changed"
    );
    Ok(StatusCode::NO_CONTENT)
}
