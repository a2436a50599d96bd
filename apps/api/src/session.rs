//! The signed-in user of a request.
//!
//! `Session` is an extractor: a handler that takes one only runs for a
//! request carrying a valid, unrevoked bearer token.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use softmax_core::UserProfile;
use tracing::debug;

use crate::auth::extract_bearer_token;
use crate::error::ApiError;
use crate::state::{Backend, SharedState};

/// The current user and the token's session id.
#[derive(Debug, Clone)]
pub struct Session {
    pub user: UserProfile,
    pub jti: String,
}

impl Session {
    pub fn user_id(&self) -> &str {
        &self.user.id
    }

    /// Name printed as "Operador" on receipts.
    pub fn operator_name(&self) -> &str {
        if self.user.name.trim().is_empty() {
            &self.user.email
        } else {
            &self.user.name
        }
    }
}

impl FromRequestParts<SharedState> for Session {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        let backend = Backend::from_request_parts(parts, state).await?;

        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(extract_bearer_token)
            .ok_or_else(|| ApiError::unauthorized("Missing bearer token"))?;

        let claims = backend.jwt.validate(token)?;

        if !backend.db.sessions().is_active(&claims.jti).await? {
            debug!(jti = %claims.jti, "Rejected revoked or expired session");
            return Err(ApiError::unauthorized("Session has ended"));
        }

        let user = backend
            .db
            .users()
            .get_by_id(&claims.sub)
            .await?
            .ok_or_else(|| ApiError::unauthorized("User no longer exists"))?;

        Ok(Session {
            user,
            jti: claims.jti,
        })
    }
}
