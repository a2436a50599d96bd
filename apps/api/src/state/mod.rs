//! # State Module
//!
//! Shared state handed to every handler.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  Arc<AppState>                                                          │
//! │    ├── config:  AppConfig          read-only after startup              │
//! │    ├── backend: Option<Backend>    None when credentials are missing    │
//! │    │              ├── db:  Database (SQLite pool, thread-safe)          │
//! │    │              └── jwt: JwtManager                                   │
//! │    └── carts:   CartState          one cart per session                 │
//! │                                                                         │
//! │  run_session_sweeper: every `session_sweep_secs`, evicts the carts of  │
//! │  expired or revoked sessions and deletes their rows.                   │
//! │                                                                         │
//! │  Handlers that need the store take `Backend` as an extractor; it       │
//! │  rejects with 503 SERVICE_NOT_CONFIGURED when there is none.           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod cart;

use std::sync::Arc;
use std::time::Duration;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use chrono::Utc;
use softmax_db::{Database, DbConfig, DbError};
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::auth::JwtManager;
use crate::config::AppConfig;
use crate::error::ApiError;

pub use cart::{CartState, CheckoutGuard, SessionCart};

/// State shared by all handlers.
pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub config: AppConfig,
    pub backend: Option<Backend>,
    pub carts: CartState,
}

impl AppState {
    pub fn new(config: AppConfig, backend: Option<Backend>) -> SharedState {
        Arc::new(AppState {
            config,
            backend,
            carts: CartState::new(),
        })
    }

    /// Evicts carts whose session is no longer active and deletes revoked
    /// or expired session rows. Returns the number of carts evicted.
    pub async fn sweep_sessions(&self) -> Result<usize, DbError> {
        let Some(backend) = &self.backend else {
            return Ok(0);
        };
        let sessions = backend.db.sessions();

        // Keys are read before the active set: a key missing from it is
        // dead for good, while sessions opened meanwhile are not touched.
        let known = self.carts.session_ids();
        let active = sessions.active_ids().await?;
        let evicted = self.carts.remove_sessions(
            known
                .iter()
                .map(String::as_str)
                .filter(|jti| !active.contains(*jti)),
        );

        let purged = sessions.purge_inactive(Utc::now()).await?;
        debug!(evicted, purged, "Swept sessions");
        Ok(evicted)
    }
}

/// Runs [`AppState::sweep_sessions`] every `period`, forever.
///
/// This should be spawned as a background task.
pub async fn run_session_sweeper(state: SharedState, period: Duration) {
    info!(period_secs = period.as_secs(), "Session sweeper starting");

    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        interval.tick().await;
        if let Err(e) = state.sweep_sessions().await {
            error!(?e, "Session sweep failed");
        }
    }
}

/// Store connection and token signer. Both come from the service
/// credentials, so they exist together or not at all.
#[derive(Clone)]
pub struct Backend {
    pub db: Database,
    pub jwt: Arc<JwtManager>,
}

impl Backend {
    pub fn new(db: Database, jwt: JwtManager) -> Self {
        Backend {
            db,
            jwt: Arc::new(jwt),
        }
    }

    /// Connects when both service credentials are configured.
    ///
    /// ## Returns
    /// * `Ok(None)` - credentials missing; the server runs degraded
    /// * `Err(_)` - credentials present but the store is unreachable
    pub async fn connect(config: &AppConfig) -> Result<Option<Backend>, DbError> {
        let Some((url, key)) = config.service_credentials() else {
            warn!("SOFTMAX_SERVICE_URL / SOFTMAX_SERVICE_KEY not set; data endpoints will answer 503");
            return Ok(None);
        };

        let db = Database::new(DbConfig::from_url(url)).await?;
        info!("Connected to store");

        Ok(Some(Backend::new(
            db,
            JwtManager::new(key, config.token_lifetime_secs),
        )))
    }
}

impl FromRequestParts<SharedState> for Backend {
    type Rejection = ApiError;

    async fn from_request_parts(
        _parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        state
            .backend
            .clone()
            .ok_or_else(ApiError::service_not_configured)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;
    use softmax_core::ProductDraft;

    async fn state() -> SharedState {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let backend = Backend::new(db, JwtManager::new("segredo", 3600));
        AppState::new(AppConfig::default(), Some(backend))
    }

    #[tokio::test]
    async fn test_sweep_evicts_carts_of_expired_and_revoked_sessions() {
        let state = state().await;
        let db = &state.backend.as_ref().unwrap().db;
        let user = db
            .users()
            .insert("Operador", "caixa@softmax.co.mz", "hash")
            .await
            .unwrap();
        let product = db
            .products()
            .insert(&ProductDraft {
                name: "Pão".to_string(),
                price_cents: 3000,
                stock: 10,
                ..Default::default()
            })
            .await
            .unwrap();

        let sessions = db.sessions();
        let now = Utc::now();
        sessions
            .create("live", &user.id, now + ChronoDuration::hours(1))
            .await
            .unwrap();
        sessions
            .create("expired", &user.id, now - ChronoDuration::minutes(1))
            .await
            .unwrap();
        sessions
            .create("revoked", &user.id, now + ChronoDuration::hours(1))
            .await
            .unwrap();
        sessions.revoke("revoked").await.unwrap();

        for jti in ["live", "expired", "revoked"] {
            state
                .carts
                .session(jti)
                .with_cart_mut(|cart| cart.add_item(&product))
                .await
                .unwrap();
        }

        assert_eq!(state.sweep_sessions().await.unwrap(), 2);
        assert_eq!(state.carts.session_ids(), vec!["live".to_string()]);
        assert_eq!(
            state
                .carts
                .session("live")
                .with_cart(softmax_core::Cart::item_count)
                .await,
            1
        );
        assert_eq!(sessions.purge_inactive(Utc::now()).await.unwrap(), 0);
        assert!(sessions.is_active("live").await.unwrap());
    }

    #[tokio::test]
    async fn test_sweep_without_backend_is_noop() {
        let state = AppState::new(AppConfig::default(), None);
        state.carts.session("orphan");
        assert_eq!(state.sweep_sessions().await.unwrap(), 0);
        assert_eq!(state.carts.session_count(), 1);
    }
}
