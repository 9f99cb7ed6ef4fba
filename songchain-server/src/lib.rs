//! songchain-server library
//!
//! Web front-end that registers songs with a Blockchain-as-a-Service API and
//! tracks their anchoring status through webhook callbacks.

use axum::extract::FromRef;
use axum::Router;
use axum_extra::extract::cookie::Key;
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha512};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod error;
pub mod services;
pub mod store;

pub use crate::error::{ApiError, ApiResult};

use crate::services::BaasClient;
use crate::store::SongStore;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Locally tracked song records
    pub store: Arc<dyn SongStore>,
    /// Outbound BaaS client
    pub baas: BaasClient,
    /// Shared secret for webhook signatures; `None` accepts unsigned calls
    pub webhook_secret: Option<Arc<str>>,
    /// Signing key for flash-message cookies
    pub cookie_key: Key,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn SongStore>,
        baas: BaasClient,
        webhook_secret: Option<String>,
        session_secret: &str,
    ) -> Self {
        Self {
            store,
            baas,
            webhook_secret: webhook_secret.map(Arc::from),
            cookie_key: derive_cookie_key(session_secret),
            startup_time: Utc::now(),
        }
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}

/// Stretch an arbitrary-length session secret into a 64-byte cookie key
pub fn derive_cookie_key(session_secret: &str) -> Key {
    let digest = Sha512::digest(session_secret.as_bytes());
    Key::from(digest.as_slice())
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::song_routes())
        .merge(api::webhook_routes())
        .merge(api::verify_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
