// src/lib.rs
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod state;
pub mod store;
pub mod templates;
pub mod web;

use crate::{
    error::{AppError, AppResult},
    state::AppState,
};
use axum::Router;
use sqlx::SqlitePool;
use time::Duration;
use tower::ServiceBuilder;
use tower_cookies::Key;
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::SqliteStore;

/// Session table in the application database, created if missing.
pub async fn session_store(pool: &SqlitePool) -> AppResult<SqliteStore> {
    let store = SqliteStore::new(pool.clone())
        .with_table_name("sessions")
        .map_err(|e| AppError::SessionError(format!("Nama tabel sesi tidak valid: {}", e)))?;
    store.migrate().await?;
    Ok(store)
}

/// Cookie signing key; the secret must be at least 64 bytes.
pub fn session_key(secret: &str) -> AppResult<Key> {
    Key::try_from(secret.as_bytes()).map_err(|e| {
        tracing::error!("SESSION_SECRET rejected: {:?}", e);
        AppError::Config("SESSION_SECRET harus minimal 64 byte.".to_string())
    })
}

/// The full application: routes, signed cookie sessions and request tracing.
pub fn app(state: AppState, session_store: SqliteStore, key: Key) -> Router {
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(false)
        .with_http_only(true)
        .with_expiry(Expiry::OnInactivity(Duration::days(1)))
        .with_signed(key);

    web::routes::create_router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(session_layer),
    )
}
