// src/web/mw_auth.rs
use crate::{error::AppError, models::user::User, state::AppState};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

/// Session key holding the logged-in user's id.
pub const SESSION_USER_ID: &str = "user_id";

/// The logged-in user, placed in the request extensions by `require_auth`.
#[derive(Clone, Debug)]
pub struct CurrentUser(pub User);

/// Redirects to /login unless the session belongs to an existing user.
pub async fn require_auth(
    State(state): State<AppState>,
    session: Session,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user_id = session
        .get::<String>(SESSION_USER_ID)
        .await
        .map_err(|e| {
            tracing::error!("Auth MW: failed to read session: {:?}", e);
            AppError::SessionError(format!("Gagal membaca sesi: {}", e))
        })?;

    let Some(user_id) = user_id else {
        tracing::debug!("Auth MW: no user_id in session, redirecting to /login");
        return Ok(Redirect::to("/login").into_response());
    };

    match state.auth.find_user(&user_id).await? {
        Some(user) => {
            tracing::debug!("Auth MW: '{}' authenticated", user.username);
            request.extensions_mut().insert(CurrentUser(user));
            Ok(next.run(request).await)
        }
        None => {
            // account deleted while the session was alive
            tracing::warn!("Auth MW: session user '{}' no longer exists", user_id);
            session
                .flush()
                .await
                .map_err(|e| AppError::SessionError(format!("Gagal menghapus sesi: {}", e)))?;
            Ok(Redirect::to("/login").into_response())
        }
    }
}
