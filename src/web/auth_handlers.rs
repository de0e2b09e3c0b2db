// src/web/auth_handlers.rs
use crate::{
    error::{AppError, AppResult},
    models::user::LoginForm,
    state::AppState,
    templates::{render_page, LoginPage},
    web::mw_auth::SESSION_USER_ID,
};
use axum::{
    extract::{Form, State},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

// GET /login
pub async fn show_login_form(session: Session) -> AppResult<Response> {
    if session
        .get::<String>(SESSION_USER_ID)
        .await
        .ok()
        .flatten()
        .is_some()
    {
        tracing::debug!("GET /login: already logged in, redirecting to /dashboard");
        return Ok(Redirect::to("/dashboard").into_response());
    }

    let template = LoginPage {
        error: None,
        username: String::new(),
    };
    Ok(render_page(&template)?.into_response())
}

// POST /login
pub async fn handle_login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> AppResult<Response> {
    tracing::info!("Login attempt for '{}'", form.username);

    if form.username.trim().is_empty() || form.password.is_empty() {
        return login_failed(&form.username, "Username dan password wajib diisi.");
    }

    match state.auth.login(&form.username, &form.password).await {
        Ok(user) => {
            session
                .cycle_id()
                .await
                .map_err(|e| AppError::SessionError(format!("Gagal memperbarui ID sesi: {}", e)))?;
            session
                .insert(SESSION_USER_ID, &user.id)
                .await
                .map_err(|e| AppError::SessionError(format!("Gagal menyimpan sesi: {}", e)))?;

            tracing::info!("✅ Login succeeded for {} ({})", user.username, user.role);
            Ok(Redirect::to("/dashboard").into_response())
        }
        Err(AppError::InvalidCredentials) => {
            tracing::warn!("Invalid credentials for '{}'", form.username);
            login_failed(&form.username, &AppError::InvalidCredentials.to_string())
        }
        Err(e) => Err(e),
    }
}

fn login_failed(username: &str, message: &str) -> AppResult<Response> {
    let template = LoginPage {
        error: Some(message.to_string()),
        username: username.trim().to_string(),
    };
    Ok(render_page(&template)?.into_response())
}

// GET /logout
pub async fn handle_logout(State(state): State<AppState>, session: Session) -> AppResult<Redirect> {
    let user_id: Option<String> = session.get(SESSION_USER_ID).await.ok().flatten();

    state.auth.logout().await?;
    session
        .delete()
        .await
        .map_err(|e| AppError::SessionError(format!("Gagal menghapus sesi: {}", e)))?;

    match user_id {
        Some(id) => tracing::info!("🚪 User '{}' logged out.", id),
        None => tracing::info!("🚪 Anonymous session closed."),
    }

    Ok(Redirect::to("/login"))
}
