// src/web/mod.rs
pub mod admin_handlers;
pub mod auth_handlers;
pub mod dashboard_handlers;
pub mod mw_admin;
pub mod mw_auth;
pub mod report_handlers;
pub mod routes;
pub mod student_handlers;
pub mod violation_handlers;
pub mod violation_type_handlers;

use crate::error::{AppError, AppResult};
use axum::response::Redirect;
use serde::Deserialize;

/// `?success=` / `?error=` banners carried across a Post/Redirect/Get.
#[derive(Deserialize, Debug, Default)]
pub struct FeedbackParams {
    pub success: Option<String>,
    pub error: Option<String>,
}

pub fn redirect_success(path: &str, message: &str) -> Redirect {
    let redirect_url = format!("{}?success={}", path, urlencoding::encode(message));
    Redirect::to(&redirect_url)
}

pub fn redirect_error(path: &str, message: &str) -> Redirect {
    let redirect_url = format!("{}?error={}", path, urlencoding::encode(message));
    Redirect::to(&redirect_url)
}

/// Sends input errors back to `path` as a banner; anything else becomes the
/// error page.
pub fn redirect_on_error(path: &str, e: AppError) -> AppResult<Redirect> {
    if e.is_user_facing() {
        tracing::warn!("Form rejected ({}): {}", path, e);
        Ok(redirect_error(path, &e.user_message()))
    } else {
        Err(e)
    }
}

/// Empty form fields mean "not set".
pub fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
