// src/web/dashboard_handlers.rs
use crate::{
    error::AppResult,
    state::AppState,
    templates::{render_page, DashboardPage, PageContext},
    web::{mw_auth::CurrentUser, FeedbackParams},
};
use axum::{
    extract::{Extension, Query, State},
    response::Html,
};

// GET /dashboard
pub async fn dashboard_page(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Query(feedback): Query<FeedbackParams>,
) -> AppResult<Html<String>> {
    let stats = state.violations.dashboard_stats().await?;
    tracing::debug!(
        "GET /dashboard: {} of {} students have violations",
        stats.students_with_violations,
        stats.total_students
    );

    render_page(&DashboardPage {
        ctx: PageContext::new(&user, feedback.success, feedback.error),
        total_students: stats.total_students,
        students_with_violations: stats.students_with_violations,
        percentage: format!("{:.1}", stats.percentage),
    })
}
