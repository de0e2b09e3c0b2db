// src/web/violation_type_handlers.rs
use crate::{
    error::AppResult,
    models::violation::ViolationType,
    state::AppState,
    templates::{render_page, PageContext, ViolationTypesPage},
    web::{mw_auth::CurrentUser, redirect_error, redirect_on_error, redirect_success, FeedbackParams},
};
use axum::{
    extract::{Extension, Form, Path, Query, State},
    response::{Html, Redirect},
};
use serde::Deserialize;

const PAGE: &str = "/violation-types";

#[derive(Deserialize, Debug)]
pub struct ViolationTypeForm {
    name: String,
}

// GET /violation-types
pub async fn violation_types_page(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Query(feedback): Query<FeedbackParams>,
) -> AppResult<Html<String>> {
    let violation_types = state.violations.get_all_violation_types().await?;
    render_page(&ViolationTypesPage {
        ctx: PageContext::new(&user, feedback.success, feedback.error),
        violation_types,
    })
}

// POST /violation-types/create
pub async fn handle_create_violation_type(
    State(state): State<AppState>,
    Form(form): Form<ViolationTypeForm>,
) -> AppResult<Redirect> {
    match state.violations.add_violation_type(&form.name).await {
        Ok(created) => {
            tracing::info!("Violation type '{}' created ({})", created.name, created.id);
            Ok(redirect_success(
                PAGE,
                &format!("Jenis pelanggaran '{}' ditambahkan.", created.name),
            ))
        }
        Err(e) => redirect_on_error(PAGE, e),
    }
}

// POST /violation-types/edit/{id}
pub async fn handle_edit_violation_type(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<ViolationTypeForm>,
) -> AppResult<Redirect> {
    match state
        .violations
        .update_violation_type(ViolationType { id, name: form.name })
        .await
    {
        Ok(updated) => Ok(redirect_success(
            PAGE,
            &format!("Jenis pelanggaran '{}' diperbarui.", updated.name),
        )),
        Err(e) => redirect_on_error(PAGE, e),
    }
}

// POST /violation-types/delete/{id}
pub async fn handle_delete_violation_type(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Redirect> {
    if state.violations.delete_violation_type(&id).await? {
        Ok(redirect_success(PAGE, "Jenis pelanggaran dihapus."))
    } else {
        Ok(redirect_error(PAGE, "Jenis pelanggaran tidak ditemukan."))
    }
}
