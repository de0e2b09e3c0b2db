// src/web/admin_handlers.rs
use crate::{
    error::{AppError, AppResult},
    models::user::{NewUser, Role, UserUpdate},
    state::AppState,
    templates::{render_page, AdminEditUserPage, AdminUsersPage, PageContext, SelectOption, UserRow},
    web::{mw_auth::CurrentUser, redirect_error, redirect_on_error, redirect_success, FeedbackParams},
};
use axum::{
    extract::{Extension, Form, Path, Query, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;

const PAGE: &str = "/admin/users";

// --- Form structs ---
#[derive(Deserialize, Debug)]
pub struct CreateUserForm {
    username: String,
    password: String,
    role: String,
}

#[derive(Deserialize, Debug)]
pub struct EditUserForm {
    username: String,
    role: String,
    #[serde(default)]
    password: Option<String>,
}

fn role_options(selected: Role) -> Vec<SelectOption> {
    Role::ALL
        .into_iter()
        .map(|role| SelectOption {
            value: role.as_str().to_string(),
            label: role.label().to_string(),
            selected: role == selected,
        })
        .collect()
}

fn parse_role(raw: &str) -> AppResult<Role> {
    raw.parse().map_err(AppError::Validation)
}

// GET /admin/users
pub async fn show_admin_users_page(
    State(state): State<AppState>,
    Extension(CurrentUser(current)): Extension<CurrentUser>,
    Query(feedback): Query<FeedbackParams>,
) -> AppResult<Html<String>> {
    let users = state.auth.get_all_users().await?;
    tracing::debug!("GET /admin/users: {} users", users.len());

    render_page(&AdminUsersPage {
        users: users
            .iter()
            .map(|u| UserRow {
                id: u.id.clone(),
                username: u.username.clone(),
                role_label: u.role.label(),
                is_self: u.id == current.id,
            })
            .collect(),
        roles: role_options(Role::SupervisingTeacher),
        ctx: PageContext::new(&current, feedback.success, feedback.error),
    })
}

// POST /admin/users/create
pub async fn handle_create_user(
    State(state): State<AppState>,
    Form(form): Form<CreateUserForm>,
) -> AppResult<Redirect> {
    tracing::info!("POST /admin/users/create: creating '{}'", form.username);

    let result = match parse_role(&form.role) {
        Ok(role) => {
            state
                .auth
                .add_user(NewUser {
                    username: form.username,
                    password: form.password,
                    role,
                })
                .await
        }
        Err(e) => Err(e),
    };

    match result {
        Ok(user) => {
            tracing::info!("User '{}' created as {}", user.username, user.role);
            Ok(redirect_success(
                PAGE,
                &format!("Pengguna '{}' berhasil dibuat.", user.username),
            ))
        }
        Err(e) => redirect_on_error(PAGE, e),
    }
}

// GET /admin/users/edit/{id}
pub async fn show_edit_user_form(
    State(state): State<AppState>,
    Extension(CurrentUser(current)): Extension<CurrentUser>,
    Path(user_id): Path<String>,
    Query(feedback): Query<FeedbackParams>,
) -> AppResult<Response> {
    let Some(user) = state.auth.find_user(&user_id).await? else {
        tracing::warn!("Edit requested for missing user {}", user_id);
        return Ok(redirect_error(PAGE, "Pengguna tidak ditemukan.").into_response());
    };

    let page = AdminEditUserPage {
        ctx: PageContext::new(&current, feedback.success, feedback.error),
        roles: role_options(user.role),
        user_id: user.id,
        username: user.username,
    };
    Ok(render_page(&page)?.into_response())
}

// POST /admin/users/edit/{id}
pub async fn handle_edit_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Form(form): Form<EditUserForm>,
) -> AppResult<Redirect> {
    tracing::info!("POST /admin/users/edit/{}", user_id);

    let result = match parse_role(&form.role) {
        Ok(role) => {
            state
                .auth
                .update_user(UserUpdate {
                    id: user_id.clone(),
                    username: form.username,
                    role,
                    password: form.password,
                })
                .await
        }
        Err(e) => Err(e),
    };

    match result {
        Ok(user) => Ok(redirect_success(
            PAGE,
            &format!("Data pengguna '{}' diperbarui.", user.username),
        )),
        Err(e @ AppError::NotFound(_)) => redirect_on_error(PAGE, e),
        Err(e) => redirect_on_error(&format!("{}/edit/{}", PAGE, user_id), e),
    }
}

// POST /admin/users/delete/{id}
pub async fn handle_delete_user(
    State(state): State<AppState>,
    Extension(CurrentUser(current)): Extension<CurrentUser>,
    Path(user_id): Path<String>,
) -> AppResult<Redirect> {
    match state.auth.delete_user(&current.id, &user_id).await {
        Ok(true) => {
            tracing::info!("User {} deleted by {}", user_id, current.username);
            Ok(redirect_success(PAGE, "Pengguna berhasil dihapus."))
        }
        Ok(false) => Ok(redirect_error(PAGE, "Pengguna tidak ditemukan.")),
        Err(e) => redirect_on_error(PAGE, e),
    }
}
