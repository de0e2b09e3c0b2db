// src/templates.rs
use crate::{
    error::{AppError, AppResult},
    models::{report::SignatureNames, user::User, violation::ViolationType},
};
use askama::Template;
use axum::response::Html;

/// Renders a page, turning template failures into a logged 500.
pub fn render_page<T: Template>(template: &T) -> AppResult<Html<String>> {
    template.render().map(Html).map_err(|e| {
        tracing::error!("Failed to render template: {}", e);
        AppError::InternalServerError
    })
}

/// Navigation and feedback banner shared by every logged-in page.
#[derive(Debug, Clone)]
pub struct PageContext {
    pub username: String,
    pub role_label: &'static str,
    pub is_admin: bool,
    pub success_message: Option<String>,
    pub error_message: Option<String>,
}

impl PageContext {
    pub fn new(user: &User, success: Option<String>, error: Option<String>) -> Self {
        Self {
            username: user.username.clone(),
            role_label: user.role.label(),
            is_admin: user.role.is_admin(),
            success_message: success,
            error_message: error,
        }
    }
}

/// `<option>` entry with its selection precomputed.
#[derive(Debug, Clone)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginPage {
    pub error: Option<String>,
    pub username: String,
}

#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardPage {
    pub ctx: PageContext,
    pub total_students: usize,
    pub students_with_violations: usize,
    pub percentage: String,
}

#[derive(Debug, Clone)]
pub struct StudentRow {
    pub id: String,
    pub name: String,
    pub class_name: String,
    pub gender: &'static str,
}

#[derive(Template)]
#[template(path = "students.html")]
pub struct StudentsPage {
    pub ctx: PageContext,
    pub students: Vec<StudentRow>,
    pub search: String,
    pub total: usize,
}

#[derive(Template)]
#[template(path = "student_edit.html")]
pub struct StudentEditPage {
    pub ctx: PageContext,
    pub student: StudentRow,
    pub is_female: bool,
}

#[derive(Template)]
#[template(path = "violation_types.html")]
pub struct ViolationTypesPage {
    pub ctx: PageContext,
    pub violation_types: Vec<ViolationType>,
}

#[derive(Debug, Clone)]
pub struct ViolationRow {
    pub id: String,
    pub date: String,
    pub student_name: String,
    pub class_name: String,
    pub type_names: String,
    pub notes: String,
}

#[derive(Template)]
#[template(path = "violations.html")]
pub struct ViolationsPage {
    pub ctx: PageContext,
    pub violations: Vec<ViolationRow>,
    pub classes: Vec<SelectOption>,
    pub selected_class: String,
    pub students: Vec<SelectOption>,
    pub violation_types: Vec<SelectOption>,
    pub today: String,
}

#[derive(Template)]
#[template(path = "violation_edit.html")]
pub struct ViolationEditPage {
    pub ctx: PageContext,
    pub violation_id: String,
    pub date: String,
    pub notes: String,
    pub students: Vec<SelectOption>,
    pub violation_types: Vec<SelectOption>,
}

#[derive(Template)]
#[template(path = "reports.html")]
pub struct ReportsPage {
    pub ctx: PageContext,
    pub students: Vec<SelectOption>,
    pub title: String,
    pub signatures: SignatureNames,
}

#[derive(Debug, Clone)]
pub struct UserRow {
    pub id: String,
    pub username: String,
    pub role_label: &'static str,
    pub is_self: bool,
}

#[derive(Template)]
#[template(path = "admin_users.html")]
pub struct AdminUsersPage {
    pub ctx: PageContext,
    pub users: Vec<UserRow>,
    pub roles: Vec<SelectOption>,
}

#[derive(Template)]
#[template(path = "admin_edit_user.html")]
pub struct AdminEditUserPage {
    pub ctx: PageContext,
    pub user_id: String,
    pub username: String,
    pub roles: Vec<SelectOption>,
}
