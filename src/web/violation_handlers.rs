// src/web/violation_handlers.rs
use crate::{
    error::{AppError, AppResult},
    models::{
        student::Student,
        violation::{NewViolation, Violation, ViolationType},
    },
    services::{student_service, violation_service},
    state::AppState,
    templates::{
        render_page, PageContext, SelectOption, ViolationEditPage, ViolationRow, ViolationsPage,
    },
    web::{mw_auth::CurrentUser, redirect_error, redirect_on_error, redirect_success, FeedbackParams},
};
use axum::{
    extract::{Extension, Form, Path, Query, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use chrono::{Local, NaiveDate};
use serde::Deserialize;

const PAGE: &str = "/violations";

#[derive(Deserialize, Debug, Default)]
pub struct ClassParams {
    #[serde(default)]
    kelas: String,
}

/// Violation form fields. The type checkboxes repeat the same key, which a
/// plain struct cannot capture, so the form arrives as raw pairs.
#[derive(Debug, Default, PartialEq)]
struct ViolationForm {
    student_id: String,
    date: String,
    violation_type_ids: Vec<String>,
    notes: String,
}

impl ViolationForm {
    fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut form = ViolationForm::default();
        for (key, value) in pairs {
            match key.as_str() {
                "student_id" => form.student_id = value,
                "date" => form.date = value,
                "violation_type_ids" => form.violation_type_ids.push(value),
                "notes" => form.notes = value,
                _ => {}
            }
        }
        form
    }

    fn parsed_date(&self) -> AppResult<NaiveDate> {
        NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d")
            .map_err(|_| AppError::Validation("Tanggal tidak valid.".to_string()))
    }

    fn into_new_violation(self) -> AppResult<NewViolation> {
        let date = self.parsed_date()?;
        Ok(NewViolation {
            student_id: self.student_id,
            date,
            violation_type_ids: self.violation_type_ids,
            notes: Some(self.notes),
        })
    }
}

fn student_label(student: &Student) -> String {
    format!("{} ({})", student.name, student.class_name)
}

fn type_options(types: &[ViolationType], checked: &[String]) -> Vec<SelectOption> {
    types
        .iter()
        .map(|t| SelectOption {
            value: t.id.clone(),
            label: t.name.clone(),
            selected: checked.contains(&t.id),
        })
        .collect()
}

fn violation_row(
    violation: &Violation,
    students: &[Student],
    types: &[ViolationType],
) -> ViolationRow {
    let student = students.iter().find(|s| s.id == violation.student_id);
    ViolationRow {
        id: violation.id.clone(),
        date: violation.date.format("%d/%m/%Y").to_string(),
        student_name: student.map_or_else(|| "Siswa tidak dikenal".to_string(), |s| s.name.clone()),
        class_name: student.map(|s| s.class_name.clone()).unwrap_or_default(),
        type_names: violation_service::type_names(violation, types),
        notes: violation.notes.clone().unwrap_or_default(),
    }
}

// GET /violations?kelas=
pub async fn violations_page(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Query(feedback): Query<FeedbackParams>,
    Query(params): Query<ClassParams>,
) -> AppResult<Html<String>> {
    let mut students = state.students.get_all_students().await?;
    student_service::sort_by_name(&mut students);
    let types = state.violations.get_all_violation_types().await?;
    let mut violations = state.violations.get_all_violations().await?;
    violation_service::sort_newest_first(&mut violations);

    let selected_class = params.kelas.trim().to_string();
    let classes = violation_service::class_names(&students)
        .into_iter()
        .map(|c| SelectOption {
            selected: c == selected_class,
            label: c.clone(),
            value: c,
        })
        .collect();
    let class_students = students
        .iter()
        .filter(|s| s.class_name == selected_class)
        .map(|s| SelectOption {
            value: s.id.clone(),
            label: s.name.clone(),
            selected: false,
        })
        .collect();

    render_page(&ViolationsPage {
        ctx: PageContext::new(&user, feedback.success, feedback.error),
        violations: violations
            .iter()
            .map(|v| violation_row(v, &students, &types))
            .collect(),
        classes,
        selected_class,
        students: class_students,
        violation_types: type_options(&types, &[]),
        today: Local::now().date_naive().format("%Y-%m-%d").to_string(),
    })
}

// POST /violations/create
pub async fn handle_create_violation(
    State(state): State<AppState>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> AppResult<Redirect> {
    let form = ViolationForm::from_pairs(pairs);
    let result = match form.into_new_violation() {
        Ok(new_violation) => state.violations.add_violation(new_violation).await,
        Err(e) => Err(e),
    };
    match result {
        Ok(created) => {
            tracing::info!(
                "Violation {} recorded for student {} ({} types)",
                created.id,
                created.student_id,
                created.violation_type_ids.len()
            );
            Ok(redirect_success(PAGE, "Pelanggaran berhasil dicatat."))
        }
        Err(e) => redirect_on_error(PAGE, e),
    }
}

// GET /violations/edit/{id}
pub async fn show_edit_violation_form(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<String>,
    Query(feedback): Query<FeedbackParams>,
) -> AppResult<Response> {
    let violations = state.violations.get_all_violations().await?;
    let Some(violation) = violations.into_iter().find(|v| v.id == id) else {
        tracing::warn!("Edit requested for missing violation {}", id);
        return Ok(redirect_error(PAGE, "Catatan pelanggaran tidak ditemukan.").into_response());
    };

    let mut students = state.students.get_all_students().await?;
    student_service::sort_by_name(&mut students);
    let types = state.violations.get_all_violation_types().await?;

    let page = ViolationEditPage {
        ctx: PageContext::new(&user, feedback.success, feedback.error),
        date: violation.date.format("%Y-%m-%d").to_string(),
        notes: violation.notes.clone().unwrap_or_default(),
        students: students
            .iter()
            .map(|s| SelectOption {
                value: s.id.clone(),
                label: student_label(s),
                selected: s.id == violation.student_id,
            })
            .collect(),
        violation_types: type_options(&types, &violation.violation_type_ids),
        violation_id: violation.id,
    };
    Ok(render_page(&page)?.into_response())
}

// POST /violations/edit/{id}
pub async fn handle_edit_violation(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> AppResult<Redirect> {
    let form = ViolationForm::from_pairs(pairs);
    let result = match form.into_new_violation() {
        Ok(changes) => {
            state
                .violations
                .update_violation(changes.into_violation(id.clone()))
                .await
        }
        Err(e) => Err(e),
    };
    match result {
        Ok(_) => Ok(redirect_success(PAGE, "Catatan pelanggaran diperbarui.")),
        Err(e @ AppError::NotFound(_)) => redirect_on_error(PAGE, e),
        Err(e) => redirect_on_error(&format!("{}/edit/{}", PAGE, id), e),
    }
}

// POST /violations/delete/{id}
pub async fn handle_delete_violation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Redirect> {
    if state.violations.delete_violation(&id).await? {
        Ok(redirect_success(PAGE, "Catatan pelanggaran dihapus."))
    } else {
        Ok(redirect_error(PAGE, "Catatan pelanggaran tidak ditemukan."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_checkbox_keys_are_collected() {
        let pairs = vec![
            ("student_id".to_string(), "student-1".to_string()),
            ("date".to_string(), "2025-03-14".to_string()),
            ("violation_type_ids".to_string(), "v1".to_string()),
            ("violation_type_ids".to_string(), "v5".to_string()),
            ("notes".to_string(), "".to_string()),
        ];
        let form = ViolationForm::from_pairs(pairs);
        assert_eq!(form.violation_type_ids, vec!["v1", "v5"]);

        let new_violation = form.into_new_violation().unwrap();
        assert_eq!(new_violation.date, NaiveDate::from_ymd_opt(2025, 3, 14).unwrap());
    }

    #[test]
    fn bad_date_is_a_validation_error() {
        let form = ViolationForm {
            date: "14/03/2025".into(),
            ..ViolationForm::default()
        };
        assert!(matches!(form.into_new_violation(), Err(AppError::Validation(_))));
    }
}
