// src/web/student_handlers.rs
use crate::{
    error::{AppError, AppResult},
    models::student::{Gender, NewStudent, Student},
    services::{import_service, student_service},
    state::AppState,
    templates::{render_page, PageContext, StudentEditPage, StudentRow, StudentsPage},
    web::{mw_auth::CurrentUser, redirect_error, redirect_on_error, redirect_success, FeedbackParams},
};
use axum::{
    extract::{Extension, Form, Multipart, Path, Query, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;

#[derive(Deserialize, Debug, Default)]
pub struct SearchParams {
    #[serde(default)]
    q: String,
}

#[derive(Deserialize, Debug)]
pub struct StudentForm {
    name: String,
    class_name: String,
    #[serde(default)]
    gender: String,
}

fn student_row(student: &Student) -> StudentRow {
    StudentRow {
        id: student.id.clone(),
        name: student.name.clone(),
        class_name: student.class_name.clone(),
        gender: student.gender.label(),
    }
}

// GET /students
pub async fn students_page(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Query(feedback): Query<FeedbackParams>,
    Query(params): Query<SearchParams>,
) -> AppResult<Html<String>> {
    let mut students = state.students.get_all_students().await?;
    student_service::sort_by_name(&mut students);
    let matches: Vec<StudentRow> = student_service::search(&students, &params.q)
        .into_iter()
        .map(student_row)
        .collect();
    tracing::debug!("GET /students: {} of {} shown", matches.len(), students.len());

    render_page(&StudentsPage {
        ctx: PageContext::new(&user, feedback.success, feedback.error),
        students: matches,
        search: params.q,
        total: students.len(),
    })
}

// POST /students/create
pub async fn handle_create_student(
    State(state): State<AppState>,
    Form(form): Form<StudentForm>,
) -> AppResult<Redirect> {
    let new_student = NewStudent {
        name: form.name,
        class_name: form.class_name,
        gender: Gender::from_cell(&form.gender),
    };
    match state.students.add_student(new_student).await {
        Ok(student) => Ok(redirect_success(
            "/students",
            &format!("Siswa '{}' berhasil ditambahkan.", student.name),
        )),
        Err(e) => redirect_on_error("/students", e),
    }
}

// GET /students/edit/{id}
pub async fn show_edit_student_form(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<String>,
    Query(feedback): Query<FeedbackParams>,
) -> AppResult<Response> {
    let Some(student) = state.students.get_student_by_id(&id).await? else {
        tracing::warn!("Edit requested for missing student {}", id);
        return Ok(redirect_error("/students", "Siswa tidak ditemukan.").into_response());
    };

    let page = StudentEditPage {
        ctx: PageContext::new(&user, feedback.success, feedback.error),
        is_female: student.gender == Gender::Female,
        student: student_row(&student),
    };
    Ok(render_page(&page)?.into_response())
}

// POST /students/edit/{id}
pub async fn handle_edit_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<StudentForm>,
) -> AppResult<Redirect> {
    let student = Student {
        id: id.clone(),
        name: form.name,
        class_name: form.class_name,
        gender: Gender::from_cell(&form.gender),
    };
    match state.students.update_student(student).await {
        Ok(student) => Ok(redirect_success(
            "/students",
            &format!("Data siswa '{}' diperbarui.", student.name),
        )),
        Err(e @ AppError::NotFound(_)) => redirect_on_error("/students", e),
        Err(e) => redirect_on_error(&format!("/students/edit/{}", id), e),
    }
}

// POST /students/delete/{id}
pub async fn handle_delete_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Redirect> {
    if state.students.delete_student(&id).await? {
        Ok(redirect_success("/students", "Siswa berhasil dihapus."))
    } else {
        Ok(redirect_error("/students", "Siswa tidak ditemukan."))
    }
}

// POST /students/import (multipart, field "file")
pub async fn handle_import_students(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Redirect> {
    let mut upload: Option<(String, Vec<u8>)> = None;
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                tracing::warn!("Malformed multipart upload: {}", e);
                return Ok(redirect_error("/students", "Unggahan file tidak valid."));
            }
        };
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        match field.bytes().await {
            Ok(bytes) if !bytes.is_empty() => upload = Some((filename, bytes.to_vec())),
            Ok(_) => {}
            Err(e) => {
                tracing::warn!("Failed to read uploaded file '{}': {}", filename, e);
                return Ok(redirect_error("/students", "Gagal membaca file yang diunggah."));
            }
        }
    }

    let Some((filename, bytes)) = upload else {
        return Ok(redirect_error("/students", "Pilih file spreadsheet terlebih dahulu."));
    };
    tracing::info!("Importing students from '{}' ({} bytes)", filename, bytes.len());

    let parsed = tokio::task::spawn_blocking(move || {
        import_service::parse_student_file(&filename, &bytes)
    })
    .await
    .map_err(|e| {
        tracing::error!("spawn_blocking failed (parse_student_file): {:?}", e);
        AppError::InternalServerError
    })?;

    let records = match parsed {
        Ok(records) => records,
        Err(e) => return redirect_on_error("/students", e),
    };
    if records.is_empty() {
        return Ok(redirect_error(
            "/students",
            "Tidak ada baris yang dapat diimpor. Pastikan kolom \"Nama Siswa\" dan \"Kelas\" terisi.",
        ));
    }

    let total = records.len();
    let inserted = state.students.add_students_bulk(records).await?;
    let skipped = total - inserted.len();
    Ok(redirect_success(
        "/students",
        &format!(
            "{} siswa baru berhasil diimpor, {} dilewati karena sudah ada.",
            inserted.len(),
            skipped
        ),
    ))
}
