// src/web/report_handlers.rs
use crate::{
    error::{AppError, AppResult},
    models::report::{ReportFilter, SignatureNames, DEFAULT_REPORT_TITLE, REPORT_FILENAME},
    services::student_service,
    state::AppState,
    templates::{render_page, PageContext, ReportsPage, SelectOption},
    web::{mw_auth::CurrentUser, non_empty, redirect_on_error, redirect_success, FeedbackParams},
};
use axum::{
    extract::{Extension, Form, Query, State},
    http::header,
    response::{Html, IntoResponse, Redirect, Response},
};
use chrono::NaiveDate;
use serde::Deserialize;

const PAGE: &str = "/reports";

#[derive(Deserialize, Debug, Default)]
pub struct ReportForm {
    title: Option<String>,
    student_id: Option<String>,
    start: Option<String>,
    end: Option<String>,
    #[serde(default)]
    guru_piket: String,
    #[serde(default)]
    kepala_sekolah: String,
}

impl ReportForm {
    fn signatures(&self) -> SignatureNames {
        SignatureNames {
            supervising_teacher: self.guru_piket.clone(),
            principal: self.kepala_sekolah.clone(),
        }
    }

    fn filter(&self) -> AppResult<ReportFilter> {
        Ok(ReportFilter {
            student_id: non_empty(self.student_id.clone()),
            start: parse_date(self.start.clone())?,
            end: parse_date(self.end.clone())?,
        })
    }

    fn title(&self) -> String {
        non_empty(self.title.clone()).unwrap_or_else(|| DEFAULT_REPORT_TITLE.to_string())
    }
}

fn parse_date(raw: Option<String>) -> AppResult<Option<NaiveDate>> {
    non_empty(raw)
        .map(|d| {
            NaiveDate::parse_from_str(&d, "%Y-%m-%d")
                .map_err(|_| AppError::Validation(format!("Tanggal tidak valid: {}", d)))
        })
        .transpose()
}

// GET /reports
pub async fn reports_page(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Query(feedback): Query<FeedbackParams>,
) -> AppResult<Html<String>> {
    let mut students = state.students.get_all_students().await?;
    student_service::sort_by_name(&mut students);
    let signatures = state.reports.load_signatures().await;

    render_page(&ReportsPage {
        ctx: PageContext::new(&user, feedback.success, feedback.error),
        students: students
            .iter()
            .map(|s| SelectOption {
                value: s.id.clone(),
                label: format!("{} ({})", s.name, s.class_name),
                selected: false,
            })
            .collect(),
        title: DEFAULT_REPORT_TITLE.to_string(),
        signatures,
    })
}

// POST /reports/signatures
pub async fn handle_save_signatures(
    State(state): State<AppState>,
    Form(form): Form<ReportForm>,
) -> AppResult<Redirect> {
    state.reports.save_signatures(&form.signatures()).await?;
    Ok(redirect_success(PAGE, "Nama penanda tangan disimpan."))
}

// POST /reports/pdf
pub async fn handle_download_pdf(
    State(state): State<AppState>,
    Form(form): Form<ReportForm>,
) -> AppResult<Response> {
    let filter = match form.filter() {
        Ok(filter) => filter,
        Err(e) => return Ok(redirect_on_error(PAGE, e)?.into_response()),
    };
    let signatures = form.signatures();
    // names typed on the form are remembered for the next report
    state.reports.save_signatures(&signatures).await?;

    tracing::info!("Generating report PDF with filter {:?}", filter);
    match state
        .reports
        .generate_pdf(&filter, signatures, &form.title())
        .await
    {
        Ok(bytes) => {
            tracing::info!("✅ Report PDF generated ({} bytes)", bytes.len());
            let disposition = format!("attachment; filename=\"{}\"", REPORT_FILENAME);
            Ok((
                [
                    (header::CONTENT_TYPE, "application/pdf".to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                bytes,
            )
                .into_response())
        }
        Err(e) => Ok(redirect_on_error(PAGE, e)?.into_response()),
    }
}
