// src/services/report_service.rs
use crate::{
    error::{AppError, AppResult},
    models::{
        report::{ReportDocument, ReportFilter, ReportRow, SignatureNames},
        student::Student,
        violation::{Violation, ViolationType},
    },
    services::{data_service::DataService, pdf_service},
    store::keys,
};
use chrono::{Local, NaiveDate};
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct ReportService {
    data: DataService,
}

impl ReportService {
    pub fn new(data: DataService) -> Self {
        Self { data }
    }

    pub async fn load_signatures(&self) -> SignatureNames {
        self.data
            .store()
            .load(keys::SIGNATURE_NAMES, SignatureNames::default())
            .await
    }

    pub async fn save_signatures(&self, names: &SignatureNames) -> AppResult<()> {
        let names = SignatureNames {
            supervising_teacher: names.supervising_teacher.trim().to_string(),
            principal: names.principal.trim().to_string(),
        };
        self.data.store().save(keys::SIGNATURE_NAMES, &names).await?;
        tracing::info!("Signature names saved");
        Ok(())
    }

    /// Loads every collection, applies `filter` and aggregates the result.
    pub async fn build_document(
        &self,
        filter: &ReportFilter,
        signatures: SignatureNames,
        title: &str,
    ) -> AppResult<ReportDocument> {
        let students = self.data.get_all_students().await?;
        let violations = self.data.get_all_violations().await?;
        let violation_types = self.data.get_all_violation_types().await?;

        if students.is_empty() || violations.is_empty() || violation_types.is_empty() {
            return Err(AppError::Validation(
                "Tidak ada data yang cukup untuk membuat laporan. Pastikan ada siswa dan catatan pelanggaran."
                    .to_string(),
            ));
        }

        let filtered = filter_violations(&violations, filter);
        if filtered.is_empty() {
            return Err(AppError::Validation(
                "Tidak ada catatan pelanggaran yang sesuai dengan filter yang dipilih.".to_string(),
            ));
        }

        let rows = aggregate(&students, &filtered, &violation_types);
        tracing::debug!(
            "Report built: {} violations -> {} rows",
            filtered.len(),
            rows.len()
        );

        Ok(ReportDocument {
            title: title.to_string(),
            printed_on: Local::now().date_naive(),
            filters_applied: describe_filters(filter, &students),
            rows,
            signatures,
        })
    }

    /// Builds the document and renders it as PDF bytes.
    pub async fn generate_pdf(
        &self,
        filter: &ReportFilter,
        signatures: SignatureNames,
        title: &str,
    ) -> AppResult<Vec<u8>> {
        let document = self.build_document(filter, signatures, title).await?;
        tokio::task::spawn_blocking(move || pdf_service::render_report(&document))
            .await
            .map_err(|e| {
                tracing::error!("spawn_blocking failed (render_report): {:?}", e);
                AppError::InternalServerError
            })?
    }
}

/// Violations matching the optional student and the inclusive date range.
pub fn filter_violations(violations: &[Violation], filter: &ReportFilter) -> Vec<Violation> {
    violations
        .iter()
        .filter(|v| {
            filter
                .student_id
                .as_deref()
                .map_or(true, |id| v.student_id == id)
        })
        .filter(|v| filter.start.map_or(true, |start| v.date >= start))
        .filter(|v| filter.end.map_or(true, |end| v.date <= end))
        .cloned()
        .collect()
}

/// Day/month/year without padding, e.g. 5/3/2025.
pub fn format_report_date(date: NaiveDate) -> String {
    date.format("%-d/%-m/%Y").to_string()
}

/// Human-readable summary of the active filters; empty when none apply.
pub fn describe_filters(filter: &ReportFilter, students: &[Student]) -> String {
    let mut parts = Vec::new();
    if let Some(id) = filter.student_id.as_deref() {
        if let Some(student) = students.iter().find(|s| s.id == id) {
            parts.push(format!("Siswa: {}", student.name));
        }
    }
    if let Some(start) = filter.start {
        parts.push(format!("Dari: {}", format_report_date(start)));
    }
    if let Some(end) = filter.end {
        parts.push(format!("Sampai: {}", format_report_date(end)));
    }
    parts.join(", ")
}

struct StudentSummary<'a> {
    student: &'a Student,
    total_incidents: usize,
    // first-seen order
    type_counts: Vec<(&'a str, usize)>,
    notes: Vec<&'a str>,
}

/// Groups violations per student. Every type id on a violation counts as one
/// incident, even when the type itself no longer exists; unresolvable types
/// are only left out of the type list. Violations of unknown students are
/// skipped. Rows are sorted by student name and numbered from 1.
pub fn aggregate(
    students: &[Student],
    violations: &[Violation],
    violation_types: &[ViolationType],
) -> Vec<ReportRow> {
    let mut summaries: Vec<StudentSummary> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for violation in violations {
        let Some(student) = students.iter().find(|s| s.id == violation.student_id) else {
            continue;
        };
        let slot = *index.entry(student.id.as_str()).or_insert_with(|| {
            summaries.push(StudentSummary {
                student,
                total_incidents: 0,
                type_counts: Vec::new(),
                notes: Vec::new(),
            });
            summaries.len() - 1
        });
        let summary = &mut summaries[slot];

        for type_id in &violation.violation_type_ids {
            match summary
                .type_counts
                .iter()
                .position(|(id, _)| *id == type_id.as_str())
            {
                Some(pos) => summary.type_counts[pos].1 += 1,
                None => summary.type_counts.push((type_id.as_str(), 1)),
            }
            summary.total_incidents += 1;
        }

        if let Some(notes) = violation.notes.as_deref().filter(|n| !n.is_empty()) {
            summary.notes.push(notes);
        }
    }

    let mut rows: Vec<ReportRow> = summaries
        .into_iter()
        .map(|summary| {
            let violation_types_list = summary
                .type_counts
                .iter()
                .filter_map(|(type_id, count)| {
                    violation_types
                        .iter()
                        .find(|t| t.id == *type_id)
                        .map(|t| format!("{} ({} kali)", t.name, count))
                })
                .collect::<Vec<_>>()
                .join(", ");

            ReportRow {
                no: 0,
                student_name: summary.student.name.clone(),
                class_name: summary.student.class_name.clone(),
                total_incidents: summary.total_incidents,
                violation_types: violation_types_list,
                notes: summary.notes.join("; "),
            }
        })
        .collect();

    rows.sort_by(|a, b| a.student_name.cmp(&b.student_name));
    for (i, row) in rows.iter_mut().enumerate() {
        row.no = i + 1;
    }
    rows
}
