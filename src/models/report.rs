// src/models/report.rs
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const DEFAULT_REPORT_TITLE: &str = "Laporan Pelanggaran Siswa";
pub const REPORT_FILENAME: &str = "laporan-pelanggaran-siswa.pdf";

/// One line of the report table, one per student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    pub no: usize,
    pub student_name: String,
    pub class_name: String,
    pub total_incidents: usize,
    pub violation_types: String, // "Rambut tidak rapi (2 kali), ..."
    pub notes: String,
}

/// Names printed under the two signature blocks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureNames {
    #[serde(rename = "guruPiket", default)]
    pub supervising_teacher: String,
    #[serde(rename = "kepalaSekolah", default)]
    pub principal: String,
}

/// Caller-side filter applied before aggregation. All bounds are inclusive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportFilter {
    pub student_id: Option<String>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

/// Everything the PDF renderer needs.
#[derive(Debug, Clone)]
pub struct ReportDocument {
    pub title: String,
    pub printed_on: NaiveDate,
    pub filters_applied: String,
    pub rows: Vec<ReportRow>,
    pub signatures: SignatureNames,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DashboardStats {
    pub total_students: usize,
    pub students_with_violations: usize,
    pub percentage: f64,
}
