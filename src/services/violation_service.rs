// src/services/violation_service.rs
use crate::{
    error::{AppError, AppResult},
    models::{
        report::DashboardStats,
        student::Student,
        violation::{NewViolation, Violation, ViolationType},
    },
    services::data_service::DataService,
};
use std::collections::{BTreeSet, HashSet};

#[derive(Debug, Clone)]
pub struct ViolationService {
    data: DataService,
}

impl ViolationService {
    pub fn new(data: DataService) -> Self {
        Self { data }
    }

    // --- Violation Types ---

    pub async fn get_all_violation_types(&self) -> AppResult<Vec<ViolationType>> {
        self.data.get_all_violation_types().await
    }

    pub async fn add_violation_type(&self, name: &str) -> AppResult<ViolationType> {
        let name = required_type_name(name)?;
        self.data.add_violation_type(&name).await
    }

    pub async fn update_violation_type(&self, updated: ViolationType) -> AppResult<ViolationType> {
        let name = required_type_name(&updated.name)?;
        self.data
            .update_violation_type(ViolationType { name, ..updated })
            .await
    }

    pub async fn delete_violation_type(&self, id: &str) -> AppResult<bool> {
        self.data.delete_violation_type(id).await
    }

    // --- Violations ---

    pub async fn get_all_violations(&self) -> AppResult<Vec<Violation>> {
        self.data.get_all_violations().await
    }

    pub async fn add_violation(&self, new_violation: NewViolation) -> AppResult<Violation> {
        self.data.add_violation(new_violation).await
    }

    pub async fn update_violation(&self, updated: Violation) -> AppResult<Violation> {
        self.data.update_violation(updated).await
    }

    pub async fn delete_violation(&self, id: &str) -> AppResult<bool> {
        self.data.delete_violation(id).await
    }

    pub async fn dashboard_stats(&self) -> AppResult<DashboardStats> {
        let students = self.data.get_all_students().await?;
        let violations = self.data.get_all_violations().await?;
        Ok(compute_dashboard_stats(&students, &violations))
    }
}

fn required_type_name(name: &str) -> AppResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::Validation(
            "Nama jenis pelanggaran tidak boleh kosong.".to_string(),
        ));
    }
    Ok(name.to_string())
}

/// Distinct class names, sorted.
pub fn class_names(students: &[Student]) -> Vec<String> {
    students
        .iter()
        .map(|s| s.class_name.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

pub fn sort_newest_first(violations: &mut [Violation]) {
    violations.sort_by(|a, b| b.date.cmp(&a.date));
}

/// Comma-joined names of the types on a violation; ids that no longer
/// resolve are left out.
pub fn type_names(violation: &Violation, types: &[ViolationType]) -> String {
    violation
        .violation_type_ids
        .iter()
        .filter_map(|id| types.iter().find(|t| &t.id == id))
        .map(|t| t.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Counts students with at least one recorded violation, by student id.
pub fn compute_dashboard_stats(students: &[Student], violations: &[Violation]) -> DashboardStats {
    let with_violations: HashSet<&str> = violations.iter().map(|v| v.student_id.as_str()).collect();
    let total_students = students.len();
    let students_with_violations = with_violations.len();
    let percentage = if total_students > 0 {
        students_with_violations as f64 / total_students as f64 * 100.0
    } else {
        0.0
    };

    DashboardStats {
        total_students,
        students_with_violations,
        percentage,
    }
}
