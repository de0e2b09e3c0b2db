// src/models/violation.rs
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViolationType {
    pub id: String,
    pub name: String,
}

/// Types present on a fresh install.
pub fn initial_violation_types() -> Vec<ViolationType> {
    [
        ("v1", "Tidak memakai topi"),
        ("v2", "Kaos kaki tidak sesuai"),
        ("v3", "Rambut tidak rapi"),
        ("v4", "Seragam tidak lengkap"),
        ("v5", "Terlambat masuk sekolah"),
        ("v6", "Membuang sampah sembarangan"),
    ]
    .into_iter()
    .map(|(id, name)| ViolationType {
        id: id.to_string(),
        name: name.to_string(),
    })
    .collect()
}

/// One recorded incident. `violation_type_ids` may point at types that were
/// deleted afterwards; nothing cascades.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    pub id: String,
    pub student_id: String,
    pub date: NaiveDate, // YYYY-MM-DD
    pub violation_type_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewViolation {
    pub student_id: String,
    pub date: NaiveDate,
    pub violation_type_ids: Vec<String>,
    pub notes: Option<String>,
}

impl NewViolation {
    pub fn into_violation(self, id: String) -> Violation {
        Violation {
            id,
            student_id: self.student_id,
            date: self.date,
            violation_type_ids: self.violation_type_ids,
            notes: self.notes,
        }
    }
}

/// Blank notes are stored as absent.
pub fn normalize_notes(notes: Option<String>) -> Option<String> {
    notes
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn violation_round_trips_through_stored_json() {
        let raw = r#"{"id":"violation-1","studentId":"student-1","date":"2025-03-14","violationTypeIds":["v1","v5"]}"#;
        let v: Violation = serde_json::from_str(raw).unwrap();
        assert_eq!(v.date, NaiveDate::from_ymd_opt(2025, 3, 14).unwrap());
        assert_eq!(v.notes, None);
        assert_eq!(serde_json::to_string(&v).unwrap(), raw);
    }

    #[test]
    fn blank_notes_become_none() {
        assert_eq!(normalize_notes(Some("  ".into())), None);
        assert_eq!(normalize_notes(Some(" telat 10 menit ".into())).as_deref(), Some("telat 10 menit"));
        assert_eq!(normalize_notes(None), None);
    }
}
