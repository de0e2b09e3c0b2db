// src/models/student.rs
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Gender {
    #[default]
    #[serde(rename = "Laki-laki")]
    Male,
    #[serde(rename = "Perempuan")]
    Female,
}

impl Gender {
    pub fn label(&self) -> &'static str {
        match self {
            Gender::Male => "Laki-laki",
            Gender::Female => "Perempuan",
        }
    }

    /// Female only for the exact (case-insensitive) female term, Male otherwise.
    pub fn from_cell(raw: &str) -> Self {
        if raw.trim().to_lowercase() == "perempuan" {
            Gender::Female
        } else {
            Gender::Male
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    pub name: String,
    pub class_name: String,
    pub gender: Gender,
}

impl Student {
    /// (name, class) identity, compared case-insensitively.
    pub fn same_identity(&self, name: &str, class_name: &str) -> bool {
        self.name.to_lowercase() == name.to_lowercase()
            && self.class_name.to_lowercase() == class_name.to_lowercase()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewStudent {
    pub name: String,
    pub class_name: String,
    #[serde(default)]
    pub gender: Gender,
}

impl NewStudent {
    pub fn into_student(self, id: String) -> Student {
        Student {
            id,
            name: self.name,
            class_name: self.class_name,
            gender: self.gender,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gender_from_cell_defaults_to_male() {
        assert_eq!(Gender::from_cell("Perempuan"), Gender::Female);
        assert_eq!(Gender::from_cell(" PEREMPUAN "), Gender::Female);
        assert_eq!(Gender::from_cell("P"), Gender::Male);
        assert_eq!(Gender::from_cell(""), Gender::Male);
    }

    #[test]
    fn identity_ignores_case() {
        let s = Student {
            id: "student-1".into(),
            name: "Budi Santoso".into(),
            class_name: "VII-A".into(),
            gender: Gender::Male,
        };
        assert!(s.same_identity("budi santoso", "vii-a"));
        assert!(!s.same_identity("budi santoso", "VII-B"));
    }

    #[test]
    fn student_json_uses_camel_case() {
        let s = Student {
            id: "student-1".into(),
            name: "Siti".into(),
            class_name: "VIII-C".into(),
            gender: Gender::Female,
        };
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["className"], "VIII-C");
        assert_eq!(json["gender"], "Perempuan");
    }
}
