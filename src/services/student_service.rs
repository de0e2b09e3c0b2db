// src/services/student_service.rs
use crate::{
    error::{AppError, AppResult},
    models::student::{NewStudent, Student},
    services::data_service::DataService,
};

#[derive(Debug, Clone)]
pub struct StudentService {
    data: DataService,
}

impl StudentService {
    pub fn new(data: DataService) -> Self {
        Self { data }
    }

    pub async fn get_all_students(&self) -> AppResult<Vec<Student>> {
        self.data.get_all_students().await
    }

    pub async fn get_student_by_id(&self, id: &str) -> AppResult<Option<Student>> {
        self.data.get_student_by_id(id).await
    }

    pub async fn add_student(&self, new_student: NewStudent) -> AppResult<Student> {
        let (name, class_name) = required_identity(&new_student.name, &new_student.class_name)?;
        self.data
            .add_student(NewStudent {
                name,
                class_name,
                ..new_student
            })
            .await
    }

    pub async fn update_student(&self, student: Student) -> AppResult<Student> {
        let (name, class_name) = required_identity(&student.name, &student.class_name)?;
        self.data
            .update_student(Student {
                name,
                class_name,
                ..student
            })
            .await
    }

    pub async fn delete_student(&self, id: &str) -> AppResult<bool> {
        self.data.delete_student(id).await
    }

    pub async fn add_students_bulk(&self, records: Vec<NewStudent>) -> AppResult<Vec<Student>> {
        self.data.add_students_bulk(records).await
    }
}

fn required_identity(name: &str, class_name: &str) -> AppResult<(String, String)> {
    let name = name.trim();
    let class_name = class_name.trim();
    if name.is_empty() || class_name.is_empty() {
        return Err(AppError::Validation("Nama siswa dan kelas wajib diisi.".to_string()));
    }
    Ok((name.to_string(), class_name.to_string()))
}

/// Students whose name or class contains `term`, ignoring case. A blank term
/// keeps everyone.
pub fn search<'a>(students: &'a [Student], term: &str) -> Vec<&'a Student> {
    let term = term.trim().to_lowercase();
    students
        .iter()
        .filter(|s| {
            term.is_empty()
                || s.name.to_lowercase().contains(&term)
                || s.class_name.to_lowercase().contains(&term)
        })
        .collect()
}

pub fn sort_by_name(students: &mut [Student]) {
    students.sort_by(|a, b| a.name.cmp(&b.name));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::student::Gender;

    fn student(id: &str, name: &str, class_name: &str) -> Student {
        Student {
            id: id.into(),
            name: name.into(),
            class_name: class_name.into(),
            gender: Gender::Male,
        }
    }

    #[test]
    fn search_matches_name_or_class() {
        let students = vec![
            student("1", "Andi", "VII-A"),
            student("2", "Budi", "VIII-B"),
            student("3", "Citra", "vii-b"),
        ];

        let by_name: Vec<&str> = search(&students, "BUD").iter().map(|s| s.id.as_str()).collect();
        assert_eq!(by_name, vec!["2"]);

        let by_class: Vec<&str> = search(&students, "vii-").iter().map(|s| s.id.as_str()).collect();
        assert_eq!(by_class, vec!["1", "3"]);

        assert_eq!(search(&students, "  ").len(), 3);
    }

    #[test]
    fn blank_identity_is_rejected() {
        assert!(required_identity("  ", "VII-A").is_err());
        assert_eq!(
            required_identity(" Andi ", " VII-A ").unwrap(),
            ("Andi".to_string(), "VII-A".to_string())
        );
    }
}
