// src/services/data_service.rs
//! Record collections kept in the key-value store.
//!
//! Every operation loads a whole collection, changes it in memory and saves it
//! back, so two concurrent writers on the same collection can lose an update.
//! Successful results are delayed by `latency` to mimic a remote API.

use crate::{
    error::{AppError, AppResult, Entity},
    models::{
        student::{NewStudent, Student},
        user::{NewUser, Role, StoredUser, User, UserUpdate},
        violation::{initial_violation_types, normalize_notes, NewViolation, Violation, ViolationType},
    },
    services::auth_service,
    store::{keys, KvStore},
};
use chrono::Utc;
use std::time::Duration;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct DataService {
    store: KvStore,
    latency: Duration,
    bcrypt_cost: u32,
}

impl DataService {
    pub fn new(store: KvStore, latency: Duration, bcrypt_cost: u32) -> Self {
        Self {
            store,
            latency,
            bcrypt_cost,
        }
    }

    pub fn store(&self) -> &KvStore {
        &self.store
    }

    /// Seeds the default accounts and violation types when their collections
    /// are empty. Safe to call on every start.
    pub async fn initialize(&self) -> AppResult<()> {
        let users = self.users().await;
        if users.is_empty() {
            tracing::info!("Seeding default users (admin, guru)...");
            let seed = [
                ("admin1", "admin", "adminpassword", Role::Admin),
                ("guru1", "guru", "gurupassword", Role::SupervisingTeacher),
            ];
            let mut users = Vec::with_capacity(seed.len());
            for (id, username, password, role) in seed {
                users.push(StoredUser {
                    id: id.to_string(),
                    username: username.to_string(),
                    password_hash: auth_service::hash_password(password, self.bcrypt_cost).await?,
                    role,
                });
            }
            self.store.save(keys::USERS, &users).await?;
        }

        if self.violation_types().await.is_empty() {
            tracing::info!("Seeding initial violation types...");
            self.store
                .save(keys::VIOLATION_TYPES, &initial_violation_types())
                .await?;
        }

        Ok(())
    }

    async fn complete<T>(&self, value: T) -> AppResult<T> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        Ok(value)
    }

    async fn users(&self) -> Vec<StoredUser> {
        self.store.load(keys::USERS, Vec::new()).await
    }

    async fn students(&self) -> Vec<Student> {
        self.store.load(keys::STUDENTS, Vec::new()).await
    }

    async fn violation_types(&self) -> Vec<ViolationType> {
        self.store.load(keys::VIOLATION_TYPES, Vec::new()).await
    }

    async fn violations(&self) -> Vec<Violation> {
        self.store.load(keys::VIOLATIONS, Vec::new()).await
    }

    // --- Auth & Users ---

    pub async fn login(&self, username: &str, password: &str) -> AppResult<User> {
        tracing::debug!("Login attempt for '{}'", username);
        let users = self.users().await;
        let Some(user) = users.iter().find(|u| u.username == username) else {
            tracing::warn!("Login failed: unknown username '{}'", username);
            return Err(AppError::InvalidCredentials);
        };

        if !auth_service::verify_password(password, &user.password_hash).await? {
            tracing::warn!("Login failed: wrong password for '{}'", username);
            return Err(AppError::InvalidCredentials);
        }

        self.store.save(keys::CURRENT_USER_TOKEN, &user.id).await?;
        tracing::info!("✅ '{}' logged in", username);
        self.complete(user.to_public()).await
    }

    pub async fn logout(&self) -> AppResult<bool> {
        self.store.remove(keys::CURRENT_USER_TOKEN).await?;
        self.complete(true).await
    }

    /// The user whose id is stored as the current token, if any.
    ///
    /// The token is a single process-wide value: the latest `login` or
    /// `logout` from any session overwrites it. Request authentication does
    /// not read it; the web layer keeps the user id in the HTTP session.
    pub async fn get_authenticated_user(&self) -> AppResult<Option<User>> {
        let token: Option<String> = self.store.load(keys::CURRENT_USER_TOKEN, None).await;
        let user = match token {
            Some(id) => self.users().await.iter().find(|u| u.id == id).map(StoredUser::to_public),
            None => None,
        };
        self.complete(user).await
    }

    pub async fn get_user_by_id(&self, id: &str) -> AppResult<Option<User>> {
        let user = self.users().await.iter().find(|u| u.id == id).map(StoredUser::to_public);
        self.complete(user).await
    }

    pub async fn get_all_users(&self) -> AppResult<Vec<User>> {
        let users = self.users().await.iter().map(StoredUser::to_public).collect();
        self.complete(users).await
    }

    pub async fn add_user(&self, new_user: NewUser) -> AppResult<User> {
        let mut users = self.users().await;
        if users.iter().any(|u| u.username == new_user.username) {
            tracing::warn!("Create user failed: username '{}' already exists", new_user.username);
            return Err(AppError::DuplicateUsername);
        }

        let stored = StoredUser {
            id: timestamp_id("user", |id| users.iter().any(|u| u.id == id)),
            username: new_user.username,
            password_hash: auth_service::hash_password(&new_user.password, self.bcrypt_cost).await?,
            role: new_user.role,
        };
        let user = stored.to_public();
        users.push(stored);
        self.store.save(keys::USERS, &users).await?;

        tracing::info!("✅ User '{}' created ({})", user.username, user.id);
        self.complete(user).await
    }

    pub async fn update_user(&self, update: UserUpdate) -> AppResult<User> {
        let mut users = self.users().await;
        let Some(index) = users.iter().position(|u| u.id == update.id) else {
            tracing::warn!("Update user failed: '{}' not found", update.id);
            return Err(AppError::NotFound(Entity::User));
        };
        if users
            .iter()
            .any(|u| u.id != update.id && u.username == update.username)
        {
            return Err(AppError::DuplicateUsername);
        }

        let password_hash = match update.new_password() {
            Some(raw) => auth_service::hash_password(raw, self.bcrypt_cost).await?,
            None => users[index].password_hash.clone(),
        };
        users[index] = StoredUser {
            id: update.id,
            username: update.username,
            password_hash,
            role: update.role,
        };
        let user = users[index].to_public();
        self.store.save(keys::USERS, &users).await?;

        tracing::info!("✅ User '{}' updated", user.id);
        self.complete(user).await
    }

    pub async fn delete_user(&self, id: &str) -> AppResult<bool> {
        let mut users = self.users().await;
        let before = users.len();
        users.retain(|u| u.id != id);
        let removed = users.len() < before;
        if removed {
            self.store.save(keys::USERS, &users).await?;
        }
        tracing::debug!("Delete user '{}': removed={}", id, removed);
        self.complete(removed).await
    }

    // --- Students ---

    pub async fn get_all_students(&self) -> AppResult<Vec<Student>> {
        let students = self.students().await;
        self.complete(students).await
    }

    pub async fn get_student_by_id(&self, id: &str) -> AppResult<Option<Student>> {
        let student = self.students().await.into_iter().find(|s| s.id == id);
        self.complete(student).await
    }

    pub async fn add_student(&self, new_student: NewStudent) -> AppResult<Student> {
        let mut students = self.students().await;
        if students
            .iter()
            .any(|s| s.same_identity(&new_student.name, &new_student.class_name))
        {
            return Err(AppError::DuplicateStudent {
                name: new_student.name,
                class_name: new_student.class_name,
            });
        }

        let id = timestamp_id("student", |id| students.iter().any(|s| s.id == id));
        let student = new_student.into_student(id);
        students.push(student.clone());
        self.store.save(keys::STUDENTS, &students).await?;

        tracing::info!("✅ Student '{}' ({}) added", student.name, student.class_name);
        self.complete(student).await
    }

    pub async fn update_student(&self, updated: Student) -> AppResult<Student> {
        let mut students = self.students().await;
        let Some(index) = students.iter().position(|s| s.id == updated.id) else {
            return Err(AppError::NotFound(Entity::Student));
        };
        if students
            .iter()
            .any(|s| s.id != updated.id && s.same_identity(&updated.name, &updated.class_name))
        {
            return Err(AppError::DuplicateStudent {
                name: updated.name,
                class_name: updated.class_name,
            });
        }

        students[index] = updated.clone();
        self.store.save(keys::STUDENTS, &students).await?;
        self.complete(updated).await
    }

    pub async fn delete_student(&self, id: &str) -> AppResult<bool> {
        let mut students = self.students().await;
        let before = students.len();
        students.retain(|s| s.id != id);
        let removed = students.len() < before;
        if removed {
            self.store.save(keys::STUDENTS, &students).await?;
        }
        self.complete(removed).await
    }

    /// Inserts the records whose (name, class) is not present yet, including
    /// repeats inside `records` itself. Returns only the inserted ones.
    pub async fn add_students_bulk(&self, records: Vec<NewStudent>) -> AppResult<Vec<Student>> {
        let mut students = self.students().await;
        let total = records.len();
        let mut added = Vec::new();

        for record in records {
            if students
                .iter()
                .any(|s| s.same_identity(&record.name, &record.class_name))
            {
                continue;
            }
            let id = bulk_id(|id| students.iter().any(|s| s.id == id));
            let student = record.into_student(id);
            students.push(student.clone());
            added.push(student);
        }

        self.store.save(keys::STUDENTS, &students).await?;
        tracing::info!(
            "Bulk import: {} of {} rows inserted, {} skipped as duplicates",
            added.len(),
            total,
            total - added.len()
        );
        self.complete(added).await
    }

    // --- Violation Types ---

    pub async fn get_all_violation_types(&self) -> AppResult<Vec<ViolationType>> {
        let types = self.violation_types().await;
        self.complete(types).await
    }

    pub async fn add_violation_type(&self, name: &str) -> AppResult<ViolationType> {
        let mut types = self.violation_types().await;
        if types.iter().any(|t| t.name.to_lowercase() == name.to_lowercase()) {
            return Err(AppError::DuplicateViolationType);
        }

        let new_type = ViolationType {
            id: timestamp_id("vtype", |id| types.iter().any(|t| t.id == id)),
            name: name.to_string(),
        };
        types.push(new_type.clone());
        self.store.save(keys::VIOLATION_TYPES, &types).await?;
        self.complete(new_type).await
    }

    pub async fn update_violation_type(&self, updated: ViolationType) -> AppResult<ViolationType> {
        let mut types = self.violation_types().await;
        let Some(index) = types.iter().position(|t| t.id == updated.id) else {
            return Err(AppError::NotFound(Entity::ViolationType));
        };
        if types
            .iter()
            .any(|t| t.id != updated.id && t.name.to_lowercase() == updated.name.to_lowercase())
        {
            return Err(AppError::DuplicateViolationType);
        }

        types[index] = updated.clone();
        self.store.save(keys::VIOLATION_TYPES, &types).await?;
        self.complete(updated).await
    }

    /// Violations that still reference the type are left untouched.
    pub async fn delete_violation_type(&self, id: &str) -> AppResult<bool> {
        let mut types = self.violation_types().await;
        let before = types.len();
        types.retain(|t| t.id != id);
        let removed = types.len() < before;
        if removed {
            self.store.save(keys::VIOLATION_TYPES, &types).await?;
        }
        self.complete(removed).await
    }

    // --- Violations ---

    pub async fn get_all_violations(&self) -> AppResult<Vec<Violation>> {
        let violations = self.violations().await;
        self.complete(violations).await
    }

    pub async fn add_violation(&self, new_violation: NewViolation) -> AppResult<Violation> {
        validate_violation(&new_violation.student_id, &new_violation.violation_type_ids)?;
        let mut violations = self.violations().await;

        let id = timestamp_id("violation", |id| violations.iter().any(|v| v.id == id));
        let violation = NewViolation {
            notes: normalize_notes(new_violation.notes),
            ..new_violation
        }
        .into_violation(id);
        violations.push(violation.clone());
        self.store.save(keys::VIOLATIONS, &violations).await?;

        tracing::info!(
            "✅ Violation {} recorded for student {} on {}",
            violation.id,
            violation.student_id,
            violation.date
        );
        self.complete(violation).await
    }

    pub async fn update_violation(&self, updated: Violation) -> AppResult<Violation> {
        validate_violation(&updated.student_id, &updated.violation_type_ids)?;
        let mut violations = self.violations().await;
        let Some(index) = violations.iter().position(|v| v.id == updated.id) else {
            return Err(AppError::NotFound(Entity::Violation));
        };

        let updated = Violation {
            notes: normalize_notes(updated.notes),
            ..updated
        };
        violations[index] = updated.clone();
        self.store.save(keys::VIOLATIONS, &violations).await?;
        self.complete(updated).await
    }

    pub async fn delete_violation(&self, id: &str) -> AppResult<bool> {
        let mut violations = self.violations().await;
        let before = violations.len();
        violations.retain(|v| v.id != id);
        let removed = violations.len() < before;
        if removed {
            self.store.save(keys::VIOLATIONS, &violations).await?;
        }
        self.complete(removed).await
    }
}

fn validate_violation(student_id: &str, violation_type_ids: &[String]) -> AppResult<()> {
    if student_id.trim().is_empty() || violation_type_ids.is_empty() {
        return Err(AppError::Validation(
            "Pilih siswa dan setidaknya satu jenis pelanggaran.".to_string(),
        ));
    }
    Ok(())
}

/// `<prefix>-<unix millis>`, bumped forward while the id is already taken so
/// that inserts within the same millisecond stay distinct.
fn timestamp_id(prefix: &str, is_taken: impl Fn(&str) -> bool) -> String {
    let mut millis = Utc::now().timestamp_millis();
    loop {
        let id = format!("{}-{}", prefix, millis);
        if !is_taken(&id) {
            return id;
        }
        millis += 1;
    }
}

/// `student-<unix millis>-<7 random chars>` for rows inserted in one batch.
fn bulk_id(is_taken: impl Fn(&str) -> bool) -> String {
    let millis = Utc::now().timestamp_millis();
    loop {
        let suffix: String = Uuid::new_v4().simple().to_string().chars().take(7).collect();
        let id = format!("student-{}-{}", millis, suffix);
        if !is_taken(&id) {
            return id;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_id_skips_taken_ids() {
        let first = timestamp_id("student", |_| false);
        let second = timestamp_id("student", |id| id == first);
        assert!(first.starts_with("student-"));
        assert_ne!(first, second);
    }

    #[test]
    fn bulk_id_has_random_suffix() {
        let id = bulk_id(|_| false);
        let parts: Vec<&str> = id.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "student");
        assert_eq!(parts[2].len(), 7);
    }

    #[test]
    fn violation_needs_student_and_types() {
        assert!(validate_violation("student-1", &["v1".to_string()]).is_ok());
        assert!(matches!(validate_violation("", &["v1".to_string()]), Err(AppError::Validation(_))));
        assert!(matches!(validate_violation("student-1", &[]), Err(AppError::Validation(_))));
    }
}
