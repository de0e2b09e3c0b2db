// tests/data_service.rs
use catatan_pelanggaran::{
    db,
    error::{AppError, Entity},
    models::{
        student::{Gender, NewStudent, Student},
        user::{NewUser, Role, UserUpdate},
        violation::{NewViolation, Violation, ViolationType},
    },
    services::{auth_service::AuthService, data_service::DataService},
    store::KvStore,
};
use chrono::NaiveDate;
use std::time::Duration;

async fn setup() -> DataService {
    let pool = db::create_memory_pool().await.expect("memory pool");
    let data = DataService::new(KvStore::new(pool), Duration::ZERO, 4 /* bcrypt minimum cost */);
    data.initialize().await.expect("seed data");
    data
}

fn new_student(name: &str, class_name: &str) -> NewStudent {
    NewStudent {
        name: name.to_string(),
        class_name: class_name.to_string(),
        gender: Gender::Male,
    }
}

#[tokio::test]
async fn initialize_seeds_accounts_and_types_once() {
    let data = setup().await;
    data.initialize().await.unwrap();

    let users = data.get_all_users().await.unwrap();
    assert_eq!(users.len(), 2);
    assert!(users.iter().any(|u| u.username == "admin" && u.role == Role::Admin));
    assert!(users
        .iter()
        .any(|u| u.username == "guru" && u.role == Role::SupervisingTeacher));
    assert_eq!(data.get_all_violation_types().await.unwrap().len(), 6);
}

#[tokio::test]
async fn login_returns_public_user_and_tracks_token() {
    let data = setup().await;

    let user = data.login("admin", "adminpassword").await.unwrap();
    assert_eq!(user.id, "admin1");
    let json = serde_json::to_value(&user).unwrap();
    assert!(json.get("password").is_none());
    assert!(json.get("passwordHash").is_none());

    assert_eq!(data.get_authenticated_user().await.unwrap(), Some(user));
    assert!(data.logout().await.unwrap());
    assert_eq!(data.get_authenticated_user().await.unwrap(), None);
}

#[tokio::test]
async fn wrong_credentials_are_rejected() {
    let data = setup().await;
    assert!(matches!(
        data.login("admin", "wrong").await,
        Err(AppError::InvalidCredentials)
    ));
    assert!(matches!(
        data.login("nobody", "adminpassword").await,
        Err(AppError::InvalidCredentials)
    ));
}

#[tokio::test]
async fn duplicate_student_is_rejected_regardless_of_case() {
    let data = setup().await;
    data.add_student(new_student("Andi", "VII-A")).await.unwrap();

    let err = data
        .add_student(new_student("ANDI", "vii-a"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::DuplicateStudent { .. }));

    // same name in another class is a different student
    data.add_student(new_student("Andi", "VII-B")).await.unwrap();
    assert_eq!(data.get_all_students().await.unwrap().len(), 2);
}

#[tokio::test]
async fn deleting_missing_records_returns_false() {
    let data = setup().await;
    assert!(!data.delete_student("student-0").await.unwrap());
    assert!(!data.delete_violation("violation-0").await.unwrap());
    assert!(!data.delete_violation_type("vtype-0").await.unwrap());
    assert!(!data.delete_user("user-0").await.unwrap());
}

#[tokio::test]
async fn bulk_import_inserts_only_new_students() {
    let data = setup().await;
    data.add_student(new_student("Andi", "VII-A")).await.unwrap();
    data.add_student(new_student("Budi", "VII-A")).await.unwrap();

    let rows = vec![
        new_student("andi", "VII-A"),
        new_student("Citra", "VII-B"),
        new_student("Budi", "VII-A"),
        new_student("Dewi", "VIII-A"),
        new_student("Citra", "VII-B"),
    ];
    let added = data.add_students_bulk(rows).await.unwrap();

    let names: Vec<&str> = added.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["Citra", "Dewi"]);
    assert!(added.iter().all(|s| s.id.starts_with("student-")));
    assert_eq!(data.get_all_students().await.unwrap().len(), 4);
}

#[tokio::test]
async fn violation_type_names_are_unique_ignoring_case() {
    let data = setup().await;
    let created = data.add_violation_type("Membawa HP").await.unwrap();
    assert!(matches!(
        data.add_violation_type("membawa hp").await,
        Err(AppError::DuplicateViolationType)
    ));

    let mut renamed = created.clone();
    renamed.name = "Membawa HP ke kelas".to_string();
    assert_eq!(data.update_violation_type(renamed).await.unwrap().id, created.id);
}

#[tokio::test]
async fn renaming_a_type_onto_another_name_is_rejected() {
    let data = setup().await;
    data.add_violation_type("Membawa HP").await.unwrap();
    let mut other = data.add_violation_type("Terlambat upacara").await.unwrap();

    other.name = "MEMBAWA hp".to_string();
    assert!(matches!(
        data.update_violation_type(other).await,
        Err(AppError::DuplicateViolationType)
    ));

    let missing = ViolationType {
        id: "v-missing".into(),
        name: "Tidak ada".into(),
    };
    assert!(matches!(
        data.update_violation_type(missing).await,
        Err(AppError::NotFound(Entity::ViolationType))
    ));
}

#[tokio::test]
async fn updating_a_student_checks_identity_against_others() {
    let data = setup().await;
    data.add_student(new_student("Andi", "VII-A")).await.unwrap();
    let budi = data.add_student(new_student("Budi", "VII-A")).await.unwrap();

    let clash = Student {
        name: "andi".into(),
        class_name: "vii-a".into(),
        ..budi.clone()
    };
    assert!(matches!(
        data.update_student(clash).await,
        Err(AppError::DuplicateStudent { .. })
    ));

    // keeping its own identity is not a clash
    let same = Student {
        gender: Gender::Female,
        ..budi.clone()
    };
    let saved = data.update_student(same).await.unwrap();
    assert_eq!(saved.gender, Gender::Female);
    let stored = data.get_all_students().await.unwrap();
    assert!(stored.iter().any(|s| s.id == budi.id && s.name == "Budi" && s.gender == Gender::Female));

    let missing = Student {
        id: "student-missing".into(),
        ..budi
    };
    assert!(matches!(
        data.update_student(missing).await,
        Err(AppError::NotFound(Entity::Student))
    ));
}

#[tokio::test]
async fn updating_missing_records_is_not_found() {
    let data = setup().await;

    let update = UserUpdate {
        id: "user-0".into(),
        username: "ghost".into(),
        role: Role::Admin,
        password: None,
    };
    assert!(matches!(
        data.update_user(update).await,
        Err(AppError::NotFound(_))
    ));

    let violation = Violation {
        id: "violation-0".into(),
        student_id: "student-1".into(),
        date: NaiveDate::from_ymd_opt(2025, 1, 6).unwrap(),
        violation_type_ids: vec!["v1".into()],
        notes: None,
    };
    assert!(matches!(
        data.update_violation(violation).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn blank_password_on_update_keeps_the_old_one() {
    let data = setup().await;
    let user = data
        .add_user(NewUser {
            username: "piket2".into(),
            password: "rahasia".into(),
            role: Role::SupervisingTeacher,
        })
        .await
        .unwrap();

    data.update_user(UserUpdate {
        id: user.id.clone(),
        username: "piket2".into(),
        role: Role::Admin,
        password: Some("   ".into()),
    })
    .await
    .unwrap();

    let logged_in = data.login("piket2", "rahasia").await.unwrap();
    assert_eq!(logged_in.role, Role::Admin);

    data.update_user(UserUpdate {
        id: user.id,
        username: "piket2".into(),
        role: Role::Admin,
        password: Some("baru".into()),
    })
    .await
    .unwrap();
    assert!(data.login("piket2", "rahasia").await.is_err());
    assert!(data.login("piket2", "baru").await.is_ok());
}

#[tokio::test]
async fn duplicate_username_is_rejected() {
    let data = setup().await;
    let err = data
        .add_user(NewUser {
            username: "admin".into(),
            password: "x".into(),
            role: Role::Admin,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::DuplicateUsername));
}

#[tokio::test]
async fn users_cannot_delete_themselves() {
    let data = setup().await;
    let auth = AuthService::new(data.clone());
    let admin = auth.login(" admin ", "adminpassword").await.unwrap();
    assert_eq!(auth.current_user().await.unwrap(), Some(admin));

    assert!(matches!(
        auth.delete_user("admin1", "admin1").await,
        Err(AppError::CannotDeleteSelf)
    ));
    assert!(auth.find_user("admin1").await.unwrap().is_some());

    assert!(auth.delete_user("admin1", "guru1").await.unwrap());
    assert!(auth.find_user("guru1").await.unwrap().is_none());
}

#[tokio::test]
async fn new_users_need_a_password() {
    let data = setup().await;
    let auth = AuthService::new(data);
    let err = auth
        .add_user(NewUser {
            username: "tanpa-sandi".into(),
            password: String::new(),
            role: Role::SupervisingTeacher,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn violations_store_normalized_notes() {
    let data = setup().await;
    let student = data.add_student(new_student("Andi", "VII-A")).await.unwrap();

    let recorded = data
        .add_violation(NewViolation {
            student_id: student.id.clone(),
            date: NaiveDate::from_ymd_opt(2025, 1, 6).unwrap(),
            violation_type_ids: vec!["v1".into(), "v3".into()],
            notes: Some("   ".into()),
        })
        .await
        .unwrap();
    assert_eq!(recorded.notes, None);
    assert!(recorded.id.starts_with("violation-"));

    let err = data
        .add_violation(NewViolation {
            student_id: student.id,
            date: NaiveDate::from_ymd_opt(2025, 1, 6).unwrap(),
            violation_type_ids: vec![],
            notes: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
    assert_eq!(data.get_all_violations().await.unwrap().len(), 1);
}
