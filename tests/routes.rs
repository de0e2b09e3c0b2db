// tests/routes.rs
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use catatan_pelanggaran::{
    db,
    models::{student::Gender, student::NewStudent, violation::NewViolation},
    state::AppState,
};
use chrono::NaiveDate;
use std::time::Duration;
use tower::ServiceExt;

async fn test_app() -> (Router, AppState) {
    let pool = db::create_memory_pool().await.expect("memory pool");
    let state = AppState::new(pool.clone(), Duration::ZERO, 4 /* bcrypt minimum cost */);
    state.data.initialize().await.expect("seed data");

    let store = catatan_pelanggaran::session_store(&pool)
        .await
        .expect("session store");
    let key = catatan_pelanggaran::session_key(&"k".repeat(64)).expect("session key");
    (catatan_pelanggaran::app(state.clone(), store, key), state)
}

fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

fn post_form(uri: &str, cookie: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn location(response: &Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Logs in and returns the `name=value` session cookie.
async fn login(app: &Router, username: &str, password: &str) -> String {
    let response = app
        .clone()
        .oneshot(post_form(
            "/login",
            None,
            &format!("username={}&password={}", username, password),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/dashboard");

    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .expect("session cookie");
    set_cookie.split(';').next().unwrap().to_string()
}

#[tokio::test]
async fn anonymous_requests_are_sent_to_login() {
    let (app, _) = test_app().await;
    for uri in ["/dashboard", "/students", "/reports", "/admin/users"] {
        let response = app.clone().oneshot(get(uri, None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{}", uri);
        assert_eq!(location(&response), "/login", "{}", uri);
    }

    let response = app.clone().oneshot(get("/login", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn wrong_password_shows_the_login_error() {
    let (app, _) = test_app().await;
    let response = app
        .clone()
        .oneshot(post_form("/login", None, "username=admin&password=salah"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Username atau password salah."));
}

#[tokio::test]
async fn supervising_teacher_is_kept_out_of_admin_pages() {
    let (app, _) = test_app().await;
    let cookie = login(&app, "guru", "gurupassword").await;

    for uri in ["/dashboard", "/students", "/violations", "/reports"] {
        let response = app.clone().oneshot(get(uri, Some(&cookie))).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK, "{}", uri);
    }
    for uri in ["/admin/users", "/violation-types"] {
        let response = app.clone().oneshot(get(uri, Some(&cookie))).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN, "{}", uri);
    }
}

#[tokio::test]
async fn admin_sees_user_management_but_cannot_delete_self() {
    let (app, state) = test_app().await;
    let cookie = login(&app, "admin", "adminpassword").await;

    let response = app
        .clone()
        .oneshot(get("/admin/users", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let page = body_text(response).await;
    assert!(page.contains("guru"));
    assert!(page.contains("Guru Piket"));

    let response = app
        .clone()
        .oneshot(post_form("/admin/users/delete/admin1", Some(&cookie), ""))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(location(&response).starts_with("/admin/users?error="));
    assert!(state.auth.find_user("admin1").await.unwrap().is_some());
}

#[tokio::test]
async fn duplicate_student_form_redirects_with_error() {
    let (app, state) = test_app().await;
    let cookie = login(&app, "guru", "gurupassword").await;

    let form = "name=Andi&class_name=VII-A&gender=Laki-laki";
    let first = app
        .clone()
        .oneshot(post_form("/students/create", Some(&cookie), form))
        .await
        .unwrap();
    assert!(location(&first).starts_with("/students?success="));

    let second = app
        .clone()
        .oneshot(post_form("/students/create", Some(&cookie), "name=andi&class_name=vii-a"))
        .await
        .unwrap();
    assert!(location(&second).starts_with("/students?error="));
    assert_eq!(state.students.get_all_students().await.unwrap().len(), 1);
}

#[tokio::test]
async fn report_pdf_is_downloaded_as_attachment() {
    let (app, state) = test_app().await;
    let cookie = login(&app, "admin", "adminpassword").await;

    // nothing recorded yet
    let empty = app
        .clone()
        .oneshot(post_form("/reports/pdf", Some(&cookie), "title=&student_id=&start=&end="))
        .await
        .unwrap();
    assert_eq!(empty.status(), StatusCode::SEE_OTHER);
    assert!(location(&empty).starts_with("/reports?error="));

    let student = state
        .students
        .add_student(NewStudent {
            name: "Siti".into(),
            class_name: "VIII-B".into(),
            gender: Gender::Female,
        })
        .await
        .unwrap();
    state
        .violations
        .add_violation(NewViolation {
            student_id: student.id,
            date: NaiveDate::from_ymd_opt(2025, 2, 3).unwrap(),
            violation_type_ids: vec!["v1".into(), "v2".into()],
            notes: Some("Terlambat 10 menit".into()),
        })
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(post_form(
            "/reports/pdf",
            Some(&cookie),
            "title=Rekap&student_id=&start=2025-02-01&end=2025-02-28&guru_piket=Bu+Rina&kepala_sekolah=",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/pdf"
    );
    assert!(response
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .and_then(|v| v.to_str().ok())
        .unwrap()
        .contains("laporan-pelanggaran-siswa.pdf"));
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(bytes.starts_with(b"%PDF"));

    let saved = state.reports.load_signatures().await;
    assert_eq!(saved.supervising_teacher, "Bu Rina");
}

#[test]
fn short_session_secrets_are_rejected() {
    assert!(catatan_pelanggaran::session_key("terlalu-pendek").is_err());
    assert!(catatan_pelanggaran::session_key(&"k".repeat(64)).is_ok());
}
