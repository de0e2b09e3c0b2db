// src/web/routes.rs
use crate::{
    state::AppState,
    web::{
        admin_handlers, auth_handlers, dashboard_handlers, mw_admin, mw_auth, report_handlers,
        student_handlers, violation_handlers, violation_type_handlers,
    },
};
use axum::{
    middleware,
    response::Redirect,
    routing::{get, post},
    Router,
};

pub fn create_router(app_state: AppState) -> Router {
    // --- Public routes ---
    let public_routes = Router::new()
        .route(
            "/login",
            get(auth_handlers::show_login_form).post(auth_handlers::handle_login),
        )
        .route("/logout", get(auth_handlers::handle_logout))
        .route("/", get(|| async { Redirect::to("/dashboard") }));

    // --- Admin only ---
    let admin_routes = Router::new()
        .route(
            "/violation-types",
            get(violation_type_handlers::violation_types_page),
        )
        .route(
            "/violation-types/create",
            post(violation_type_handlers::handle_create_violation_type),
        )
        .route(
            "/violation-types/edit/{id}",
            post(violation_type_handlers::handle_edit_violation_type),
        )
        .route(
            "/violation-types/delete/{id}",
            post(violation_type_handlers::handle_delete_violation_type),
        )
        .route("/admin/users", get(admin_handlers::show_admin_users_page))
        .route("/admin/users/create", post(admin_handlers::handle_create_user))
        .route(
            "/admin/users/edit/{id}",
            get(admin_handlers::show_edit_user_form).post(admin_handlers::handle_edit_user),
        )
        .route(
            "/admin/users/delete/{id}",
            post(admin_handlers::handle_delete_user),
        )
        // mw_auth is applied by the parent router
        .route_layer(middleware::from_fn(mw_admin::require_admin));

    // --- Any logged-in role ---
    let authenticated_routes = Router::new()
        .route("/dashboard", get(dashboard_handlers::dashboard_page))
        .route("/students", get(student_handlers::students_page))
        .route("/students/create", post(student_handlers::handle_create_student))
        .route(
            "/students/edit/{id}",
            get(student_handlers::show_edit_student_form).post(student_handlers::handle_edit_student),
        )
        .route(
            "/students/delete/{id}",
            post(student_handlers::handle_delete_student),
        )
        .route(
            "/students/import",
            post(student_handlers::handle_import_students),
        )
        .route("/violations", get(violation_handlers::violations_page))
        .route(
            "/violations/create",
            post(violation_handlers::handle_create_violation),
        )
        .route(
            "/violations/edit/{id}",
            get(violation_handlers::show_edit_violation_form)
                .post(violation_handlers::handle_edit_violation),
        )
        .route(
            "/violations/delete/{id}",
            post(violation_handlers::handle_delete_violation),
        )
        .route("/reports", get(report_handlers::reports_page))
        .route(
            "/reports/signatures",
            post(report_handlers::handle_save_signatures),
        )
        .route("/reports/pdf", post(report_handlers::handle_download_pdf))
        .merge(admin_routes)
        // require_auth wraps every route above, admin ones included
        .route_layer(middleware::from_fn_with_state(
            app_state.clone(),
            mw_auth::require_auth,
        ));

    Router::new()
        .merge(public_routes)
        .merge(authenticated_routes)
        .with_state(app_state)
}
