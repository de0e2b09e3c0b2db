// src/state.rs
use crate::services::{
    auth_service::AuthService, data_service::DataService, report_service::ReportService,
    student_service::StudentService, violation_service::ViolationService,
};
use crate::store::KvStore;
use sqlx::SqlitePool;
use std::time::Duration;

#[derive(Clone)]
pub struct AppState {
    pub data: DataService,
    pub auth: AuthService,
    pub students: StudentService,
    pub violations: ViolationService,
    pub reports: ReportService,
}

impl AppState {
    /// Wires every service onto one data service whose store lives in `db_pool`.
    pub fn new(db_pool: SqlitePool, api_latency: Duration, bcrypt_cost: u32) -> Self {
        let data = DataService::new(KvStore::new(db_pool), api_latency, bcrypt_cost);
        Self {
            auth: AuthService::new(data.clone()),
            students: StudentService::new(data.clone()),
            violations: ViolationService::new(data.clone()),
            reports: ReportService::new(data.clone()),
            data,
        }
    }
}
