// src/services/mod.rs
pub mod auth_service;
pub mod data_service;
pub mod import_service;
pub mod pdf_service;
pub mod report_service;
pub mod student_service;
pub mod violation_service;
