// src/models/mod.rs
pub mod report;
pub mod student;
pub mod user;
pub mod violation;
