// src/error.rs
use axum::{http::StatusCode, response::Html, response::IntoResponse};
use std::fmt;
use thiserror::Error;

/// The record kinds the data service can fail to find.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    User,
    Student,
    ViolationType,
    Violation,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Entity::User => "Pengguna",
            Entity::Student => "Siswa",
            Entity::ViolationType => "Jenis pelanggaran",
            Entity::Violation => "Catatan pelanggaran",
        };
        f.write_str(label)
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Kesalahan basis data: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Kesalahan migrasi basis data: {0}")]
    SqlxMigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("Kesalahan serialisasi data: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("Variabel lingkungan tidak ditemukan: {0}")]
    EnvVarError(#[from] std::env::VarError),

    #[error("Konfigurasi tidak valid: {0}")]
    Config(String),

    #[error("Gagal memproses password")]
    PasswordHashingError,

    #[error("Username atau password salah.")]
    InvalidCredentials,

    #[error("Siswa dengan nama \"{name}\" di kelas \"{class_name}\" sudah ada.")]
    DuplicateStudent { name: String, class_name: String },

    #[error("Jenis pelanggaran sudah ada.")]
    DuplicateViolationType,

    #[error("Username sudah ada.")]
    DuplicateUsername,

    #[error("{0} tidak ditemukan.")]
    NotFound(Entity),

    #[error("Anda tidak dapat menghapus akun Anda sendiri.")]
    CannotDeleteSelf,

    #[error("{0}")]
    Validation(String),

    #[error("Gagal mengimpor file: {0}")]
    Import(String),

    #[error("Gagal membuat PDF: {0}")]
    Pdf(String),

    #[error("Kesalahan sesi: {0}")]
    SessionError(String),

    #[error("Terjadi kesalahan internal")]
    InternalServerError,

    #[error("Anda tidak memiliki izin untuk mengakses halaman ini.")]
    Unauthorized,
}

impl AppError {
    /// True for errors caused by user input, whose message can be shown as-is
    /// in the form that triggered them.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            AppError::InvalidCredentials
                | AppError::DuplicateStudent { .. }
                | AppError::DuplicateViolationType
                | AppError::DuplicateUsername
                | AppError::NotFound(_)
                | AppError::CannotDeleteSelf
                | AppError::Validation(_)
                | AppError::Import(_)
                | AppError::Unauthorized
        )
    }

    /// Message suitable for a form banner; internal details stay in the logs.
    pub fn user_message(&self) -> String {
        if self.is_user_facing() {
            self.to_string()
        } else {
            "Terjadi kesalahan pada server. Silakan coba lagi.".to_string()
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        tracing::error!("Request failed: {:?}", self);

        let status = match &self {
            AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::Unauthorized | AppError::CannotDeleteSelf => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::DuplicateStudent { .. }
            | AppError::DuplicateViolationType
            | AppError::DuplicateUsername => StatusCode::CONFLICT,
            AppError::Validation(_) | AppError::Import(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let user_message = self.user_message();

        (status, Html(format!(r#"
            <!DOCTYPE html><html><head><title>Kesalahan</title><style>body{{font-family:sans-serif;}}</style></head>
            <body><h1>Kesalahan {status_code}</h1><p>{message}</p><a href="javascript:history.back()">Kembali</a></body></html>
         "#, status_code = status.as_u16(), message = user_message))).into_response()
    }
}

pub type AppResult<T = ()> = Result<T, AppError>;
