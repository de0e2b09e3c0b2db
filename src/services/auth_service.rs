// src/services/auth_service.rs
use crate::{
    error::{AppError, AppResult},
    models::user::{NewUser, User, UserUpdate},
    services::data_service::DataService,
};

/// Checks a password against a stored bcrypt hash.
pub async fn verify_password(password: &str, stored_hash: &str) -> AppResult<bool> {
    let password = password.to_string();
    let stored_hash = stored_hash.to_string();
    tokio::task::spawn_blocking(move || {
        tracing::debug!("Verifying bcrypt hash...");
        bcrypt::verify(&password, &stored_hash)
    })
    .await
    .map_err(|e| {
        tracing::error!("spawn_blocking failed (verify_password): {:?}", e);
        AppError::InternalServerError
    })?
    .map_err(|e| {
        tracing::error!("bcrypt error while verifying password: {:?}", e);
        AppError::PasswordHashingError
    })
}

/// Hashes a password with bcrypt at the given cost.
pub async fn hash_password(password: &str, cost: u32) -> AppResult<String> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || {
        tracing::debug!("Generating bcrypt hash...");
        bcrypt::hash(&password, cost)
    })
    .await
    .map_err(|e| {
        tracing::error!("spawn_blocking failed (hash_password): {:?}", e);
        AppError::InternalServerError
    })?
    .map_err(|e| {
        tracing::error!("bcrypt error while hashing password: {:?}", e);
        AppError::PasswordHashingError
    })
}

/// Login, session token and account management on top of the data service.
#[derive(Debug, Clone)]
pub struct AuthService {
    data: DataService,
}

impl AuthService {
    pub fn new(data: DataService) -> Self {
        Self { data }
    }

    /// Returns the user without its secret and records its id as the current
    /// session token.
    pub async fn login(&self, username: &str, password: &str) -> AppResult<User> {
        self.data.login(username.trim(), password).await
    }

    pub async fn logout(&self) -> AppResult<()> {
        self.data.logout().await?;
        Ok(())
    }

    pub async fn current_user(&self) -> AppResult<Option<User>> {
        self.data.get_authenticated_user().await
    }

    pub async fn find_user(&self, id: &str) -> AppResult<Option<User>> {
        self.data.get_user_by_id(id).await
    }

    pub async fn get_all_users(&self) -> AppResult<Vec<User>> {
        self.data.get_all_users().await
    }

    pub async fn add_user(&self, new_user: NewUser) -> AppResult<User> {
        let username = new_user.username.trim().to_string();
        if username.is_empty() {
            return Err(AppError::Validation("Username tidak boleh kosong.".to_string()));
        }
        if new_user.password.is_empty() {
            return Err(AppError::Validation("Password harus diisi untuk user baru.".to_string()));
        }
        self.data.add_user(NewUser { username, ..new_user }).await
    }

    /// A blank password keeps the current one.
    pub async fn update_user(&self, update: UserUpdate) -> AppResult<User> {
        let username = update.username.trim().to_string();
        if username.is_empty() {
            return Err(AppError::Validation("Username tidak boleh kosong.".to_string()));
        }
        self.data.update_user(UserUpdate { username, ..update }).await
    }

    /// Rejects deleting the acting user's own account before the store is
    /// touched.
    pub async fn delete_user(&self, acting_user_id: &str, target_id: &str) -> AppResult<bool> {
        if acting_user_id == target_id {
            tracing::warn!("User '{}' tried to delete their own account", acting_user_id);
            return Err(AppError::CannotDeleteSelf);
        }
        self.data.delete_user(target_id).await
    }
}
