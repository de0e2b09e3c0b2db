// src/config.rs
use crate::error::{AppError, AppResult};
use std::{env, net::SocketAddr, time::Duration};

/// Latency applied to every data operation when API_LATENCY_MS is not set.
pub const DEFAULT_API_LATENCY_MS: u64 = 500;

/// Runtime configuration, read from the environment (and `.env` via dotenvy).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub session_secret: String,
    pub bind_addr: SocketAddr,
    /// Artificial delay before each data operation completes.
    pub api_latency: Duration,
    pub bcrypt_cost: u32,
}

impl Config {
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL")?;
        let session_secret = env::var("SESSION_SECRET")?;

        let bind_addr = match env::var("BIND_ADDR") {
            Ok(raw) => raw.parse().map_err(|e| {
                tracing::error!("Invalid BIND_ADDR '{}': {}", raw, e);
                AppError::Config(format!("BIND_ADDR tidak valid: {}", raw))
            })?,
            Err(_) => SocketAddr::from(([0, 0, 0, 0], 3000)),
        };

        let api_latency_ms = env::var("API_LATENCY_MS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_API_LATENCY_MS);

        let bcrypt_cost = env::var("BCRYPT_COST")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(bcrypt::DEFAULT_COST);

        Ok(Self {
            database_url,
            session_secret,
            bind_addr,
            api_latency: Duration::from_millis(api_latency_ms),
            bcrypt_cost,
        })
    }
}
