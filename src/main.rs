// src/main.rs
use axum::serve;
use catatan_pelanggaran::{config::Config, db, state::AppState};
use tokio::net::TcpListener;
use tower_sessions::ExpiredDeletion;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // --- Logging ---
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "catatan_pelanggaran=debug,tower_http=info,sqlx=warn,tower_sessions=info".into()
        }))
        .with(fmt::layer())
        .init();

    tracing::info!("🚀 Starting student violation log server...");

    let config = Config::from_env()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    // --- Database ---
    let db_pool = match db::create_db_pool(&config.database_url).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("❌ Could not initialize the database: {}", e);
            return Err(anyhow::anyhow!("Failed to connect/migrate DB: {}", e));
        }
    };

    let app_state = AppState::new(db_pool.clone(), config.api_latency, config.bcrypt_cost);
    app_state
        .data
        .initialize()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to seed initial data: {}", e))?;
    tracing::info!("✅ Data store ready (latency {:?}).", config.api_latency);

    // --- Sessions ---
    let session_store = catatan_pelanggaran::session_store(&db_pool)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create session store: {}", e))?;

    let cleanup_store = session_store.clone();
    tokio::spawn(async move {
        if let Err(e) = cleanup_store
            .continuously_delete_expired(tokio::time::Duration::from_secs(60 * 60))
            .await
        {
            tracing::error!("Session cleanup task failed: {:?}", e);
        }
    });
    tracing::info!("🧹 Session cleanup task started.");

    let key = catatan_pelanggaran::session_key(&config.session_secret)
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    // --- Server ---
    let app = catatan_pelanggaran::app(app_state, session_store, key);

    let listener = match TcpListener::bind(config.bind_addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!("❌ Could not listen on {}: {}", config.bind_addr, e);
            return Err(e.into());
        }
    };
    tracing::info!("📡 Listening on http://{}", config.bind_addr);

    if let Err(e) = serve(listener, app.into_make_service()).await {
        tracing::error!("❌ Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
