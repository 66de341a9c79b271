//! Cadastro server: reads config, prepares storage, and serves the customer API.

use cadastro::{
    app, ensure_database_exists, ensure_tables, AppConfig, AppState, CustomerStore, MemoryStore, PgStore,
    StorageBackend,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("cadastro=info,tower_http=info")),
        )
        .init();

    let config = AppConfig::from_env()?;

    let store: Arc<dyn CustomerStore> = match config.storage {
        StorageBackend::Postgres => {
            ensure_database_exists(&config.database_url).await?;
            let pool = sqlx::postgres::PgPoolOptions::new()
                .max_connections(config.database_max_connections)
                .connect(&config.database_url)
                .await?;
            ensure_tables(&pool, &config.database_schema).await?;
            Arc::new(PgStore::new(pool, &config.database_schema))
        }
        StorageBackend::Memory => {
            tracing::warn!("using in-memory storage; data is lost on restart");
            Arc::new(MemoryStore::new())
        }
    };

    let state = AppState::new(store, config.default_owner_id);
    let router = app(state, &config);

    let listener = TcpListener::bind(config.bind_addr()).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
