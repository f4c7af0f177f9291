use std::{net::SocketAddr, sync::Arc};

use axum::Router;
use configs::AppConfig;
use tracing::{info, warn};

use crate::errors::StartupError;
use crate::routes::{self, auth};
use service::{auth::AccessGate, file::article_store::FileArticleStore, runtime};

fn bind_addr(cfg: &AppConfig) -> anyhow::Result<SocketAddr> {
    Ok(format!("{}:{}", cfg.server.host, cfg.server.port).parse()?)
}

/// Build the shared state: the article store over the configured directory and
/// the access gate over the configured operator credentials.
pub async fn build_state(cfg: &AppConfig) -> anyhow::Result<auth::ServerState> {
    let store = FileArticleStore::new(&cfg.storage.articles_dir, cfg.storage.malformed_policy)
        .await
        .map_err(|e| StartupError::Storage(e.to_string()))?;
    let gate = AccessGate::from_config(&cfg.admin).map_err(|e| StartupError::InvalidConfig(e.to_string()))?;

    if cfg.admin.password_hash.is_none() {
        warn!("admin.password is compared as plaintext; set admin.password_hash for an Argon2 hash");
    }
    if cfg.admin.session_secret == "supersecretkey" {
        warn!("using the default session secret; set SESSION_SECRET_KEY");
    }

    Ok(auth::ServerState { articles: store, gate: Arc::new(gate) })
}

/// Public entry: build the app from an already validated config and serve it.
/// Logging and `.env` loading belong to the binary.
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    // The storage area must exist before any store operation runs
    runtime::ensure_env(&cfg.storage.articles_dir)
        .await
        .map_err(|e| StartupError::Storage(e.to_string()))?;

    let state = build_state(&cfg).await?;
    let app: Router = routes::build_router(state);

    let addr = bind_addr(&cfg)?;
    info!(%addr, articles_dir = %cfg.storage.articles_dir, policy = ?cfg.storage.malformed_policy, "starting blog server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
