//! Runtime environment helpers
//!
//! Thin wrapper around `common::env` to keep binary crates importing
//! `service::runtime::ensure_env` without depending directly on `common`.

/// Ensure the article directory exists; errors are fatal for startup.
pub async fn ensure_env(articles_dir: &str) -> anyhow::Result<()> {
    common::env::ensure_storage_dir(articles_dir).await
}
