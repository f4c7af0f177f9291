//! Environment/runtime helpers
//!
//! Sanity checks to ensure expected directories exist at startup.

use tracing::info;

/// Ensure the article storage area exists, creating it when absent.
///
/// Failure here is fatal: no store operation can run without it.
pub async fn ensure_storage_dir(data_dir: &str) -> anyhow::Result<()> {
    if tokio::fs::metadata(data_dir).await.is_err() {
        info!(%data_dir, "storage directory not found; creating it");
    }
    tokio::fs::create_dir_all(data_dir)
        .await
        .map_err(|e| anyhow::anyhow!("cannot create {data_dir}: {e}"))?;
    let meta = tokio::fs::metadata(data_dir)
        .await
        .map_err(|e| anyhow::anyhow!("cannot stat {data_dir}: {e}"))?;
    if !meta.is_dir() {
        return Err(anyhow::anyhow!("{data_dir} exists but is not a directory"));
    }
    Ok(())
}
