use anyhow::{Context, Result};
use chrono::Local;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

/// Persists normalized records and reports as timestamped JSON files.
///
/// Only called with already-normalized data, never raw upstream payloads.
#[derive(Debug, Clone)]
pub struct ResultStore {
    output_dir: PathBuf,
}

impl ResultStore {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Write `data` as pretty JSON under a timestamped filename and return
    /// the storage location.
    pub async fn save_json<T: Serialize>(&self, data: &T, stem: &str) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .with_context(|| format!("creating output directory {}", self.output_dir.display()))?;

        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        let path = self.output_dir.join(format!("{}_{}.json", stem, timestamp));

        let json = serde_json::to_string_pretty(data)?;
        tokio::fs::write(&path, json)
            .await
            .with_context(|| format!("writing {}", path.display()))?;

        info!("💾 Saved results to: {}", path.display());
        Ok(path)
    }
}
