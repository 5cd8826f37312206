use std::path::{Path, PathBuf};
use ap_core::{Error, PublishRecord, Result};
use tokio::fs;
use tracing::info;

/// JSON array of successful publishes, kept next to the link file.
#[derive(Debug, Clone)]
pub struct StatsLog {
    path: PathBuf,
}

impl StatsLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn records(&self) -> Result<Vec<PublishRecord>> {
        match fs::read_to_string(&self.path).await {
            Ok(raw) if raw.trim().is_empty() => Ok(Vec::new()),
            Ok(raw) => serde_json::from_str(&raw).map_err(|e| {
                Error::Storage(format!("Malformed stats file {}: {}", self.path.display(), e))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn append(&self, record: PublishRecord) -> Result<()> {
        let mut records = self.records().await?;
        records.push(record);

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string_pretty(&records)?;
        // Write beside the target and rename so a crash never truncates the log.
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).await?;
        fs::rename(&tmp, &self.path).await?;
        info!("📊 Publish stats updated ({} total)", records.len());
        Ok(())
    }
}
