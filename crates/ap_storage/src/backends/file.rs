use std::collections::HashSet;
use std::path::{Path, PathBuf};
use async_trait::async_trait;
use ap_core::{Error, LinkStore, Result};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::debug;

/// Published links in a flat text file, one link per line.
///
/// A missing file reads as an empty set. Appends skip links that are already
/// recorded, so a retried run never duplicates a line. The store assumes a
/// single writer process.
#[derive(Debug)]
pub struct FileLinkStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileLinkStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_raw(&self) -> Result<String> {
        match fs::read_to_string(&self.path).await {
            Ok(raw) => Ok(raw),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
            Err(e) => Err(Error::Storage(format!(
                "Failed to read {}: {}",
                self.path.display(),
                e
            ))),
        }
    }
}

fn parse_links(raw: &str) -> HashSet<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

#[async_trait]
impl LinkStore for FileLinkStore {
    async fn contains(&self, link: &str) -> Result<bool> {
        Ok(self.links().await?.contains(link.trim()))
    }

    async fn add(&self, link: &str) -> Result<()> {
        let link = link.trim();
        if link.is_empty() {
            return Err(Error::Storage("Refusing to record an empty link".to_string()));
        }

        let _guard = self.write_lock.lock().await;
        let raw = self.read_raw().await?;
        if parse_links(&raw).contains(link) {
            debug!("Link already recorded: {}", link);
            return Ok(());
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        let mut line = String::with_capacity(link.len() + 2);
        if !raw.is_empty() && !raw.ends_with('\n') {
            line.push('\n');
        }
        line.push_str(link);
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }

    async fn links(&self) -> Result<HashSet<String>> {
        Ok(parse_links(&self.read_raw().await?))
    }
}
