use std::path::{Path, PathBuf};
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::Page;
use chrono::{DateTime, Utc};
use tracing::{info, warn};

/// Where the screenshot and page source for a failure at `at` are written.
pub fn failure_paths(dir: &Path, at: DateTime<Utc>) -> (PathBuf, PathBuf) {
    let stamp = at.format("%Y%m%d_%H%M%S");
    (
        dir.join(format!("error_screenshot_{}.png", stamp)),
        dir.join(format!("error_page_source_{}.html", stamp)),
    )
}

pub async fn write_page_source(path: &Path, html: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, html).await
}

/// Save what the browser was showing. Best effort: failures here are logged
/// and never replace the original error.
pub async fn dump_failure(page: &Page, dir: &Path) {
    let (screenshot, source) = failure_paths(dir, Utc::now());

    if let Err(e) = tokio::fs::create_dir_all(dir).await {
        warn!("Could not create debug directory {}: {}", dir.display(), e);
        return;
    }

    match page
        .save_screenshot(ScreenshotParams::builder().full_page(true).build(), &screenshot)
        .await
    {
        Ok(_) => info!("📸 Saved screenshot: {}", screenshot.display()),
        Err(e) => warn!("Could not save screenshot: {}", e),
    }

    match page.content().await {
        Ok(html) => match write_page_source(&source, &html).await {
            Ok(()) => info!("📄 Saved page source: {}", source.display()),
            Err(e) => warn!("Could not write page source: {}", e),
        },
        Err(e) => warn!("Could not read page source: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_failure_paths() {
        let at = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        let (shot, source) = failure_paths(Path::new("debug"), at);
        assert_eq!(shot, Path::new("debug/error_screenshot_20240309_140507.png"));
        assert_eq!(source, Path::new("debug/error_page_source_20240309_140507.html"));
    }

    #[tokio::test]
    async fn test_write_page_source_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let (_, source) = failure_paths(&dir.path().join("nested"), Utc::now());
        write_page_source(&source, "<html><body>editor</body></html>").await.unwrap();
        let written = std::fs::read_to_string(&source).unwrap();
        assert!(written.contains("editor"));
    }
}
