use std::path::PathBuf;
use std::sync::Arc;
use ap_core::config::{DEFAULT_API_BASE_URL, DEFAULT_MAX_IMAGES, DEFAULT_MAX_TAGS, DEFAULT_MODEL, DEFAULT_POSTED_LINKS_FILE};
use ap_core::logging::init_logging;
use ap_core::{Config, Error, GeneratorConfig, LinkStore, Result, Secret};
use ap_feed::HttpFeedSource;
use ap_storage::{create_link_store, StoreKind};
use clap::builder::FalseyValueParser;
use clap::Parser;
use tracing::{error, info};

mod duration;
mod pipeline;

use duration::HumanDuration;
use pipeline::{Pipeline, RunOutcome};

#[derive(Parser, Debug)]
#[command(author, version, about = "Publish the next unposted feed entry to Medium", long_about = None)]
pub struct Cli {
    /// RSS, Atom or JSON feed to publish from
    #[arg(long, env = "AUTOPOST_FEED_URL")]
    feed_url: Option<String>,
    /// Generative API key; without one the original content is published
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
    #[arg(long, env = "GEMINI_MODEL", default_value = DEFAULT_MODEL)]
    model: String,
    #[arg(long, env = "GEMINI_BASE_URL", default_value = DEFAULT_API_BASE_URL)]
    api_base_url: String,
    #[arg(long, env = "MEDIUM_SID_COOKIE", hide_env_values = true)]
    sid_cookie: Option<String>,
    #[arg(long, env = "MEDIUM_UID_COOKIE", hide_env_values = true)]
    uid_cookie: Option<String>,
    #[arg(long, env = "AUTOPOST_POSTED_LINKS", default_value = DEFAULT_POSTED_LINKS_FILE)]
    posted_links: PathBuf,
    #[arg(long, default_value = "file", help = "Link store backend. Available: file (default), memory")]
    storage: StoreKind,
    /// JSON log of successful publishes
    #[arg(long, env = "AUTOPOST_STATS_FILE")]
    stats_file: Option<PathBuf>,
    /// Where failure screenshots and page sources are written
    #[arg(long, env = "AUTOPOST_DEBUG_DIR", default_value = ".")]
    debug_dir: PathBuf,
    /// Run the whole flow except the final publish click
    #[arg(long, env = "AUTOPOST_TEST_MODE", value_parser = FalseyValueParser::new())]
    test_mode: bool,
    /// Also look for images on the source article page
    #[arg(long, env = "AUTOPOST_SCRAPE_SOURCE_PAGES", value_parser = FalseyValueParser::new())]
    scrape_source_pages: bool,
    #[arg(long, env = "AUTOPOST_MAX_TAGS", default_value_t = DEFAULT_MAX_TAGS)]
    max_tags: usize,
    #[arg(long, env = "AUTOPOST_MAX_IMAGES", default_value_t = DEFAULT_MAX_IMAGES)]
    max_images: usize,
    /// Chromium executable; detected automatically when unset
    #[arg(long = "chrome", env = "CHROME_PATH")]
    chrome_path: Option<PathBuf>,
    /// Keep running, one publish attempt per interval (e.g. 1h, 30m, 1d, 1h15m30s)
    #[arg(long, env = "AUTOPOST_INTERVAL")]
    interval: Option<HumanDuration>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand, Debug, Clone)]
enum Commands {
    /// Publish the oldest unposted entry (default)
    Run,
    /// List unposted entries, oldest first, without publishing
    Pending,
    /// Record a link as published without publishing it
    MarkPosted { link: String },
}

impl Cli {
    fn config(&self) -> Result<Config> {
        let feed_url = self
            .feed_url
            .clone()
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| Error::Config("--feed-url or AUTOPOST_FEED_URL is required".to_string()))?;

        let config = Config {
            generator: GeneratorConfig {
                api_key: self.api_key.clone().map(Secret::new),
                model: self.model.clone(),
                base_url: self.api_base_url.clone(),
            },
            sid_cookie: self.sid_cookie.clone().map(Secret::new),
            uid_cookie: self.uid_cookie.clone().map(Secret::new),
            posted_links_path: self.posted_links.clone(),
            stats_path: self.stats_file.clone(),
            debug_dir: self.debug_dir.clone(),
            test_mode: self.test_mode,
            scrape_source_pages: self.scrape_source_pages,
            max_tags: self.max_tags,
            max_images: self.max_images,
            chrome_path: self.chrome_path.clone(),
            ..Config::new(feed_url)
        };
        config.validate()?;
        Ok(config)
    }
}

/// One publish attempt. Benign outcomes (empty feed, missing cookies) are
/// logged and reported as success.
async fn run_once(config: &Config, store: Arc<dyn LinkStore>) -> Result<()> {
    let result = match Pipeline::from_config(config, store) {
        Ok(pipeline) => pipeline.run().await,
        Err(e) => Err(e),
    };

    match result {
        Ok(RunOutcome::NothingToDo) => info!("😴 No new entries to publish"),
        Ok(RunOutcome::Published { link, url }) => {
            info!("🎉 Published {} at {}", link, url.as_deref().unwrap_or("unknown URL"))
        }
        Ok(RunOutcome::DryRun { link }) => info!("🧪 Test run complete for {}", link),
        Err(Error::MissingCredentials(reason)) => {
            error!("❌ Session cookies missing, nothing published: {}", reason)
        }
        Err(e) if e.is_benign() => info!("📭 Nothing to publish: {}", e),
        Err(e) => return Err(e),
    }
    Ok(())
}

async fn list_pending(config: &Config, store: Arc<dyn LinkStore>) -> Result<()> {
    let feed = HttpFeedSource::new(config.feed_url.clone())?;

    match pipeline::pending(&feed, store.as_ref()).await {
        Ok(entries) if entries.is_empty() => println!("No unposted entries"),
        Ok(entries) => {
            for entry in entries {
                let date = entry
                    .published
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_else(|| "----------".to_string());
                println!("{}  {}  {}", date, entry.title, entry.link);
            }
        }
        Err(e) if e.is_benign() => info!("📭 {}", e),
        Err(e) => return Err(e),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_logging("info");
    let cli = Cli::parse();

    let store = create_link_store(cli.storage, &cli.posted_links);
    info!("💾 Link store ready (using {:?} at {})", cli.storage, cli.posted_links.display());

    match cli.command.clone().unwrap_or(Commands::Run) {
        Commands::MarkPosted { link } => {
            store.add(&link).await?;
            info!("✅ Marked as posted: {}", link.trim());
        }
        Commands::Pending => {
            let config = cli.config()?;
            list_pending(&config, store).await?;
        }
        Commands::Run => {
            let config = cli.config()?;
            match cli.interval {
                Some(interval) => {
                    info!("Running in periodic mode with {} interval", interval);
                    loop {
                        if let Err(e) = run_once(&config, store.clone()).await {
                            error!("❌ Run failed: {}", e);
                        }
                        info!("Waiting {} before next run", interval);
                        tokio::time::sleep(interval.0).await;
                    }
                }
                None => run_once(&config, store).await?,
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["autopost", "--feed-url", "https://food.example.com/feed"]).unwrap();
        assert!(cli.command.is_none());
        let config = cli.config().unwrap();
        assert_eq!(config.max_tags, 5);
        assert_eq!(config.generator.model, "gemini-2.0-flash");
        assert_eq!(config.posted_links_path, PathBuf::from("posted_links.txt"));
        assert!(!config.test_mode);
    }

    #[test]
    fn test_cli_flags() {
        let cli = Cli::try_parse_from([
            "autopost",
            "--feed-url",
            "https://food.example.com/feed",
            "--test-mode",
            "--max-tags",
            "3",
            "--interval",
            "1h30m",
            "--storage",
            "memory",
            "mark-posted",
            "https://food.example.com/lemon-tart",
        ])
        .unwrap();
        assert_eq!(cli.storage, StoreKind::Memory);
        assert_eq!(cli.interval.unwrap().0.as_secs(), 5400);
        assert!(matches!(cli.command, Some(Commands::MarkPosted { ref link }) if link.ends_with("lemon-tart")));
        let config = cli.config().unwrap();
        assert!(config.test_mode);
        assert_eq!(config.max_tags, 3);
    }

    #[test]
    fn test_cli_rejects_bad_input() {
        assert!(Cli::try_parse_from(["autopost", "--storage", "qdrant"]).is_err());
        assert!(Cli::try_parse_from(["autopost", "--interval", "soon"]).is_err());

        let cli = Cli::try_parse_from(["autopost", "--feed-url", "not a url"]).unwrap();
        assert!(matches!(cli.config(), Err(Error::Config(_))));
    }
}
