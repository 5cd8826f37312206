use std::sync::Arc;
use ap_core::{
    Config, ContentEnricher, EnrichedArticle, Error, FeedEntry, FeedSource, ImageResolver,
    LinkStore, PublishRecord, Publisher, Result,
};
use ap_feed::{next_entry, pending_entries, FeedImageResolver, HttpFeedSource};
use ap_inference::create_enricher;
use ap_publish::{build_request, BrowserPublisher, SiteProfile};
use ap_storage::StatsLog;
use chrono::Utc;
use tracing::{info, warn};

/// What a single run ended up doing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    NothingToDo,
    Published { link: String, url: Option<String> },
    DryRun { link: String },
}

/// Unposted entries, oldest first.
pub async fn pending(feed: &dyn FeedSource, store: &dyn LinkStore) -> Result<Vec<FeedEntry>> {
    let entries = feed.fetch_entries().await?;
    let posted = store.links().await?;
    Ok(pending_entries(&entries, &posted).into_iter().cloned().collect())
}

/// Feed → enrichment → images → publisher → link store, one entry per run.
pub struct Pipeline {
    feed: Arc<dyn FeedSource>,
    store: Arc<dyn LinkStore>,
    enricher: Arc<dyn ContentEnricher>,
    images: Arc<dyn ImageResolver>,
    publisher: Arc<dyn Publisher>,
    stats: Option<StatsLog>,
    max_tags: usize,
}

impl Pipeline {
    pub fn new(
        feed: Arc<dyn FeedSource>,
        store: Arc<dyn LinkStore>,
        enricher: Arc<dyn ContentEnricher>,
        images: Arc<dyn ImageResolver>,
        publisher: Arc<dyn Publisher>,
    ) -> Self {
        Self {
            feed,
            store,
            enricher,
            images,
            publisher,
            stats: None,
            max_tags: ap_core::config::DEFAULT_MAX_TAGS,
        }
    }

    pub fn with_stats(mut self, stats: Option<StatsLog>) -> Self {
        self.stats = stats;
        self
    }

    pub fn with_max_tags(mut self, max_tags: usize) -> Self {
        self.max_tags = max_tags;
        self
    }

    /// Wire the production components. Fails with `MissingCredentials` before
    /// anything touches the network.
    pub fn from_config(config: &Config, store: Arc<dyn LinkStore>) -> Result<Self> {
        let credentials = config.credentials()?;

        let feed = Arc::new(HttpFeedSource::new(config.feed_url.clone())?);
        let enricher = create_enricher(&config.generator)?;
        let images: Arc<dyn ImageResolver> = if config.scrape_source_pages {
            Arc::new(FeedImageResolver::with_page_scraping(config.max_images)?)
        } else {
            Arc::new(FeedImageResolver::metadata_only(config.max_images))
        };
        let publisher = BrowserPublisher::new(credentials, SiteProfile::medium())
            .with_debug_dir(config.debug_dir.clone())
            .test_mode(config.test_mode)
            .chrome_path(config.chrome_path.clone());
        info!("🌐 Publishing to {} (test mode: {})", publisher.name(), config.test_mode);

        Ok(Self::new(feed, store, enricher, images, Arc::new(publisher))
            .with_stats(config.stats_path.clone().map(StatsLog::new))
            .with_max_tags(config.max_tags))
    }

    pub async fn run(&self) -> Result<RunOutcome> {
        let entries = self.feed.fetch_entries().await?;
        let posted = self.store.links().await?;
        let Some(entry) = next_entry(&entries, &posted) else {
            info!("✅ All {} feed entries are already published", entries.len());
            return Ok(RunOutcome::NothingToDo);
        };
        info!("🆕 Next entry: {} ({})", entry.title, entry.link);

        let article = self.enrich(entry).await;
        let images = match self.images.resolve(entry).await {
            Ok(images) => images,
            Err(e) => {
                warn!("⚠️ Image lookup failed, publishing without images: {}", e);
                Vec::new()
            }
        };

        let request = build_request(&article, &images, &entry.link, self.max_tags);
        let outcome = self.publisher.publish(&request).await?;

        if outcome.dry_run {
            info!("🧪 Dry run finished, {} stays unposted", entry.link);
            return Ok(RunOutcome::DryRun {
                link: entry.link.clone(),
            });
        }
        if !outcome.confirmed {
            return Err(Error::PublishFailed(format!(
                "{} did not confirm publication of {}",
                self.publisher.name(),
                entry.link
            )));
        }

        self.store.add(&entry.link).await?;
        info!("💾 Recorded {} as published", entry.link);

        if let Some(stats) = &self.stats {
            let record = PublishRecord {
                title: request.title.clone(),
                source_link: entry.link.clone(),
                published_url: outcome.url.clone(),
                published_at: Utc::now(),
            };
            if let Err(e) = stats.append(record).await {
                warn!("⚠️ Could not update stats file {}: {}", stats.path().display(), e);
            }
        }

        Ok(RunOutcome::Published {
            link: entry.link.clone(),
            url: outcome.url,
        })
    }

    async fn enrich(&self, entry: &FeedEntry) -> EnrichedArticle {
        match self.enricher.enrich(entry).await {
            Ok(article) => article,
            Err(e) => {
                warn!("⚠️ {} enrichment failed, using original content: {}", self.enricher.name(), e);
                EnrichedArticle::from_entry(entry)
            }
        }
    }
}
