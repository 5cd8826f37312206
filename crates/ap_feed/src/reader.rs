use std::time::Duration;
use async_trait::async_trait;
use ap_core::{Error, FeedEntry, FeedSource, MediaKind, MediaRef, Result};
use feed_rs::model::Entry;
use feed_rs::parser;
use reqwest::Client;
use tracing::{debug, info};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
pub(crate) const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Reads an RSS, Atom or JSON feed over HTTP.
#[derive(Debug, Clone)]
pub struct HttpFeedSource {
    client: Client,
    url: String,
}

impl HttpFeedSource {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self::with_client(client, url))
    }

    pub fn with_client(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl FeedSource for HttpFeedSource {
    fn location(&self) -> &str {
        &self.url
    }

    async fn fetch_entries(&self) -> Result<Vec<FeedEntry>> {
        info!("📡 Fetching feed: {}", self.url);
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| Error::FeedUnavailable(format!("{}: {}", self.url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::FeedUnavailable(format!("{} returned HTTP {}", self.url, status)));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| Error::FeedUnavailable(format!("{}: {}", self.url, e)))?;
        let entries = parse_feed(&body)?;
        if entries.is_empty() {
            return Err(Error::FeedUnavailable(format!("{} has no entries", self.url)));
        }
        info!("📰 Found {} entries", entries.len());
        Ok(order_oldest_first(entries))
    }
}

/// Parse feed bytes into entries, in the order the feed presents them.
pub fn parse_feed(bytes: &[u8]) -> Result<Vec<FeedEntry>> {
    let feed = parser::parse(bytes).map_err(|e| Error::FeedUnavailable(format!("Unparseable feed: {}", e)))?;
    Ok(feed.entries.into_iter().filter_map(convert_entry).collect())
}

/// Oldest first. Sort by date when every entry has one, otherwise reverse the
/// presentation order since feeds list newest first.
pub fn order_oldest_first(mut entries: Vec<FeedEntry>) -> Vec<FeedEntry> {
    if entries.iter().all(|e| e.published.is_some()) {
        entries.sort_by_key(|e| e.published);
    } else {
        entries.reverse();
    }
    entries
}

fn convert_entry(entry: Entry) -> Option<FeedEntry> {
    let link = select_link(&entry)?;
    let mut media = Vec::new();

    for object in &entry.media {
        for content in &object.content {
            if let Some(url) = &content.url {
                media.push(MediaRef {
                    url: url.to_string(),
                    mime_type: content.content_type.as_ref().map(|m| m.to_string()),
                    width: content.width,
                    height: content.height,
                    kind: MediaKind::Content,
                });
            }
        }
        for thumbnail in &object.thumbnails {
            media.push(MediaRef {
                url: thumbnail.image.uri.clone(),
                mime_type: None,
                width: thumbnail.image.width,
                height: thumbnail.image.height,
                kind: MediaKind::Thumbnail,
            });
        }
    }

    // Atom enclosures arrive as links
    for enclosure in entry.links.iter().filter(|l| l.rel.as_deref() == Some("enclosure")) {
        media.push(MediaRef {
            url: enclosure.href.clone(),
            mime_type: enclosure.media_type.clone(),
            width: None,
            height: None,
            kind: MediaKind::Content,
        });
    }

    let tags = entry
        .categories
        .iter()
        .map(|c| c.label.clone().unwrap_or_else(|| c.term.clone()).trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();

    let title = entry
        .title
        .as_ref()
        .map(|t| t.content.trim().to_string())
        .unwrap_or_default();
    debug!("Parsed entry: {} ({})", title, link);

    Some(FeedEntry {
        title,
        link,
        summary: entry.summary.map(|s| s.content),
        content: entry.content.and_then(|c| c.body),
        media,
        tags,
        published: entry.published.or(entry.updated),
    })
}

fn select_link(entry: &Entry) -> Option<String> {
    let is_http = |href: &str| href.starts_with("http://") || href.starts_with("https://");

    entry
        .links
        .iter()
        .find(|l| matches!(l.rel.as_deref(), None | Some("alternate")) && !l.href.trim().is_empty())
        .or_else(|| {
            entry
                .links
                .iter()
                .find(|l| l.rel.as_deref() != Some("enclosure") && !l.href.trim().is_empty())
        })
        .map(|l| l.href.trim().to_string())
        .or_else(|| Some(entry.id.trim().to_string()).filter(|id| is_http(id)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const RSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:media="http://search.yahoo.com/mrss/" xmlns:content="http://purl.org/rss/1.0/modules/content/">
  <channel>
    <title>Fast Yummy Food</title>
    <link>https://food.example.com</link>
    <description>Recipes</description>
    <item>
      <title>Newest Pie</title>
      <link>https://food.example.com/newest-pie</link>
      <pubDate>Wed, 03 Jan 2024 10:00:00 GMT</pubDate>
      <category>Dessert</category>
      <description><![CDATA[<p>Pie summary</p>]]></description>
      <content:encoded><![CDATA[<p>Pie body <img src="https://food.example.com/uploads/pie.jpg" /></p>]]></content:encoded>
      <media:content url="https://food.example.com/uploads/pie-large.jpg" type="image/jpeg" width="1200" height="800" />
    </item>
    <item>
      <title>Middle Soup</title>
      <link>https://food.example.com/middle-soup</link>
      <pubDate>Tue, 02 Jan 2024 10:00:00 GMT</pubDate>
      <description><![CDATA[<p>Soup summary</p>]]></description>
      <enclosure url="https://food.example.com/uploads/soup.png" type="image/png" length="1000" />
    </item>
    <item>
      <title>Oldest Salad</title>
      <link>https://food.example.com/oldest-salad</link>
      <pubDate>Mon, 01 Jan 2024 10:00:00 GMT</pubDate>
      <description><![CDATA[<p>Salad summary</p>]]></description>
    </item>
  </channel>
</rss>"#;

    #[test]
    fn test_parse_rss_entries() {
        let entries = parse_feed(RSS.as_bytes()).unwrap();
        assert_eq!(entries.len(), 3);

        let pie = &entries[0];
        assert_eq!(pie.title, "Newest Pie");
        assert_eq!(pie.link, "https://food.example.com/newest-pie");
        assert_eq!(pie.tags, vec!["Dessert".to_string()]);
        assert!(pie.body_html().contains("Pie body"));
        assert!(pie
            .media
            .iter()
            .any(|m| m.url == "https://food.example.com/uploads/pie-large.jpg" && m.is_image()));

        let soup = &entries[1];
        assert!(soup.media.iter().any(|m| m.url.ends_with("soup.png") && m.is_image()));
        assert!(soup.published.is_some());
    }

    #[test]
    fn test_thumbnail_only_item_keeps_its_image() {
        let rss = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:media="http://search.yahoo.com/mrss/">
  <channel>
    <title>CDN Food</title>
    <link>https://cdn-food.example.com</link>
    <description>Recipes</description>
    <item>
      <title>Bread</title>
      <link>https://cdn-food.example.com/bread</link>
      <description><![CDATA[<p>Crusty.</p>]]></description>
      <media:thumbnail url="https://cdn.example.com/img/abc123" width="1200" height="800" />
    </item>
  </channel>
</rss>"#;
        let entries = parse_feed(rss.as_bytes()).unwrap();
        let media = &entries[0].media;
        assert_eq!(media.len(), 1);
        assert_eq!(media[0].kind, MediaKind::Thumbnail);
        assert_eq!(media[0].url, "https://cdn.example.com/img/abc123");
        assert!(media[0].is_image());
    }

    #[test]
    fn test_order_oldest_first_by_date() {
        let entries = order_oldest_first(parse_feed(RSS.as_bytes()).unwrap());
        let titles: Vec<_> = entries.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["Oldest Salad", "Middle Soup", "Newest Pie"]);
    }

    #[test]
    fn test_order_oldest_first_without_dates_reverses() {
        let entries = vec![
            FeedEntry { title: "c".into(), link: "https://x.test/c".into(), ..Default::default() },
            FeedEntry { title: "b".into(), link: "https://x.test/b".into(), ..Default::default() },
            FeedEntry { title: "a".into(), link: "https://x.test/a".into(), ..Default::default() },
        ];
        let titles: Vec<_> = order_oldest_first(entries).into_iter().map(|e| e.title).collect();
        assert_eq!(titles, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_parse_garbage_is_feed_unavailable() {
        assert!(matches!(parse_feed(b"<html>not a feed"), Err(Error::FeedUnavailable(_))));
    }

    #[tokio::test]
    async fn test_fetch_entries_over_http() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/feed")
            .with_status(200)
            .with_header("content-type", "application/rss+xml")
            .with_body(RSS)
            .create_async()
            .await;

        let source = HttpFeedSource::new(format!("{}/feed", server.url())).unwrap();
        let entries = source.fetch_entries().await.unwrap();
        mock.assert_async().await;
        assert_eq!(entries.first().unwrap().title, "Oldest Salad");
    }

    #[tokio::test]
    async fn test_fetch_entries_http_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server.mock("GET", "/feed").with_status(503).create_async().await;

        let source = HttpFeedSource::new(format!("{}/feed", server.url())).unwrap();
        let err = source.fetch_entries().await.unwrap_err();
        assert!(matches!(err, Error::FeedUnavailable(_)));
    }

    #[tokio::test]
    async fn test_fetch_entries_empty_feed() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/feed")
            .with_status(200)
            .with_body(r#"<?xml version="1.0"?><rss version="2.0"><channel><title>t</title><link>https://x.test</link><description>d</description></channel></rss>"#)
            .create_async()
            .await;

        let source = HttpFeedSource::new(format!("{}/feed", server.url())).unwrap();
        assert!(matches!(source.fetch_entries().await, Err(Error::FeedUnavailable(_))));
    }
}
