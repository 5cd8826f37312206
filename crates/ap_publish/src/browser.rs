use std::path::{Path, PathBuf};
use async_trait::async_trait;
use ap_core::placeholder::image_html;
use ap_core::{BodySegment, PublishOutcome, PublishRequest, Publisher, SiteCredentials};
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::input::{DispatchKeyEventParams, DispatchKeyEventType};
use chromiumoxide::cdp::browser_protocol::network::CookieParam;
use chromiumoxide::cdp::browser_protocol::page::AddScriptToEvaluateOnNewDocumentParams;
use chromiumoxide::element::Element;
use chromiumoxide::Page;
use futures_util::StreamExt;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::debug::dump_failure;
use crate::error::{PublishError, Result};
use crate::profile::SiteProfile;
use crate::scripts;
use crate::wait::wait_until;

/// Ways to activate a control, tried in order until one goes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickStrategy {
    Native,
    JavaScript,
    EnterKey,
}

impl ClickStrategy {
    pub const ALL: [ClickStrategy; 3] = [Self::Native, Self::JavaScript, Self::EnterKey];
}

struct Session {
    browser: Browser,
    page: Page,
    handler_task: JoinHandle<()>,
}

impl Session {
    async fn close(mut self) {
        if let Err(e) = self.browser.close().await {
            debug!("Browser close: {}", e);
        }
        if let Err(e) = self.browser.wait().await {
            debug!("Browser wait: {}", e);
        }
        self.handler_task.abort();
    }
}

/// Publishes through the site's web editor in a Chromium instance
/// authenticated with session cookies.
#[derive(Debug, Clone)]
pub struct BrowserPublisher {
    credentials: SiteCredentials,
    profile: SiteProfile,
    debug_dir: PathBuf,
    test_mode: bool,
    headless: bool,
    chrome_path: Option<PathBuf>,
}

impl BrowserPublisher {
    pub fn new(credentials: SiteCredentials, profile: SiteProfile) -> Self {
        Self {
            credentials,
            profile,
            debug_dir: PathBuf::from("."),
            test_mode: false,
            headless: true,
            chrome_path: None,
        }
    }

    pub fn with_debug_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.debug_dir = dir.into();
        self
    }

    /// Run everything except the final publish click.
    pub fn test_mode(mut self, enabled: bool) -> Self {
        self.test_mode = enabled;
        self
    }

    pub fn headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    pub fn chrome_path(mut self, path: Option<PathBuf>) -> Self {
        self.chrome_path = path;
        self
    }

    async fn launch(&self) -> Result<Session> {
        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .window_size(1920, 1080)
            .arg("--disable-dev-shm-usage")
            .arg("--disable-blink-features=AutomationControlled");
        if !self.headless {
            builder = builder.with_head();
        }
        if let Some(path) = &self.chrome_path {
            builder = builder.chrome_executable(path);
        }
        let config = builder.build().map_err(PublishError::Launch)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| PublishError::Launch(e.to_string()))?;
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("Browser handler event error: {}", e);
                }
            }
        });

        let page = browser.new_page("about:blank").await?;
        page.execute(AddScriptToEvaluateOnNewDocumentParams::new(scripts::STEALTH))
            .await?;

        Ok(Session {
            browser,
            page,
            handler_task,
        })
    }

    async fn sign_in(&self, page: &Page) -> Result<()> {
        info!("🔑 Opening {} with session cookies", self.profile.home_url);
        page.goto(self.profile.home_url.as_str()).await?;

        let cookies = [
            (&self.profile.sid_cookie_name, &self.credentials.sid),
            (&self.profile.uid_cookie_name, &self.credentials.uid),
        ]
        .into_iter()
        .map(|(name, value)| {
            CookieParam::builder()
                .name(name.as_str())
                .value(value.as_str())
                .domain(self.profile.cookie_domain.as_str())
                .path("/")
                .secure(true)
                .build()
                .map_err(PublishError::Step)
        })
        .collect::<Result<Vec<_>>>()?;
        page.set_cookies(cookies).await?;

        info!("📝 Opening editor: {}", self.profile.editor_url);
        page.goto(self.profile.editor_url.as_str()).await?;
        Ok(())
    }

    async fn wait_for_element(&self, page: &Page, selectors: &[String], what: &str) -> Result<Element> {
        let timings = &self.profile.timings;
        let element = wait_until(what, timings.element, timings.poll, move || async move {
            for selector in selectors {
                if let Ok(element) = page.find_element(selector.as_str()).await {
                    return Some(element);
                }
            }
            None
        })
        .await?;
        Ok(element)
    }

    async fn try_click(&self, page: &Page, selector: &str, strategy: ClickStrategy) -> Result<bool> {
        Ok(match strategy {
            ClickStrategy::Native => {
                page.find_element(selector).await?.click().await?;
                true
            }
            ClickStrategy::JavaScript => page.evaluate(scripts::click(selector)).await?.into_value::<bool>()?,
            ClickStrategy::EnterKey => {
                page.find_element(selector).await?.press_key("Enter").await?;
                true
            }
        })
    }

    /// Activate the first selector that responds, escalating through
    /// [`ClickStrategy::ALL`] for each.
    async fn click_first(&self, page: &Page, selectors: &[String], what: &str) -> Result<()> {
        self.wait_for_element(page, selectors, what).await?;
        for selector in selectors {
            for strategy in ClickStrategy::ALL {
                match self.try_click(page, selector, strategy).await {
                    Ok(true) => {
                        debug!("Clicked {} via {:?} on {}", what, strategy, selector);
                        sleep(self.profile.timings.paste_settle).await;
                        return Ok(());
                    }
                    Ok(false) => debug!("{:?} click found nothing for {}", strategy, selector),
                    Err(e) => debug!("{:?} click on {} failed: {}", strategy, selector, e),
                }
            }
        }
        Err(PublishError::Step(format!("Could not click {}", what)))
    }

    async fn paste(&self, page: &Page, html: &str) -> Result<()> {
        let inserted: bool = page.evaluate(scripts::paste_html(html)).await?.into_value()?;
        if !inserted {
            warn!("⚠️ Editor ignored pasted fragment ({} chars)", html.len());
        }
        sleep(self.profile.timings.paste_settle).await;
        Ok(())
    }

    async fn image_count(&self, page: &Page) -> Result<u64> {
        let count = page
            .evaluate(scripts::count(&self.profile.editor_images_selector))
            .await?
            .into_value()?;
        Ok(count)
    }

    async fn insert_image(&self, page: &Page, url: &str, alt: &str) -> Result<()> {
        let before = self.image_count(page).await?;
        press_enter(page).await?;
        self.paste(page, &image_html(url, alt)).await?;

        let timings = &self.profile.timings;
        let selector = self.profile.editor_images_selector.as_str();
        let uploaded = wait_until("image upload", timings.image_upload, timings.poll, move || async move {
            let count: u64 = page
                .evaluate(scripts::count(selector))
                .await
                .ok()?
                .into_value()
                .ok()?;
            (count > before).then_some(count)
        })
        .await;
        match uploaded {
            Ok(_) => info!("🖼️ Image placed: {}", url),
            Err(e) => warn!("⚠️ {} ({}), continuing", e, url),
        }
        press_enter(page).await?;
        Ok(())
    }

    async fn write_article(&self, page: &Page, request: &PublishRequest) -> Result<()> {
        let title = self
            .wait_for_element(page, &self.profile.title_selectors, "title field")
            .await?;
        title.click().await?;
        title.type_str(&request.title).await?;
        sleep(self.profile.timings.keystroke).await;

        let body = self
            .wait_for_element(page, &self.profile.body_selectors, "body field")
            .await?;
        body.click().await?;

        for segment in &request.segments {
            match segment {
                BodySegment::Html(html) => self.paste(page, html).await?,
                BodySegment::Image { url, alt } => self.insert_image(page, url, alt).await?,
            }
        }
        info!("✍️ Article body written ({} segments)", request.segments.len());
        Ok(())
    }

    async fn add_tags(&self, page: &Page, tags: &[String]) -> Result<()> {
        if tags.is_empty() {
            return Ok(());
        }
        let input = self
            .wait_for_element(page, &self.profile.tag_input_selectors, "tag input")
            .await?;
        input.click().await?;
        for tag in tags {
            input.type_str(tag).await?;
            sleep(self.profile.timings.keystroke).await;
            input.press_key("Enter").await?;
            sleep(self.profile.timings.paste_settle).await;
        }
        info!("🏷️ Added tags: {}", tags.join(", "));
        Ok(())
    }

    async fn wait_for_publication(&self, page: &Page) -> Result<String> {
        let profile = &self.profile;
        let url = wait_until(
            "the page to leave the editor",
            profile.timings.confirmation,
            profile.timings.poll,
            move || async move {
                let url = page.url().await.ok().flatten()?;
                profile.is_published_url(&url).then_some(url)
            },
        )
        .await?;
        Ok(url)
    }

    async fn drive(&self, page: &Page, request: &PublishRequest) -> Result<PublishOutcome> {
        self.sign_in(page).await?;
        self.write_article(page, request).await?;

        self.click_first(page, &self.profile.publish_dialog_selectors, "publish dialog")
            .await?;
        self.add_tags(page, &request.tags).await?;

        if self.test_mode {
            self.wait_for_element(page, &self.profile.confirm_selectors, "publish confirmation")
                .await?;
            info!("🧪 Test mode: stopping before the final publish click");
            return Ok(PublishOutcome {
                url: page.url().await?,
                confirmed: false,
                dry_run: true,
            });
        }

        self.click_first(page, &self.profile.confirm_selectors, "publish confirmation")
            .await?;
        let url = self.wait_for_publication(page).await?;
        info!("🎉 Published: {}", url);
        Ok(PublishOutcome {
            url: Some(url),
            confirmed: true,
            dry_run: false,
        })
    }
}

/// Key down and key up for Enter, delivered at the caret of the focused editor.
fn enter_key_events() -> Result<Vec<DispatchKeyEventParams>> {
    [DispatchKeyEventType::KeyDown, DispatchKeyEventType::KeyUp]
        .into_iter()
        .map(|kind| {
            let builder = DispatchKeyEventParams::builder()
                .r#type(kind.clone())
                .key("Enter")
                .code("Enter")
                .windows_virtual_key_code(13)
                .native_virtual_key_code(13);
            let builder = match kind {
                DispatchKeyEventType::KeyDown => builder.text("\r"),
                _ => builder,
            };
            builder.build().map_err(PublishError::Step)
        })
        .collect()
}

async fn press_enter(page: &Page) -> Result<()> {
    for event in enter_key_events()? {
        page.execute(event).await?;
    }
    Ok(())
}

#[async_trait]
impl Publisher for BrowserPublisher {
    fn name(&self) -> &str {
        &self.profile.name
    }

    async fn publish(&self, request: &PublishRequest) -> ap_core::Result<PublishOutcome> {
        info!("🚀 Publishing \"{}\" to {}", request.title, self.profile.name);
        let session = self.launch().await?;

        let result = self.drive(&session.page, request).await;
        if let Err(e) = &result {
            error!("❌ Publishing failed: {}", e);
            dump_failure(&session.page, dump_dir(&self.debug_dir)).await;
        }

        session.close().await;
        Ok(result?)
    }
}

fn dump_dir(dir: &Path) -> &Path {
    if dir.as_os_str().is_empty() {
        Path::new(".")
    } else {
        dir
    }
}
