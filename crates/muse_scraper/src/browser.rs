//! Chromium-backed browsing context over the DevTools protocol.

use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::browser::{
    DownloadProgressState, EventDownloadProgress, EventDownloadWillBegin,
    SetDownloadBehaviorBehavior, SetDownloadBehaviorParams,
};
use chromiumoxide::cdp::browser_protocol::network::{CookieParam, TimeSinceEpoch};
use chromiumoxide::handler::viewport::Viewport;
use chromiumoxide::layout::Point;
use chromiumoxide::Page;
use futures::StreamExt;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info};
use muse_core::{Error, Result};
use crate::session::{BrowserSession, DownloadTrigger, SessionCookie, SessionPage};

const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36";

/// Chrome's built-in PDF viewer would render documents instead of handing
/// them over as downloads.
const BROWSER_ARGS: &[&str] = &[
    "--disable-pdf-material-ui",
    "--disable-plugins",
    "--disable-print-preview",
    "--disable-pdf-viewer",
    "--no-pdf-material-ui",
    "--disable-site-isolation-trials",
    "--disable-features=PDFViewer",
];

const SELECTOR_POLL: Duration = Duration::from_millis(250);

fn browser_error(e: impl Display) -> Error {
    Error::Browser(e.to_string())
}

#[derive(Debug, Clone)]
pub struct BrowserOptions {
    pub headless: bool,
    pub width: u32,
    pub height: u32,
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            headless: true,
            width: 1280,
            height: 800,
        }
    }
}

pub struct ChromiumSession {
    browser: Arc<Mutex<Browser>>,
    handler: JoinHandle<()>,
}

impl ChromiumSession {
    pub async fn launch(options: &BrowserOptions) -> Result<Self> {
        let mut builder = BrowserConfig::builder()
            .window_size(options.width, options.height)
            .viewport(Viewport {
                width: options.width,
                height: options.height,
                ..Viewport::default()
            })
            .arg(format!("--user-agent={}", USER_AGENT))
            .args(BROWSER_ARGS.iter().copied());
        if !options.headless {
            builder = builder.with_head();
        }
        let config = builder.build().map_err(browser_error)?;

        let (browser, mut handler) = Browser::launch(config).await.map_err(browser_error)?;
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("Browser handler stopped: {}", e);
                    break;
                }
            }
        });
        info!("🌐 Browser launched ({})", if options.headless { "headless" } else { "headed" });

        Ok(Self {
            browser: Arc::new(Mutex::new(browser)),
            handler,
        })
    }

    pub async fn add_cookies(&self, cookies: &[SessionCookie]) -> Result<()> {
        let params = cookies
            .iter()
            .map(|cookie| {
                let mut builder = CookieParam::builder()
                    .name(cookie.name.clone())
                    .value(cookie.value.clone())
                    .domain(cookie.domain.clone())
                    .path(cookie.path.clone())
                    .http_only(cookie.http_only)
                    .secure(cookie.secure);
                if let Some(expires) = cookie.expires.filter(|e| *e > 0.0) {
                    builder = builder.expires(TimeSinceEpoch::new(expires));
                }
                builder.build().map_err(browser_error)
            })
            .collect::<Result<Vec<_>>>()?;

        self.browser
            .lock()
            .await
            .set_cookies(params)
            .await
            .map_err(browser_error)?;
        Ok(())
    }
}

#[async_trait]
impl BrowserSession for ChromiumSession {
    async fn new_page(&self) -> Result<Box<dyn SessionPage>> {
        let page = self
            .browser
            .lock()
            .await
            .new_page("about:blank")
            .await
            .map_err(browser_error)?;
        Ok(Box::new(ChromiumPage {
            page,
            browser: self.browser.clone(),
        }))
    }

    async fn close(&self) -> Result<()> {
        let mut browser = self.browser.lock().await;
        browser.close().await.map_err(browser_error)?;
        browser.wait().await?;
        self.handler.abort();
        info!("🌐 Browser closed");
        Ok(())
    }
}

pub struct ChromiumPage {
    page: Page,
    browser: Arc<Mutex<Browser>>,
}

impl ChromiumPage {
    async fn fire(&self, trigger: &DownloadTrigger) -> Result<()> {
        match trigger {
            DownloadTrigger::ClickSelector(selector) => {
                self.page
                    .find_element(selector.as_str())
                    .await
                    .map_err(browser_error)?
                    .click()
                    .await
                    .map_err(browser_error)?;
            }
            DownloadTrigger::ClickPosition { x, y } => {
                self.page
                    .click(Point { x: *x, y: *y })
                    .await
                    .map_err(browser_error)?;
            }
            DownloadTrigger::WaitForSelector(selector) => {
                while self.page.find_element(selector.as_str()).await.is_err() {
                    tokio::time::sleep(SELECTOR_POLL).await;
                }
            }
        }
        Ok(())
    }
}

#[async_trait]
impl SessionPage for ChromiumPage {
    async fn goto(&self, url: &str) -> Result<()> {
        self.page.goto(url).await.map_err(browser_error)?;
        Ok(())
    }

    async fn url(&self) -> Result<String> {
        self.page
            .url()
            .await
            .map_err(browser_error)?
            .ok_or_else(|| Error::Browser("page has no URL".to_string()))
    }

    async fn content(&self) -> Result<String> {
        self.page.content().await.map_err(browser_error)
    }

    async fn capture_download(
        &self,
        trigger: &DownloadTrigger,
        destination: &Path,
        timeout: Duration,
    ) -> Result<()> {
        let folder: PathBuf = destination
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        // Files land in `folder` named by download guid until renamed.
        let (mut will_begin, mut progress) = {
            let browser = self.browser.lock().await;
            let behavior = SetDownloadBehaviorParams::builder()
                .behavior(SetDownloadBehaviorBehavior::AllowAndName)
                .download_path(folder.to_string_lossy().to_string())
                .events_enabled(true)
                .build()
                .map_err(browser_error)?;
            browser.execute(behavior).await.map_err(browser_error)?;
            (
                browser
                    .event_listener::<EventDownloadWillBegin>()
                    .await
                    .map_err(browser_error)?,
                browser
                    .event_listener::<EventDownloadProgress>()
                    .await
                    .map_err(browser_error)?,
            )
        };

        let completed = async {
            let guid = match will_begin.next().await {
                Some(event) => {
                    debug!("Download of {} started", event.suggested_filename);
                    event.guid.clone()
                }
                None => return Err(Error::Download("download event stream closed".to_string())),
            };
            while let Some(event) = progress.next().await {
                if event.guid != guid {
                    continue;
                }
                match event.state {
                    DownloadProgressState::Completed => return Ok(guid),
                    DownloadProgressState::Canceled => {
                        return Err(Error::Download("download was cancelled".to_string()))
                    }
                    DownloadProgressState::InProgress => {}
                }
            }
            Err(Error::Download("download event stream closed".to_string()))
        };

        let (_, guid) = tokio::time::timeout(timeout, async {
            tokio::try_join!(self.fire(trigger), completed)
        })
        .await
        .map_err(|_| Error::Timeout(timeout))??;

        tokio::fs::rename(folder.join(&guid), destination).await?;
        Ok(())
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.page.close().await.map_err(browser_error)
    }
}
