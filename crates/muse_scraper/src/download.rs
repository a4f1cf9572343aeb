//! Saving one document through the browser's download machinery.

use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, warn};
use muse_core::config::{Position, TriggerConfig};
use muse_core::{Error, Result};
use crate::session::{BrowserSession, DownloadTrigger};

pub const DEFAULT_SETTLE: Duration = Duration::from_secs(6);
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, PartialEq)]
pub struct DownloadOptions {
    pub url: String,
    pub folder: PathBuf,
    pub file_name: String,
    pub click_selector: Option<String>,
    pub click_position: Option<Position>,
    pub wait_for_selector: Option<String>,
    /// Time given to the in-browser viewer to initialise before triggering
    pub settle: Duration,
    /// Upper bound on the wait for the download event
    pub timeout: Duration,
}

impl DownloadOptions {
    pub fn new(url: impl Into<String>, folder: impl Into<PathBuf>, file_name: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            folder: folder.into(),
            file_name: file_name.into(),
            click_selector: None,
            click_position: None,
            wait_for_selector: None,
            settle: DEFAULT_SETTLE,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_triggers(mut self, triggers: &TriggerConfig) -> Self {
        self.click_selector = triggers.click_selector.clone();
        self.click_position = triggers.click_position;
        self.wait_for_selector = triggers.wait_for_selector.clone();
        self
    }

    pub fn with_timing(mut self, settle: Duration, timeout: Duration) -> Self {
        self.settle = settle;
        self.timeout = timeout;
        self
    }

    /// The one trigger these options name.
    pub fn trigger(&self) -> Result<DownloadTrigger> {
        let mut triggers = Vec::with_capacity(1);
        if let Some(selector) = &self.click_selector {
            triggers.push(DownloadTrigger::ClickSelector(selector.clone()));
        }
        if let Some(Position { x, y }) = self.click_position {
            triggers.push(DownloadTrigger::ClickPosition { x, y });
        }
        if let Some(selector) = &self.wait_for_selector {
            triggers.push(DownloadTrigger::WaitForSelector(selector.clone()));
        }
        match triggers.len() {
            0 => Err(Error::NoDownloadTrigger),
            1 => Ok(triggers.remove(0)),
            _ => Err(Error::AmbiguousDownloadTrigger),
        }
    }

    pub fn destination(&self) -> PathBuf {
        self.folder.join(&self.file_name)
    }
}

/// Open a fresh page on `options.url`, let the viewer settle, fire the
/// trigger and save the resulting download. Returns the saved file's path.
///
/// No retries here: a timeout or missing download event is reported to the
/// caller, which decides whether to skip the article.
pub async fn download_document(session: &dyn BrowserSession, options: &DownloadOptions) -> Result<PathBuf> {
    let trigger = options.trigger()?;
    let destination = options.destination();

    let page = session.new_page().await?;
    let result = async {
        tokio::time::timeout(options.timeout, page.goto(&options.url))
            .await
            .map_err(|_| Error::Timeout(options.timeout))??;
        tokio::time::sleep(options.settle).await;

        tokio::fs::create_dir_all(&options.folder).await?;
        debug!("Triggering download of {} with {:?}", options.url, trigger);
        page.capture_download(&trigger, &destination, options.timeout).await
    }
    .await;

    if let Err(e) = page.close().await {
        warn!("Failed to close download page for {}: {}", options.url, e);
    }
    result.map(|_| destination)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionPage;
    use async_trait::async_trait;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct Recorder {
        pages_opened: AtomicUsize,
        pages_closed: AtomicUsize,
        triggers: Mutex<Vec<DownloadTrigger>>,
    }

    struct FakeSession {
        recorder: Arc<Recorder>,
        deliver: bool,
    }

    struct FakePage {
        recorder: Arc<Recorder>,
        deliver: bool,
    }

    #[async_trait]
    impl SessionPage for FakePage {
        async fn goto(&self, _url: &str) -> Result<()> {
            Ok(())
        }

        async fn url(&self) -> Result<String> {
            Ok("https://journals.test/".to_string())
        }

        async fn content(&self) -> Result<String> {
            Ok(String::new())
        }

        async fn capture_download(
            &self,
            trigger: &DownloadTrigger,
            destination: &Path,
            timeout: Duration,
        ) -> Result<()> {
            self.recorder.triggers.lock().unwrap().push(trigger.clone());
            if !self.deliver {
                return Err(Error::Timeout(timeout));
            }
            std::fs::write(destination, b"%PDF-1.4")?;
            Ok(())
        }

        async fn close(self: Box<Self>) -> Result<()> {
            self.recorder.pages_closed.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[async_trait]
    impl BrowserSession for FakeSession {
        async fn new_page(&self) -> Result<Box<dyn SessionPage>> {
            self.recorder.pages_opened.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(FakePage {
                recorder: self.recorder.clone(),
                deliver: self.deliver,
            }))
        }

        async fn close(&self) -> Result<()> {
            Ok(())
        }
    }

    fn options(folder: &Path) -> DownloadOptions {
        DownloadOptions::new("https://journals.test/article/1/pdf", folder.join("a").join("b"), "article_1.pdf")
            .with_timing(Duration::ZERO, Duration::from_secs(1))
    }

    #[test]
    fn test_trigger_selection() {
        let base = options(Path::new("downloads"));
        assert!(matches!(base.trigger(), Err(Error::NoDownloadTrigger)));

        let selector = DownloadOptions {
            click_selector: Some("#download".to_string()),
            ..base.clone()
        };
        assert_eq!(selector.trigger().unwrap(), DownloadTrigger::ClickSelector("#download".to_string()));

        let both = DownloadOptions {
            click_position: Some(Position { x: 1180.0, y: 25.0 }),
            ..selector
        };
        assert!(matches!(both.trigger(), Err(Error::AmbiguousDownloadTrigger)));
    }

    #[tokio::test]
    async fn test_missing_trigger_fails_before_opening_a_page() {
        let dir = tempfile::tempdir().unwrap();
        let recorder = Arc::new(Recorder::default());
        let session = FakeSession { recorder: recorder.clone(), deliver: true };

        let result = download_document(&session, &options(dir.path())).await;
        assert!(matches!(result, Err(Error::NoDownloadTrigger)));
        assert_eq!(recorder.pages_opened.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_download_creates_folder_and_closes_page() {
        let dir = tempfile::tempdir().unwrap();
        let recorder = Arc::new(Recorder::default());
        let session = FakeSession { recorder: recorder.clone(), deliver: true };
        let options = options(dir.path()).with_triggers(&TriggerConfig {
            click_position: Some(Position { x: 1180.0, y: 25.0 }),
            ..TriggerConfig::default()
        });

        let saved = download_document(&session, &options).await.unwrap();
        assert_eq!(saved, dir.path().join("a").join("b").join("article_1.pdf"));
        assert!(saved.is_file());
        assert_eq!(
            recorder.triggers.lock().unwrap().as_slice(),
            &[DownloadTrigger::ClickPosition { x: 1180.0, y: 25.0 }]
        );
        assert_eq!(recorder.pages_closed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_timeout_is_reported_and_page_closed() {
        let dir = tempfile::tempdir().unwrap();
        let recorder = Arc::new(Recorder::default());
        let session = FakeSession { recorder: recorder.clone(), deliver: false };
        let options = DownloadOptions {
            wait_for_selector: Some("embed".to_string()),
            ..options(dir.path())
        };

        let result = download_document(&session, &options).await;
        assert!(matches!(result, Err(Error::Timeout(_))));
        assert!(result.unwrap_err().is_retryable());
        assert_eq!(recorder.pages_closed.load(Ordering::SeqCst), 1);
    }
}
