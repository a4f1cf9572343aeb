use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use chrono::Utc;
use sha2::{Digest, Sha256};
use tracing::{error, info, warn};
use muse_core::config::{JournalConfig, SiteOptions, UserPreferences};
use muse_core::paths::issue_folder;
use muse_core::{Article, ArticleMetadata, ArticleStore, DocumentReader, Error, Result, Summary, SummaryEntry};
use muse_inference::combined::record_combined_summary;
use muse_inference::pipeline::write_summary_mirror;
use muse_inference::SummaryPipeline;
use crate::download::{download_document, DownloadOptions, DEFAULT_SETTLE, DEFAULT_TIMEOUT};
use crate::logging::Logger;
use crate::metadata::extract_metadata;
use crate::navigation::{
    browse_journals_step, login_step, resolve_latest_issue, select_journal_step, ArticleLink, JournalIssue,
    NavigationConfig,
};
use crate::session::BrowserSession;

#[derive(Debug, Clone)]
pub struct AcquisitionConfig {
    pub downloads_dir: PathBuf,
    pub summaries_dir: PathBuf,
    pub preferences: UserPreferences,
    pub navigation: NavigationConfig,
    pub download_settle: Duration,
    pub download_timeout: Duration,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            downloads_dir: PathBuf::from("downloads"),
            summaries_dir: PathBuf::from("summaries"),
            preferences: UserPreferences::default(),
            navigation: NavigationConfig::default(),
            download_settle: DEFAULT_SETTLE,
            download_timeout: DEFAULT_TIMEOUT,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AcquisitionReport {
    /// Paths of the articles stored by this run
    pub downloaded: Vec<String>,
    pub skipped: usize,
    pub failed: usize,
    pub journals_failed: usize,
    /// Preferred names that matched no configured journal
    pub journals_unmatched: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunReport {
    pub acquisition: AcquisitionReport,
    pub summarized: usize,
    pub summaries_failed: usize,
    pub combined_summary_id: Option<i64>,
}

enum ArticleOutcome {
    Downloaded(String),
    AlreadyStored,
}

/// Deterministic file name for an article URL: `article_<id>.pdf` from the
/// last all-digit path segment, or a short hash of the URL when there is none.
pub fn article_file_name(url: &str) -> String {
    let numeric = url::Url::parse(url).ok().and_then(|parsed| {
        parsed.path_segments().and_then(|segments| {
            segments
                .filter(|s| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()))
                .last()
                .map(str::to_string)
        })
    });
    match numeric {
        Some(id) => format!("article_{}.pdf", id),
        None => {
            let digest = Sha256::digest(url.as_bytes());
            let hex: String = digest.iter().take(8).map(|b| format!("{:02x}", b)).collect();
            format!("article_{}.pdf", hex)
        }
    }
}

fn known(value: &str) -> Option<&str> {
    (!value.is_empty() && !value.starts_with("unknown_")).then_some(value)
}

fn first_non_empty(candidates: &[&str]) -> String {
    candidates
        .iter()
        .map(|c| c.trim())
        .find(|c| !c.is_empty())
        .unwrap_or_default()
        .to_string()
}

/// Drives one acquisition and summarization run over a site catalogue.
pub struct AcquisitionManager {
    storage: Arc<dyn ArticleStore>,
    reader: Arc<dyn DocumentReader>,
    site: SiteOptions,
    config: AcquisitionConfig,
}

impl AcquisitionManager {
    pub fn new(
        storage: Arc<dyn ArticleStore>,
        reader: Arc<dyn DocumentReader>,
        site: SiteOptions,
        config: AcquisitionConfig,
    ) -> Self {
        Self {
            storage,
            reader,
            site,
            config,
        }
    }

    pub fn site(&self) -> &SiteOptions {
        &self.site
    }

    /// Visit every preferred journal in turn. A failing journal is logged and
    /// counted; it never stops the others.
    pub async fn acquire_all(&self, session: &dyn BrowserSession) -> AcquisitionReport {
        let mut report = AcquisitionReport::default();
        let journals = browse_journals_step(&self.site);

        let preferred: Vec<String> = if self.config.preferences.preferred_journals.is_empty() {
            journals.iter().map(|j| j.name.clone()).collect()
        } else {
            self.config.preferences.preferred_journals.clone()
        };

        for name in &preferred {
            let Some(journal) = select_journal_step(&journals, name) else {
                report.journals_unmatched += 1;
                continue;
            };
            let logger = Logger::new().with_prefix(&journal.name);
            if let Err(e) = self.acquire_journal(session, journal, &mut report, &logger).await {
                logger.error(&format!("❌ Journal failed: {}", e));
                report.journals_failed += 1;
            }
        }

        info!(
            "📥 Acquisition done: {} downloaded, {} already stored, {} failed, {} journals failed",
            report.downloaded.len(),
            report.skipped,
            report.failed,
            report.journals_failed
        );
        report
    }

    async fn acquire_journal(
        &self,
        session: &dyn BrowserSession,
        journal: &JournalConfig,
        report: &mut AcquisitionReport,
        logger: &Logger,
    ) -> Result<()> {
        let issue = resolve_latest_issue(session, &self.site, journal, &self.config.navigation).await?;
        let folder = issue_folder(&self.config.downloads_dir, &issue.info.journal_title, &issue.info);
        let limit = self
            .config
            .preferences
            .max_articles_per_journal
            .unwrap_or(usize::MAX);

        logger.info(&format!(
            "📖 Latest issue: {} volume {} {} ({} articles)",
            issue.info.year,
            issue.info.volume,
            issue.info.month,
            issue.articles.len()
        ));

        for link in issue.articles.iter().take(limit) {
            let file_name = article_file_name(&link.url);
            let article_logger = logger.clone().with_prefix(&file_name);
            match self.acquire_article(session, &issue, link, &folder, &file_name).await {
                Ok(ArticleOutcome::Downloaded(path)) => {
                    article_logger.info("✅ Downloaded and stored");
                    report.downloaded.push(path);
                }
                Ok(ArticleOutcome::AlreadyStored) => {
                    article_logger.debug("Already stored, skipping");
                    report.skipped += 1;
                }
                Err(e) => {
                    article_logger.warn(&format!("Download failed for {}: {}", link.url, e));
                    report.failed += 1;
                }
            }
        }
        Ok(())
    }

    async fn acquire_article(
        &self,
        session: &dyn BrowserSession,
        issue: &JournalIssue,
        link: &ArticleLink,
        folder: &Path,
        file_name: &str,
    ) -> Result<ArticleOutcome> {
        let destination = folder.join(file_name);
        let key = destination.to_string_lossy().to_string();
        if self.storage.article_exists(&key).await? {
            return Ok(ArticleOutcome::AlreadyStored);
        }

        let options = DownloadOptions::new(&link.url, folder, file_name)
            .with_triggers(&self.site.download)
            .with_timing(self.config.download_settle, self.config.download_timeout);
        let saved = download_document(session, &options).await?;

        let metadata = self.read_metadata(&saved).await;
        let stem = Path::new(file_name)
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();

        let article = Article {
            file_path: key.clone(),
            title: first_non_empty(&[&metadata.title, &link.title, &stem]),
            authors: metadata.authors,
            journal: issue.info.journal_title.clone(),
            download_date: Utc::now(),
            year: first_non_empty(&[&metadata.year, known(&issue.info.year).unwrap_or_default()]),
            volume: first_non_empty(&[&metadata.volume, known(&issue.info.volume).unwrap_or_default()]),
            issue: metadata.issue,
            journal_issue: metadata.journal_issue,
        };
        self.storage.insert_article(&article).await?;
        Ok(ArticleOutcome::Downloaded(key))
    }

    async fn read_metadata(&self, path: &Path) -> ArticleMetadata {
        let reader = self.reader.clone();
        let owned = path.to_path_buf();
        let text = tokio::task::spawn_blocking(move || reader.first_page_text(&owned))
            .await
            .map_err(|e| Error::External(e.into()))
            .and_then(|r| r);
        match text {
            Ok(text) => extract_metadata(&text),
            Err(e) => {
                warn!("Could not read first page of {}: {}", path.display(), e);
                ArticleMetadata::default()
            }
        }
    }

    /// Summarize every stored article that has no summary yet, oldest
    /// download first. Returns the entries for the combined summary and the
    /// number of failures. A failing article, whether in the model or in the
    /// store, is logged and counted; the others still run.
    pub async fn summarize_pending(&self, pipeline: &SummaryPipeline) -> (Vec<SummaryEntry>, usize) {
        let mut articles = match self.storage.list_articles().await {
            Ok(articles) => articles,
            Err(e) => {
                error!("Could not list stored articles: {}", e);
                return (Vec::new(), 0);
            }
        };
        articles.reverse();

        let mut entries = Vec::new();
        let mut failed = 0;
        for article in articles {
            let logger = Logger::new().with_prefix(&article.title);
            match self.summarize_article(pipeline, &article, &logger).await {
                Ok(Some(summary)) => entries.push(SummaryEntry {
                    title: article.title,
                    journal: article.journal,
                    authors: article.authors,
                    summary,
                }),
                Ok(None) => {}
                Err(e) => {
                    logger.warn(&format!("Summarization failed: {}", e));
                    failed += 1;
                }
            }
        }
        (entries, failed)
    }

    /// `None` when the article already has a summary.
    async fn summarize_article(
        &self,
        pipeline: &SummaryPipeline,
        article: &Article,
        logger: &Logger,
    ) -> Result<Option<String>> {
        if self.storage.get_summary(&article.file_path).await?.is_some() {
            return Ok(None);
        }
        logger.info(&format!("🤖 Summarizing with {}", pipeline.model_name()));
        let result = pipeline.summarize(Path::new(&article.file_path)).await?;

        self.storage
            .upsert_summary(&Summary {
                file_path: article.file_path.clone(),
                summary: result.summary.clone(),
                markdown: Some(result.markdown),
                created_at: Utc::now(),
            })
            .await?;
        match write_summary_mirror(&self.config.summaries_dir, article, &result.summary) {
            Ok(path) => logger.debug(&format!("Mirrored to {}", path.display())),
            Err(e) => logger.warn(&format!("Could not mirror summary: {}", e)),
        }
        Ok(Some(result.summary))
    }

    /// One full run. Failures inside a phase are logged and counted in the
    /// report; the session is closed at the end whatever happened.
    pub async fn run(&self, session: &dyn BrowserSession, pipeline: &SummaryPipeline) -> RunReport {
        login_step(session, &self.site, &self.config.navigation).await;
        let acquisition = self.acquire_all(session).await;
        let (entries, summaries_failed) = self.summarize_pending(pipeline).await;
        let combined_summary_id = match record_combined_summary(self.storage.as_ref(), &entries).await {
            Ok(id) => id,
            Err(e) => {
                error!("Could not store combined summary of {} articles: {}", entries.len(), e);
                None
            }
        };

        if let Err(e) = session.close().await {
            warn!("Failed to close browser session: {}", e);
        }
        info!(
            "🏁 Run finished: {} new articles, {} summaries, {} failed",
            acquisition.downloaded.len(),
            entries.len(),
            acquisition.failed + summaries_failed
        );
        RunReport {
            acquisition,
            summarized: entries.len(),
            summaries_failed,
            combined_summary_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_article_file_name_uses_numeric_segment() {
        assert_eq!(article_file_name("https://muse.jhu.edu/article/901234/pdf"), "article_901234.pdf");
        assert_eq!(article_file_name("https://muse.jhu.edu/pub/56/article/77"), "article_77.pdf");
    }

    #[test]
    fn test_article_file_name_falls_back_to_hash() {
        let name = article_file_name("https://journals.test/view/golem-machine/pdf");
        assert!(name.starts_with("article_"));
        assert!(name.ends_with(".pdf"));
        assert_eq!(name.len(), "article_".len() + 16 + ".pdf".len());
        assert_eq!(name, article_file_name("https://journals.test/view/golem-machine/pdf"));
        assert_ne!(name, article_file_name("https://journals.test/view/other/pdf"));
    }

    #[test]
    fn test_fallback_helpers() {
        assert_eq!(known("unknown_year"), None);
        assert_eq!(known("2020"), Some("2020"));
        assert_eq!(first_non_empty(&["", "  ", "Title"]), "Title");
        assert_eq!(first_non_empty(&["", ""]), "");
    }
}
