//! The steps that get from a journal's entry page to the PDF links of its
//! most recent issue.
//!
//! Page parsing is kept in plain functions over HTML strings so it can be
//! tested without a browser; the async steps only fetch and hand over.

use std::time::Duration;
use lazy_static::lazy_static;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, warn};
use url::Url;
use muse_core::config::{JournalConfig, Selectors, SiteOptions};
use muse_core::{Error, IssueInfo, Result};
use crate::session::{BrowserSession, SessionPage};

lazy_static! {
    static ref YEAR: Regex = Regex::new(r"\b(?:19|20)\d{2}\b").unwrap();
    static ref VOLUME: Regex = Regex::new(r"(?i)Volume\s+(\d+)").unwrap();
    static ref MONTH: Regex = Regex::new(
        r"(?i)\b(Spring|Summer|Fall|Winter|January|February|March|April|May|June|July|August|September|October|November|December)\b"
    )
    .unwrap();
}

const UNKNOWN_YEAR: &str = "unknown_year";
const UNKNOWN_VOLUME: &str = "unknown_volume";
const UNKNOWN_MONTH: &str = "unknown_month";

/// Bounds on every navigation wait.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NavigationConfig {
    /// Pause after each page load for client-side rendering
    pub settle: Duration,
    pub timeout: Duration,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            settle: Duration::from_secs(2),
            timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleLink {
    pub url: String,
    /// Link text, used when the document itself yields no title
    pub title: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JournalIssue {
    pub info: IssueInfo,
    pub issue_url: String,
    pub articles: Vec<ArticleLink>,
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| Error::Config(format!("Invalid selector {:?}: {}", selector, e)))
}

fn element_text(element: &ElementRef) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let lower = word.to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn resolve(base: &Url, href: &str) -> Result<String> {
    base.join(href)
        .map(String::from)
        .map_err(|e| Error::InvalidUrl(format!("{}: {}", href, e)))
}

/// Read the journal title and the latest issue from a journal page. Returns
/// the issue fields and the absolute URL of the issue page.
pub fn parse_journal_page(
    html: &str,
    selectors: &Selectors,
    fallback_name: &str,
    page_url: &str,
) -> Result<(IssueInfo, String)> {
    let document = Html::parse_document(html);
    let title_selector = parse_selector(&selectors.title)?;
    let volume_selector = parse_selector(&selectors.volume)?;
    let link_selector = parse_selector("a[href]")?;

    let journal_title = document
        .select(&title_selector)
        .next()
        .map(|el| element_text(&el))
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| fallback_name.to_string());

    let volume = document
        .select(&volume_selector)
        .next()
        .ok_or_else(|| Error::Navigation(format!("No volume container ({}) on {}", selectors.volume, page_url)))?;
    let volume_text = element_text(&volume);

    let info = IssueInfo {
        journal_title,
        year: YEAR
            .find(&volume_text)
            .map(|m| m.as_str().to_string())
            .unwrap_or_else(|| UNKNOWN_YEAR.to_string()),
        volume: VOLUME
            .captures(&volume_text)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
            .unwrap_or_else(|| UNKNOWN_VOLUME.to_string()),
        month: MONTH
            .find(&volume_text)
            .map(|m| capitalize(m.as_str()))
            .unwrap_or_else(|| UNKNOWN_MONTH.to_string()),
    };

    let href = volume
        .select(&link_selector)
        .next()
        .and_then(|a| a.value().attr("href"))
        .ok_or_else(|| Error::Navigation(format!("No issue link inside {} on {}", selectors.volume, page_url)))?;
    let base = Url::parse(page_url).map_err(|e| Error::InvalidUrl(format!("{}: {}", page_url, e)))?;
    let issue_url = resolve(&base, href)?;

    Ok((info, issue_url))
}

/// All PDF links on an issue page, resolved against the page's own URL, in
/// document order, without exact duplicates.
pub fn parse_issue_page(html: &str, selectors: &Selectors, page_url: &str) -> Result<Vec<ArticleLink>> {
    let document = Html::parse_document(html);
    let pdf_selector = parse_selector(&selectors.pdf_link)?;
    let base = Url::parse(page_url).map_err(|e| Error::InvalidUrl(format!("{}: {}", page_url, e)))?;

    let mut links: Vec<ArticleLink> = Vec::new();
    for element in document.select(&pdf_selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        let url = match resolve(&base, href) {
            Ok(url) => url,
            Err(e) => {
                warn!("Skipping unresolvable link: {}", e);
                continue;
            }
        };
        if links.iter().any(|l| l.url == url) {
            continue;
        }
        links.push(ArticleLink {
            url,
            title: element_text(&element),
        });
    }
    Ok(links)
}

async fn load(page: &dyn SessionPage, url: &str, config: &NavigationConfig) -> Result<String> {
    tokio::time::timeout(config.timeout, page.goto(url))
        .await
        .map_err(|_| Error::Timeout(config.timeout))??;
    tokio::time::sleep(config.settle).await;
    page.content().await
}

/// Check that the loaded cookies give an authenticated session. Only logs:
/// credentials are never negotiated here.
pub async fn login_step(session: &dyn BrowserSession, site: &SiteOptions, config: &NavigationConfig) {
    let page = match session.new_page().await {
        Ok(page) => page,
        Err(e) => {
            warn!("Could not open a page to check the session: {}", e);
            return;
        }
    };
    match load(page.as_ref(), &site.base_url, config).await {
        Ok(html) => {
            let lowered = html.to_lowercase();
            if lowered.contains("log out") || lowered.contains("logout") || lowered.contains("sign out") {
                info!("🔐 Session for {} looks authenticated", site.name);
            } else {
                warn!("🔐 No sign of an authenticated session on {}; downloads may fail", site.base_url);
            }
        }
        Err(e) => warn!("Could not reach {}: {}", site.base_url, e),
    }
    if let Err(e) = page.close().await {
        debug!("Failed to close login page: {}", e);
    }
}

/// The journals to visit. The catalogue already holds direct entry URLs.
pub fn browse_journals_step(site: &SiteOptions) -> Vec<JournalConfig> {
    info!("📚 Using {} configured journals from {}", site.journal_links.len(), site.name);
    site.journal_links.clone()
}

/// First journal whose name contains `preferred`, ignoring case.
pub fn select_journal_step<'a>(journals: &'a [JournalConfig], preferred: &str) -> Option<&'a JournalConfig> {
    let needle = preferred.to_lowercase();
    let selected = journals.iter().find(|j| j.name.to_lowercase().contains(&needle));
    match selected {
        Some(journal) => info!("Selected journal: {}", journal.name),
        None => warn!("No journal found matching: {}", preferred),
    }
    selected
}

/// Visit the journal page, follow its latest issue and collect the article
/// links found there.
pub async fn resolve_latest_issue(
    session: &dyn BrowserSession,
    site: &SiteOptions,
    journal: &JournalConfig,
    config: &NavigationConfig,
) -> Result<JournalIssue> {
    let selectors = site.selectors_for(journal);
    let page = session.new_page().await?;

    let result = async {
        let html = load(page.as_ref(), &journal.href, config).await?;
        let current = page.url().await.unwrap_or_else(|_| journal.href.clone());
        let (info, issue_url) = parse_journal_page(&html, selectors, &journal.name, &current)?;
        debug!("Latest issue of {}: {} ({:?})", info.journal_title, issue_url, info);

        let html = load(page.as_ref(), &issue_url, config).await?;
        let current = page.url().await.unwrap_or_else(|_| issue_url.clone());
        let articles = parse_issue_page(&html, selectors, &current)?;
        info!("Found {} PDF links on {}", articles.len(), issue_url);
        Ok(JournalIssue { info, issue_url, articles })
    }
    .await;

    if let Err(e) = page.close().await {
        debug!("Failed to close journal page: {}", e);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selectors() -> Selectors {
        Selectors {
            title: ".title".to_string(),
            volume: "div.volume".to_string(),
            pdf_link: r#"a[href$="/pdf"]"#.to_string(),
        }
    }

    const JOURNAL_PAGE: &str = r#"
        <html><body>
          <h1 class="title">  AJS Review  </h1>
          <div class="volume"><a href="/pub/56/journal/844/issue/1">Volume 48, Number 2, Fall 2024</a></div>
          <div class="volume"><a href="/older">Volume 47, Spring 2023</a></div>
        </body></html>"#;

    #[test]
    fn test_parse_journal_page() {
        let (info, url) =
            parse_journal_page(JOURNAL_PAGE, &selectors(), "AJS", "https://muse.jhu.edu/pub/56/journal/844").unwrap();
        assert_eq!(info.journal_title, "AJS Review");
        assert_eq!(info.year, "2024");
        assert_eq!(info.volume, "48");
        assert_eq!(info.month, "Fall");
        assert_eq!(url, "https://muse.jhu.edu/pub/56/journal/844/issue/1");
    }

    #[test]
    fn test_unmatched_issue_fields_and_title_fallback() {
        let html = r#"<div class="volume"><a href="issue/9">Latest issue</a></div>"#;
        let (info, url) = parse_journal_page(html, &selectors(), "Jewish Quarterly Review", "https://muse.jhu.edu/journal/292/").unwrap();
        assert_eq!(info.journal_title, "Jewish Quarterly Review");
        assert_eq!(info.year, "unknown_year");
        assert_eq!(info.volume, "unknown_volume");
        assert_eq!(info.month, "unknown_month");
        assert_eq!(url, "https://muse.jhu.edu/journal/292/issue/9");
    }

    #[test]
    fn test_missing_volume_is_a_navigation_error() {
        let html = r#"<h1 class="title">AJS Review</h1><p>No issues</p>"#;
        let result = parse_journal_page(html, &selectors(), "AJS", "https://muse.jhu.edu/");
        assert!(matches!(result, Err(Error::Navigation(_))));

        let no_link = r#"<div class="volume">Volume 1, 2020</div>"#;
        let result = parse_journal_page(no_link, &selectors(), "AJS", "https://muse.jhu.edu/");
        assert!(matches!(result, Err(Error::Navigation(_))));
    }

    #[test]
    fn test_invalid_selector_is_a_config_error() {
        let mut selectors = selectors();
        selectors.volume = "div[".to_string();
        let result = parse_journal_page(JOURNAL_PAGE, &selectors, "AJS", "https://muse.jhu.edu/");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_parse_issue_page_dedups_and_keeps_order() {
        let html = r#"
            <a href="/article/901234/pdf">The Golem and the Machine</a>
            <a href="/article/901234">Summary page</a>
            <a href="https://muse.jhu.edu/article/900001/pdf">Second</a>
            <a href="/article/901234/pdf">The Golem and the Machine</a>"#;
        let links = parse_issue_page(html, &selectors(), "https://muse.jhu.edu").unwrap();
        assert_eq!(
            links,
            vec![
                ArticleLink {
                    url: "https://muse.jhu.edu/article/901234/pdf".to_string(),
                    title: "The Golem and the Machine".to_string(),
                },
                ArticleLink {
                    url: "https://muse.jhu.edu/article/900001/pdf".to_string(),
                    title: "Second".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_issue_links_resolve_against_issue_page() {
        let html = r#"
            <a href="../48/article/101/pdf">Relative</a>
            <a href="article/102/pdf">Sibling</a>
            <a href="/article/103/pdf">Rooted</a>"#;
        let links = parse_issue_page(html, &selectors(), "https://journals.test/journal/1/issue/48").unwrap();
        let urls: Vec<&str> = links.iter().map(|l| l.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://journals.test/journal/1/48/article/101/pdf",
                "https://journals.test/journal/1/issue/article/102/pdf",
                "https://journals.test/article/103/pdf",
            ]
        );
    }

    #[test]
    fn test_select_journal_step() {
        let journals = vec![
            JournalConfig {
                name: "AJS Review".to_string(),
                href: "https://muse.jhu.edu/pub/56/journal/844".to_string(),
                selectors: None,
            },
            JournalConfig {
                name: "Jewish Quarterly Review".to_string(),
                href: "https://muse.jhu.edu/pub/56/journal/292".to_string(),
                selectors: None,
            },
        ];
        assert_eq!(select_journal_step(&journals, "quarterly").unwrap().name, "Jewish Quarterly Review");
        assert_eq!(select_journal_step(&journals, "ajs").unwrap().name, "AJS Review");
        assert!(select_journal_step(&journals, "Prooftexts").is_none());
    }
}
