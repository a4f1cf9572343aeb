//! The browsing context the acquisition steps drive.
//!
//! Steps only see these traits: one process-wide [`BrowserSession`] per run
//! and short-lived [`SessionPage`]s, each opened for a single step and closed
//! right after.

use std::path::Path;
use std::time::Duration;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use muse_core::{Error, Result};

/// The single action that makes a document viewer hand over its file.
#[derive(Debug, Clone, PartialEq)]
pub enum DownloadTrigger {
    ClickSelector(String),
    /// Fixed viewport coordinates. Breaks whenever the viewer layout or the
    /// viewport size changes; prefer a selector when the site offers one.
    ClickPosition { x: f64, y: f64 },
    WaitForSelector(String),
}

#[async_trait]
pub trait SessionPage: Send + Sync {
    async fn goto(&self, url: &str) -> Result<()>;

    /// Current URL, used to resolve relative links
    async fn url(&self) -> Result<String>;

    /// Serialized DOM of the current page
    async fn content(&self) -> Result<String>;

    /// Fire `trigger` while waiting for one download event, and save the
    /// first completed download at `destination`.
    async fn capture_download(
        &self,
        trigger: &DownloadTrigger,
        destination: &Path,
        timeout: Duration,
    ) -> Result<()>;

    async fn close(self: Box<Self>) -> Result<()>;
}

#[async_trait]
pub trait BrowserSession: Send + Sync {
    async fn new_page(&self) -> Result<Box<dyn SessionPage>>;

    /// Tear down the browsing context at the end of a run
    async fn close(&self) -> Result<()>;
}

/// A cookie as exported by common browser tooling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionCookie {
    pub name: String,
    pub value: String,
    pub domain: String,
    #[serde(default = "default_cookie_path")]
    pub path: String,
    #[serde(default)]
    pub expires: Option<f64>,
    #[serde(default)]
    pub http_only: bool,
    #[serde(default)]
    pub secure: bool,
}

fn default_cookie_path() -> String {
    "/".to_string()
}

/// Load session cookies. A missing file is not an error: the run goes on
/// unauthenticated and later steps fail per journal or article.
pub fn load_cookies(path: &Path) -> Result<Option<Vec<SessionCookie>>> {
    if !path.exists() {
        tracing::warn!("{} not found, proceeding without cookies", path.display());
        return Ok(None);
    }
    let raw = std::fs::read_to_string(path)?;
    let cookies: Vec<SessionCookie> = serde_json::from_str(&raw)
        .map_err(|e| Error::Config(format!("Invalid cookie file {}: {}", path.display(), e)))?;
    tracing::info!("🍪 Loaded {} cookies from {}", cookies.len(), path.display());
    Ok(Some(cookies))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_cookie_file_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(load_cookies(&dir.path().join("cookies.json")).unwrap(), None);
    }

    #[test]
    fn test_load_cookies() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cookies.json");
        std::fs::write(
            &path,
            r#"[{"name":"session","value":"abc","domain":".muse.jhu.edu","httpOnly":true,"sameSite":"Lax"}]"#,
        )
        .unwrap();

        let cookies = load_cookies(&path).unwrap().unwrap();
        assert_eq!(cookies.len(), 1);
        assert_eq!(cookies[0].path, "/");
        assert!(cookies[0].http_only);
        assert!(!cookies[0].secure);
    }

    #[test]
    fn test_malformed_cookie_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cookies.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(load_cookies(&path), Err(Error::Config(_))));
    }
}
