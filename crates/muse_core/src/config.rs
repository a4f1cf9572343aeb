//! Site catalogue and user preferences.
//!
//! Journals and their selectors are data: supporting another journal or site
//! means adding an entry here (or in a JSON override), not new code.

use std::path::Path;
use serde::{Deserialize, Serialize};
use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Selectors {
    /// Canonical journal title on the journal page
    pub title: String,
    /// Container of the most recent volume/issue listing; its first link
    /// leads to the issue page
    pub volume: String,
    /// Article PDF links on the issue page
    pub pdf_link: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// How to make the document viewer hand over its file. Exactly one field is
/// expected to be set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerConfig {
    #[serde(default)]
    pub click_selector: Option<String>,
    #[serde(default)]
    pub click_position: Option<Position>,
    #[serde(default)]
    pub wait_for_selector: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalConfig {
    pub name: String,
    pub href: String,
    /// Per-journal override of the site selectors
    #[serde(default)]
    pub selectors: Option<Selectors>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteOptions {
    pub name: String,
    pub base_url: String,
    pub journal_links: Vec<JournalConfig>,
    pub selectors: Selectors,
    #[serde(default)]
    pub download: TriggerConfig,
}

impl SiteOptions {
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let site: SiteOptions = serde_json::from_str(&raw)?;
        site.validate()?;
        Ok(site)
    }

    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.base_url)
            .map_err(|e| Error::Config(format!("Invalid base URL {}: {}", self.base_url, e)))?;
        for journal in &self.journal_links {
            url::Url::parse(&journal.href)
                .map_err(|e| Error::Config(format!("Invalid URL for {}: {}", journal.name, e)))?;
        }
        Ok(())
    }

    pub fn selectors_for<'a>(&'a self, journal: &'a JournalConfig) -> &'a Selectors {
        journal.selectors.as_ref().unwrap_or(&self.selectors)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPreferences {
    pub preferred_journals: Vec<String>,
    #[serde(default)]
    pub max_articles_per_journal: Option<usize>,
}

impl UserPreferences {
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}
