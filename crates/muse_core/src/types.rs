use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub file_path: String,
    pub title: String,
    pub authors: String,
    pub journal: String,
    pub download_date: DateTime<Utc>,
    #[serde(default)]
    pub year: String,
    #[serde(default)]
    pub volume: String,
    #[serde(default)]
    pub issue: String,
    #[serde(default)]
    pub journal_issue: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub file_path: String,
    pub summary: String,
    pub markdown: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedSummary {
    pub id: i64,
    pub date: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// A combined summary before the store assigns it an id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCombinedSummary {
    pub date: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Best-effort bibliographic fields read from a document's first page.
/// Fields without a match are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleMetadata {
    pub title: String,
    pub authors: String,
    pub year: String,
    pub volume: String,
    pub issue: String,
    pub journal_issue: String,
}

/// Issue-level fields scraped from a journal page. Unmatched fields carry
/// `unknown_<field>` so they stay usable as path segments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueInfo {
    pub journal_title: String,
    pub year: String,
    pub volume: String,
    pub month: String,
}

/// One article's contribution to a run's combined summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryEntry {
    pub title: String,
    pub journal: String,
    pub authors: String,
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub summary: String,
    pub markdown: String,
    pub chunk_count: usize,
}
