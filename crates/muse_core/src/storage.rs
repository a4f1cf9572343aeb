use async_trait::async_trait;
use crate::types::{Article, CombinedSummary, NewCombinedSummary, Summary};
use crate::Result;

#[async_trait]
pub trait ArticleStore: Send + Sync {
    /// Store a new article. Fails with `DuplicateArticle` if its path is taken.
    async fn insert_article(&self, article: &Article) -> Result<()>;

    /// Whether an article is recorded at this exact path
    async fn article_exists(&self, file_path: &str) -> Result<bool>;

    async fn get_article(&self, file_path: &str) -> Result<Option<Article>>;

    /// All articles, most recently downloaded first
    async fn list_articles(&self) -> Result<Vec<Article>>;

    /// Insert a summary, replacing any existing one for the same path
    async fn upsert_summary(&self, summary: &Summary) -> Result<()>;

    async fn get_summary(&self, file_path: &str) -> Result<Option<Summary>>;

    /// All summaries, newest first
    async fn list_summaries(&self) -> Result<Vec<Summary>>;

    /// Append a combined summary and return its id
    async fn insert_combined_summary(&self, summary: &NewCombinedSummary) -> Result<i64>;

    /// All combined summaries, newest first
    async fn list_combined_summaries(&self) -> Result<Vec<CombinedSummary>>;

    async fn latest_combined_summary(&self) -> Result<Option<CombinedSummary>> {
        Ok(self.list_combined_summaries().await?.into_iter().next())
    }
}
