use async_trait::async_trait;
use muse_core::{
    Article, ArticleStore, CombinedSummary, Error, NewCombinedSummary, Result, Summary,
};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;
use crate::StorageBackend;

#[derive(Debug, Default)]
pub struct MemoryStore {
    articles: Vec<Article>,
    summaries: Vec<Summary>,
    combined: Vec<CombinedSummary>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_article(&mut self, article: &Article) -> Result<()> {
        if self.articles.iter().any(|a| a.file_path == article.file_path) {
            return Err(Error::DuplicateArticle(article.file_path.clone()));
        }
        self.articles.push(article.clone());
        Ok(())
    }

    pub fn upsert_summary(&mut self, summary: &Summary) {
        if let Some(existing) = self.summaries.iter_mut().find(|s| s.file_path == summary.file_path) {
            *existing = summary.clone();
        } else {
            self.summaries.push(summary.clone());
        }
    }

    pub fn insert_combined_summary(&mut self, summary: &NewCombinedSummary) -> i64 {
        let id = self.combined.last().map_or(1, |c| c.id + 1);
        self.combined.push(CombinedSummary {
            id,
            date: summary.date.clone(),
            content: summary.content.clone(),
            created_at: summary.created_at,
        });
        id
    }
}

/// Process-local store, used for dry runs and tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStorage {
    store: Arc<RwLock<MemoryStore>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StorageBackend for InMemoryStorage {
    fn get_error_message() -> &'static str {
        "Memory storage should be available"
    }

    async fn open(_path: &Path) -> Result<Self> {
        Ok(Self::new())
    }
}

#[async_trait]
impl ArticleStore for InMemoryStorage {
    async fn insert_article(&self, article: &Article) -> Result<()> {
        self.store.write().await.insert_article(article)
    }

    async fn article_exists(&self, file_path: &str) -> Result<bool> {
        let store = self.store.read().await;
        Ok(store.articles.iter().any(|a| a.file_path == file_path))
    }

    async fn get_article(&self, file_path: &str) -> Result<Option<Article>> {
        let store = self.store.read().await;
        Ok(store.articles.iter().find(|a| a.file_path == file_path).cloned())
    }

    async fn list_articles(&self) -> Result<Vec<Article>> {
        let store = self.store.read().await;
        let mut articles = store.articles.clone();
        articles.reverse();
        articles.sort_by(|a, b| b.download_date.cmp(&a.download_date));
        Ok(articles)
    }

    async fn upsert_summary(&self, summary: &Summary) -> Result<()> {
        self.store.write().await.upsert_summary(summary);
        Ok(())
    }

    async fn get_summary(&self, file_path: &str) -> Result<Option<Summary>> {
        let store = self.store.read().await;
        Ok(store.summaries.iter().find(|s| s.file_path == file_path).cloned())
    }

    async fn list_summaries(&self) -> Result<Vec<Summary>> {
        let store = self.store.read().await;
        let mut summaries = store.summaries.clone();
        summaries.reverse();
        summaries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(summaries)
    }

    async fn insert_combined_summary(&self, summary: &NewCombinedSummary) -> Result<i64> {
        Ok(self.store.write().await.insert_combined_summary(summary))
    }

    async fn list_combined_summaries(&self) -> Result<Vec<CombinedSummary>> {
        let store = self.store.read().await;
        let mut combined = store.combined.clone();
        combined.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(combined)
    }
}
