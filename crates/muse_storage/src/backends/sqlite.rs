use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use muse_core::{
    Article, ArticleStore, CombinedSummary, Error, NewCombinedSummary, Result, Summary,
};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqliteRow};
use sqlx::Row;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use crate::StorageBackend;

const MIGRATIONS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS articles (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        file_path TEXT NOT NULL UNIQUE,
        title TEXT NOT NULL,
        authors TEXT NOT NULL DEFAULT '',
        journal TEXT NOT NULL DEFAULT '',
        download_date TEXT NOT NULL,
        year TEXT NOT NULL DEFAULT '',
        volume TEXT NOT NULL DEFAULT '',
        issue TEXT NOT NULL DEFAULT '',
        journal_issue TEXT NOT NULL DEFAULT ''
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS summaries (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        file_path TEXT NOT NULL UNIQUE,
        summary TEXT NOT NULL,
        markdown TEXT,
        created_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS combined_summaries (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        date TEXT NOT NULL,
        content TEXT NOT NULL,
        created_at TEXT NOT NULL
    )
    "#,
    // Add future migrations here
];

pub struct SQLiteStorage {
    pool: Arc<SqlitePool>,
    db_path: PathBuf,
}

#[async_trait]
impl StorageBackend for SQLiteStorage {
    fn get_error_message() -> &'static str {
        "SQLite database should be writable at the configured path (default ./downloads/articles.db)"
    }

    async fn open(path: &Path) -> Result<Self> {
        Self::new_with_path(path).await
    }
}

fn timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|at| at.with_timezone(&Utc))
        .map_err(|e| Error::Database(format!("Failed to parse date {}: {}", raw, e)))
}

fn db_error(context: &'static str) -> impl Fn(sqlx::Error) -> Error {
    move |e| Error::Database(format!("{}: {}", context, e))
}

fn article_from_row(row: &SqliteRow) -> Result<Article> {
    let get = |column: &str| -> Result<String> {
        row.try_get::<String, _>(column).map_err(db_error("Failed to read article"))
    };
    Ok(Article {
        file_path: get("file_path")?,
        title: get("title")?,
        authors: get("authors")?,
        journal: get("journal")?,
        download_date: parse_timestamp(&get("download_date")?)?,
        year: get("year")?,
        volume: get("volume")?,
        issue: get("issue")?,
        journal_issue: get("journal_issue")?,
    })
}

fn summary_from_row(row: &SqliteRow) -> Result<Summary> {
    let read = db_error("Failed to read summary");
    Ok(Summary {
        file_path: row.try_get("file_path").map_err(&read)?,
        summary: row.try_get("summary").map_err(&read)?,
        markdown: row.try_get("markdown").map_err(&read)?,
        created_at: parse_timestamp(&row.try_get::<String, _>("created_at").map_err(&read)?)?,
    })
}

fn combined_from_row(row: &SqliteRow) -> Result<CombinedSummary> {
    let read = db_error("Failed to read combined summary");
    Ok(CombinedSummary {
        id: row.try_get("id").map_err(&read)?,
        date: row.try_get("date").map_err(&read)?,
        content: row.try_get("content").map_err(&read)?,
        created_at: parse_timestamp(&row.try_get::<String, _>("created_at").map_err(&read)?)?,
    })
}

impl SQLiteStorage {
    pub async fn new_with_path(db_path: &Path) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true);
        let pool = SqlitePool::connect_with(options)
            .await
            .map_err(db_error("Failed to connect to database"))?;

        for (i, migration) in MIGRATIONS.iter().enumerate() {
            sqlx::query(migration)
                .execute(&pool)
                .await
                .map_err(|e| Error::Database(format!("Failed to run migration {}: {}", i, e)))?;
        }

        Ok(Self {
            pool: Arc::new(pool),
            db_path: db_path.to_path_buf(),
        })
    }

    pub fn get_db_path(&self) -> &Path {
        &self.db_path
    }
}

#[async_trait]
impl ArticleStore for SQLiteStorage {
    async fn insert_article(&self, article: &Article) -> Result<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO articles
            (file_path, title, authors, journal, download_date, year, volume, issue, journal_issue)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&article.file_path)
        .bind(&article.title)
        .bind(&article.authors)
        .bind(&article.journal)
        .bind(timestamp(&article.download_date))
        .bind(&article.year)
        .bind(&article.volume)
        .bind(&article.issue)
        .bind(&article.journal_issue)
        .execute(&*self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(Error::DuplicateArticle(article.file_path.clone()))
            }
            Err(e) => Err(db_error("Failed to store article")(e)),
        }
    }

    async fn article_exists(&self, file_path: &str) -> Result<bool> {
        let row = sqlx::query("SELECT 1 FROM articles WHERE file_path = ?")
            .bind(file_path)
            .fetch_optional(&*self.pool)
            .await
            .map_err(db_error("Failed to look up article"))?;
        Ok(row.is_some())
    }

    async fn get_article(&self, file_path: &str) -> Result<Option<Article>> {
        sqlx::query("SELECT * FROM articles WHERE file_path = ?")
            .bind(file_path)
            .fetch_optional(&*self.pool)
            .await
            .map_err(db_error("Failed to get article"))?
            .as_ref()
            .map(article_from_row)
            .transpose()
    }

    async fn list_articles(&self) -> Result<Vec<Article>> {
        let rows = sqlx::query("SELECT * FROM articles ORDER BY download_date DESC, id DESC")
            .fetch_all(&*self.pool)
            .await
            .map_err(db_error("Failed to list articles"))?;
        rows.iter().map(article_from_row).collect()
    }

    async fn upsert_summary(&self, summary: &Summary) -> Result<()> {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO summaries (file_path, summary, markdown, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&summary.file_path)
        .bind(&summary.summary)
        .bind(summary.markdown.as_deref())
        .bind(timestamp(&summary.created_at))
        .execute(&*self.pool)
        .await
        .map_err(db_error("Failed to store summary"))?;
        Ok(())
    }

    async fn get_summary(&self, file_path: &str) -> Result<Option<Summary>> {
        sqlx::query("SELECT * FROM summaries WHERE file_path = ?")
            .bind(file_path)
            .fetch_optional(&*self.pool)
            .await
            .map_err(db_error("Failed to get summary"))?
            .as_ref()
            .map(summary_from_row)
            .transpose()
    }

    async fn list_summaries(&self) -> Result<Vec<Summary>> {
        let rows = sqlx::query("SELECT * FROM summaries ORDER BY created_at DESC, id DESC")
            .fetch_all(&*self.pool)
            .await
            .map_err(db_error("Failed to list summaries"))?;
        rows.iter().map(summary_from_row).collect()
    }

    async fn insert_combined_summary(&self, summary: &NewCombinedSummary) -> Result<i64> {
        let result = sqlx::query(
            "INSERT INTO combined_summaries (date, content, created_at) VALUES (?, ?, ?)",
        )
        .bind(&summary.date)
        .bind(&summary.content)
        .bind(timestamp(&summary.created_at))
        .execute(&*self.pool)
        .await
        .map_err(db_error("Failed to store combined summary"))?;
        Ok(result.last_insert_rowid())
    }

    async fn list_combined_summaries(&self) -> Result<Vec<CombinedSummary>> {
        let rows = sqlx::query("SELECT * FROM combined_summaries ORDER BY created_at DESC, id DESC")
            .fetch_all(&*self.pool)
            .await
            .map_err(db_error("Failed to list combined summaries"))?;
        rows.iter().map(combined_from_row).collect()
    }

    async fn latest_combined_summary(&self) -> Result<Option<CombinedSummary>> {
        sqlx::query("SELECT * FROM combined_summaries ORDER BY created_at DESC, id DESC LIMIT 1")
            .fetch_optional(&*self.pool)
            .await
            .map_err(db_error("Failed to get latest combined summary"))?
            .as_ref()
            .map(combined_from_row)
            .transpose()
    }
}
