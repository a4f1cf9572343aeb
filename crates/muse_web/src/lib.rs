use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

pub mod handlers;
pub mod state;

pub use state::AppState;

/// Read-only JSON API over the article store.
///
/// Article and summary lookups take the stored file path, which may contain
/// slashes, as a wildcard segment.
pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::permissive();

    Router::new()
        .route("/api/articles", get(handlers::list_articles))
        .route("/api/articles/*path", get(handlers::get_article))
        .route("/api/summaries", get(handlers::list_summaries))
        .route("/api/summaries/*path", get(handlers::get_summary))
        .route("/api/combined-summaries", get(handlers::list_combined_summaries))
        .route("/api/latest-summary", get(handlers::latest_summary))
        .layer(cors)
        .with_state(Arc::new(state))
}

/// Bind `addr` and serve until the process is stopped.
pub async fn serve(state: AppState, addr: &str) -> muse_core::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("🌍 Serving API on http://{}", listener.local_addr()?);
    axum::serve(listener, create_app(state)).await?;
    Ok(())
}

pub mod prelude {
    pub use muse_core::{Article, Result, Error};
    pub use crate::{create_app, serve, AppState};
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use chrono::Utc;
    use muse_core::{Article, ArticleStore, NewCombinedSummary, Summary};
    use muse_storage::InMemoryStorage;
    use serde_json::Value;
    use tower::ServiceExt;

    async fn seeded() -> Router {
        let storage = Arc::new(InMemoryStorage::new());
        let path = "downloads/AJS_Review/2020/volume_12/Fall/article_101.pdf";
        storage
            .insert_article(&Article {
                file_path: path.to_string(),
                title: "The Golem and the Machine".to_string(),
                authors: "J. Rosen".to_string(),
                journal: "AJS Review".to_string(),
                download_date: Utc::now(),
                year: "2020".to_string(),
                volume: "12".to_string(),
                issue: "3".to_string(),
                journal_issue: String::new(),
            })
            .await
            .unwrap();
        storage
            .upsert_summary(&Summary {
                file_path: path.to_string(),
                summary: "A reading of the golem.".to_string(),
                markdown: None,
                created_at: Utc::now(),
            })
            .await
            .unwrap();
        create_app(AppState::new(storage))
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_list_and_lookup_by_path() {
        let app = seeded().await;
        let (status, body) = get(app.clone(), "/api/articles").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 1);

        let (status, body) =
            get(app.clone(), "/api/articles/downloads/AJS_Review/2020/volume_12/Fall/article_101.pdf").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["title"], "The Golem and the Machine");

        let (status, body) =
            get(app, "/api/summaries/downloads/AJS_Review/2020/volume_12/Fall/article_101.pdf").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["summary"], "A reading of the golem.");
    }

    #[tokio::test]
    async fn test_misses_are_404_with_error_body() {
        let app = seeded().await;
        let (status, body) = get(app.clone(), "/api/articles/downloads/nothing.pdf").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].is_string());

        let (status, _) = get(app, "/api/latest-summary").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_latest_summary() {
        let storage = Arc::new(InMemoryStorage::new());
        for content in ["first", "second"] {
            storage
                .insert_combined_summary(&NewCombinedSummary {
                    date: "October 19, 2026".to_string(),
                    content: content.to_string(),
                    created_at: Utc::now(),
                })
                .await
                .unwrap();
        }
        let app = create_app(AppState::new(storage));
        let (status, body) = get(app.clone(), "/api/latest-summary").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["content"], "second");

        let (_, body) = get(app, "/api/combined-summaries").await;
        assert_eq!(body.as_array().unwrap().len(), 2);
    }
}
