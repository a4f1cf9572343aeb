use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use muse_core::{Article, CombinedSummary, Error, Summary};
use crate::AppState;

/// Maps store errors onto HTTP responses with a JSON `error` body.
pub struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            _ => {
                tracing::error!("Request failed: {}", self.0);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

type ApiResult<T> = std::result::Result<Json<T>, ApiError>;

fn found<T>(value: Option<T>, what: &str) -> ApiResult<T> {
    value
        .map(Json)
        .ok_or_else(|| ApiError(Error::NotFound(what.to_string())))
}

pub async fn list_articles(State(state): State<Arc<AppState>>) -> ApiResult<Vec<Article>> {
    Ok(Json(state.storage.list_articles().await?))
}

pub async fn get_article(
    State(state): State<Arc<AppState>>,
    Path(path): Path<String>,
) -> ApiResult<Article> {
    let article = state.storage.get_article(&path).await?;
    found(article, &format!("article {}", path))
}

pub async fn list_summaries(State(state): State<Arc<AppState>>) -> ApiResult<Vec<Summary>> {
    Ok(Json(state.storage.list_summaries().await?))
}

pub async fn get_summary(
    State(state): State<Arc<AppState>>,
    Path(path): Path<String>,
) -> ApiResult<Summary> {
    let summary = state.storage.get_summary(&path).await?;
    found(summary, &format!("summary for {}", path))
}

pub async fn list_combined_summaries(State(state): State<Arc<AppState>>) -> ApiResult<Vec<CombinedSummary>> {
    Ok(Json(state.storage.list_combined_summaries().await?))
}

pub async fn latest_summary(State(state): State<Arc<AppState>>) -> ApiResult<CombinedSummary> {
    let latest = state.storage.latest_combined_summary().await?;
    found(latest, "combined summary")
}
