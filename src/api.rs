use std::sync::Arc;

use serde_json::Value;
use shuttle_axum::axum::{
    extract::{Query, State},
    http::{header, HeaderMap},
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::CorsLayer;

use crate::aggregate::{self, NewsPage, PageRequest};
use crate::error::{Error, Result};
use crate::transform::Article;
use crate::upstream::types::{FeedStore, ReadMark};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn FeedStore>,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/news", get(news))
        .route("/news/featured", get(news_featured))
        .route("/articles/mark-read", post(mark_read))
        .route("/articles/read-articles", get(read_articles))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

/// The bearer header is forwarded to the upstream store verbatim; the
/// gateway never inspects or validates the credential itself.
fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

async fn news(
    State(state): State<AppState>,
    Query(req): Query<PageRequest>,
    headers: HeaderMap,
) -> Json<NewsPage> {
    let auth = bearer(&headers);
    Json(aggregate::news_page(state.store.as_ref(), &req, auth.as_deref()).await)
}

async fn news_featured(State(state): State<AppState>, headers: HeaderMap) -> Json<Article> {
    let auth = bearer(&headers);
    Json(aggregate::featured(state.store.as_ref(), auth.as_deref()).await)
}

async fn mark_read(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(mark): Json<ReadMark>,
) -> Result<Json<Value>> {
    let auth = bearer(&headers).ok_or(Error::AuthMissing)?;
    let ack = state.store.mark_read(&auth, &mark).await?;
    Ok(Json(ack))
}

async fn read_articles(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<String>>> {
    let auth = bearer(&headers).ok_or(Error::AuthMissing)?;
    let ids = state.store.read_article_ids(&auth).await?;
    Ok(Json(ids))
}
