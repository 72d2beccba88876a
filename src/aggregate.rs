// src/aggregate.rs
//! Orchestrates the read pipeline: read-state lookup, over-fetched item
//! window, per-item transform, read filtering, pagination. Content-read
//! paths never fail visibly; they degrade to fallback payloads.

use std::collections::HashSet;

use chrono::Utc;
use metrics::{counter, describe_counter};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::transform::{
    transform_item, transform_item_with_placeholder, Article, FEATURED_IMAGE_PLACEHOLDER,
    LIST_IMAGE_PLACEHOLDER,
};
use crate::upstream::types::{FeedStore, ItemQuery};

/// Extra items requested beyond the page size, on top of the caller's
/// read count. Filtering happens after the fetch; the store knows
/// nothing about per-user read state, so enough extra must be requested
/// to still fill a page after removal. A heuristic, not a guarantee.
pub const OVERFETCH_MARGIN: usize = 20;

/// Candidate window inspected when picking the featured article.
pub const FEATURED_WINDOW: usize = 10;

/// Id of the static placeholder served when no featured pick exists.
pub const FEATURED_FALLBACK_ID: &str = "no-featured";

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "news_upstream_errors_total",
            "Upstream fetch failures swallowed into degraded responses."
        );
        describe_counter!(
            "news_items_malformed_total",
            "Feed items skipped because transformation failed."
        );
        describe_counter!(
            "news_read_filtered_total",
            "Articles dropped because the caller already read them."
        );
        describe_counter!(
            "featured_fallback_total",
            "Featured requests answered with the static placeholder."
        );
    });
}

#[derive(Debug, Clone, Deserialize)]
pub struct PageRequest {
    pub category: Option<String>,
    pub search: Option<String>,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> usize {
    10
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            category: None,
            search: None,
            page: default_page(),
            limit: default_limit(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsPage {
    pub articles: Vec<Article>,
    pub total_count: usize,
    /// Approximation: true iff a full page came back. There is no
    /// authoritative upstream total.
    pub has_more: bool,
    pub current_page: u32,
}

/// Read-state lookup that never raises: no credential, a rejected
/// credential, or an unreachable store all degrade to "nothing read".
/// Worst case the caller re-sees an already-read item.
pub async fn read_ids_or_empty(store: &dyn FeedStore, auth: Option<&str>) -> HashSet<String> {
    let Some(auth) = auth else {
        return HashSet::new();
    };
    match store.read_article_ids(auth).await {
        Ok(ids) => ids.into_iter().collect(),
        Err(e) => {
            warn!(error = %e, "read-state lookup failed, treating all items as unread");
            counter!("news_upstream_errors_total").increment(1);
            HashSet::new()
        }
    }
}

/// Build one page of articles for the caller.
pub async fn news_page(store: &dyn FeedStore, req: &PageRequest, auth: Option<&str>) -> NewsPage {
    ensure_metrics_described();

    let page = req.page.max(1);
    let limit = req.limit.max(1);

    let read_ids = read_ids_or_empty(store, auth).await;

    let fetch_limit = limit + read_ids.len() + OVERFETCH_MARGIN;
    let query = ItemQuery {
        // "all" is the caller's sentinel for no category filter.
        category: req
            .category
            .as_deref()
            .filter(|c| *c != "all")
            .map(str::to_string),
        search: req.search.clone(),
        skip: (page as usize - 1) * limit,
        limit: fetch_limit,
    };

    let items = match store.list_items(&query).await {
        Ok(items) => items,
        Err(e) => {
            warn!(error = %e, "item listing failed, serving fallback page");
            counter!("news_upstream_errors_total").increment(1);
            return fallback_page();
        }
    };

    let mut articles: Vec<Article> = Vec::with_capacity(items.len());
    for item in &items {
        match transform_item(item) {
            Ok(a) => articles.push(a),
            Err(e) => {
                warn!(error = %e, title = %item.title, "skipping malformed feed item");
                counter!("news_items_malformed_total").increment(1);
            }
        }
    }

    if auth.is_some() && !read_ids.is_empty() {
        let before = articles.len();
        articles.retain(|a| !read_ids.contains(&a.id));
        counter!("news_read_filtered_total").increment((before - articles.len()) as u64);
    }

    articles.truncate(limit);

    // Fewer than `limit` after an insufficient over-fetch margin
    // under-reports availability rather than risking a retry loop.
    NewsPage {
        total_count: articles.len(),
        has_more: articles.len() == limit,
        current_page: page,
        articles,
    }
}

/// Pick the single featured article: the most recent unread item from a
/// small window, the most recent overall if everything is read, or a
/// static placeholder if the store is unreachable or empty.
pub async fn featured(store: &dyn FeedStore, auth: Option<&str>) -> Article {
    ensure_metrics_described();

    let query = ItemQuery {
        category: None,
        search: None,
        skip: 0,
        limit: FEATURED_WINDOW,
    };
    // No data dependency between the two lookups; issue them together.
    let (read_ids, items) = tokio::join!(
        read_ids_or_empty(store, auth),
        store.list_items(&query)
    );

    let items = match items {
        Ok(items) if !items.is_empty() => items,
        Ok(_) => {
            warn!("item listing empty, serving featured placeholder");
            counter!("featured_fallback_total").increment(1);
            return featured_placeholder();
        }
        Err(e) => {
            warn!(error = %e, "item listing failed, serving featured placeholder");
            counter!("news_upstream_errors_total").increment(1);
            counter!("featured_fallback_total").increment(1);
            return featured_placeholder();
        }
    };

    let candidates: Vec<Article> = items
        .iter()
        .filter_map(|item| {
            match transform_item_with_placeholder(item, FEATURED_IMAGE_PLACEHOLDER) {
                Ok(a) => Some(a),
                Err(e) => {
                    warn!(error = %e, title = %item.title, "skipping malformed feed item");
                    counter!("news_items_malformed_total").increment(1);
                    None
                }
            }
        })
        .collect();

    let Some(first) = candidates.first() else {
        counter!("featured_fallback_total").increment(1);
        return featured_placeholder();
    };

    // Items arrive newest first, so the first unread candidate is the
    // most recent unread. A fully-read window still yields a pick: the
    // featured slot is never empty purely due to read state.
    let mut pick = candidates
        .iter()
        .find(|a| !read_ids.contains(&a.id))
        .unwrap_or(first)
        .clone();
    pick.featured = true;
    pick
}

/// Served when the upstream store is unreachable. The UI never sees a
/// hard error for content listing.
fn fallback_page() -> NewsPage {
    let article = Article {
        id: "1".to_string(),
        title: "Upstream Store Unreachable - Showing Fallback Item".to_string(),
        description: "Could not connect to the content store. Check that the upstream feed \
                      service is running."
            .to_string(),
        content: "To resolve this issue, ensure the upstream feed store is reachable at its \
                  configured base URL."
            .to_string(),
        image_url: LIST_IMAGE_PLACEHOLDER.to_string(),
        category: "System".to_string(),
        source: "Gateway".to_string(),
        published_at: Utc::now(),
        read_time: "1 min read".to_string(),
        trending: false,
        featured: true,
        link: String::new(),
    };
    NewsPage {
        total_count: 1,
        has_more: false,
        current_page: 1,
        articles: vec![article],
    }
}

/// Terminal, never-throwing fallback for the featured slot, directing
/// the caller to configure content sources.
pub fn featured_placeholder() -> Article {
    Article {
        id: FEATURED_FALLBACK_ID.to_string(),
        title: "No Featured Article Available".to_string(),
        description: "Connect syndication feeds to see featured articles here. Go to Settings \
                      to add feeds."
            .to_string(),
        content: "To see featured articles, please add syndication feeds in the Settings page. \
                  The most recent article from your feeds will appear here."
            .to_string(),
        image_url: FEATURED_IMAGE_PLACEHOLDER.to_string(),
        category: "System".to_string(),
        source: "Dashboard".to_string(),
        published_at: Utc::now(),
        read_time: "1 min read".to_string(),
        trending: false,
        featured: true,
        link: "/settings".to_string(),
    }
}
