// tests/common/mod.rs
//
// Shared in-memory stand-in for the upstream feed/read-state store,
// used by the router- and pipeline-level tests.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use serde_json::json;

use news_gateway::error::{Error, Result};
use news_gateway::upstream::types::{FeedItem, FeedStore, ItemId, ItemQuery, ReadMark};

#[derive(Default)]
pub struct StubStore {
    pub items: Vec<FeedItem>,
    /// Read ids per known credential. A credential absent from the map
    /// is rejected with 401, mirroring the upstream's token check.
    pub read: Mutex<HashMap<String, HashSet<String>>>,
    /// Every listing window the pipeline asked for, in order.
    pub queries: Mutex<Vec<ItemQuery>>,
    pub fail_items: bool,
    pub fail_read_state: bool,
}

impl StubStore {
    pub fn with_items(items: Vec<FeedItem>) -> Self {
        Self {
            items,
            ..Default::default()
        }
    }

    /// Register a credential the stub will accept.
    pub fn grant(&self, auth: &str) {
        self.read
            .lock()
            .unwrap()
            .entry(auth.to_string())
            .or_default();
    }

    pub fn mark(&self, auth: &str, id: &str) {
        self.read
            .lock()
            .unwrap()
            .entry(auth.to_string())
            .or_default()
            .insert(id.to_string());
    }

    pub fn last_query(&self) -> Option<ItemQuery> {
        self.queries.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl FeedStore for StubStore {
    async fn list_items(&self, query: &ItemQuery) -> Result<Vec<FeedItem>> {
        self.queries.lock().unwrap().push(query.clone());
        if self.fail_items {
            return Err(Error::Unavailable("stub store offline".into()));
        }
        let filtered = self
            .items
            .iter()
            .filter(|it| {
                query
                    .category
                    .as_deref()
                    .map_or(true, |c| it.category.as_deref() == Some(c))
            })
            .filter(|it| {
                query
                    .search
                    .as_deref()
                    .map_or(true, |s| it.title.contains(s) || it.content.contains(s))
            })
            .skip(query.skip)
            .take(query.limit)
            .cloned()
            .collect();
        Ok(filtered)
    }

    async fn read_article_ids(&self, auth: &str) -> Result<Vec<String>> {
        if self.fail_read_state {
            return Err(Error::Unavailable("stub store offline".into()));
        }
        let read = self.read.lock().unwrap();
        match read.get(auth) {
            Some(ids) => Ok(ids.iter().cloned().collect()),
            None => Err(Error::Rejected {
                status: 401,
                body: "Could not validate credentials".into(),
            }),
        }
    }

    async fn mark_read(&self, auth: &str, mark: &ReadMark) -> Result<serde_json::Value> {
        let mut read = self.read.lock().unwrap();
        let Some(ids) = read.get_mut(auth) else {
            return Err(Error::Rejected {
                status: 401,
                body: "Could not validate credentials".into(),
            });
        };
        ids.insert(mark.article_id.clone());
        Ok(json!({
            "article_id": mark.article_id,
            "article_title": mark.article_title,
            "article_link": mark.article_link,
        }))
    }
}

/// One feed item the way the upstream store would serialize it. Items
/// are handed out newest first, so lower ids get later timestamps.
pub fn item(id: i64, title: &str) -> FeedItem {
    let base = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).single().unwrap();
    FeedItem {
        id: Some(ItemId::Num(id)),
        title: title.to_string(),
        link: format!("https://www.example.com/articles/{id}"),
        content: "Body text for the test item, short enough for one minute.".to_string(),
        description: None,
        category: Some("Tech".to_string()),
        published: Some(base - Duration::minutes(id)),
    }
}

pub fn items(n: usize) -> Vec<FeedItem> {
    (1..=n as i64).map(|i| item(i, &format!("Story {i}"))).collect()
}
