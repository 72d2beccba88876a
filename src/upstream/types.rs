// src/upstream/types.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Upstream row id. The store assigns integer ids to persisted rows;
/// items sourced straight from a syndication URL arrive without one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemId {
    Num(i64),
    Str(String),
}

impl ItemId {
    pub fn as_string(&self) -> String {
        match self {
            ItemId::Num(n) => n.to_string(),
            ItemId::Str(s) => s.clone(),
        }
    }
}

/// Raw content record as returned by the upstream store. Owned by the
/// store; read-only here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedItem {
    #[serde(default)]
    pub id: Option<ItemId>,
    pub title: String,
    pub link: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub published: Option<DateTime<Utc>>,
}

/// One (user, article) "consumed" fact, persisted upstream. The user is
/// implied by the credential the write is made with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadMark {
    pub article_id: String,
    pub article_title: String,
    pub article_link: String,
}

/// Listing window requested from the upstream store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemQuery {
    pub category: Option<String>,
    pub search: Option<String>,
    pub skip: usize,
    pub limit: usize,
}

/// The upstream feed/read-state store, seen through the three
/// capabilities the read pipeline consumes.
#[async_trait::async_trait]
pub trait FeedStore: Send + Sync {
    /// Fetch one window of raw items, newest first. No internal retry;
    /// retries are the caller's responsibility.
    async fn list_items(&self, query: &ItemQuery) -> Result<Vec<FeedItem>>;

    /// Ids already marked read by the caller behind `auth`.
    async fn read_article_ids(&self, auth: &str) -> Result<Vec<String>>;

    /// Persist a read mark; returns the upstream ack body verbatim.
    /// Idempotent from the caller's perspective (the store answers an
    /// already-marked item with the existing row).
    async fn mark_read(&self, auth: &str, mark: &ReadMark) -> Result<serde_json::Value>;
}
