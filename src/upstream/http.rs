// src/upstream/http.rs
//! Reqwest-backed client for the upstream feed/read-state store.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;

use crate::config::UpstreamConfig;
use crate::error::{Error, Result};
use crate::upstream::types::{FeedItem, FeedStore, ItemQuery, ReadMark};

const ITEMS_PATH: &str = "/api/v1/rss/items";
const READ_ARTICLES_PATH: &str = "/api/v1/articles/read-articles";
const MARK_READ_PATH: &str = "/api/v1/articles/mark-read";

pub struct HttpFeedStore {
    base_url: String,
    client: reqwest::Client,
}

impl HttpFeedStore {
    pub fn new(cfg: &UpstreamConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()
            .context("building upstream http client")?;
        Ok(Self {
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

async fn rejected_from(resp: reqwest::Response) -> Error {
    let status = resp.status().as_u16();
    let body = resp.text().await.unwrap_or_default();
    Error::Rejected { status, body }
}

#[async_trait]
impl FeedStore for HttpFeedStore {
    async fn list_items(&self, query: &ItemQuery) -> Result<Vec<FeedItem>> {
        let mut params: Vec<(&str, String)> = vec![
            ("skip", query.skip.to_string()),
            ("limit", query.limit.to_string()),
        ];
        if let Some(c) = query.category.as_deref() {
            params.push(("category", c.to_string()));
        }
        if let Some(s) = query.search.as_deref() {
            params.push(("search", s.to_string()));
        }

        let resp = self
            .client
            .get(self.url(ITEMS_PATH))
            .query(&params)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(Error::Unavailable(format!(
                "item listing returned {}",
                resp.status()
            )));
        }
        Ok(resp.json().await?)
    }

    async fn read_article_ids(&self, auth: &str) -> Result<Vec<String>> {
        let resp = self
            .client
            .get(self.url(READ_ARTICLES_PATH))
            .header(AUTHORIZATION, auth)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(rejected_from(resp).await);
        }
        Ok(resp.json().await?)
    }

    async fn mark_read(&self, auth: &str, mark: &ReadMark) -> Result<serde_json::Value> {
        let resp = self
            .client
            .post(self.url(MARK_READ_PATH))
            .header(AUTHORIZATION, auth)
            .json(mark)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(rejected_from(resp).await);
        }
        Ok(resp.json().await?)
    }
}
