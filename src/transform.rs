// src/transform.rs
//! Maps raw upstream feed items into the caller-facing article shape:
//! identity assignment, description truncation, inline-image extraction,
//! source-name derivation, read-time estimation.

use chrono::{DateTime, Utc};
use once_cell::sync::OnceCell;
use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Error, Result};
use crate::identity::derive_article_id;
use crate::upstream::types::FeedItem;

pub const LIST_IMAGE_PLACEHOLDER: &str = "/placeholder.svg?height=400&width=600";
pub const FEATURED_IMAGE_PLACEHOLDER: &str = "/placeholder.svg?height=500&width=800";

const DESCRIPTION_MAX_CHARS: usize = 200;
const WORDS_PER_MINUTE: usize = 200;
const DEFAULT_CATEGORY: &str = "General";

/// Caller-facing content record. Built fresh per request, never
/// persisted by this pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: String,
    pub title: String,
    pub description: String,
    pub content: String,
    pub image_url: String,
    pub category: String,
    pub source: String,
    pub published_at: DateTime<Utc>,
    pub read_time: String,
    /// Reserved, currently always false.
    pub trending: bool,
    pub featured: bool,
    pub link: String,
}

pub fn transform_item(item: &FeedItem) -> Result<Article> {
    transform_item_with_placeholder(item, LIST_IMAGE_PLACEHOLDER)
}

/// Transform one raw item. An unparseable link fails the whole item;
/// callers skip it rather than abort the page.
pub fn transform_item_with_placeholder(item: &FeedItem, placeholder: &str) -> Result<Article> {
    let source = source_host(&item.link)?;

    let id = item
        .id
        .as_ref()
        .map(|i| i.as_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| derive_article_id(&item.title, &item.link));

    // The image is pulled from the raw description HTML before the
    // description itself is reduced to plain text.
    let image_url = item
        .description
        .as_deref()
        .and_then(extract_image_src)
        .unwrap_or_else(|| placeholder.to_string());

    // An empty upstream description counts as missing.
    let description = match item.description.as_deref().filter(|d| !d.is_empty()) {
        Some(html) => clip_description(&strip_html(html)),
        None => format!("{}...", truncate_chars(&item.content, DESCRIPTION_MAX_CHARS)),
    };

    Ok(Article {
        id,
        title: item.title.clone(),
        description,
        content: item.content.clone(),
        image_url,
        category: item
            .category
            .clone()
            .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
        source,
        published_at: item.published.unwrap_or_else(Utc::now),
        read_time: read_time(&item.content),
        trending: false,
        featured: false,
        link: item.link.clone(),
    })
}

/// Hostname of `link` with a leading `www.` stripped.
fn source_host(link: &str) -> Result<String> {
    let url =
        Url::parse(link).map_err(|e| Error::MalformedItem(format!("bad link '{link}': {e}")))?;
    let host = url
        .host_str()
        .ok_or_else(|| Error::MalformedItem(format!("link '{link}' has no host")))?;
    Ok(host.strip_prefix("www.").unwrap_or(host).to_string())
}

/// First `src` attribute inside an `<img>` tag of the raw description
/// HTML.
fn extract_image_src(html: &str) -> Option<String> {
    static RE_IMG: OnceCell<Regex> = OnceCell::new();
    let re = RE_IMG.get_or_init(|| Regex::new(r#"(?is)<img[^>]+src="([^">]+)""#).unwrap());
    re.captures(html).map(|c| c[1].to_string())
}

/// Entity-decode, drop tags, collapse whitespace. Keeps the description
/// safe to render as plain text.
fn strip_html(s: &str) -> String {
    static RE_TAGS: OnceCell<Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| Regex::new(r"(?is)</?[^>]+>").unwrap());
    static RE_WS: OnceCell<Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| Regex::new(r"\s+").unwrap());

    let decoded = html_escape::decode_html_entities(s).to_string();
    let untagged = re_tags.replace_all(&decoded, " ").to_string();
    let collapsed = re_ws.replace_all(&untagged, " ").to_string();
    collapsed.trim().to_string()
}

fn clip_description(text: &str) -> String {
    if text.chars().count() > DESCRIPTION_MAX_CHARS {
        format!("{}...", truncate_chars(text, DESCRIPTION_MAX_CHARS))
    } else {
        text.to_string()
    }
}

fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

/// `ceil(words / 200)` minutes, never less than one.
fn read_time(content: &str) -> String {
    let words = content.split_whitespace().count();
    let minutes = words.div_ceil(WORDS_PER_MINUTE).max(1);
    format!("{minutes} min read")
}
