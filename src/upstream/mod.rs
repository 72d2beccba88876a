// src/upstream/mod.rs
pub mod http;
pub mod types;

pub use http::HttpFeedStore;
pub use types::{FeedItem, FeedStore, ItemId, ItemQuery, ReadMark};
