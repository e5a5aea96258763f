//! Data structures for template context
//!
//! Everything here is display-ready: dates are formatted, links are built and
//! rich text is already HTML.

use serde::Serialize;
use std::collections::HashMap;

use crate::helpers::{encode_query_value, post_path};

#[derive(Debug, Clone, Serialize)]
pub struct SiteView {
    pub title: String,
    pub description: String,
    pub language: String,
    pub url: String,
}

/// A post in the listing, also the item type of the load-more JSON
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryView {
    pub uid: String,
    pub title: String,
    pub subtitle: String,
    pub author: String,

    /// Formatted for display, empty for drafts
    pub first_publication_date: String,

    /// ISO 8601, for `datetime` attributes
    pub datetime: Option<String>,

    pub href: String,
}

/// Body of a load-more response
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadMoreResponse {
    pub results: Vec<SummaryView>,

    /// Link to the following page, `null` when there is none
    pub next_page: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HomeView {
    pub posts: Vec<SummaryView>,
    pub next_page: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NavView {
    pub title: String,
    pub href: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct EditedView {
    pub date: String,
    pub time: String,
    pub datetime: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct BlockView {
    pub heading: String,
    pub html: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostView {
    pub uid: String,
    pub title: String,
    pub subtitle: String,
    pub author: String,
    pub banner_url: Option<String>,
    pub first_publication_date: String,
    pub datetime: Option<String>,
    pub reading_time: usize,
    pub edited: Option<EditedView>,

    /// Plain text of the first content block
    pub excerpt: String,

    pub content: Vec<BlockView>,
    pub prev_post: Option<NavView>,
    pub next_post: Option<NavView>,
    pub canonical_url: String,
}

impl NavView {
    pub fn new(uid: &str, title: &str) -> Self {
        Self {
            title: title.to_string(),
            href: post_path(uid),
        }
    }
}

/// How content API cursors are exposed to the browser
#[derive(Debug, Clone)]
pub enum CursorLinks {
    /// Through the server's load-more endpoint
    Api,

    /// Through pre-generated JSON files; cursors missing from the map get no link
    Static(HashMap<String, String>),
}

impl CursorLinks {
    pub fn link(&self, cursor: Option<&str>) -> Option<String> {
        let cursor = cursor?;
        match self {
            CursorLinks::Api => Some(format!("/api/posts?cursor={}", encode_query_value(cursor))),
            CursorLinks::Static(links) => links.get(cursor).cloned(),
        }
    }
}
