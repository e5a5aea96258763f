//! Post models

use chrono::{DateTime, FixedOffset};
use serde::Serialize;

use super::document::Document;
use super::rich_text::RichTextNode;
use crate::error::ContentError;
use crate::helpers::parse_api_date;

/// A post as shown in the listing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostSummary {
    /// Slug
    pub uid: String,

    /// First publication date; unset for never-published drafts
    pub first_publication_date: Option<DateTime<FixedOffset>>,

    pub title: String,
    pub subtitle: String,
    pub author: String,
}

/// A full post
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostDetail {
    /// Document id, used as the `after` anchor for adjacent posts
    pub id: String,

    pub uid: String,
    pub first_publication_date: Option<DateTime<FixedOffset>>,
    pub last_publication_date: Option<DateTime<FixedOffset>>,
    pub title: String,
    pub subtitle: String,
    pub author: String,
    pub banner_url: Option<String>,

    /// Ordered content blocks
    pub content: Vec<ContentBlock>,
}

/// A heading with its rich text body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentBlock {
    pub heading: String,
    pub body: Vec<RichTextNode>,
}

impl PostDetail {
    /// Whether the post was republished after its first publication
    pub fn is_edited(&self) -> bool {
        match self.last_publication_date {
            Some(last) => Some(last) != self.first_publication_date,
            None => false,
        }
    }

    pub fn summary(&self) -> PostSummary {
        PostSummary {
            uid: self.uid.clone(),
            first_publication_date: self.first_publication_date,
            title: self.title.clone(),
            subtitle: self.subtitle.clone(),
            author: self.author.clone(),
        }
    }
}

fn parse_optional_date(value: Option<&str>) -> Result<Option<DateTime<FixedOffset>>, ContentError> {
    value.map(parse_api_date).transpose()
}

fn require_uid(doc: &Document) -> Result<String, ContentError> {
    doc.uid.clone().ok_or_else(|| ContentError::MissingField {
        id: doc.id.clone(),
        field: "uid",
    })
}

impl TryFrom<Document> for PostSummary {
    type Error = ContentError;

    fn try_from(doc: Document) -> Result<Self, Self::Error> {
        let uid = require_uid(&doc)?;
        Ok(Self {
            uid,
            first_publication_date: parse_optional_date(doc.first_publication_date.as_deref())?,
            title: doc.data.title,
            subtitle: doc.data.subtitle,
            author: doc.data.author,
        })
    }
}

impl TryFrom<Document> for PostDetail {
    type Error = ContentError;

    fn try_from(doc: Document) -> Result<Self, Self::Error> {
        let uid = require_uid(&doc)?;
        let content = doc
            .data
            .content
            .into_iter()
            .map(|slice| ContentBlock {
                heading: slice.heading,
                body: slice.body,
            })
            .collect();

        Ok(Self {
            id: doc.id,
            uid,
            first_publication_date: parse_optional_date(doc.first_publication_date.as_deref())?,
            last_publication_date: parse_optional_date(doc.last_publication_date.as_deref())?,
            title: doc.data.title,
            subtitle: doc.data.subtitle,
            author: doc.data.author,
            banner_url: doc.data.banner.url,
            content,
        })
    }
}
