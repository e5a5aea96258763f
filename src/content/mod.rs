//! Content module - content API access, documents, and post models

mod client;
mod document;
mod post;
mod query;
pub mod rich_text;

pub use client::{ContentSource, PrismicClient};
pub use document::{ApiPage, ApiRef, ApiRoot, Banner, ContentSlice, Document, PostData};
pub use post::{ContentBlock, PostDetail, PostSummary};
pub use query::{Ordering, Predicate, Query, FIRST_PUBLICATION_DATE};
pub use rich_text::RichTextNode;
