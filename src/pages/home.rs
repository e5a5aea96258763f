//! Home page: paginated post listing with a "load more" cursor

use std::collections::HashSet;

use crate::config::SiteConfig;
use crate::content::{ApiPage, ContentSource, PostSummary, Predicate, Query};
use crate::error::ContentError;

/// Post summaries accumulated so far and the cursor of the next page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Listing {
    pub posts: Vec<PostSummary>,

    /// `None` once every page has been loaded
    pub next_page: Option<String>,
}

impl Listing {
    /// Fetch the first page of posts of `document_type`
    pub async fn first_page<S: ContentSource>(
        source: &S,
        page_size: u32,
        document_type: &str,
        reference: Option<&str>,
    ) -> Result<Self, ContentError> {
        let query = Query::new()
            .predicate(Predicate::document_type(document_type))
            .page_size(page_size.max(1))
            .reference(reference);
        let page = source.query(&query).await?;
        Ok(Self::from_page(page))
    }

    /// Fetch the page a cursor points at
    pub async fn at_cursor<S: ContentSource>(source: &S, cursor: &str) -> Result<Self, ContentError> {
        let page = source.fetch_page(cursor).await?;
        Ok(Self::from_page(page))
    }

    pub fn from_page(page: ApiPage) -> Self {
        let mut listing = Self::default();
        listing.extend(page);
        listing
    }

    /// Whether the load-more action is available
    pub fn has_more(&self) -> bool {
        self.next_page.is_some()
    }

    /// Fetch the next page and append its posts; returns how many were added
    ///
    /// Does nothing once the cursor is exhausted.
    pub async fn load_more<S: ContentSource>(&mut self, source: &S) -> Result<usize, ContentError> {
        let Some(cursor) = self.next_page.clone() else {
            return Ok(0);
        };
        let page = source.fetch_page(&cursor).await?;
        Ok(self.extend(page))
    }

    /// Append a page's posts, skipping uids already listed, and take its cursor
    ///
    /// Documents that cannot be shown as a post (no uid, bad timestamp) are
    /// left out of the listing.
    pub fn extend(&mut self, page: ApiPage) -> usize {
        let mut seen: HashSet<String> = self.posts.iter().map(|p| p.uid.clone()).collect();
        let before = self.posts.len();
        for doc in page.results {
            match PostSummary::try_from(doc) {
                Ok(summary) => {
                    if seen.insert(summary.uid.clone()) {
                        self.posts.push(summary);
                    }
                }
                Err(e) => tracing::warn!("Skipping document in listing: {}", e),
            }
        }
        self.next_page = page.next_page;
        self.posts.len() - before
    }
}

/// Build-time props of the home page
#[derive(Debug, Clone, PartialEq)]
pub struct HomeProps {
    pub listing: Listing,

    /// Rendered against a preview ref
    pub preview: bool,
}

pub async fn get_static_props<S: ContentSource>(
    source: &S,
    config: &SiteConfig,
    reference: Option<&str>,
) -> Result<HomeProps, ContentError> {
    let listing = Listing::first_page(
        source,
        config.home.page_size,
        &config.content_api.document_type,
        reference,
    )
    .await?;
    tracing::debug!(
        "Home listing: {} posts, more: {}",
        listing.posts.len(),
        listing.has_more()
    );

    Ok(HomeProps {
        listing,
        preview: reference.is_some(),
    })
}
