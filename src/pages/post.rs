//! Post page: one post with its neighbours and reading time

use std::collections::HashSet;

use crate::content::{
    ContentSource, Ordering, PostDetail, PostSummary, Predicate, Query, FIRST_PUBLICATION_DATE,
};
use crate::error::ContentError;
use crate::helpers::reading_time;

/// Page size used when enumerating every post
const PATHS_PAGE_SIZE: u32 = 100;

/// Build-time props of a post page
#[derive(Debug, Clone, PartialEq)]
pub struct PostProps {
    pub post: PostDetail,

    /// Published right before this post
    pub prev_post: Option<PostSummary>,

    /// Published right after this post
    pub next_post: Option<PostSummary>,

    /// Rendered against a preview ref
    pub preview: bool,
}

impl PostProps {
    /// Reading time in minutes
    pub fn reading_time(&self, words_per_minute: u32) -> usize {
        reading_time(&self.post.content, words_per_minute)
    }
}

/// Fetch a post by slug together with its chronological neighbours
///
/// Fetches run one after the other: the post, then the next, then the previous.
pub async fn get_static_props<S: ContentSource>(
    source: &S,
    document_type: &str,
    slug: &str,
    reference: Option<&str>,
) -> Result<PostProps, ContentError> {
    let doc = source.get_by_uid(document_type, slug, reference).await?;
    let post = PostDetail::try_from(doc)?;

    let next_post = adjacent(
        source,
        document_type,
        &post.id,
        Ordering::asc(FIRST_PUBLICATION_DATE),
        reference,
    )
    .await?;
    let prev_post = adjacent(
        source,
        document_type,
        &post.id,
        Ordering::desc(FIRST_PUBLICATION_DATE),
        reference,
    )
    .await?;

    Ok(PostProps {
        post,
        prev_post,
        next_post,
        preview: reference.is_some(),
    })
}

async fn adjacent<S: ContentSource>(
    source: &S,
    document_type: &str,
    id: &str,
    ordering: Ordering,
    reference: Option<&str>,
) -> Result<Option<PostSummary>, ContentError> {
    let query = Query::new()
        .predicate(Predicate::document_type(document_type))
        .page_size(1)
        .ordering(ordering)
        .after(id)
        .reference(reference);
    let page = source.query(&query).await?;
    let Some(doc) = page.results.into_iter().next() else {
        return Ok(None);
    };
    match PostSummary::try_from(doc) {
        Ok(summary) => Ok(Some(summary)),
        Err(e) => {
            tracing::warn!("Skipping neighbour of {}: {}", id, e);
            Ok(None)
        }
    }
}

/// Every known post slug, walking all result pages
pub async fn get_static_paths<S: ContentSource>(
    source: &S,
    document_type: &str,
) -> Result<Vec<String>, ContentError> {
    let query = Query::new()
        .predicate(Predicate::document_type(document_type))
        .page_size(PATHS_PAGE_SIZE);
    let mut page = source.query(&query).await?;

    let mut slugs = Vec::new();
    let mut seen_slugs = HashSet::new();
    let mut seen_cursors = HashSet::new();

    loop {
        for doc in page.results {
            match doc.uid {
                Some(uid) => {
                    if seen_slugs.insert(uid.clone()) {
                        slugs.push(uid);
                    }
                }
                None => tracing::debug!("Skipping document {} without uid", doc.id),
            }
        }

        let Some(cursor) = page.next_page else {
            break;
        };
        if !seen_cursors.insert(cursor.clone()) {
            tracing::warn!("Content API returned a repeated cursor: {}", cursor);
            break;
        }
        page = source.fetch_page(&cursor).await?;
    }

    Ok(slugs)
}
