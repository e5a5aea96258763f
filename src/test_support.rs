//! In-memory content source and fixtures shared by unit tests

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering as AtomicOrdering};
use std::sync::Mutex;
use std::time::Duration;

use crate::content::{
    ApiPage, Banner, ContentSlice, ContentSource, Document, PostData, Predicate, Query,
    RichTextNode, FIRST_PUBLICATION_DATE,
};
use crate::error::ContentError;

/// Ref under which drafts become visible
pub const PREVIEW_REF: &str = "preview";

const CURSOR_PREFIX: &str = "mem://search?";

/// Emulates the content API search over a fixed set of documents
#[derive(Default)]
pub struct InMemorySource {
    published: Vec<Document>,
    drafts: Vec<Document>,
    queries: Mutex<Vec<Query>>,
    calls: AtomicUsize,
    failing: AtomicBool,
    delay: Option<Duration>,
}

impl InMemorySource {
    pub fn new(published: Vec<Document>) -> Self {
        Self {
            published,
            ..Self::default()
        }
    }

    pub fn with_drafts(mut self, drafts: Vec<Document>) -> Self {
        self.drafts = drafts;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Make every following call fail with a 503
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, AtomicOrdering::SeqCst);
    }

    /// Number of `query` and `fetch_page` calls so far
    pub fn calls(&self) -> usize {
        self.calls.load(AtomicOrdering::SeqCst)
    }

    async fn enter(&self) -> Result<(), ContentError> {
        self.calls.fetch_add(1, AtomicOrdering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.load(AtomicOrdering::SeqCst) {
            return Err(ContentError::Status {
                status: 503,
                url: "mem://search".to_string(),
            });
        }
        Ok(())
    }

    fn search(&self, query: &Query) -> ApiPage {
        let mut docs: Vec<&Document> = self.published.iter().collect();
        if query.reference.as_deref() == Some(PREVIEW_REF) {
            docs.extend(self.drafts.iter());
        }
        docs.retain(|doc| query.predicates.iter().all(|p| matches(p, doc)));

        if let Some(ordering) = query.orderings.first() {
            if ordering.field == FIRST_PUBLICATION_DATE {
                docs.sort_by(|a, b| {
                    let (a, b) = (&a.first_publication_date, &b.first_publication_date);
                    let ord = match (a, b) {
                        (Some(a), Some(b)) => a.cmp(b),
                        (Some(_), None) => std::cmp::Ordering::Less,
                        (None, Some(_)) => std::cmp::Ordering::Greater,
                        (None, None) => std::cmp::Ordering::Equal,
                    };
                    if ordering.descending {
                        ord.reverse()
                    } else {
                        ord
                    }
                });
            }
        }

        if let Some(ref after) = query.after {
            if let Some(pos) = docs.iter().position(|doc| &doc.id == after) {
                docs.drain(..=pos);
            }
        }

        let page_size = query.page_size.unwrap_or(20).max(1) as usize;
        let page = query.page.unwrap_or(1).max(1) as usize;
        let total = docs.len();
        let total_pages = total.div_ceil(page_size).max(1);
        let results: Vec<Document> = docs
            .into_iter()
            .skip((page - 1) * page_size)
            .take(page_size)
            .cloned()
            .collect();

        let next_page = if page < total_pages {
            Some(self.cursor_for(query.clone().page(page as u32 + 1)))
        } else {
            None
        };

        ApiPage {
            page: page as u32,
            results_per_page: page_size as u32,
            results_size: results.len() as u32,
            total_results_size: total as u32,
            total_pages: total_pages as u32,
            next_page,
            prev_page: None,
            results,
        }
    }

    fn cursor_for(&self, query: Query) -> String {
        let mut queries = self.queries.lock().unwrap();
        queries.push(query);
        format!("{}id={}", CURSOR_PREFIX, queries.len() - 1)
    }
}

fn matches(predicate: &Predicate, doc: &Document) -> bool {
    match predicate {
        Predicate::At { path, value } => {
            if path == "document.type" {
                return &doc.doc_type == value;
            }
            match path
                .strip_prefix("my.")
                .and_then(|rest| rest.strip_suffix(".uid"))
            {
                Some(doc_type) => doc.doc_type == doc_type && doc.uid.as_deref() == Some(value),
                None => false,
            }
        }
    }
}

impl ContentSource for InMemorySource {
    async fn query(&self, query: &Query) -> Result<ApiPage, ContentError> {
        self.enter().await?;
        Ok(self.search(query))
    }

    async fn fetch_page(&self, cursor: &str) -> Result<ApiPage, ContentError> {
        self.enter().await?;
        let query = cursor
            .strip_prefix(CURSOR_PREFIX)
            .and_then(|rest| rest.strip_prefix("id="))
            .and_then(|id| id.parse::<usize>().ok())
            .and_then(|id| self.queries.lock().unwrap().get(id).cloned())
            .ok_or_else(|| ContentError::InvalidCursor(cursor.to_string()))?;
        Ok(self.search(&query))
    }
}

/// A published post fixture; `day` picks the March 2021 publication day
pub fn post_doc(id: &str, uid: &str, day: u32) -> Document {
    let date = format!("2021-03-{:02}T19:25:28+0000", day);
    Document {
        id: id.to_string(),
        uid: Some(uid.to_string()),
        doc_type: "posts".to_string(),
        first_publication_date: Some(date.clone()),
        last_publication_date: Some(date),
        data: PostData {
            title: format!("Title of {}", uid),
            subtitle: format!("Subtitle of {}", uid),
            author: "Joseph Oliveira".to_string(),
            banner: Banner {
                url: Some(format!("https://images.prismic.io/{}.png", uid)),
                alt: None,
            },
            content: vec![ContentSlice {
                heading: "Proin et varius".to_string(),
                body: vec![RichTextNode::paragraph("Lorem ipsum dolor sit amet")],
            }],
        },
    }
}

/// A draft fixture that was never published
pub fn draft_doc(id: &str, uid: &str) -> Document {
    let mut doc = post_doc(id, uid, 1);
    doc.first_publication_date = None;
    doc.last_publication_date = None;
    doc
}

/// `count` posts published on consecutive days, uids `post-1`..
///
/// Dates are only valid for `count <= 31`.
pub fn posts(count: u32) -> Vec<Document> {
    (1..=count)
        .map(|i| post_doc(&format!("id{}", i), &format!("post-{}", i), i))
        .collect()
}
