//! Content API client
//!
//! `ContentSource` is the seam between page assembly and the headless CMS.
//! `PrismicClient` implements it over the REST API with `reqwest`.

use serde::de::DeserializeOwned;
use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::{Duration, Instant};

use super::document::{ApiPage, ApiRoot, Document};
use super::query::{Predicate, Query};
use crate::config::ContentApiConfig;
use crate::error::ContentError;

/// Read access to published (or previewed) documents
pub trait ContentSource: Send + Sync {
    /// Run a search
    fn query(&self, query: &Query) -> impl Future<Output = Result<ApiPage, ContentError>> + Send;

    /// Fetch the page a previous response pointed at with `next_page`
    fn fetch_page(&self, cursor: &str) -> impl Future<Output = Result<ApiPage, ContentError>> + Send;

    /// Fetch one document by uid
    fn get_by_uid(
        &self,
        doc_type: &str,
        uid: &str,
        reference: Option<&str>,
    ) -> impl Future<Output = Result<Document, ContentError>> + Send {
        let query = Query::new()
            .predicate(Predicate::uid(doc_type, uid))
            .page_size(1)
            .reference(reference);
        let uid = uid.to_string();
        async move {
            let page = self.query(&query).await?;
            page.results
                .into_iter()
                .next()
                .ok_or(ContentError::NotFound(uid))
        }
    }
}

/// REST client for a Prismic-style content API
#[derive(Clone)]
pub struct PrismicClient {
    http: reqwest::Client,
    endpoint: String,
    access_token: Option<String>,
    master_ref: Arc<RwLock<Option<CachedRef>>>,
    master_ref_ttl: Duration,
}

#[derive(Debug, Clone)]
struct CachedRef {
    value: String,
    fetched_at: Instant,
}

impl PrismicClient {
    pub fn new(config: &ContentApiConfig) -> Result<Self, ContentError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .user_agent(concat!("spacetraveling/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            access_token: config.access_token.clone().filter(|t| !t.is_empty()),
            master_ref: Arc::new(RwLock::new(None)),
            master_ref_ttl: Duration::from_secs(config.master_ref_ttl_secs),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Ref of the published content, reused for the configured TTL
    pub async fn master_ref(&self) -> Result<String, ContentError> {
        if let Some(cached) = self.cached_master_ref() {
            return Ok(cached);
        }

        let root: ApiRoot = self.get_json(&self.endpoint, &self.token_params()).await?;
        let value = root
            .master_ref()
            .map(str::to_string)
            .ok_or(ContentError::NoMasterRef)?;

        if !self.master_ref_ttl.is_zero() {
            *self.master_ref.write().unwrap_or_else(PoisonError::into_inner) = Some(CachedRef {
                value: value.clone(),
                fetched_at: Instant::now(),
            });
        }
        Ok(value)
    }

    fn cached_master_ref(&self) -> Option<String> {
        let cached = self.master_ref.read().unwrap_or_else(PoisonError::into_inner);
        cached
            .as_ref()
            .filter(|c| c.fetched_at.elapsed() < self.master_ref_ttl)
            .map(|c| c.value.clone())
    }

    /// Whether `cursor` points into this API
    pub fn owns_cursor(&self, cursor: &str) -> bool {
        match cursor.strip_prefix(self.endpoint.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with('/') || rest.starts_with('?'),
            None => false,
        }
    }

    fn token_params(&self) -> Vec<(&'static str, String)> {
        match self.access_token {
            Some(ref token) => vec![("access_token", token.clone())],
            None => Vec::new(),
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        params: &[(&'static str, String)],
    ) -> Result<T, ContentError> {
        tracing::debug!("GET {}", url);
        let response = self.http.get(url).query(params).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ContentError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(response.json::<T>().await?)
    }
}

impl ContentSource for PrismicClient {
    async fn query(&self, query: &Query) -> Result<ApiPage, ContentError> {
        let reference = match query.reference {
            Some(ref reference) => reference.clone(),
            None => self.master_ref().await?,
        };

        let mut params = vec![("ref", reference)];
        params.extend(query.params());
        params.extend(self.token_params());

        let url = format!("{}/documents/search", self.endpoint);
        self.get_json(&url, &params).await
    }

    async fn fetch_page(&self, cursor: &str) -> Result<ApiPage, ContentError> {
        if !self.owns_cursor(cursor) {
            return Err(ContentError::InvalidCursor(cursor.to_string()));
        }
        self.get_json(cursor, &[]).await
    }
}
