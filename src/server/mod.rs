//! HTTP server with incremental regeneration
//!
//! Pages are rendered from the content API and kept in a [`PageCache`]. The
//! home page is regenerated in the background once its revalidation interval
//! has passed; post pages that were not pre-rendered are built on first
//! request while concurrent requests get the loading page.

use anyhow::Result;
use axum::{
    body::{Body, Bytes},
    extract::{Path, Query, State},
    http::{header, HeaderMap, HeaderValue, Request, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::cache::{Lookup, PageCache};
use crate::content::{ContentSource, PrismicClient};
use crate::error::PageError;
use crate::helpers::{decode_component, is_valid_slug, post_path};
use crate::pages::{self, get_static_paths, Listing};
use crate::templates::{CursorLinks, SiteRenderer, LOAD_MORE_JS, STYLE_CSS};
use crate::Spacetraveling;

const HOME_KEY: &str = "/";

/// Shared server state
pub struct AppState<S> {
    source: Arc<S>,
    renderer: Arc<SiteRenderer>,
    cache: Arc<PageCache>,
    public_dir: PathBuf,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            renderer: Arc::clone(&self.renderer),
            cache: Arc::clone(&self.cache),
            public_dir: self.public_dir.clone(),
        }
    }
}

/// Pages rendered before the server starts accepting requests
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrerenderReport {
    pub home: bool,
    pub posts: usize,
    pub failed: usize,
}

impl<S: ContentSource + 'static> AppState<S> {
    pub fn new(source: S, renderer: SiteRenderer, public_dir: PathBuf) -> Self {
        Self {
            source: Arc::new(source),
            renderer: Arc::new(renderer),
            cache: Arc::new(PageCache::new()),
            public_dir,
        }
    }

    fn home_revalidate(&self) -> Option<Duration> {
        Some(Duration::from_secs(self.renderer.config().home.revalidate))
    }

    fn post_revalidate(&self) -> Option<Duration> {
        self.renderer.config().post.revalidate.map(Duration::from_secs)
    }

    fn document_type(&self) -> &str {
        &self.renderer.config().content_api.document_type
    }

    async fn build_home(&self, reference: Option<&str>) -> Result<String, PageError> {
        let props = pages::home::get_static_props(&*self.source, self.renderer.config(), reference)
            .await?;
        self.renderer.render_home(&props, &CursorLinks::Api)
    }

    async fn build_post(&self, slug: &str, reference: Option<&str>) -> Result<String, PageError> {
        let props =
            pages::post::get_static_props(&*self.source, self.document_type(), slug, reference)
                .await?;
        self.renderer.render_post(&props)
    }

    /// Render the home page and every known post into the cache
    pub async fn prerender(&self) -> PrerenderReport {
        let mut report = PrerenderReport::default();

        match self.build_home(None).await {
            Ok(html) => {
                self.cache.insert(HOME_KEY, html, self.home_revalidate());
                report.home = true;
            }
            Err(e) => tracing::warn!("Failed to pre-render /: {}", e),
        }

        let slugs = match get_static_paths(&*self.source, self.document_type()).await {
            Ok(slugs) => slugs,
            Err(e) => {
                tracing::warn!("Failed to enumerate posts: {}", e);
                return report;
            }
        };

        for slug in slugs {
            match self.build_post(&slug, None).await {
                Ok(html) => {
                    self.cache.insert(&post_path(&slug), html, self.post_revalidate());
                    report.posts += 1;
                }
                Err(e) => {
                    tracing::warn!("Failed to pre-render post {}: {}", slug, e);
                    report.failed += 1;
                }
            }
        }

        report
    }

    /// Regenerate the home page in the background, unless already running
    fn spawn_home_regeneration(&self) {
        let Some(guard) = self.cache.begin_build(HOME_KEY) else {
            return;
        };
        let state = self.clone();
        tokio::spawn(async move {
            match state.build_home(None).await {
                Ok(html) => {
                    guard.finish(html, state.home_revalidate());
                    tracing::info!("Regenerated {}", HOME_KEY);
                }
                Err(e) => {
                    tracing::warn!("Failed to regenerate {}, serving stale page: {}", HOME_KEY, e)
                }
            }
        });
    }

    fn spawn_post_regeneration(&self, slug: String) {
        let key = post_path(&slug);
        let Some(guard) = self.cache.begin_build(&key) else {
            return;
        };
        let state = self.clone();
        tokio::spawn(async move {
            match state.build_post(&slug, None).await {
                Ok(html) => {
                    guard.finish(html, state.post_revalidate());
                    tracing::info!("Regenerated {}", key);
                }
                Err(e) if e.is_not_found() => {
                    state.cache.remove(&key);
                    tracing::info!("Post {} no longer exists, dropped from cache", slug);
                }
                Err(e) => {
                    tracing::warn!("Failed to regenerate {}, serving stale page: {}", key, e)
                }
            }
        });
    }

    /// Ref from the preview cookie, if the request carries one
    fn preview_ref(&self, headers: &HeaderMap) -> Option<String> {
        preview_ref(headers, &self.renderer.config().preview.cookie)
    }

    fn error_response(&self, err: &PageError) -> Response {
        let status = err.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", err);
        } else {
            tracing::debug!("Request failed: {}", err);
        }
        self.error_page(status)
    }

    fn error_page(&self, status: StatusCode) -> Response {
        match self.renderer.render_error(status.as_u16()) {
            Ok(html) => (status, Html(html)).into_response(),
            Err(e) => {
                tracing::error!("Failed to render error page: {}", e);
                (status, status.canonical_reason().unwrap_or("Error")).into_response()
            }
        }
    }
}

/// Build the application router
pub fn router<S: ContentSource + 'static>(state: AppState<S>) -> Router {
    Router::new()
        .route("/", get(home_handler::<S>))
        .route("/post/:slug", get(post_handler::<S>))
        .route("/api/posts", get(load_more_handler::<S>))
        .route("/api/exit-preview", get(exit_preview_handler::<S>))
        .route("/css/style.css", get(stylesheet_handler))
        .route("/js/load_more.js", get(script_handler))
        .fallback(fallback_handler::<S>)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the server
pub async fn start(site: &Spacetraveling, ip: &str, port: u16, prerender: bool) -> Result<()> {
    let source = PrismicClient::new(&site.config.content_api)?;
    let renderer = SiteRenderer::new(&site.config, Some(&site.source_dir))?;
    let state = AppState::new(source, renderer, site.public_dir.clone());

    if prerender {
        tracing::info!("Pre-rendering pages...");
        let report = state.prerender().await;
        tracing::info!(
            "Pre-rendered home: {}, posts: {}, failed: {}",
            report.home,
            report.posts,
            report.failed
        );
    }

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    println!("Server running at http://{}:{}", ip, port);
    println!("Press Ctrl+C to stop.");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router(state)).await?;

    Ok(())
}

/// A cached page; the body shares the cache's buffer
fn html_response(html: Bytes, revalidate: Option<Duration>) -> Response {
    let cache_control = match revalidate {
        Some(revalidate) => format!("s-maxage={}, stale-while-revalidate", revalidate.as_secs()),
        None => "s-maxage=31536000, stale-while-revalidate".to_string(),
    };
    let mut response = (
        [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
        Body::from(html),
    )
        .into_response();
    if let Ok(value) = HeaderValue::from_str(&cache_control) {
        response.headers_mut().insert(header::CACHE_CONTROL, value);
    }
    response
}

fn uncached(html: String) -> Response {
    (
        [(header::CACHE_CONTROL, "private, no-cache, no-store, max-age=0")],
        Html(html),
    )
        .into_response()
}

async fn home_handler<S: ContentSource + 'static>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
) -> Response {
    if let Some(reference) = state.preview_ref(&headers) {
        return match state.build_home(Some(&reference)).await {
            Ok(html) => uncached(html),
            Err(e) => state.error_response(&e),
        };
    }

    match state.cache.lookup(HOME_KEY) {
        Lookup::Fresh(html) => html_response(html, state.home_revalidate()),
        Lookup::Stale(html) => {
            state.spawn_home_regeneration();
            html_response(html, state.home_revalidate())
        }
        Lookup::Building | Lookup::Missing => {
            let guard = state.cache.begin_build(HOME_KEY);
            let revalidate = state.home_revalidate();
            match (state.build_home(None).await, guard) {
                (Ok(html), Some(guard)) => html_response(guard.finish(html, revalidate), revalidate),
                (Ok(html), None) => uncached(html),
                (Err(e), _) => state.error_response(&e),
            }
        }
    }
}

async fn post_handler<S: ContentSource + 'static>(
    State(state): State<AppState<S>>,
    Path(slug): Path<String>,
    headers: HeaderMap,
) -> Response {
    if !is_valid_slug(&slug) {
        return state.error_page(StatusCode::NOT_FOUND);
    }

    if let Some(reference) = state.preview_ref(&headers) {
        return match state.build_post(&slug, Some(&reference)).await {
            Ok(html) => uncached(html),
            Err(e) => state.error_response(&e),
        };
    }

    let key = post_path(&slug);
    match state.cache.lookup(&key) {
        Lookup::Fresh(html) => html_response(html, state.post_revalidate()),
        Lookup::Stale(html) => {
            state.spawn_post_regeneration(slug);
            html_response(html, state.post_revalidate())
        }
        Lookup::Building => loading_response(&state, &slug),
        Lookup::Missing => {
            let Some(guard) = state.cache.begin_build(&key) else {
                return loading_response(&state, &slug);
            };
            tracing::info!("Rendering {} on demand", key);
            let revalidate = state.post_revalidate();
            match state.build_post(&slug, None).await {
                Ok(html) => html_response(guard.finish(html, revalidate), revalidate),
                Err(e) => state.error_response(&e),
            }
        }
    }
}

fn loading_response<S: ContentSource + 'static>(state: &AppState<S>, slug: &str) -> Response {
    match state.renderer.render_loading(slug) {
        Ok(html) => uncached(html),
        Err(e) => state.error_response(&e),
    }
}

#[derive(Debug, Deserialize)]
struct LoadMoreParams {
    cursor: Option<String>,
}

fn json_error(status: StatusCode, message: String) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}

async fn load_more_handler<S: ContentSource + 'static>(
    State(state): State<AppState<S>>,
    Query(params): Query<LoadMoreParams>,
) -> Response {
    let Some(cursor) = params.cursor.filter(|c| !c.trim().is_empty()) else {
        return json_error(StatusCode::BAD_REQUEST, "Missing cursor".to_string());
    };

    match Listing::at_cursor(&*state.source, &cursor).await {
        Ok(listing) => {
            Json(state.renderer.load_more_response(&listing, &CursorLinks::Api)).into_response()
        }
        Err(e) => {
            let e = PageError::from(e);
            tracing::warn!("Load more failed: {}", e);
            json_error(e.status_code(), e.to_string())
        }
    }
}

async fn exit_preview_handler<S: ContentSource + 'static>(
    State(state): State<AppState<S>>,
) -> Response {
    let cookie = format!(
        "{}=; Path=/; Max-Age=0; Expires=Thu, 01 Jan 1970 00:00:00 GMT; SameSite=Lax",
        state.renderer.config().preview.cookie
    );
    ([(header::SET_COOKIE, cookie)], Redirect::temporary("/")).into_response()
}

async fn stylesheet_handler() -> Response {
    ([(header::CONTENT_TYPE, "text/css; charset=utf-8")], STYLE_CSS).into_response()
}

async fn script_handler() -> Response {
    (
        [(header::CONTENT_TYPE, "application/javascript; charset=utf-8")],
        LOAD_MORE_JS,
    )
        .into_response()
}

/// Serve files from the public directory, with the 404 page for anything else
async fn fallback_handler<S: ContentSource + 'static>(
    State(state): State<AppState<S>>,
    request: Request<Body>,
) -> Response {
    let mut service = ServeDir::new(&state.public_dir).append_index_html_on_directories(true);
    match service.try_call(request).await {
        Ok(response) if response.status() == StatusCode::NOT_FOUND => {
            state.error_page(StatusCode::NOT_FOUND)
        }
        Ok(response) => response.into_response(),
        Err(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response(),
    }
}

/// Find a cookie by name in the request headers and decode its value
fn preview_ref(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == cookie_name)
        .and_then(|(_, value)| decode_component(value.trim_matches('"')))
        .filter(|value| !value.is_empty())
}
