//! Generator module - exports the whole site as static files
//!
//! Output layout under the public directory:
//!
//! - `index.html`, the first listing page
//! - `posts/page/<n>.json`, every following listing page in the load-more format
//! - `post/<slug>/index.html` for every post
//! - `404.html`, `css/style.css`, `js/load_more.js` and the files of `source/static/`

use anyhow::Result;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

use crate::content::ContentSource;
use crate::helpers::is_valid_slug;
use crate::pages::{self, get_static_paths, Listing};
use crate::templates::{CursorLinks, SiteRenderer, LOAD_MORE_JS, STYLE_CSS};
use crate::Spacetraveling;

/// What a generation run wrote
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateReport {
    /// Listing pages, `index.html` included
    pub listing_pages: usize,
    pub posts: usize,
    pub assets: usize,
}

/// Static site generator
pub struct Generator<S> {
    site: Spacetraveling,
    renderer: SiteRenderer,
    source: S,
}

impl<S: ContentSource> Generator<S> {
    /// Create a new generator
    pub fn new(site: &Spacetraveling, source: S) -> Result<Self> {
        let renderer = SiteRenderer::new(&site.config, Some(&site.source_dir))?;
        Ok(Self {
            site: site.clone(),
            renderer,
            source,
        })
    }

    /// Generate the entire site
    pub async fn generate(&self) -> Result<GenerateReport> {
        fs::create_dir_all(&self.site.public_dir)?;

        self.write_file("css/style.css", STYLE_CSS)?;
        self.write_file("js/load_more.js", LOAD_MORE_JS)?;
        let assets = self.copy_static_assets()?;

        let listing_pages = self.generate_listing().await?;
        let posts = self.generate_posts().await?;

        self.write_file("404.html", &self.renderer.render_error(404)?)?;

        Ok(GenerateReport {
            listing_pages,
            posts,
            assets,
        })
    }

    /// Write `index.html` and one JSON file per following page of the cursor chain
    async fn generate_listing(&self) -> Result<usize> {
        let props = pages::home::get_static_props(&self.source, &self.site.config, None).await?;

        let mut pages: Vec<Listing> = Vec::new();
        let mut links = HashMap::new();
        let mut seen = HashSet::new();
        let mut cursor = props.listing.next_page.clone();

        while let Some(current) = cursor {
            if !seen.insert(current.clone()) {
                tracing::warn!("Content API returned a repeated cursor: {}", current);
                break;
            }
            let page = Listing::at_cursor(&self.source, &current).await?;
            links.insert(current, format!("/posts/page/{}.json", pages.len() + 2));
            cursor = page.next_page.clone();
            pages.push(page);
        }

        let links = CursorLinks::Static(links);
        self.write_file("index.html", &self.renderer.render_home(&props, &links)?)?;

        for (i, page) in pages.iter().enumerate() {
            let response = self.renderer.load_more_response(page, &links);
            let json = serde_json::to_string(&response)?;
            self.write_file(&format!("posts/page/{}.json", i + 2), &json)?;
        }

        tracing::info!("Generated {} listing page(s)", pages.len() + 1);
        Ok(pages.len() + 1)
    }

    async fn generate_posts(&self) -> Result<usize> {
        let document_type = &self.site.config.content_api.document_type;
        let slugs = get_static_paths(&self.source, document_type).await?;

        let mut count = 0;
        for slug in slugs {
            if !is_valid_slug(&slug) {
                tracing::warn!("Skipping post with unusable slug {:?}", slug);
                continue;
            }
            let props = pages::post::get_static_props(&self.source, document_type, &slug, None).await?;
            let html = self.renderer.render_post(&props)?;
            self.write_file(&format!("post/{}/index.html", slug), &html)?;
            count += 1;
        }

        tracing::info!("Generated {} post(s)", count);
        Ok(count)
    }

    /// Copy `source/static/**` into the public directory
    fn copy_static_assets(&self) -> Result<usize> {
        let static_dir = self.site.source_dir.join("static");
        if !static_dir.is_dir() {
            return Ok(0);
        }

        let mut count = 0;
        for entry in WalkDir::new(&static_dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            let relative = path.strip_prefix(&static_dir)?;
            let dest = self.site.public_dir.join(relative);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(path, &dest)?;
            count += 1;
        }

        tracing::debug!("Copied {} static file(s)", count);
        Ok(count)
    }

    fn write_file(&self, relative: &str, content: &str) -> Result<()> {
        let output_path = self.site.public_dir.join(Path::new(relative));
        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&output_path, content)?;
        tracing::debug!("Generated: {:?}", output_path);
        Ok(())
    }
}
