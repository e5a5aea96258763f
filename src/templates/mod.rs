//! Built-in spacetraveling templates using the Tera template engine
//!
//! Templates, the stylesheet and the load-more script are embedded in the
//! binary. HTML files under `source/templates/` replace the built-in
//! template of the same name.

mod views;

pub use views::*;

use anyhow::{Context as _, Result};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tera::{Context, Tera};
use walkdir::WalkDir;

use crate::config::SiteConfig;
use crate::content::rich_text;
use crate::content::PostSummary;
use crate::error::PageError;
use crate::helpers::{full_url_for, post_path, truncate, DateFormatter, Locale};
use crate::i18n::I18n;
use crate::pages::{HomeProps, Listing, PostProps};

/// Default stylesheet, served at `/css/style.css`
pub const STYLE_CSS: &str = include_str!("spacetraveling/style.css");

/// Load-more script, served at `/js/load_more.js`
pub const LOAD_MORE_JS: &str = include_str!("spacetraveling/load_more.js");

/// Tera renderer with the embedded templates
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with the built-in templates loaded
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        // Escape everything rendered into HTML; rich text goes through `safe`
        tera.autoescape_on(vec![".html"]);

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("spacetraveling/layout.html")),
            ("home.html", include_str!("spacetraveling/home.html")),
            ("post.html", include_str!("spacetraveling/post.html")),
            ("loading.html", include_str!("spacetraveling/loading.html")),
            ("error.html", include_str!("spacetraveling/error.html")),
            (
                "partials/preview.html",
                include_str!("spacetraveling/partials/preview.html"),
            ),
        ])?;

        tera.register_filter("truncate_chars", truncate_chars_filter);

        Ok(Self { tera })
    }

    /// Replace built-in templates with the `*.html` files found under `dir`
    pub fn load_overrides<P: AsRef<Path>>(&mut self, dir: P) -> Result<usize> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Ok(0);
        }

        let mut templates = Vec::new();
        for entry in WalkDir::new(dir).into_iter().filter_map(|e| e.ok()) {
            let path = entry.path();
            if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("html") {
                continue;
            }
            let Ok(relative) = path.strip_prefix(dir) else {
                continue;
            };
            let name = relative.to_string_lossy().replace('\\', "/");
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read template {:?}", path))?;
            tracing::debug!("Template override: {}", name);
            templates.push((name, content));
        }

        let count = templates.len();
        if count > 0 {
            self.tera.add_raw_templates(templates)?;
        }
        Ok(count)
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> tera::Result<String> {
        self.tera.render(template_name, context)
    }
}

/// Tera filter: truncate by character count
fn truncate_chars_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("truncate_chars", "value", String, value);
    let length = match args.get("length") {
        Some(val) => tera::try_get_value!("truncate_chars", "length", usize, val),
        None => 160,
    };
    let omission = match args.get("omission") {
        Some(val) => tera::try_get_value!("truncate_chars", "omission", String, val),
        None => "...".to_string(),
    };

    Ok(tera::Value::String(truncate(&s, length, Some(&omission))))
}

/// Turns page props into HTML and JSON with the site's strings and dates
pub struct SiteRenderer {
    templates: TemplateRenderer,
    i18n: I18n,
    dates: DateFormatter,
    config: SiteConfig,
}

impl SiteRenderer {
    /// Built-in templates and strings, with overrides from `source_dir` when given
    pub fn new(config: &SiteConfig, source_dir: Option<&Path>) -> Result<Self> {
        let mut templates = TemplateRenderer::new()?;
        let mut i18n = I18n::with_builtin(&config.language)?;

        if let Some(source_dir) = source_dir {
            let overridden = templates.load_overrides(source_dir.join("templates"))?;
            if overridden > 0 {
                tracing::info!("Loaded {} template override(s)", overridden);
            }
            i18n.load_languages(source_dir.join("languages"))?;
        }

        let dates = DateFormatter::new(Locale::from_language(&config.language), config.tz()?);

        Ok(Self {
            templates,
            i18n,
            dates,
            config: config.clone(),
        })
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    pub fn summary_view(&self, summary: &PostSummary) -> SummaryView {
        let date = summary.first_publication_date.as_ref();
        SummaryView {
            uid: summary.uid.clone(),
            title: summary.title.clone(),
            subtitle: summary.subtitle.clone(),
            author: summary.author.clone(),
            first_publication_date: date.map(|d| self.dates.medium(d)).unwrap_or_default(),
            datetime: date.map(|d| self.dates.iso(d)),
            href: post_path(&summary.uid),
        }
    }

    /// JSON body for one page of the listing
    pub fn load_more_response(&self, listing: &Listing, links: &CursorLinks) -> LoadMoreResponse {
        LoadMoreResponse {
            results: listing.posts.iter().map(|p| self.summary_view(p)).collect(),
            next_page: links.link(listing.next_page.as_deref()),
        }
    }

    pub fn post_view(&self, props: &PostProps) -> PostView {
        let post = &props.post;
        let first = post.first_publication_date.as_ref();

        let content: Vec<BlockView> = post
            .content
            .iter()
            .map(|block| BlockView {
                heading: block.heading.clone(),
                html: rich_text::as_html(&block.body),
            })
            .collect();
        let excerpt = post
            .content
            .first()
            .map(|block| rich_text::as_text(&block.body))
            .unwrap_or_default();

        let edited = match post.last_publication_date {
            Some(ref last) if post.is_edited() => Some(EditedView {
                date: self.dates.edited_date(last),
                time: self.dates.edited_time(last),
                datetime: self.dates.iso(last),
            }),
            _ => None,
        };

        PostView {
            uid: post.uid.clone(),
            title: post.title.clone(),
            subtitle: post.subtitle.clone(),
            author: post.author.clone(),
            banner_url: post.banner_url.clone(),
            first_publication_date: first.map(|d| self.dates.medium(d)).unwrap_or_default(),
            datetime: first.map(|d| self.dates.iso(d)),
            reading_time: props.reading_time(self.config.post.words_per_minute),
            edited,
            excerpt,
            content,
            prev_post: props
                .prev_post
                .as_ref()
                .map(|p| NavView::new(&p.uid, &p.title)),
            next_post: props
                .next_post
                .as_ref()
                .map(|p| NavView::new(&p.uid, &p.title)),
            canonical_url: full_url_for(&self.config, &post_path(&post.uid)),
        }
    }

    fn base_context(&self, preview: bool) -> Context {
        let mut context = Context::new();
        context.insert(
            "site",
            &SiteView {
                title: self.config.title.clone(),
                description: self.config.description.clone(),
                language: self.config.language.clone(),
                url: self.config.url.clone(),
            },
        );
        context.insert("t", &self.i18n.get_all_translations());
        context.insert("preview", &preview);
        context
    }

    pub fn render_home(&self, props: &HomeProps, links: &CursorLinks) -> Result<String, PageError> {
        let page = self.load_more_response(&props.listing, links);
        let mut context = self.base_context(props.preview);
        context.insert(
            "home",
            &HomeView {
                posts: page.results,
                next_page: page.next_page,
            },
        );
        Ok(self.templates.render("home.html", &context)?)
    }

    pub fn render_post(&self, props: &PostProps) -> Result<String, PageError> {
        let mut context = self.base_context(props.preview);
        context.insert("post", &self.post_view(props));
        Ok(self.templates.render("post.html", &context)?)
    }

    /// Placeholder served while a post is generated on demand
    pub fn render_loading(&self, slug: &str) -> Result<String, PageError> {
        let mut context = self.base_context(false);
        context.insert("slug", slug);
        Ok(self.templates.render("loading.html", &context)?)
    }

    pub fn render_error(&self, status: u16) -> Result<String, PageError> {
        let message = if status == 404 {
            self.i18n.get("error.not_found")
        } else {
            self.i18n.get("error.generic")
        };
        let mut context = self.base_context(false);
        context.insert("status", &status);
        context.insert("message", &message);
        Ok(self.templates.render("error.html", &context)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{ContentBlock, PostDetail, RichTextNode};
    use crate::helpers::parse_api_date;

    fn renderer() -> SiteRenderer {
        SiteRenderer::new(&SiteConfig::default(), None).unwrap()
    }

    fn summary(uid: &str) -> PostSummary {
        PostSummary {
            uid: uid.to_string(),
            first_publication_date: Some(parse_api_date("2021-03-15T19:25:28+0000").unwrap()),
            title: format!("Title <{}>", uid),
            subtitle: "Pensando em sincronização".to_string(),
            author: "Joseph Oliveira".to_string(),
        }
    }

    fn post_props(last: &str) -> PostProps {
        PostProps {
            post: PostDetail {
                id: "YF1".to_string(),
                uid: "como-utilizar-hooks".to_string(),
                first_publication_date: Some(parse_api_date("2021-03-15T19:25:28+0000").unwrap()),
                last_publication_date: Some(parse_api_date(last).unwrap()),
                title: "Como utilizar Hooks".to_string(),
                subtitle: "Pensando em sincronização".to_string(),
                author: "Joseph Oliveira".to_string(),
                banner_url: Some("https://images.prismic.io/banner.png".to_string()),
                content: vec![ContentBlock {
                    heading: "Proin et varius".to_string(),
                    body: vec![RichTextNode::paragraph("Lorem <ipsum>")],
                }],
            },
            prev_post: Some(summary("anterior")),
            next_post: None,
            preview: false,
        }
    }

    #[test]
    fn test_render_home() {
        let renderer = renderer();
        let props = HomeProps {
            listing: Listing {
                posts: vec![summary("post-1"), summary("post-2")],
                next_page: Some("https://api/page/2".to_string()),
            },
            preview: false,
        };
        let html = renderer.render_home(&props, &CursorLinks::Api).unwrap();
        assert!(html.contains(r#"href="/post/post-1""#));
        assert!(html.contains("Title &lt;post-1&gt;"));
        assert!(html.contains("15 de mar de 2021"));
        assert!(html.contains("Carregar mais posts"));
        assert!(html.contains("/api/posts?cursor=https%3A%2F%2Fapi%2Fpage%2F2"));
        assert!(!html.contains("Sair do modo Preview"));
    }

    #[test]
    fn test_home_without_more_pages() {
        let renderer = renderer();
        let props = HomeProps {
            listing: Listing {
                posts: vec![summary("post-1")],
                next_page: None,
            },
            preview: true,
        };
        let html = renderer.render_home(&props, &CursorLinks::Api).unwrap();
        assert!(!html.contains("Carregar mais posts"));
        assert!(!html.contains("load_more.js"));
        assert!(html.contains(r#"href="/api/exit-preview""#));
        assert!(html.contains("Sair do modo Preview"));
    }

    #[test]
    fn test_render_post() {
        let renderer = renderer();
        let html = renderer
            .render_post(&post_props("2021-03-25T19:27:35+0000"))
            .unwrap();
        assert!(html.contains("<title>Como utilizar Hooks | spacetraveling</title>"));
        assert!(html.contains("<p>Lorem &lt;ipsum&gt;</p>"));
        assert!(html.contains("1 min"));
        assert!(html.contains("* editado em"));
        assert!(html.contains("25 mar 2021"));
        assert!(html.contains("19:27"));
        assert!(html.contains("Post anterior"));
        assert!(html.contains(r#"href="/post/anterior""#));
        assert!(!html.contains("Próximo post"));
        assert!(html.contains(r#"<meta property="og:description" content="Lorem &lt;ipsum&gt;">"#));
    }

    #[test]
    fn test_post_not_edited() {
        let renderer = renderer();
        let props = post_props("2021-03-15T19:25:28+0000");
        assert!(renderer.post_view(&props).edited.is_none());
        let html = renderer.render_post(&props).unwrap();
        assert!(!html.contains("* editado em"));
    }

    #[test]
    fn test_render_loading_and_error() {
        let renderer = renderer();
        assert!(renderer.render_loading("x").unwrap().contains("Carregando..."));
        let html = renderer.render_error(404).unwrap();
        assert!(html.contains("404"));
        assert!(html.contains("Post não encontrado"));
    }

    #[test]
    fn test_english_site() {
        let mut config = SiteConfig::default();
        config.language = "en-US".to_string();
        let renderer = SiteRenderer::new(&config, None).unwrap();
        let view = renderer.summary_view(&summary("post-1"));
        assert_eq!(view.first_publication_date, "Mar 15, 2021");
        assert_eq!(view.href, "/post/post-1");
    }

    #[test]
    fn test_template_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let templates = dir.path().join("templates");
        std::fs::create_dir_all(&templates).unwrap();
        std::fs::write(
            templates.join("loading.html"),
            "<p>{{ t[\"loading\"] }} {{ slug }}</p>",
        )
        .unwrap();
        let languages = dir.path().join("languages");
        std::fs::create_dir_all(&languages).unwrap();
        std::fs::write(languages.join("pt-BR.yml"), "loading: Aguarde").unwrap();

        let renderer = SiteRenderer::new(&SiteConfig::default(), Some(dir.path())).unwrap();
        assert_eq!(renderer.render_loading("hooks").unwrap(), "<p>Aguarde hooks</p>");
    }
}
