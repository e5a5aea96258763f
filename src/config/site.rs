//! Site configuration (_config.yml)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub description: String,
    pub language: String,
    pub timezone: String,
    pub url: String,

    // Directory
    pub source_dir: String,
    pub public_dir: String,

    // Content API
    #[serde(default)]
    pub content_api: ContentApiConfig,

    // Pages
    #[serde(default)]
    pub home: HomeConfig,
    #[serde(default)]
    pub post: PostConfig,
    #[serde(default)]
    pub preview: PreviewConfig,

    // Store any additional fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "spacetraveling".to_string(),
            description: String::new(),
            language: "pt-BR".to_string(),
            timezone: String::new(),
            url: "http://localhost:3000".to_string(),

            source_dir: "source".to_string(),
            public_dir: "public".to_string(),

            content_api: ContentApiConfig::default(),

            home: HomeConfig::default(),
            post: PostConfig::default(),
            preview: PreviewConfig::default(),

            extra: HashMap::new(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read {:?}", path.as_ref()))?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Apply `PRISMIC_API_ENDPOINT` / `PRISMIC_ACCESS_TOKEN` overrides
    pub fn apply_env(&mut self) {
        self.apply_overrides(
            std::env::var("PRISMIC_API_ENDPOINT").ok(),
            std::env::var("PRISMIC_ACCESS_TOKEN").ok(),
        );
    }

    fn apply_overrides(&mut self, endpoint: Option<String>, access_token: Option<String>) {
        if let Some(endpoint) = endpoint.filter(|e| !e.trim().is_empty()) {
            tracing::debug!("Content API endpoint overridden from environment");
            self.content_api.endpoint = endpoint;
        }
        if let Some(token) = access_token.filter(|t| !t.trim().is_empty()) {
            self.content_api.access_token = Some(token);
        }
    }

    /// Resolve the configured display timezone (empty means UTC)
    pub fn tz(&self) -> Result<chrono_tz::Tz> {
        if self.timezone.trim().is_empty() {
            return Ok(chrono_tz::UTC);
        }
        chrono_tz::Tz::from_str(self.timezone.trim())
            .map_err(|e| anyhow::anyhow!("Invalid timezone {:?}: {}", self.timezone, e))
    }
}

/// Headless content API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentApiConfig {
    pub endpoint: String,
    pub access_token: Option<String>,
    pub document_type: String,
    pub timeout_secs: u64,
    /// Seconds the master ref is reused before the API root is asked again; 0 disables
    pub master_ref_ttl_secs: u64,
}

impl Default for ContentApiConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://spacetraveling.cdn.prismic.io/api/v2".to_string(),
            access_token: None,
            document_type: "posts".to_string(),
            timeout_secs: 10,
            master_ref_ttl_secs: 30,
        }
    }
}

/// Listing page settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HomeConfig {
    pub page_size: u32,
    /// Seconds before a generated listing page is regenerated
    pub revalidate: u64,
}

impl Default for HomeConfig {
    fn default() -> Self {
        Self {
            page_size: 4,
            revalidate: 60 * 60 * 24,
        }
    }
}

/// Post page settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PostConfig {
    pub words_per_minute: u32,
    /// Seconds before a generated post page is regenerated; never when unset
    pub revalidate: Option<u64>,
}

impl Default for PostConfig {
    fn default() -> Self {
        Self {
            words_per_minute: 200,
            revalidate: None,
        }
    }
}

/// Preview mode settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    pub cookie: String,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            cookie: "io.prismic.preview".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SiteConfig::default();
        assert_eq!(config.title, "spacetraveling");
        assert_eq!(config.home.page_size, 4);
        assert_eq!(config.home.revalidate, 86400);
        assert_eq!(config.post.words_per_minute, 200);
        assert_eq!(config.content_api.document_type, "posts");
        assert_eq!(config.preview.cookie, "io.prismic.preview");
    }

    #[test]
    fn test_parse_config() {
        let yaml = r#"
title: My Blog
language: en-US
timezone: America/Sao_Paulo
content_api:
  endpoint: https://blog.cdn.prismic.io/api/v2
  document_type: articles
home:
  page_size: 10
post:
  revalidate: 600
analytics_id: UA-1
"#;
        let config: SiteConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.title, "My Blog");
        assert_eq!(config.language, "en-US");
        assert_eq!(config.content_api.endpoint, "https://blog.cdn.prismic.io/api/v2");
        assert_eq!(config.content_api.document_type, "articles");
        assert_eq!(config.content_api.timeout_secs, 10);
        assert_eq!(config.content_api.master_ref_ttl_secs, 30);
        assert_eq!(config.home.page_size, 10);
        assert_eq!(config.home.revalidate, 86400);
        assert_eq!(config.post.revalidate, Some(600));
        assert!(config.extra.contains_key("analytics_id"));
        assert_eq!(config.tz().unwrap(), chrono_tz::America::Sao_Paulo);
    }

    #[test]
    fn test_timezone() {
        let mut config = SiteConfig::default();
        assert_eq!(config.tz().unwrap(), chrono_tz::UTC);
        config.timezone = "Mars/Olympus".to_string();
        assert!(config.tz().is_err());
    }

    #[test]
    fn test_overrides() {
        let mut config = SiteConfig::default();
        config.apply_overrides(
            Some("https://other.cdn.prismic.io/api/v2".to_string()),
            Some(String::new()),
        );
        assert_eq!(config.content_api.endpoint, "https://other.cdn.prismic.io/api/v2");
        assert_eq!(config.content_api.access_token, None);

        config.apply_overrides(None, Some("secret".to_string()));
        assert_eq!(config.content_api.access_token.as_deref(), Some("secret"));
    }
}
