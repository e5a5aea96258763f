//! spacetraveling: a blog front end for a headless content API
//!
//! Posts are fetched from a Prismic repository and rendered with Tera
//! templates, either exported as static files or served by a small server
//! that regenerates pages in the background.

pub mod cache;
pub mod commands;
pub mod config;
pub mod content;
pub mod error;
pub mod generator;
pub mod helpers;
pub mod i18n;
pub mod pages;
pub mod server;
pub mod templates;

#[cfg(test)]
mod test_support;

use anyhow::Result;
use std::path::Path;

/// A site directory and its configuration
#[derive(Debug, Clone)]
pub struct Spacetraveling {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: std::path::PathBuf,
    /// Source directory (static assets, languages, template overrides)
    pub source_dir: std::path::PathBuf,
    /// Public (output) directory
    pub public_dir: std::path::PathBuf,
}

impl Spacetraveling {
    /// Load the site in `base_dir`; a missing `_config.yml` means defaults
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("_config.yml");

        let mut config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };
        config.apply_env();

        let source_dir = base_dir.join(&config.source_dir);
        let public_dir = base_dir.join(&config.public_dir);

        Ok(Self {
            config,
            base_dir,
            source_dir,
            public_dir,
        })
    }

    /// Export the site into the public directory
    pub async fn generate(&self) -> Result<()> {
        commands::generate::run(self).await
    }

    /// Remove the public directory
    pub fn clean(&self) -> Result<()> {
        commands::clean::run(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_new_without_config() {
        let dir = tempfile::tempdir().unwrap();
        let site = Spacetraveling::new(dir.path()).unwrap();
        assert_eq!(site.config.title, "spacetraveling");
        assert_eq!(site.source_dir, dir.path().join("source"));
        assert_eq!(site.public_dir, dir.path().join("public"));
    }

    #[test]
    fn test_new_with_config() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("_config.yml"),
            "title: My Blog\npublic_dir: out\nhome:\n  page_size: 2\n",
        )
        .unwrap();
        let site = Spacetraveling::new(dir.path()).unwrap();
        assert_eq!(site.config.title, "My Blog");
        assert_eq!(site.config.home.page_size, 2);
        assert_eq!(site.public_dir, dir.path().join("out"));
    }

    #[test]
    fn test_new_with_invalid_config() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("_config.yml"), "home: [1, 2").unwrap();
        assert!(Spacetraveling::new(dir.path()).is_err());
    }
}
