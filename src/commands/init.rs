//! Initialize a new site directory

use anyhow::Result;
use std::fs;
use std::path::Path;

const SAMPLE_CONFIG: &str = r#"# spacetraveling configuration

# Site
title: spacetraveling
description: ''
# pt-BR or en-US
language: pt-BR
# chrono-tz name, '' for UTC
timezone: America/Sao_Paulo
url: http://localhost:3000

# Directory
source_dir: source
public_dir: public

# Content API (PRISMIC_API_ENDPOINT / PRISMIC_ACCESS_TOKEN override these)
content_api:
  endpoint: https://spacetraveling.cdn.prismic.io/api/v2
  access_token:
  document_type: posts
  timeout_secs: 10
  # seconds the published ref is reused between API root lookups
  master_ref_ttl_secs: 30

# Home page listing
home:
  page_size: 4
  # seconds
  revalidate: 86400

# Post pages
post:
  words_per_minute: 200
  # seconds, empty never regenerates
  revalidate:

# Preview mode
preview:
  cookie: io.prismic.preview
"#;

const SAMPLE_LANGUAGE: &str = r#"# Overrides for the built-in UI strings
home:
  load_more: Carregar mais posts
"#;

/// Write `_config.yml` and the `source/` skeleton into `target_dir`
///
/// An existing `_config.yml` is left untouched.
pub fn init_site(target_dir: &Path) -> Result<()> {
    fs::create_dir_all(target_dir)?;
    fs::create_dir_all(target_dir.join("source/static"))?;
    fs::create_dir_all(target_dir.join("source/languages"))?;
    fs::create_dir_all(target_dir.join("source/templates"))?;

    let config_path = target_dir.join("_config.yml");
    if config_path.exists() {
        tracing::warn!("{:?} already exists, keeping it", config_path);
    } else {
        fs::write(&config_path, SAMPLE_CONFIG)?;
    }

    let language_path = target_dir.join("source/languages/pt-BR.yml");
    if !language_path.exists() {
        fs::write(&language_path, SAMPLE_LANGUAGE)?;
    }

    Ok(())
}
