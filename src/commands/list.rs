//! List the posts known to the content API

use anyhow::Result;
use std::collections::HashSet;
use std::io::Write;

use crate::content::{ContentSource, PrismicClient};
use crate::pages::Listing;
use crate::Spacetraveling;

const LIST_PAGE_SIZE: u32 = 100;

/// Print every post as `date  uid  title`
pub async fn run(site: &Spacetraveling) -> Result<()> {
    let client = PrismicClient::new(&site.config.content_api)?;
    let stdout = std::io::stdout();
    run_with(&client, &site.config.content_api.document_type, &mut stdout.lock()).await
}

pub async fn run_with<S: ContentSource, W: Write>(
    source: &S,
    document_type: &str,
    out: &mut W,
) -> Result<()> {
    let mut listing = Listing::first_page(source, LIST_PAGE_SIZE, document_type, None).await?;
    let mut seen = HashSet::new();
    while let Some(cursor) = listing.next_page.clone() {
        if !seen.insert(cursor) {
            break;
        }
        listing.load_more(source).await?;
    }

    writeln!(out, "Posts ({}):", listing.posts.len())?;
    for post in &listing.posts {
        let date = post
            .first_publication_date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "draft".to_string());
        writeln!(out, "  {}  {}  {}", date, post.uid, post.title)?;
    }
    Ok(())
}
