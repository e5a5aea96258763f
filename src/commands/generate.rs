//! Generate static files

use anyhow::Result;

use crate::content::PrismicClient;
use crate::generator::Generator;
use crate::Spacetraveling;

/// Export the whole site from the configured content API
pub async fn run(site: &Spacetraveling) -> Result<()> {
    let start = std::time::Instant::now();

    let client = PrismicClient::new(&site.config.content_api)?;
    tracing::info!("Fetching content from {}", client.endpoint());

    let generator = Generator::new(site, client)?;
    let report = generator.generate().await?;

    tracing::info!(
        "Generated {} listing page(s), {} post(s) and {} static file(s) in {:.2}s",
        report.listing_pages,
        report.posts,
        report.assets,
        start.elapsed().as_secs_f64()
    );
    Ok(())
}
