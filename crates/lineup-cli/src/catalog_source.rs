// Catalog fetching: a local CSV file or the sheet's CSV export URL.
//
// The catalog is read once per session; nothing here caches or refreshes.

use anyhow::Context;
use lineup_core::catalog::Catalog;
use lineup_core::config::{CatalogConfig, CatalogSource};
use tracing::info;

/// Load the session catalog from wherever storage.toml points.
pub async fn load(config: &CatalogConfig) -> anyhow::Result<Catalog> {
    match &config.source {
        CatalogSource::File(path) => {
            info!("Reading catalog from {}", path.display());
            Catalog::load_file(path, config.delimiter)
                .with_context(|| format!("catalog unavailable: {}", path.display()))
        }
        CatalogSource::Url(url) => {
            info!("Fetching catalog from {}", url);
            let client = reqwest::Client::new();
            let text = fetch_text(&client, url).await?;
            Catalog::from_reader(text.as_bytes(), config.delimiter)
                .with_context(|| format!("catalog unavailable: {url}"))
        }
    }
}

async fn fetch_text(client: &reqwest::Client, url: &str) -> anyhow::Result<String> {
    let response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("catalog unavailable: request to {url} failed"))?
        .error_for_status()
        .with_context(|| format!("catalog unavailable: {url} returned an error status"))?;

    response
        .text()
        .await
        .with_context(|| format!("catalog unavailable: could not read body from {url}"))
}
