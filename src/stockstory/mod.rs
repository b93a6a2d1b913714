// src/stockstory/mod.rs
pub mod client;
pub mod models;

use crate::extractors::assembler::assemble;
use client::PageFetcher;
use models::{StockPage, SyncResponse};

/// Fetches one company page and turns it into a response envelope.
///
/// Fetch and decode failures become the failure envelope; extraction itself
/// cannot fail field by field.
pub async fn sync_stock<F: PageFetcher>(fetcher: &F, page: &StockPage, base_url: &str) -> SyncResponse {
    let url = page.url(base_url);
    tracing::info!("Syncing StockStory analysis for {} from {}", page.ticker(), url);

    let body = match fetcher.fetch(&url).await {
        Ok(body) => body,
        Err(e) => {
            tracing::warn!("Fetch failed for {}: {}", page.ticker(), e);
            return SyncResponse::failure(page, e.to_string());
        }
    };

    sync_from_body(page, &url, &body)
}

/// Same as [`sync_stock`] for a body obtained some other way (e.g. a saved page).
pub fn sync_from_body(page: &StockPage, url: &str, body: &[u8]) -> SyncResponse {
    match assemble(page, url, body) {
        Ok(response) => response,
        Err(e) => {
            tracing::error!("Extraction failed for {}: {}", page.ticker(), e);
            SyncResponse::failure(page, e.to_string())
        }
    }
}
