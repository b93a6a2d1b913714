// src/extractors/assembler.rs

use crate::extractors::fact_sheet::FactSheet;
use crate::extractors::heuristic::extract_heuristic;
use crate::extractors::normalize::NormalizedPage;
use crate::extractors::structured::extract_structured;
use crate::stockstory::models::{StockPage, SyncResponse};
use crate::utils::error::ExtractError;

/// Runs both passes over one document and merges them.
///
/// Heuristic values win over structured ones on shared fields, except the
/// summary, where the longer text wins. The JSON-LD modification date is
/// scratch data and is dropped here.
pub fn extract_fact_sheet(html: &str) -> FactSheet {
    let page = NormalizedPage::parse(html);

    let structured = extract_structured(&page);
    if let Some(modified) = structured.date_modified_parsed() {
        tracing::debug!("Page last modified {}", modified);
    }

    let heuristic = extract_heuristic(&page);
    structured.facts.merge(heuristic)
}

/// Decodes a fetched body and wraps its fact sheet in the success envelope.
pub fn assemble(page: &StockPage, url: &str, body: &[u8]) -> Result<SyncResponse, ExtractError> {
    let html = std::str::from_utf8(body).map_err(|e| ExtractError::Encoding(e.to_string()))?;
    let data = extract_fact_sheet(html);
    tracing::info!(
        "Extracted fact sheet for {}: {} highlights, {} charts",
        page.ticker(),
        data.key_highlights.len(),
        data.chart_urls.len()
    );
    Ok(SyncResponse::success(page, url, data))
}
