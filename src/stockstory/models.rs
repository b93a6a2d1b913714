// src/stockstory/models.rs
use crate::extractors::fact_sheet::FactSheet;
use chrono::{SecondsFormat, Utc};
use serde::Serialize;

/// Default location of StockStory company pages
pub const DEFAULT_BASE_URL: &str = "https://stockstory.org/us/stocks";

/// Identifies one company page on StockStory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockPage {
    ticker: String,
    exchange: String,
}

impl StockPage {
    pub fn new(ticker: &str, exchange: &str) -> Self {
        Self {
            ticker: ticker.trim().to_string(),
            exchange: exchange.trim().to_string(),
        }
    }

    /// Ticker as reported in responses (upper case).
    pub fn ticker(&self) -> String {
        self.ticker.to_uppercase()
    }

    /// Exchange as reported in responses (upper case).
    pub fn exchange(&self) -> String {
        self.exchange.to_uppercase()
    }

    /// Page URL; the site uses lower-case path segments.
    /// Example: https://stockstory.org/us/stocks/nasdaq/meta
    pub fn url(&self, base_url: &str) -> String {
        format!(
            "{}/{}/{}",
            base_url.trim_end_matches('/'),
            self.exchange.to_lowercase(),
            self.ticker.to_lowercase()
        )
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SyncSuccess {
    pub success: bool,
    pub ticker: String,
    pub exchange: String,
    pub url: String,
    pub timestamp: String,
    pub data: FactSheet,
}

#[derive(Debug, Clone, Serialize)]
pub struct SyncFailure {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticker: Option<String>,
    pub error: String,
    pub timestamp: String,
}

/// JSON envelope returned to callers: either the full fact sheet or an error,
/// never a partial record.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum SyncResponse {
    Success(SyncSuccess),
    Failure(SyncFailure),
}

impl SyncResponse {
    pub fn success(page: &StockPage, url: &str, data: FactSheet) -> Self {
        SyncResponse::Success(SyncSuccess {
            success: true,
            ticker: page.ticker(),
            exchange: page.exchange(),
            url: url.to_string(),
            timestamp: now(),
            data,
        })
    }

    pub fn failure(page: &StockPage, error: impl Into<String>) -> Self {
        SyncResponse::Failure(SyncFailure {
            success: false,
            ticker: Some(page.ticker()),
            error: error.into(),
            timestamp: now(),
        })
    }

    /// Failure before any ticker is known (bad command line).
    pub fn usage(error: impl Into<String>) -> Self {
        SyncResponse::Failure(SyncFailure {
            success: false,
            ticker: None,
            error: error.into(),
            timestamp: now(),
        })
    }

    pub fn is_success(&self) -> bool {
        matches!(self, SyncResponse::Success(_))
    }
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_url_and_casing() {
        let page = StockPage::new(" META ", "NasDaq");
        assert_eq!(page.url(DEFAULT_BASE_URL), "https://stockstory.org/us/stocks/nasdaq/meta");
        assert_eq!(page.url("http://localhost:8080/pages/"), "http://localhost:8080/pages/nasdaq/meta");
        assert_eq!(page.ticker(), "META");
        assert_eq!(page.exchange(), "NASDAQ");
    }

    #[test]
    fn test_failure_envelope_has_no_data() {
        let response = SyncResponse::failure(&StockPage::new("meta", "nasdaq"), "Request timeout");
        assert!(!response.is_success());
        let json = serde_json::to_value(&response).unwrap();
        let object = json.as_object().unwrap();
        assert_eq!(object.len(), 4);
        assert_eq!(json["success"], serde_json::json!(false));
        assert_eq!(json["ticker"], "META");
        assert_eq!(json["error"], "Request timeout");
        assert!(object.contains_key("timestamp"));
        assert!(!object.contains_key("data"));
    }

    #[test]
    fn test_usage_envelope_omits_ticker() {
        let json = serde_json::to_value(SyncResponse::usage("Usage: stockstory <TICKER> <EXCHANGE>")).unwrap();
        assert!(json.get("ticker").is_none());
        assert_eq!(json["success"], serde_json::json!(false));
    }

    #[test]
    fn test_success_envelope_shape() {
        let page = StockPage::new("meta", "nasdaq");
        let response = SyncResponse::success(&page, &page.url(DEFAULT_BASE_URL), FactSheet::new());
        assert!(response.is_success());
        let json = serde_json::to_value(&response).unwrap();
        let keys: Vec<&str> = json.as_object().unwrap().keys().map(String::as_str).collect();
        for key in ["success", "ticker", "exchange", "url", "timestamp", "data"] {
            assert!(keys.contains(&key), "missing {}", key);
        }
        assert_eq!(json["data"].as_object().unwrap().len(), 30);
    }
}
