// src/utils/error.rs
use thiserror::Error;

// Define specific error types for different parts of the application
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Request timeout")]
    Timeout,

    #[error("Stock page not found: {0}")]
    NotFound(String),

    #[error("HTTP {}: Failed to fetch {}", .status.as_u16(), .url)]
    Http {
        status: reqwest::StatusCode,
        url: String,
    },

    #[error("Request failed: {0}")]
    Network(reqwest::Error),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        // Timeouts get their own message so callers can tell them apart
        if err.is_timeout() {
            FetchError::Timeout
        } else {
            FetchError::Network(err)
        }
    }
}

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Page body is not valid UTF-8: {0}")]
    Encoding(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error), // Automatically convert IO errors

    #[error("Stock page fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_messages() {
        let not_found = FetchError::NotFound("https://stockstory.org/us/stocks/nasdaq/zzzz".to_string());
        assert_eq!(
            not_found.to_string(),
            "Stock page not found: https://stockstory.org/us/stocks/nasdaq/zzzz"
        );

        let http = FetchError::Http {
            status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
            url: "https://stockstory.org/us/stocks/nasdaq/meta".to_string(),
        };
        assert_eq!(
            http.to_string(),
            "HTTP 503: Failed to fetch https://stockstory.org/us/stocks/nasdaq/meta"
        );

        assert_eq!(FetchError::Timeout.to_string(), "Request timeout");
    }

    #[test]
    fn test_app_error_wraps_fetch_error() {
        let err: AppError = FetchError::Timeout.into();
        assert_eq!(err.to_string(), "Stock page fetch failed: Request timeout");
    }
}
