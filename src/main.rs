// src/main.rs
use std::path::PathBuf;
use std::time::Duration;

use clap::error::ErrorKind;
use clap::Parser;
use stockstory_extractor::stockstory::client::{HttpPageFetcher, DEFAULT_TIMEOUT_SECS};
use stockstory_extractor::stockstory::models::{StockPage, SyncResponse, DEFAULT_BASE_URL};
use stockstory_extractor::stockstory::{sync_from_body, sync_stock};
use stockstory_extractor::utils::{self, AppError};

const USAGE: &str = "Usage: stockstory <TICKER> <EXCHANGE>";

/// Extracts StockStory analysis facts for one stock and prints them as JSON
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Ticker symbol of the company (e.g. meta)
    ticker: String,

    /// Exchange the stock is listed on (e.g. nasdaq)
    exchange: String,

    /// Base URL of the stock pages
    #[arg(long, env = "STOCKSTORY_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Request timeout in seconds
    #[arg(long, env = "STOCKSTORY_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout: u64,

    /// Read the page from a saved HTML file instead of fetching it
    #[arg(long)]
    html_file: Option<PathBuf>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // 1. Setup Logging (reads RUST_LOG env var)
    utils::logging::setup_logging();

    // 2. Parse CLI Arguments; anything but --help/--version gets a JSON failure
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => {
            tracing::error!("Invalid arguments: {}", e.kind());
            print_response(&SyncResponse::usage(USAGE), false)?;
            std::process::exit(1);
        }
    };
    tracing::info!("Starting processing for args: {:?}", args);

    // 3. Fetch (or read) the page and extract
    let page = StockPage::new(&args.ticker, &args.exchange);
    let response = match run(&args, &page).await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!("Processing failed for {}: {}", page.ticker(), e);
            SyncResponse::failure(&page, e.to_string())
        }
    };

    // 4. Emit the envelope
    print_response(&response, args.pretty)?;
    if !response.is_success() {
        std::process::exit(1);
    }

    tracing::info!("Processing finished for {}", page.ticker());
    Ok(())
}

async fn run(args: &Args, page: &StockPage) -> Result<SyncResponse, AppError> {
    if let Some(path) = &args.html_file {
        tracing::info!("Reading saved page from: {}", path.display());
        let body = std::fs::read(path)?;
        return Ok(sync_from_body(page, &page.url(&args.base_url), &body));
    }

    if args.timeout == 0 {
        return Err(AppError::Config("timeout must be at least 1 second".to_string()));
    }
    let fetcher = HttpPageFetcher::new(Duration::from_secs(args.timeout))?;
    Ok(sync_stock(&fetcher, page, &args.base_url).await)
}

fn print_response(response: &SyncResponse, pretty: bool) -> Result<(), AppError> {
    let json = if pretty {
        serde_json::to_string_pretty(response)?
    } else {
        serde_json::to_string(response)?
    };
    println!("{}", json);
    Ok(())
}
