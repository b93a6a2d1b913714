// src/lib.rs
//! Turns a StockStory company page into a typed fact sheet of analysis data.

pub mod extractors;
pub mod stockstory;
pub mod utils;

pub use extractors::{extract_fact_sheet, FactSheet};
pub use stockstory::models::{StockPage, SyncResponse};
pub use stockstory::sync_stock;
