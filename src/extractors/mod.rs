// src/extractors/mod.rs
pub mod assembler;
pub mod fact_sheet;
pub mod heuristic;
pub mod normalize;
pub mod rules;
pub mod structured;

// Re-export key extraction types for convenience
pub use assembler::extract_fact_sheet;
pub use fact_sheet::{FactSheet, Label, Metric};
pub use normalize::{normalize, NormalizedPage};
