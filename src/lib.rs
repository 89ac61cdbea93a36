pub mod core;
pub mod features;
pub mod scraping;

// --- Primary core exports ---
pub use crate::core::types;
pub use crate::core::types::*;
pub use crate::core::{Result, ScoutError};

// --- Convenience paths ---
pub use features::pipeline::{run, RunOptions};
pub use scraping::array_scraper::{self as extract, extract_records, ArrayScraper};
