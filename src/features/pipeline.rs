use std::path::PathBuf;

use tracing::{debug, info, warn};

use super::export;
use super::source::{load_script, ScriptSource};
use crate::core::config::ScoutConfig;
use crate::core::error::Result;
use crate::scraping::array_scraper::{ArrayScraper, ScannedScript};
use crate::types::{
    ArrayExtraction, ArrayStatus, Category, CategorySummary, ExtractionReport, TaggedProxyRecord,
};

/// Everything a run needs, resolved from config and CLI flags.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub source: ScriptSource,
    pub out_dir: PathBuf,
    pub categories: Vec<Category>,
    pub newline_token: String,
}

impl RunOptions {
    pub fn from_config(config: &ScoutConfig) -> Result<Self> {
        Ok(Self {
            source: ScriptSource::parse(&config.resolve_input())?,
            out_dir: config.resolve_out_dir(),
            categories: config.resolve_categories()?,
            newline_token: config.resolve_newline_token(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct CategoryResult {
    pub category: Category,
    pub extraction: ArrayExtraction,
}

/// Extract every category from one script. Each array is handled on its
/// own: a missing or broken array only affects its own result.
pub fn extract_categories(
    script: &str,
    categories: &[Category],
    scraper: &ArrayScraper,
) -> Vec<CategoryResult> {
    let scanned = ScannedScript::new(script);

    categories
        .iter()
        .map(|category| {
            let extraction = scraper.extract_scanned(&scanned, &category.name);
            log_extraction(&category.name, &extraction);
            CategoryResult {
                category: category.clone(),
                extraction,
            }
        })
        .collect()
}

fn log_extraction(name: &str, extraction: &ArrayExtraction) {
    match extraction.status {
        ArrayStatus::Missing => warn!("Array {} not found in script", name),
        ArrayStatus::Unterminated => warn!(
            "Array {} (line {}) is not closed; keeping {} entries read before end of input",
            name,
            extraction.line.unwrap_or_default(),
            extraction.records.len()
        ),
        ArrayStatus::Complete => {}
    }
    if extraction.skipped > 0 || extraction.duplicates > 0 {
        debug!(
            "Array {}: skipped {} malformed entries, dropped {} duplicate urls",
            name, extraction.skipped, extraction.duplicates
        );
    }
    info!(
        "Parsed {}: {} valid endpoints",
        name,
        extraction.records.len()
    );
}

/// Flatten per-category results into the combined list, category order
/// first and record order within each category.
pub fn combine(results: &[CategoryResult]) -> Vec<TaggedProxyRecord> {
    results
        .iter()
        .flat_map(|r| {
            r.extraction
                .records
                .iter()
                .map(|record| TaggedProxyRecord::new(&r.category.name, record))
        })
        .collect()
}

/// Write every artifact for already extracted results and build the report.
pub async fn export_results(
    results: &[CategoryResult],
    opts: &RunOptions,
) -> Result<ExtractionReport> {
    export::ensure_out_dir(&opts.out_dir).await?;

    let mut summaries = Vec::with_capacity(results.len());
    for result in results {
        let file = result.category.file_name();
        let path =
            export::write_category(&opts.out_dir, &file, &result.extraction.records).await?;
        debug!("Wrote {}", path.display());

        summaries.push(CategorySummary {
            name: result.category.name.clone(),
            file,
            status: result.extraction.status,
            count: result.extraction.records.len(),
            skipped: result.extraction.skipped,
            duplicates: result.extraction.duplicates,
            line: result.extraction.line,
        });
    }

    let combined = combine(results);
    export::write_combined(&opts.out_dir, &combined).await?;

    Ok(ExtractionReport {
        generated_at: chrono::Utc::now(),
        source: opts.source.describe(),
        out_dir: opts.out_dir.display().to_string(),
        categories: summaries,
        total: combined.len(),
    })
}

/// Load the script, extract all categories and write the outputs.
pub async fn run(opts: &RunOptions, client: &reqwest::Client) -> Result<ExtractionReport> {
    let script = load_script(&opts.source, client).await?;
    let scraper = ArrayScraper::with_newline_token(opts.newline_token.clone());

    let results = extract_categories(&script, &opts.categories, &scraper);
    let report = export_results(&results, opts).await?;

    info!(
        "Extraction finished: {} endpoints in total, written to {}",
        report.total, report.out_dir
    );
    Ok(report)
}
