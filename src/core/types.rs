use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One proxy endpoint pulled out of an array literal.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ProxyRecord {
    pub url: String,
    pub region: String,
    /// May contain real newlines (decoded from `&#10;`).
    pub description: String,
}

/// A record tagged with the category it came from (combined output).
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct TaggedProxyRecord {
    #[serde(rename = "type")]
    pub proxy_type: String,
    pub url: String,
    pub region: String,
    pub description: String,
}

impl TaggedProxyRecord {
    pub fn new(proxy_type: &str, record: &ProxyRecord) -> Self {
        Self {
            proxy_type: proxy_type.to_string(),
            url: record.url.clone(),
            region: record.region.clone(),
            description: record.description.clone(),
        }
    }
}

/// A named array in the script and the file its records are written to.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Category {
    pub name: String,
    #[serde(default)]
    pub filename: Option<String>,
}

impl Category {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            filename: None,
        }
    }

    /// Output file name; defaults to `<name>.json`.
    pub fn file_name(&self) -> String {
        match &self.filename {
            Some(f) if !f.trim().is_empty() => f.trim().to_string(),
            _ => format!("{}.json", self.name),
        }
    }
}

/// Array names the ghproxy userscript declares, in output order.
pub const DEFAULT_CATEGORIES: [&str; 5] = [
    "download_url_us",
    "clone_url",
    "clone_ssh_url",
    "raw_url",
    "download_url",
];

pub fn default_categories() -> Vec<Category> {
    DEFAULT_CATEGORIES.iter().map(|n| Category::new(*n)).collect()
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ArrayStatus {
    /// Declaration found and closed by its matching bracket.
    Complete,
    /// Declaration found but the text ended before the closing bracket.
    Unterminated,
    /// No declaration with that name.
    Missing,
}

/// Detailed outcome of extracting one array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayExtraction {
    pub records: Vec<ProxyRecord>,
    pub status: ArrayStatus,
    /// Top-level elements that were not a 3-string tuple (or had an empty url).
    pub skipped: usize,
    /// Duplicate urls dropped after their first occurrence.
    pub duplicates: usize,
    /// 1-based line of the `name = [` declaration.
    pub line: Option<usize>,
}

impl ArrayExtraction {
    pub fn missing() -> Self {
        Self {
            records: Vec::new(),
            status: ArrayStatus::Missing,
            skipped: 0,
            duplicates: 0,
            line: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CategorySummary {
    pub name: String,
    pub file: String,
    pub status: ArrayStatus,
    pub count: usize,
    pub skipped: usize,
    pub duplicates: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
}

/// What a run produced; printed with `--json`.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ExtractionReport {
    pub generated_at: DateTime<Utc>,
    pub source: String,
    pub out_dir: String,
    pub categories: Vec<CategorySummary>,
    pub total: usize,
}

impl ExtractionReport {
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}
