use std::collections::HashSet;
use std::path::{Path, PathBuf};

use regex::Regex;

use super::error::{Result, ScoutError};
use super::types::{default_categories, Category};

// ---------------------------------------------------------------------------
// ScoutConfig: file-based config loader (proxy-scout.json) with env-var fallback
// ---------------------------------------------------------------------------

pub const ENV_CONFIG_PATH: &str = "PROXY_SCOUT_CONFIG";
pub const ENV_INPUT: &str = "PROXY_SCOUT_INPUT";
pub const ENV_OUT_DIR: &str = "PROXY_SCOUT_OUT_DIR";
pub const ENV_FAIL_ON_EMPTY: &str = "PROXY_SCOUT_FAIL_ON_EMPTY";

pub const DEFAULT_INPUT: &str = "temp/ghproxy.user.js";
pub const DEFAULT_OUT_DIR: &str = "dist";
pub const DEFAULT_NEWLINE_TOKEN: &str = "&#10;";

/// Combined outputs; category files may not use these names.
pub const COMBINED_JSON: &str = "all_proxies.json";
pub const COMBINED_TXT: &str = "all_proxies.txt";

/// Top-level config loaded from `proxy-scout.json`.
///
/// Every field is optional; the `resolve_*` helpers apply the fallback chain
/// JSON field → environment variable → built-in default.
#[derive(serde::Deserialize, Default, Clone, Debug)]
pub struct ScoutConfig {
    /// Script to scan: a file path or an `http(s)://` URL.
    pub input: Option<String>,
    /// Directory receiving the JSON/TSV artifacts. Created if absent.
    pub out_dir: Option<PathBuf>,
    /// Arrays to extract, in output order.
    pub categories: Option<Vec<Category>>,
    /// Exit with status 2 when no records were extracted at all.
    pub fail_on_empty: Option<bool>,
    /// Token inside descriptions that stands for a line break.
    pub newline_token: Option<String>,
}

impl ScoutConfig {
    /// Input: JSON field → `PROXY_SCOUT_INPUT` → `temp/ghproxy.user.js`.
    pub fn resolve_input(&self) -> String {
        non_blank(self.input.as_deref())
            .or_else(|| env_non_blank(ENV_INPUT))
            .unwrap_or_else(|| DEFAULT_INPUT.to_string())
    }

    /// Output dir: JSON field → `PROXY_SCOUT_OUT_DIR` → `dist`.
    pub fn resolve_out_dir(&self) -> PathBuf {
        self.out_dir
            .clone()
            .filter(|p| !p.as_os_str().is_empty())
            .or_else(|| env_non_blank(ENV_OUT_DIR).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUT_DIR))
    }

    /// JSON field → `PROXY_SCOUT_FAIL_ON_EMPTY` (`1`/`true`/`yes`/`on`) → `false`.
    pub fn resolve_fail_on_empty(&self) -> bool {
        if let Some(b) = self.fail_on_empty {
            return b;
        }
        env_non_blank(ENV_FAIL_ON_EMPTY)
            .map(|v| {
                matches!(
                    v.to_ascii_lowercase().as_str(),
                    "1" | "true" | "yes" | "on"
                )
            })
            .unwrap_or(false)
    }

    pub fn resolve_newline_token(&self) -> String {
        match &self.newline_token {
            Some(t) if !t.is_empty() => t.clone(),
            _ => DEFAULT_NEWLINE_TOKEN.to_string(),
        }
    }

    /// Categories from the config (or the ghproxy defaults), validated.
    pub fn resolve_categories(&self) -> Result<Vec<Category>> {
        let categories = match &self.categories {
            Some(list) if !list.is_empty() => list.clone(),
            _ => default_categories(),
        };
        validate_categories(&categories)?;
        Ok(categories)
    }
}

/// Category names must be plain identifiers and file names must be distinct
/// bare names that do not collide with the combined outputs.
pub fn validate_categories(categories: &[Category]) -> Result<()> {
    let ident = Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$")
        .map_err(|e| ScoutError::InvalidConfig(e.to_string()))?;

    let mut names = HashSet::new();
    let mut files = HashSet::new();
    for category in categories {
        if !ident.is_match(&category.name) {
            return Err(ScoutError::InvalidConfig(format!(
                "category name {:?} is not an identifier",
                category.name
            )));
        }
        if !names.insert(category.name.as_str()) {
            return Err(ScoutError::InvalidConfig(format!(
                "category {} listed twice",
                category.name
            )));
        }

        let file = category.file_name();
        if file.contains('/') || file.contains('\\') || file == "." || file == ".." {
            return Err(ScoutError::InvalidConfig(format!(
                "output file {:?} for {} must be a bare file name",
                file, category.name
            )));
        }
        if file == COMBINED_JSON || file == COMBINED_TXT {
            return Err(ScoutError::InvalidConfig(format!(
                "output file {} for {} collides with the combined output",
                file, category.name
            )));
        }
        if !files.insert(file.clone()) {
            return Err(ScoutError::InvalidConfig(format!(
                "output file {} used by more than one category",
                file
            )));
        }
    }
    Ok(())
}

/// Load `proxy-scout.json` from standard locations.
///
/// Search order (first found wins):
/// 1. `PROXY_SCOUT_CONFIG` env var path
/// 2. `./proxy-scout.json`
/// 3. `../proxy-scout.json`
/// 4. `~/.proxy-scout/config.json`
///
/// Missing file → `ScoutConfig::default()`.
/// Parse error → log a warning, return `ScoutConfig::default()`.
pub fn load_scout_config() -> ScoutConfig {
    let mut candidates = vec![
        PathBuf::from("proxy-scout.json"),
        PathBuf::from("../proxy-scout.json"),
    ];
    if let Ok(env_path) = std::env::var(ENV_CONFIG_PATH) {
        if !env_path.trim().is_empty() {
            candidates.insert(0, PathBuf::from(env_path.trim()));
        }
    }
    if let Some(home) = dirs::home_dir() {
        candidates.push(home.join(".proxy-scout").join("config.json"));
    }

    for path in &candidates {
        let Ok(contents) = std::fs::read_to_string(path) else {
            continue;
        };
        match serde_json::from_str::<ScoutConfig>(&contents) {
            Ok(cfg) => {
                tracing::info!("proxy-scout config loaded from {}", path.display());
                return cfg;
            }
            Err(e) => {
                tracing::warn!(
                    "proxy-scout config parse error at {}: {}; using defaults",
                    path.display(),
                    e
                );
                return ScoutConfig::default();
            }
        }
    }

    ScoutConfig::default()
}

/// Load an explicitly requested config file. Unlike [`load_scout_config`],
/// a missing or malformed file is an error.
pub fn load_scout_config_from(path: &Path) -> Result<ScoutConfig> {
    let contents = std::fs::read_to_string(path).map_err(|source| ScoutError::ReadConfig {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents)
        .map_err(|e| ScoutError::InvalidConfig(format!("{}: {}", path.display(), e)))
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn env_non_blank(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
