use std::path::PathBuf;
use std::time::Duration;

use tracing::info;
use url::Url;

use crate::core::error::{Result, ScoutError};

/// Where the userscript comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptSource {
    File(PathBuf),
    Url(Url),
}

impl ScriptSource {
    /// `http://` / `https://` values are URLs, anything else is a path.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ScoutError::InvalidSource("empty input".to_string()));
        }

        let lower = trimmed.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            let parsed = Url::parse(trimmed)
                .map_err(|e| ScoutError::InvalidSource(format!("{}: {}", trimmed, e)))?;
            return Ok(Self::Url(to_raw_url(parsed)));
        }

        Ok(Self::File(PathBuf::from(trimmed)))
    }

    pub fn describe(&self) -> String {
        match self {
            Self::File(path) => path.display().to_string(),
            Self::Url(url) => url.to_string(),
        }
    }
}

/// Build the HTTP client used for remote scripts.
///
/// Timeouts come from `HTTP_TIMEOUT_SECS` (default 30) and
/// `HTTP_CONNECT_TIMEOUT_SECS` (default 10).
pub fn build_http_client() -> std::result::Result<reqwest::Client, reqwest::Error> {
    let http_timeout = std::env::var("HTTP_TIMEOUT_SECS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(30);
    let connect_timeout = std::env::var("HTTP_CONNECT_TIMEOUT_SECS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(10);

    reqwest::Client::builder()
        .timeout(Duration::from_secs(http_timeout))
        .connect_timeout(Duration::from_secs(connect_timeout))
        .build()
}

/// Read the script text. Failures here are fatal for the run.
pub async fn load_script(source: &ScriptSource, client: &reqwest::Client) -> Result<String> {
    match source {
        ScriptSource::File(path) => {
            info!("Reading script from {}", path.display());
            tokio::fs::read_to_string(path)
                .await
                .map_err(|source| ScoutError::ReadSource {
                    path: path.clone(),
                    source,
                })
        }
        ScriptSource::Url(url) => {
            info!("Fetching script from {}", url);
            let fetch_err = |source| ScoutError::FetchSource {
                url: url.to_string(),
                source,
            };
            let response = client.get(url.clone()).send().await.map_err(fetch_err)?;

            if !response.status().is_success() {
                return Err(ScoutError::HttpStatus {
                    url: url.to_string(),
                    status: response.status(),
                });
            }

            response.text().await.map_err(fetch_err)
        }
    }
}

/// Rewrite `github.com/<owner>/<repo>/blob/<branch>/<path>` to the matching
/// `raw.githubusercontent.com` URL; other URLs pass through untouched.
pub fn to_raw_url(url: Url) -> Url {
    if url.host_str() != Some("github.com") {
        return url;
    }

    let segments: Vec<&str> = url.path().split('/').filter(|s| !s.is_empty()).collect();
    let [owner, repo, "blob", branch, rest @ ..] = segments.as_slice() else {
        return url;
    };
    if rest.is_empty() {
        return url;
    }

    let raw = format!(
        "https://raw.githubusercontent.com/{}/{}/{}/{}",
        owner,
        repo,
        branch,
        rest.join("/")
    );
    Url::parse(&raw).unwrap_or(url)
}
