use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::core::config::{COMBINED_JSON, COMBINED_TXT};
use crate::core::error::{Result, ScoutError};
use crate::types::{ProxyRecord, TaggedProxyRecord};

/// Create `dir` (and parents) when it does not exist yet.
pub async fn ensure_out_dir(dir: &Path) -> Result<()> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|source| ScoutError::CreateDir {
            path: dir.to_path_buf(),
            source,
        })
}

/// Write one category's records as a pretty-printed JSON array.
pub async fn write_category(
    dir: &Path,
    file_name: &str,
    records: &[ProxyRecord],
) -> Result<PathBuf> {
    let path = dir.join(file_name);
    write_json(&path, records).await?;
    Ok(path)
}

/// Write `all_proxies.json` and `all_proxies.txt`.
pub async fn write_combined(dir: &Path, records: &[TaggedProxyRecord]) -> Result<()> {
    write_json(&dir.join(COMBINED_JSON), records).await?;
    write_text(&dir.join(COMBINED_TXT), &render_tsv(records)).await
}

/// One `type\turl\tregion` line per record, no trailing newline.
pub fn render_tsv(records: &[TaggedProxyRecord]) -> String {
    records
        .iter()
        .map(|r| {
            format!(
                "{}\t{}\t{}",
                tsv_field(&r.proxy_type),
                tsv_field(&r.url),
                tsv_field(&r.region)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn tsv_field(value: &str) -> String {
    value.replace(['\t', '\r', '\n'], " ")
}

async fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let body = serde_json::to_string_pretty(value).map_err(|source| ScoutError::Serialize {
        what: path.display().to_string(),
        source,
    })?;
    write_text(path, &body).await
}

async fn write_text(path: &Path, content: &str) -> Result<()> {
    tokio::fs::write(path, content)
        .await
        .map_err(|source| ScoutError::WriteOutput {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tagged(t: &str, url: &str, region: &str) -> TaggedProxyRecord {
        TaggedProxyRecord {
            proxy_type: t.to_string(),
            url: url.to_string(),
            region: region.to_string(),
            description: "desc\nwith newline".to_string(),
        }
    }

    #[test]
    fn test_render_tsv() {
        let records = vec![
            tagged("clone_url", "https://a", "香港"),
            tagged("raw_url", "https://b", "multi\tpart"),
        ];
        assert_eq!(
            render_tsv(&records),
            "clone_url\thttps://a\t香港\nraw_url\thttps://b\tmulti part"
        );
        assert_eq!(render_tsv(&[]), "");
    }

    #[test]
    fn test_combined_json_puts_type_first() {
        let json = serde_json::to_string_pretty(&[tagged("raw_url", "https://b", "r")]).unwrap();
        let type_pos = json.find("\"type\"").unwrap();
        let url_pos = json.find("\"url\"").unwrap();
        assert!(type_pos < url_pos);
        assert!(json.contains("\"description\": \"desc\\nwith newline\""));
    }

    #[test]
    fn test_write_creates_nested_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("dist").join("nested");
        let records = vec![ProxyRecord {
            url: "https://a".to_string(),
            region: "r".to_string(),
            description: "d".to_string(),
        }];

        let path = tokio_test::block_on(async {
            ensure_out_dir(&dir).await.unwrap();
            write_category(&dir, "clone_url.json", &records).await.unwrap()
        });

        let written: Vec<ProxyRecord> =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(written, records);
    }
}
