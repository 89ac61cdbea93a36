use std::path::PathBuf;

use proxy_scout::features::pipeline::{combine, extract_categories};
use proxy_scout::features::source::ScriptSource;
use proxy_scout::{
    default_categories, run, ArrayScraper, ArrayStatus, ProxyRecord, RunOptions,
    TaggedProxyRecord,
};

fn init_logger() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("ghproxy.user.js")
}

fn options(out_dir: PathBuf) -> RunOptions {
    RunOptions {
        source: ScriptSource::File(fixture_path()),
        out_dir,
        categories: default_categories(),
        newline_token: "&#10;".to_string(),
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: PathBuf) -> T {
    let body = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("missing output {}: {}", path.display(), e));
    serde_json::from_str(&body).unwrap()
}

#[tokio::test]
async fn test_full_run_writes_all_artifacts() {
    init_logger();
    let tmp = tempfile::tempdir().unwrap();
    let out_dir = tmp.path().join("dist");
    let opts = options(out_dir.clone());

    let started = chrono::Utc::now();
    let report = run(&opts, &reqwest::Client::new()).await.unwrap();
    assert!(report.generated_at >= started && report.generated_at <= chrono::Utc::now());

    let counts: Vec<(&str, usize)> = report
        .categories
        .iter()
        .map(|c| (c.name.as_str(), c.count))
        .collect();
    assert_eq!(
        counts,
        vec![
            ("download_url_us", 4),
            ("clone_url", 2),
            ("clone_ssh_url", 2),
            ("raw_url", 3),
            ("download_url", 2),
        ]
    );
    assert_eq!(report.total, 13);
    assert!(report.categories.iter().all(|c| c.status == ArrayStatus::Complete));

    let clone_summary = &report.categories[1];
    assert_eq!(clone_summary.skipped, 1);
    let us_summary = &report.categories[0];
    assert_eq!(us_summary.duplicates, 1);

    // Per-category files, and the combined file adds up to them.
    let mut per_category_total = 0;
    let combined: Vec<TaggedProxyRecord> = read_json(out_dir.join("all_proxies.json"));
    for summary in &report.categories {
        let records: Vec<ProxyRecord> = read_json(out_dir.join(&summary.file));
        assert_eq!(records.len(), summary.count);
        per_category_total += records.len();

        let tagged: Vec<&TaggedProxyRecord> = combined
            .iter()
            .filter(|r| r.proxy_type == summary.name)
            .collect();
        assert_eq!(tagged.len(), records.len());
        for (t, r) in tagged.iter().zip(&records) {
            assert_eq!(t.url, r.url);
            assert_eq!(t.region, r.region);
            assert_eq!(t.description, r.description);
        }
    }
    assert_eq!(combined.len(), per_category_total);

    let tsv = std::fs::read_to_string(out_dir.join("all_proxies.txt")).unwrap();
    let lines: Vec<&str> = tsv.split('\n').collect();
    assert_eq!(lines.len(), 13);
    assert_eq!(
        lines[0],
        "download_url_us\thttps://gh.h233.eu.org/https://github.com\t美国"
    );
    assert!(!tsv.ends_with('\n'));
}

#[tokio::test]
async fn test_descriptions_keep_newlines() {
    let tmp = tempfile::tempdir().unwrap();
    let opts = options(tmp.path().to_path_buf());
    run(&opts, &reqwest::Client::new()).await.unwrap();

    let clone: Vec<ProxyRecord> = read_json(tmp.path().join("clone_url.json"));
    assert_eq!(clone[0].url, "https://gitclone.com");
    assert_eq!(
        clone[0].description,
        "[中国 国内] - 该公益加速源由 [GitClone] 提供\n\n - 缓存：有\n - 首次比较慢，缓存后较快"
    );

    let us: Vec<ProxyRecord> = read_json(tmp.path().join("download_url_us.json"));
    // Entry wrapped over two lines in the source.
    assert_eq!(
        us[3].description,
        "[美国 Cloudflare CDN] - 该公益加速源由 [gh-proxy.com] 提供"
    );
}

#[tokio::test]
async fn test_rerun_is_idempotent() {
    let tmp = tempfile::tempdir().unwrap();
    let opts = options(tmp.path().to_path_buf());
    let client = reqwest::Client::new();

    run(&opts, &client).await.unwrap();
    let first = std::fs::read_to_string(tmp.path().join("all_proxies.json")).unwrap();
    run(&opts, &client).await.unwrap();
    let second = std::fs::read_to_string(tmp.path().join("all_proxies.json")).unwrap();

    assert_eq!(first, second);
}

#[tokio::test]
async fn test_missing_script_is_fatal() {
    let tmp = tempfile::tempdir().unwrap();
    let mut opts = options(tmp.path().join("dist"));
    opts.source = ScriptSource::File(tmp.path().join("nope.user.js"));

    let err = run(&opts, &reqwest::Client::new()).await.unwrap_err();
    assert!(matches!(err, proxy_scout::ScoutError::ReadSource { .. }));
    assert!(!tmp.path().join("dist").exists());
}

#[test]
fn test_script_without_tables_reports_empty() {
    let script = "(function() { console.log('no tables here'); })();";
    let results = extract_categories(script, &default_categories(), &ArrayScraper::new());

    assert!(results
        .iter()
        .all(|r| r.extraction.status == ArrayStatus::Missing));
    assert!(combine(&results).is_empty());
}
