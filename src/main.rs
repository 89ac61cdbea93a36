use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info, warn};

use proxy_scout::core::config::{load_scout_config, load_scout_config_from};
use proxy_scout::features::source::build_http_client;
use proxy_scout::{run, Category, RunOptions};

/// Extract mirror/proxy endpoint tables from a userscript into JSON and TSV.
///
/// With no arguments the script is read from `temp/ghproxy.user.js` and the
/// results are written to `dist/`.
#[derive(Parser, Debug)]
#[command(name = "proxy-scout", version, about, long_about = None)]
struct Cli {
    /// Script path or http(s) URL (GitHub blob links are fetched raw)
    #[arg(short, long)]
    input: Option<String>,

    /// Output directory, created if missing
    #[arg(short, long)]
    out_dir: Option<PathBuf>,

    /// Config file; a missing or malformed file is an error
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Array name to extract (repeatable); replaces the configured list
    #[arg(long = "category", value_name = "NAME")]
    categories: Vec<String>,

    /// Exit with status 2 when no endpoint was extracted at all
    #[arg(long)]
    fail_on_empty: bool,

    /// Print the run report as JSON on stdout
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Logs go to stderr so `--json` output stays machine-readable.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(env_filter)
        .init();

    let cli = Cli::parse();

    // Every fatal error is reported here, once.
    match try_main(cli).await {
        Ok(code) => code,
        Err(e) => {
            error!("Extraction failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn try_main(cli: Cli) -> anyhow::Result<ExitCode> {
    let mut config = match &cli.config {
        Some(path) => load_scout_config_from(path)?,
        None => load_scout_config(),
    };
    if let Some(input) = cli.input {
        config.input = Some(input);
    }
    if let Some(out_dir) = cli.out_dir {
        config.out_dir = Some(out_dir);
    }
    if !cli.categories.is_empty() {
        config.categories = Some(cli.categories.iter().map(Category::new).collect());
    }
    if cli.fail_on_empty {
        config.fail_on_empty = Some(true);
    }

    let opts = RunOptions::from_config(&config)?;
    info!(
        "Extracting {} categories from {}",
        opts.categories.len(),
        opts.source.describe()
    );

    let client = build_http_client()?;
    let report = run(&opts, &client).await?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    if report.is_empty() && config.resolve_fail_on_empty() {
        warn!("No endpoints extracted from {}", report.source);
        return Ok(ExitCode::from(2));
    }

    Ok(ExitCode::SUCCESS)
}
