use anyhow::{Context, Result};
use crashscraper::{Config, DataDownloader};
use std::env;
use tokio::time::Instant;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();
    info!("startup");

    // ─── 2) configuration ────────────────────────────────────────────
    let config = match env::var("CRASHSCRAPER_CONFIG") {
        Ok(path) => Config::from_yaml_file(&path)
            .with_context(|| format!("loading config from {}", path))?,
        Err(_) => Config::default(),
    };
    info!(data_dir = %config.data_dir.display(), index = %config.index_url, "configured");
    let output = config.output.clone();

    // ─── 3) assemble every region ────────────────────────────────────
    let start = Instant::now();
    let downloader = DataDownloader::new(config).context("setting up downloader")?;
    let dataset = downloader
        .get_all()
        .await
        .context("assembling dataset")?;
    info!(rows = dataset.len(), elapsed = ?start.elapsed(), "dataset ready");

    // ─── 4) export ───────────────────────────────────────────────────
    dataset
        .write_parquet(&output)
        .with_context(|| format!("writing {}", output.display()))?;
    info!(path = %output.display(), "all done");
    Ok(())
}
