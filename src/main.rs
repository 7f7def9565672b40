//! Poll entry point: one run over all subscriptions, then exit.
//!
//! No arguments; credentials and the webhook come from the environment (or
//! `config/radar.toml`), which makes this directly runnable from a cron/CI
//! schedule.

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use release_radar::cache::FetchCache;
use release_radar::config::RadarConfig;
use release_radar::notify::discord::DiscordNotifier;
use release_radar::orchestrator::{Orchestrator, RunOptions};
use release_radar::sources::blog::BlogAdapter;
use release_radar::sources::catalog::CatalogAdapter;
use release_radar::store::JsonlStore;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("release_radar=info,warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .compact()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op when the vars come from the scheduler.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = RadarConfig::load()?;
    cfg.validate()?;

    let timeout = Duration::from_secs(cfg.http_timeout_secs);
    let catalog = CatalogAdapter::with_endpoints(
        cfg.api_id.clone(),
        cfg.affiliate_id.clone(),
        timeout,
        cfg.catalog_endpoint.clone(),
        cfg.performer_search_endpoint.clone(),
    );
    let blog = BlogAdapter::new(cfg.blog_base_url.clone(), timeout);
    let sink = DiscordNotifier::new(cfg.webhook_url.clone()).with_timeout(cfg.http_timeout_secs);
    let store = Arc::new(JsonlStore::new(&cfg.data_dir));

    let orchestrator = Orchestrator::new(
        Box::new(catalog),
        Box::new(blog),
        Box::new(sink),
        store,
        FetchCache::new(Duration::from_secs(cfg.cache_ttl_secs)),
        RunOptions {
            fetch_hits: cfg.fetch_hits,
            notify_scan_cap: cfg.notify_scan_cap,
            display_cap: cfg.display_cap,
            require_sample_media: cfg.require_sample_media,
            pace: Duration::from_secs(cfg.pace_secs),
            ..RunOptions::default()
        },
    );

    let report = orchestrator.run().await?;

    for item in &report.latest {
        tracing::info!(
            date = item.release_day(),
            entity = %item.entity,
            title = %item.title,
            "latest"
        );
    }
    tracing::info!(
        new_items = report.new_items,
        notified = report.notified_batches,
        sink_failures = report.sink_failures,
        ledger_failures = report.ledger_failures,
        "done"
    );
    Ok(())
}
