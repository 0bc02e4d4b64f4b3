//! spawn-worker — polls the spawn schedule and delivers lead-time alerts.
//!
//! Fast loop: every poll interval, resolve upcoming occurrences and fire
//! any lead-time alerts that crossed a threshold since the last tick.
//! Slow loop: re-fetch the raw schedule feed on a multi-hour cycle.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tokio::sync::watch;
use tracing::{error, info};

use spawnwatch_alert::{AlertLedger, SubscriberStore};
use spawnwatch_core::{load_dotenv, Config};
use spawnwatch_engine::{Engine, EngineContext};
use spawnwatch_notify::DiscordDelivery;
use spawnwatch_schedule::HttpFeed;

// ── CLI ─────────────────────────────────────────────────────────────

/// Spawn alert worker — weekly boss schedule polling and alert delivery.
#[derive(Parser, Debug)]
#[command(name = "spawn-worker", version, about)]
struct Cli {
    /// Directory holding the ledger and subscriber state files.
    #[arg(long, env = "SPAWNWATCH_DATA_DIR")]
    data_dir: Option<String>,

    /// Endpoint serving the spawn schedule as JSON.
    #[arg(long, env = "SPAWNWATCH_FEED_URL")]
    feed_url: Option<String>,

    /// Poll tick period in seconds.
    #[arg(long)]
    poll_interval: Option<u64>,
}

// ── main ────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = Config::from_env();
    if let Some(data_dir) = cli.data_dir {
        config.storage.data_dir = data_dir.into();
    }
    if let Some(url) = cli.feed_url {
        config.feed.url = Some(url);
    }
    if let Some(secs) = cli.poll_interval {
        config.alerts.poll_interval_secs = secs;
    }
    config.validate().context("invalid configuration")?;
    config.log_summary();

    let feed_url = config
        .feed
        .url
        .clone()
        .context("SPAWNWATCH_FEED_URL is required")?;
    let bot_token = config
        .delivery
        .bot_token
        .clone()
        .context("SPAWNWATCH_BOT_TOKEN is required")?;

    let feed = Arc::new(HttpFeed::new(
        feed_url,
        Duration::from_secs(config.feed.timeout_secs),
    )?);
    let delivery = Arc::new(DiscordDelivery::from_config(
        bot_token,
        config.delivery.api_base.clone(),
        Duration::from_secs(config.delivery.timeout_secs),
    )?);

    let ledger = AlertLedger::load(config.storage.ledger_path())
        .context("failed to load alert ledger")?;
    let subscribers = SubscriberStore::load(config.storage.subscribers_path())
        .context("failed to load subscriber store")?;
    info!(
        fired = ledger.len(),
        groups = subscribers.len(),
        "durable state loaded"
    );

    let ctx = Arc::new(EngineContext::new(
        config, feed, delivery, ledger, subscribers,
    ));
    let engine = Engine::new(ctx);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for shutdown signal");
            return;
        }
        info!("interrupt received, shutting down");
        let _ = shutdown_tx.send(true);
    });

    engine.run(shutdown_rx).await
}
