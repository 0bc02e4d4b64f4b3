//! Long-running engine: fast poll loop plus slow refresh loop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::context::EngineContext;
use crate::refresh::refresh_once;
use crate::tick::run_tick;

pub struct Engine {
    ctx: Arc<EngineContext>,
    started: AtomicBool,
}

impl Engine {
    pub fn new(ctx: Arc<EngineContext>) -> Self {
        Self {
            ctx,
            started: AtomicBool::new(false),
        }
    }

    pub fn context(&self) -> &Arc<EngineContext> {
        &self.ctx
    }

    /// Run both loops until `shutdown` flips to true.
    ///
    /// Starting an engine that is already running is a no-op. Shutdown is
    /// graceful: an in-flight tick runs to completion before the loop
    /// exits, so ledger writes are never cut off mid-persist.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> anyhow::Result<()> {
        if self.started.swap(true, Ordering::SeqCst) {
            warn!("engine already running, ignoring duplicate start");
            return Ok(());
        }

        // Prime the schedule cache before the first poll tick; failure is
        // tolerated, the refresh loop will retry on its own cycle.
        refresh_once(self.ctx.feed.as_ref(), &self.ctx.feed_cache).await;

        let refresh_handle = {
            let ctx = self.ctx.clone();
            let mut shutdown = shutdown.clone();
            let period =
                Duration::from_secs(ctx.config.alerts.refresh_interval_hours * 3600);
            tokio::spawn(async move {
                let mut ticker = interval(period);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                // First tick completes immediately; the initial refresh
                // already ran.
                ticker.tick().await;
                loop {
                    tokio::select! {
                        _ = ticker.tick() => {
                            refresh_once(ctx.feed.as_ref(), &ctx.feed_cache).await;
                        }
                        _ = shutdown.changed() => {
                            debug!("refresh loop stopping");
                            break;
                        }
                    }
                }
            })
        };

        info!(
            poll_interval_secs = self.ctx.config.alerts.poll_interval_secs,
            refresh_interval_hours = self.ctx.config.alerts.refresh_interval_hours,
            "engine started"
        );

        let mut ticker = interval(Duration::from_secs(
            self.ctx.config.alerts.poll_interval_secs,
        ));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let outcome = run_tick(&self.ctx).await;
                    if outcome.alerts_fired > 0 {
                        debug!(
                            groups = outcome.groups_processed,
                            fired = outcome.alerts_fired,
                            delivered = outcome.deliveries,
                            "tick complete"
                        );
                    }
                }
                _ = shutdown.changed() => {
                    info!("shutdown requested, stopping poll loop");
                    break;
                }
            }
        }

        refresh_handle.await?;
        info!("engine stopped");
        Ok(())
    }
}
