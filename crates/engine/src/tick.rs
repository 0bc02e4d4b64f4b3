//! One poll tick: sweep, aggregate, filter, deliver, persist.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, error, info, warn};

use spawnwatch_alert::{evaluate, Firing};
use spawnwatch_notify::{replace_live_message, MessageRef};
use spawnwatch_schedule::aggregate;

use crate::context::EngineContext;

/// What a tick did, mostly for logging and tests.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct TickOutcome {
    pub skipped_no_data: bool,
    pub groups_processed: usize,
    pub alerts_fired: usize,
    pub deliveries: usize,
}

/// Run one tick against the current wall clock.
pub async fn run_tick(ctx: &EngineContext) -> TickOutcome {
    run_tick_at(ctx, Utc::now()).await
}

/// Run one tick at an explicit instant (deterministic for tests).
///
/// Failures are contained per subscriber group: a delivery or
/// persistence error for one group never aborts the tick for the rest.
pub async fn run_tick_at(ctx: &EngineContext, now_utc: DateTime<Utc>) -> TickOutcome {
    let mut outcome = TickOutcome::default();

    // Sweep expired dedup entries once per tick.
    {
        let retention = Duration::hours(ctx.config.alerts.retention_hours as i64);
        let mut ledger = ctx.ledger.lock().await;
        if ledger.sweep(now_utc, retention) > 0 {
            if let Err(e) = ledger.persist() {
                error!(error = %e, "failed to persist ledger after sweep");
            }
        }
    }

    // Complete snapshot of the raw cache; the refresh loop never
    // publishes a partial batch.
    let entries = { ctx.feed_cache.read().await.clone() };
    let Some(entries) = entries else {
        debug!("no spawn data cached yet, skipping tick");
        outcome.skipped_no_data = true;
        return outcome;
    };

    // One reference-zone "now" snapshot for the whole aggregation pass.
    let now_local = now_utc.with_timezone(&ctx.config.alerts.reference_timezone);
    let occurrences = aggregate(&entries, now_local);

    let groups = { ctx.subscribers.lock().await.list_groups() };
    for group in groups {
        let Some(channel_id) = group.channel_id.as_deref() else {
            // No delivery target configured; skipped, not an error.
            continue;
        };
        outcome.groups_processed += 1;

        let leads: &[u32] = group
            .lead_minutes
            .as_deref()
            .unwrap_or(&ctx.config.alerts.lead_minutes);

        // Evaluate-and-record is serialized under the ledger lock, and
        // the ledger commits before delivery: a delivery failure after
        // this point loses the alert for this occurrence rather than
        // risking a duplicate on the next tick.
        let firings = {
            let mut ledger = ctx.ledger.lock().await;
            let firings = evaluate(&occurrences, now_utc, leads, &group.group_id, &mut ledger);
            if !firings.is_empty() {
                if let Err(e) = ledger.persist() {
                    error!(
                        group_id = %group.group_id,
                        error = %e,
                        "failed to persist alert ledger; dedup state held in memory until next tick"
                    );
                }
            }
            firings
        };
        if firings.is_empty() {
            continue;
        }
        outcome.alerts_fired += firings.len();

        let text = compose_alert_message(&firings, &group.mentions);
        let previous = group.live_message_id.clone().map(MessageRef);

        match replace_live_message(ctx.delivery.as_ref(), channel_id, previous.as_ref(), &text)
            .await
        {
            Ok(message) => {
                outcome.deliveries += 1;
                info!(
                    group_id = %group.group_id,
                    channel_id,
                    message_id = %message,
                    alerts = firings.len(),
                    "alert message delivered"
                );
                let mut subscribers = ctx.subscribers.lock().await;
                if let Err(e) = subscribers.set_live_message(&group.group_id, Some(message.0)) {
                    error!(
                        group_id = %group.group_id,
                        error = %e,
                        "failed to persist live message reference"
                    );
                }
            }
            Err(e) => {
                warn!(
                    group_id = %group.group_id,
                    channel_id,
                    error = %e,
                    "alert delivery failed; keeping previous live message reference"
                );
            }
        }
    }

    outcome
}

/// Batch a group's firings into one composite message, soonest first.
pub fn compose_alert_message(firings: &[Firing], mentions: &HashMap<String, String>) -> String {
    let mut sorted: Vec<&Firing> = firings.iter().collect();
    sorted.sort_by(|a, b| {
        a.lead_minutes
            .cmp(&b.lead_minutes)
            .then_with(|| a.subject.cmp(&b.subject))
    });

    sorted
        .iter()
        .map(|f| {
            let mention = mentions
                .get(&f.subject)
                .map(String::as_str)
                .unwrap_or(&f.subject);
            format!("{mention} spawns in {} minutes!", f.lead_minutes)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
