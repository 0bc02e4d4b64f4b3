//! Slow-cycle refresh of the raw schedule cache.

use tokio::sync::RwLock;
use tracing::{info, warn};

use spawnwatch_core::RawSpawnEntry;
use spawnwatch_schedule::SpawnFeed;

/// Fetch the feed once and swap the cache on success.
///
/// Failures and empty batches keep the previous snapshot: stale schedule
/// data still resolves to correct future occurrences, while an empty
/// swap would silence all alerts until the next refresh.
pub async fn refresh_once(
    feed: &dyn SpawnFeed,
    cache: &RwLock<Option<Vec<RawSpawnEntry>>>,
) -> bool {
    match feed.fetch().await {
        Ok(entries) if entries.is_empty() => {
            warn!(
                source = feed.source_name(),
                "spawn feed returned no entries; keeping previous snapshot"
            );
            false
        }
        Ok(entries) => {
            info!(
                source = feed.source_name(),
                count = entries.len(),
                "spawn schedule refreshed"
            );
            *cache.write().await = Some(entries);
            true
        }
        Err(e) => {
            warn!(
                source = feed.source_name(),
                error = %e,
                "spawn feed refresh failed; keeping previous snapshot"
            );
            false
        }
    }
}
