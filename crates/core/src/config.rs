use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

fn env_u64(key: &str, default: u64) -> u64 {
    env_opt(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub alerts: AlertConfig,
    pub storage: StorageConfig,
    pub feed: FeedConfig,
    pub delivery: DeliveryConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    pub fn from_env() -> Self {
        Self {
            alerts: AlertConfig::from_env(),
            storage: StorageConfig::from_env(),
            feed: FeedConfig::from_env(),
            delivery: DeliveryConfig::from_env(),
        }
    }

    /// Cross-field validation.
    ///
    /// The ledger retention window must exceed the longest configured lead
    /// time plus one poll interval, so a key cannot both expire and
    /// legitimately re-fire for the same real-world occurrence.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.alerts.lead_minutes.is_empty() {
            return Err(CoreError::Config(
                "at least one alert lead time is required".to_string(),
            ));
        }
        if self.alerts.poll_interval_secs == 0 {
            return Err(CoreError::Config(
                "poll interval must be at least 1 second".to_string(),
            ));
        }
        if self.alerts.refresh_interval_hours == 0 {
            return Err(CoreError::Config(
                "refresh interval must be at least 1 hour".to_string(),
            ));
        }
        let max_lead_secs = u64::from(*self.alerts.lead_minutes.iter().max().unwrap_or(&0)) * 60;
        let retention_secs = self.alerts.retention_hours * 3600;
        if retention_secs <= max_lead_secs + self.alerts.poll_interval_secs {
            return Err(CoreError::Config(format!(
                "ledger retention ({}h) must exceed max lead time + poll interval ({}s)",
                self.alerts.retention_hours,
                max_lead_secs + self.alerts.poll_interval_secs
            )));
        }
        Ok(())
    }

    /// Print a redacted summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded:");
        tracing::info!(
            "  alerts:   poll={}s, refresh={}h, leads={:?}, retention={}h, tz={}",
            self.alerts.poll_interval_secs,
            self.alerts.refresh_interval_hours,
            self.alerts.lead_minutes,
            self.alerts.retention_hours,
            self.alerts.reference_timezone
        );
        tracing::info!("  storage:  data_dir={}", self.storage.data_dir.display());
        tracing::info!(
            "  feed:     url={}",
            self.feed.url.as_deref().unwrap_or("(none)")
        );
        tracing::info!("  delivery: configured={}", self.delivery.is_configured());
    }
}

// ── Alert timing ──────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertConfig {
    /// Poll tick period in seconds.
    pub poll_interval_secs: u64,
    /// Full feed refresh period in hours.
    pub refresh_interval_hours: u64,
    /// Lead-time thresholds in minutes, ascending, deduplicated.
    pub lead_minutes: Vec<u32>,
    /// Fired-alert ledger retention window in hours.
    pub retention_hours: u64,
    /// Fixed timezone the feed's weekday/time strings are expressed in.
    pub reference_timezone: Tz,
}

impl AlertConfig {
    fn from_env() -> Self {
        let mut lead_minutes: Vec<u32> = env_or("SPAWNWATCH_LEAD_MINUTES", "60,30,5")
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect();
        lead_minutes.sort_unstable();
        lead_minutes.dedup();

        let tz_name = env_or("SPAWNWATCH_TIMEZONE", "US/Pacific");
        let reference_timezone = Tz::from_str(&tz_name).unwrap_or_else(|_| {
            tracing::warn!(timezone = %tz_name, "unknown timezone, falling back to US/Pacific");
            chrono_tz::US::Pacific
        });

        Self {
            poll_interval_secs: env_u64("SPAWNWATCH_POLL_INTERVAL_SECS", 15),
            refresh_interval_hours: env_u64("SPAWNWATCH_REFRESH_INTERVAL_HOURS", 1),
            lead_minutes,
            retention_hours: env_u64("SPAWNWATCH_RETENTION_HOURS", 2),
            reference_timezone,
        }
    }
}

// ── Storage ───────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the ledger and subscriber state files.
    pub data_dir: PathBuf,
}

impl StorageConfig {
    fn from_env() -> Self {
        Self {
            data_dir: PathBuf::from(env_or("SPAWNWATCH_DATA_DIR", "data")),
        }
    }

    pub fn ledger_path(&self) -> PathBuf {
        self.data_dir.join("alerts_sent.json")
    }

    pub fn subscribers_path(&self) -> PathBuf {
        self.data_dir.join("subscribers.json")
    }
}

// ── Feed ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Endpoint serving the pre-parsed spawn schedule as JSON.
    pub url: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl FeedConfig {
    fn from_env() -> Self {
        Self {
            url: env_opt("SPAWNWATCH_FEED_URL"),
            timeout_secs: env_u64("SPAWNWATCH_FEED_TIMEOUT_SECS", 10),
        }
    }
}

// ── Delivery ──────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryConfig {
    /// Bot token for the chat platform (may be a `${ENV_VAR}` reference).
    pub bot_token: Option<String>,
    /// API base URL override (tests point this at a local server).
    pub api_base: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl DeliveryConfig {
    fn from_env() -> Self {
        Self {
            bot_token: env_opt("SPAWNWATCH_BOT_TOKEN"),
            api_base: env_opt("SPAWNWATCH_API_BASE"),
            timeout_secs: env_u64("SPAWNWATCH_DELIVERY_TIMEOUT_SECS", 10),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.bot_token.is_some()
    }
}
