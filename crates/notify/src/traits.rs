//! Delivery trait definition and shared error types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur talking to the delivery collaborator.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("delivery API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Rate limited: retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Opaque reference to a delivered message, as handed back by the
/// platform. Stored per subscriber group so the next alert can replace
/// the previous one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRef(pub String);

impl fmt::Display for MessageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Chat-platform collaborator contract.
///
/// The engine never assumes delivery succeeded without an explicit `Ok`;
/// on failure it leaves the stored live-message reference unchanged
/// rather than pointing it at a message that may not exist.
#[async_trait::async_trait]
pub trait Delivery: Send + Sync {
    /// Send `text` to a channel, returning the new message reference.
    async fn send(&self, channel_id: &str, text: &str) -> Result<MessageRef, DeliveryError>;

    /// Delete a previously sent message. Deleting a message that is
    /// already gone is an `Api` error the caller may ignore.
    async fn delete(&self, channel_id: &str, message: &MessageRef) -> Result<(), DeliveryError>;

    /// Whether the referenced message still exists.
    async fn fetch(&self, channel_id: &str, message: &MessageRef) -> Result<bool, DeliveryError>;

    /// Human-readable name for this platform (e.g., "discord").
    fn channel_name(&self) -> &str;
}
