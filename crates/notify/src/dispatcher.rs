//! Replace-not-append delivery of a group's live alert message.
//!
//! Each subscriber group has at most one live alert message. New
//! composite alerts replace it: the previous message is deleted first
//! (best effort), then the new one is sent. A failed delete is tolerated,
//! the message may already have been removed by hand; a failed send
//! propagates so the caller keeps the old reference.

use tracing::debug;

use crate::traits::{Delivery, DeliveryError, MessageRef};

/// Delete the previous live message (if any), then send the replacement.
///
/// Returns the new message reference on success. The delete is best
/// effort: its failure is logged and ignored. Only the send result
/// decides success, so a caller never stores a reference to a message
/// that was not delivered.
pub async fn replace_live_message(
    delivery: &dyn Delivery,
    channel_id: &str,
    previous: Option<&MessageRef>,
    text: &str,
) -> Result<MessageRef, DeliveryError> {
    if let Some(prev) = previous {
        if let Err(e) = delivery.delete(channel_id, prev).await {
            debug!(
                channel_id,
                message_id = %prev,
                error = %e,
                "previous live message could not be deleted"
            );
        }
    }

    delivery.send(channel_id, text).await
}
