//! Discord REST delivery adapter.
//!
//! Talks to the channel-message endpoints of the Discord bot API:
//! create, delete, and get message. Rate limits (HTTP 429) surface as
//! [`DeliveryError::RateLimited`] with the server-provided retry delay.

use std::time::Duration;

use crate::traits::{Delivery, DeliveryError, MessageRef};

const DEFAULT_API_BASE: &str = "https://discord.com/api/v10";

/// Sends and manages alert messages via a Discord bot token.
#[derive(Debug)]
pub struct DiscordDelivery {
    bot_token: String,
    api_base: String,
    client: reqwest::Client,
}

impl DiscordDelivery {
    /// Creates a new `DiscordDelivery` from configuration values.
    ///
    /// If `bot_token` starts with `${`, the value between `${` and `}` is
    /// resolved as an environment variable name. Returns
    /// [`DeliveryError::Config`] if the token is empty or the env var is
    /// missing. `api_base` overrides the public API URL (used by tests).
    pub fn from_config(
        bot_token: String,
        api_base: Option<String>,
        timeout: Duration,
    ) -> Result<Self, DeliveryError> {
        let resolved_token = if bot_token.starts_with("${") {
            let var_name = bot_token
                .strip_prefix("${")
                .and_then(|s| s.strip_suffix('}'))
                .ok_or_else(|| {
                    DeliveryError::Config(format!("Malformed env var reference: {bot_token}"))
                })?;
            std::env::var(var_name).map_err(|_| {
                DeliveryError::Config(format!("Environment variable '{var_name}' is not set"))
            })?
        } else {
            bot_token
        };

        if resolved_token.is_empty() {
            return Err(DeliveryError::Config(
                "Discord bot token must not be empty".to_string(),
            ));
        }

        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            bot_token: resolved_token,
            api_base: api_base.unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            client,
        })
    }

    fn messages_url(&self, channel_id: &str) -> String {
        format!("{}/channels/{}/messages", self.api_base, channel_id)
    }

    fn message_url(&self, channel_id: &str, message_id: &str) -> String {
        format!(
            "{}/channels/{}/messages/{}",
            self.api_base, channel_id, message_id
        )
    }

    fn auth_value(&self) -> String {
        format!("Bot {}", self.bot_token)
    }
}

/// Extract the `retry_after` seconds from a 429 response body, defaulting
/// to 30 when absent.
fn retry_after_secs(body: &serde_json::Value) -> u64 {
    body.get("retry_after")
        .and_then(|v| v.as_f64())
        .map(|s| s.ceil() as u64)
        .unwrap_or(30)
}

#[async_trait::async_trait]
impl Delivery for DiscordDelivery {
    async fn send(&self, channel_id: &str, text: &str) -> Result<MessageRef, DeliveryError> {
        let body = serde_json::json!({ "content": text });

        let response = self
            .client
            .post(self.messages_url(channel_id))
            .header(reqwest::header::AUTHORIZATION, self.auth_value())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let resp_body: serde_json::Value = response.json().await.unwrap_or_default();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(DeliveryError::RateLimited {
                retry_after_secs: retry_after_secs(&resp_body),
            });
        }

        if !status.is_success() {
            let message = resp_body
                .get("message")
                .and_then(|v| v.as_str())
                .unwrap_or("unknown Discord API error")
                .to_string();
            tracing::warn!(channel_id, %status, %message, "message send rejected");
            return Err(DeliveryError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let message_id = resp_body
            .get("id")
            .and_then(|v| v.as_str())
            .ok_or_else(|| DeliveryError::Api {
                status: status.as_u16(),
                message: "response missing message id".to_string(),
            })?;

        tracing::debug!(channel_id, message_id, "alert message sent");
        Ok(MessageRef(message_id.to_string()))
    }

    async fn delete(&self, channel_id: &str, message: &MessageRef) -> Result<(), DeliveryError> {
        let response = self
            .client
            .delete(self.message_url(channel_id, &message.0))
            .header(reqwest::header::AUTHORIZATION, self.auth_value())
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            tracing::debug!(channel_id, message_id = %message, "message deleted");
            return Ok(());
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let resp_body: serde_json::Value = response.json().await.unwrap_or_default();
            return Err(DeliveryError::RateLimited {
                retry_after_secs: retry_after_secs(&resp_body),
            });
        }

        Err(DeliveryError::Api {
            status: status.as_u16(),
            message: format!("delete returned {status}"),
        })
    }

    async fn fetch(&self, channel_id: &str, message: &MessageRef) -> Result<bool, DeliveryError> {
        let response = self
            .client
            .get(self.message_url(channel_id, &message.0))
            .header(reqwest::header::AUTHORIZATION, self.auth_value())
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(true);
        }
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(false);
        }

        Err(DeliveryError::Api {
            status: status.as_u16(),
            message: format!("fetch returned {status}"),
        })
    }

    fn channel_name(&self) -> &str {
        "discord"
    }
}
