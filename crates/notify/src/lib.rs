//! Delivery boundary for spawn alerts.
//!
//! This crate provides:
//! - `Delivery` trait for the chat-platform collaborator (send, delete,
//!   fetch a message by reference)
//! - Discord REST adapter
//! - `replace_live_message` — delete-then-send replacement of a group's
//!   live alert message

pub mod discord;
pub mod dispatcher;
pub mod traits;

pub use discord::DiscordDelivery;
pub use dispatcher::replace_live_message;
pub use traits::{Delivery, DeliveryError, MessageRef};
