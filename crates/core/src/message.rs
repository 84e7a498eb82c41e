// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Message data model for the Comb (the file-based message bus).
//!
//! A [`Message`] is immutable after construction — the only way to get one
//! is [`Message::new`], which enforces `created_at <= expires_at`. Routing,
//! persistence, and delivery ordering live in `hive_comb`, not here; this
//! module is pure data.

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Identifier for a [`Message`]. Unique across the lifetime of a hive.
    pub struct MessageId("msg-");
}

/// The kind of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Request,
    Response,
    Notification,
    Error,
    TaskAssignment,
    TaskCompletion,
    Heartbeat,
    SystemAlert,
}

/// Delivery priority. Higher numeric value is delivered earlier.
///
/// `Ord`/`PartialOrd` derive in declaration order, which is why the
/// variants are listed Low-to-Urgent — `Priority::Urgent > Priority::Low`
/// falls out of the derive instead of a hand-written comparator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum Priority {
    Low = 1,
    Normal = 2,
    High = 3,
    Urgent = 4,
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Normal
    }
}

/// A durable, routed message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub from: String,
    pub to: String,
    pub kind: MessageKind,
    pub priority: Priority,
    pub body: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<MessageId>,
}

impl Message {
    /// Construct a new message, rejecting a TTL that has already elapsed
    /// relative to `created_at`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        from: impl Into<String>,
        to: impl Into<String>,
        kind: MessageKind,
        priority: Priority,
        body: serde_json::Value,
        created_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
        correlation_id: Option<MessageId>,
    ) -> Result<Self> {
        if created_at > expires_at {
            return Err(Error::InvalidMessage(
                "expires_at precedes created_at".to_string(),
            ));
        }
        Ok(Self {
            id: MessageId::new(),
            from: from.into(),
            to: to.into(),
            kind,
            priority,
            body,
            created_at,
            expires_at,
            correlation_id,
        })
    }

    /// True if `now` is at or past `expires_at` — ineligible for delivery.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// The filename this message is stored under inside an inbox
    /// directory: `<to>_<id>.json`.
    pub fn file_stem(&self) -> String {
        format!("{}_{}", self.to, self.id)
    }
}

/// Sort key for inbox delivery order: descending priority,
/// then ascending `created_at`.
pub fn delivery_key(m: &Message) -> (std::cmp::Reverse<Priority>, DateTime<Utc>) {
    (std::cmp::Reverse(m.priority), m.created_at)
}

#[cfg(test)]
#[path = "message_tests.rs"]
mod tests;
