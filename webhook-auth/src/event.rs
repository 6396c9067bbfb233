//! The decoded form of a verified webhook delivery.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Stripe event envelope.
///
/// Only the envelope is typed; `data.object` stays opaque JSON so that
/// downstream handlers decide how much of it to decode.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Event {
    /// Unique identifier, e.g. `evt_1NG8Du2eZvKYlo2CUI79vXWy`.
    pub id: String,
    /// Event category, e.g. `payment_intent.succeeded`.
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub object: Option<String>,
    #[serde(default)]
    pub api_version: Option<String>,
    /// Unix timestamp of when the event was created.
    #[serde(default)]
    pub created: i64,
    #[serde(default)]
    pub livemode: bool,
    #[serde(default)]
    pub pending_webhooks: i64,
    /// Details of the API request that triggered the event, if any.
    #[serde(default)]
    pub request: Option<Value>,
    #[serde(default)]
    pub data: EventData,
}

/// Payload section of an [`Event`].
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct EventData {
    /// The resource the event is about.
    #[serde(default)]
    pub object: Value,
    /// Changed attributes and their previous values, present on `*.updated` events.
    #[serde(default)]
    pub previous_attributes: Option<Value>,
}

impl Event {
    /// Decodes an event from the raw request body.
    pub fn from_slice(payload: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(payload)
    }
}
