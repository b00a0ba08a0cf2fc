//! Messages carried by the bus.

use serde::de::DeserializeOwned;
use serde::Serialize;

/// A message handed to a [`Sender`](super::Sender).
#[derive(Clone, Debug)]
pub struct Event {
    /// Unique identifier for this message
    pub id: String,
    /// Message type (e.g., "PaymentRequested")
    pub event_type: String,
    /// JSON payload
    pub payload: Vec<u8>,
    /// Optional metadata (correlation ids, source service, ...)
    pub metadata: Option<Vec<(String, String)>>,
}

impl Event {
    /// Create a new event with the given type and raw payload.
    pub fn new(id: impl Into<String>, event_type: impl Into<String>, payload: Vec<u8>) -> Self {
        Self {
            id: id.into(),
            event_type: event_type.into(),
            payload,
            metadata: None,
        }
    }

    /// Create an event with a JSON-serialized payload.
    pub fn json<T: Serialize>(
        id: impl Into<String>,
        event_type: impl Into<String>,
        payload: &T,
    ) -> Result<Self, PublishError> {
        let bytes = serde_json::to_vec(payload)
            .map_err(|e| PublishError::SerializationFailed(e.to_string()))?;
        Ok(Self::new(id, event_type, bytes))
    }

    /// Decode the JSON payload.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.payload)
    }

    /// Add metadata to the event.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata
            .get_or_insert_with(Vec::new)
            .push((key.into(), value.into()));
        self
    }

    /// Look up a metadata value by key.
    pub fn metadata_value(&self, key: &str) -> Option<&str> {
        self.metadata
            .as_ref()?
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Error handing a message to the bus.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("serialization failed: {0}")]
    SerializationFailed(String),
    #[error("queue closed: {0}")]
    Closed(String),
    #[error("queue full: {0}")]
    Full(String),
    #[error("queue lock poisoned")]
    LockPoisoned,
}
