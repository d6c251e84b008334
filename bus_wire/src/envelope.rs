//! Call and reply envelopes.
//!
//! An envelope is the in-flight representation of one call's message. Both
//! kinds are ephemeral: they live for a single gateway invocation and are
//! dropped when it returns, success or failure.

use crate::decode::{decode_body, DecodeError, DecodeOutcome};
use crate::encode::encode_values;
use bus_types::{ServiceTarget, Value};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for one in-flight message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(Uuid);

impl MessageId {
    /// Creates a new random message ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a message ID from a UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Msg({})", self.0)
    }
}

/// Outbound method call: target identity, method name, encoded body.
#[derive(Debug, Clone)]
pub struct CallEnvelope {
    /// Identifier correlating the eventual reply
    pub id: MessageId,
    /// Remote object the call addresses
    pub target: ServiceTarget,
    /// Method name on the target's interface
    pub method: String,
    /// Encoded argument body
    pub body: Vec<u8>,
}

impl CallEnvelope {
    /// Creates a call with an empty body.
    pub fn new(target: ServiceTarget, method: impl Into<String>) -> Self {
        Self {
            id: MessageId::new(),
            target,
            method: method.into(),
            body: Vec::new(),
        }
    }

    /// Attaches an encoded body.
    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }
}

/// Inbound reply: correlation ID plus the undecoded body.
#[derive(Debug, Clone)]
pub struct ReplyEnvelope {
    /// ID of the call this reply answers
    pub correlation: MessageId,
    /// Raw reply body; decoding is the caller's responsibility
    pub body: Vec<u8>,
}

impl ReplyEnvelope {
    /// Creates a reply from a raw body.
    pub fn new(correlation: MessageId, body: Vec<u8>) -> Self {
        Self { correlation, body }
    }

    /// Creates a reply with no payload.
    pub fn empty(correlation: MessageId) -> Self {
        Self::new(correlation, Vec::new())
    }

    /// Creates a reply carrying the given values.
    pub fn from_values(correlation: MessageId, values: &[Value]) -> Self {
        Self::new(correlation, encode_values(values))
    }

    /// Decodes the body.
    pub fn decode(&self) -> Result<DecodeOutcome, DecodeError> {
        decode_body(&self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target() -> ServiceTarget {
        ServiceTarget::new("org.example.Svc", "/org/example/Svc", "org.example.Svc")
    }

    #[test]
    fn test_message_ids_are_unique() {
        assert_ne!(MessageId::new(), MessageId::new());
    }

    #[test]
    fn test_call_envelope_construction() {
        let call = CallEnvelope::new(target(), "Ping").with_body(vec![1, 2, 3]);
        assert_eq!(call.method, "Ping");
        assert_eq!(call.body, vec![1, 2, 3]);
    }

    #[test]
    fn test_reply_roundtrip() {
        let call = CallEnvelope::new(target(), "Ping");
        let reply = ReplyEnvelope::from_values(call.id, &[Value::Uint32(11)]);

        assert_eq!(reply.correlation, call.id);
        let outcome = reply.decode().unwrap();
        assert_eq!(outcome.values(), &[Value::Uint32(11)]);
    }

    #[test]
    fn test_empty_reply_decodes_to_nothing() {
        let reply = ReplyEnvelope::empty(MessageId::new());
        assert!(reply.decode().unwrap().into_values().is_empty());
    }
}
