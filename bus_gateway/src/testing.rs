//! Scripted connection double for tests.
//!
//! `ScriptedBus` answers calls from queues keyed by (service, method) and
//! records everything it is asked, so tests can assert both the replies a
//! handler saw and the exact calls it made.

use crate::connection::{BusConnection, TransportError};
use bus_types::Value;
use bus_wire::{CallEnvelope, ReplyEnvelope};
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};

/// One recorded outbound call.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub service: String,
    pub path: String,
    pub interface: String,
    pub method: String,
    pub body: Vec<u8>,
}

type ScriptKey = (String, String);
type ScriptedReply = Result<Vec<Value>, TransportError>;

/// In-memory [`BusConnection`] with scripted replies.
///
/// Single-threaded like the agent itself; interior mutability because
/// `BusConnection::call` takes `&self`.
#[derive(Debug, Default)]
pub struct ScriptedBus {
    scripts: RefCell<HashMap<ScriptKey, VecDeque<ScriptedReply>>>,
    calls: RefCell<Vec<RecordedCall>>,
}

impl ScriptedBus {
    /// Creates an empty scripted bus; every call fails until scripted.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a successful reply for the next call to (service, method).
    pub fn enqueue_reply(&self, service: &str, method: &str, values: Vec<Value>) {
        self.scripts
            .borrow_mut()
            .entry((service.to_string(), method.to_string()))
            .or_default()
            .push_back(Ok(values));
    }

    /// Queues a failure for the next call to (service, method).
    pub fn enqueue_error(&self, service: &str, method: &str, error: TransportError) {
        self.scripts
            .borrow_mut()
            .entry((service.to_string(), method.to_string()))
            .or_default()
            .push_back(Err(error));
    }

    /// Everything called so far, in order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.borrow().clone()
    }

    /// Total number of calls made.
    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }

    /// Number of calls made to a given method name.
    pub fn calls_to(&self, method: &str) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|call| call.method == method)
            .count()
    }
}

impl BusConnection for ScriptedBus {
    fn call(&self, envelope: CallEnvelope) -> Result<ReplyEnvelope, TransportError> {
        self.calls.borrow_mut().push(RecordedCall {
            service: envelope.target.service.clone(),
            path: envelope.target.path.clone(),
            interface: envelope.target.interface.clone(),
            method: envelope.method.clone(),
            body: envelope.body.clone(),
        });

        let key = (envelope.target.service.clone(), envelope.method.clone());
        let scripted = self.scripts.borrow_mut().get_mut(&key).and_then(VecDeque::pop_front);
        match scripted {
            Some(Ok(values)) => Ok(ReplyEnvelope::from_values(envelope.id, &values)),
            Some(Err(error)) => Err(error),
            None => Err(TransportError::Connection(format!(
                "no scripted reply for {} {}",
                envelope.target.service, envelope.method
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bus_types::ServiceTarget;

    fn envelope(method: &str) -> CallEnvelope {
        CallEnvelope::new(
            ServiceTarget::new("org.example.Svc", "/svc", "org.example.Svc"),
            method,
        )
    }

    #[test]
    fn test_replies_pop_in_order() {
        let bus = ScriptedBus::new();
        bus.enqueue_reply("org.example.Svc", "Get", vec![Value::Uint32(1)]);
        bus.enqueue_reply("org.example.Svc", "Get", vec![Value::Uint32(2)]);

        let first = bus.call(envelope("Get")).unwrap();
        let second = bus.call(envelope("Get")).unwrap();
        assert_eq!(first.decode().unwrap().values(), &[Value::Uint32(1)]);
        assert_eq!(second.decode().unwrap().values(), &[Value::Uint32(2)]);
    }

    #[test]
    fn test_unscripted_call_fails() {
        let bus = ScriptedBus::new();
        assert!(bus.call(envelope("Nothing")).is_err());
        assert_eq!(bus.call_count(), 1);
    }

    #[test]
    fn test_records_method_counts() {
        let bus = ScriptedBus::new();
        bus.enqueue_reply("org.example.Svc", "Get", vec![]);
        let _ = bus.call(envelope("Get"));
        let _ = bus.call(envelope("Other"));

        assert_eq!(bus.calls_to("Get"), 1);
        assert_eq!(bus.calls_to("Other"), 1);
        assert_eq!(bus.calls_to("Missing"), 0);
    }
}
