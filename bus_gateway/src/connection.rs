//! The blocking connection seam.

use bus_wire::{CallEnvelope, EncodeError, ReplyEnvelope};
use thiserror::Error;

/// Connection-level failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// The connection itself failed (disconnected, send error, no peer).
    #[error("connection failure: {0}")]
    Connection(String),

    /// The peer replied with a structured error.
    #[error("remote error: {0}")]
    Remote(String),
}

/// Errors surfaced by one gateway invocation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CallError {
    /// Connection-level failure
    #[error("connection failure: {0}")]
    Transport(String),

    /// The target replied with a structured error
    #[error("remote error: {0}")]
    Remote(String),

    /// The argument list did not satisfy the descriptor's schema
    #[error("encode failed: {0}")]
    Encode(#[from] EncodeError),
}

impl From<TransportError> for CallError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Connection(message) => CallError::Transport(message),
            TransportError::Remote(message) => CallError::Remote(message),
        }
    }
}

/// One long-lived bus connection.
///
/// `call` performs a single blocking synchronous round trip. No timeout is
/// applied here: a non-responding peer stalls the calling thread until the
/// underlying transport's own default expires. The agent is single-threaded
/// by contract, so a stalled call stalls the whole process.
pub trait BusConnection {
    /// Sends the call and blocks for its reply.
    fn call(&self, envelope: CallEnvelope) -> Result<ReplyEnvelope, TransportError>;
}

impl<T: BusConnection + ?Sized> BusConnection for &T {
    fn call(&self, envelope: CallEnvelope) -> Result<ReplyEnvelope, TransportError> {
        (**self).call(envelope)
    }
}
