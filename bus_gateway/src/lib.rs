//! # Bus Gateway
//!
//! Outbound call machinery: the immutable method registry, the blocking
//! connection seam, and the call gateway that ties a descriptor, an encoded
//! body and one synchronous round trip together.
//!
//! ## Philosophy
//!
//! - **One table, built once**: every well-known outbound method lives in a
//!   [`MethodRegistry`] constructed at startup and owned by the gateway
//! - **Connections behind a trait**: the gateway never opens or owns a
//!   connection; it drives whatever [`BusConnection`] it is handed, so the
//!   session and system buses stay isolated behind their own handles
//! - **Undecoded replies**: the gateway returns the raw reply envelope;
//!   interpreting it is the caller's job

pub mod connection;
pub mod gateway;
pub mod registry;
pub mod testing;

pub use connection::{BusConnection, CallError, TransportError};
pub use gateway::CallGateway;
pub use registry::{MethodDescriptor, MethodId, MethodRegistry};
