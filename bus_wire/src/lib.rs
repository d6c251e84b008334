//! # Bus Wire
//!
//! Binary message bodies for the session bus agent: call/reply envelopes,
//! the schema-driven encoder and the self-describing decoder.
//!
//! ## Format
//!
//! A body is a flat byte buffer of marker-prefixed values, little-endian:
//!
//! - `s` string, `o` object path: u32 length + UTF-8 bytes
//! - `b` bool: one byte, 0 or 1
//! - `i` int32, `x` int64, `u` uint32: fixed-width LE
//! - `a` array of strings: u32 count + that many string payloads
//! - `d` dict string→string: u32 byte length of the entry region, then
//!   (key payload, value payload) pairs
//! - `v` dict string→variant: u32 byte length, then (key payload, content
//!   marker byte, string payload) triples; the content marker must be `s`
//!
//! Container byte lengths are reserved when the container opens and patched
//! when it closes, so a buffer never carries a half-open container.
//!
//! ## Encoding vs decoding
//!
//! Encoding is schema-driven: a `&[TypeTag]` is walked against an ordered
//! list of [`Value`]s and every mismatch is rejected before a byte of that
//! value is written. Decoding is self-describing: markers in the reply drive
//! it, and an unrecognized marker stops decoding with a
//! [`DecodeOutcome::Truncated`] rather than an error.
//!
//! [`Value`]: bus_types::Value

pub mod body;
pub mod decode;
pub mod encode;
pub mod envelope;

pub use body::{BodyReader, BodyWriter, Marker};
pub use decode::{decode_body, DecodeError, DecodeOutcome};
pub use encode::{encode, encode_values, EncodeError};
pub use envelope::{CallEnvelope, MessageId, ReplyEnvelope};
