//! Self-describing reply decoding.
//!
//! Decoding is driven by the wire markers in the body, not by a schema.
//! Recognized markers are read into [`Value`]s in order; the first marker
//! the decoder does not recognize stops it with a [`DecodeOutcome::Truncated`]
//! carrying everything read so far. Malformed payloads are hard errors.

use crate::body::{BodyReader, Marker};
use bus_types::{Dictionary, Value};
use thiserror::Error;

/// Errors for malformed bodies.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("body ended before the value was complete")]
    UnexpectedEof,

    #[error("string payload is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    #[error("boolean byte must be 0 or 1, got {0}")]
    InvalidBool(u8),

    #[error("variant content marker {0:#04x} is not a string; only string variants are supported")]
    UnsupportedVariant(u8),

    #[error("container length {declared} exceeds the {available} bytes left in the body")]
    ContainerOverrun { declared: usize, available: usize },
}

/// Result of decoding a body.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodeOutcome {
    /// Every byte of the body was understood.
    Complete(Vec<Value>),
    /// Decoding stopped at an unrecognized marker; `values` holds everything
    /// read before it. Callers decide whether a partial read is acceptable.
    Truncated {
        /// Values decoded before the stop
        values: Vec<Value>,
        /// The marker byte that was not recognized
        marker: u8,
    },
}

impl DecodeOutcome {
    /// Returns true if the whole body was decoded.
    pub fn is_complete(&self) -> bool {
        matches!(self, DecodeOutcome::Complete(_))
    }

    /// Borrows the decoded values, complete or not.
    pub fn values(&self) -> &[Value] {
        match self {
            DecodeOutcome::Complete(values) => values,
            DecodeOutcome::Truncated { values, .. } => values,
        }
    }

    /// Consumes the outcome, returning the decoded values.
    pub fn into_values(self) -> Vec<Value> {
        match self {
            DecodeOutcome::Complete(values) => values,
            DecodeOutcome::Truncated { values, .. } => values,
        }
    }
}

/// Decodes a body into values, stopping at the first unrecognized marker.
pub fn decode_body(body: &[u8]) -> Result<DecodeOutcome, DecodeError> {
    let mut reader = BodyReader::new(body);
    let mut values = Vec::new();

    loop {
        let Some(byte) = reader.peek_byte() else {
            return Ok(DecodeOutcome::Complete(values));
        };
        let Some(marker) = Marker::from_byte(byte) else {
            return Ok(DecodeOutcome::Truncated { values, marker: byte });
        };
        reader.take_byte()?;
        values.push(read_value(&mut reader, marker)?);
    }
}

fn read_value(reader: &mut BodyReader<'_>, marker: Marker) -> Result<Value, DecodeError> {
    match marker {
        Marker::Str => Ok(Value::Str(reader.read_str()?)),
        Marker::Bool => Ok(Value::Bool(reader.read_bool()?)),
        Marker::Int32 => Ok(Value::Int32(reader.read_i32()?)),
        Marker::Int64 => Ok(Value::Int64(reader.read_i64()?)),
        Marker::Uint32 => Ok(Value::Uint32(reader.read_u32()?)),
        Marker::ObjectPath => Ok(Value::ObjectPath(reader.read_str()?)),
        Marker::StrArray => {
            let count = reader.read_u32()? as usize;
            // Every element carries at least a four byte length prefix, so a
            // count the remaining bytes cannot possibly hold is malformed.
            // Checked before reserving: the count is attacker-controlled.
            if count > reader.remaining() / 4 {
                return Err(DecodeError::UnexpectedEof);
            }
            let mut items = Vec::with_capacity(count);
            for _ in 0..count {
                items.push(reader.read_str()?);
            }
            Ok(Value::StrArray(items))
        }
        Marker::DictStr => {
            let end = container_end(reader)?;
            let mut map = Dictionary::new();
            while reader.position() < end {
                let key = reader.read_str()?;
                let value = reader.read_str()?;
                map.insert(key, value);
            }
            Ok(Value::Dict(map))
        }
        Marker::DictVariant => {
            let end = container_end(reader)?;
            let mut map = Dictionary::new();
            while reader.position() < end {
                let key = reader.read_str()?;
                let content = reader.take_byte()?;
                if content != Marker::Str.byte() {
                    return Err(DecodeError::UnsupportedVariant(content));
                }
                let value = reader.read_str()?;
                map.insert(key, value);
            }
            Ok(Value::VariantDict(map))
        }
    }
}

fn container_end(reader: &mut BodyReader<'_>) -> Result<usize, DecodeError> {
    let declared = reader.read_u32()? as usize;
    if declared > reader.remaining() {
        return Err(DecodeError::ContainerOverrun {
            declared,
            available: reader.remaining(),
        });
    }
    Ok(reader.position() + declared)
}
