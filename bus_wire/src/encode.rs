//! Schema-driven argument encoding.
//!
//! The encoder walks a `&[TypeTag]` schema against an ordered list of
//! [`Value`]s. Every argument is checked against its tag before any of its
//! bytes are written, so a rejected call never leaves a half-open container
//! in the body.

use crate::body::BodyWriter;
use bus_types::{TypeTag, Value};
use thiserror::Error;

/// Errors for schema violations during encoding.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EncodeError {
    #[error("schema expects {expected} arguments, got {found}")]
    ArityMismatch { expected: usize, found: usize },

    #[error("argument {index} does not satisfy schema tag {expected}: value is {found}")]
    TypeMismatch {
        index: usize,
        expected: TypeTag,
        found: TypeTag,
    },
}

/// Encodes `args` against `schema`, returning the finished body.
pub fn encode(schema: &[TypeTag], args: &[Value]) -> Result<Vec<u8>, EncodeError> {
    if schema.len() != args.len() {
        return Err(EncodeError::ArityMismatch {
            expected: schema.len(),
            found: args.len(),
        });
    }

    let mut writer = BodyWriter::new();
    for (index, (tag, value)) in schema.iter().zip(args).enumerate() {
        if value.tag() != *tag {
            return Err(EncodeError::TypeMismatch {
                index,
                expected: *tag,
                found: value.tag(),
            });
        }
        writer.put_value(value);
    }
    Ok(writer.into_bytes())
}

/// Encodes a value sequence without a schema (reply bodies are shaped by
/// whatever the handler produced, not by a descriptor).
pub fn encode_values(values: &[Value]) -> Vec<u8> {
    let mut writer = BodyWriter::new();
    for value in values {
        writer.put_value(value);
    }
    writer.into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::{decode_body, DecodeOutcome};
    use bus_types::Dictionary;

    #[test]
    fn test_encode_matches_schema() {
        let schema = [TypeTag::STRING, TypeTag::UINT32];
        let args = [Value::Str("sender".into()), Value::Uint32(4)];

        let body = encode(&schema, &args).unwrap();
        let outcome = decode_body(&body).unwrap();
        assert_eq!(outcome, DecodeOutcome::Complete(args.to_vec()));
    }

    #[test]
    fn test_encode_rejects_wrong_arity() {
        let schema = [TypeTag::STRING];
        let err = encode(&schema, &[]).unwrap_err();
        assert_eq!(err, EncodeError::ArityMismatch { expected: 1, found: 0 });
    }

    #[test]
    fn test_encode_rejects_mismatched_tag() {
        let schema = [TypeTag::STRING, TypeTag::UINT32];
        let args = [Value::Str("ok".into()), Value::Str("not a u32".into())];

        let err = encode(&schema, &args).unwrap_err();
        assert_eq!(
            err,
            EncodeError::TypeMismatch {
                index: 1,
                expected: TypeTag::UINT32,
                found: TypeTag::STRING,
            }
        );
    }

    #[test]
    fn test_mismatch_writes_nothing_after_the_bad_argument() {
        // A failed encode returns an error, not a body; callers never see
        // partially written containers.
        let mut dict = Dictionary::new();
        dict.insert("k", "v");
        let schema = [TypeTag::DictStringToString, TypeTag::UINT32];
        let args = [Value::Dict(dict), Value::Bool(true)];

        assert!(encode(&schema, &args).is_err());
    }

    #[test]
    fn test_empty_schema_yields_empty_body() {
        assert!(encode(&[], &[]).unwrap().is_empty());
    }

    #[test]
    fn test_encode_values_is_schema_free() {
        let body = encode_values(&[Value::Bool(true), Value::Int64(-1)]);
        let outcome = decode_body(&body).unwrap();
        assert_eq!(
            outcome.into_values(),
            vec![Value::Bool(true), Value::Int64(-1)]
        );
    }
}
