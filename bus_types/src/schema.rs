//! Wire type tags.
//!
//! A schema is an ordered `&[TypeTag]` describing the shape of an argument
//! list. Tags drive encoding (schema-known) and name the shapes the decoder
//! recognizes in a self-describing reply.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Scalar wire kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScalarKind {
    /// UTF-8 string
    String,
    /// Boolean
    Bool,
    /// Signed 32-bit integer
    Int32,
    /// Signed 64-bit integer
    Int64,
    /// Unsigned 32-bit integer
    Uint32,
    /// Object path (string with bus path syntax)
    ObjectPath,
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScalarKind::String => "string",
            ScalarKind::Bool => "bool",
            ScalarKind::Int32 => "int32",
            ScalarKind::Int64 => "int64",
            ScalarKind::Uint32 => "uint32",
            ScalarKind::ObjectPath => "object-path",
        };
        write!(f, "{}", name)
    }
}

/// A tag describing one argument's wire shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeTag {
    /// A single scalar value
    Scalar(ScalarKind),
    /// A length-delimited sequence of strings
    ArrayOfString,
    /// Dictionary with string keys and string values
    DictStringToString,
    /// Dictionary with string keys and variant-wrapped string values
    ///
    /// Only string-valued variants are supported; any other variant content
    /// is rejected by both the encoder and the decoder.
    DictStringToVariantString,
}

impl TypeTag {
    /// Shorthand for `Scalar(ScalarKind::String)`.
    pub const STRING: TypeTag = TypeTag::Scalar(ScalarKind::String);
    /// Shorthand for `Scalar(ScalarKind::Bool)`.
    pub const BOOL: TypeTag = TypeTag::Scalar(ScalarKind::Bool);
    /// Shorthand for `Scalar(ScalarKind::Int32)`.
    pub const INT32: TypeTag = TypeTag::Scalar(ScalarKind::Int32);
    /// Shorthand for `Scalar(ScalarKind::Int64)`.
    pub const INT64: TypeTag = TypeTag::Scalar(ScalarKind::Int64);
    /// Shorthand for `Scalar(ScalarKind::Uint32)`.
    pub const UINT32: TypeTag = TypeTag::Scalar(ScalarKind::Uint32);
    /// Shorthand for `Scalar(ScalarKind::ObjectPath)`.
    pub const OBJECT_PATH: TypeTag = TypeTag::Scalar(ScalarKind::ObjectPath);
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeTag::Scalar(kind) => write!(f, "{}", kind),
            TypeTag::ArrayOfString => write!(f, "array-of-string"),
            TypeTag::DictStringToString => write!(f, "dict<string,string>"),
            TypeTag::DictStringToVariantString => write!(f, "dict<string,variant-string>"),
        }
    }
}
