//! Low-level body writer and reader.

use crate::decode::DecodeError;
use bus_types::Value;

/// Wire marker for one value shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Marker {
    /// UTF-8 string
    Str = b's',
    /// Boolean
    Bool = b'b',
    /// Signed 32-bit integer
    Int32 = b'i',
    /// Signed 64-bit integer
    Int64 = b'x',
    /// Unsigned 32-bit integer
    Uint32 = b'u',
    /// Object path
    ObjectPath = b'o',
    /// Array of strings
    StrArray = b'a',
    /// Dictionary with string values
    DictStr = b'd',
    /// Dictionary with variant-wrapped string values
    DictVariant = b'v',
}

impl Marker {
    /// The marker's wire byte.
    pub const fn byte(self) -> u8 {
        self as u8
    }

    /// Maps a wire byte back to a marker, if recognized.
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            b's' => Some(Marker::Str),
            b'b' => Some(Marker::Bool),
            b'i' => Some(Marker::Int32),
            b'x' => Some(Marker::Int64),
            b'u' => Some(Marker::Uint32),
            b'o' => Some(Marker::ObjectPath),
            b'a' => Some(Marker::StrArray),
            b'd' => Some(Marker::DictStr),
            b'v' => Some(Marker::DictVariant),
            _ => None,
        }
    }
}

/// Handle for an open container; closing it patches the reserved length.
#[derive(Debug)]
#[must_use = "an open container must be closed to patch its length"]
pub struct ContainerHandle {
    length_pos: usize,
}

/// Append-only body writer.
#[derive(Debug, Default)]
pub struct BodyWriter {
    buf: Vec<u8>,
}

impl BodyWriter {
    /// Creates an empty writer.
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    /// Consumes the writer, returning the finished body.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Current body length in bytes.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Returns true if nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    fn put_marker(&mut self, marker: Marker) {
        self.buf.push(marker.byte());
    }

    fn put_u32(&mut self, value: u32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    /// Writes a length-prefixed string payload (no marker).
    ///
    /// The length prefix is a u32; payloads past that do not fit the wire
    /// format and must never reach the writer.
    fn put_str_payload(&mut self, value: &str) {
        debug_assert!(
            u32::try_from(value.len()).is_ok(),
            "string payload does not fit a u32 length prefix"
        );
        self.put_u32(value.len() as u32);
        self.buf.extend_from_slice(value.as_bytes());
    }

    /// Opens a container by reserving a four-byte length slot.
    fn begin_container(&mut self) -> ContainerHandle {
        let length_pos = self.buf.len();
        self.buf.extend_from_slice(&[0u8; 4]);
        ContainerHandle { length_pos }
    }

    /// Closes a container, patching the byte length of its entry region.
    fn end_container(&mut self, handle: ContainerHandle) {
        let region_len = (self.buf.len() - handle.length_pos - 4) as u32;
        self.buf[handle.length_pos..handle.length_pos + 4]
            .copy_from_slice(&region_len.to_le_bytes());
    }

    /// Writes one marker-prefixed value, recursing into containers.
    pub fn put_value(&mut self, value: &Value) {
        match value {
            Value::Str(s) => {
                self.put_marker(Marker::Str);
                self.put_str_payload(s);
            }
            Value::Bool(b) => {
                self.put_marker(Marker::Bool);
                self.buf.push(u8::from(*b));
            }
            Value::Int32(v) => {
                self.put_marker(Marker::Int32);
                self.buf.extend_from_slice(&v.to_le_bytes());
            }
            Value::Int64(v) => {
                self.put_marker(Marker::Int64);
                self.buf.extend_from_slice(&v.to_le_bytes());
            }
            Value::Uint32(v) => {
                self.put_marker(Marker::Uint32);
                self.put_u32(*v);
            }
            Value::ObjectPath(p) => {
                self.put_marker(Marker::ObjectPath);
                self.put_str_payload(p);
            }
            Value::StrArray(items) => {
                self.put_marker(Marker::StrArray);
                debug_assert!(
                    u32::try_from(items.len()).is_ok(),
                    "array count does not fit a u32 prefix"
                );
                self.put_u32(items.len() as u32);
                for item in items {
                    self.put_str_payload(item);
                }
            }
            Value::Dict(map) => {
                self.put_marker(Marker::DictStr);
                let container = self.begin_container();
                for (key, val) in map.iter() {
                    self.put_str_payload(key);
                    self.put_str_payload(val);
                }
                self.end_container(container);
            }
            Value::VariantDict(map) => {
                self.put_marker(Marker::DictVariant);
                let container = self.begin_container();
                for (key, val) in map.iter() {
                    self.put_str_payload(key);
                    // Variant content is always a string on this bus.
                    self.buf.push(Marker::Str.byte());
                    self.put_str_payload(val);
                }
                self.end_container(container);
            }
        }
    }
}

/// Cursor over a received body.
#[derive(Debug)]
pub struct BodyReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> BodyReader<'a> {
    /// Creates a reader over a body.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Bytes left to read.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Returns true once the body is fully consumed.
    pub fn is_at_end(&self) -> bool {
        self.pos >= self.data.len()
    }

    /// Current cursor position.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Peeks the next byte without consuming it.
    pub fn peek_byte(&self) -> Option<u8> {
        self.data.get(self.pos).copied()
    }

    /// Consumes and returns one byte.
    pub fn take_byte(&mut self) -> Result<u8, DecodeError> {
        let byte = self.data.get(self.pos).copied().ok_or(DecodeError::UnexpectedEof)?;
        self.pos += 1;
        Ok(byte)
    }

    fn take_slice(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        if self.remaining() < len {
            return Err(DecodeError::UnexpectedEof);
        }
        let slice = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    /// Reads a little-endian u32.
    pub fn read_u32(&mut self) -> Result<u32, DecodeError> {
        let bytes = self.take_slice(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Reads a little-endian i32.
    pub fn read_i32(&mut self) -> Result<i32, DecodeError> {
        let bytes = self.take_slice(4)?;
        Ok(i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Reads a little-endian i64.
    pub fn read_i64(&mut self) -> Result<i64, DecodeError> {
        let bytes = self.take_slice(8)?;
        Ok(i64::from_le_bytes([
            bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7],
        ]))
    }

    /// Reads a boolean byte; anything but 0 or 1 is malformed.
    pub fn read_bool(&mut self) -> Result<bool, DecodeError> {
        match self.take_byte()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(DecodeError::InvalidBool(other)),
        }
    }

    /// Reads a length-prefixed string payload.
    pub fn read_str(&mut self) -> Result<String, DecodeError> {
        let len = self.read_u32()? as usize;
        let bytes = self.take_slice(len)?;
        Ok(String::from_utf8(bytes.to_vec())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bus_types::Dictionary;

    #[test]
    fn test_marker_byte_roundtrip() {
        for marker in [
            Marker::Str,
            Marker::Bool,
            Marker::Int32,
            Marker::Int64,
            Marker::Uint32,
            Marker::ObjectPath,
            Marker::StrArray,
            Marker::DictStr,
            Marker::DictVariant,
        ] {
            assert_eq!(Marker::from_byte(marker.byte()), Some(marker));
        }
        assert_eq!(Marker::from_byte(b'z'), None);
    }

    #[test]
    fn test_string_payload_layout() {
        let mut writer = BodyWriter::new();
        writer.put_value(&Value::Str("ab".into()));
        let bytes = writer.into_bytes();

        assert_eq!(bytes[0], b's');
        assert_eq!(&bytes[1..5], &2u32.to_le_bytes());
        assert_eq!(&bytes[5..], b"ab");
    }

    #[test]
    fn test_container_length_is_patched() {
        let mut dict = Dictionary::new();
        dict.insert("k", "v");

        let mut writer = BodyWriter::new();
        writer.put_value(&Value::Dict(dict));
        let bytes = writer.into_bytes();

        assert_eq!(bytes[0], b'd');
        let region_len = u32::from_le_bytes([bytes[1], bytes[2], bytes[3], bytes[4]]);
        // key "k" = 4 + 1, value "v" = 4 + 1
        assert_eq!(region_len, 10);
        assert_eq!(bytes.len(), 1 + 4 + 10);
    }

    #[test]
    fn test_empty_dict_has_zero_length_region() {
        let mut writer = BodyWriter::new();
        writer.put_value(&Value::Dict(Dictionary::new()));
        let bytes = writer.into_bytes();

        assert_eq!(bytes.len(), 5);
        assert_eq!(u32::from_le_bytes([bytes[1], bytes[2], bytes[3], bytes[4]]), 0);
    }

    #[test]
    fn test_reader_primitives() {
        let mut writer = BodyWriter::new();
        writer.put_value(&Value::Uint32(7));
        writer.put_value(&Value::Bool(true));
        let bytes = writer.into_bytes();

        let mut reader = BodyReader::new(&bytes);
        assert_eq!(reader.take_byte().unwrap(), b'u');
        assert_eq!(reader.read_u32().unwrap(), 7);
        assert_eq!(reader.take_byte().unwrap(), b'b');
        assert!(reader.read_bool().unwrap());
        assert!(reader.is_at_end());
    }

    #[test]
    fn test_reader_eof() {
        let mut reader = BodyReader::new(&[b'u', 0, 0]);
        assert_eq!(reader.take_byte().unwrap(), b'u');
        assert_eq!(reader.read_u32(), Err(DecodeError::UnexpectedEof));
    }

    #[test]
    fn test_reader_rejects_bad_bool() {
        let mut reader = BodyReader::new(&[2]);
        assert_eq!(reader.read_bool(), Err(DecodeError::InvalidBool(2)));
    }
}
