//! Raw byte payloads whose text form is decoded on demand.

use std::fmt;

use bytes::Bytes;

use crate::error::{MsgPackError, Result};

/// Which tag family a raw payload came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RawKind {
    /// str 8/16/32 or fixstr
    Str,
    /// bin 8/16/32
    Bin,
}

/// A raw payload that keeps its original bytes whether or not they are
/// valid UTF-8.
///
/// [`RawValue::as_bytes`] always succeeds. [`RawValue::as_str`] validates
/// strictly and rejects overlong and otherwise malformed sequences.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RawValue {
    bytes: Bytes,
    kind: RawKind,
}

impl RawValue {
    pub fn new(bytes: impl Into<Bytes>, kind: RawKind) -> Self {
        Self {
            bytes: bytes.into(),
            kind,
        }
    }

    /// Wraps opaque bytes as a bin payload.
    pub fn from_bytes(bytes: impl Into<Bytes>) -> Self {
        Self::new(bytes, RawKind::Bin)
    }

    pub fn kind(&self) -> RawKind {
        self.kind
    }

    pub fn is_binary(&self) -> bool {
        self.kind == RawKind::Bin
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn to_bytes(&self) -> Bytes {
        self.bytes.clone()
    }

    pub fn into_bytes(self) -> Bytes {
        self.bytes
    }

    /// Decodes the payload as UTF-8 text.
    pub fn as_str(&self) -> Result<&str> {
        std::str::from_utf8(&self.bytes)
            .map_err(|e| MsgPackError::Type(format!("invalid UTF-8 string: {e}")))
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        Self::new(Bytes::copy_from_slice(s.as_bytes()), RawKind::Str)
    }
}

impl From<String> for RawValue {
    fn from(s: String) -> Self {
        Self::new(s.into_bytes(), RawKind::Str)
    }
}

/// Renders the text as a quoted string, or `""` when it is not valid UTF-8.
impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = self.as_str().unwrap_or_default();
        f.write_str(&crate::json::quote(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MALFORMED: [&[u8]; 2] = [&[0xC0, 0xAF], &[0xE0, 0x80, 0xAF]];

    #[test]
    fn malformed_text_fails_but_bytes_survive() {
        for bytes in MALFORMED {
            let raw = RawValue::from_bytes(bytes.to_vec());
            assert!(raw.as_str().unwrap_err().is_type_error());
            assert_eq!(raw.as_bytes(), bytes);
        }
    }

    #[test]
    fn malformed_text_displays_as_empty_string() {
        for bytes in MALFORMED {
            assert_eq!(RawValue::from_bytes(bytes.to_vec()).to_string(), "\"\"");
        }
    }

    #[test]
    fn well_formed_text() {
        let raw = RawValue::from("héllo");
        assert_eq!(raw.as_str().unwrap(), "héllo");
        assert_eq!(raw.len(), 6);
        assert!(!raw.is_binary());
        assert_eq!(raw.to_string(), "\"héllo\"");
    }
}
