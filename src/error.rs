//! Error types for MessagePack packing and unpacking.

/// Errors that can occur while packing or unpacking MessagePack data.
#[derive(Debug, thiserror::Error)]
pub enum MsgPackError {
    /// The data does not fit the requested type, or the caller broke the
    /// packer/unpacker usage contract.
    #[error("type error: {0}")]
    Type(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias used throughout the crate.
pub type Result<T, E = MsgPackError> = std::result::Result<T, E>;

impl MsgPackError {
    /// Returns `true` for [`MsgPackError::Type`].
    pub fn is_type_error(&self) -> bool {
        matches!(self, Self::Type(_))
    }

    /// Returns `true` when the underlying source ran out of bytes.
    pub fn is_unexpected_eof(&self) -> bool {
        matches!(self, Self::Io(e) if e.kind() == std::io::ErrorKind::UnexpectedEof)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_error_message() {
        let err = MsgPackError::Type("expected boolean, got 0xc0".into());
        assert!(err.is_type_error());
        assert_eq!(err.to_string(), "type error: expected boolean, got 0xc0");
    }

    #[test]
    fn eof_is_detected() {
        let err = MsgPackError::from(std::io::Error::from(std::io::ErrorKind::UnexpectedEof));
        assert!(err.is_unexpected_eof());
        assert!(!err.is_type_error());
    }
}
