//! Finds where the next complete value ends without decoding it.
//!
//! Only tags and length fields are looked at; payloads are stepped over,
//! never copied. The scan can be resumed as more bytes arrive.

use super::{UnpackerConfig, ValueType, value_type_of};
use crate::error::{MsgPackError, Result};
use crate::format::marker;

/// Measures the encoded length of one value, across partial buffers.
#[derive(Debug, Clone)]
pub struct ValueScanner {
    config: UnpackerConfig,
    // Offset of the next tag to look at.
    pos: usize,
    // Values still to step over, nested ones included.
    pending: u64,
    needed: usize,
}

impl ValueScanner {
    pub fn new(config: UnpackerConfig) -> Self {
        Self {
            config,
            pos: 0,
            pending: 1,
            needed: 1,
        }
    }

    /// Minimum buffer length before another [`scan`](Self::scan) can make
    /// progress.
    pub fn needed(&self) -> usize {
        self.needed
    }

    /// Continues the scan over `buf`, which must start with the same bytes
    /// as every earlier call. Returns the value's total length once all of
    /// it is buffered.
    ///
    /// Declared sizes are checked against the configured limits here, so an
    /// oversized value is rejected before it is buffered.
    pub fn scan(&mut self, buf: &[u8]) -> Result<Option<usize>> {
        while self.pending > 0 {
            let Some(&m) = buf.get(self.pos) else {
                self.needed = self.pos + 1;
                return Ok(None);
            };
            let ty = value_type_of(m)?;
            let (width, inline) = match ty {
                ValueType::Raw | ValueType::Array | ValueType::Map => length_field(m),
                _ => {
                    self.pos += 1 + scalar_payload(m);
                    self.pending -= 1;
                    continue;
                }
            };
            let start = self.pos + 1;
            let Some(field) = buf.get(start..start + width) else {
                self.needed = start + width;
                return Ok(None);
            };
            let len = field
                .iter()
                .fold(u64::from(inline), |acc, &b| (acc << 8) | u64::from(b));
            self.pos = start + width;
            self.pending -= 1;
            match ty {
                ValueType::Raw => {
                    let limit = self.config.get_raw_size_limit();
                    if len > limit as u64 {
                        return Err(MsgPackError::Type(format!(
                            "raw size {len} exceeds limit {limit}"
                        )));
                    }
                    self.pos += len as usize;
                }
                ValueType::Array => {
                    let limit = self.config.get_array_size_limit();
                    if len > u64::from(limit) {
                        return Err(MsgPackError::Type(format!(
                            "array size {len} exceeds limit {limit}"
                        )));
                    }
                    self.pending += len;
                }
                _ => {
                    let limit = self.config.get_map_size_limit();
                    if len > u64::from(limit) {
                        return Err(MsgPackError::Type(format!(
                            "map size {len} exceeds limit {limit}"
                        )));
                    }
                    self.pending += len * 2;
                }
            }
        }
        if self.pos > buf.len() {
            self.needed = self.pos;
            return Ok(None);
        }
        Ok(Some(self.pos))
    }
}

/// Width of a raw or container length field, and the length carried in the
/// tag itself for the short forms.
fn length_field(m: u8) -> (usize, u8) {
    match m {
        marker::STR_8 | marker::BIN_8 => (1, 0),
        marker::STR_16 | marker::BIN_16 | marker::ARRAY_16 | marker::MAP_16 => (2, 0),
        marker::STR_32 | marker::BIN_32 | marker::ARRAY_32 | marker::MAP_32 => (4, 0),
        _ if marker::is_fixstr(m) => (0, m & 0x1F),
        _ => (0, m & 0x0F),
    }
}

fn scalar_payload(m: u8) -> usize {
    match m {
        marker::UINT_8 | marker::INT_8 => 1,
        marker::UINT_16 | marker::INT_16 => 2,
        marker::UINT_32 | marker::INT_32 | marker::FLOAT_32 => 4,
        marker::UINT_64 | marker::INT_64 | marker::FLOAT_64 => 8,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packer::Packer;
    use crate::value::Value;

    fn packed(v: &Value) -> Vec<u8> {
        let mut pk = Packer::new(Vec::new());
        pk.write_value(v).expect("pack failed");
        pk.into_inner()
    }

    fn scanner() -> ValueScanner {
        ValueScanner::new(UnpackerConfig::default())
    }

    #[test]
    fn complete_values_report_their_length() {
        let v = Value::Map(vec![
            (Value::from("k"), Value::Array(vec![Value::from(1i64 << 40), Value::Nil])),
            (Value::from("f"), Value::Double(0.5)),
        ]);
        let mut bytes = packed(&v);
        let len = bytes.len();
        bytes.extend_from_slice(&[0xC3, 0xC2]);
        assert_eq!(scanner().scan(&bytes).unwrap(), Some(len));
    }

    #[test]
    fn payload_length_is_known_from_the_header() {
        let bytes = packed(&Value::from("x".repeat(70_000)));
        let mut s = scanner();
        assert_eq!(s.scan(&bytes[..2]).unwrap(), None);
        assert_eq!(s.needed(), 5);
        assert_eq!(s.scan(&bytes[..5]).unwrap(), None);
        assert_eq!(s.needed(), bytes.len());
        assert_eq!(s.scan(&bytes).unwrap(), Some(bytes.len()));
    }

    #[test]
    fn scan_resumes_where_it_stopped() {
        let items: Vec<Value> = (0..300i64).map(|i| Value::from(i * 1000)).collect();
        let bytes = packed(&Value::Array(items));
        let mut s = scanner();
        let mut end = 0;
        let mut result = None;
        while result.is_none() {
            end = (end + 7).min(bytes.len());
            if end < s.needed() {
                continue;
            }
            result = s.scan(&bytes[..end]).unwrap();
        }
        assert_eq!(result, Some(bytes.len()));
    }

    #[test]
    fn limits_reject_before_buffering() {
        let header = [marker::BIN_32, 0x10, 0x00, 0x00, 0x00];
        let mut s = ValueScanner::new(UnpackerConfig::new().raw_size_limit(1024));
        assert!(s.scan(&header).unwrap_err().is_type_error());

        let header = [marker::MAP_16, 0x00, 0x20];
        let mut s = ValueScanner::new(UnpackerConfig::new().map_size_limit(16));
        assert!(s.scan(&header).unwrap_err().to_string().contains("map size 32"));
    }

    #[test]
    fn unsupported_tags_are_type_errors() {
        assert!(scanner().scan(&[marker::FIXEXT_1, 0, 0]).unwrap_err().is_type_error());
    }
}
