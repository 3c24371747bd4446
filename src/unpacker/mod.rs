//! MessagePack decoding: bytes → values.
//!
//! Readers check the next tag before consuming it, so asking for the wrong
//! type leaves the value in place for another reader. Containers are
//! tracked the same way the packer tracks them.

mod config;
mod scan;

use bytes::Bytes;

pub use config::UnpackerConfig;
pub use scan::ValueScanner;

use crate::error::{MsgPackError, Result};
use crate::format::marker;
use crate::io::Input;
use crate::stack::{ContainerStack, FrameKind};
use crate::template::{Template, Templated};
use crate::value::{RawKind, RawValue, Value};

/// The kind of the next value in the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    Nil,
    Boolean,
    Integer,
    Float,
    Raw,
    Array,
    Map,
}

/// Classifies a tag byte. Extension tags and `0xC1` are not supported.
pub fn value_type_of(m: u8) -> Result<ValueType> {
    let ty = match m {
        marker::NIL => ValueType::Nil,
        marker::FALSE | marker::TRUE => ValueType::Boolean,
        marker::FLOAT_32 | marker::FLOAT_64 => ValueType::Float,
        marker::UINT_8..=marker::UINT_64 | marker::INT_8..=marker::INT_64 => ValueType::Integer,
        marker::BIN_8..=marker::BIN_32 | marker::STR_8..=marker::STR_32 => ValueType::Raw,
        marker::ARRAY_16 | marker::ARRAY_32 => ValueType::Array,
        marker::MAP_16 | marker::MAP_32 => ValueType::Map,
        _ if marker::is_positive_fixint(m) || marker::is_negative_fixint(m) => ValueType::Integer,
        _ if marker::is_fixstr(m) => ValueType::Raw,
        _ if marker::is_fixarray(m) => ValueType::Array,
        _ if marker::is_fixmap(m) => ValueType::Map,
        _ if marker::is_ext(m) => {
            return Err(MsgPackError::Type(format!(
                "extension types are not supported: tag 0x{m:02X}"
            )));
        }
        _ => {
            return Err(MsgPackError::Type(format!(
                "unsupported MessagePack tag: 0x{m:02X}"
            )));
        }
    };
    Ok(ty)
}

fn unexpected(expected: &str, m: u8) -> MsgPackError {
    MsgPackError::Type(format!("expected {expected}, got tag 0x{m:02X}"))
}

/// Reads MessagePack values from an [`Input`].
///
/// Keeps a running count of consumed bytes so callers can check that a
/// value used up exactly the bytes they expected.
pub struct Unpacker<I> {
    input: I,
    stack: ContainerStack,
    config: UnpackerConfig,
    head: Option<u8>,
    pending_raw: Option<RawValue>,
    read_count: u64,
}

macro_rules! int_readers {
    ($($name:ident => $ty:ty),* $(,)?) => {
        $(
            pub fn $name(&mut self) -> Result<$ty> {
                let v = self.read_i128()?;
                <$ty>::try_from(v).map_err(|_| {
                    MsgPackError::Type(format!(
                        "integer {v} is out of range for {}",
                        stringify!($ty)
                    ))
                })
            }
        )*
    };
}

impl<I: Input> Unpacker<I> {
    pub fn new(input: I) -> Self {
        Self::with_config(input, UnpackerConfig::default())
    }

    pub fn with_config(input: I, config: UnpackerConfig) -> Self {
        Self {
            input,
            stack: ContainerStack::new(),
            config,
            head: None,
            pending_raw: None,
            read_count: 0,
        }
    }

    pub fn get_ref(&self) -> &I {
        &self.input
    }

    pub fn into_inner(self) -> I {
        self.input
    }

    pub fn config(&self) -> &UnpackerConfig {
        &self.config
    }

    /// Bytes consumed from the input since creation or the last reset.
    pub fn read_byte_count(&self) -> u64 {
        self.read_count
    }

    pub fn reset_read_byte_count(&mut self) {
        self.read_count = 0;
    }

    /// Number of arrays and maps begun but not yet ended.
    pub fn open_containers(&self) -> usize {
        self.stack.depth()
    }

    /// Forgets every open container.
    pub fn reset(&mut self) {
        self.stack.clear();
    }

    // -- Input plumbing --

    fn fill_u8(&mut self) -> Result<u8> {
        let b = self.input.read_u8()?;
        self.read_count += 1;
        Ok(b)
    }

    fn fill_u16(&mut self) -> Result<u16> {
        let v = self.input.read_u16()?;
        self.read_count += 2;
        Ok(v)
    }

    fn fill_u32(&mut self) -> Result<u32> {
        let v = self.input.read_u32()?;
        self.read_count += 4;
        Ok(v)
    }

    fn fill_u64(&mut self) -> Result<u64> {
        let v = self.input.read_u64()?;
        self.read_count += 8;
        Ok(v)
    }

    fn fill_payload(&mut self, len: usize) -> Result<Bytes> {
        if let Some(left) = self.input.available()
            && left < len
        {
            return Err(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                format!("payload needs {len} bytes but only {left} remaining"),
            )
            .into());
        }
        let mut data = vec![0u8; len];
        self.input.read_exact(&mut data)?;
        self.read_count += len as u64;
        Ok(Bytes::from(data))
    }

    fn peek_tag(&mut self) -> Result<u8> {
        match self.head {
            Some(m) => Ok(m),
            None => {
                let m = self.fill_u8()?;
                self.head = Some(m);
                Ok(m)
            }
        }
    }

    /// Consumes the next tag if `accept` allows it; otherwise leaves it in
    /// place and fails.
    fn expect_tag(&mut self, expected: &str, accept: impl Fn(u8) -> bool) -> Result<u8> {
        self.stack.check_slot()?;
        if self.pending_raw.is_some() {
            return Err(MsgPackError::Type(format!("expected {expected}, got raw")));
        }
        let m = self.peek_tag()?;
        if !accept(m) {
            return Err(unexpected(expected, m));
        }
        self.head = None;
        Ok(m)
    }

    fn ensure_depth(&self) -> Result<()> {
        let max = self.config.get_max_depth();
        if self.stack.depth() >= max {
            Err(MsgPackError::Type(format!("nesting depth exceeds {max}")))
        } else {
            Ok(())
        }
    }

    // -- Scalars --

    /// Returns the kind of the next value without consuming it.
    pub fn next_type(&mut self) -> Result<ValueType> {
        if self.pending_raw.is_some() {
            return Ok(ValueType::Raw);
        }
        let m = self.peek_tag()?;
        value_type_of(m)
    }

    pub fn read_nil(&mut self) -> Result<()> {
        self.expect_tag("nil", |m| m == marker::NIL)?;
        self.stack.reduce_count();
        Ok(())
    }

    /// Consumes a nil if one is next and reports whether it did.
    ///
    /// Inside a container whose slots are all used up this also returns
    /// `true` without consuming anything, so trailing optional fields of a
    /// shorter array read as absent.
    pub fn try_skip_nil(&mut self) -> Result<bool> {
        if self.stack.depth() > 0 && self.stack.top_count() == 0 {
            return Ok(true);
        }
        if self.pending_raw.is_some() || self.peek_tag()? != marker::NIL {
            return Ok(false);
        }
        self.head = None;
        self.stack.reduce_count();
        Ok(true)
    }

    pub fn read_bool(&mut self) -> Result<bool> {
        let m = self.expect_tag("boolean", |m| m == marker::TRUE || m == marker::FALSE)?;
        self.stack.reduce_count();
        Ok(m == marker::TRUE)
    }

    /// Reads any integer encoding.
    pub fn read_i128(&mut self) -> Result<i128> {
        let m = self.expect_tag("integer", |m| {
            value_type_of(m).is_ok_and(|t| t == ValueType::Integer)
        })?;
        let v = match m {
            marker::UINT_8 => i128::from(self.fill_u8()?),
            marker::UINT_16 => i128::from(self.fill_u16()?),
            marker::UINT_32 => i128::from(self.fill_u32()?),
            marker::UINT_64 => i128::from(self.fill_u64()?),
            marker::INT_8 => i128::from(self.fill_u8()? as i8),
            marker::INT_16 => i128::from(self.fill_u16()? as i16),
            marker::INT_32 => i128::from(self.fill_u32()? as i32),
            marker::INT_64 => i128::from(self.fill_u64()? as i64),
            // FIXINT, positive or negative
            _ => i128::from(m as i8),
        };
        self.stack.reduce_count();
        Ok(v)
    }

    int_readers! {
        read_i8 => i8,
        read_i16 => i16,
        read_i32 => i32,
        read_i64 => i64,
        read_u8 => u8,
        read_u16 => u16,
        read_u32 => u32,
        read_u64 => u64,
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        self.expect_tag("float 32", |m| m == marker::FLOAT_32)?;
        let v = f32::from_bits(self.fill_u32()?);
        self.stack.reduce_count();
        Ok(v)
    }

    /// Reads a float 64, widening a float 32 if that is what is stored.
    pub fn read_f64(&mut self) -> Result<f64> {
        let m = self.expect_tag("float", |m| m == marker::FLOAT_32 || m == marker::FLOAT_64)?;
        let v = if m == marker::FLOAT_32 {
            f64::from(f32::from_bits(self.fill_u32()?))
        } else {
            f64::from_bits(self.fill_u64()?)
        };
        self.stack.reduce_count();
        Ok(v)
    }

    // -- Raw payloads --

    /// Reads a str or bin payload without consuming its slot.
    fn take_raw(&mut self, expected: &str) -> Result<RawValue> {
        self.stack.check_slot()?;
        if let Some(raw) = self.pending_raw.take() {
            return Ok(raw);
        }
        let m = self.peek_tag()?;
        let kind = match m {
            marker::BIN_8..=marker::BIN_32 => RawKind::Bin,
            marker::STR_8..=marker::STR_32 => RawKind::Str,
            _ if marker::is_fixstr(m) => RawKind::Str,
            _ => return Err(unexpected(expected, m)),
        };
        self.head = None;
        let len = match m {
            marker::BIN_8 | marker::STR_8 => usize::from(self.fill_u8()?),
            marker::BIN_16 | marker::STR_16 => usize::from(self.fill_u16()?),
            marker::BIN_32 | marker::STR_32 => self.fill_u32()? as usize,
            _ => usize::from(m & 0x1F),
        };
        let limit = self.config.get_raw_size_limit();
        if len > limit {
            return Err(MsgPackError::Type(format!(
                "raw size {len} exceeds limit {limit}"
            )));
        }
        let bytes = self.fill_payload(len)?;
        Ok(RawValue::new(bytes, kind))
    }

    /// Reads a str or bin payload as-is.
    pub fn read_raw(&mut self) -> Result<RawValue> {
        let raw = self.take_raw("raw")?;
        self.stack.reduce_count();
        Ok(raw)
    }

    /// Reads a str or bin payload as bytes. Never validates the content.
    pub fn read_bytes(&mut self) -> Result<Bytes> {
        self.read_raw().map(RawValue::into_bytes)
    }

    /// Reads a str or bin payload as UTF-8 text.
    ///
    /// Malformed text is a type error. The payload then stays pending, so a
    /// following [`Unpacker::read_bytes`] still returns it.
    pub fn read_string(&mut self) -> Result<String> {
        let raw = self.take_raw("string")?;
        let text = raw.as_str().map(str::to_owned);
        match text {
            Ok(s) => {
                self.stack.reduce_count();
                Ok(s)
            }
            Err(e) => {
                self.pending_raw = Some(raw);
                Err(e)
            }
        }
    }

    // -- Containers --

    /// Begins an array and returns its declared element count.
    pub fn read_array_begin(&mut self) -> Result<u32> {
        self.ensure_depth()?;
        let m = self.expect_tag("array", |m| {
            marker::is_fixarray(m) || m == marker::ARRAY_16 || m == marker::ARRAY_32
        })?;
        let size = match m {
            marker::ARRAY_16 => u32::from(self.fill_u16()?),
            marker::ARRAY_32 => self.fill_u32()?,
            _ => u32::from(m & 0x0F),
        };
        let limit = self.config.get_array_size_limit();
        if size > limit {
            return Err(MsgPackError::Type(format!(
                "array size {size} exceeds limit {limit}"
            )));
        }
        self.stack.reduce_count();
        self.stack.push_array(size);
        Ok(size)
    }

    /// Ends the innermost array. Unread elements are skipped unless `check`
    /// is set, in which case they are an error.
    pub fn read_array_end(&mut self, check: bool) -> Result<()> {
        self.stack.expect_top(FrameKind::Array, "readArray")?;
        self.finish_frame(FrameKind::Array, check)
    }

    /// Begins a map and returns its declared entry count.
    pub fn read_map_begin(&mut self) -> Result<u32> {
        self.ensure_depth()?;
        let m = self.expect_tag("map", |m| {
            marker::is_fixmap(m) || m == marker::MAP_16 || m == marker::MAP_32
        })?;
        let size = match m {
            marker::MAP_16 => u32::from(self.fill_u16()?),
            marker::MAP_32 => self.fill_u32()?,
            _ => u32::from(m & 0x0F),
        };
        let limit = self.config.get_map_size_limit();
        if size > limit {
            return Err(MsgPackError::Type(format!(
                "map size {size} exceeds limit {limit}"
            )));
        }
        self.stack.reduce_count();
        self.stack.push_map(size);
        Ok(size)
    }

    /// Ends the innermost map. See [`Unpacker::read_array_end`].
    pub fn read_map_end(&mut self, check: bool) -> Result<()> {
        self.stack.expect_top(FrameKind::Map, "readMap")?;
        self.finish_frame(FrameKind::Map, check)
    }

    fn finish_frame(&mut self, kind: FrameKind, check: bool) -> Result<()> {
        let remaining = self.stack.top_count();
        if remaining > 0 {
            if check {
                let name = kind.name();
                let op = if kind == FrameKind::Array { "readArrayEnd" } else { "readMapEnd" };
                return Err(MsgPackError::Type(format!(
                    "{op}(check=true) is called but the {name} is not end: {remaining}"
                )));
            }
            tracing::debug!(remaining, kind = kind.name(), "skipping unread container slots");
            for _ in 0..remaining {
                self.skip()?;
            }
        }
        self.stack.pop();
        Ok(())
    }

    // -- Whole values --

    /// Reads and discards the next value, including nested containers.
    pub fn skip(&mut self) -> Result<()> {
        self.read_value().map(drop)
    }

    /// Reads the next value as an untyped tree.
    pub fn read_value(&mut self) -> Result<Value> {
        match self.next_type()? {
            ValueType::Nil => {
                self.read_nil()?;
                Ok(Value::Nil)
            }
            ValueType::Boolean => Ok(Value::Boolean(self.read_bool()?)),
            ValueType::Integer => {
                let v = self.read_i128()?;
                Ok(match i64::try_from(v) {
                    Ok(i) => Value::Integer(i),
                    // Only uint 64 can exceed the i64 range.
                    Err(_) => Value::Uint64(v as u64),
                })
            }
            ValueType::Float => {
                if self.peek_tag()? == marker::FLOAT_32 {
                    Ok(Value::Float(self.read_f32()?))
                } else {
                    Ok(Value::Double(self.read_f64()?))
                }
            }
            ValueType::Raw => Ok(Value::Raw(self.read_raw()?)),
            ValueType::Array => {
                let size = self.read_array_begin()?;
                let mut items = Vec::with_capacity(prealloc(size));
                for _ in 0..size {
                    items.push(self.read_value()?);
                }
                self.read_array_end(true)?;
                Ok(Value::Array(items))
            }
            ValueType::Map => {
                let size = self.read_map_begin()?;
                let mut entries = Vec::with_capacity(prealloc(size));
                for _ in 0..size {
                    let k = self.read_value()?;
                    let v = self.read_value()?;
                    entries.push((k, v));
                }
                self.read_map_end(true)?;
                Ok(Value::Map(entries))
            }
        }
    }

    /// Reads a value through its registered template, as a required value.
    pub fn unpack<T: Templated>(&mut self) -> Result<T> {
        T::template().read_present(self, None)
    }
}

/// Caps up-front allocation for declared container sizes.
fn prealloc(size: u32) -> usize {
    (size as usize).min(1024)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packer::Packer;
    use bytes::BytesMut;

    fn pack(f: impl FnOnce(&mut Packer<BytesMut>) -> Result<()>) -> Vec<u8> {
        let mut pk = Packer::new(BytesMut::new());
        f(&mut pk).expect("pack failed");
        pk.into_inner().to_vec()
    }

    #[test]
    fn integers_round_trip_at_every_tier() {
        let values: [i128; 17] = [
            -33,
            -32,
            -1,
            0,
            126,
            127,
            128,
            255,
            256,
            65535,
            65536,
            (1 << 31) - 1,
            1 << 31,
            (1 << 32) - 1,
            1 << 32,
            i128::from(i64::MAX),
            i128::from(u64::MAX),
        ];
        for v in values {
            let bytes = pack(|pk| pk.write_i128(v));
            let mut u = Unpacker::new(&bytes[..]);
            assert_eq!(u.read_i128().unwrap(), v, "failed for {v}");
            assert_eq!(u.read_byte_count(), bytes.len() as u64);
        }
    }

    #[test]
    fn narrow_reader_accepts_wide_encoding_when_it_fits() {
        let bytes = pack(|pk| {
            pk.write_i64(100)?;
            pk.write_u64(300)?;
            pk.write_i64(-5)
        });
        let mut u = Unpacker::new(&bytes[..]);
        assert_eq!(u.read_i8().unwrap(), 100);
        assert_eq!(u.read_i16().unwrap(), 300);
        assert_eq!(u.read_i32().unwrap(), -5);
    }

    #[test]
    fn out_of_range_integer_is_a_type_error() {
        let bytes = pack(|pk| {
            pk.write_i64(300)?;
            pk.write_i64(-1)
        });
        let mut u = Unpacker::new(&bytes[..]);
        assert!(u.read_u8().unwrap_err().is_type_error());
        assert!(u.read_u64().unwrap_err().is_type_error());
    }

    #[test]
    fn mismatched_reader_leaves_value_in_place() {
        let bytes = pack(|pk| pk.write_bool(true));
        let mut u = Unpacker::new(&bytes[..]);
        assert!(u.read_i32().unwrap_err().is_type_error());
        assert!(u.read_string().unwrap_err().is_type_error());
        assert!(u.read_bool().unwrap());
    }

    #[test]
    fn floats() {
        let bytes = pack(|pk| {
            pk.write_f32(1.5)?;
            pk.write_f32(2.5)?;
            pk.write_f64(-0.25)
        });
        let mut u = Unpacker::new(&bytes[..]);
        assert_eq!(u.read_f32().unwrap(), 1.5);
        assert_eq!(u.read_f64().unwrap(), 2.5);
        assert!(u.read_f32().is_err());
        assert_eq!(u.read_f64().unwrap(), -0.25);
    }

    #[test]
    fn try_skip_nil_only_consumes_nil() {
        let bytes = pack(|pk| {
            pk.write_nil()?;
            pk.write_bool(false)
        });
        let mut u = Unpacker::new(&bytes[..]);
        assert!(u.try_skip_nil().unwrap());
        assert!(!u.try_skip_nil().unwrap());
        assert!(!u.read_bool().unwrap());
    }

    #[test]
    fn try_skip_nil_past_end_of_array_reads_absent() {
        let bytes = pack(|pk| {
            pk.write_array_begin(1)?;
            pk.write_i32(7)?;
            pk.write_array_end(true)
        });
        let mut u = Unpacker::new(&bytes[..]);
        assert_eq!(u.read_array_begin().unwrap(), 1);
        assert_eq!(u.read_i32().unwrap(), 7);
        assert!(u.try_skip_nil().unwrap());
        u.read_array_end(true).unwrap();
    }

    #[test]
    fn strings_and_bytes_share_tag_families() {
        let bytes = pack(|pk| {
            pk.write_str("text")?;
            pk.write_bytes(b"bin")
        });
        let mut u = Unpacker::new(&bytes[..]);
        assert_eq!(&u.read_bytes().unwrap()[..], b"text");
        assert_eq!(u.read_string().unwrap(), "bin");
    }

    #[test]
    fn malformed_string_stays_readable_as_bytes() {
        let bytes = pack(|pk| {
            pk.write_array_begin(1)?;
            pk.write_bytes(&[0xE0, 0x80, 0xAF])?;
            pk.write_array_end(true)
        });
        let mut u = Unpacker::new(&bytes[..]);
        u.read_array_begin().unwrap();
        assert!(u.read_string().unwrap_err().is_type_error());
        assert_eq!(u.next_type().unwrap(), ValueType::Raw);
        assert_eq!(&u.read_bytes().unwrap()[..], &[0xE0, 0x80, 0xAF]);
        u.read_array_end(true).unwrap();
    }

    #[test]
    fn lenient_end_skips_unread_elements() {
        let bytes = pack(|pk| {
            pk.write_array_begin(2)?;
            pk.write_array_begin(3)?;
            pk.write_i32(1)?;
            pk.write_i32(2)?;
            pk.write_i32(3)?;
            pk.write_array_end(true)?;
            pk.write_str("tail")?;
            pk.write_array_end(true)?;
            pk.write_bool(true)
        });
        let mut u = Unpacker::new(&bytes[..]);
        u.read_array_begin().unwrap();
        u.read_array_begin().unwrap();
        assert_eq!(u.read_i32().unwrap(), 1);
        let err = u.read_array_end(true).unwrap_err();
        assert!(err.to_string().ends_with("the array is not end: 2"));
        u.read_array_end(false).unwrap();
        u.read_array_end(false).unwrap();
        assert!(u.read_bool().unwrap());
    }

    #[test]
    fn map_end_without_begin_is_rejected() {
        let bytes = pack(|pk| {
            pk.write_array_begin(0)?;
            pk.write_array_end(true)
        });
        let mut u = Unpacker::new(&bytes[..]);
        u.read_array_begin().unwrap();
        assert!(u.read_map_end(true).unwrap_err().is_type_error());
        u.read_array_end(true).unwrap();
    }

    #[test]
    fn reading_past_a_full_container_fails() {
        let bytes = pack(|pk| {
            pk.write_array_begin(0)?;
            pk.write_array_end(true)?;
            pk.write_nil()
        });
        let mut u = Unpacker::new(&bytes[..]);
        u.read_array_begin().unwrap();
        assert!(u.read_nil().unwrap_err().is_type_error());
    }

    #[test]
    fn read_value_builds_a_tree() {
        let bytes = pack(|pk| {
            pk.write_map_begin(2)?;
            pk.write_str("n")?;
            pk.write_u64(u64::MAX)?;
            pk.write_str("list")?;
            pk.write_array_begin(3)?;
            pk.write_nil()?;
            pk.write_f32(0.5)?;
            pk.write_bytes(&[1, 2])?;
            pk.write_array_end(true)?;
            pk.write_map_end(true)
        });
        let mut u = Unpacker::new(&bytes[..]);
        let v = u.read_value().unwrap();
        assert_eq!(v.get("n"), Some(&Value::Uint64(u64::MAX)));
        let list = v.get("list").and_then(Value::as_array).unwrap();
        assert_eq!(list[0], Value::Nil);
        assert_eq!(list[1], Value::Float(0.5));
        assert_eq!(list[2].as_raw().unwrap().as_bytes(), &[1, 2]);
        assert_eq!(u.open_containers(), 0);
        assert_eq!(u.read_byte_count(), bytes.len() as u64);
    }

    #[test]
    fn value_round_trip_is_byte_exact() {
        let bytes = pack(|pk| {
            pk.write_array_begin(4)?;
            pk.write_str("s")?;
            pk.write_bytes(b"b")?;
            pk.write_i64(-1000)?;
            pk.write_f64(1.25)?;
            pk.write_array_end(true)
        });
        let v = Unpacker::new(&bytes[..]).read_value().unwrap();
        assert_eq!(pack(|pk| pk.write_value(&v)), bytes);
    }

    #[test]
    fn truncated_input_is_an_io_error() {
        let bytes = pack(|pk| pk.write_str("hello"));
        let mut u = Unpacker::new(&bytes[..3]);
        assert!(u.read_string().unwrap_err().is_unexpected_eof());
    }

    #[test]
    fn short_payload_fails_before_allocating() {
        // bin 32 declaring 4 GiB with only two payload bytes present.
        let data = [marker::BIN_32, 0xFF, 0xFF, 0xFF, 0xFF, 0x01, 0x02];
        let config = UnpackerConfig::new().raw_size_limit(usize::MAX);
        let mut u = Unpacker::with_config(&data[..], config);
        let err = u.read_bytes().unwrap_err();
        assert!(err.is_unexpected_eof());
        assert!(err.to_string().contains("only 2 remaining"));
    }

    #[test]
    fn unsupported_tags_are_rejected() {
        for tag in [marker::NEVER_USED, marker::EXT_8, marker::FIXEXT_1] {
            let data = [tag, 0, 0];
            let mut u = Unpacker::new(&data[..]);
            assert!(u.read_value().unwrap_err().is_type_error(), "0x{tag:02X}");
        }
    }

    #[test]
    fn extension_tags_are_named_in_the_error() {
        let err = value_type_of(marker::EXT_16).unwrap_err();
        assert_eq!(
            err.to_string(),
            "type error: extension types are not supported: tag 0xC8"
        );
        let err = value_type_of(marker::NEVER_USED).unwrap_err();
        assert!(err.to_string().contains("unsupported MessagePack tag: 0xC1"));
    }

    #[test]
    fn limits_are_enforced_before_payload() {
        let bytes = pack(|pk| pk.write_bytes(&[0u8; 64]));
        let config = UnpackerConfig::new().raw_size_limit(16);
        let mut u = Unpacker::with_config(&bytes[..], config);
        assert!(u.read_bytes().unwrap_err().to_string().contains("exceeds limit 16"));

        let bytes = pack(|pk| {
            pk.write_array_begin(1)?;
            pk.write_array_begin(1)?;
            pk.write_nil()?;
            pk.write_array_end(true)?;
            pk.write_array_end(true)
        });
        let mut u = Unpacker::with_config(&bytes[..], UnpackerConfig::new().max_depth(1));
        assert!(u.read_value().unwrap_err().to_string().contains("nesting depth"));
    }

    #[test]
    fn byte_count_resets() {
        let bytes = pack(|pk| {
            pk.write_i64(1 << 40)?;
            pk.write_nil()
        });
        let mut u = Unpacker::new(&bytes[..]);
        u.read_i64().unwrap();
        assert_eq!(u.read_byte_count(), 9);
        u.reset_read_byte_count();
        u.read_nil().unwrap();
        assert_eq!(u.read_byte_count(), 1);
    }
}
