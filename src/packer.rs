//! MessagePack encoding: values → bytes.
//!
//! Integers are written with the narrowest encoding that holds them. Each
//! native width has its own tiering so the emitted tag depends only on the
//! value, never on how the caller obtained it.

use crate::error::{MsgPackError, Result};
use crate::format::marker;
use crate::io::Output;
use crate::stack::{ContainerStack, FrameKind};
use crate::template::{Template, Templated};
use crate::value::Value;

/// Writes MessagePack values to an [`Output`], tracking open containers.
///
/// A packer is not meant to be shared between threads; each logical stream
/// gets its own instance.
pub struct Packer<O> {
    out: O,
    stack: ContainerStack,
}

impl<O: Output> Packer<O> {
    pub fn new(out: O) -> Self {
        Self {
            out,
            stack: ContainerStack::new(),
        }
    }

    pub fn get_ref(&self) -> &O {
        &self.out
    }

    pub fn into_inner(self) -> O {
        self.out
    }

    /// Number of arrays and maps begun but not yet ended.
    pub fn open_containers(&self) -> usize {
        self.stack.depth()
    }

    /// Runs one slot-consuming write: the slot is checked before any byte is
    /// emitted and consumed once the write succeeds.
    fn slot(&mut self, f: impl FnOnce(&mut O) -> Result<()>) -> Result<()> {
        self.stack.check_slot()?;
        f(&mut self.out)?;
        self.stack.reduce_count();
        Ok(())
    }

    pub fn write_nil(&mut self) -> Result<()> {
        self.slot(|out| Ok(out.write_u8(marker::NIL)?))
    }

    pub fn write_bool(&mut self, value: bool) -> Result<()> {
        self.slot(|out| encode_bool(out, value))
    }

    pub fn write_i8(&mut self, value: i8) -> Result<()> {
        self.slot(|out| encode_i8(out, value))
    }

    pub fn write_i16(&mut self, value: i16) -> Result<()> {
        self.slot(|out| encode_i16(out, value))
    }

    pub fn write_i32(&mut self, value: i32) -> Result<()> {
        self.slot(|out| encode_i32(out, value))
    }

    pub fn write_i64(&mut self, value: i64) -> Result<()> {
        self.slot(|out| encode_i64(out, value))
    }

    pub fn write_u8(&mut self, value: u8) -> Result<()> {
        self.slot(|out| encode_u8(out, value))
    }

    pub fn write_u16(&mut self, value: u16) -> Result<()> {
        self.slot(|out| encode_u16(out, value))
    }

    pub fn write_u32(&mut self, value: u32) -> Result<()> {
        self.slot(|out| encode_u32(out, value))
    }

    pub fn write_u64(&mut self, value: u64) -> Result<()> {
        self.slot(|out| encode_u64(out, value))
    }

    /// Writes an integer of arbitrary width.
    ///
    /// Values in the `i64` range take the signed path, values up to
    /// `u64::MAX` are written as uint 64, and anything else is a type error.
    pub fn write_i128(&mut self, value: i128) -> Result<()> {
        self.slot(|out| encode_i128(out, value))
    }

    pub fn write_f32(&mut self, value: f32) -> Result<()> {
        self.slot(|out| Ok(out.write_u8_and_f32(marker::FLOAT_32, value)?))
    }

    pub fn write_f64(&mut self, value: f64) -> Result<()> {
        self.slot(|out| Ok(out.write_u8_and_f64(marker::FLOAT_64, value)?))
    }

    /// Writes an opaque byte string (bin family). Content is not validated.
    pub fn write_bytes(&mut self, value: &[u8]) -> Result<()> {
        self.slot(|out| encode_bytes(out, value))
    }

    /// Writes a UTF-8 string (str family).
    pub fn write_str(&mut self, value: &str) -> Result<()> {
        self.slot(|out| encode_str(out, value.as_bytes()))
    }

    /// Writes any [`Pack`] scalar through its own width-specific writer.
    pub fn write<T: Pack + ?Sized>(&mut self, value: &T) -> Result<()> {
        value.pack(self)
    }

    /// Writes a value through its registered template, as a required value.
    pub fn pack<T: Templated>(&mut self, value: &T) -> Result<()> {
        T::template().write(self, Some(value), true)
    }

    /// Writes an untyped value tree.
    pub fn write_value(&mut self, value: &Value) -> Result<()> {
        match value {
            Value::Nil => self.write_nil(),
            Value::Boolean(b) => self.write_bool(*b),
            Value::Integer(i) => self.write_i64(*i),
            Value::Uint64(u) => self.write_u64(*u),
            Value::Float(f) => self.write_f32(*f),
            Value::Double(d) => self.write_f64(*d),
            Value::Raw(raw) if raw.is_binary() => self.write_bytes(raw.as_bytes()),
            Value::Raw(raw) => self.slot(|out| encode_str(out, raw.as_bytes())),
            Value::Array(items) => {
                self.write_array_begin(checked_len(items.len())?)?;
                for item in items {
                    self.write_value(item)?;
                }
                self.write_array_end(true)
            }
            Value::Map(entries) => {
                self.write_map_begin(checked_len(entries.len())?)?;
                for (k, v) in entries {
                    self.write_value(k)?;
                    self.write_value(v)?;
                }
                self.write_map_end(true)
            }
        }
    }

    /// Begins an array of `size` elements.
    pub fn write_array_begin(&mut self, size: u32) -> Result<()> {
        self.slot(|out| encode_array_header(out, size))?;
        self.stack.push_array(size);
        Ok(())
    }

    /// Ends the innermost array.
    ///
    /// If fewer elements than declared were written, `check` decides between
    /// failing and padding the remaining slots with nil.
    pub fn write_array_end(&mut self, check: bool) -> Result<()> {
        self.stack.expect_top(FrameKind::Array, "writeArray")?;
        self.finish_frame(FrameKind::Array, check)
    }

    /// Begins a map of `size` key/value pairs.
    pub fn write_map_begin(&mut self, size: u32) -> Result<()> {
        self.slot(|out| encode_map_header(out, size))?;
        self.stack.push_map(size);
        Ok(())
    }

    /// Ends the innermost map. See [`Packer::write_array_end`].
    pub fn write_map_end(&mut self, check: bool) -> Result<()> {
        self.stack.expect_top(FrameKind::Map, "writeMap")?;
        self.finish_frame(FrameKind::Map, check)
    }

    fn finish_frame(&mut self, kind: FrameKind, check: bool) -> Result<()> {
        let remaining = self.stack.top_count();
        if remaining > 0 {
            if check {
                let name = kind.name();
                let op = if kind == FrameKind::Array { "writeArrayEnd" } else { "writeMapEnd" };
                return Err(MsgPackError::Type(format!(
                    "{op}(check=true) is called but the {name} is not end: {remaining}"
                )));
            }
            tracing::debug!(remaining, kind = kind.name(), "padding unfinished container with nil");
            for _ in 0..remaining {
                self.write_nil()?;
            }
        }
        self.stack.pop();
        Ok(())
    }

    /// Forgets every open container so the packer can be reused.
    pub fn reset(&mut self) {
        self.stack.clear();
    }

    pub fn flush(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }

    pub fn close(&mut self) -> Result<()> {
        self.out.close()?;
        Ok(())
    }
}

/// Converts a collection length to a wire length.
pub(crate) fn checked_len(len: usize) -> Result<u32> {
    u32::try_from(len)
        .map_err(|_| MsgPackError::Type(format!("length {len} exceeds the 32-bit wire limit")))
}

pub fn encode_bool(out: &mut impl Output, value: bool) -> Result<()> {
    out.write_u8(if value { marker::TRUE } else { marker::FALSE })?;
    Ok(())
}

pub fn encode_i8(out: &mut impl Output, value: i8) -> Result<()> {
    if value < -(1 << 5) {
        out.write_u8_and_u8(marker::INT_8, value as u8)?;
    } else {
        // FIXINT, positive or negative
        out.write_u8(value as u8)?;
    }
    Ok(())
}

pub fn encode_i16(out: &mut impl Output, value: i16) -> Result<()> {
    if value < -(1 << 5) {
        if value < -(1 << 7) {
            out.write_u8_and_u16(marker::INT_16, value as u16)?;
        } else {
            out.write_u8_and_u8(marker::INT_8, value as u8)?;
        }
    } else if value < (1 << 7) {
        out.write_u8(value as u8)?;
    } else if value < (1 << 8) {
        out.write_u8_and_u8(marker::UINT_8, value as u8)?;
    } else {
        out.write_u8_and_u16(marker::UINT_16, value as u16)?;
    }
    Ok(())
}

pub fn encode_i32(out: &mut impl Output, value: i32) -> Result<()> {
    if value < -(1 << 5) {
        if value < -(1 << 15) {
            out.write_u8_and_u32(marker::INT_32, value as u32)?;
        } else if value < -(1 << 7) {
            out.write_u8_and_u16(marker::INT_16, value as u16)?;
        } else {
            out.write_u8_and_u8(marker::INT_8, value as u8)?;
        }
    } else if value < (1 << 7) {
        out.write_u8(value as u8)?;
    } else if value < (1 << 8) {
        out.write_u8_and_u8(marker::UINT_8, value as u8)?;
    } else if value < (1 << 16) {
        out.write_u8_and_u16(marker::UINT_16, value as u16)?;
    } else {
        out.write_u8_and_u32(marker::UINT_32, value as u32)?;
    }
    Ok(())
}

/// Encodes an `i64` using the smallest possible MessagePack representation.
pub fn encode_i64(out: &mut impl Output, value: i64) -> Result<()> {
    if value < -(1 << 5) {
        if value < -(1 << 15) {
            if value < -(1 << 31) {
                out.write_u8_and_u64(marker::INT_64, value as u64)?;
            } else {
                out.write_u8_and_u32(marker::INT_32, value as u32)?;
            }
        } else if value < -(1 << 7) {
            out.write_u8_and_u16(marker::INT_16, value as u16)?;
        } else {
            out.write_u8_and_u8(marker::INT_8, value as u8)?;
        }
    } else if value < (1 << 7) {
        out.write_u8(value as u8)?;
    } else {
        encode_u64(out, value as u64)?;
    }
    Ok(())
}

pub fn encode_u8(out: &mut impl Output, value: u8) -> Result<()> {
    if value < (1 << 7) {
        out.write_u8(value)?;
    } else {
        out.write_u8_and_u8(marker::UINT_8, value)?;
    }
    Ok(())
}

pub fn encode_u16(out: &mut impl Output, value: u16) -> Result<()> {
    if value < (1 << 8) {
        encode_u8(out, value as u8)
    } else {
        Ok(out.write_u8_and_u16(marker::UINT_16, value)?)
    }
}

pub fn encode_u32(out: &mut impl Output, value: u32) -> Result<()> {
    if value < (1 << 16) {
        encode_u16(out, value as u16)
    } else {
        Ok(out.write_u8_and_u32(marker::UINT_32, value)?)
    }
}

pub fn encode_u64(out: &mut impl Output, value: u64) -> Result<()> {
    if value < (1 << 32) {
        encode_u32(out, value as u32)
    } else {
        Ok(out.write_u8_and_u64(marker::UINT_64, value)?)
    }
}

pub fn encode_i128(out: &mut impl Output, value: i128) -> Result<()> {
    if let Ok(v) = i64::try_from(value) {
        encode_i64(out, v)
    } else if let Ok(v) = u64::try_from(value) {
        Ok(out.write_u8_and_u64(marker::UINT_64, v)?)
    } else {
        Err(MsgPackError::Type(format!(
            "MessagePack can't serialize integer {value} outside -(2^63)..=(2^64)-1"
        )))
    }
}

/// Encodes a bin header and payload.
pub fn encode_bytes(out: &mut impl Output, value: &[u8]) -> Result<()> {
    let len = checked_len(value.len())?;
    if len < (1 << 8) {
        out.write_u8_and_u8(marker::BIN_8, len as u8)?;
    } else if len < (1 << 16) {
        out.write_u8_and_u16(marker::BIN_16, len as u16)?;
    } else {
        out.write_u8_and_u32(marker::BIN_32, len)?;
    }
    out.write_all(value)?;
    Ok(())
}

/// Encodes a str header and the given UTF-8 payload.
pub fn encode_str(out: &mut impl Output, utf8: &[u8]) -> Result<()> {
    let len = checked_len(utf8.len())?;
    if len < (1 << 5) {
        out.write_u8(marker::FIXSTR_PREFIX | len as u8)?;
    } else if len < (1 << 8) {
        out.write_u8_and_u8(marker::STR_8, len as u8)?;
    } else if len < (1 << 16) {
        out.write_u8_and_u16(marker::STR_16, len as u16)?;
    } else {
        out.write_u8_and_u32(marker::STR_32, len)?;
    }
    out.write_all(utf8)?;
    Ok(())
}

pub fn encode_array_header(out: &mut impl Output, size: u32) -> Result<()> {
    if size < 16 {
        out.write_u8(marker::FIXARRAY_PREFIX | size as u8)?;
    } else if size < (1 << 16) {
        out.write_u8_and_u16(marker::ARRAY_16, size as u16)?;
    } else {
        out.write_u8_and_u32(marker::ARRAY_32, size)?;
    }
    Ok(())
}

pub fn encode_map_header(out: &mut impl Output, size: u32) -> Result<()> {
    if size < 16 {
        out.write_u8(marker::FIXMAP_PREFIX | size as u8)?;
    } else if size < (1 << 16) {
        out.write_u8_and_u16(marker::MAP_16, size as u16)?;
    } else {
        out.write_u8_and_u32(marker::MAP_32, size)?;
    }
    Ok(())
}

/// Scalars the packer can write directly, each through its own writer.
pub trait Pack {
    fn pack<O: Output>(&self, pk: &mut Packer<O>) -> Result<()>;
}

macro_rules! impl_pack {
    ($($ty:ty => $method:ident),* $(,)?) => {
        $(
            impl Pack for $ty {
                fn pack<O: Output>(&self, pk: &mut Packer<O>) -> Result<()> {
                    pk.$method(*self)
                }
            }
        )*
    };
}

impl_pack! {
    bool => write_bool,
    i8 => write_i8,
    i16 => write_i16,
    i32 => write_i32,
    i64 => write_i64,
    i128 => write_i128,
    u8 => write_u8,
    u16 => write_u16,
    u32 => write_u32,
    u64 => write_u64,
    f32 => write_f32,
    f64 => write_f64,
}

impl Pack for str {
    fn pack<O: Output>(&self, pk: &mut Packer<O>) -> Result<()> {
        pk.write_str(self)
    }
}

impl Pack for String {
    fn pack<O: Output>(&self, pk: &mut Packer<O>) -> Result<()> {
        pk.write_str(self)
    }
}

impl Pack for [u8] {
    fn pack<O: Output>(&self, pk: &mut Packer<O>) -> Result<()> {
        pk.write_bytes(self)
    }
}

impl Pack for bytes::Bytes {
    fn pack<O: Output>(&self, pk: &mut Packer<O>) -> Result<()> {
        pk.write_bytes(self)
    }
}

impl Pack for Value {
    fn pack<O: Output>(&self, pk: &mut Packer<O>) -> Result<()> {
        pk.write_value(self)
    }
}

impl<T: Pack> Pack for Option<T> {
    fn pack<O: Output>(&self, pk: &mut Packer<O>) -> Result<()> {
        match self {
            Some(v) => v.pack(pk),
            None => pk.write_nil(),
        }
    }
}
