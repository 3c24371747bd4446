//! JSON text output with the same write surface as [`Packer`](crate::Packer).
//!
//! Containers are tracked with the same slot accounting, so a sequence of
//! calls that is valid for the packer renders the equivalent JSON here.
//! Byte strings must be valid UTF-8 and map keys must be strings.

use crate::error::{MsgPackError, Result};
use crate::stack::{ContainerStack, FrameKind};
use crate::value::Value;

/// Renders text as a quoted, escaped JSON string.
pub fn quote(text: &str) -> String {
    serde_json::Value::String(text.to_owned()).to_string()
}

/// Writes JSON text into an owned `String`.
#[derive(Debug, Default)]
pub struct JsonPacker {
    out: String,
    stack: ContainerStack,
    // Declared slot totals, parallel to `stack`.
    totals: Vec<u64>,
}

impl JsonPacker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_str(&self) -> &str {
        &self.out
    }

    pub fn into_string(self) -> String {
        self.out
    }

    /// Forgets every open container. Output written so far is kept.
    pub fn reset(&mut self) {
        self.stack.clear();
        self.totals.clear();
    }

    /// Writes the separator the next slot needs.
    fn separate(&mut self, is_text: bool) -> Result<()> {
        self.stack.check_slot()?;
        let Some(&total) = self.totals.last() else {
            return Ok(());
        };
        let index = total - self.stack.top_count();
        if self.stack.top_is_map() {
            if index % 2 == 0 {
                if !is_text {
                    return Err(MsgPackError::Type("JSON object keys must be strings".into()));
                }
                if index > 0 {
                    self.out.push(',');
                }
            } else {
                self.out.push(':');
            }
        } else if index > 0 {
            self.out.push(',');
        }
        Ok(())
    }

    fn emit(&mut self, text: &str, is_text: bool) -> Result<()> {
        self.separate(is_text)?;
        self.out.push_str(text);
        self.stack.reduce_count();
        Ok(())
    }

    pub fn write_nil(&mut self) -> Result<()> {
        self.emit("null", false)
    }

    pub fn write_bool(&mut self, value: bool) -> Result<()> {
        self.emit(if value { "true" } else { "false" }, false)
    }

    pub fn write_i64(&mut self, value: i64) -> Result<()> {
        self.emit(&value.to_string(), false)
    }

    pub fn write_u64(&mut self, value: u64) -> Result<()> {
        self.emit(&value.to_string(), false)
    }

    /// Writes a finite float. NaN and infinities have no JSON form.
    pub fn write_f64(&mut self, value: f64) -> Result<()> {
        if !value.is_finite() {
            return Err(MsgPackError::Type(format!("{value} cannot be written as JSON")));
        }
        self.emit(&serde_json::Value::from(value).to_string(), false)
    }

    pub fn write_str(&mut self, value: &str) -> Result<()> {
        self.emit(&quote(value), true)
    }

    /// Writes a byte string as JSON text. Malformed UTF-8 is a type error and
    /// nothing is written.
    pub fn write_bytes(&mut self, value: &[u8]) -> Result<()> {
        let text = std::str::from_utf8(value)
            .map_err(|e| MsgPackError::Type(format!("byte string is not valid UTF-8: {e}")))?;
        self.write_str(text)
    }

    pub fn write_value(&mut self, value: &Value) -> Result<()> {
        match value {
            Value::Nil => self.write_nil(),
            Value::Boolean(b) => self.write_bool(*b),
            Value::Integer(i) => self.write_i64(*i),
            Value::Uint64(u) => self.write_u64(*u),
            Value::Float(f) => self.write_f64(f64::from(*f)),
            Value::Double(d) => self.write_f64(*d),
            Value::Raw(raw) => self.write_bytes(raw.as_bytes()),
            Value::Array(items) => {
                self.write_array_begin(crate::packer::checked_len(items.len())?)?;
                for item in items {
                    self.write_value(item)?;
                }
                self.write_array_end(true)
            }
            Value::Map(entries) => {
                self.write_map_begin(crate::packer::checked_len(entries.len())?)?;
                for (k, v) in entries {
                    self.write_value(k)?;
                    self.write_value(v)?;
                }
                self.write_map_end(true)
            }
        }
    }

    pub fn write_array_begin(&mut self, size: u32) -> Result<()> {
        self.emit("[", false)?;
        self.stack.push_array(size);
        self.totals.push(u64::from(size));
        Ok(())
    }

    pub fn write_array_end(&mut self, check: bool) -> Result<()> {
        self.stack.expect_top(FrameKind::Array, "writeArray")?;
        self.finish_frame(FrameKind::Array, check, ']')
    }

    pub fn write_map_begin(&mut self, size: u32) -> Result<()> {
        self.emit("{", false)?;
        self.stack.push_map(size);
        self.totals.push(u64::from(size) * 2);
        Ok(())
    }

    /// Ends the innermost map. Lenient padding can only fill a missing
    /// value; a missing key is an error because nil is not a valid key.
    pub fn write_map_end(&mut self, check: bool) -> Result<()> {
        self.stack.expect_top(FrameKind::Map, "writeMap")?;
        self.finish_frame(FrameKind::Map, check, '}')
    }

    fn finish_frame(&mut self, kind: FrameKind, check: bool, close: char) -> Result<()> {
        let remaining = self.stack.top_count();
        if remaining > 0 {
            if check {
                let name = kind.name();
                let op = if kind == FrameKind::Array { "writeArrayEnd" } else { "writeMapEnd" };
                return Err(MsgPackError::Type(format!(
                    "{op}(check=true) is called but the {name} is not end: {remaining}"
                )));
            }
            for _ in 0..remaining {
                self.write_nil()?;
            }
        }
        self.out.push(close);
        self.stack.pop();
        self.totals.pop();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_containers() {
        let mut pk = JsonPacker::new();
        pk.write_map_begin(2).unwrap();
        pk.write_str("a").unwrap();
        pk.write_array_begin(3).unwrap();
        pk.write_i64(-1).unwrap();
        pk.write_bool(true).unwrap();
        pk.write_nil().unwrap();
        pk.write_array_end(true).unwrap();
        pk.write_str("b").unwrap();
        pk.write_f64(0.5).unwrap();
        pk.write_map_end(true).unwrap();
        assert_eq!(pk.as_str(), r#"{"a":[-1,true,null],"b":0.5}"#);
    }

    #[test]
    fn malformed_bytes_are_rejected_without_output() {
        for bytes in [&[0xC0, 0xAF][..], &[0xE0, 0x80, 0xAF][..]] {
            let mut pk = JsonPacker::new();
            assert!(pk.write_bytes(bytes).unwrap_err().is_type_error());
            assert_eq!(pk.as_str(), "");
        }
    }

    #[test]
    fn valid_bytes_are_written_as_text() {
        let mut pk = JsonPacker::new();
        pk.write_bytes("tab\there".as_bytes()).unwrap();
        assert_eq!(pk.into_string(), r#""tab\there""#);
    }

    #[test]
    fn map_keys_must_be_strings() {
        let mut pk = JsonPacker::new();
        pk.write_map_begin(1).unwrap();
        assert!(pk.write_i64(1).unwrap_err().is_type_error());
    }

    #[test]
    fn lenient_end_pads_with_null() {
        let mut pk = JsonPacker::new();
        pk.write_array_begin(3).unwrap();
        pk.write_i64(1).unwrap();
        assert!(pk.write_array_end(true).is_err());
        pk.write_array_end(false).unwrap();
        assert_eq!(pk.as_str(), "[1,null,null]");
    }

    #[test]
    fn renders_value_trees() {
        let v = Value::Map(vec![(
            Value::from("k"),
            Value::Array(vec![Value::from(u64::MAX), Value::from(1.5f32)]),
        )]);
        let mut pk = JsonPacker::new();
        pk.write_value(&v).unwrap();
        assert_eq!(pk.as_str(), r#"{"k":[18446744073709551615,1.5]}"#);
    }

    #[test]
    fn non_finite_floats_are_rejected() {
        let mut pk = JsonPacker::new();
        assert!(pk.write_f64(f64::NAN).is_err());
    }

    #[test]
    fn quote_escapes() {
        assert_eq!(quote("a\"b"), r#""a\"b""#);
        assert_eq!(quote(""), "\"\"");
    }
}
