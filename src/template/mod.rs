//! Typed templates: read and write application values through the packer.
//!
//! A [`Template`] only has to say how a present value is written and read.
//! The provided [`Template::write`] and [`Template::read`] add the shared
//! absence policy: a *required* value must be present, an optional one may
//! be encoded as nil and decodes from nil as `None`.
//!
//! Types opt in by implementing [`Templated`]. Composite application types
//! implement it by hand:
//!
//! ```
//! use mpackr::{Input, Output, Packer, Result, Template, Templated, Unpacker};
//!
//! #[derive(Debug, PartialEq)]
//! struct Point {
//!     x: i32,
//!     y: i32,
//! }
//!
//! struct PointTemplate;
//!
//! impl Template<Point> for PointTemplate {
//!     fn write_present<O: Output>(&self, pk: &mut Packer<O>, p: &Point) -> Result<()> {
//!         pk.write_array_begin(2)?;
//!         pk.write_i32(p.x)?;
//!         pk.write_i32(p.y)?;
//!         pk.write_array_end(true)
//!     }
//!
//!     fn read_present<I: Input>(&self, u: &mut Unpacker<I>, _to: Option<Point>) -> Result<Point> {
//!         u.read_array_begin()?;
//!         let p = Point { x: u.read_i32()?, y: u.read_i32()? };
//!         u.read_array_end(false)?;
//!         Ok(p)
//!     }
//! }
//!
//! impl Templated for Point {
//!     type Template = PointTemplate;
//!     fn template() -> PointTemplate {
//!         PointTemplate
//!     }
//! }
//!
//! let mut pk = Packer::new(Vec::new());
//! pk.pack(&Point { x: 1, y: -2 }).unwrap();
//! let bytes = pk.into_inner();
//! let p: Point = Unpacker::new(&bytes[..]).unpack().unwrap();
//! assert_eq!(p, Point { x: 1, y: -2 });
//! ```

mod collection;
mod time;

use bytes::Bytes;

pub use collection::{ListTemplate, MapTemplate, OptionTemplate};
pub use time::SystemTimeTemplate;

use crate::error::{MsgPackError, Result};
use crate::io::{Input, Output};
use crate::packer::Packer;
use crate::unpacker::Unpacker;
use crate::value::Value;

/// Reads and writes values of type `T`.
pub trait Template<T> {
    /// Writes a value that is known to be present.
    fn write_present<O: Output>(&self, pk: &mut Packer<O>, value: &T) -> Result<()>;

    /// Reads a present value. `to` is an existing value the template may
    /// reuse instead of allocating.
    fn read_present<I: Input>(&self, u: &mut Unpacker<I>, to: Option<T>) -> Result<T>;

    /// Writes `value`, encoding absence as nil unless `required` is set.
    fn write<O: Output>(&self, pk: &mut Packer<O>, value: Option<&T>, required: bool) -> Result<()> {
        match value {
            Some(v) => self.write_present(pk, v),
            None if required => Err(MsgPackError::Type(
                "attempted to write absent value where one is mandatory".into(),
            )),
            None => pk.write_nil(),
        }
    }

    /// Reads a value. Unless `required` is set, a nil reads as `None`.
    fn read<I: Input>(&self, u: &mut Unpacker<I>, to: Option<T>, required: bool) -> Result<Option<T>> {
        if !required && u.try_skip_nil()? {
            return Ok(None);
        }
        self.read_present(u, to).map(Some)
    }
}

/// Types with a template of their own.
pub trait Templated: Sized {
    type Template: Template<Self>;

    fn template() -> Self::Template;
}

macro_rules! scalar_templates {
    ($($(#[$doc:meta])* $name:ident: $ty:ty => $write:ident, $read:ident;)*) => {
        $(
            $(#[$doc])*
            #[derive(Debug, Clone, Copy, Default)]
            pub struct $name;

            impl Template<$ty> for $name {
                fn write_present<O: Output>(&self, pk: &mut Packer<O>, value: &$ty) -> Result<()> {
                    pk.$write(*value)
                }

                fn read_present<I: Input>(&self, u: &mut Unpacker<I>, _to: Option<$ty>) -> Result<$ty> {
                    u.$read()
                }
            }

            impl Templated for $ty {
                type Template = $name;

                fn template() -> $name {
                    $name
                }
            }
        )*
    };
}

scalar_templates! {
    BoolTemplate: bool => write_bool, read_bool;
    I8Template: i8 => write_i8, read_i8;
    I16Template: i16 => write_i16, read_i16;
    I32Template: i32 => write_i32, read_i32;
    I64Template: i64 => write_i64, read_i64;
    /// Integers up to the full signed/unsigned 64-bit range.
    I128Template: i128 => write_i128, read_i128;
    U8Template: u8 => write_u8, read_u8;
    U16Template: u16 => write_u16, read_u16;
    U32Template: u32 => write_u32, read_u32;
    U64Template: u64 => write_u64, read_u64;
    F32Template: f32 => write_f32, read_f32;
    F64Template: f64 => write_f64, read_f64;
}

/// UTF-8 text, validated on read.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringTemplate;

impl Template<String> for StringTemplate {
    fn write_present<O: Output>(&self, pk: &mut Packer<O>, value: &String) -> Result<()> {
        pk.write_str(value)
    }

    fn read_present<I: Input>(&self, u: &mut Unpacker<I>, _to: Option<String>) -> Result<String> {
        u.read_string()
    }
}

impl Templated for String {
    type Template = StringTemplate;

    fn template() -> StringTemplate {
        StringTemplate
    }
}

/// Opaque byte strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct BytesTemplate;

impl Template<Bytes> for BytesTemplate {
    fn write_present<O: Output>(&self, pk: &mut Packer<O>, value: &Bytes) -> Result<()> {
        pk.write_bytes(value)
    }

    fn read_present<I: Input>(&self, u: &mut Unpacker<I>, _to: Option<Bytes>) -> Result<Bytes> {
        u.read_bytes()
    }
}

impl Templated for Bytes {
    type Template = BytesTemplate;

    fn template() -> BytesTemplate {
        BytesTemplate
    }
}

/// Untyped values. A present [`Value::Nil`] is written as nil.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValueTemplate;

impl Template<Value> for ValueTemplate {
    fn write_present<O: Output>(&self, pk: &mut Packer<O>, value: &Value) -> Result<()> {
        pk.write_value(value)
    }

    fn read_present<I: Input>(&self, u: &mut Unpacker<I>, _to: Option<Value>) -> Result<Value> {
        u.read_value()
    }
}

impl Templated for Value {
    type Template = ValueTemplate;

    fn template() -> ValueTemplate {
        ValueTemplate
    }
}
