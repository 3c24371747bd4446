//! mpackr: a pure-Rust MessagePack packer and unpacker.
//!
//! This crate implements the MessagePack binary format with byte-exact,
//! minimal-width encodings. It tracks open arrays and maps so incomplete
//! containers are either rejected or padded, and maps typed application
//! values onto the wire through templates with a required/optional policy.
//!
//! # Architecture
//!
//! - **`format`**: Wire tag constants
//! - **`io`**: Byte sinks and sources (`Output`, `Input`)
//! - **`stack`**: Open-container bookkeeping shared by both directions
//! - **`packer`**: Encoding (`Packer`)
//! - **`unpacker`**: Decoding (`Unpacker`) and its limits
//! - **`value`**: Untyped values (`Value`, `RawValue`)
//! - **`template`**: Typed templates (`Template`, `Templated`)
//! - **`json`**: JSON text output with the packer's write surface
//! - **`stream`**: Whole-value reader/writer over async streams

pub mod error;
pub mod format;
pub mod io;
pub mod json;
pub mod packer;
pub mod stack;
pub mod stream;
pub mod template;
pub mod unpacker;
pub mod value;

pub use error::{MsgPackError, Result};
pub use io::{Input, Output, StreamInput, StreamOutput};
pub use json::JsonPacker;
pub use packer::{Pack, Packer};
pub use template::{Template, Templated};
pub use unpacker::{Unpacker, UnpackerConfig, ValueScanner, ValueType};
pub use value::{RawKind, RawValue, Value};
