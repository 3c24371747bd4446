//! Byte sinks and sources used by the packer and unpacker.

pub mod input;
pub mod output;

pub use input::{Input, StreamInput};
pub use output::{Output, StreamOutput};
