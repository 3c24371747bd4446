//! MessagePack wire format.
//!
//! Every value is introduced by a one-byte tag. Small integers and short
//! string/array/map lengths are embedded in the tag itself; everything else
//! is followed by a big-endian length or payload.

pub mod marker;
