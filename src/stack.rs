//! Tracks open arrays and maps while packing or unpacking.
//!
//! Every value written or read inside a container consumes one slot of the
//! innermost frame. An array of `n` elements has `n` slots; a map of `n`
//! entries has `2n` (keys and values count separately). A nested container
//! start consumes one slot of its parent regardless of its own size.

use crate::error::{MsgPackError, Result};

/// The kind of an open container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    Array,
    Map,
}

#[derive(Debug, Clone, Copy)]
struct Frame {
    kind: FrameKind,
    remaining: u64,
}

/// A stack of open container frames.
#[derive(Debug, Default, Clone)]
pub struct ContainerStack {
    frames: Vec<Frame>,
}

impl ContainerStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens an array frame with `size` slots.
    pub fn push_array(&mut self, size: u32) {
        self.frames.push(Frame {
            kind: FrameKind::Array,
            remaining: u64::from(size),
        });
    }

    /// Opens a map frame with `2 * size` slots.
    pub fn push_map(&mut self, size: u32) {
        self.frames.push(Frame {
            kind: FrameKind::Map,
            remaining: u64::from(size) * 2,
        });
    }

    /// Fails if the innermost frame has no slot left for another value.
    ///
    /// Always succeeds at the top level.
    pub fn check_slot(&self) -> Result<()> {
        match self.frames.last() {
            Some(frame) if frame.remaining == 0 => Err(MsgPackError::Type(format!(
                "{} is already full",
                frame.kind.name()
            ))),
            _ => Ok(()),
        }
    }

    /// Consumes one slot of the innermost frame. No-op at the top level.
    pub fn reduce_count(&mut self) {
        if let Some(frame) = self.frames.last_mut() {
            frame.remaining = frame.remaining.saturating_sub(1);
        }
    }

    pub fn top_kind(&self) -> Option<FrameKind> {
        self.frames.last().map(|f| f.kind)
    }

    pub fn top_is_array(&self) -> bool {
        self.top_kind() == Some(FrameKind::Array)
    }

    pub fn top_is_map(&self) -> bool {
        self.top_kind() == Some(FrameKind::Map)
    }

    /// Remaining slots of the innermost frame, or 0 at the top level.
    pub fn top_count(&self) -> u64 {
        self.frames.last().map_or(0, |f| f.remaining)
    }

    /// Discards the innermost frame.
    pub fn pop(&mut self) {
        self.frames.pop();
    }

    /// Discards all frames.
    pub fn clear(&mut self) {
        self.frames.clear();
    }

    /// Number of open frames.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Fails unless the innermost frame is of the given kind.
    pub fn expect_top(&self, kind: FrameKind, op: &str) -> Result<()> {
        if self.top_kind() == Some(kind) {
            Ok(())
        } else {
            Err(MsgPackError::Type(format!(
                "{op}End() is called but {op}Begin() is not called",
            )))
        }
    }
}

impl FrameKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::Array => "array",
            Self::Map => "map",
        }
    }
}
