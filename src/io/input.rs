//! Reads tags and big-endian payloads from a byte source.

use std::io::{self, Read};

use bytes::{Buf, Bytes};

/// A source of MessagePack bytes.
///
/// Running out of data is reported as [`io::ErrorKind::UnexpectedEof`].
pub trait Input {
    fn read_u8(&mut self) -> io::Result<u8>;

    fn read_exact(&mut self, buf: &mut [u8]) -> io::Result<()>;

    /// Bytes known to be left in the source, or `None` for open-ended
    /// streams.
    fn available(&self) -> Option<usize> {
        None
    }

    fn read_u16(&mut self) -> io::Result<u16> {
        let mut b = [0u8; 2];
        self.read_exact(&mut b)?;
        Ok(u16::from_be_bytes(b))
    }

    fn read_u32(&mut self) -> io::Result<u32> {
        let mut b = [0u8; 4];
        self.read_exact(&mut b)?;
        Ok(u32::from_be_bytes(b))
    }

    fn read_u64(&mut self) -> io::Result<u64> {
        let mut b = [0u8; 8];
        self.read_exact(&mut b)?;
        Ok(u64::from_be_bytes(b))
    }
}

fn ensure_remaining(buf: &impl Buf, needed: usize) -> io::Result<()> {
    if buf.remaining() < needed {
        Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("need {needed} bytes but only {} remaining", buf.remaining()),
        ))
    } else {
        Ok(())
    }
}

impl Input for &[u8] {
    fn read_u8(&mut self) -> io::Result<u8> {
        ensure_remaining(self, 1)?;
        Ok(self.get_u8())
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> io::Result<()> {
        ensure_remaining(self, buf.len())?;
        self.copy_to_slice(buf);
        Ok(())
    }

    fn available(&self) -> Option<usize> {
        Some(Buf::remaining(self))
    }
}

impl Input for Bytes {
    fn read_u8(&mut self) -> io::Result<u8> {
        ensure_remaining(self, 1)?;
        Ok(self.get_u8())
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> io::Result<()> {
        ensure_remaining(self, buf.len())?;
        self.copy_to_slice(buf);
        Ok(())
    }

    fn available(&self) -> Option<usize> {
        Some(Buf::remaining(self))
    }
}

impl<I: Input + ?Sized> Input for &mut I {
    fn read_u8(&mut self) -> io::Result<u8> {
        (**self).read_u8()
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> io::Result<()> {
        (**self).read_exact(buf)
    }

    fn available(&self) -> Option<usize> {
        (**self).available()
    }
}

/// Adapts any [`std::io::Read`] into an [`Input`].
pub struct StreamInput<R> {
    reader: R,
}

impl<R: Read> StreamInput<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R: Read> Input for StreamInput<R> {
    fn read_u8(&mut self) -> io::Result<u8> {
        let mut b = [0u8; 1];
        self.reader.read_exact(&mut b)?;
        Ok(b[0])
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> io::Result<()> {
        self.reader.read_exact(buf)
    }
}
