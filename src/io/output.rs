//! Writes tags and big-endian payloads to a byte sink.

use std::io::{self, Write};

use bytes::{BufMut, BytesMut};

/// A sink of MessagePack bytes.
///
/// The combined `write_u8_and_*` calls emit a tag byte followed by a
/// fixed-width big-endian payload.
pub trait Output {
    fn write_u8(&mut self, b: u8) -> io::Result<()>;

    fn write_all(&mut self, data: &[u8]) -> io::Result<()>;

    fn write_u8_and_u8(&mut self, tag: u8, v: u8) -> io::Result<()> {
        self.write_all(&[tag, v])
    }

    fn write_u8_and_u16(&mut self, tag: u8, v: u16) -> io::Result<()> {
        let [a, b] = v.to_be_bytes();
        self.write_all(&[tag, a, b])
    }

    fn write_u8_and_u32(&mut self, tag: u8, v: u32) -> io::Result<()> {
        let mut data = [tag; 5];
        data[1..].copy_from_slice(&v.to_be_bytes());
        self.write_all(&data)
    }

    fn write_u8_and_u64(&mut self, tag: u8, v: u64) -> io::Result<()> {
        let mut data = [tag; 9];
        data[1..].copy_from_slice(&v.to_be_bytes());
        self.write_all(&data)
    }

    fn write_u8_and_f32(&mut self, tag: u8, v: f32) -> io::Result<()> {
        self.write_u8_and_u32(tag, v.to_bits())
    }

    fn write_u8_and_f64(&mut self, tag: u8, v: f64) -> io::Result<()> {
        self.write_u8_and_u64(tag, v.to_bits())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }

    /// Flushes and releases the sink.
    fn close(&mut self) -> io::Result<()> {
        self.flush()
    }
}

impl Output for BytesMut {
    fn write_u8(&mut self, b: u8) -> io::Result<()> {
        self.put_u8(b);
        Ok(())
    }

    fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        self.put_slice(data);
        Ok(())
    }

    fn write_u8_and_u16(&mut self, tag: u8, v: u16) -> io::Result<()> {
        self.put_u8(tag);
        self.put_u16(v);
        Ok(())
    }

    fn write_u8_and_u32(&mut self, tag: u8, v: u32) -> io::Result<()> {
        self.put_u8(tag);
        self.put_u32(v);
        Ok(())
    }

    fn write_u8_and_u64(&mut self, tag: u8, v: u64) -> io::Result<()> {
        self.put_u8(tag);
        self.put_u64(v);
        Ok(())
    }
}

impl<O: Output + ?Sized> Output for &mut O {
    fn write_u8(&mut self, b: u8) -> io::Result<()> {
        (**self).write_u8(b)
    }

    fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        (**self).write_all(data)
    }

    fn write_u8_and_u8(&mut self, tag: u8, v: u8) -> io::Result<()> {
        (**self).write_u8_and_u8(tag, v)
    }

    fn write_u8_and_u16(&mut self, tag: u8, v: u16) -> io::Result<()> {
        (**self).write_u8_and_u16(tag, v)
    }

    fn write_u8_and_u32(&mut self, tag: u8, v: u32) -> io::Result<()> {
        (**self).write_u8_and_u32(tag, v)
    }

    fn write_u8_and_u64(&mut self, tag: u8, v: u64) -> io::Result<()> {
        (**self).write_u8_and_u64(tag, v)
    }

    fn flush(&mut self) -> io::Result<()> {
        (**self).flush()
    }

    fn close(&mut self) -> io::Result<()> {
        (**self).close()
    }
}

impl Output for Vec<u8> {
    fn write_u8(&mut self, b: u8) -> io::Result<()> {
        self.push(b);
        Ok(())
    }

    fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        self.extend_from_slice(data);
        Ok(())
    }
}

/// Adapts any [`std::io::Write`] into an [`Output`].
///
/// `close` flushes and drops the inner writer; later writes fail with
/// [`io::ErrorKind::BrokenPipe`].
pub struct StreamOutput<W> {
    writer: Option<W>,
}

impl<W: Write> StreamOutput<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Some(writer),
        }
    }

    /// Returns the inner writer, or `None` once closed.
    pub fn into_inner(self) -> Option<W> {
        self.writer
    }

    fn writer(&mut self) -> io::Result<&mut W> {
        self.writer
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::BrokenPipe, "output is closed"))
    }
}

impl<W: Write> Output for StreamOutput<W> {
    fn write_u8(&mut self, b: u8) -> io::Result<()> {
        self.writer()?.write_all(&[b])
    }

    fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        self.writer()?.write_all(data)
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.writer.as_mut() {
            Some(w) => w.flush(),
            None => Ok(()),
        }
    }

    fn close(&mut self) -> io::Result<()> {
        if let Some(mut w) = self.writer.take() {
            w.flush()?;
        }
        Ok(())
    }
}
