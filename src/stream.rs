//! Reads and writes whole MessagePack values over async byte streams.
//!
//! MessagePack needs no framing: each value declares its own length, so the
//! reader buffers input until one complete value has arrived.

use bytes::{Buf, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::Result;
use crate::packer::Packer;
use crate::template::Templated;
use crate::unpacker::{Unpacker, UnpackerConfig, ValueScanner};
use crate::value::Value;

/// Initial read buffer capacity.
const READ_CAPACITY: usize = 8 * 1024;

/// Reads consecutive MessagePack values from an `AsyncRead` stream.
///
/// A header scan tracks how many bytes the next value needs, so a value is
/// decoded once, after all of it has arrived.
pub struct ValueReader<R> {
    reader: R,
    buf: BytesMut,
    config: UnpackerConfig,
    scanner: ValueScanner,
}

impl<R: AsyncRead + Unpin> ValueReader<R> {
    pub fn new(reader: R) -> Self {
        Self::with_config(reader, UnpackerConfig::default())
    }

    pub fn with_config(reader: R, config: UnpackerConfig) -> Self {
        Self {
            reader,
            buf: BytesMut::with_capacity(READ_CAPACITY),
            config,
            scanner: ValueScanner::new(config),
        }
    }

    /// Reads the next untyped value, or `None` at a clean end of stream.
    pub async fn read_value(&mut self) -> Result<Option<Value>> {
        self.next_with(|u| u.read_value()).await
    }

    /// Reads the next value through its template.
    pub async fn read<T: Templated>(&mut self) -> Result<Option<T>> {
        self.next_with(|u| u.unpack::<T>()).await
    }

    async fn next_with<T>(
        &mut self,
        decode: impl Fn(&mut Unpacker<&[u8]>) -> Result<T>,
    ) -> Result<Option<T>> {
        loop {
            if self.buf.len() >= self.scanner.needed()
                && let Some(end) = self.scanner.scan(&self.buf)?
            {
                let value = decode(&mut Unpacker::with_config(&self.buf[..end], self.config))?;
                self.buf.advance(end);
                self.scanner = ValueScanner::new(self.config);
                return Ok(Some(value));
            }

            let wanted = self.scanner.needed().saturating_sub(self.buf.len());
            self.buf.reserve(wanted.max(READ_CAPACITY));
            let n = self.reader.read_buf(&mut self.buf).await?;
            if n == 0 {
                if self.buf.is_empty() {
                    return Ok(None);
                }
                tracing::warn!(buffered = self.buf.len(), "stream ended inside a value");
                return Err(std::io::Error::new(
                    std::io::ErrorKind::UnexpectedEof,
                    "stream ended inside a value",
                )
                .into());
            }
            tracing::trace!(
                n,
                buffered = self.buf.len(),
                needed = self.scanner.needed(),
                "read more input"
            );
        }
    }
}

/// Writes MessagePack values to an `AsyncWrite` stream.
pub struct ValueWriter<W> {
    writer: W,
    buf: BytesMut,
}

impl<W: AsyncWrite + Unpin> ValueWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            buf: BytesMut::new(),
        }
    }

    /// Writes an untyped value.
    pub async fn write_value(&mut self, value: &Value) -> Result<()> {
        self.buf.clear();
        Packer::new(&mut self.buf).write_value(value)?;
        self.writer.write_all(&self.buf).await?;
        Ok(())
    }

    /// Writes a value through its template.
    pub async fn write<T: Templated>(&mut self, value: &T) -> Result<()> {
        self.buf.clear();
        Packer::new(&mut self.buf).pack(value)?;
        self.writer.write_all(&self.buf).await?;
        Ok(())
    }

    /// Flushes the underlying writer.
    pub async fn flush(&mut self) -> Result<()> {
        self.writer.flush().await?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}
