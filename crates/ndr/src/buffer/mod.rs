//! Byte buffers underneath the codec
//!
//! The codec never touches bytes directly; it asks a buffer to move exactly
//! `n` bytes and to pad or skip up to an alignment boundary. A short read or
//! write is always an error because NDR has no partial primitives.
//!
//! - [`ReadChunk`] / [`WriteChunk`]: a single contiguous chunk
//! - [`ChunkedReader`] / [`ChunkedWriter`]: one logical stream spread over
//!   several fragments (e.g. one per PDU fragment)
//! - [`handoff::channel`]: a writer and a reader on two threads exchanging
//!   the stream one bounded slice at a time
//! - [`IoReader`] / [`IoWriter`]: any `std::io` stream

mod chunk;
mod chunked;
pub mod handoff;
mod io;

pub use chunk::{ReadChunk, WriteChunk};
pub use chunked::{ChunkedReader, ChunkedWriter};
pub use handoff::{HandoffReader, HandoffWriter};
pub use io::{IoReader, IoWriter};

use crate::align::align_padding;
use crate::drep::{ByteOrder, DataRepresentation};
use crate::error::Result;
use crate::float::FloatFormat;
use bytes::Bytes;

const ZEROS: [u8; 8] = [0; 8];

/// Source side of the codec
pub trait ReadBuffer {
    /// Fill `dst` completely, or fail with `UnexpectedEof`.
    fn read_exact(&mut self, dst: &mut [u8]) -> Result<()>;

    /// Bytes consumed since the start of the stream
    fn position(&self) -> usize;

    /// Bytes that can be read without blocking
    fn remaining_len(&self) -> usize;

    /// Unread bytes of the current chunk
    fn peek_bytes(&self) -> Bytes;

    fn data_representation(&self) -> DataRepresentation;

    /// Total unread length of the stream, if known up front.
    ///
    /// Streaming sources return `None`; decoded counts are then checked only
    /// against the allocation limit.
    fn known_remaining(&self) -> Option<usize> {
        Some(self.remaining_len())
    }

    fn at_end(&self) -> bool {
        self.remaining_len() == 0
    }

    fn byte_order(&self) -> ByteOrder {
        self.data_representation().byte_order()
    }

    fn float_format(&self) -> FloatFormat {
        self.data_representation().float_format()
    }

    /// Read exactly `n` bytes
    fn read(&mut self, n: usize) -> Result<Bytes> {
        let mut data = vec![0u8; n];
        self.read_exact(&mut data)?;
        Ok(Bytes::from(data))
    }

    /// Discard exactly `n` bytes
    fn skip(&mut self, mut n: usize) -> Result<()> {
        let mut scratch = [0u8; 64];
        while n > 0 {
            let step = n.min(scratch.len());
            self.read_exact(&mut scratch[..step])?;
            n -= step;
        }
        Ok(())
    }

    /// Discard padding up to the next multiple of `alignment`; returns the gap.
    fn skip_to_alignment(&mut self, alignment: usize) -> Result<usize> {
        let gap = align_padding(self.position(), alignment)?;
        self.skip(gap)?;
        Ok(gap)
    }
}

/// Sink side of the codec
pub trait WriteBuffer {
    /// Append all of `data`, or fail with `ShortWrite`.
    fn write(&mut self, data: &[u8]) -> Result<()>;

    /// Bytes produced since the start of the stream
    fn position(&self) -> usize;

    /// Bytes written to the current chunk
    fn peek_bytes(&self) -> Bytes;

    fn data_representation(&self) -> DataRepresentation;

    fn byte_order(&self) -> ByteOrder {
        self.data_representation().byte_order()
    }

    fn float_format(&self) -> FloatFormat {
        self.data_representation().float_format()
    }

    /// Zero-fill up to the next multiple of `alignment`; returns the gap.
    fn fill_to_alignment(&mut self, alignment: usize) -> Result<usize> {
        let gap = align_padding(self.position(), alignment)?;
        let mut left = gap;
        while left > 0 {
            let step = left.min(ZEROS.len());
            self.write(&ZEROS[..step])?;
            left -= step;
        }
        Ok(gap)
    }
}

impl<T: ReadBuffer + ?Sized> ReadBuffer for &mut T {
    fn read_exact(&mut self, dst: &mut [u8]) -> Result<()> {
        (**self).read_exact(dst)
    }

    fn position(&self) -> usize {
        (**self).position()
    }

    fn remaining_len(&self) -> usize {
        (**self).remaining_len()
    }

    fn known_remaining(&self) -> Option<usize> {
        (**self).known_remaining()
    }

    fn at_end(&self) -> bool {
        (**self).at_end()
    }

    fn peek_bytes(&self) -> Bytes {
        (**self).peek_bytes()
    }

    fn data_representation(&self) -> DataRepresentation {
        (**self).data_representation()
    }

    fn read(&mut self, n: usize) -> Result<Bytes> {
        (**self).read(n)
    }

    fn skip(&mut self, n: usize) -> Result<()> {
        (**self).skip(n)
    }
}

impl<T: WriteBuffer + ?Sized> WriteBuffer for &mut T {
    fn write(&mut self, data: &[u8]) -> Result<()> {
        (**self).write(data)
    }

    fn position(&self) -> usize {
        (**self).position()
    }

    fn peek_bytes(&self) -> Bytes {
        (**self).peek_bytes()
    }

    fn data_representation(&self) -> DataRepresentation {
        (**self).data_representation()
    }
}
