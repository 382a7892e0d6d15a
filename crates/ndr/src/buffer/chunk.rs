//! Single contiguous chunk

use super::{ReadBuffer, WriteBuffer};
use crate::drep::DataRepresentation;
use crate::error::{NdrError, Result};
use bytes::{BufMut, Bytes, BytesMut};

/// Growable output chunk
#[derive(Debug, Clone, Default)]
pub struct WriteChunk {
    data: BytesMut,
    drep: DataRepresentation,
}

impl WriteChunk {
    pub fn new(drep: DataRepresentation) -> Self {
        Self::with_capacity(drep, 0)
    }

    pub fn with_capacity(drep: DataRepresentation, capacity: usize) -> Self {
        Self {
            data: BytesMut::with_capacity(capacity),
            drep,
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Bytes {
        self.data.freeze()
    }
}

impl WriteBuffer for WriteChunk {
    fn write(&mut self, data: &[u8]) -> Result<()> {
        self.data.put_slice(data);
        Ok(())
    }

    fn position(&self) -> usize {
        self.data.len()
    }

    fn peek_bytes(&self) -> Bytes {
        Bytes::copy_from_slice(&self.data)
    }

    fn data_representation(&self) -> DataRepresentation {
        self.drep
    }
}

/// Input chunk with a read cursor
///
/// The cursor never passes the end of the data; a read that would is
/// rejected without moving it.
#[derive(Debug, Clone, Default)]
pub struct ReadChunk {
    data: Bytes,
    cursor: usize,
    drep: DataRepresentation,
}

impl ReadChunk {
    pub fn new(data: impl Into<Bytes>, drep: DataRepresentation) -> Self {
        Self {
            data: data.into(),
            cursor: 0,
            drep,
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl ReadBuffer for ReadChunk {
    fn read_exact(&mut self, dst: &mut [u8]) -> Result<()> {
        let have = self.data.len() - self.cursor;
        if dst.len() > have {
            return Err(NdrError::UnexpectedEof {
                needed: dst.len(),
                have,
            });
        }
        let end = self.cursor + dst.len();
        dst.copy_from_slice(&self.data[self.cursor..end]);
        self.cursor = end;
        Ok(())
    }

    fn skip(&mut self, n: usize) -> Result<()> {
        let have = self.data.len() - self.cursor;
        if n > have {
            return Err(NdrError::UnexpectedEof { needed: n, have });
        }
        self.cursor += n;
        Ok(())
    }

    fn read(&mut self, n: usize) -> Result<Bytes> {
        let have = self.data.len() - self.cursor;
        if n > have {
            return Err(NdrError::UnexpectedEof { needed: n, have });
        }
        let out = self.data.slice(self.cursor..self.cursor + n);
        self.cursor += n;
        Ok(out)
    }

    fn position(&self) -> usize {
        self.cursor
    }

    fn remaining_len(&self) -> usize {
        self.data.len() - self.cursor
    }

    fn peek_bytes(&self) -> Bytes {
        self.data.slice(self.cursor..)
    }

    fn data_representation(&self) -> DataRepresentation {
        self.drep
    }
}
