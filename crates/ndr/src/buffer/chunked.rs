//! One logical stream spread over several fragments
//!
//! Stub data that does not fit a single PDU is carried in a sequence of
//! fragments. Alignment is relative to the start of the stub data, not to
//! the fragment, so positions run on across fragment boundaries.

use super::{ReadBuffer, WriteBuffer};
use crate::drep::DataRepresentation;
use crate::error::{NdrError, Result};
use bytes::{BufMut, Bytes, BytesMut};
use std::collections::VecDeque;

/// Reads one stream out of a list of fragments
#[derive(Debug, Clone, Default)]
pub struct ChunkedReader {
    fragments: VecDeque<Bytes>,
    cursor: usize,
    position: usize,
    remaining: usize,
    drep: DataRepresentation,
}

impl ChunkedReader {
    pub fn new<I>(fragments: I, drep: DataRepresentation) -> Self
    where
        I: IntoIterator<Item = Bytes>,
    {
        let fragments: VecDeque<Bytes> = fragments.into_iter().filter(|f| !f.is_empty()).collect();
        let remaining = fragments.iter().map(Bytes::len).sum();
        Self {
            fragments,
            cursor: 0,
            position: 0,
            remaining,
            drep,
        }
    }

    /// Append a fragment that arrived after reading started
    pub fn push_fragment(&mut self, fragment: Bytes) {
        if !fragment.is_empty() {
            self.remaining += fragment.len();
            self.fragments.push_back(fragment);
        }
    }

    /// Number of fragments not yet fully consumed
    pub fn fragment_count(&self) -> usize {
        self.fragments.len()
    }
}

impl ReadBuffer for ChunkedReader {
    fn read_exact(&mut self, dst: &mut [u8]) -> Result<()> {
        if dst.len() > self.remaining {
            return Err(NdrError::UnexpectedEof {
                needed: dst.len(),
                have: self.remaining,
            });
        }
        let mut filled = 0;
        while filled < dst.len() {
            let Some(front) = self.fragments.front() else {
                break;
            };
            let available = &front[self.cursor..];
            let step = available.len().min(dst.len() - filled);
            dst[filled..filled + step].copy_from_slice(&available[..step]);
            filled += step;
            self.cursor += step;
            if self.cursor == front.len() {
                self.fragments.pop_front();
                self.cursor = 0;
            }
        }
        self.position += filled;
        self.remaining -= filled;
        Ok(())
    }

    fn position(&self) -> usize {
        self.position
    }

    fn remaining_len(&self) -> usize {
        self.remaining
    }

    fn peek_bytes(&self) -> Bytes {
        self.fragments
            .front()
            .map(|front| front.slice(self.cursor..))
            .unwrap_or_default()
    }

    fn data_representation(&self) -> DataRepresentation {
        self.drep
    }
}

/// Writes one stream into fragments of at most `max_fragment` bytes
#[derive(Debug, Clone)]
pub struct ChunkedWriter {
    sealed: Vec<Bytes>,
    current: BytesMut,
    max_fragment: usize,
    position: usize,
    drep: DataRepresentation,
}

impl ChunkedWriter {
    pub fn new(drep: DataRepresentation, max_fragment: usize) -> Self {
        Self {
            sealed: Vec::new(),
            current: BytesMut::with_capacity(max_fragment.min(64 * 1024)),
            max_fragment: max_fragment.max(1),
            position: 0,
            drep,
        }
    }

    /// Close the current fragment early; later writes start a new one.
    pub fn seal_fragment(&mut self) {
        if !self.current.is_empty() {
            self.sealed.push(self.current.split().freeze());
        }
    }

    /// All fragments, the partially filled one last
    pub fn into_fragments(mut self) -> Vec<Bytes> {
        self.seal_fragment();
        self.sealed
    }
}

impl WriteBuffer for ChunkedWriter {
    fn write(&mut self, mut data: &[u8]) -> Result<()> {
        self.position += data.len();
        while !data.is_empty() {
            let room = self.max_fragment - self.current.len();
            let step = room.min(data.len());
            self.current.put_slice(&data[..step]);
            data = &data[step..];
            if self.current.len() == self.max_fragment {
                self.seal_fragment();
            }
        }
        Ok(())
    }

    fn position(&self) -> usize {
        self.position
    }

    fn peek_bytes(&self) -> Bytes {
        Bytes::copy_from_slice(&self.current)
    }

    fn data_representation(&self) -> DataRepresentation {
        self.drep
    }
}
