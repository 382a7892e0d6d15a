//! Blocking hand-off between one producer thread and one consumer thread
//!
//! The writer offers one slice of at most `capacity` bytes and blocks until
//! the reader has consumed all of it; the reader blocks until a slice is on
//! offer. Slices are exchanged strictly in order, so both sides see the same
//! logical byte stream and the same positions.
//!
//! Either side may close (explicitly or by being dropped). A blocked
//! counterpart then returns with whatever was exchanged so far: a reader
//! gets `UnexpectedEof`, a writer gets `ShortWrite`. There is no timeout; a
//! counterpart that never shows up blocks forever.

use super::{ReadBuffer, WriteBuffer};
use crate::drep::DataRepresentation;
use crate::error::{NdrError, Result};
use bytes::Bytes;
use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use tracing::trace;

#[derive(Debug, Default)]
struct State {
    /// Unconsumed part of the slice on offer
    slice: Option<Bytes>,
    writer_closed: bool,
    reader_closed: bool,
}

#[derive(Debug, Default)]
struct Shared {
    state: Mutex<State>,
    changed: Condvar,
}

/// Create a connected writer/reader pair exchanging at most `capacity` bytes per slice
pub fn channel(drep: DataRepresentation, capacity: usize) -> (HandoffWriter, HandoffReader) {
    let shared = Arc::new(Shared::default());
    let writer = HandoffWriter {
        shared: shared.clone(),
        capacity: capacity.max(1),
        position: 0,
        drep,
    };
    let reader = HandoffReader {
        shared,
        position: 0,
        drep,
    };
    (writer, reader)
}

/// Producer half of a hand-off buffer
#[derive(Debug)]
pub struct HandoffWriter {
    shared: Arc<Shared>,
    capacity: usize,
    position: usize,
    drep: DataRepresentation,
}

impl HandoffWriter {
    /// Signal end of stream to the reader
    pub fn close(&mut self) {
        let mut state = self.shared.state.lock();
        if !state.writer_closed {
            trace!(position = self.position, "hand-off writer closed");
            state.writer_closed = true;
            self.shared.changed.notify_all();
        }
    }

    /// Offer one slice and wait until it is fully consumed; returns the bytes taken.
    fn offer(&self, slice: Bytes) -> Result<usize> {
        let len = slice.len();
        let mut state = self.shared.state.lock();
        if state.writer_closed {
            return Err(NdrError::HandoffClosed);
        }
        while state.slice.is_some() && !state.reader_closed {
            self.shared.changed.wait(&mut state);
        }
        if state.reader_closed {
            return Ok(0);
        }
        trace!(len, position = self.position, "hand-off slice offered");
        state.slice = Some(slice);
        self.shared.changed.notify_all();

        while state.slice.is_some() && !state.reader_closed {
            self.shared.changed.wait(&mut state);
        }
        let left = state.slice.take().map_or(0, |rest| rest.len());
        Ok(len - left)
    }
}

impl WriteBuffer for HandoffWriter {
    fn write(&mut self, data: &[u8]) -> Result<()> {
        let mut written = 0;
        for piece in data.chunks(self.capacity) {
            let taken = self.offer(Bytes::copy_from_slice(piece))?;
            written += taken;
            self.position += taken;
            if taken < piece.len() {
                return Err(NdrError::ShortWrite {
                    requested: data.len(),
                    written,
                });
            }
        }
        Ok(())
    }

    fn position(&self) -> usize {
        self.position
    }

    /// Bytes still waiting for the reader
    fn peek_bytes(&self) -> Bytes {
        self.shared.state.lock().slice.clone().unwrap_or_default()
    }

    fn data_representation(&self) -> DataRepresentation {
        self.drep
    }
}

impl Drop for HandoffWriter {
    fn drop(&mut self) {
        self.close();
    }
}

/// Consumer half of a hand-off buffer
#[derive(Debug)]
pub struct HandoffReader {
    shared: Arc<Shared>,
    position: usize,
    drep: DataRepresentation,
}

impl HandoffReader {
    /// Stop consuming; a writer blocked on a slice gets `ShortWrite`.
    pub fn close(&mut self) {
        let mut state = self.shared.state.lock();
        if !state.reader_closed {
            trace!(position = self.position, "hand-off reader closed");
            state.reader_closed = true;
            self.shared.changed.notify_all();
        }
    }
}

impl ReadBuffer for HandoffReader {
    fn read_exact(&mut self, dst: &mut [u8]) -> Result<()> {
        let mut filled = 0;
        let mut state = self.shared.state.lock();
        if state.reader_closed {
            return Err(NdrError::HandoffClosed);
        }
        while filled < dst.len() {
            if let Some(slice) = state.slice.as_mut() {
                let step = slice.len().min(dst.len() - filled);
                dst[filled..filled + step].copy_from_slice(&slice.split_to(step));
                filled += step;
                self.position += step;
                if slice.is_empty() {
                    state.slice = None;
                    self.shared.changed.notify_all();
                }
                continue;
            }
            if state.writer_closed {
                return Err(NdrError::UnexpectedEof {
                    needed: dst.len(),
                    have: filled,
                });
            }
            self.shared.changed.wait(&mut state);
        }
        Ok(())
    }

    fn position(&self) -> usize {
        self.position
    }

    /// Bytes of the slice currently on offer
    fn remaining_len(&self) -> usize {
        self.shared.state.lock().slice.as_ref().map_or(0, Bytes::len)
    }

    fn known_remaining(&self) -> Option<usize> {
        None
    }

    /// True only once the writer has closed and everything was consumed
    fn at_end(&self) -> bool {
        let state = self.shared.state.lock();
        state.slice.is_none() && state.writer_closed
    }

    fn peek_bytes(&self) -> Bytes {
        self.shared.state.lock().slice.clone().unwrap_or_default()
    }

    fn data_representation(&self) -> DataRepresentation {
        self.drep
    }
}

impl Drop for HandoffReader {
    fn drop(&mut self) {
        self.close();
    }
}
