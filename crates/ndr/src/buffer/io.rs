//! Buffers over `std::io` streams
//!
//! [`IoReader`] and [`IoWriter`] let the codec decode straight from a file
//! or socket and encode straight into one. Nothing is buffered here: the
//! position counts bytes moved since the adapter was created, and failures
//! of the underlying stream surface as `NdrError::Io`.

use super::{ReadBuffer, WriteBuffer};
use crate::drep::DataRepresentation;
use crate::error::{NdrError, Result};
use bytes::Bytes;
use std::io::{self, Read, Write};

/// Reads NDR data from an [`io::Read`]
#[derive(Debug)]
pub struct IoReader<R> {
    inner: R,
    position: usize,
    eof: bool,
    drep: DataRepresentation,
}

impl<R: Read> IoReader<R> {
    pub fn new(inner: R, drep: DataRepresentation) -> Self {
        Self {
            inner,
            position: 0,
            eof: false,
            drep,
        }
    }

    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> ReadBuffer for IoReader<R> {
    fn read_exact(&mut self, dst: &mut [u8]) -> Result<()> {
        let mut filled = 0;
        while filled < dst.len() {
            match self.inner.read(&mut dst[filled..]) {
                Ok(0) => {
                    self.eof = true;
                    return Err(NdrError::UnexpectedEof {
                        needed: dst.len(),
                        have: filled,
                    });
                }
                Ok(n) => {
                    filled += n;
                    self.position += n;
                }
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(err.into()),
            }
        }
        Ok(())
    }

    fn position(&self) -> usize {
        self.position
    }

    fn remaining_len(&self) -> usize {
        0
    }

    fn known_remaining(&self) -> Option<usize> {
        None
    }

    /// True once the stream has reported end of file
    fn at_end(&self) -> bool {
        self.eof
    }

    fn peek_bytes(&self) -> Bytes {
        Bytes::new()
    }

    fn data_representation(&self) -> DataRepresentation {
        self.drep
    }
}

/// Writes NDR data to an [`io::Write`]
#[derive(Debug)]
pub struct IoWriter<W> {
    inner: W,
    position: usize,
    drep: DataRepresentation,
}

impl<W: Write> IoWriter<W> {
    pub fn new(inner: W, drep: DataRepresentation) -> Self {
        Self {
            inner,
            position: 0,
            drep,
        }
    }

    pub fn flush(&mut self) -> Result<()> {
        Ok(self.inner.flush()?)
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> WriteBuffer for IoWriter<W> {
    fn write(&mut self, data: &[u8]) -> Result<()> {
        let mut written = 0;
        while written < data.len() {
            match self.inner.write(&data[written..]) {
                Ok(0) => {
                    return Err(NdrError::ShortWrite {
                        requested: data.len(),
                        written,
                    })
                }
                Ok(n) => {
                    written += n;
                    self.position += n;
                }
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(err.into()),
            }
        }
        Ok(())
    }

    fn position(&self) -> usize {
        self.position
    }

    /// Written bytes go straight to the stream
    fn peek_bytes(&self) -> Bytes {
        Bytes::new()
    }

    fn data_representation(&self) -> DataRepresentation {
        self.drep
    }
}
