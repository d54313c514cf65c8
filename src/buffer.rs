//! Fixed capacity byte region with independent read and write cursors.
//!
//! Every codec operation works against a [`ByteBuffer`]. Bytes are appended
//! at the write cursor and consumed from the read cursor, so at all times
//! `0 <= read_offset <= write_offset <= capacity`.
//!
//! A single buffer is meant to carry one request/response exchange at a
//! time: the request is framed into it, drained by the transport, the
//! cursors are reset and the response is received into the same region.
//!
//! ### Example
//! ```rust
//! use metamorphosis::prelude::{encode::ToByte, parser, ByteBuffer};
//!
//! let mut buffer = ByteBuffer::new(16);
//! 100i32.encode(&mut buffer)?;
//! assert_eq!(parser::read_i32(&mut buffer)?, 100);
//! # Ok::<(), metamorphosis::prelude::Error>(())
//! ```
use std::mem::size_of;

use bytes::{Buf, BufMut, BytesMut};

use crate::{
    error::{Error, Result},
    parser::{self, DecodeResult},
};

#[derive(Clone, Debug)]
pub struct ByteBuffer {
    buf: BytesMut,
    read_offset: usize,
    write_offset: usize,
}

impl ByteBuffer {
    /// Allocate a zeroed buffer that can never grow past `capacity`.
    pub fn new(capacity: usize) -> Self {
        Self {
            buf: BytesMut::zeroed(capacity),
            read_offset: 0,
            write_offset: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    pub fn read_offset(&self) -> usize {
        self.read_offset
    }

    pub fn write_offset(&self) -> usize {
        self.write_offset
    }

    /// Bytes written but not yet read.
    pub fn available_to_read(&self) -> usize {
        self.write_offset - self.read_offset
    }

    /// Room left before the write cursor hits capacity.
    pub fn available_to_write(&self) -> usize {
        self.capacity() - self.write_offset
    }

    pub fn validate_read(&self, count: usize) -> Result<()> {
        if self.available_to_read() < count {
            return Err(Error::BufferUnderrun {
                requested: count,
                available: self.available_to_read(),
            });
        }
        Ok(())
    }

    /// Move the read cursor forward. Callers validate first.
    pub fn complete_read(&mut self, count: usize) {
        debug_assert!(count <= self.available_to_read());
        self.read_offset += count;
    }

    pub fn validate_write(&self, count: usize) -> Result<()> {
        if self.available_to_write() < count {
            return Err(Error::BufferOverflow {
                requested: count,
                available: self.available_to_write(),
            });
        }
        Ok(())
    }

    /// Move the write cursor forward. Callers validate first.
    pub fn append_write(&mut self, count: usize) {
        debug_assert!(count <= self.available_to_write());
        self.write_offset += count;
    }

    /// Drop everything written after `offset`, used to back out of a
    /// frame that failed half way through.
    pub(crate) fn rewind_write(&mut self, offset: usize) {
        debug_assert!(self.read_offset <= offset && offset <= self.write_offset);
        self.write_offset = offset;
    }

    /// Rewind both cursors for a new exchange.
    ///
    /// The old contents are left in place, they are simply no longer
    /// reachable through the cursors.
    pub fn reset_read_write(&mut self) {
        self.read_offset = 0;
        self.write_offset = 0;
    }

    /// The unread region, `read_offset..write_offset`.
    pub fn readable(&self) -> &[u8] {
        &self.buf[self.read_offset..self.write_offset]
    }

    /// The unwritten region, `write_offset..capacity`.
    ///
    /// Transports receive straight into this slice and then call
    /// [`append_write`](Self::append_write) with the byte count.
    pub fn unfilled_mut(&mut self) -> &mut [u8] {
        let start = self.write_offset;
        &mut self.buf[start..]
    }

    /// Copy `data` in at the write cursor.
    pub fn put_slice(&mut self, data: &[u8]) -> Result<()> {
        self.validate_write(data.len())?;
        self.unfilled_mut().put_slice(data);
        self.append_write(data.len());
        Ok(())
    }

    /// Overwrite four already written bytes at an absolute offset.
    ///
    /// Neither cursor moves. Used to fill in a frame length once the payload
    /// behind it has been written.
    pub fn patch_i32_at(&mut self, offset: usize, value: i32) -> Result<()> {
        let end = offset + size_of::<i32>();
        if end > self.write_offset {
            return Err(Error::BufferOverflow {
                requested: end,
                available: self.write_offset,
            });
        }
        let mut dst = &mut self.buf[offset..end];
        dst.put_i32(value);
        Ok(())
    }

    /// Read four written bytes at an absolute offset without moving a cursor.
    pub fn peek_i32_at(&self, offset: usize) -> Result<i32> {
        let end = offset + size_of::<i32>();
        if end > self.write_offset {
            return Err(Error::BufferUnderrun {
                requested: end,
                available: self.write_offset,
            });
        }
        let mut src = &self.buf[offset..end];
        Ok(src.get_i32())
    }

    /// Run a parser over every unread byte.
    ///
    /// The read cursor only moves if the parser succeeds, and then only by
    /// what the parser consumed.
    pub fn read_with<O, F>(&mut self, decode: F) -> Result<O>
    where
        F: FnOnce(&[u8]) -> DecodeResult<'_, O>,
    {
        let available = self.available_to_read();
        let (consumed, out) = {
            let input = self.readable();
            let (rest, out) = decode(input).map_err(parser::into_error)?;
            (input.len() - rest.len(), out)
        };
        debug_assert!(consumed <= available);
        self.complete_read(consumed);
        Ok(out)
    }
}
