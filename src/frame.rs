//! Length prefixed frames.
//!
//! Every request and response travels as an `INT32` byte count followed by
//! exactly that many bytes. The count of an outgoing request is not known
//! until its payload has been written, so [`encode_frame`] writes a zero
//! placeholder, writes the payload behind it, and then patches the real
//! length in place.
//!
//! ```text
//! Frame => length payload
//!   length => INT32
//!   payload => length bytes
//! ```
use std::mem::size_of;

use crate::{
    buffer::ByteBuffer,
    encode::ToByte,
    error::{Error, Result},
    parser::{self, DecodeError, DecodeResult},
    protocol::Response,
};

/// Width of the length prefix.
pub const LENGTH_PREFIX: usize = size_of::<i32>();

/// Frame `request` at the write cursor and return the payload length.
///
/// On failure the write cursor is put back where it started, so a buffer
/// never holds half a frame.
pub fn encode_frame<R: ToByte + ?Sized>(buffer: &mut ByteBuffer, request: &R) -> Result<usize> {
    let frame_start = buffer.write_offset();
    let result = write_frame(buffer, frame_start, request);
    if result.is_err() {
        buffer.rewind_write(frame_start);
    }
    result
}

fn write_frame<R: ToByte + ?Sized>(
    buffer: &mut ByteBuffer,
    frame_start: usize,
    request: &R,
) -> Result<usize> {
    0i32.encode(buffer)?;
    request.encode(buffer)?;

    let length = buffer.write_offset() - frame_start - LENGTH_PREFIX;
    let prefix = i32::try_from(length)
        .map_err(|_| Error::MalformedField(format!("frame of {length} bytes")))?;
    buffer.patch_i32_at(frame_start, prefix)?;
    tracing::trace!("Framed {} payload bytes", length);
    Ok(length)
}

/// Read the length prefix at the read cursor.
pub fn read_frame_length(buffer: &mut ByteBuffer) -> Result<usize> {
    buffer.read_with(parse_frame_length)
}

fn parse_frame_length(input: &[u8]) -> DecodeResult<'_, usize> {
    let (input, length) = parser::int32(input)?;
    if length < 0 {
        return Err(nom::Err::Failure(DecodeError::Malformed(format!(
            "frame length {length}"
        ))));
    }
    Ok((input, length as usize))
}

/// Total size, prefix included, of the frame at the read cursor, once
/// enough bytes have arrived to know it. The cursor does not move.
pub fn peek_frame_size(buffer: &ByteBuffer) -> Result<Option<usize>> {
    if buffer.available_to_read() < LENGTH_PREFIX {
        return Ok(None);
    }
    let length = buffer.peek_i32_at(buffer.read_offset())?;
    if length < 0 {
        return Err(Error::MalformedField(format!("frame length {length}")));
    }
    Ok(Some(LENGTH_PREFIX + length as usize))
}

/// Parse one whole frame: the length, then `f` over exactly that many
/// bytes. Whatever `f` leaves unread inside the frame is skipped.
pub fn parse_frame<'a, O, F>(mut f: F) -> impl FnMut(&'a [u8]) -> DecodeResult<'a, O>
where
    F: FnMut(&'a [u8]) -> DecodeResult<'a, O>,
{
    move |input: &'a [u8]| {
        let (input, length) = parse_frame_length(input)?;
        if input.len() < length {
            return Err(nom::Err::Error(DecodeError::Underrun {
                requested: length,
                available: input.len(),
            }));
        }
        let (payload, rest) = input.split_at(length);
        let (unread, out) = f(payload)?;
        if !unread.is_empty() {
            tracing::trace!("Skipping {} trailing bytes in frame", unread.len());
        }
        Ok((rest, out))
    }
}

/// Decode a response frame and check that it answers `correlation_id`.
///
/// The read cursor only moves past the frame if it decodes, and the
/// correlation id check happens after that.
pub fn decode_response<S: Response>(
    buffer: &mut ByteBuffer,
    correlation_id: i32,
    api_version: i16,
) -> Result<S> {
    if !(0..=S::MAX_VERSION).contains(&api_version) {
        return Err(Error::UnsupportedVersion(api_version));
    }
    let response =
        buffer.read_with(|input| parse_frame(|payload| S::parse(api_version, payload))(input))?;
    expect_correlation(correlation_id, response.correlation_id())?;
    Ok(response)
}

pub fn expect_correlation(expected: i32, actual: i32) -> Result<()> {
    if expected != actual {
        tracing::error!(
            "ERROR: response correlation id {} does not match request {}",
            actual,
            expected
        );
        return Err(Error::CorrelationMismatch { expected, actual });
    }
    Ok(())
}
