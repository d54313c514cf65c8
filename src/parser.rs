//! Deserialize data from the bytecode protocol.
//!
//! Two layers live here. The `int*`, `nullable_string` and `parse_*`
//! functions are nom parsers over a borrowed byte slice; they compose into
//! whole response decoders. The `read_*` functions run those parsers against
//! a [`ByteBuffer`] and move its read cursor only when they succeed.
use std::mem::size_of;

use nom::{
    bytes::complete::take,
    combinator::map,
    error::{ErrorKind, ParseError},
    multi::many_m_n,
    number::complete::{be_i16, be_i32, be_i64, be_i8},
    IResult, Parser,
};

use crate::{
    buffer::ByteBuffer,
    error::{Error, KafkaCode, Result},
};

pub type DecodeResult<'a, O> = IResult<&'a [u8], O, DecodeError>;

/// Why a parser stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The input ran out in the middle of a fixed width value.
    Underrun { requested: usize, available: usize },
    /// A declared length or count that can not be honoured.
    Malformed(String),
    Utf8,
    Nom(ErrorKind),
}

impl<I> ParseError<I> for DecodeError {
    fn from_error_kind(_: I, kind: ErrorKind) -> Self {
        DecodeError::Nom(kind)
    }

    // keep the innermost cause, it is the one that names the bad field
    fn append(_: I, _: ErrorKind, other: Self) -> Self {
        other
    }
}

impl From<DecodeError> for Error {
    fn from(err: DecodeError) -> Self {
        match err {
            DecodeError::Underrun {
                requested,
                available,
            } => Error::BufferUnderrun {
                requested,
                available,
            },
            DecodeError::Malformed(reason) => Error::MalformedField(reason),
            DecodeError::Utf8 => Error::DecodingUtf,
            DecodeError::Nom(kind) => Error::MalformedField(format!("{kind:?}")),
        }
    }
}

pub(crate) fn into_error(err: nom::Err<DecodeError>) -> Error {
    match err {
        nom::Err::Error(e) | nom::Err::Failure(e) => {
            tracing::error!("ERROR: decoding stopped with {:?}", e);
            e.into()
        }
        nom::Err::Incomplete(needed) => {
            tracing::error!("ERROR: decoding wanted more input {:?}", needed);
            Error::MalformedField(format!("incomplete input {needed:?}"))
        }
    }
}

fn malformed(reason: String) -> nom::Err<DecodeError> {
    nom::Err::Failure(DecodeError::Malformed(reason))
}

fn ensure(input: &[u8], width: usize) -> std::result::Result<(), nom::Err<DecodeError>> {
    if input.len() < width {
        return Err(nom::Err::Error(DecodeError::Underrun {
            requested: width,
            available: input.len(),
        }));
    }
    Ok(())
}

pub fn int8(input: &[u8]) -> DecodeResult<'_, i8> {
    ensure(input, size_of::<i8>())?;
    be_i8(input)
}

pub fn int16(input: &[u8]) -> DecodeResult<'_, i16> {
    ensure(input, size_of::<i16>())?;
    be_i16(input)
}

pub fn int32(input: &[u8]) -> DecodeResult<'_, i32> {
    ensure(input, size_of::<i32>())?;
    be_i32(input)
}

pub fn int64(input: &[u8]) -> DecodeResult<'_, i64> {
    ensure(input, size_of::<i64>())?;
    be_i64(input)
}

pub fn boolean(input: &[u8]) -> DecodeResult<'_, bool> {
    map(int8, |flag| flag != 0)(input)
}

pub fn parse_kafka_code(input: &[u8]) -> DecodeResult<'_, KafkaCode> {
    map(int16, KafkaCode::from_code)(input)
}

/// A string behind an `i16` length.
///
/// Any length of zero or below decodes as absent and consumes no payload.
/// A positive length is validated against the remaining input before
/// anything is copied out.
pub fn nullable_string(input: &[u8]) -> DecodeResult<'_, Option<String>> {
    let (input, length) = int16(input)?;
    if length <= 0 {
        return Ok((input, None));
    }

    let length = length as usize;
    if length > input.len() {
        return Err(malformed(format!(
            "string of {} bytes with {} remaining",
            length,
            input.len()
        )));
    }
    let (input, raw) = take::<_, _, DecodeError>(length)(input)?;
    let string = std::str::from_utf8(raw).map_err(|_| nom::Err::Failure(DecodeError::Utf8))?;
    Ok((input, Some(string.to_owned())))
}

fn array_length(input: &[u8], length: i32) -> std::result::Result<usize, nom::Err<DecodeError>> {
    if length < 0 {
        return Err(malformed(format!("array length {length}")));
    }
    // every element takes at least one byte
    let length = length as usize;
    if length > input.len() {
        return Err(malformed(format!(
            "array of {} elements with {} bytes remaining",
            length,
            input.len()
        )));
    }
    Ok(length)
}

/// An `i32` count followed by that many elements. Negative counts are
/// rejected.
pub fn parse_array<'a, O, F>(f: F) -> impl FnMut(&'a [u8]) -> DecodeResult<'a, Vec<O>>
where
    F: Parser<&'a [u8], O, DecodeError> + Copy,
{
    move |input: &'a [u8]| {
        let (input, length) = int32(input)?;
        let length = array_length(input, length)?;
        many_m_n(length, length, f)(input)
    }
}

/// Like [`parse_array`] but a count of `-1` is a null array.
pub fn parse_nullable_array<'a, O, F>(
    f: F,
) -> impl FnMut(&'a [u8]) -> DecodeResult<'a, Option<Vec<O>>>
where
    F: Parser<&'a [u8], O, DecodeError> + Copy,
{
    move |input: &'a [u8]| {
        let (rest, length) = int32(input)?;
        if length == -1 {
            return Ok((rest, None));
        }
        map(parse_array(f), Some)(input)
    }
}

pub fn read_i8(buffer: &mut ByteBuffer) -> Result<i8> {
    buffer.read_with(int8)
}

pub fn read_i16(buffer: &mut ByteBuffer) -> Result<i16> {
    buffer.read_with(int16)
}

pub fn read_i32(buffer: &mut ByteBuffer) -> Result<i32> {
    buffer.read_with(int32)
}

pub fn read_i64(buffer: &mut ByteBuffer) -> Result<i64> {
    buffer.read_with(int64)
}

pub fn read_nullable_string(buffer: &mut ByteBuffer) -> Result<Option<String>> {
    buffer.read_with(nullable_string)
}

/// Copy `count` unread bytes into `data[offset..offset + count]`.
pub fn read_bytes(
    buffer: &mut ByteBuffer,
    data: &mut [u8],
    offset: usize,
    count: usize,
) -> Result<()> {
    buffer.validate_read(count)?;
    let available = data.len();
    let dst = data
        .get_mut(offset..offset + count)
        .ok_or(Error::BufferOverflow {
            requested: offset + count,
            available,
        })?;
    dst.copy_from_slice(&buffer.readable()[..count]);
    buffer.complete_read(count);
    Ok(())
}
