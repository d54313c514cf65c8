//! Bytecode protocol requests & responses.
//!
//! This module aims to implement the bytecode protocol outlined in the
//! [Kafka Documentation](https://kafka.apache.org/protocol.html)
//!
//! Each message lives in its own module with a request and a response
//! file. Requests implement [`Request`] and know how to write themselves
//! into a [`ByteBuffer`](crate::buffer::ByteBuffer); responses implement
//! [`Response`] and are parsed back out of one.
//!
//! Only Metadata is implemented, the traits are where further message
//! pairs plug in.

pub mod metadata;

use nom::combinator::map;

// re exporting these for ease
pub use self::metadata::{
    request::MetadataRequest,
    response::{Broker, MetadataResponse, Partition, Topic},
};
use crate::{
    buffer::ByteBuffer,
    encode::ToByte,
    error::{Error, Result},
    parser::{self, DecodeResult},
};

/// Anything that can be framed and sent to a broker.
pub trait Request: ToByte {
    const API_KEY: i16;

    fn header(&self) -> &HeaderRequest;
}

/// Anything that can be parsed out of a response frame.
pub trait Response: Sized {
    /// Newest version this client can parse.
    const MAX_VERSION: i16;

    /// Parse the payload that follows the frame length.
    fn parse(api_version: i16, input: &[u8]) -> DecodeResult<'_, Self>;

    fn correlation_id(&self) -> i32;

    /// Parse from the read cursor of `buffer`, which only moves on success.
    fn decode(buffer: &mut ByteBuffer, api_version: i16) -> Result<Self> {
        if !(0..=Self::MAX_VERSION).contains(&api_version) {
            return Err(Error::UnsupportedVersion(api_version));
        }
        buffer.read_with(|input| Self::parse(api_version, input))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderRequest {
    /// The API key of this request.
    pub api_key: i16,
    /// The API version of this request.
    pub api_version: i16,
    /// The correlation ID of this request.
    pub correlation_id: i32,
    /// The client ID string.
    pub client_id: Option<String>,
}

impl HeaderRequest {
    /// Create new header request.
    ///
    /// This goes at the beginning of every single request.
    pub fn new(
        api_key: i16,
        api_version: i16,
        correlation_id: i32,
        client_id: Option<&str>,
    ) -> HeaderRequest {
        HeaderRequest {
            api_key,
            api_version,
            correlation_id,
            client_id: client_id.map(str::to_owned),
        }
    }

    /// Write the header with `api_key` in place of the stored one.
    pub fn encode_with_key(&self, api_key: i16, buffer: &mut ByteBuffer) -> Result<()> {
        api_key.encode(buffer)?;
        self.api_version.encode(buffer)?;
        self.correlation_id.encode(buffer)?;
        self.client_id.encode(buffer)?;
        Ok(())
    }
}

impl ToByte for HeaderRequest {
    fn encode(&self, buffer: &mut ByteBuffer) -> Result<()> {
        self.encode_with_key(self.api_key, buffer)
    }
}

pub fn parse_header_request(s: &[u8]) -> DecodeResult<'_, HeaderRequest> {
    let (s, api_key) = parser::int16(s)?;
    let (s, api_version) = parser::int16(s)?;
    let (s, correlation_id) = parser::int32(s)?;
    let (s, client_id) = parser::nullable_string(s)?;
    Ok((
        s,
        HeaderRequest {
            api_key,
            api_version,
            correlation_id,
            client_id,
        },
    ))
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde_derive::Serialize))]
pub struct HeaderResponse {
    /// The correlation ID of this response.
    pub correlation_id: i32,
}

impl ToByte for HeaderResponse {
    fn encode(&self, buffer: &mut ByteBuffer) -> Result<()> {
        self.correlation_id.encode(buffer)
    }
}

pub fn parse_header_response(s: &[u8]) -> DecodeResult<'_, HeaderResponse> {
    map(parser::int32, |correlation_id| HeaderResponse { correlation_id })(s)
}
