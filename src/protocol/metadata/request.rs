//! Encoding and creation for Metadata requests.
//!
//! ### Example
//! ```rust
//! use metamorphosis::prelude::{frame, protocol, ByteBuffer};
//!
//! let topics = vec!["purchases"];
//! let request = protocol::MetadataRequest::new(1, 100, Some("rust"), &topics);
//! let mut buffer = ByteBuffer::new(1024);
//! frame::encode_frame(&mut buffer, &request)?;
//! # Ok::<(), metamorphosis::prelude::Error>(())
//! ```
//!
//! ### Protocol Def
//! ```text
//! Metadata Request (Version: 0-1) => [topics]
//!   topics => name
//!   name => STRING
//! ```
//!
//! In version 0 an empty topic list asks for every topic. Version 1 asks
//! for every topic with a null array instead, and an empty array there
//! means no topics at all; this request always sends the null array for
//! an empty list on version 1.

use crate::{
    buffer::ByteBuffer,
    encode::ToByte,
    error::Result,
    parser::{self, DecodeResult},
    protocol::{self, HeaderRequest, Request},
};

pub const API_KEY_METADATA: i16 = 3;

/// The version that swaps the empty topic array for a null one.
const NULL_TOPICS_VERSION: i16 = 1;

/// The base Metadata request object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataRequest {
    pub header: HeaderRequest,
    /// The topics to fetch metadata for.
    pub topics: Vec<String>,
}

impl MetadataRequest {
    pub fn new<T: AsRef<str>>(
        api_version: i16,
        correlation_id: i32,
        client_id: Option<&str>,
        topics: &[T],
    ) -> MetadataRequest {
        MetadataRequest {
            header: HeaderRequest::new(API_KEY_METADATA, api_version, correlation_id, client_id),
            topics: topics.iter().map(|t| t.as_ref().to_owned()).collect(),
        }
    }
}

impl ToByte for MetadataRequest {
    fn encode(&self, buffer: &mut ByteBuffer) -> Result<()> {
        self.header.encode_with_key(API_KEY_METADATA, buffer)?;

        if self.topics.is_empty() && self.header.api_version == NULL_TOPICS_VERSION {
            (-1i32).encode(buffer)?;
        } else {
            self.topics.encode(buffer)?;
        }
        Ok(())
    }
}

impl Request for MetadataRequest {
    const API_KEY: i16 = API_KEY_METADATA;

    fn header(&self) -> &HeaderRequest {
        &self.header
    }
}

/// Parse a request back out of its payload; a null topic array becomes an
/// empty list.
pub fn parse_metadata_request(s: &[u8]) -> DecodeResult<'_, MetadataRequest> {
    let (s, header) = protocol::parse_header_request(s)?;
    let (s, topics) = parser::parse_nullable_array(parser::nullable_string)(s)?;
    let topics = topics
        .unwrap_or_default()
        .into_iter()
        .map(Option::unwrap_or_default)
        .collect();

    Ok((s, MetadataRequest { header, topics }))
}
