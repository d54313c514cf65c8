//! Parsing and processing for Metadata responses.
//!
//! The response contains metadata for each partition, with
//! partitions grouped together by topic. This metadata
//! refers to brokers by their broker id. The brokers each
//! have a host and port.
//!
//! ### Example
//! ```rust,no_run
//! # use metamorphosis::prelude::{frame, protocol, ByteBuffer};
//! # let mut buffer = ByteBuffer::new(1024);
//! let metadata: protocol::MetadataResponse = frame::decode_response(&mut buffer, 100, 1)?;
//! # Ok::<(), metamorphosis::prelude::Error>(())
//! ```
//!
//! ### Protocol Def
//! ```text
//! Metadata Response (Version: 1) => [brokers] controller_id [topics]
//!   brokers => node_id host port rack
//!     node_id => INT32
//!     host => STRING
//!     port => INT32
//!     rack => NULLABLE_STRING
//!   controller_id => INT32
//!   topics => error_code name is_internal [partitions]
//!     error_code => INT16
//!     name => STRING
//!     is_internal => BOOLEAN
//!     partitions => error_code partition_index leader_id [replica_nodes] [isr_nodes]
//!       error_code => INT16
//!       partition_index => INT32
//!       leader_id => INT32
//!       replica_nodes => INT32
//!       isr_nodes => INT32
//! ```
//!
//! Version 0 is the same minus `rack`, `controller_id` and `is_internal`.

use crate::{
    buffer::ByteBuffer,
    encode::{encode_as_array, ToByte},
    error::{Error, KafkaCode, Result},
    parser::{self, DecodeResult},
    protocol::{self, Response},
};

/// No controller is reported before version 1.
pub const NO_CONTROLLER: i32 = -1;

/// The base Metadata response object.
#[derive(Debug, Default, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde_derive::Serialize))]
pub struct MetadataResponse {
    pub header_response: protocol::HeaderResponse,
    /// Each broker in the response.
    pub brokers: Vec<Broker>,
    /// The ID of the controller broker, [`NO_CONTROLLER`] on version 0.
    pub controller_id: i32,
    /// Each topic in the response.
    pub topics: Vec<Topic>,
}

impl MetadataResponse {
    pub fn is_error(&self) -> Result<()> {
        self.topics
            .iter()
            .map(|topic| topic.is_error())
            .collect::<Result<Vec<()>>>()?;

        Ok(())
    }

    pub fn broker(&self, node_id: i32) -> Option<&Broker> {
        self.brokers.iter().find(|b| b.node_id == node_id)
    }

    pub fn topic(&self, name: &str) -> Option<&Topic> {
        self.topics.iter().find(|t| t.name.as_deref() == Some(name))
    }

    /// The broker currently leading `partition_id` of `topic_name`.
    pub fn leader_for(&self, topic_name: &str, partition_id: i32) -> Option<&Broker> {
        let partition = self.topic(topic_name)?.partition(partition_id)?;
        let leader = self.broker(partition.leader_id)?;
        tracing::debug!(
            "Leader is {:?} for topic {} and partition {}",
            leader,
            topic_name,
            partition_id
        );
        Some(leader)
    }

    /// Write the response body the way a broker would, for `api_version`.
    pub fn encode_versioned(&self, api_version: i16, buffer: &mut ByteBuffer) -> Result<()> {
        if !(0..=Self::MAX_VERSION).contains(&api_version) {
            return Err(Error::UnsupportedVersion(api_version));
        }
        self.header_response.encode(buffer)?;
        encode_as_array(buffer, &self.brokers, |buffer, broker| {
            broker.encode_versioned(api_version, buffer)
        })?;
        if api_version >= 1 {
            self.controller_id.encode(buffer)?;
        }
        encode_as_array(buffer, &self.topics, |buffer, topic| {
            topic.encode_versioned(api_version, buffer)
        })
    }
}

impl Response for MetadataResponse {
    const MAX_VERSION: i16 = 1;

    fn parse(api_version: i16, input: &[u8]) -> DecodeResult<'_, Self> {
        parse_metadata_response(api_version, input)
    }

    fn correlation_id(&self) -> i32 {
        self.header_response.correlation_id
    }
}

pub fn parse_metadata_response<'a>(
    api_version: i16,
    s: &'a [u8],
) -> DecodeResult<'a, MetadataResponse> {
    let (s, header_response) = protocol::parse_header_response(s)?;
    let (s, brokers) = parser::parse_array(move |s: &'a [u8]| parse_broker(api_version, s))(s)?;
    let (s, controller_id) = if api_version >= 1 {
        parser::int32(s)?
    } else {
        (s, NO_CONTROLLER)
    };
    let (s, topics) = parser::parse_array(move |s: &'a [u8]| parse_topic(api_version, s))(s)?;

    Ok((
        s,
        MetadataResponse {
            header_response,
            brokers,
            controller_id,
            topics,
        },
    ))
}

/// Each broker in the response.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde_derive::Serialize))]
pub struct Broker {
    /// The broker ID.
    pub node_id: i32,
    /// The broker hostname.
    pub host: Option<String>,
    /// The broker port.
    pub port: i32,
    /// The rack of the broker, or null if it has not been assigned to a rack.
    pub rack: Option<String>,
}

impl Broker {
    fn encode_versioned(&self, api_version: i16, buffer: &mut ByteBuffer) -> Result<()> {
        self.node_id.encode(buffer)?;
        self.host.encode(buffer)?;
        self.port.encode(buffer)?;
        if api_version >= 1 {
            self.rack.encode(buffer)?;
        }
        Ok(())
    }
}

fn parse_broker(api_version: i16, s: &[u8]) -> DecodeResult<'_, Broker> {
    let (s, node_id) = parser::int32(s)?;
    let (s, host) = parser::nullable_string(s)?;
    let (s, port) = parser::int32(s)?;
    let (s, rack) = if api_version >= 1 {
        parser::nullable_string(s)?
    } else {
        (s, None)
    };

    Ok((
        s,
        Broker {
            node_id,
            host,
            port,
            rack,
        },
    ))
}

/// Each topic in the response.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde_derive::Serialize))]
pub struct Topic {
    /// The topic error, or 0 if there was no error.
    pub error_code: i16,
    /// The topic name.
    pub name: Option<String>,
    /// True if the topic is internal.
    pub is_internal: bool,
    /// Each partition in the topic.
    pub partitions: Vec<Partition>,
}

impl Topic {
    /// The topic error as a [`KafkaCode`]; codes this client does not know
    /// map to [`KafkaCode::Unknown`] while `error_code` keeps the raw value.
    pub fn kafka_code(&self) -> KafkaCode {
        KafkaCode::from_code(self.error_code)
    }

    pub fn is_error(&self) -> Result<()> {
        if self.error_code != KafkaCode::None as i16 {
            tracing::error!(
                "ERROR: Kafka Error {} ({:?}) in topic {:?}",
                self.error_code,
                self.kafka_code(),
                self.name
            );
            return Err(Error::KafkaError(self.kafka_code()));
        }

        self.partitions
            .iter()
            .map(|partition| partition.is_error(self.name.as_deref()))
            .collect::<Result<Vec<()>>>()?;

        Ok(())
    }

    pub fn partition(&self, partition_id: i32) -> Option<&Partition> {
        self.partitions
            .iter()
            .find(|p| p.partition_id == partition_id)
    }

    fn encode_versioned(&self, api_version: i16, buffer: &mut ByteBuffer) -> Result<()> {
        self.error_code.encode(buffer)?;
        self.name.encode(buffer)?;
        if api_version >= 1 {
            self.is_internal.encode(buffer)?;
        }
        self.partitions.encode(buffer)
    }
}

fn parse_topic(api_version: i16, s: &[u8]) -> DecodeResult<'_, Topic> {
    let (s, error_code) = parser::int16(s)?;
    let (s, name) = parser::nullable_string(s)?;
    let (s, is_internal) = if api_version >= 1 {
        parser::boolean(s)?
    } else {
        (s, false)
    };
    let (s, partitions) = parser::parse_array(parse_partition)(s)?;

    Ok((
        s,
        Topic {
            error_code,
            name,
            is_internal,
            partitions,
        },
    ))
}

/// Each partition in the topic.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde_derive::Serialize))]
pub struct Partition {
    /// The partition error, or 0 if there was no error.
    pub error_code: i16,
    /// The partition index.
    pub partition_id: i32,
    /// The ID of the leader broker.
    pub leader_id: i32,
    /// The set of all nodes that host this partition.
    pub replica_ids: Vec<i32>,
    /// The set of nodes that are in sync with the leader for this partition.
    pub isr_ids: Vec<i32>,
}

impl Partition {
    pub fn kafka_code(&self) -> KafkaCode {
        KafkaCode::from_code(self.error_code)
    }

    pub fn is_error(&self, topic_name: Option<&str>) -> Result<()> {
        if self.error_code != KafkaCode::None as i16 {
            tracing::error!(
                "ERROR: Kafka Error {} ({:?}) in topic {:?} partition {}",
                self.error_code,
                self.kafka_code(),
                topic_name,
                self.partition_id
            );
            Err(Error::KafkaError(self.kafka_code()))
        } else {
            Ok(())
        }
    }
}

impl ToByte for Partition {
    fn encode(&self, buffer: &mut ByteBuffer) -> Result<()> {
        self.error_code.encode(buffer)?;
        self.partition_id.encode(buffer)?;
        self.leader_id.encode(buffer)?;
        self.replica_ids.encode(buffer)?;
        self.isr_ids.encode(buffer)
    }
}

fn parse_partition(s: &[u8]) -> DecodeResult<'_, Partition> {
    let (s, error_code) = parser::int16(s)?;
    let (s, partition_id) = parser::int32(s)?;
    let (s, leader_id) = parser::int32(s)?;
    let (s, replica_ids) = parser::parse_array(parser::int32)(s)?;
    let (s, isr_ids) = parser::parse_array(parser::int32)(s)?;

    Ok((
        s,
        Partition {
            error_code,
            partition_id,
            leader_id,
            replica_ids,
            isr_ids,
        },
    ))
}
