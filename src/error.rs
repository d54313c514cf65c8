//! Errors raised while encoding, decoding and moving frames.
use std::fmt;
use std::io::ErrorKind;

use num_derive::FromPrimitive;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A read asked for more bytes than have been written.
    BufferUnderrun { requested: usize, available: usize },
    /// A write asked for more room than the buffer has left.
    BufferOverflow { requested: usize, available: usize },
    /// A length or count on the wire that can not be valid.
    MalformedField(String),
    DecodingUtf,
    /// The broker answered a different request than the one we sent.
    CorrelationMismatch { expected: i32, actual: i32 },
    UnsupportedVersion(i16),
    KafkaError(KafkaCode),
    IoError(ErrorKind),
    ConnectionClosed,
    MissingBrokerConfigOptions,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BufferUnderrun {
                requested,
                available,
            } => write!(
                f,
                "buffer underrun: requested {requested} bytes, {available} available"
            ),
            Error::BufferOverflow {
                requested,
                available,
            } => write!(
                f,
                "buffer overflow: requested {requested} bytes, {available} available"
            ),
            Error::MalformedField(reason) => write!(f, "malformed field: {reason}"),
            Error::DecodingUtf => write!(f, "string is not valid utf-8"),
            Error::CorrelationMismatch { expected, actual } => write!(
                f,
                "correlation id mismatch: expected {expected}, got {actual}"
            ),
            Error::UnsupportedVersion(version) => {
                write!(f, "api version {version} is not supported")
            }
            Error::KafkaError(code) => write!(f, "broker returned {code:?}"),
            Error::IoError(kind) => write!(f, "io error: {kind:?}"),
            Error::ConnectionClosed => write!(f, "connection closed by peer"),
            Error::MissingBrokerConfigOptions => write!(f, "missing or invalid broker options"),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::IoError(err.kind())
    }
}

/// Error codes a broker places in `error_code` fields.
///
/// Only the codes a Metadata exchange can produce are spelled out,
/// everything else decodes to [`KafkaCode::Unknown`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, FromPrimitive)]
#[cfg_attr(feature = "serialize", derive(serde_derive::Serialize))]
pub enum KafkaCode {
    Unknown = -1,
    None = 0,
    OffsetOutOfRange = 1,
    CorruptMessage = 2,
    UnknownTopicOrPartition = 3,
    InvalidFetchSize = 4,
    LeaderNotAvailable = 5,
    NotLeaderForPartition = 6,
    RequestTimedOut = 7,
    BrokerNotAvailable = 8,
    ReplicaNotAvailable = 9,
    MessageSizeTooLarge = 10,
    StaleControllerEpoch = 11,
    OffsetMetadataTooLarge = 12,
    NetworkException = 13,
    InvalidTopic = 17,
    RecordListTooLarge = 18,
    NotEnoughReplicas = 19,
    NotEnoughReplicasAfterAppend = 20,
    InvalidRequiredAcks = 21,
    TopicAuthorizationFailed = 29,
    ClusterAuthorizationFailed = 31,
    UnsupportedVersion = 35,
    InvalidRequest = 42,
}

impl KafkaCode {
    pub fn from_code(code: i16) -> KafkaCode {
        num_traits::FromPrimitive::from_i16(code).unwrap_or(KafkaCode::Unknown)
    }
}
