//! Describes the currently available brokers, their host and port
//! information, and gives information about which broker hosts
//! which partitions.
//!
//! This API answers the following questions:
//! - What topics exist?
//! - How many partitions does each topic have?
//! - Which broker is currently the leader for each partition?
//! - What is the host and port for each of these brokers?
//!
//! This is the only request that can be addressed to any broker
//! in the cluster.
//!
//! Since there may be many topics the client can give an
//! optional list of topic names in order to only return metadata
//! for a subset of topics.
//!
//! The metadata returned is at the partition level, but grouped
//!  together by topic for convenience and to avoid redundancy.
//! For each partition the metadata contains the information for
//! the leader as well as for all the replicas and the list of
//! replicas that are currently in-sync.

pub mod request;
pub mod response;

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        buffer::ByteBuffer,
        encode::ToByte,
        error::{Error, KafkaCode},
        protocol::{self, Response},
    };

    fn encoded<T: ToByte>(value: &T) -> ByteBuffer {
        let mut buffer = ByteBuffer::new(1024);
        value.encode(&mut buffer).unwrap();
        buffer
    }

    #[test]
    fn encode() {
        let b = [
            0, 3, 0, 0, 0, 0, 0, 1, 0, 4, 114, 117, 115, 116, 0, 0, 0, 1, 0, 9, 112, 117, 114, 99,
            104, 97, 115, 101, 115,
        ];
        let topics = vec!["purchases"];

        let req = request::MetadataRequest::new(0, 1, Some("rust"), &topics);

        assert_eq!(encoded(&req).readable(), b);
    }

    #[test]
    fn encode_v1_without_topics_sends_null_array() {
        let req = request::MetadataRequest::new::<&str>(1, 100, None, &[]);
        assert_eq!(
            encoded(&req).readable(),
            [0, 3, 0, 1, 0, 0, 0, 100, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF]
        );
    }

    #[test]
    fn encode_v0_without_topics_sends_empty_array() {
        let req = request::MetadataRequest::new::<&str>(0, 100, None, &[]);
        assert_eq!(
            encoded(&req).readable(),
            [0, 3, 0, 0, 0, 0, 0, 100, 0xFF, 0xFF, 0, 0, 0, 0]
        );
    }

    #[test]
    fn api_key_is_always_metadata() {
        let mut req = request::MetadataRequest::new(1, 5, Some("rust"), &["a"]);
        req.header.api_key = 18;
        let buffer = encoded(&req);
        assert_eq!(&buffer.readable()[..2], [0, 3]);
    }

    #[test]
    fn request_round_trip() {
        for (api_version, topics) in [
            (0, vec![]),
            (1, vec![]),
            (1, vec!["purchases".to_owned(), "clicks".to_owned()]),
        ] {
            let req = request::MetadataRequest::new(api_version, 9, Some("rust"), &topics);
            let mut buffer = encoded(&req);
            let decoded = buffer.read_with(request::parse_metadata_request).unwrap();
            assert_eq!(decoded, req);
            assert_eq!(buffer.available_to_read(), 0);
        }
    }

    #[test]
    fn parse() {
        let buf = [
            0, 0, 0, 1, 0, 0, 0, 2, 0, 0, 0, 1, 0, 9, 108, 111, 99, 97, 108, 104, 111, 115, 116, 0,
            0, 35, 132, 0, 0, 0, 2, 0, 9, 108, 111, 99, 97, 108, 104, 111, 115, 116, 0, 0, 35, 133,
            0, 0, 0, 1, 0, 0, 0, 9, 112, 117, 114, 99, 104, 97, 115, 101, 115, 0, 0, 0, 4, 0, 0, 0,
            0, 0, 0, 0, 0, 0, 2, 0, 0, 0, 1, 0, 0, 0, 2, 0, 0, 0, 1, 0, 0, 0, 2, 0, 0, 0, 0, 0, 1,
            0, 0, 0, 1, 0, 0, 0, 1, 0, 0, 0, 1, 0, 0, 0, 1, 0, 0, 0, 1, 0, 0, 0, 0, 0, 2, 0, 0, 0,
            2, 0, 0, 0, 1, 0, 0, 0, 2, 0, 0, 0, 1, 0, 0, 0, 2, 0, 0, 0, 0, 0, 3, 0, 0, 0, 1, 0, 0,
            0, 1, 0, 0, 0, 1, 0, 0, 0, 1, 0, 0, 0, 1,
        ];

        let (rest, parsed) = response::parse_metadata_response(0, buf.as_slice()).unwrap();
        assert!(rest.is_empty());
        assert_eq!(parsed, test_metadata());
    }

    #[test]
    fn parse_v1_single_broker() {
        let buf = [
            0, 0, 0, 100, // correlation id
            0, 0, 0, 1, // broker count
            0, 0, 0, 0, // node id
            0, 9, b'l', b'o', b'c', b'a', b'l', b'h', b'o', b's', b't', // host
            0, 0, 0x23, 0x84, // port
            0xFF, 0xFF, // rack
            0, 0, 0, 0, // controller id
            0, 0, 0, 0, // topic count
        ];
        let mut buffer = ByteBuffer::new(64);
        buffer.put_slice(&buf).unwrap();

        let parsed = response::MetadataResponse::decode(&mut buffer, 1).unwrap();
        assert_eq!(parsed.correlation_id(), 100);
        assert_eq!(
            parsed.brokers,
            vec![response::Broker {
                node_id: 0,
                host: Some("localhost".to_owned()),
                port: 9092,
                rack: None,
            }]
        );
        assert_eq!(parsed.controller_id, 0);
        assert!(parsed.topics.is_empty());
        assert_eq!(buffer.available_to_read(), 0);
    }

    #[test]
    fn v1_round_trip() {
        let mut metadata = test_metadata();
        metadata.controller_id = 2;
        metadata.brokers[1].rack = Some("us-east-1a".to_owned());
        metadata.topics[0].is_internal = true;
        metadata.topics[0].partitions[3].isr_ids = vec![];

        let mut buffer = ByteBuffer::new(1024);
        metadata.encode_versioned(1, &mut buffer).unwrap();
        let decoded = response::MetadataResponse::decode(&mut buffer, 1).unwrap();
        assert_eq!(decoded, metadata);
    }

    #[test]
    fn truncated_response_leaves_cursor() {
        let mut buffer = ByteBuffer::new(1024);
        test_metadata().encode_versioned(0, &mut buffer).unwrap();
        let full = buffer.readable().to_vec();

        let mut buffer = ByteBuffer::new(1024);
        buffer.put_slice(&full[..full.len() - 2]).unwrap();
        assert!(matches!(
            response::MetadataResponse::decode(&mut buffer, 0),
            Err(Error::BufferUnderrun { .. })
        ));
        assert_eq!(buffer.read_offset(), 0);
    }

    #[test]
    fn negative_replica_count_is_malformed() {
        let buf = [
            0, 0, 0, 1, // correlation id
            0, 0, 0, 0, // broker count
            0, 0, 0, 0, // controller id
            0, 0, 0, 1, // topic count
            0, 0, 0, 1, b't', 0, // error, name, is_internal
            0, 0, 0, 1, // partition count
            0, 0, 0, 0, 0, 0, 0, 0, 0, 1, // error, id, leader
            0xFF, 0xFF, 0xFF, 0xFF, // replica count
        ];
        let mut buffer = ByteBuffer::new(64);
        buffer.put_slice(&buf).unwrap();
        assert!(matches!(
            response::MetadataResponse::decode(&mut buffer, 1),
            Err(Error::MalformedField(_))
        ));
    }

    #[test]
    fn unsupported_versions() {
        let mut buffer = ByteBuffer::new(64);
        assert_eq!(
            response::MetadataResponse::decode(&mut buffer, 2),
            Err(Error::UnsupportedVersion(2))
        );
        assert_eq!(
            test_metadata().encode_versioned(-1, &mut buffer),
            Err(Error::UnsupportedVersion(-1))
        );
    }

    #[test]
    fn lookups() {
        let metadata = test_metadata();
        assert_eq!(metadata.broker(2).map(|b| b.port), Some(9093));
        assert!(metadata.broker(3).is_none());
        assert_eq!(metadata.leader_for("purchases", 1).map(|b| b.node_id), Some(1));
        assert_eq!(metadata.leader_for("purchases", 2).map(|b| b.node_id), Some(2));
        assert!(metadata.leader_for("purchases", 9).is_none());
        assert!(metadata.leader_for("missing", 0).is_none());
    }

    #[test]
    fn errors_surface() {
        let mut metadata = test_metadata();
        assert!(metadata.is_error().is_ok());

        metadata.topics[0].partitions[2].error_code = KafkaCode::LeaderNotAvailable as i16;
        assert_eq!(
            metadata.is_error(),
            Err(Error::KafkaError(KafkaCode::LeaderNotAvailable))
        );

        metadata.topics[0].error_code = KafkaCode::UnknownTopicOrPartition as i16;
        assert_eq!(
            metadata.is_error(),
            Err(Error::KafkaError(KafkaCode::UnknownTopicOrPartition))
        );
    }

    #[test]
    fn unlisted_error_codes_survive_round_trip() {
        let buf = [
            0, 0, 0, 1, // correlation id
            0, 0, 0, 0, // broker count
            0, 0, 0, 0, // controller id
            0, 0, 0, 1, // topic count
            0, 14, 0, 1, b't', 0, // error, name, is_internal
            0, 0, 0, 1, // partition count
            0, 14, 0, 0, 0, 0, 0, 0, 0, 1, // error, id, leader
            0, 0, 0, 1, 0, 0, 0, 1, // replicas
            0, 0, 0, 0, // isr
        ];
        let mut buffer = ByteBuffer::new(64);
        buffer.put_slice(&buf).unwrap();

        let parsed = response::MetadataResponse::decode(&mut buffer, 1).unwrap();
        assert_eq!(parsed.topics[0].error_code, 14);
        assert_eq!(parsed.topics[0].kafka_code(), KafkaCode::Unknown);
        assert_eq!(parsed.topics[0].partitions[0].error_code, 14);
        assert_eq!(
            parsed.is_error(),
            Err(Error::KafkaError(KafkaCode::Unknown))
        );

        let mut buffer = ByteBuffer::new(64);
        parsed.encode_versioned(1, &mut buffer).unwrap();
        assert_eq!(buffer.readable(), buf);
    }

    fn partition(partition_id: i32, node: i32) -> response::Partition {
        response::Partition {
            error_code: 0,
            partition_id,
            leader_id: node,
            replica_ids: vec![node],
            isr_ids: vec![node],
        }
    }

    fn test_metadata() -> response::MetadataResponse {
        response::MetadataResponse {
            header_response: protocol::HeaderResponse { correlation_id: 1 },
            brokers: vec![
                response::Broker {
                    node_id: 1,
                    host: Some("localhost".to_owned()),
                    port: 9092,
                    rack: None,
                },
                response::Broker {
                    node_id: 2,
                    host: Some("localhost".to_owned()),
                    port: 9093,
                    rack: None,
                },
            ],
            controller_id: response::NO_CONTROLLER,
            topics: vec![response::Topic {
                error_code: 0,
                name: Some("purchases".to_owned()),
                is_internal: false,
                partitions: vec![
                    partition(0, 2),
                    partition(1, 1),
                    partition(2, 2),
                    partition(3, 1),
                ],
            }],
        }
    }
}
