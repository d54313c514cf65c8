//! # Metamorphosis
//! Rust-native codec for the Kafka wire protocol.
//!
//! This crate turns typed requests into the length prefixed, big-endian
//! frames a Kafka broker understands, and turns the broker's nested,
//! variable length responses back into plain Rust structures. Everything
//! happens over a single reusable [`ByteBuffer`](prelude::ByteBuffer) with
//! explicit read and write cursors, so a frame is either decoded whole or
//! the cursor stays where it was.
//!
//! ## Goals
//! - Easy to understand code
//! - Leverage best in class libraries such as Tokio, Nom to do the heavy lifting
//! - Every bounds violation is an error, never a panic
//! - Keep the codec independent of how bytes reach the broker
//!
//! ## Table of contents
//! - [Getting started](#getting-started)
//!     - [Encoding a request](#encoding-a-request)
//!     - [Decoding a response](#decoding-a-response)
//!     - [Talking to a broker](#talking-to-a-broker)
//! - [Resources](#resources)
//!
//! ## Getting started
//! Include the following snippet in your `Cargo.toml` dependencies:
//! ```toml
//! metamorphosis = "0.1"
//! ```
//!
//! ### Encoding a request
//! A request is framed into a buffer with [`encode_frame`](prelude::frame::encode_frame).
//! The length prefix is written last, once the payload size is known.
//! ```rust
//! use metamorphosis::prelude::{frame, protocol, ByteBuffer};
//!
//! let mut buffer = ByteBuffer::new(1024);
//! let request = protocol::MetadataRequest::new::<&str>(1, 100, None, &[]);
//! frame::encode_frame(&mut buffer, &request)?;
//!
//! assert_eq!(
//!     buffer.readable(),
//!     &[0, 0, 0, 14, 0, 3, 0, 1, 0, 0, 0, 100, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF]
//! );
//! # Ok::<(), metamorphosis::prelude::Error>(())
//! ```
//!
//! ### Decoding a response
//! Once a whole frame sits in the buffer,
//! [`decode_response`](prelude::frame::decode_response) parses it and checks
//! the correlation id against the request.
//! ```rust,no_run
//! use metamorphosis::prelude::{frame, protocol, ByteBuffer};
//!
//! let mut buffer = ByteBuffer::new(64 * 1024);
//! // ... receive bytes into the buffer ...
//! let metadata: protocol::MetadataResponse = frame::decode_response(&mut buffer, 100, 1)?;
//! for broker in &metadata.brokers {
//!     println!("{:?}", broker);
//! }
//! # Ok::<(), metamorphosis::prelude::Error>(())
//! ```
//!
//! ### Talking to a broker
//! Anything that moves bytes implements [`Transport`](prelude::Transport).
//! [`TcpConnection`](prelude::TcpConnection) is the one for real brokers.
//! ```rust,no_run
//! # async fn run() -> metamorphosis::prelude::Result<()> {
//! use metamorphosis::prelude::{fetch_cluster_metadata, ClientConfig};
//!
//! let config = ClientConfig::new(vec!["127.0.0.1:9092".parse()?]);
//! let metadata = fetch_cluster_metadata(&config, &["purchases".to_string()]).await?;
//! println!("{:?}", metadata.leader_for("purchases", 0));
//! # Ok(())
//! # }
//! ```
//!
//! ## Resources
//! - [Kafka Protocol Spec](https://kafka.apache.org/protocol.html)
//! - [Confluence Docs](https://cwiki.apache.org/confluence/display/KAFKA/A+Guide+To+The+Kafka+Protocol)

mod buffer;
mod config;
mod encode;
mod error;
mod frame;
mod metadata;
mod network;
mod parser;
mod protocol;

pub mod prelude {
    //! Main export of various structures and methods
    //!
    //! The crate is layered bottom up:
    //! - [`ByteBuffer`] holds bytes and the two cursors
    //! - [`encode`] and [`parser`] move primitives in and out of it
    //! - [`protocol`] builds the Metadata messages from those primitives
    //! - [`frame`] wraps a message in its length prefix
    //! - [`exchange`] drives one round trip over a [`Transport`]
    //!
    //! [`fetch_metadata`] and [`fetch_cluster_metadata`] put all of it
    //! together.
    pub use crate::buffer::ByteBuffer;
    pub use crate::config::{
        ClientConfig, DEFAULT_API_VERSION, DEFAULT_BUFFER_CAPACITY, DEFAULT_CLIENT_ID,
        DEFAULT_CORRELATION_ID,
    };
    pub use crate::error::{Error, KafkaCode, Result};
    pub use crate::metadata::{fetch_cluster_metadata, fetch_metadata};
    pub use crate::network::{
        exchange, receive_frame, resolve, send_all, tcp::TcpConnection, BrokerAddress, Transport,
    };

    pub use bytes;

    pub mod encode {
        pub use crate::encode::*;
    }

    pub mod parser {
        pub use crate::parser::*;
    }

    pub mod frame {
        pub use crate::frame::*;
    }

    pub mod protocol {
        pub use crate::protocol::*;
    }
}
