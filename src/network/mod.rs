//! Connection & communication with a broker.
//!
//! # Network Module
//!
//! Kafka uses a binary protocol over TCP. The protocol defines all APIs as
//! request response message pairs. All messages are size delimited and are
//! made up of the primitive types in [`encode`](crate::encode) and
//! [`parser`](crate::parser).
//!
//! The client initiates a socket connection and then writes a sequence of
//! request messages and reads back the corresponding response message. No
//! handshake is required on connection or disconnection.
//!
//! The server guarantees that on a single TCP connection, requests will
//! be processed in the order they are sent and responses will return in
//! that order as well. [`exchange`] relies on that: it sends one frame and
//! then reads exactly one frame back into the same buffer.
//!
//! The codec never opens or closes connections itself. Anything that can
//! move bytes implements [`Transport`]; [`TcpConnection`](tcp::TcpConnection)
//! is the implementation for a real broker.
use std::{fmt, io::ErrorKind, net::SocketAddr, str::FromStr};

use async_trait::async_trait;
use tracing::instrument;

use crate::{
    buffer::ByteBuffer,
    error::{Error, Result},
    frame,
    protocol::{Request, Response},
};

pub mod tcp;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BrokerAddress {
    pub host: String,
    pub port: u16,
}

impl fmt::Display for BrokerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

impl FromStr for BrokerAddress {
    type Err = Error;

    /// Parse `host:port`.
    fn from_str(s: &str) -> Result<Self> {
        let (host, port) = s.trim().rsplit_once(':').ok_or_else(|| {
            tracing::error!("ERROR: broker address {} is not host:port", s);
            Error::MissingBrokerConfigOptions
        })?;
        if host.is_empty() {
            return Err(Error::MissingBrokerConfigOptions);
        }
        let port = port.parse::<u16>().map_err(|err| {
            tracing::error!("ERROR: broker port {} is not valid {:?}", port, err);
            Error::MissingBrokerConfigOptions
        })?;
        Ok(BrokerAddress {
            host: host.to_owned(),
            port,
        })
    }
}

/// Something bytes can be written to and read from.
#[async_trait]
pub trait Transport: Send {
    /// Write some prefix of `bytes` and report how much went out.
    async fn send(&mut self, bytes: &[u8]) -> Result<usize>;

    /// Read at most `buf.len()` bytes into `buf`. Zero means the peer
    /// has closed the connection.
    async fn receive(&mut self, buf: &mut [u8]) -> Result<usize>;
}

/// Resolve a broker host to the addresses it can be reached on.
#[instrument(level = "debug")]
pub async fn resolve(address: &BrokerAddress) -> Result<Vec<SocketAddr>> {
    let addrs: Vec<SocketAddr> = tokio::net::lookup_host((address.host.as_str(), address.port))
        .await
        .map_err(|err| {
            tracing::error!("Error could not resolve {} {:?}", address, err);
            Error::IoError(err.kind())
        })?
        .collect();
    tracing::debug!("Resolved {} to {:?}", address, addrs);
    Ok(addrs)
}

/// Drain everything readable in `buffer` into the transport.
pub async fn send_all<T: Transport + ?Sized>(
    transport: &mut T,
    buffer: &mut ByteBuffer,
) -> Result<usize> {
    let mut sent = 0;
    while buffer.available_to_read() > 0 {
        let offered = buffer.available_to_read();
        let n = checked_count(transport.send(buffer.readable()).await?, offered)?;
        if n == 0 {
            return Err(Error::ConnectionClosed);
        }
        buffer.complete_read(n);
        sent += n;
        tracing::trace!("Sent {} bytes, {} left", n, buffer.available_to_read());
    }
    Ok(sent)
}

/// A transport may not report more bytes than it was handed.
fn checked_count(n: usize, offered: usize) -> Result<usize> {
    if n > offered {
        tracing::error!("ERROR: transport reported {} bytes of {} offered", n, offered);
        return Err(Error::IoError(ErrorKind::InvalidData));
    }
    Ok(n)
}

/// Receive until one whole frame sits at the read cursor of `buffer`, and
/// return its size including the length prefix.
///
/// Fails with `BufferOverflow` as soon as the length prefix shows the
/// frame can not fit.
pub async fn receive_frame<T: Transport + ?Sized>(
    transport: &mut T,
    buffer: &mut ByteBuffer,
) -> Result<usize> {
    loop {
        if let Some(size) = frame::peek_frame_size(buffer)? {
            let room = buffer.capacity() - buffer.read_offset();
            if size > room {
                tracing::error!("ERROR: frame of {} bytes can not fit in {}", size, room);
                return Err(Error::BufferOverflow {
                    requested: size,
                    available: room,
                });
            }
            if buffer.available_to_read() >= size {
                tracing::trace!("Received frame of {} bytes", size);
                return Ok(size);
            }
        }
        buffer.validate_write(1)?;

        let offered = buffer.available_to_write();
        let n = checked_count(transport.receive(buffer.unfilled_mut()).await?, offered)?;
        if n == 0 {
            return Err(Error::ConnectionClosed);
        }
        buffer.append_write(n);
        tracing::trace!("Read {} bytes", n);
    }
}

/// One request/response round trip over `transport`, reusing `buffer` for
/// both directions.
///
/// The buffer is reset first; on return its read cursor sits after the
/// response frame.
#[instrument(level = "debug", skip(transport, buffer, request))]
pub async fn exchange<T, R, S>(transport: &mut T, buffer: &mut ByteBuffer, request: &R) -> Result<S>
where
    T: Transport + ?Sized,
    R: Request + Sync,
    S: Response,
{
    let header = request.header();
    if !(0..=S::MAX_VERSION).contains(&header.api_version) {
        return Err(Error::UnsupportedVersion(header.api_version));
    }

    buffer.reset_read_write();
    frame::encode_frame(buffer, request)?;
    send_all(transport, buffer).await?;

    buffer.reset_read_write();
    receive_frame(transport, buffer).await?;
    frame::decode_response(buffer, header.correlation_id, header.api_version)
}
