use std::io::{self, ErrorKind};

use async_trait::async_trait;
use tokio::net::TcpStream;
use tracing::instrument;

use crate::error::{Error, Result};

use super::{resolve, BrokerAddress, Transport};

/// TCP connection to a Kafka broker.
///
/// Each call to [`send`](Transport::send) or [`receive`](Transport::receive)
/// moves as many bytes as the socket takes or hands over in one go; the
/// framing driver in [`exchange`](super::exchange) loops until a whole
/// frame has gone out or come back.
#[derive(Debug)]
pub struct TcpConnection {
    stream: TcpStream,
}

impl TcpConnection {
    /// Connect to the first reachable broker in `bootstrap_addrs`.
    ///
    /// ### Example
    /// ```rust,no_run
    /// # async fn run() -> metamorphosis::prelude::Result<()> {
    /// use metamorphosis::prelude::{BrokerAddress, TcpConnection};
    ///
    /// let bootstrap_addrs = vec!["localhost:9092".parse::<BrokerAddress>()?];
    /// let conn = TcpConnection::connect(&bootstrap_addrs).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn connect(bootstrap_addrs: &[BrokerAddress]) -> Result<Self> {
        let mut propagated_err: Option<Error> = None;
        for bootstrap_addr in bootstrap_addrs {
            tracing::debug!("Connecting to {}", bootstrap_addr);
            let addrs = match resolve(bootstrap_addr).await {
                Ok(addrs) => addrs,
                Err(e) => {
                    propagated_err = Some(e);
                    continue;
                }
            };
            for addr in addrs {
                match TcpStream::connect(addr).await {
                    Ok(stream) => {
                        tracing::debug!("Connected to {} at {}", bootstrap_addr, addr);
                        return Ok(Self { stream });
                    }
                    Err(e) => {
                        tracing::warn!("Could not connect to {} {:?}", addr, e);
                        propagated_err = Some(Error::IoError(e.kind()));
                    }
                }
            }
        }
        Err(propagated_err.unwrap_or(Error::MissingBrokerConfigOptions))
    }

    pub fn peer_addr(&self) -> Result<std::net::SocketAddr> {
        self.stream.peer_addr().map_err(Error::from)
    }
}

#[async_trait]
impl Transport for TcpConnection {
    #[instrument(name = "network-write", level = "trace", skip(self, bytes))]
    async fn send(&mut self, bytes: &[u8]) -> Result<usize> {
        loop {
            // Wait for the socket to be writable
            self.stream
                .writable()
                .await
                .map_err(|e| Error::IoError(e.kind()))?;

            // Try to write data, this may still fail with `WouldBlock`
            // if the readiness event is a false positive.
            match self.stream.try_write(bytes) {
                Ok(n) => {
                    tracing::trace!("Wrote {} of {} bytes", n, bytes.len());
                    return Ok(n);
                }
                Err(ref e) if e.kind() == ErrorKind::WouldBlock => {
                    tracing::trace!("WouldBlock on write");
                    continue;
                }
                Err(e) => {
                    tracing::error!("ERROR: Writing to Socket {:?}", e);
                    return Err(Error::IoError(e.kind()));
                }
            }
        }
    }

    #[instrument(name = "network-read", level = "trace", skip(self, buf))]
    async fn receive(&mut self, buf: &mut [u8]) -> Result<usize> {
        loop {
            // Wait for the socket to be readable
            self.stream
                .readable()
                .await
                .map_err(|e| Error::IoError(e.kind()))?;

            match self.stream.try_read(buf) {
                Ok(n) => {
                    tracing::trace!("Read {} bytes", n);
                    return Ok(n);
                }
                Err(ref e) if e.kind() == io::ErrorKind::WouldBlock => {
                    tracing::trace!("WouldBlock on read");
                    continue;
                }
                Err(e) => {
                    tracing::error!("ERROR: Reading on Socket {:?}", e);
                    return Err(Error::IoError(e.kind()));
                }
            }
        }
    }
}
