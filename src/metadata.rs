//! Cluster metadata over a live connection.
use tracing::instrument;

use crate::{
    buffer::ByteBuffer,
    config::ClientConfig,
    error::{Error, Result},
    network::{exchange, tcp::TcpConnection, BrokerAddress, Transport},
    protocol::{
        metadata::response::{Broker, MetadataResponse},
        MetadataRequest,
    },
};

/// Ask the broker on the other end of `transport` for metadata on `topics`,
/// or on every topic when `topics` is empty.
///
/// `buffer` carries the request out and the response back, and must be big
/// enough for the whole response frame.
///
/// ### Example
/// ```rust,no_run
/// # async fn run() -> metamorphosis::prelude::Result<()> {
/// use metamorphosis::prelude::{fetch_metadata, BrokerAddress, ByteBuffer, TcpConnection};
///
/// let mut conn = TcpConnection::connect(&["localhost:9092".parse::<BrokerAddress>()?]).await?;
/// let mut buffer = ByteBuffer::new(64 * 1024);
/// let metadata = fetch_metadata(&mut conn, &mut buffer, 1, Some("rust"), 1, &["purchases"]).await?;
/// println!("{:?}", metadata.brokers);
/// # Ok(())
/// # }
/// ```
#[instrument(level = "debug", skip(transport, buffer))]
pub async fn fetch_metadata<T, S>(
    transport: &mut T,
    buffer: &mut ByteBuffer,
    correlation_id: i32,
    client_id: Option<&str>,
    api_version: i16,
    topics: &[S],
) -> Result<MetadataResponse>
where
    T: Transport + ?Sized,
    S: AsRef<str> + std::fmt::Debug,
{
    tracing::debug!("Fetching metadata");
    let request = MetadataRequest::new(api_version, correlation_id, client_id, topics);
    let metadata: MetadataResponse = exchange(transport, buffer, &request).await?;
    tracing::trace!("Got metadata {:?}", metadata);
    Ok(metadata)
}

/// Connect to the first reachable bootstrap broker from `config` and fetch
/// metadata for `topics`.
#[instrument(level = "debug", skip(config))]
pub async fn fetch_cluster_metadata(
    config: &ClientConfig,
    topics: &[String],
) -> Result<MetadataResponse> {
    tracing::info!(
        "Connecting to cluster at {}",
        config
            .bootstrap_addrs
            .iter()
            .map(BrokerAddress::to_string)
            .collect::<Vec<_>>()
            .join(",")
    );
    let mut conn = TcpConnection::connect(&config.bootstrap_addrs).await?;
    let mut buffer = ByteBuffer::new(config.buffer_capacity);
    fetch_metadata(
        &mut conn,
        &mut buffer,
        config.correlation_id,
        Some(config.client_id.as_str()),
        config.api_version,
        topics,
    )
    .await
}

impl Broker {
    /// The address a client would connect to for this broker.
    pub fn addr(&self) -> Result<BrokerAddress> {
        let host = match self.host.as_deref() {
            Some(host) => host,
            None => {
                tracing::error!("ERROR: broker {} has no host", self.node_id);
                return Err(Error::MissingBrokerConfigOptions);
            }
        };
        let port = u16::try_from(self.port).map_err(|err| {
            tracing::error!("ERROR: broker {} port {} {:?}", self.node_id, self.port, err);
            Error::MissingBrokerConfigOptions
        })?;
        Ok(BrokerAddress {
            host: host.to_owned(),
            port,
        })
    }
}
