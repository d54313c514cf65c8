//! Settings shared by every exchange a client makes.
//!
//! ### Example
//! ```rust
//! use metamorphosis::prelude::ClientConfig;
//!
//! let mut config = ClientConfig::new(vec!["localhost:9092".parse()?]);
//! config.client_id("inventory").api_version(0).buffer_capacity(4096);
//! assert_eq!(config.client_id, "inventory");
//! # Ok::<(), metamorphosis::prelude::Error>(())
//! ```
use std::env;

use crate::{
    error::{Error, Result},
    network::BrokerAddress,
};

pub const DEFAULT_CLIENT_ID: &str = "metamorphosis";
pub const DEFAULT_API_VERSION: i16 = 1;
pub const DEFAULT_BUFFER_CAPACITY: usize = 64 * 1024;
pub const DEFAULT_CORRELATION_ID: i32 = 1;

const KAFKA_BROKERS: &str = "KAFKA_BROKERS";
const KAFKA_CLIENT_ID: &str = "KAFKA_CLIENT_ID";
const KAFKA_API_VERSION: &str = "KAFKA_API_VERSION";
const KAFKA_BUFFER_CAPACITY: &str = "KAFKA_BUFFER_CAPACITY";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    /// Brokers tried in order until one accepts a connection.
    pub bootstrap_addrs: Vec<BrokerAddress>,
    pub client_id: String,
    pub api_version: i16,
    /// Size of the buffer used for both directions of an exchange. It
    /// bounds the largest response that can be received.
    pub buffer_capacity: usize,
    pub correlation_id: i32,
}

impl ClientConfig {
    pub fn new(bootstrap_addrs: Vec<BrokerAddress>) -> Self {
        Self {
            bootstrap_addrs,
            client_id: DEFAULT_CLIENT_ID.to_owned(),
            api_version: DEFAULT_API_VERSION,
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            correlation_id: DEFAULT_CORRELATION_ID,
        }
    }

    /// Read the configuration from `KAFKA_BROKERS` (comma separated
    /// `host:port`), `KAFKA_CLIENT_ID`, `KAFKA_API_VERSION` and
    /// `KAFKA_BUFFER_CAPACITY`. Only the brokers are required.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with a custom variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let brokers = lookup(KAFKA_BROKERS).ok_or_else(|| {
            tracing::error!("ERROR: {} is not set", KAFKA_BROKERS);
            Error::MissingBrokerConfigOptions
        })?;
        let bootstrap_addrs = parse_brokers(&brokers)?;

        let mut config = Self::new(bootstrap_addrs);
        if let Some(client_id) = lookup(KAFKA_CLIENT_ID) {
            config.client_id(client_id);
        }
        if let Some(api_version) = lookup(KAFKA_API_VERSION) {
            config.api_version(parse_var(KAFKA_API_VERSION, &api_version)?);
        }
        if let Some(capacity) = lookup(KAFKA_BUFFER_CAPACITY) {
            config.buffer_capacity(parse_var(KAFKA_BUFFER_CAPACITY, &capacity)?);
        }
        tracing::debug!("Loaded client config {:?}", config);
        Ok(config)
    }

    pub fn client_id(&mut self, client_id: impl Into<String>) -> &mut Self {
        self.client_id = client_id.into();
        self
    }

    pub fn api_version(&mut self, api_version: i16) -> &mut Self {
        self.api_version = api_version;
        self
    }

    pub fn buffer_capacity(&mut self, buffer_capacity: usize) -> &mut Self {
        self.buffer_capacity = buffer_capacity;
        self
    }

    pub fn correlation_id(&mut self, correlation_id: i32) -> &mut Self {
        self.correlation_id = correlation_id;
        self
    }
}

/// Split a comma separated broker list, ignoring blank entries.
pub fn parse_brokers(brokers: &str) -> Result<Vec<BrokerAddress>> {
    let addrs = brokers
        .split(',')
        .filter(|addr| !addr.trim().is_empty())
        .map(str::parse)
        .collect::<Result<Vec<BrokerAddress>>>()?;
    if addrs.is_empty() {
        tracing::error!("ERROR: no brokers in {:?}", brokers);
        return Err(Error::MissingBrokerConfigOptions);
    }
    Ok(addrs)
}

fn parse_var<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| {
        tracing::error!("ERROR: {} has invalid value {:?}", key, value);
        Error::MissingBrokerConfigOptions
    })
}
