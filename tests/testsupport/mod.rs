use metamorphosis::prelude::{BrokerAddress, ClientConfig, Error};
use std::env;

const KAFKA_BROKERS: &str = "KAFKA_BROKERS";
#[allow(dead_code)]
const KAFKA_TOPIC: &str = "KAFKA_TOPIC";

/// The live cluster config, or `None` when no `KAFKA_BROKERS` is set and the
/// test should be skipped.
pub fn get_config() -> Result<Option<ClientConfig>, Error> {
    if env::var(KAFKA_BROKERS).is_err() {
        tracing::warn!("Skipping test because no {} is set", KAFKA_BROKERS);
        return Ok(None);
    }
    ClientConfig::from_env().map(Some)
}

#[allow(dead_code)]
pub fn get_brokers() -> Result<(bool, Vec<BrokerAddress>), Error> {
    match get_config()? {
        Some(config) => Ok((false, config.bootstrap_addrs)),
        None => Ok((true, vec![])),
    }
}

#[allow(dead_code)]
pub fn get_config_and_topic() -> Result<(bool, Option<ClientConfig>, String), Error> {
    let config = match get_config()? {
        Some(config) => config,
        None => return Ok((true, None, "".to_string())),
    };
    let topic = match env::var(KAFKA_TOPIC) {
        Ok(topic) => topic,
        Err(_) => {
            tracing::warn!("Skipping test because no {} is set", KAFKA_TOPIC);
            return Ok((true, None, "".to_string()));
        }
    };
    Ok((false, Some(config), topic))
}
