mod testsupport;

use metamorphosis::prelude::{
    fetch_cluster_metadata, fetch_metadata, ByteBuffer, Error, TcpConnection,
};

const CLIENT_ID: &str = "metadata protocol integration test";
const CORRELATION_ID: i32 = 1;

#[tokio::test]
async fn it_can_get_metadata() -> Result<(), Box<Error>> {
    let (skip, brokers) = testsupport::get_brokers()?;
    if skip {
        return Ok(());
    }
    let mut conn = TcpConnection::connect(&brokers).await?;
    let mut buffer = ByteBuffer::new(64 * 1024);

    for api_version in 0..=1 {
        let metadata = fetch_metadata::<_, &str>(
            &mut conn,
            &mut buffer,
            CORRELATION_ID + api_version as i32,
            Some(CLIENT_ID),
            api_version,
            &[],
        )
        .await?;

        assert_eq!(
            metadata.header_response.correlation_id,
            CORRELATION_ID + api_version as i32
        );
        assert!(!metadata.brokers.is_empty());
        for broker in &metadata.brokers {
            broker.addr()?;
        }
    }
    Ok(())
}

#[tokio::test]
async fn it_can_get_metadata_for_a_topic() -> Result<(), Box<Error>> {
    let (skip, config, topic) = testsupport::get_config_and_topic()?;
    let config = match (skip, config) {
        (false, Some(config)) => config,
        _ => return Ok(()),
    };

    let metadata = fetch_cluster_metadata(&config, &[topic.clone()]).await?;

    assert_eq!(metadata.topics.len(), 1);
    assert_eq!(metadata.topics[0].name.as_deref(), Some(topic.as_str()));
    metadata.is_error()?;
    for partition in &metadata.topics[0].partitions {
        assert!(metadata.broker(partition.leader_id).is_some());
    }
    Ok(())
}
