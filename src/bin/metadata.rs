use metamorphosis::prelude::{fetch_cluster_metadata, ClientConfig};

#[tokio::main]
async fn main() -> Result<(), ()> {
    tracing_subscriber::fmt()
        // filter spans/events with level DEBUG or higher.
        .with_max_level(tracing::Level::DEBUG)
        .compact()
        // Display source code file paths
        .with_file(true)
        // Display source code line numbers
        .with_line_number(true)
        // Don't display the event's target (module path)
        .with_target(false)
        // Build the subscriber
        .init();

    let config = ClientConfig::from_env().map_err(|err| tracing::error!("{:?}", err))?;
    let topics: Vec<String> = std::env::args().skip(1).collect();

    let metadata = fetch_cluster_metadata(&config, &topics)
        .await
        .map_err(|err| tracing::error!("{:?}", err))?;

    println!("controller: {}", metadata.controller_id);
    for broker in &metadata.brokers {
        println!(
            "broker {} at {}:{} rack {}",
            broker.node_id,
            broker.host.as_deref().unwrap_or("-"),
            broker.port,
            broker.rack.as_deref().unwrap_or("-")
        );
    }
    for topic in &metadata.topics {
        println!(
            "topic {} ({:?}){}",
            topic.name.as_deref().unwrap_or("-"),
            topic.kafka_code(),
            if topic.is_internal { " internal" } else { "" }
        );
        for partition in &topic.partitions {
            println!(
                "  partition {} leader {} replicas {:?} isr {:?}",
                partition.partition_id, partition.leader_id, partition.replica_ids, partition.isr_ids
            );
        }
    }

    metadata
        .is_error()
        .map_err(|err| tracing::error!("{:?}", err))
}
