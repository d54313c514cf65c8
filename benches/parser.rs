use criterion::*;
use metamorphosis::prelude::{
    encode::ToByte,
    frame,
    protocol::{Broker, HeaderResponse, MetadataResponse, Partition, Topic},
    ByteBuffer,
};

fn cluster(brokers: i32, topics: i32, partitions: i32) -> MetadataResponse {
    MetadataResponse {
        header_response: HeaderResponse { correlation_id: 1 },
        brokers: (0..brokers)
            .map(|node_id| Broker {
                node_id,
                host: Some(format!("kafka-{node_id}.internal")),
                port: 9092,
                rack: Some(format!("rack-{}", node_id % 3)),
            })
            .collect(),
        controller_id: 0,
        topics: (0..topics)
            .map(|t| Topic {
                error_code: 0,
                name: Some(format!("topic-{t}")),
                is_internal: false,
                partitions: (0..partitions)
                    .map(|partition_id| Partition {
                        error_code: 0,
                        partition_id,
                        leader_id: partition_id % brokers,
                        replica_ids: (0..3).map(|r| (partition_id + r) % brokers).collect(),
                        isr_ids: (0..3).map(|r| (partition_id + r) % brokers).collect(),
                    })
                    .collect(),
            })
            .collect(),
    }
}

fn criterion_benchmark(c: &mut Criterion) {
    let metadata = cluster(6, 50, 12);

    let mut payload = ByteBuffer::new(256 * 1024);
    metadata.encode_versioned(1, &mut payload).unwrap();
    let mut data = ByteBuffer::new(256 * 1024);
    (payload.available_to_read() as i32).encode(&mut data).unwrap();
    data.put_slice(payload.readable()).unwrap();

    let mut parser_group = c.benchmark_group("parser");

    parser_group.throughput(Throughput::Bytes(data.available_to_read() as u64));
    parser_group.bench_with_input(
        BenchmarkId::new("parse", data.available_to_read()),
        &data,
        |b, data: &ByteBuffer| {
            b.iter(|| {
                let mut buffer = data.clone();
                let parsed: MetadataResponse = frame::decode_response(&mut buffer, 1, 1).unwrap();
                assert_eq!(parsed.topics.len(), 50);
            });
        },
    );

    parser_group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
