//! Generator publishing to a Kafka sink whose broker is unreachable.
//!
//! Nothing listens on 127.0.0.1:1, so every accepted message eventually fails
//! delivery after `message.timeout.ms`. The loop itself must keep going with
//! bounded flushes the whole time.

use flowgen::{Generator, ScriptedTriggers};
use flowgen_sink::{spawn_delivery_drain, DeliveryStats, KafkaSink, KafkaSinkConfig, Sink};
use std::sync::Arc;
use std::time::{Duration, Instant};

fn offline_config() -> KafkaSinkConfig {
    KafkaSinkConfig {
        brokers: "127.0.0.1:1".to_string(),
        topic: "flowgen-offline".to_string(),
        client_id: "flowgen-offline-test".to_string(),
        message_timeout_ms: 500,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_unreachable_broker_does_not_stall_the_loop() {
    let (sink, reports) = KafkaSink::new(&offline_config()).unwrap();
    let stats = Arc::new(DeliveryStats::new());
    let drain = spawn_delivery_drain(reports, Arc::clone(&stats));

    let mut generator = Generator::new(sink)
        .with_console(Vec::new())
        .with_flush_timeout(Duration::from_millis(10));
    let mut triggers = ScriptedTriggers::periodic(
        Duration::from_millis(10),
        Duration::from_millis(100),
        Duration::from_millis(500),
    );

    let started = Instant::now();
    let summary = generator.run(&mut triggers).await;

    // Five bounded flushes, nowhere near a broker round trip each.
    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(summary.reports, 5);
    assert_eq!(summary.pacer_ticks, 50);
    assert_eq!(summary.dispatched, 50);
    assert_eq!(summary.submit_failures, 0);

    // Give every message time to expire, then close the channel.
    assert!(!generator.sink().shutdown(Duration::from_millis(100)));
    tokio::time::sleep(Duration::from_secs(3)).await;
    drop(generator);

    tokio::time::timeout(Duration::from_secs(30), drain)
        .await
        .expect("drain ends once the producer is dropped")
        .unwrap();
    let stats = stats.snapshot();
    assert_eq!(stats.delivered, 0);
    assert_eq!(stats.failed, 50);
}
