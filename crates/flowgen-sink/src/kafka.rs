//! Kafka publish sink.

use crate::delivery::{DeliveryOutcome, DeliveryReceiver, DeliveryStatus};
use crate::error::{Result, SinkError};
use crate::Sink;
use rdkafka::error::KafkaError;
use rdkafka::message::Message;
use rdkafka::producer::{
    BaseRecord, DeliveryResult, Producer, ProducerContext, ThreadedProducer,
};
use rdkafka::types::RDKafkaErrorCode;
use rdkafka::util::Timeout;
use rdkafka::{ClientConfig, ClientContext};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Prefix of the Kafka client id; the host name is appended.
pub const DEFAULT_CLIENT_ID_PREFIX: &str = "flowgen";

/// Configuration for the Kafka sink.
///
/// The buffering limits bound librdkafka's local outbound queue. Once either
/// limit is reached, submissions fail immediately with
/// [`SinkError::QueueFull`] instead of blocking the caller.
#[derive(Debug, Clone)]
pub struct KafkaSinkConfig {
    /// Kafka brokers (comma-separated list)
    pub brokers: String,
    /// Topic every record is published to
    pub topic: String,
    /// Client id reported to the brokers
    pub client_id: String,
    /// Compression codec (`none`, `gzip`, `snappy`, `lz4`, `zstd`)
    pub compression: String,
    /// Maximum number of messages held in the local queue
    pub queue_buffering_max_messages: u32,
    /// Maximum total size of the local queue, in KiB
    pub queue_buffering_max_kbytes: u32,
    /// Time after which an undelivered message is reported as failed
    pub message_timeout_ms: u32,
}

impl Default for KafkaSinkConfig {
    fn default() -> Self {
        Self {
            brokers: "localhost:9092".to_string(),
            topic: "".to_string(),
            client_id: client_id_from_env(DEFAULT_CLIENT_ID_PREFIX),
            compression: "snappy".to_string(),
            queue_buffering_max_messages: 2000,
            queue_buffering_max_kbytes: 3000,
            message_timeout_ms: 30_000,
        }
    }
}

impl KafkaSinkConfig {
    pub fn new(brokers: impl Into<String>, topic: impl Into<String>) -> Self {
        Self {
            brokers: brokers.into(),
            topic: topic.into(),
            ..Default::default()
        }
    }

    /// Reject settings librdkafka would refuse or that cannot publish anywhere.
    pub fn validate(&self) -> Result<()> {
        if self.brokers.trim().is_empty() {
            return Err(SinkError::InvalidConfig(
                "at least one broker address is required".to_string(),
            ));
        }
        if self.topic.trim().is_empty() {
            return Err(SinkError::InvalidConfig(
                "a topic name is required".to_string(),
            ));
        }
        if self.queue_buffering_max_messages == 0 {
            return Err(SinkError::InvalidConfig(
                "queue.buffering.max.messages must be greater than 0".to_string(),
            ));
        }
        if self.queue_buffering_max_kbytes == 0 {
            return Err(SinkError::InvalidConfig(
                "queue.buffering.max.kbytes must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// librdkafka client configuration for this sink.
    pub fn client_config(&self) -> ClientConfig {
        let mut config = ClientConfig::new();
        config
            .set("bootstrap.servers", &self.brokers)
            .set("client.id", &self.client_id)
            .set("compression.type", &self.compression)
            .set(
                "queue.buffering.max.messages",
                self.queue_buffering_max_messages.to_string(),
            )
            .set(
                "queue.buffering.max.kbytes",
                self.queue_buffering_max_kbytes.to_string(),
            )
            .set("message.timeout.ms", self.message_timeout_ms.to_string());
        config
    }
}

/// Build a client id from `prefix` and a host name.
///
/// In Kubernetes the host name is the pod name, which keeps client ids unique
/// across replicas.
pub fn client_id(prefix: &str, hostname: Option<&str>) -> String {
    let hostname = match hostname {
        Some(name) if !name.is_empty() => name,
        _ => "unknown",
    };
    format!("{prefix}-{hostname}")
}

/// [`client_id`] using the `HOSTNAME` environment variable.
pub fn client_id_from_env(prefix: &str) -> String {
    client_id(prefix, std::env::var("HOSTNAME").ok().as_deref())
}

/// Producer context forwarding delivery reports into a channel.
struct DeliveryReporter {
    outcomes: mpsc::UnboundedSender<DeliveryOutcome>,
}

impl ClientContext for DeliveryReporter {}

impl ProducerContext for DeliveryReporter {
    type DeliveryOpaque = usize;

    fn delivery(&self, delivery_result: &DeliveryResult<'_>, submission: Self::DeliveryOpaque) {
        let status = match delivery_result {
            Ok(message) => DeliveryStatus::Delivered {
                partition: message.partition(),
                offset: message.offset(),
            },
            Err((err, _)) => DeliveryStatus::Failed(err.clone()),
        };

        // A closed channel only means nobody is listening any more.
        let _ = self.outcomes.send(DeliveryOutcome {
            submission: submission as u64,
            status,
        });
    }
}

/// Publishes payloads to a Kafka topic.
///
/// Submission enqueues into librdkafka's local queue and returns at once; a
/// background thread owned by the producer transmits batches and fires
/// delivery reports, which surface on the [`DeliveryReceiver`] returned by
/// [`KafkaSink::new`].
pub struct KafkaSink {
    producer: ThreadedProducer<DeliveryReporter>,
    topic: String,
    next_submission: AtomicUsize,
}

impl KafkaSink {
    /// Create the producer.
    ///
    /// This does not contact the brokers; connection problems show up later as
    /// failed deliveries. It fails on invalid configuration.
    pub fn new(config: &KafkaSinkConfig) -> Result<(Self, DeliveryReceiver)> {
        config.validate()?;

        let (tx, rx) = mpsc::unbounded_channel();
        let producer: ThreadedProducer<DeliveryReporter> = config
            .client_config()
            .create_with_context(DeliveryReporter { outcomes: tx })?;

        info!(
            "Kafka producer created: brokers={}, topic={}, client_id={}",
            config.brokers, config.topic, config.client_id
        );

        Ok((
            Self {
                producer,
                topic: config.topic.clone(),
                next_submission: AtomicUsize::new(0),
            },
            rx,
        ))
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Messages accepted but not yet delivered or failed.
    pub fn in_flight(&self) -> i32 {
        self.producer.in_flight_count()
    }
}

impl Sink for KafkaSink {
    fn name(&self) -> &'static str {
        "kafka"
    }

    fn submit(&self, payload: &[u8]) -> Result<()> {
        let submission = self.next_submission.fetch_add(1, Ordering::Relaxed);
        let record = BaseRecord::<(), [u8], usize>::with_opaque_to(&self.topic, submission)
            .payload(payload);

        self.producer.send(record).map_err(|(err, _)| classify(err))
    }

    fn flush(&self, max_wait: Duration) -> bool {
        match self.producer.flush(Timeout::After(max_wait)) {
            Ok(()) => true,
            Err(err) => {
                debug!(
                    in_flight = self.in_flight(),
                    "Flush did not drain within {max_wait:?}: {err}"
                );
                false
            }
        }
    }

    fn shutdown(&self, max_wait: Duration) -> bool {
        info!(
            "Flushing Kafka producer ({} in flight, waiting up to {max_wait:?})",
            self.in_flight()
        );
        let drained = self.flush(max_wait);
        if !drained {
            warn!(
                "Kafka producer shut down with {} messages undelivered",
                self.in_flight()
            );
        }
        drained
    }
}

fn classify(err: KafkaError) -> SinkError {
    match err.rdkafka_error_code() {
        Some(RDKafkaErrorCode::QueueFull) => SinkError::QueueFull,
        _ => SinkError::Kafka(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offline_config() -> KafkaSinkConfig {
        // Nothing listens on port 1; the producer never reaches a broker.
        KafkaSinkConfig {
            brokers: "127.0.0.1:1".to_string(),
            topic: "flowgen-test".to_string(),
            client_id: "flowgen-test".to_string(),
            message_timeout_ms: 500,
            ..Default::default()
        }
    }

    #[test]
    fn test_client_id_uses_hostname() {
        assert_eq!(
            client_id("flowgen", Some("gen-7d9c-abcde")),
            "flowgen-gen-7d9c-abcde"
        );
        assert_eq!(client_id("flowgen", None), "flowgen-unknown");
        assert_eq!(client_id("flowgen", Some("")), "flowgen-unknown");
    }

    #[test]
    fn test_client_config_carries_buffering_limits() {
        let config = KafkaSinkConfig {
            queue_buffering_max_messages: 1234,
            queue_buffering_max_kbytes: 567,
            ..KafkaSinkConfig::new("broker-a:9092,broker-b:9092", "flows")
        };
        let client = config.client_config();

        assert_eq!(
            client.get("bootstrap.servers"),
            Some("broker-a:9092,broker-b:9092")
        );
        assert_eq!(client.get("compression.type"), Some("snappy"));
        assert_eq!(client.get("queue.buffering.max.messages"), Some("1234"));
        assert_eq!(client.get("queue.buffering.max.kbytes"), Some("567"));
        assert_eq!(client.get("message.timeout.ms"), Some("30000"));
    }

    #[test]
    fn test_validate_rejects_missing_topic() {
        let config = KafkaSinkConfig::new("localhost:9092", "");
        assert!(matches!(
            config.validate(),
            Err(SinkError::InvalidConfig(_))
        ));
        assert!(KafkaSink::new(&config).is_err());
    }

    #[test]
    fn test_validate_rejects_zero_queue_limits() {
        let config = KafkaSinkConfig {
            queue_buffering_max_messages: 0,
            ..KafkaSinkConfig::new("localhost:9092", "flows")
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_full_queue_rejects_immediately() {
        let config = KafkaSinkConfig {
            queue_buffering_max_messages: 1,
            ..offline_config()
        };
        let (sink, _rx) = KafkaSink::new(&config).unwrap();

        sink.submit(b"{\"msg_id\":\"1\"}").unwrap();
        let second = sink.submit(b"{\"msg_id\":\"2\"}");
        assert!(matches!(second, Err(SinkError::QueueFull)));
        assert!(sink.in_flight() >= 1);
    }

    #[test]
    fn test_flush_is_bounded_when_broker_is_unreachable() {
        let (sink, _rx) = KafkaSink::new(&offline_config()).unwrap();
        sink.submit(b"{}").unwrap();

        let started = std::time::Instant::now();
        assert!(!sink.flush(Duration::from_millis(10)));
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_undeliverable_message_reports_failure() {
        let (sink, mut rx) = KafkaSink::new(&offline_config()).unwrap();
        sink.submit(b"{}").unwrap();

        let outcome = tokio::time::timeout(Duration::from_secs(30), rx.recv())
            .await
            .expect("delivery report should arrive after message.timeout.ms")
            .expect("channel should stay open while the sink lives");

        assert_eq!(outcome.submission, 0);
        assert!(matches!(outcome.status, DeliveryStatus::Failed(_)));
    }
}
