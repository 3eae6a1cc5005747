//! Command-line and environment configuration.
//!
//! Everything is read once at startup. Each flag has an environment variable
//! fallback so the generator can be configured entirely from the environment.

pub mod duration;

use anyhow::Context;
use clap::{ArgAction, Args, Parser};
use std::convert::Infallible;
use flowgen_record::DEFAULT_POOL_CAPACITY;
use flowgen_sink::kafka::DEFAULT_CLIENT_ID_PREFIX;
use flowgen_sink::{client_id_from_env, KafkaSinkConfig};
use std::time::Duration;

pub use duration::parse_duration;

/// Highest accepted production rate; keeps the pacer period above zero.
pub const MAX_RATE: u32 = 1_000_000;

#[derive(Parser, Debug, Clone)]
#[command(name = "flowgen")]
#[command(about = "Generate synthetic L7 flow-log events at a fixed rate and publish them to Kafka")]
#[command(version)]
pub struct Config {
    /// Publish records to Kafka; any value other than "true" prints records to stdout
    #[arg(
        long,
        env = "SEND_TO_KAFKA",
        action = ArgAction::Set,
        num_args = 0..=1,
        default_value = "false",
        default_missing_value = "true",
        value_parser = parse_publish_switch
    )]
    pub send_to_kafka: bool,

    /// Records produced per second
    #[arg(long, env = "FLOWGEN_RATE", default_value_t = 600)]
    pub rate: u32,

    /// Longest the once-per-second flush may wait (e.g. "10ms", "1s"; bare numbers are ms)
    #[arg(
        long,
        env = "FLOWGEN_FLUSH_TIMEOUT",
        default_value = "10ms",
        value_parser = parse_duration
    )]
    pub flush_timeout: Duration,

    /// Longest the final flush on shutdown may wait
    #[arg(
        long,
        env = "FLOWGEN_SHUTDOWN_TIMEOUT",
        default_value = "5s",
        value_parser = parse_duration
    )]
    pub shutdown_timeout: Duration,

    /// Idle record slots kept for reuse
    #[arg(long, env = "FLOWGEN_POOL_CAPACITY", default_value_t = DEFAULT_POOL_CAPACITY)]
    pub pool_capacity: usize,

    #[command(flatten)]
    pub kafka: KafkaOpts,
}

/// Kafka connection and producer tuning.
#[derive(Args, Debug, Clone)]
pub struct KafkaOpts {
    /// Kafka brokers (comma-separated list)
    #[arg(long, env = "KAFKA_BROKER", default_value = "localhost:9092")]
    pub kafka_broker: String,

    /// Topic to publish to (required with --send-to-kafka)
    #[arg(long, env = "KAFKA_TOPIC")]
    pub kafka_topic: Option<String>,

    /// Compression codec
    #[arg(long, default_value = "snappy")]
    pub compression: String,

    /// Maximum number of messages buffered locally before submissions fail
    #[arg(long, default_value_t = 2000)]
    pub queue_buffering_max_messages: u32,

    /// Maximum size of the local buffer in KiB
    #[arg(long, default_value_t = 3000)]
    pub queue_buffering_max_kbytes: u32,

    /// Time after which an undelivered message is reported as failed
    #[arg(long, default_value_t = 30_000)]
    pub message_timeout_ms: u32,

    /// Client id prefix; the host name is appended
    #[arg(long, default_value = DEFAULT_CLIENT_ID_PREFIX)]
    pub client_id_prefix: String,
}

/// Only the exact value `true` enables publishing. Anything else, including
/// an empty value, selects the print sink.
pub fn parse_publish_switch(value: &str) -> Result<bool, Infallible> {
    Ok(value == "true")
}

impl Config {
    /// Check values clap cannot check on its own.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.rate == 0 {
            anyhow::bail!("--rate must be greater than 0");
        }
        if self.rate > MAX_RATE {
            anyhow::bail!("--rate must be at most {MAX_RATE}, got {}", self.rate);
        }
        if self.send_to_kafka {
            self.kafka.sink_config()?;
        }
        Ok(())
    }

    /// Time between two pacer ticks.
    pub fn pace_interval(&self) -> Duration {
        Duration::from_secs(1) / self.rate.max(1)
    }
}

impl KafkaOpts {
    pub fn sink_config(&self) -> anyhow::Result<KafkaSinkConfig> {
        let topic = self
            .kafka_topic
            .as_deref()
            .filter(|topic| !topic.trim().is_empty())
            .context("KAFKA_TOPIC (or --kafka-topic) is required when publishing to Kafka")?;

        let config = KafkaSinkConfig {
            brokers: self.kafka_broker.clone(),
            topic: topic.to_string(),
            client_id: client_id_from_env(&self.client_id_prefix),
            compression: self.compression.clone(),
            queue_buffering_max_messages: self.queue_buffering_max_messages,
            queue_buffering_max_kbytes: self.queue_buffering_max_kbytes,
            message_timeout_ms: self.message_timeout_ms,
        };
        config
            .validate()
            .context("Invalid Kafka configuration")?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Config {
        let mut argv = vec!["flowgen"];
        argv.extend_from_slice(args);
        Config::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_explicit_flags_override_defaults() {
        let config = parse(&[
            "--send-to-kafka",
            "--kafka-broker",
            "kafka-0:9092,kafka-1:9092",
            "--kafka-topic",
            "flows",
            "--rate",
            "1200",
            "--flush-timeout",
            "25",
            "--shutdown-timeout",
            "2s",
            "--pool-capacity",
            "8",
            "--compression",
            "lz4",
            "--queue-buffering-max-messages",
            "500",
            "--client-id-prefix",
            "gen",
        ]);

        assert!(config.send_to_kafka);
        assert_eq!(config.rate, 1200);
        assert_eq!(config.flush_timeout, Duration::from_millis(25));
        assert_eq!(config.shutdown_timeout, Duration::from_secs(2));
        assert_eq!(config.pool_capacity, 8);
        config.validate().unwrap();

        let sink = config.kafka.sink_config().unwrap();
        assert_eq!(sink.brokers, "kafka-0:9092,kafka-1:9092");
        assert_eq!(sink.topic, "flows");
        assert_eq!(sink.compression, "lz4");
        assert_eq!(sink.queue_buffering_max_messages, 500);
        assert_eq!(sink.queue_buffering_max_kbytes, 3000);
        assert!(sink.client_id.starts_with("gen-"));
    }

    #[test]
    fn test_pace_interval_divides_one_second() {
        let config = parse(&["--rate", "600"]);
        assert_eq!(config.pace_interval(), Duration::from_nanos(1_666_666));

        let config = parse(&["--rate", "4"]);
        assert_eq!(config.pace_interval(), Duration::from_millis(250));
    }

    #[test]
    fn test_rate_bounds_are_enforced() {
        assert!(parse(&["--rate", "0"]).validate().is_err());
        assert!(parse(&["--rate", "2000000"]).validate().is_err());
        assert!(parse(&["--rate", "1"]).validate().is_ok());
    }

    #[test]
    fn test_publishing_requires_topic() {
        let config = parse(&["--send-to-kafka", "--kafka-topic", " "]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_only_literal_true_enables_publishing() {
        assert_eq!(parse_publish_switch("true"), Ok(true));
        for value in ["", "1", "TRUE", "yes", "false", "on"] {
            assert_eq!(parse_publish_switch(value), Ok(false), "{value:?}");
        }
    }

    #[test]
    fn test_publish_switch_values_select_print_mode() {
        // Same parser the SEND_TO_KAFKA value goes through.
        for arg in ["--send-to-kafka=", "--send-to-kafka=1", "--send-to-kafka=TRUE"] {
            let config = parse(&[arg]);
            assert!(!config.send_to_kafka, "{arg}");
            config.validate().unwrap();
        }
        assert!(parse(&["--send-to-kafka=true", "--kafka-topic", "flows"]).send_to_kafka);
        assert!(parse(&["--send-to-kafka", "--kafka-topic", "flows"]).send_to_kafka);
    }

    #[test]
    fn test_bad_duration_is_rejected_by_parser() {
        let result = Config::try_parse_from(["flowgen", "--flush-timeout", "soon"]);
        assert!(result.is_err());
    }
}
