//! Error types for flowgen sinks.

use thiserror::Error;

/// Errors that can occur while building or using a sink.
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("Kafka error: {0}")]
    Kafka(#[from] rdkafka::error::KafkaError),

    /// The producer's local outbound queue has no room for another message.
    #[error("Outbound queue is full")]
    QueueFull,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, SinkError>;
