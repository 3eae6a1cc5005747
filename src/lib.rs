//! flowgen Library
//!
//! A synthetic telemetry load generator. It produces L7 flow-log events at a
//! fixed rate and publishes each one as a JSON message to a Kafka topic (or
//! prints it locally), reporting once per second how many it dispatched.
//!
//! # Crates
//!
//! - `flowgen_record` - the 55-field record, its slot pool, the factory and
//!   the JSON encoder
//! - `flowgen_sink` - the Kafka sink with delivery reports, and the print sink
//!
//! This crate wires them together: configuration, the pacer and reporter
//! triggers, the throughput counter and the publish loop.
//!
//! # CLI Usage
//!
//! ```bash
//! # Print records and per-second counts to stdout
//! flowgen
//!
//! # Publish to Kafka at 1000 records per second
//! SEND_TO_KAFKA=true KAFKA_BROKER=kafka:9092 KAFKA_TOPIC=flows flowgen --rate 1000
//! ```

pub mod config;
pub mod generator;
pub mod throughput;
pub mod trigger;

pub use config::{Config, KafkaOpts};
pub use generator::{Generator, RunSummary, DEFAULT_FLUSH_TIMEOUT};
pub use throughput::ThroughputCounter;
pub use trigger::{IntervalTriggers, ScriptedTriggers, Tick, TriggerSource, REPORT_INTERVAL};
