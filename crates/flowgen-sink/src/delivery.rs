//! Asynchronous delivery outcomes.
//!
//! librdkafka reports the fate of every accepted message some time after
//! submission, on its own polling thread. [`KafkaSink`](crate::KafkaSink)
//! forwards those reports into an unbounded channel; a single background task
//! started with [`spawn_delivery_drain`] consumes the channel for the lifetime
//! of the producer, logging failures and keeping counts. No corrective action
//! is taken for failed deliveries.

use rdkafka::error::KafkaError;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error};

/// Receiving end of a sink's delivery-outcome channel.
pub type DeliveryReceiver = mpsc::UnboundedReceiver<DeliveryOutcome>;

/// What eventually happened to one submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryStatus {
    Delivered { partition: i32, offset: i64 },
    Failed(KafkaError),
}

/// Delivery report for one accepted submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryOutcome {
    /// Sequence number the sink assigned when the payload was submitted.
    pub submission: u64,
    pub status: DeliveryStatus,
}

/// Running totals of delivery outcomes.
#[derive(Debug, Default)]
pub struct DeliveryStats {
    delivered: AtomicU64,
    failed: AtomicU64,
}

/// Point-in-time copy of [`DeliveryStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryStatsSnapshot {
    pub delivered: u64,
    pub failed: u64,
}

impl DeliveryStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count and log one outcome.
    pub fn observe(&self, outcome: &DeliveryOutcome) {
        match &outcome.status {
            DeliveryStatus::Delivered { partition, offset } => {
                self.delivered.fetch_add(1, Ordering::Relaxed);
                debug!(
                    submission = outcome.submission,
                    partition, offset, "Message delivered"
                );
            }
            DeliveryStatus::Failed(err) => {
                self.failed.fetch_add(1, Ordering::Relaxed);
                error!(submission = outcome.submission, "Delivery failed: {err}");
            }
        }
    }

    pub fn snapshot(&self) -> DeliveryStatsSnapshot {
        DeliveryStatsSnapshot {
            delivered: self.delivered.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}

/// Spawn the task that drains delivery outcomes into `stats`.
///
/// The task ends once every sender is gone, i.e. when the producer that owns
/// the channel has been dropped.
pub fn spawn_delivery_drain(
    mut receiver: DeliveryReceiver,
    stats: Arc<DeliveryStats>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(outcome) = receiver.recv().await {
            stats.observe(&outcome);
        }
        debug!("Delivery report channel closed");
    })
}
