//! Output sinks for flowgen.
//!
//! A sink accepts encoded records one at a time. Submission never blocks: a
//! sink that cannot take a payload right now fails immediately and the caller
//! drops the record. Buffered work is pushed out by [`Sink::flush`], the only
//! call allowed to wait, and only for a bounded time.
//!
//! Two sinks are provided:
//!
//! - [`KafkaSink`] publishes to a Kafka topic through librdkafka. Delivery
//!   outcomes arrive later on a channel; [`spawn_delivery_drain`] logs them.
//! - [`PrintSink`] writes each payload as one line to a local writer
//!   (standard output by default).

pub mod delivery;
pub mod error;
pub mod kafka;
pub mod print;

use std::sync::Arc;
use std::time::Duration;

// Re-export main types for easy access
pub use delivery::{
    spawn_delivery_drain, DeliveryOutcome, DeliveryReceiver, DeliveryStats,
    DeliveryStatsSnapshot, DeliveryStatus,
};
pub use error::{Result, SinkError};
pub use kafka::{client_id, client_id_from_env, KafkaSink, KafkaSinkConfig};
pub use print::PrintSink;

/// Destination for encoded records.
pub trait Sink: Send + Sync {
    /// Short name used in log output.
    fn name(&self) -> &'static str;

    /// Hand one payload to the sink without blocking.
    ///
    /// The payload is copied before this returns; the caller may reuse its
    /// buffer immediately.
    fn submit(&self, payload: &[u8]) -> Result<()>;

    /// Wait up to `max_wait` for buffered work to be delivered.
    ///
    /// Returns `true` if nothing is left pending. A `false` return is not an
    /// error; remaining work is picked up by later flushes.
    fn flush(&self, max_wait: Duration) -> bool;

    /// Drain the sink before the process exits.
    fn shutdown(&self, max_wait: Duration) -> bool {
        self.flush(max_wait)
    }
}

impl<S: Sink + ?Sized> Sink for Arc<S> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn submit(&self, payload: &[u8]) -> Result<()> {
        (**self).submit(payload)
    }

    fn flush(&self, max_wait: Duration) -> bool {
        (**self).flush(max_wait)
    }

    fn shutdown(&self, max_wait: Duration) -> bool {
        (**self).shutdown(max_wait)
    }
}

impl<S: Sink + ?Sized> Sink for Box<S> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn submit(&self, payload: &[u8]) -> Result<()> {
        (**self).submit(payload)
    }

    fn flush(&self, max_wait: Duration) -> bool {
        (**self).flush(max_wait)
    }

    fn shutdown(&self, max_wait: Duration) -> bool {
        (**self).shutdown(max_wait)
    }
}
